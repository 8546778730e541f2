use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::payroll::aggregator::validate_bonus;
use crate::payroll::error::PayrollError;

#[derive(Deserialize, ToSchema)]
pub struct CreateBonus {
    /// Members receiving the bonus; must not be empty
    #[schema(example = json!([1, 2]))]
    pub member_ids: Vec<u64>,

    #[schema(example = 100.0)]
    pub amount: f64,

    #[schema(example = "Top seller of the week")]
    pub reason: String,

    /// The bonus is shown in the payroll table of this date's calendar month
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub bonus_date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/v1/payroll/bonus",
    request_body = CreateBonus,
    responses(
        (status = 201, description = "Bonus recorded for every selected member"),
        (status = 400, description = "Empty selection, non-positive amount, or blank reason"),
        (status = 404, description = "One or more members not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Bonus"
)]
pub async fn create_bonus(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateBonus>,
) -> Result<impl Responder, actix_web::Error> {
    auth.require_admin()?;

    validate_bonus(&payload.member_ids, payload.amount, &payload.reason)?;

    // All targets must belong to the caller's agency before anything is written.
    let placeholders = vec!["?"; payload.member_ids.len()].join(", ");
    let count_sql = format!(
        "SELECT COUNT(*) FROM team_members WHERE agency_id = ? AND id IN ({})",
        placeholders
    );
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.agency_id);
    for member_id in &payload.member_ids {
        count_query = count_query.bind(member_id);
    }

    let found = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to check bonus members");
        PayrollError::from(e)
    })?;

    if found as usize != payload.member_ids.len() {
        return Err(PayrollError::not_found("One or more members not found").into());
    }

    // One batch INSERT covers every selected member.
    let value_rows = vec!["(?, ?, ?, ?, ?)"; payload.member_ids.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO bonuses (member_id, amount, reason, bonus_date, created_by) VALUES {}",
        value_rows
    );

    let reason = payload.reason.trim();
    let mut insert_query = sqlx::query(&insert_sql);
    for member_id in &payload.member_ids {
        insert_query = insert_query
            .bind(member_id)
            .bind(payload.amount)
            .bind(reason)
            .bind(payload.bonus_date)
            .bind(auth.member_id);
    }

    insert_query.execute(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to record bonuses");
        PayrollError::from(e)
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Bonus recorded successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payroll/bonus/{bonus_id}",
    params(
        ("bonus_id", description = "Bonus ID")
    ),
    responses(
        (status = 200, description = "Bonus deleted"),
        (status = 404, description = "Bonus not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Bonus"
)]
pub async fn delete_bonus(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, actix_web::Error> {
    auth.require_admin()?;

    let bonus_id = path.into_inner();

    let result = sqlx::query(
        r#"
        DELETE b FROM bonuses b
        JOIN team_members m ON m.id = b.member_id
        WHERE b.id = ? AND m.agency_id = ?
        "#,
    )
    .bind(bonus_id)
    .bind(auth.agency_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, bonus_id, "Failed to delete bonus");
        PayrollError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(PayrollError::not_found("Bonus not found").into());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Bonus deleted successfully"
    })))
}
