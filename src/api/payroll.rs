use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::payroll::aggregator::{
    self, ComputedRow, PayrollTotals, RoleFilter, SortColumn, SortDirection, SortState,
};
use crate::payroll::error::PayrollError;
use crate::payroll::roster::fetch_roster;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollTableQuery {
    /// Period month, 1-12
    #[schema(example = 1)]
    pub month: u32,

    /// Period year
    #[schema(example = 2026)]
    pub year: i32,

    /// Role filter: `all` (default) or an exact role name
    #[schema(example = "chatter")]
    pub role: Option<String>,

    /// `net_sales` or `total_pay`; omitted = roster order
    #[schema(example = "net_sales")]
    pub sort_column: Option<SortColumn>,

    /// `asc` or `desc` (default `desc`)
    #[schema(example = "desc")]
    pub sort_direction: Option<SortDirection>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollTableResponse {
    pub month: u32,
    pub year: i32,
    pub rows: Vec<ComputedRow>,
    pub totals: PayrollTotals,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayrollSettings {
    /// Explicit monthly base salary; null clears it back to auto-calculation
    #[schema(example = 450.0, nullable = true)]
    pub base_salary: Option<f64>,

    /// Commission percentage 0-100; null falls back to the 2.5 default
    #[schema(example = 2.5, nullable = true)]
    pub commission_percentage: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollTableQuery),
    responses(
        (status = 200, description = "Computed payroll table for the period", body = PayrollTableResponse),
        (status = 400, description = "Invalid month or role filter"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_table(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollTableQuery>,
) -> Result<impl Responder, actix_web::Error> {
    auth.require_manager_or_admin()?;

    let role = query.role.as_deref().unwrap_or("all");
    let filter = RoleFilter::parse(role)
        .ok_or_else(|| PayrollError::validation(format!("Unknown role filter: {role}")))?;

    let roster = fetch_roster(pool.get_ref(), auth.agency_id, query.month, query.year)
        .await
        .map_err(|e| {
            if let PayrollError::Remote(msg) = &e {
                tracing::error!(error = %msg, month = query.month, year = query.year, "Failed to load roster");
            }
            e
        })?;

    let mut rows = aggregator::filter_by_role(aggregator::build_rows(&roster), filter);
    let sort = SortState::new(
        query.sort_column,
        query.sort_direction.unwrap_or(SortDirection::Desc),
    );
    aggregator::sort_rows(&mut rows, sort);
    let totals = aggregator::aggregate(&rows);

    Ok(HttpResponse::Ok().json(PayrollTableResponse {
        month: query.month,
        year: query.year,
        rows,
        totals,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/payroll/settings/{member_id}",
    request_body = UpdatePayrollSettings,
    params(
        ("member_id", description = "Team member ID")
    ),
    responses(
        (status = 200, description = "Payroll settings updated"),
        (status = 400, description = "Invalid base salary or commission percentage"),
        (status = 404, description = "Member not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayrollSettings>,
) -> Result<impl Responder, actix_web::Error> {
    auth.require_admin()?;

    let member_id = path.into_inner();

    aggregator::validate_settings(body.base_salary, body.commission_percentage)?;

    let member_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM team_members WHERE id = ? AND agency_id = ?)",
    )
    .bind(member_id)
    .bind(auth.agency_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, member_id, "Failed to check member");
        PayrollError::from(e)
    })?;

    if !member_exists {
        return Err(PayrollError::not_found("Member not found").into());
    }

    // Replaces settings for future reads; historical periods are never
    // recomputed retroactively.
    sqlx::query(
        r#"
        INSERT INTO payroll_settings (member_id, base_salary, commission_percentage)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE
            base_salary = VALUES(base_salary),
            commission_percentage = VALUES(commission_percentage)
        "#,
    )
    .bind(member_id)
    .bind(body.base_salary)
    .bind(body.commission_percentage)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, member_id, "Failed to update payroll settings");
        PayrollError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Payroll settings updated successfully"
    })))
}
