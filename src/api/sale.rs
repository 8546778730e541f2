use crate::auth::auth::AuthUser;
use crate::model::sale::Sale;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateSale {
    #[schema(example = 120.0)]
    pub amount: f64,

    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub sale_date: NaiveDate,

    /// Member the sale belongs to; defaults to the caller's own member record
    #[schema(example = 42, nullable = true)]
    pub member_id: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SaleFilter {
    /// Filter by member ID
    #[schema(example = 42)]
    pub member_id: Option<u64>,
    /// Filter by sale status
    #[schema(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, ToSchema)]
pub struct SaleListResponse {
    pub data: Vec<Sale>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Submit a sale
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body(
        content = CreateSale,
        description = "Sale submission payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Sale submitted successfully",
         body = Object,
         example = json!({
            "message": "Sale submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Sales"
)]
pub async fn create_sale(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSale>,
) -> actix_web::Result<impl Responder> {
    // Submitting on behalf of another member is an admin action.
    let member_id = match payload.member_id {
        Some(id) if Some(id) != auth.member_id => {
            auth.require_admin()?;
            id
        }
        Some(id) => id,
        None => auth
            .member_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No member profile"))?,
    };

    if payload.amount <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Sale amount must be greater than zero"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO sales (member_id, amount, sale_date, status)
        VALUES (?, ?, ?, 'pending')
        "#,
    )
    .bind(member_id)
    .bind(payload.amount)
    .bind(payload.sale_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, member_id, "Failed to submit sale");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Sale submitted",
        "status": "pending"
    })))
}

/* =========================
Validate sale (Manager/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/sales/{sale_id}/validate",
    params(
        ("sale_id" = u64, Path, description = "ID of the sale to validate")
    ),
    responses(
        (status = 200, description = "Sale validated successfully", body = Object, example = json!({
            "message": "Sale validated"
        })),
        (status = 400, description = "Sale not found or already processed", body = Object, example = json!({
            "message": "Sale not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Sales"
)]
pub async fn validate_sale(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    set_sale_status(pool.get_ref(), path.into_inner(), auth.agency_id, "validated").await
}

/* =========================
Reject sale (Manager/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/sales/{sale_id}/reject",
    params(
        ("sale_id" = u64, Path, description = "ID of the sale to reject")
    ),
    responses(
        (status = 200, description = "Sale rejected successfully", body = Object, example = json!({
            "message": "Sale rejected"
        })),
        (status = 400, description = "Sale not found or already processed", body = Object, example = json!({
            "message": "Sale not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Sales"
)]
pub async fn reject_sale(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    set_sale_status(pool.get_ref(), path.into_inner(), auth.agency_id, "rejected").await
}

/// Pending-only status transition shared by validate/reject.
async fn set_sale_status(
    pool: &MySqlPool,
    sale_id: u64,
    agency_id: u64,
    status: &str,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query(
        r#"
        UPDATE sales s
        JOIN team_members m ON m.id = s.member_id
        SET s.status = ?
        WHERE s.id = ?
          AND m.agency_id = ?
          AND s.status = 'pending'
        "#,
    )
    .bind(status)
    .bind(sale_id)
    .bind(agency_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, sale_id, status, "Sale status update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Sale not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Sale {}", status)
    })))
}

/* =========================
List sales
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(SaleFilter),
    responses(
        (status = 200, description = "Paginated sale list", body = SaleListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SaleFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE m.agency_id = ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(member_id) = query.member_id {
        where_sql.push_str(" AND s.member_id = ?");
        args.push(FilterValue::U64(member_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND s.status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!(
        "SELECT COUNT(*) FROM sales s JOIN team_members m ON m.id = s.member_id{}",
        where_sql
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.agency_id);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count sales");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT s.id, s.member_id, s.amount, s.status, s.sale_date, s.created_at
        FROM sales s
        JOIN team_members m ON m.id = s.member_id
        {}
        ORDER BY s.created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Sale>(&data_sql).bind(auth.agency_id);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let sales = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch sale list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = SaleListResponse {
        data: sales,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
