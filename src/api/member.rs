use crate::{
    auth::auth::AuthUser,
    model::{member::TeamMember, role::MemberRole},
    utils::db_utils::{build_update_sql, execute_update},
    utils::member_cache,
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Columns a member update payload may touch.
const UPDATABLE_COLUMNS: &[&str] = &["full_name", "email", "role", "status"];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateMember {
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "john@agency.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "chatter")]
    pub role: MemberRole,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MemberListResponse {
    #[schema(
    example = json!([{
        "id": 1,
        "agency_id": 1,
        "full_name": "John Doe",
        "email": "john.doe@agency.com",
        "role": "chatter",
        "status": "active",
        "created_at": "2026-01-01T00:00:00Z"
    }])
)]
    pub data: Vec<TeamMember>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 5)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

/// Create Team Member
#[utoipa::path(
    post,
    path = "/api/v1/members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created successfully", body = Object, example = json!({
            "message": "Member created successfully"
        })),
        (status = 409, description = "Email already in use"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Member",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_member(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateMember>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO team_members (agency_id, full_name, email, role, status)
        VALUES (?, ?, ?, ?, 'active')
        "#,
    )
    .bind(auth.agency_id)
    .bind(payload.full_name.trim())
    .bind(payload.email.trim().to_lowercase())
    .bind(payload.role)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            member_cache::put(res.last_insert_id(), payload.full_name.trim()).await;
            Ok(HttpResponse::Created().json(json!({
                "message": "Member created successfully"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Email already in use"
                    })));
                }
            }

            error!(error = %e, "Failed to create member");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            })))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/members",
    params(
        ("page",  Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("role", Query, description = "Filter by role"),
        ("status", Query, description = "Filter by status"),
        ("search", Query, description = "Search by name or email")
    ),
    responses(
        (status = 200, description = "Paginated member list", body = MemberListResponse)
    ),
    tag = "Member",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_members(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MemberQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = vec!["agency_id = ?"];
    let mut bindings: Vec<sqlx::types::JsonValue> = vec![auth.agency_id.into()];

    if let Some(role) = &query.role {
        conditions.push("role = ?");
        bindings.push(role.clone().into());
    }

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(status.clone().into());
    }

    if let Some(search) = &query.search {
        conditions.push("(full_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone().into());
        bindings.push(like.into());
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM team_members {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting members");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count members");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM team_members {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching members");

    let mut data_query = sqlx::query_as::<_, TeamMember>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let members = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch members");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(MemberListResponse {
        data: members,
        page,
        per_page,
        total,
    }))
}

/// Update Team Member
#[utoipa::path(
    put,
    path = "/api/v1/members/{member_id}",
    params(
        ("member_id", Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member updated successfully", body = Object, example = json!({
            "message": "Member updated successfully"
        })),
        (status = 404, description = "Member not found", body = Object, example = json!({
            "message": "Member not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Member",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_member(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let member_id = path.into_inner();

    let update = build_update_sql("team_members", &body, UPDATABLE_COLUMNS, "id", member_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Member not found"));
    }

    // name may have changed; drop the stale cache entry
    member_cache::evict(member_id as u64).await;

    Ok(HttpResponse::Ok().body("Member updated successfully"))
}

/// Delete Team Member
#[utoipa::path(
    delete,
    path = "/api/v1/members/{member_id}",
    params(
        ("member_id", Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Member not found", body = Object, example = json!({
            "message": "Member not found"
        })),
        (status = 500, description = "Internal server error", body = Object)
    ),
    tag = "Member",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_member(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let member_id = path.into_inner();

    let result = sqlx::query("DELETE FROM team_members WHERE id = ? AND agency_id = ?")
        .bind(member_id)
        .bind(auth.agency_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Member not found"
                })));
            }

            member_cache::evict(member_id).await;

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, member_id, "Failed to delete member");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Get Team Member by ID
#[utoipa::path(
    get,
    path = "/api/v1/members/{member_id}",
    params(
        ("member_id", Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member found", body = TeamMember),
        (status = 404, description = "Member not found", body = Object, example = json!({
            "message": "Member not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Member",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_member(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let member_id: u64 = path.into_inner();

    let member = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT id, agency_id, full_name, email, role, status, created_at
        FROM team_members
        WHERE id = ? AND agency_id = ?
        "#,
    )
    .bind(member_id)
    .bind(auth.agency_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, member_id, "Failed to fetch member");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match member {
        Some(m) => Ok(HttpResponse::Ok().json(m)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Member not found"
        }))),
    }
}
