use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "member_id": 42,
        "amount": 120.0,
        "status": "pending",
        "sale_date": "2026-01-15",
        "created_at": "2026-01-15T00:00:00Z"
    })
)]
pub struct Sale {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub member_id: u64,

    #[schema(example = 120.0)]
    pub amount: f64,

    /// pending | validated | rejected
    #[schema(example = "pending")]
    pub status: Option<String>,

    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub sale_date: NaiveDate,

    #[schema(example = "2026-01-15T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
