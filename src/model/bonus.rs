use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bonus {
    pub id: u64,
    pub member_id: u64,
    pub amount: f64,
    pub reason: String,
    pub bonus_date: NaiveDate,
    pub created_by: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Bonus as shown on a payroll row, creator resolved to a display name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BonusLine {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 100.0)]
    pub amount: f64,

    #[schema(example = "Top seller of the week")]
    pub reason: String,

    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub bonus_date: NaiveDate,

    #[schema(example = "Jane Admin", nullable = true)]
    pub created_by_name: Option<String>,
}
