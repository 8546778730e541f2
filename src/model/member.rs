use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::bonus::BonusLine;
use crate::model::payroll_settings::PayrollSettings;
use crate::model::role::MemberRole;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "agency_id": 1,
        "full_name": "John Doe",
        "email": "john.doe@agency.com",
        "role": "chatter",
        "status": "active",
        "created_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct TeamMember {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub agency_id: u64,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "john.doe@agency.com")]
    pub email: String,

    #[schema(example = "chatter")]
    pub role: MemberRole,

    #[schema(example = "active")]
    pub status: Option<String>,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A member hydrated for one payroll period: validated gross sales,
/// optional payroll overrides, and the period's bonuses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterMember {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub role: MemberRole,

    /// Gross currency amount of validated sales within the period.
    pub total_valid_sales: f64,

    pub payroll_settings: Option<PayrollSettings>,
    pub bonuses: Vec<BonusLine>,
}
