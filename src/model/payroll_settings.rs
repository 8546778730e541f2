use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-member payroll overrides. A NULL (or zero) base_salary means
/// "auto-calculate from net sales"; a NULL commission percentage means
/// the default rate applies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollSettings {
    #[schema(example = 450.0, nullable = true)]
    pub base_salary: Option<f64>,

    #[schema(example = 2.5, nullable = true)]
    pub commission_percentage: Option<f64>,
}
