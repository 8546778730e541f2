use crate::api::bonus::CreateBonus;
use crate::api::member::{CreateMember, MemberListResponse};
use crate::api::payroll::{PayrollTableQuery, PayrollTableResponse, UpdatePayrollSettings};
use crate::api::sale::{CreateSale, SaleFilter, SaleListResponse};
use crate::model::bonus::BonusLine;
use crate::model::member::TeamMember;
use crate::model::payroll_settings::PayrollSettings;
use crate::model::role::MemberRole;
use crate::model::sale::Sale;
use crate::payroll::aggregator::{
    ComputedRow, PayrollRow, PayrollTotals, SortColumn, SortDirection,
};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TeamPay API",
        version = "1.0.0",
        description = r#"
## Agency Back-Office Payroll System

This API powers a multi-tenant **agency back-office**: team rosters, validated
sales, and a monthly payroll table computed on every request.

### Key Features
- **Team Management**
  - Create, update, list, and view team members per agency
- **Sales Lifecycle**
  - Members submit sales; managers validate or reject them
- **Payroll**
  - Monthly pay table derived from net sales, tiered base salaries,
    commission, and bonuses, with role filtering and column sorting
- **Bonuses**
  - Admin-attributed one-off payments with reason and date

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Payroll mutations require the **Owner** or **Admin** role.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::member::create_member,
        crate::api::member::get_member,
        crate::api::member::list_members,
        crate::api::member::update_member,
        crate::api::member::delete_member,

        crate::api::sale::create_sale,
        crate::api::sale::list_sales,
        crate::api::sale::validate_sale,
        crate::api::sale::reject_sale,

        crate::api::payroll::payroll_table,
        crate::api::payroll::update_payroll_settings,

        crate::api::bonus::create_bonus,
        crate::api::bonus::delete_bonus
    ),
    components(
        schemas(
            TeamMember,
            MemberRole,
            CreateMember,
            MemberListResponse,
            Sale,
            CreateSale,
            SaleFilter,
            SaleListResponse,
            PayrollSettings,
            BonusLine,
            PayrollRow,
            ComputedRow,
            PayrollTotals,
            SortColumn,
            SortDirection,
            PayrollTableQuery,
            PayrollTableResponse,
            UpdatePayrollSettings,
            CreateBonus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Member", description = "Team member management APIs"),
        (name = "Sales", description = "Sale submission and validation APIs"),
        (name = "Payroll", description = "Payroll table and settings APIs"),
        (name = "Bonus", description = "Bonus management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
