use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::bonus::BonusLine;
use crate::model::member::RosterMember;
use crate::model::role::MemberRole;
use crate::payroll::error::PayrollError;

/// Share of gross sales left after the fixed 20% platform fee.
pub const NET_SALES_RATE: f64 = 0.8;

/// Commission percentage applied when no override is configured.
pub const DEFAULT_COMMISSION_PERCENTAGE: f64 = 2.5;

/// Auto base salary for chatters is tiered on NET sales. The canonical
/// threshold is 8000 net (10000 gross at the fixed 0.8 net rate).
pub const CHATTER_NET_THRESHOLD: f64 = 8000.0;
pub const CHATTER_BASE_HIGH: f64 = 450.0;
pub const CHATTER_BASE_LOW: f64 = 250.0;

/// Pay figures derived for one member and one period. Never persisted,
/// recomputed from the roster on every request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollRow {
    pub net_sales: f64,
    pub base_salary: f64,
    pub commission: f64,
    pub bonus_total: f64,
    pub total_pay: f64,
}

/// A payroll table row: member identity plus the derived figures.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComputedRow {
    #[schema(example = 42)]
    pub member_id: u64,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "chatter")]
    pub role: MemberRole,

    pub gross_sales: f64,
    pub net_sales: f64,
    pub base_salary: f64,
    pub commission: f64,
    pub bonus_total: f64,
    pub total_pay: f64,

    pub bonuses: Vec<BonusLine>,
}

/// Component-wise sums over the currently filtered rows. Derived from the
/// rows only, so it can never diverge from `compute_row`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollTotals {
    pub base_salary: f64,
    pub commission: f64,
    pub bonuses: f64,
    pub net_sales: f64,
    pub total: f64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    NetSales,
    TotalPay,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Per-column sort cycle: a fresh click sorts descending, a second click
/// flips to ascending, a third clears the column and resets to descending.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            column: None,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(column: Option<SortColumn>, direction: SortDirection) -> Self {
        SortState { column, direction }
    }

    pub fn click(&mut self, column: SortColumn) {
        match self.column {
            Some(current) if current == column => match self.direction {
                SortDirection::Desc => self.direction = SortDirection::Asc,
                SortDirection::Asc => {
                    self.column = None;
                    self.direction = SortDirection::Desc;
                }
            },
            _ => {
                self.column = Some(column);
                self.direction = SortDirection::Desc;
            }
        }
    }
}

/// Role filter for the payroll table. `All` is the identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RoleFilter {
    All,
    Only(MemberRole),
}

impl RoleFilter {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("all") {
            return Some(RoleFilter::All);
        }
        MemberRole::from_str(value).ok().map(RoleFilter::Only)
    }
}

/// Derive the pay figures for one member. Pure; missing settings mean
/// defaults, a zero base salary means auto-calculation.
pub fn compute_row(member: &RosterMember) -> PayrollRow {
    let net_sales = member.total_valid_sales * NET_SALES_RATE;

    let explicit_base = member
        .payroll_settings
        .as_ref()
        .and_then(|s| s.base_salary)
        .filter(|b| *b != 0.0);

    let base_salary = match explicit_base {
        Some(base) => base,
        None if member.role == MemberRole::Chatter => {
            if net_sales >= CHATTER_NET_THRESHOLD {
                CHATTER_BASE_HIGH
            } else {
                CHATTER_BASE_LOW
            }
        }
        None => 0.0,
    };

    let commission_percentage = member
        .payroll_settings
        .as_ref()
        .and_then(|s| s.commission_percentage)
        .unwrap_or(DEFAULT_COMMISSION_PERCENTAGE);
    let commission = net_sales * commission_percentage / 100.0;

    let bonus_total: f64 = member.bonuses.iter().map(|b| b.amount).sum();

    PayrollRow {
        net_sales,
        base_salary,
        commission,
        bonus_total,
        total_pay: base_salary + commission + bonus_total,
    }
}

/// Build table rows in roster order.
pub fn build_rows(roster: &[RosterMember]) -> Vec<ComputedRow> {
    roster
        .iter()
        .map(|member| {
            let pay = compute_row(member);
            ComputedRow {
                member_id: member.id,
                full_name: member.full_name.clone(),
                role: member.role,
                gross_sales: member.total_valid_sales,
                net_sales: pay.net_sales,
                base_salary: pay.base_salary,
                commission: pay.commission,
                bonus_total: pay.bonus_total,
                total_pay: pay.total_pay,
                bonuses: member.bonuses.clone(),
            }
        })
        .collect()
}

/// Keep rows matching the filter, preserving relative order.
pub fn filter_by_role(mut rows: Vec<ComputedRow>, filter: RoleFilter) -> Vec<ComputedRow> {
    if let RoleFilter::Only(role) = filter {
        rows.retain(|row| row.role == role);
    }
    rows
}

/// Full comparator sort on the selected column. With no column selected the
/// rows keep roster order untouched (stable, unsorted by definition).
pub fn sort_rows(rows: &mut [ComputedRow], sort: SortState) {
    let Some(column) = sort.column else {
        return;
    };

    let key = |row: &ComputedRow| match column {
        SortColumn::NetSales => row.net_sales,
        SortColumn::TotalPay => row.total_pay,
    };

    rows.sort_unstable_by(|a, b| {
        let ord = key(a).total_cmp(&key(b));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Component-wise summation over the given rows.
pub fn aggregate(rows: &[ComputedRow]) -> PayrollTotals {
    rows.iter().fold(
        PayrollTotals {
            base_salary: 0.0,
            commission: 0.0,
            bonuses: 0.0,
            net_sales: 0.0,
            total: 0.0,
        },
        |mut totals, row| {
            totals.base_salary += row.base_salary;
            totals.commission += row.commission;
            totals.bonuses += row.bonus_total;
            totals.net_sales += row.net_sales;
            totals.total += row.total_pay;
            totals
        },
    )
}

/// Pre-call validation for the add-bonus mutation.
pub fn validate_bonus(member_ids: &[u64], amount: f64, reason: &str) -> Result<(), PayrollError> {
    if member_ids.is_empty() {
        return Err(PayrollError::validation("At least one member must be selected"));
    }
    if amount <= 0.0 {
        return Err(PayrollError::validation("Bonus amount must be greater than zero"));
    }
    if reason.trim().is_empty() {
        return Err(PayrollError::validation("Bonus reason must not be blank"));
    }
    Ok(())
}

/// Pre-call validation for the settings-edit mutation.
pub fn validate_settings(
    base_salary: Option<f64>,
    commission_percentage: Option<f64>,
) -> Result<(), PayrollError> {
    if let Some(base) = base_salary {
        if base < 0.0 {
            return Err(PayrollError::validation("Base salary must not be negative"));
        }
    }
    if let Some(pct) = commission_percentage {
        if !(0.0..=100.0).contains(&pct) {
            return Err(PayrollError::validation(
                "Commission percentage must be between 0 and 100",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll_settings::PayrollSettings;

    fn member(role: MemberRole, gross: f64) -> RosterMember {
        RosterMember {
            id: 1,
            full_name: "Test Member".into(),
            email: "test@agency.com".into(),
            role,
            total_valid_sales: gross,
            payroll_settings: None,
            bonuses: Vec::new(),
        }
    }

    fn with_settings(
        mut m: RosterMember,
        base_salary: Option<f64>,
        commission_percentage: Option<f64>,
    ) -> RosterMember {
        m.payroll_settings = Some(PayrollSettings {
            base_salary,
            commission_percentage,
        });
        m
    }

    fn bonus(id: u64, amount: f64) -> BonusLine {
        BonusLine {
            id,
            amount,
            reason: "test".into(),
            bonus_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            created_by_name: None,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn chatter_at_net_threshold_gets_high_base() {
        let row = compute_row(&member(MemberRole::Chatter, 10_000.0));
        assert_close(row.net_sales, 8_000.0);
        assert_close(row.base_salary, CHATTER_BASE_HIGH);
    }

    #[test]
    fn chatter_just_below_threshold_gets_low_base() {
        // 9999.99 gross -> 7999.992 net, below the 8000 net boundary
        let row = compute_row(&member(MemberRole::Chatter, 9_999.99));
        assert!(row.net_sales < CHATTER_NET_THRESHOLD);
        assert_close(row.base_salary, CHATTER_BASE_LOW);
    }

    #[test]
    fn non_chatter_without_explicit_base_gets_zero() {
        for role in [MemberRole::Owner, MemberRole::Admin, MemberRole::Manager] {
            let row = compute_row(&member(role, 50_000.0));
            assert_close(row.base_salary, 0.0);
        }
    }

    #[test]
    fn default_commission_is_two_and_a_half_percent_of_net() {
        let row = compute_row(&member(MemberRole::Manager, 1_250.0));
        assert_close(row.net_sales, 1_000.0);
        assert_close(row.commission, 25.0);
    }

    #[test]
    fn explicit_settings_override_auto_calculation() {
        let m = with_settings(member(MemberRole::Chatter, 12_500.0), Some(100.0), Some(50.0));
        let row = compute_row(&m);
        assert_close(row.base_salary, 100.0);
        assert_close(row.commission, 10_000.0 * 0.5);
    }

    #[test]
    fn zero_base_salary_means_auto_calculation() {
        let m = with_settings(member(MemberRole::Chatter, 12_500.0), Some(0.0), None);
        let row = compute_row(&m);
        assert_close(row.base_salary, CHATTER_BASE_HIGH);
    }

    #[test]
    fn settings_with_no_commission_fall_back_to_default() {
        let m = with_settings(member(MemberRole::Manager, 1_250.0), Some(300.0), None);
        let row = compute_row(&m);
        assert_close(row.commission, 25.0);
        assert_close(row.total_pay, 325.0);
    }

    #[test]
    fn negative_inputs_do_not_panic() {
        let row = compute_row(&member(MemberRole::Chatter, -1_000.0));
        assert!(row.net_sales < 0.0);
        assert_close(row.base_salary, CHATTER_BASE_LOW);
    }

    #[test]
    fn chatter_scenario_with_bonus() {
        let mut m = member(MemberRole::Chatter, 12_500.0);
        m.bonuses.push(bonus(1, 100.0));
        let row = compute_row(&m);
        assert_close(row.net_sales, 10_000.0);
        assert_close(row.base_salary, 450.0);
        assert_close(row.commission, 250.0);
        assert_close(row.bonus_total, 100.0);
        assert_close(row.total_pay, 800.0);
    }

    fn sample_rows() -> Vec<ComputedRow> {
        let mut roster = vec![
            member(MemberRole::Chatter, 12_500.0),
            member(MemberRole::Manager, 4_000.0),
            member(MemberRole::Chatter, 9_000.0),
            member(MemberRole::Admin, 20_000.0),
        ];
        for (i, m) in roster.iter_mut().enumerate() {
            m.id = (i + 1) as u64;
            m.full_name = format!("Member {}", i + 1);
        }
        roster[0].bonuses.push(bonus(1, 100.0));
        roster[2].bonuses.push(bonus(2, 40.0));
        build_rows(&roster)
    }

    #[test]
    fn aggregate_matches_row_sums_under_every_filter_and_sort() {
        let filters = [
            RoleFilter::All,
            RoleFilter::Only(MemberRole::Chatter),
            RoleFilter::Only(MemberRole::Manager),
            RoleFilter::Only(MemberRole::Owner),
        ];
        let sorts = [
            SortState::default(),
            SortState::new(Some(SortColumn::NetSales), SortDirection::Asc),
            SortState::new(Some(SortColumn::NetSales), SortDirection::Desc),
            SortState::new(Some(SortColumn::TotalPay), SortDirection::Asc),
            SortState::new(Some(SortColumn::TotalPay), SortDirection::Desc),
        ];

        for filter in filters {
            for sort in sorts {
                let mut rows = filter_by_role(sample_rows(), filter);
                sort_rows(&mut rows, sort);

                let totals = aggregate(&rows);
                let expected: f64 = rows.iter().map(|r| r.total_pay).sum();
                assert_close(totals.total, expected);
                assert_close(
                    totals.total,
                    totals.base_salary + totals.commission + totals.bonuses,
                );
            }
        }
    }

    #[test]
    fn filter_preserves_relative_order() {
        let rows = filter_by_role(sample_rows(), RoleFilter::Only(MemberRole::Chatter));
        let ids: Vec<u64> = rows.iter().map(|r| r.member_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn filter_all_is_identity() {
        let rows = filter_by_role(sample_rows(), RoleFilter::All);
        assert_eq!(rows.len(), 4);
        let ids: Vec<u64> = rows.iter().map(|r| r.member_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn asc_and_desc_sorts_are_exact_reverses_without_ties() {
        let mut asc = sample_rows();
        sort_rows(
            &mut asc,
            SortState::new(Some(SortColumn::NetSales), SortDirection::Asc),
        );
        let mut desc = sample_rows();
        sort_rows(
            &mut desc,
            SortState::new(Some(SortColumn::NetSales), SortDirection::Desc),
        );

        let asc_ids: Vec<u64> = asc.iter().map(|r| r.member_id).collect();
        let mut desc_ids: Vec<u64> = desc.iter().map(|r| r.member_id).collect();
        desc_ids.reverse();
        assert_eq!(asc_ids, desc_ids);

        for pair in asc.windows(2) {
            assert!(pair[0].net_sales <= pair[1].net_sales);
        }
    }

    #[test]
    fn no_sort_column_preserves_roster_order() {
        let mut rows = sample_rows();
        sort_rows(&mut rows, SortState::default());
        let ids: Vec<u64> = rows.iter().map(|r| r.member_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sort_cycle_runs_desc_asc_cleared() {
        let mut state = SortState::default();

        state.click(SortColumn::NetSales);
        assert_eq!(state.column, Some(SortColumn::NetSales));
        assert_eq!(state.direction, SortDirection::Desc);

        state.click(SortColumn::NetSales);
        assert_eq!(state.direction, SortDirection::Asc);

        state.click(SortColumn::NetSales);
        assert_eq!(state.column, None);
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn clicking_a_different_column_starts_descending() {
        let mut state = SortState::default();
        state.click(SortColumn::NetSales);
        state.click(SortColumn::NetSales); // now asc
        state.click(SortColumn::TotalPay);
        assert_eq!(state.column, Some(SortColumn::TotalPay));
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn bonus_validation_rejects_bad_input() {
        assert!(matches!(
            validate_bonus(&[], 50.0, "x"),
            Err(PayrollError::Validation(_))
        ));
        assert!(matches!(
            validate_bonus(&[1], 0.0, "x"),
            Err(PayrollError::Validation(_))
        ));
        assert!(matches!(
            validate_bonus(&[1], 50.0, "  "),
            Err(PayrollError::Validation(_))
        ));
        assert!(validate_bonus(&[1], 50.0, "great month").is_ok());
    }

    #[test]
    fn settings_validation_enforces_ranges() {
        assert!(matches!(
            validate_settings(Some(-1.0), Some(5.0)),
            Err(PayrollError::Validation(_))
        ));
        assert!(matches!(
            validate_settings(Some(100.0), Some(150.0)),
            Err(PayrollError::Validation(_))
        ));
        assert!(validate_settings(Some(100.0), Some(50.0)).is_ok());
        assert!(validate_settings(None, None).is_ok());
    }

    #[test]
    fn role_filter_parses_all_and_known_roles() {
        assert_eq!(RoleFilter::parse("all"), Some(RoleFilter::All));
        assert_eq!(
            RoleFilter::parse("chatter"),
            Some(RoleFilter::Only(MemberRole::Chatter))
        );
        assert_eq!(RoleFilter::parse("intern"), None);
    }
}
