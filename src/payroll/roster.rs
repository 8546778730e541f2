use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::bonus::BonusLine;
use crate::model::member::{RosterMember, TeamMember};
use crate::model::payroll_settings::PayrollSettings;
use crate::payroll::error::PayrollError;
use crate::utils::member_cache;

/// Half-open [first of month, first of next month) date range for a period.
/// None when month is outside 1-12.
pub fn period_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

type SalesTotal = (u64, f64);
type SettingsRow = (u64, Option<f64>, Option<f64>);
type BonusRow = (u64, u64, f64, String, NaiveDate, Option<u64>);

/// Load the agency roster hydrated for one period: validated sales totals,
/// payroll settings, and the period's bonuses annotated with creator names.
///
/// A bonus belongs to the calendar month of its bonus_date; a bonus dated
/// outside the selected month is not part of this roster.
pub async fn fetch_roster(
    pool: &MySqlPool,
    agency_id: u64,
    month: u32,
    year: i32,
) -> Result<Vec<RosterMember>, PayrollError> {
    let (start, end) = period_bounds(month, year)
        .ok_or_else(|| PayrollError::validation("month must be between 1 and 12"))?;

    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT id, agency_id, full_name, email, role, status, created_at
        FROM team_members
        WHERE agency_id = ? AND status = 'active'
        ORDER BY id
        "#,
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    let sales = sqlx::query_as::<_, SalesTotal>(
        r#"
        SELECT s.member_id, COALESCE(SUM(s.amount), 0)
        FROM sales s
        JOIN team_members m ON m.id = s.member_id
        WHERE m.agency_id = ?
          AND s.status = 'validated'
          AND s.sale_date >= ? AND s.sale_date < ?
        GROUP BY s.member_id
        "#,
    )
    .bind(agency_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let settings = sqlx::query_as::<_, SettingsRow>(
        r#"
        SELECT ps.member_id, ps.base_salary, ps.commission_percentage
        FROM payroll_settings ps
        JOIN team_members m ON m.id = ps.member_id
        WHERE m.agency_id = ?
        "#,
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    let bonus_rows = sqlx::query_as::<_, BonusRow>(
        r#"
        SELECT b.id, b.member_id, b.amount, b.reason, b.bonus_date, b.created_by
        FROM bonuses b
        JOIN team_members m ON m.id = b.member_id
        WHERE m.agency_id = ?
          AND b.bonus_date >= ? AND b.bonus_date < ?
        ORDER BY b.bonus_date, b.id
        "#,
    )
    .bind(agency_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let mut bonuses = Vec::with_capacity(bonus_rows.len());
    for (id, member_id, amount, reason, bonus_date, created_by) in bonus_rows {
        let created_by_name = match created_by {
            Some(creator_id) => member_cache::display_name(pool, creator_id).await,
            None => None,
        };
        bonuses.push((
            member_id,
            BonusLine {
                id,
                amount,
                reason,
                bonus_date,
                created_by_name,
            },
        ));
    }

    Ok(assemble_roster(members, sales, settings, bonuses))
}

/// Join the four result sets in member order. Pure, so the shape of the
/// hydrated roster is testable without a database.
fn assemble_roster(
    members: Vec<TeamMember>,
    sales: Vec<SalesTotal>,
    settings: Vec<SettingsRow>,
    bonuses: Vec<(u64, BonusLine)>,
) -> Vec<RosterMember> {
    let sales_by_member: HashMap<u64, f64> = sales.into_iter().collect();

    let settings_by_member: HashMap<u64, PayrollSettings> = settings
        .into_iter()
        .map(|(member_id, base_salary, commission_percentage)| {
            (
                member_id,
                PayrollSettings {
                    base_salary,
                    commission_percentage,
                },
            )
        })
        .collect();

    let mut bonuses_by_member: HashMap<u64, Vec<BonusLine>> = HashMap::new();
    for (member_id, line) in bonuses {
        bonuses_by_member.entry(member_id).or_default().push(line);
    }

    members
        .into_iter()
        .map(|m| RosterMember {
            total_valid_sales: sales_by_member.get(&m.id).copied().unwrap_or(0.0),
            payroll_settings: settings_by_member.get(&m.id).cloned(),
            bonuses: bonuses_by_member.remove(&m.id).unwrap_or_default(),
            id: m.id,
            full_name: m.full_name,
            email: m.email,
            role: m.role,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::MemberRole;

    #[test]
    fn period_bounds_cover_a_regular_month() {
        let (start, end) = period_bounds(4, 2026).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
    }

    #[test]
    fn period_bounds_roll_december_into_next_year() {
        let (start, end) = period_bounds(12, 2025).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn period_bounds_reject_invalid_months() {
        assert!(period_bounds(0, 2026).is_none());
        assert!(period_bounds(13, 2026).is_none());
    }

    fn db_member(id: u64, role: MemberRole) -> TeamMember {
        TeamMember {
            id,
            agency_id: 1,
            full_name: format!("Member {id}"),
            email: format!("m{id}@agency.com"),
            role,
            status: Some("active".into()),
            created_at: None,
        }
    }

    fn line(id: u64, amount: f64) -> BonusLine {
        BonusLine {
            id,
            amount,
            reason: "test".into(),
            bonus_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            created_by_name: Some("Jane Admin".into()),
        }
    }

    #[test]
    fn assembly_joins_per_member_and_defaults_missing_data() {
        let members = vec![
            db_member(1, MemberRole::Chatter),
            db_member(2, MemberRole::Manager),
        ];
        let sales = vec![(1, 12_500.0)];
        let settings = vec![(2, Some(900.0), Some(5.0))];
        let bonuses = vec![(1, line(10, 100.0)), (1, line(11, 40.0))];

        let roster = assemble_roster(members, sales, settings, bonuses);
        assert_eq!(roster.len(), 2);

        assert_eq!(roster[0].total_valid_sales, 12_500.0);
        assert!(roster[0].payroll_settings.is_none());
        assert_eq!(roster[0].bonuses.len(), 2);

        assert_eq!(roster[1].total_valid_sales, 0.0);
        let s = roster[1].payroll_settings.as_ref().unwrap();
        assert_eq!(s.base_salary, Some(900.0));
        assert_eq!(s.commission_percentage, Some(5.0));
        assert!(roster[1].bonuses.is_empty());
    }

    #[test]
    fn assembly_preserves_member_order() {
        let members = vec![
            db_member(3, MemberRole::Chatter),
            db_member(1, MemberRole::Chatter),
            db_member(2, MemberRole::Admin),
        ];
        let roster = assemble_roster(members, vec![], vec![], vec![]);
        let ids: Vec<u64> = roster.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
