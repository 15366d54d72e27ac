use chrono::Datelike;

use super::types::{
    AmortizationMonth, AmortizationYear, Cents, MortgagePhase, ResolvedRatePeriod,
    SimulationCompleteness, SimulationSummary,
};

fn year_key(month: &AmortizationMonth) -> u32 {
    match month.date {
        Some(date) => date.year().max(0) as u32,
        None => month.year,
    }
}

/// Calendar years for dated schedules, otherwise consecutive 12-month mortgage years.
pub fn aggregate_by_year(months: &[AmortizationMonth]) -> Vec<AmortizationYear> {
    let mut years: Vec<AmortizationYear> = Vec::new();

    for month in months {
        let key = year_key(month);
        let starts_new = years.last().is_none_or(|y| y.year != key);
        if starts_new {
            years.push(AmortizationYear {
                year: key,
                opening_balance: month.opening_balance,
                closing_balance: month.closing_balance,
                total_interest: 0,
                total_principal: 0,
                total_overpayment: 0,
                total_payment: 0,
                month_count: 0,
                rate_changes: Vec::new(),
                has_rate_change: false,
            });
        }
        let Some(year) = years.last_mut() else {
            continue;
        };

        year.closing_balance = month.closing_balance;
        year.total_interest += month.interest_portion;
        year.total_principal += month.principal_portion;
        year.total_overpayment += month.overpayment;
        year.total_payment += month.total_payment;
        year.month_count += 1;
        if !year.rate_changes.contains(&month.rate_period_id) {
            year.rate_changes.push(month.rate_period_id.clone());
        }
        year.has_rate_change = year.rate_changes.len() > 1;
    }

    years
}

pub fn compute_summary(
    months: &[AmortizationMonth],
    baseline_months: &[AmortizationMonth],
) -> SimulationSummary {
    let final_interest =
        |schedule: &[AmortizationMonth]| schedule.last().map_or(0, |m| m.cumulative_interest);

    let extra_interest_from_self_build = months.iter().any(|m| m.phase.is_some()).then(|| {
        months
            .iter()
            .filter(|m| m.phase.is_some_and(|p| p != MortgagePhase::Repayment))
            .map(|m| m.interest_portion)
            .sum::<Cents>()
    });

    SimulationSummary {
        total_interest: final_interest(months),
        total_paid: months.last().map_or(0, |m| m.cumulative_total),
        actual_term_months: months.len() as u32,
        months_saved: baseline_months.len().saturating_sub(months.len()) as u32,
        interest_saved: (final_interest(baseline_months) - final_interest(months)).max(0),
        extra_interest_from_self_build,
    }
}

pub fn compute_completeness(
    periods: &[ResolvedRatePeriod],
    total_months: u32,
) -> SimulationCompleteness {
    let covered_months: i64 = match periods.last() {
        Some(last) if last.is_open_ended() => -1,
        _ => periods.iter().map(|p| i64::from(p.duration_months)).sum(),
    };
    let is_complete = covered_months == -1 || covered_months >= i64::from(total_months);
    let missing_months = if is_complete {
        0
    } else {
        (i64::from(total_months) - covered_months) as u32
    };

    SimulationCompleteness {
        covered_months,
        total_months,
        is_complete,
        missing_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RateType;
    use chrono::NaiveDate;

    fn month(n: u32, period: &str, interest: Cents, principal: Cents) -> AmortizationMonth {
        AmortizationMonth {
            month: n,
            year: (n - 1) / 12 + 1,
            month_of_year: (n - 1) % 12 + 1,
            date: None,
            opening_balance: 10_000 - (n as Cents - 1) * principal,
            closing_balance: 10_000 - n as Cents * principal,
            scheduled_payment: interest + principal,
            interest_portion: interest,
            principal_portion: principal,
            overpayment: 0,
            total_payment: interest + principal,
            rate: 3.0,
            rate_period_id: period.to_string(),
            cumulative_interest: interest * n as Cents,
            cumulative_principal: principal * n as Cents,
            cumulative_overpayments: 0,
            cumulative_total: (interest + principal) * n as Cents,
            phase: None,
        }
    }

    fn schedule(count: u32) -> Vec<AmortizationMonth> {
        (1..=count)
            .map(|n| month(n, if n <= 18 { "p1" } else { "p2" }, 10, 100))
            .collect()
    }

    fn resolved(id: &str, start: u32, duration: u32) -> ResolvedRatePeriod {
        ResolvedRatePeriod {
            id: id.to_string(),
            lender_id: "aib".to_string(),
            rate_id: "r".to_string(),
            is_custom: false,
            label: None,
            rate: 3.0,
            rate_type: RateType::Fixed,
            fixed_term: None,
            overpayment_policy_id: None,
            lender_name: "AIB".to_string(),
            rate_name: "r".to_string(),
            start_month: start,
            duration_months: duration,
        }
    }

    #[test]
    fn mortgage_years_group_twelve_months_with_partial_tail() {
        let years = aggregate_by_year(&schedule(30));

        assert_eq!(years.len(), 3);
        assert_eq!(
            years.iter().map(|y| y.month_count).collect::<Vec<_>>(),
            vec![12, 12, 6]
        );
        assert_eq!(years[0].opening_balance, 10_000);
        assert_eq!(years[0].closing_balance, 10_000 - 1_200);
        assert_eq!(years[1].opening_balance, years[0].closing_balance);
        assert_eq!(years[0].total_interest, 120);
        assert_eq!(years[0].total_payment, 1_320);
        assert_eq!(years[1].rate_changes, vec!["p1".to_string(), "p2".to_string()]);
        assert!(years[1].has_rate_change);
        assert!(!years[2].has_rate_change);
    }

    #[test]
    fn dated_schedules_group_by_calendar_year() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).expect("date");
        let mut months = schedule(15);
        for m in &mut months {
            m.date = start.checked_add_months(chrono::Months::new(m.month - 1));
        }
        let years = aggregate_by_year(&months);

        assert_eq!(
            years.iter().map(|y| (y.year, y.month_count)).collect::<Vec<_>>(),
            vec![(2025, 3), (2026, 12)]
        );
    }

    #[test]
    fn summary_compares_against_baseline() {
        let baseline = schedule(30);
        let actual = schedule(24);
        let summary = compute_summary(&actual, &baseline);

        assert_eq!(summary.actual_term_months, 24);
        assert_eq!(summary.months_saved, 6);
        assert_eq!(summary.total_interest, 240);
        assert_eq!(summary.interest_saved, 60);
        assert_eq!(summary.total_paid, 110 * 24);
        assert_eq!(summary.extra_interest_from_self_build, None);
    }

    #[test]
    fn summary_never_reports_negative_savings() {
        let summary = compute_summary(&schedule(30), &schedule(12));
        assert_eq!(summary.months_saved, 0);
        assert_eq!(summary.interest_saved, 0);

        let empty = compute_summary(&[], &[]);
        assert_eq!(empty.total_interest, 0);
        assert_eq!(empty.months_saved, 0);
    }

    #[test]
    fn self_build_interest_is_reported() {
        let mut months = schedule(12);
        for m in &mut months {
            m.phase = Some(if m.month <= 4 {
                MortgagePhase::Construction
            } else {
                MortgagePhase::Repayment
            });
        }
        let summary = compute_summary(&months, &months);
        assert_eq!(summary.extra_interest_from_self_build, Some(40));
    }

    #[test]
    fn completeness_from_resolved_periods() {
        let open = compute_completeness(&[resolved("a", 1, 36), resolved("b", 37, 0)], 300);
        assert_eq!(open.covered_months, -1);
        assert!(open.is_complete);
        assert_eq!(open.missing_months, 0);

        let short = compute_completeness(&[resolved("a", 1, 36), resolved("b", 37, 60)], 300);
        assert_eq!(short.covered_months, 96);
        assert!(!short.is_complete);
        assert_eq!(short.missing_months, 204);

        let exact = compute_completeness(&[resolved("a", 1, 300)], 300);
        assert!(exact.is_complete);

        let none = compute_completeness(&[], 300);
        assert!(!none.is_complete);
        assert_eq!(none.missing_months, 300);
    }
}
