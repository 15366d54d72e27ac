use chrono::{Months, NaiveDate};
use tracing::{debug, trace};

use super::allowance::{AllowanceYear, check_allowance, format_currency, is_monthly_basis};
use super::catalog::Catalog;
use super::overpayment::{OverpaymentRequest, overpayment_for_month};
use super::resolver::{active_period_index, resolve_rate_periods};
use super::types::{
    AmortizationMonth, Cents, ConstructionRepaymentType, MortgageInput, MortgagePhase,
    OverpaymentConfig, RateType, ResolvedRatePeriod, SelfBuildConfig, SimulationState,
    SimulationWarning, WarningSeverity, WarningType,
};

/// Upper bound on the up-front schedule allocation; longer terms grow on demand.
const MAX_SCHEDULE_HINT: u32 = 600;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmortizationResult {
    pub months: Vec<AmortizationMonth>,
    pub warnings: Vec<SimulationWarning>,
}

#[derive(Debug, Clone, Copy, Default)]
struct CumulativeTotals {
    interest: Cents,
    principal: Cents,
    overpayments: Cents,
    total: Cents,
}

impl CumulativeTotals {
    fn add(&mut self, interest: Cents, principal: Cents, overpayment: Cents) {
        self.interest += interest;
        self.principal += principal;
        self.overpayments += overpayment;
        self.total += interest + principal + overpayment;
    }
}

/// Callers gate on this before simulating; the engine itself degrades to an empty schedule.
pub fn has_required_data(state: &SimulationState) -> bool {
    state.input.mortgage_amount > 0
        && state.input.mortgage_term_months > 0
        && !state.rate_periods.is_empty()
}

/// Rounds to the nearest cent, halves away from zero.
pub fn round_cents(value: f64) -> Cents {
    value.round() as Cents
}

pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Level payment that clears `balance` over `remaining_months` at `annual_rate_percent`.
pub fn annuity_payment(balance: Cents, annual_rate_percent: f64, remaining_months: u32) -> Cents {
    if balance <= 0 {
        return 0;
    }
    let n = remaining_months.max(1) as f64;
    let r = monthly_rate(annual_rate_percent);
    if r.abs() < 1e-12 {
        return round_cents(balance as f64 / n);
    }
    round_cents(balance as f64 * r / (1.0 - (1.0 + r).powf(-n)))
}

pub fn month_date(start_date: Option<NaiveDate>, month: u32) -> Option<NaiveDate> {
    start_date.and_then(|start| start.checked_add_months(Months::new(month - 1)))
}

fn phase_for(self_build: &SelfBuildConfig, month: u32) -> MortgagePhase {
    let Some(final_drawdown) = self_build.final_drawdown_month() else {
        return MortgagePhase::Repayment;
    };
    if month <= final_drawdown {
        MortgagePhase::Construction
    } else if month <= final_drawdown + self_build.interest_only_months {
        MortgagePhase::InterestOnly
    } else {
        MortgagePhase::Repayment
    }
}

fn is_interest_only(self_build: Option<&SelfBuildConfig>, phase: Option<MortgagePhase>) -> bool {
    match (self_build, phase) {
        (_, Some(MortgagePhase::InterestOnly)) => true,
        (Some(sb), Some(MortgagePhase::Construction)) => {
            sb.construction_repayment_type == ConstructionRepaymentType::InterestOnly
        }
        _ => false,
    }
}

/// Month-by-month schedule with overpayments applied.
pub fn calculate_amortization(state: &SimulationState, catalog: &Catalog) -> AmortizationResult {
    let periods = resolve_rate_periods(&state.rate_periods, catalog).periods;
    amortize(
        &state.input,
        state.self_build.as_ref(),
        &periods,
        &state.overpayment_configs,
        catalog,
    )
}

/// Same simulation with every overpayment removed, run over the full term.
pub fn calculate_baseline(
    state: &SimulationState,
    periods: &[ResolvedRatePeriod],
    catalog: &Catalog,
) -> Vec<AmortizationMonth> {
    amortize(&state.input, state.self_build.as_ref(), periods, &[], catalog).months
}

pub fn amortize(
    input: &MortgageInput,
    self_build: Option<&SelfBuildConfig>,
    periods: &[ResolvedRatePeriod],
    overpayments: &[OverpaymentConfig],
    catalog: &Catalog,
) -> AmortizationResult {
    let term = input.mortgage_term_months;
    if input.mortgage_amount <= 0 || term == 0 || periods.is_empty() {
        return AmortizationResult::default();
    }

    let mut balance: Cents = if self_build.is_some() {
        0
    } else {
        input.mortgage_amount
    };
    let mut scheduled_payment: Cents = 0;
    let mut active_index: Option<usize> = None;
    let mut last_phase: Option<MortgagePhase> = None;
    let mut recalc_pending = false;
    let mut allowance_year = AllowanceYear::default();
    let mut totals = CumulativeTotals::default();
    let mut result = AmortizationResult {
        months: Vec::with_capacity(term.min(MAX_SCHEDULE_HINT) as usize),
        warnings: Vec::new(),
    };

    for month in 1..=term {
        let drawdown = self_build.map_or(0, |sb| sb.drawdown_for(month));
        balance += drawdown;
        let drawdowns_pending = self_build
            .and_then(SelfBuildConfig::final_drawdown_month)
            .is_some_and(|last| last > month);
        if balance <= 0 && !drawdowns_pending {
            break;
        }

        let Some(period_index) = active_period_index(periods, month) else {
            break;
        };
        let period = &periods[period_index];
        let date = month_date(input.start_date, month);
        let remaining_months = term - (month - 1);
        let phase = self_build.map(|sb| phase_for(sb, month));
        let interest_only = is_interest_only(self_build, phase);

        let entered_repayment =
            phase == Some(MortgagePhase::Repayment) && last_phase != Some(MortgagePhase::Repayment);
        if active_index != Some(period_index) || recalc_pending || drawdown > 0 || entered_repayment
        {
            scheduled_payment = annuity_payment(balance, period.rate, remaining_months);
            recalc_pending = false;
        }

        let opening_balance = balance;
        let interest = round_cents(opening_balance as f64 * monthly_rate(period.rate)).max(0);
        let (payment, principal) = if interest_only {
            (interest, 0)
        } else if month == term {
            (interest + opening_balance, opening_balance)
        } else {
            let principal = (scheduled_payment - interest).clamp(0, opening_balance);
            (scheduled_payment, principal)
        };

        allowance_year.roll(month, date, opening_balance);
        let request = overpayment_for_month(overpayments, periods, month);
        let overpayment = request.total().min(opening_balance - principal).max(0);

        if overpayment > 0 {
            if request.reduces_payment() && period.rate_type == RateType::Variable {
                recalc_pending = true;
            }
            if period.rate_type == RateType::Fixed {
                check_period_allowance(
                    period,
                    catalog,
                    &request,
                    overpayment,
                    payment,
                    month,
                    &mut allowance_year,
                    &mut result.warnings,
                );
            }
        }

        let closing_balance = opening_balance - principal - overpayment;
        totals.add(interest, principal, overpayment);

        result.months.push(AmortizationMonth {
            month,
            year: (month - 1) / 12 + 1,
            month_of_year: (month - 1) % 12 + 1,
            date,
            opening_balance,
            closing_balance,
            scheduled_payment: payment,
            interest_portion: interest,
            principal_portion: principal,
            overpayment,
            total_payment: interest + principal + overpayment,
            rate: period.rate,
            rate_period_id: period.id.clone(),
            cumulative_interest: totals.interest,
            cumulative_principal: totals.principal,
            cumulative_overpayments: totals.overpayments,
            cumulative_total: totals.total,
            phase,
        });

        balance = closing_balance;
        active_index = Some(period_index);
        last_phase = phase;

        if balance <= 0 && !drawdowns_pending {
            if month < term {
                debug!(month, term, "mortgage cleared early");
            }
            break;
        }
    }

    result
}

#[allow(clippy::too_many_arguments)]
fn check_period_allowance(
    period: &ResolvedRatePeriod,
    catalog: &Catalog,
    request: &OverpaymentRequest<'_>,
    overpayment: Cents,
    monthly_payment: Cents,
    month: u32,
    allowance_year: &mut AllowanceYear,
    warnings: &mut Vec<SimulationWarning>,
) {
    let Some(policy) = period
        .overpayment_policy_id
        .as_deref()
        .and_then(|id| catalog.find_policy(id))
    else {
        return;
    };

    let check = check_allowance(
        Some(policy),
        overpayment,
        allowance_year.year_to_date(),
        allowance_year.year_start_balance(),
        monthly_payment,
    );
    allowance_year.record(overpayment);
    if !check.exceeded {
        return;
    }

    let message = if is_monthly_basis(policy) {
        format!(
            "Overpayment of {} exceeds the {} monthly fee-free allowance",
            format_currency(overpayment),
            format_currency(check.allowance_amount)
        )
    } else {
        format!(
            "Overpayments of {} this year exceed the {} fee-free allowance",
            format_currency(allowance_year.year_to_date()),
            format_currency(check.allowance_amount)
        )
    };
    trace!(month, policy = %policy.id, "overpayment allowance exceeded");

    for contribution in &request.contributions {
        warnings.push(SimulationWarning {
            kind: WarningType::AllowanceExceeded,
            month,
            config_id: contribution.config.id.clone(),
            message: message.clone(),
            severity: WarningSeverity::Warning,
            overpayment_label: contribution.config.display_label(),
        });
    }
}
