use serde::Serialize;
use tracing::debug;

use super::aggregate::{aggregate_by_year, compute_completeness, compute_summary};
use super::buffer::calculate_buffer_suggestions;
use super::catalog::Catalog;
use super::engine::{amortize, calculate_baseline, has_required_data};
use super::milestones::detect_milestones;
use super::resolver::{ResolveIssue, resolve_rate_periods};
use super::types::{
    AmortizationMonth, AmortizationYear, BufferSuggestion, Milestone, ResolvedRatePeriod,
    SimulationCompleteness, SimulationState, SimulationSummary, SimulationWarning,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub resolved_periods: Vec<ResolvedRatePeriod>,
    pub resolve_issues: Vec<ResolveIssue>,
    pub months: Vec<AmortizationMonth>,
    pub baseline_months: Vec<AmortizationMonth>,
    pub warnings: Vec<SimulationWarning>,
    pub years: Vec<AmortizationYear>,
    pub milestones: Vec<Milestone>,
    pub summary: SimulationSummary,
    pub completeness: SimulationCompleteness,
    pub buffer_suggestions: Vec<BufferSuggestion>,
}

/// Recomputes every derived output from the input state and catalog.
pub fn simulate(state: &SimulationState, catalog: &Catalog) -> SimulationResult {
    let resolution = resolve_rate_periods(&state.rate_periods, catalog);
    let periods = resolution.periods;

    let (months, warnings, baseline_months) = if has_required_data(state) {
        let result = amortize(
            &state.input,
            state.self_build.as_ref(),
            &periods,
            &state.overpayment_configs,
            catalog,
        );
        let baseline = calculate_baseline(state, &periods, catalog);
        (result.months, result.warnings, baseline)
    } else {
        (Vec::new(), Vec::new(), Vec::new())
    };

    let years = aggregate_by_year(&months);
    let milestones = detect_milestones(&months, &state.input);
    let summary = compute_summary(&months, &baseline_months);
    let completeness = compute_completeness(&periods, state.input.mortgage_term_months);
    let buffer_suggestions = calculate_buffer_suggestions(state, catalog, &periods, &months);

    debug!(
        months = months.len(),
        months_saved = summary.months_saved,
        warnings = warnings.len(),
        issues = resolution.issues.len(),
        "simulation complete"
    );

    SimulationResult {
        resolved_periods: periods,
        resolve_issues: resolution.issues,
        months,
        baseline_months,
        warnings,
        years,
        milestones,
        summary,
        completeness,
        buffer_suggestions,
    }
}
