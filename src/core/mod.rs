mod aggregate;
mod allowance;
mod buffer;
mod catalog;
mod engine;
mod milestones;
mod overpayment;
mod resolver;
mod simulation;
mod types;

pub use aggregate::{aggregate_by_year, compute_completeness, compute_summary};
pub use allowance::{AllowanceCheck, allowance_amount, check_allowance, format_currency};
pub use buffer::calculate_buffer_suggestions;
pub use catalog::{Catalog, Lender, MortgageRate, OverpaymentPolicy};
pub use engine::{
    AmortizationResult, annuity_payment, calculate_amortization, calculate_baseline,
    has_required_data,
};
pub use milestones::detect_milestones;
pub use overpayment::{OverpaymentRequest, overpayment_for_month};
pub use resolver::{RateResolution, ResolveIssue, resolve_rate_periods};
pub use simulation::{SimulationResult, simulate};
pub use types::{
    AllowanceBasis, AllowanceType, AmortizationMonth, AmortizationYear, BufferSuggestion, Cents,
    ConstructionRepaymentType, DrawdownStage, Milestone, MilestoneType, MortgageInput,
    MortgagePhase, OverpaymentConfig, OverpaymentEffect, OverpaymentFrequency, OverpaymentType,
    RatePeriodConfig, RateType, ResolvedRatePeriod, SelfBuildConfig, SimulationCompleteness,
    SimulationState, SimulationSummary, SimulationWarning, WarningSeverity, WarningType,
};
