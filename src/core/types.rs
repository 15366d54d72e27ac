use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Money is always held in minor currency units (cents).
pub type Cents = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageInput {
    pub mortgage_amount: Cents,
    pub mortgage_term_months: u32,
    pub property_value: Cents,
    #[serde(default)]
    pub ber: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Fixed,
    Variable,
}

/// One entry of the rate-period stack. Start months are never stored; they are
/// derived by the resolver from the order of the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePeriodConfig {
    pub id: String,
    pub lender_id: String,
    pub rate_id: String,
    #[serde(default)]
    pub is_custom: bool,
    /// `0` means "until the end of the mortgage".
    pub duration_months: u32,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRatePeriod {
    pub id: String,
    pub lender_id: String,
    pub rate_id: String,
    pub is_custom: bool,
    pub label: Option<String>,
    pub rate: f64,
    #[serde(rename = "type")]
    pub rate_type: RateType,
    pub fixed_term: Option<u32>,
    pub overpayment_policy_id: Option<String>,
    pub lender_name: String,
    pub rate_name: String,
    pub start_month: u32,
    pub duration_months: u32,
}

impl ResolvedRatePeriod {
    pub fn is_open_ended(&self) -> bool {
        self.duration_months == 0
    }

    /// Last month covered by the period, `None` when it runs to the end of the mortgage.
    pub fn end_month(&self) -> Option<u32> {
        if self.is_open_ended() {
            None
        } else {
            Some(self.start_month.saturating_add(self.duration_months - 1))
        }
    }

    pub fn contains(&self, month: u32) -> bool {
        month >= self.start_month && self.end_month().is_none_or(|end| month <= end)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentType {
    OneTime,
    Recurring,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl OverpaymentFrequency {
    pub fn period_months(self) -> u32 {
        match self {
            OverpaymentFrequency::Monthly => 1,
            OverpaymentFrequency::Quarterly => 3,
            OverpaymentFrequency::Yearly => 12,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentEffect {
    ReduceTerm,
    ReducePayment,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverpaymentConfig {
    pub id: String,
    pub rate_period_id: String,
    #[serde(rename = "type")]
    pub kind: OverpaymentType,
    #[serde(default)]
    pub frequency: Option<OverpaymentFrequency>,
    pub amount: Cents,
    pub start_month: u32,
    #[serde(default)]
    pub end_month: Option<u32>,
    pub effect: OverpaymentEffect,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub label: Option<String>,
}

impl OverpaymentConfig {
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| match self.kind {
            OverpaymentType::OneTime => "One-time overpayment".to_string(),
            OverpaymentType::Recurring => "Recurring overpayment".to_string(),
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceType {
    Percentage,
    Flat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceBasis {
    Balance,
    Monthly,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MortgagePhase {
    Construction,
    InterestOnly,
    Repayment,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionRepaymentType {
    #[default]
    InterestOnly,
    InterestAndCapital,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownStage {
    pub id: String,
    pub month: u32,
    pub amount: Cents,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfBuildConfig {
    pub drawdown_stages: Vec<DrawdownStage>,
    #[serde(default)]
    pub construction_repayment_type: ConstructionRepaymentType,
    #[serde(default)]
    pub interest_only_months: u32,
}

impl SelfBuildConfig {
    pub fn final_drawdown_month(&self) -> Option<u32> {
        self.drawdown_stages
            .iter()
            .filter(|stage| stage.amount > 0)
            .map(|stage| stage.month)
            .max()
    }

    pub fn drawdown_for(&self, month: u32) -> Cents {
        self.drawdown_stages
            .iter()
            .filter(|stage| stage.month == month && stage.amount > 0)
            .map(|stage| stage.amount)
            .sum()
    }
}

/// Full minimal input state; everything else is derived from it and the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    pub input: MortgageInput,
    #[serde(default)]
    pub rate_periods: Vec<RatePeriodConfig>,
    #[serde(default)]
    pub overpayment_configs: Vec<OverpaymentConfig>,
    #[serde(default)]
    pub self_build: Option<SelfBuildConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationMonth {
    pub month: u32,
    pub year: u32,
    pub month_of_year: u32,
    pub date: Option<NaiveDate>,
    pub opening_balance: Cents,
    pub closing_balance: Cents,
    pub scheduled_payment: Cents,
    pub interest_portion: Cents,
    pub principal_portion: Cents,
    pub overpayment: Cents,
    pub total_payment: Cents,
    pub rate: f64,
    pub rate_period_id: String,
    pub cumulative_interest: Cents,
    pub cumulative_principal: Cents,
    pub cumulative_overpayments: Cents,
    pub cumulative_total: Cents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<MortgagePhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub year: u32,
    pub opening_balance: Cents,
    pub closing_balance: Cents,
    pub total_interest: Cents,
    pub total_principal: Cents,
    pub total_overpayment: Cents,
    pub total_payment: Cents,
    pub month_count: u32,
    pub rate_changes: Vec<String>,
    pub has_rate_change: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    AllowanceExceeded,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationWarning {
    #[serde(rename = "type")]
    pub kind: WarningType,
    pub month: u32,
    pub config_id: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub overpayment_label: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneType {
    MortgageStart,
    ConstructionComplete,
    FullPaymentsStart,
    #[serde(rename = "principal_25_percent")]
    Principal25Percent,
    #[serde(rename = "principal_50_percent")]
    Principal50Percent,
    #[serde(rename = "principal_75_percent")]
    Principal75Percent,
    #[serde(rename = "ltv_80_percent")]
    Ltv80Percent,
    MortgageComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(rename = "type")]
    pub kind: MilestoneType,
    pub month: u32,
    pub date: Option<NaiveDate>,
    pub label: String,
    pub value: Option<Cents>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub total_interest: Cents,
    pub total_paid: Cents,
    pub actual_term_months: u32,
    pub months_saved: u32,
    pub interest_saved: Cents,
    pub extra_interest_from_self_build: Option<Cents>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationCompleteness {
    /// `-1` when the last period is open-ended and covers the whole term by construction.
    pub covered_months: i64,
    pub total_months: u32,
    pub is_complete: bool,
    pub missing_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferSuggestion {
    pub after_index: usize,
    pub fixed_rate: f64,
    pub suggested_rate: f64,
    pub suggested_rate_id: String,
    pub lender_name: String,
    pub ltv_at_end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trailing: Option<bool>,
}
