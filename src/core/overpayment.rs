use super::types::{
    Cents, OverpaymentConfig, OverpaymentEffect, OverpaymentFrequency, OverpaymentType,
    ResolvedRatePeriod,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution<'a> {
    pub config: &'a OverpaymentConfig,
    pub amount: Cents,
}

/// Raw overpayment requested for one month. Capping against the balance is the
/// engine's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverpaymentRequest<'a> {
    pub contributions: Vec<Contribution<'a>>,
}

impl OverpaymentRequest<'_> {
    pub fn total(&self) -> Cents {
        self.contributions.iter().map(|c| c.amount).sum()
    }

    pub fn reduces_payment(&self) -> bool {
        self.contributions
            .iter()
            .any(|c| c.config.effect == OverpaymentEffect::ReducePayment)
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

pub fn overpayment_for_month<'a>(
    configs: &'a [OverpaymentConfig],
    periods: &[ResolvedRatePeriod],
    month: u32,
) -> OverpaymentRequest<'a> {
    let contributions = configs
        .iter()
        .filter(|config| config.enabled && config.amount > 0)
        .filter(|config| applies_in_month(config, periods, month))
        .map(|config| Contribution {
            config,
            amount: config.amount,
        })
        .collect();

    OverpaymentRequest { contributions }
}

pub fn applies_in_month(
    config: &OverpaymentConfig,
    periods: &[ResolvedRatePeriod],
    month: u32,
) -> bool {
    match config.kind {
        OverpaymentType::OneTime => config.start_month == month,
        OverpaymentType::Recurring => {
            if month < config.start_month {
                return false;
            }
            if effective_end_month(config, periods).is_some_and(|end| month > end) {
                return false;
            }
            let step = config
                .frequency
                .unwrap_or(OverpaymentFrequency::Monthly)
                .period_months();
            (month - config.start_month) % step == 0
        }
    }
}

/// Explicit `endMonth`, else the end of the attached rate period, else unbounded.
pub fn effective_end_month(
    config: &OverpaymentConfig,
    periods: &[ResolvedRatePeriod],
) -> Option<u32> {
    config.end_month.or_else(|| {
        periods
            .iter()
            .find(|p| p.id == config.rate_period_id)
            .and_then(ResolvedRatePeriod::end_month)
    })
}
