use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::catalog::Catalog;
use super::types::{RatePeriodConfig, RateType, ResolvedRatePeriod};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveIssue {
    #[error("rate period {period_id}: rate {rate_id} not found (custom: {is_custom})")]
    UnknownRate {
        period_id: String,
        rate_id: String,
        is_custom: bool,
    },
    #[error("rate period {period_id}: lender {lender_id} not found")]
    UnknownLender {
        period_id: String,
        lender_id: String,
    },
    #[error("rate period {period_id} runs until the end of the mortgage but is not last")]
    OpenEndedNotLast { period_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResolution {
    pub periods: Vec<ResolvedRatePeriod>,
    pub issues: Vec<ResolveIssue>,
}

/// Resolves the rate-period stack into absolute, catalog-backed periods.
///
/// Start months are derived by prefix-summing durations over the whole stack,
/// so a config that fails to resolve is omitted but still occupies its months.
pub fn resolve_rate_periods(configs: &[RatePeriodConfig], catalog: &Catalog) -> RateResolution {
    let mut resolution = RateResolution::default();
    let mut start_month = 1_u32;

    for (idx, config) in configs.iter().enumerate() {
        let period_start = start_month;
        start_month = start_month.saturating_add(config.duration_months);

        if config.duration_months == 0 && idx + 1 < configs.len() {
            resolution.issues.push(ResolveIssue::OpenEndedNotLast {
                period_id: config.id.clone(),
            });
        }

        match resolve_one(config, period_start, catalog) {
            Ok(period) => resolution.periods.push(period),
            Err(issue) => {
                debug!(%issue, "skipping unresolved rate period");
                resolution.issues.push(issue);
            }
        }
    }

    resolution
}

fn resolve_one(
    config: &RatePeriodConfig,
    start_month: u32,
    catalog: &Catalog,
) -> Result<ResolvedRatePeriod, ResolveIssue> {
    let rate = catalog
        .find_rate(&config.rate_id, config.is_custom)
        .ok_or_else(|| ResolveIssue::UnknownRate {
            period_id: config.id.clone(),
            rate_id: config.rate_id.clone(),
            is_custom: config.is_custom,
        })?;

    let lender = catalog.find_lender(&config.lender_id);
    let lender_name = match (lender, &rate.lender_name) {
        (Some(lender), _) => lender.name.clone(),
        (None, Some(name)) if config.is_custom => name.clone(),
        _ => {
            return Err(ResolveIssue::UnknownLender {
                period_id: config.id.clone(),
                lender_id: config.lender_id.clone(),
            });
        }
    };

    let overpayment_policy_id = match rate.rate_type {
        RateType::Fixed => lender.and_then(|l| l.overpayment_policy.clone()),
        RateType::Variable => None,
    };

    Ok(ResolvedRatePeriod {
        id: config.id.clone(),
        lender_id: config.lender_id.clone(),
        rate_id: config.rate_id.clone(),
        is_custom: config.is_custom,
        label: config.label.clone(),
        rate: rate.rate,
        rate_type: rate.rate_type,
        fixed_term: rate.fixed_term,
        overpayment_policy_id,
        lender_name,
        rate_name: rate.name.clone(),
        start_month,
        duration_months: config.duration_months,
    })
}

/// Index of the period that governs `month`.
///
/// Falls back to the latest period that started before `month` when the stack
/// has a gap, and to the first period when none has started yet.
pub fn active_period_index(periods: &[ResolvedRatePeriod], month: u32) -> Option<usize> {
    if periods.is_empty() {
        return None;
    }
    if let Some(idx) = periods.iter().position(|p| p.contains(month)) {
        return Some(idx);
    }
    periods
        .iter()
        .rposition(|p| p.start_month <= month)
        .or(Some(0))
}
