use super::catalog::{Catalog, MortgageRate};
use super::types::{
    AmortizationMonth, BufferSuggestion, Cents, RateType, ResolvedRatePeriod, SimulationState,
};

fn ltv_percent(balance: Cents, property_value: Cents) -> f64 {
    let ltv = balance as f64 / property_value as f64 * 100.0;
    (ltv * 10.0).round() / 10.0
}

fn cheapest<'a>(rates: impl Iterator<Item = &'a MortgageRate>) -> Option<&'a MortgageRate> {
    rates.min_by(|a, b| a.rate.total_cmp(&b.rate))
}

/// Cheapest variable rate of the lender that accepts `ltv`, else its cheapest variable rate.
fn buffer_rate<'a>(catalog: &'a Catalog, lender_id: &'a str, ltv: f64) -> Option<&'a MortgageRate> {
    cheapest(catalog.variable_rates_for(lender_id).filter(|r| r.covers_ltv(ltv)))
        .or_else(|| cheapest(catalog.variable_rates_for(lender_id)))
}

/// Fixed periods that hand straight over to another fixed period, or end before
/// the mortgage does, leave no penalty-free window for a lump-sum overpayment.
pub fn calculate_buffer_suggestions(
    state: &SimulationState,
    catalog: &Catalog,
    periods: &[ResolvedRatePeriod],
    months: &[AmortizationMonth],
) -> Vec<BufferSuggestion> {
    let property_value = state.input.property_value;
    if property_value <= 0 || months.is_empty() {
        return Vec::new();
    }

    let month_record = |month: u32| months.iter().find(|m| m.month == month);
    let mut suggestions = Vec::new();

    for (idx, pair) in periods.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        if current.rate_type != RateType::Fixed || next.rate_type != RateType::Fixed {
            continue;
        }
        let Some(boundary) = current.end_month().and_then(month_record) else {
            continue;
        };
        let ltv = ltv_percent(boundary.closing_balance, property_value);
        if let Some(rate) = buffer_rate(catalog, &current.lender_id, ltv) {
            suggestions.push(BufferSuggestion {
                after_index: idx,
                fixed_rate: current.rate,
                suggested_rate: rate.rate,
                suggested_rate_id: rate.id.clone(),
                lender_name: current.lender_name.clone(),
                ltv_at_end: ltv,
                is_trailing: None,
            });
        }
    }

    let Some(last) = periods.last() else {
        return suggestions;
    };
    let Some(end) = last.end_month() else {
        return suggestions;
    };
    if last.rate_type != RateType::Fixed || end >= state.input.mortgage_term_months {
        return suggestions;
    }
    let Some(record) = month_record(end).or_else(|| months.last()) else {
        return suggestions;
    };
    let ltv = ltv_percent(record.closing_balance, property_value);
    if let Some(rate) = buffer_rate(catalog, &last.lender_id, ltv) {
        suggestions.push(BufferSuggestion {
            after_index: periods.len() - 1,
            fixed_rate: last.rate,
            suggested_rate: rate.rate,
            suggested_rate_id: rate.id.clone(),
            lender_name: last.lender_name.clone(),
            ltv_at_end: ltv,
            is_trailing: Some(true),
        });
    }

    suggestions
}
