use serde::{Deserialize, Serialize};

use super::types::{AllowanceBasis, AllowanceType, RateType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageRate {
    pub id: String,
    pub name: String,
    pub lender_id: String,
    #[serde(rename = "type")]
    pub rate_type: RateType,
    pub rate: f64,
    /// Fixed term in years.
    #[serde(default)]
    pub fixed_term: Option<u32>,
    #[serde(default)]
    pub min_ltv: Option<f64>,
    #[serde(default)]
    pub max_ltv: Option<f64>,
    /// Custom rates may name a lender that is not in the lender catalog.
    #[serde(default)]
    pub lender_name: Option<String>,
}

impl MortgageRate {
    pub fn covers_ltv(&self, ltv: f64) -> bool {
        self.min_ltv.is_none_or(|min| ltv >= min) && self.max_ltv.is_none_or(|max| ltv <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lender {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub overpayment_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverpaymentPolicy {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub allowance_type: AllowanceType,
    #[serde(default)]
    pub allowance_basis: Option<AllowanceBasis>,
    /// Percent for `percentage` policies, major currency units for `flat`.
    pub allowance_value: f64,
    /// Major currency units.
    #[serde(default)]
    pub min_amount: Option<f64>,
}

/// Read-only reference data supplied wholesale with every simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Catalog {
    pub rates: Vec<MortgageRate>,
    pub custom_rates: Vec<MortgageRate>,
    pub lenders: Vec<Lender>,
    pub policies: Vec<OverpaymentPolicy>,
}

impl Catalog {
    pub fn find_rate(&self, rate_id: &str, is_custom: bool) -> Option<&MortgageRate> {
        let table = if is_custom {
            &self.custom_rates
        } else {
            &self.rates
        };
        table.iter().find(|rate| rate.id == rate_id)
    }

    pub fn find_lender(&self, lender_id: &str) -> Option<&Lender> {
        self.lenders.iter().find(|lender| lender.id == lender_id)
    }

    pub fn find_policy(&self, policy_id: &str) -> Option<&OverpaymentPolicy> {
        self.policies.iter().find(|policy| policy.id == policy_id)
    }

    /// Variable rates offered by `lender_id`, standard catalog first.
    pub fn variable_rates_for<'a>(
        &'a self,
        lender_id: &'a str,
    ) -> impl Iterator<Item = &'a MortgageRate> + 'a {
        self.rates
            .iter()
            .chain(self.custom_rates.iter())
            .filter(move |rate| rate.lender_id == lender_id && rate.rate_type == RateType::Variable)
    }
}
