use chrono::{Datelike, NaiveDate};

use super::catalog::OverpaymentPolicy;
use super::types::{AllowanceBasis, AllowanceType, Cents};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceCheck {
    pub exceeded: bool,
    pub allowance_amount: Cents,
}

impl AllowanceCheck {
    const UNRESTRICTED: AllowanceCheck = AllowanceCheck {
        exceeded: false,
        allowance_amount: Cents::MAX,
    };
}

fn major_to_cents(value: f64) -> Cents {
    (value * 100.0).round() as Cents
}

fn percent_of(amount: Cents, percent: f64) -> Cents {
    (amount as f64 * percent / 100.0).round() as Cents
}

/// Fee-free allowance for the current period, before comparison.
pub fn allowance_amount(
    policy: &OverpaymentPolicy,
    year_start_balance: Cents,
    monthly_payment: Cents,
) -> Cents {
    let base = match (policy.allowance_type, policy.allowance_basis) {
        (AllowanceType::Flat, _) => major_to_cents(policy.allowance_value),
        (AllowanceType::Percentage, Some(AllowanceBasis::Monthly)) => {
            percent_of(monthly_payment, policy.allowance_value)
        }
        (AllowanceType::Percentage, _) => percent_of(year_start_balance, policy.allowance_value),
    };
    match policy.min_amount {
        Some(min) => base.max(major_to_cents(min)),
        None => base,
    }
}

pub fn is_monthly_basis(policy: &OverpaymentPolicy) -> bool {
    policy.allowance_type == AllowanceType::Percentage
        && policy.allowance_basis == Some(AllowanceBasis::Monthly)
}

/// Checks one month's overpayment against the policy.
///
/// `year_to_date_overpayments` excludes `overpayment_amount`. Monthly-basis
/// policies compare the month on its own; every other policy compares the
/// running year total.
pub fn check_allowance(
    policy: Option<&OverpaymentPolicy>,
    overpayment_amount: Cents,
    year_to_date_overpayments: Cents,
    year_start_balance: Cents,
    monthly_payment: Cents,
) -> AllowanceCheck {
    let Some(policy) = policy else {
        return AllowanceCheck::UNRESTRICTED;
    };

    let allowance = allowance_amount(policy, year_start_balance, monthly_payment);
    let compared = if is_monthly_basis(policy) {
        overpayment_amount
    } else {
        year_to_date_overpayments + overpayment_amount
    };

    AllowanceCheck {
        exceeded: compared > allowance,
        allowance_amount: allowance,
    }
}

/// Year-to-date state that resets on allowance-year boundaries only.
#[derive(Debug, Clone, Default)]
pub struct AllowanceYear {
    key: Option<i64>,
    year_to_date: Cents,
    year_start_balance: Cents,
}

impl AllowanceYear {
    /// Calendar years when the mortgage is dated, otherwise 12-month anniversaries.
    fn key_for(month: u32, date: Option<NaiveDate>) -> i64 {
        match date {
            Some(date) => i64::from(date.year()),
            None => i64::from((month - 1) / 12),
        }
    }

    pub fn roll(&mut self, month: u32, date: Option<NaiveDate>, opening_balance: Cents) {
        let key = Self::key_for(month, date);
        if self.key != Some(key) {
            self.key = Some(key);
            self.year_to_date = 0;
            self.year_start_balance = opening_balance;
        }
    }

    pub fn year_to_date(&self) -> Cents {
        self.year_to_date
    }

    pub fn year_start_balance(&self) -> Cents {
        self.year_start_balance
    }

    pub fn record(&mut self, amount: Cents) {
        self.year_to_date += amount;
    }
}

/// `€1,234` for whole amounts, `€1,234.56` otherwise.
pub fn format_currency(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match abs % 100 {
        0 => format!("{sign}€{grouped}"),
        fraction => format!("{sign}€{grouped}.{fraction:02}"),
    }
}
