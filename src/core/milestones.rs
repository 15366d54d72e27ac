use super::types::{AmortizationMonth, Milestone, MilestoneType, MortgageInput, MortgagePhase};

const PRINCIPAL_THRESHOLDS: [(MilestoneType, f64, &str); 3] = [
    (MilestoneType::Principal25Percent, 0.25, "25% of principal paid"),
    (MilestoneType::Principal50Percent, 0.50, "50% of principal paid"),
    (MilestoneType::Principal75Percent, 0.75, "75% of principal paid"),
];

fn milestone(kind: MilestoneType, month: &AmortizationMonth, label: &str) -> Milestone {
    Milestone {
        kind,
        month: month.month,
        date: month.date,
        label: label.to_string(),
        value: Some(month.closing_balance),
    }
}

pub fn detect_milestones(months: &[AmortizationMonth], input: &MortgageInput) -> Vec<Milestone> {
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Vec::new();
    };

    let mut milestones = vec![Milestone {
        kind: MilestoneType::MortgageStart,
        month: first.month,
        date: first.date,
        label: "Mortgage start".to_string(),
        value: Some(first.opening_balance),
    }];

    let in_repayment = |m: &AmortizationMonth| m.phase == Some(MortgagePhase::Repayment);
    if let Some(done) = months
        .iter()
        .rev()
        .find(|m| m.phase == Some(MortgagePhase::Construction))
    {
        milestones.push(milestone(
            MilestoneType::ConstructionComplete,
            done,
            "Construction complete",
        ));
    }
    if months.iter().any(|m| m.phase.is_some() && !in_repayment(m)) {
        if let Some(full) = months.iter().find(|m| in_repayment(m)) {
            milestones.push(milestone(
                MilestoneType::FullPaymentsStart,
                full,
                "Full payments start",
            ));
        }
    }

    let amount = input.mortgage_amount as f64;
    for (kind, share, label) in PRINCIPAL_THRESHOLDS {
        if let Some(hit) = months
            .iter()
            .find(|m| m.cumulative_principal as f64 >= amount * share)
        {
            milestones.push(milestone(kind, hit, label));
        }
    }

    // Part-drawn balances during construction understate the loan.
    if input.property_value > 0 {
        let property = input.property_value as f64;
        if let Some(hit) = months
            .iter()
            .filter(|m| m.phase != Some(MortgagePhase::Construction))
            .find(|m| m.closing_balance as f64 / property * 100.0 <= 80.0)
        {
            milestones.push(milestone(MilestoneType::Ltv80Percent, hit, "LTV below 80%"));
        }
    }

    milestones.push(milestone(
        MilestoneType::MortgageComplete,
        last,
        "Mortgage complete",
    ));

    milestones.sort_by_key(|m| m.month);
    milestones
}
