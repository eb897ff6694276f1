use super::types::{AllocationResult, ProjectionInput, ProjectionPoint, ProjectionResult};

/// Longest horizon a projection runs for; longer requests are cut to this.
pub const MAX_HORIZON_MONTHS: i64 = 1200;

pub fn project(input: &ProjectionInput) -> ProjectionResult {
    let starting_balance = finite_or_zero(input.starting_balance);
    let contribution = non_negative(input.monthly_contribution)
        + non_negative(input.extra_monthly_contribution);
    let monthly_rate = if input.compounding {
        non_negative(input.annual_rate_percent) / 100.0 / 12.0
    } else {
        0.0
    };
    let target = input.target_amount.map(non_negative);
    let months = u32::try_from(input.horizon_months.clamp(0, MAX_HORIZON_MONTHS)).unwrap_or(0);

    let mut series = Vec::with_capacity(months as usize);
    let mut balance = starting_balance;
    let mut months_to_target = None;
    for month_index in 1..=months {
        balance = balance * (1.0 + monthly_rate) + contribution;
        if months_to_target.is_none() && target.is_some_and(|t| balance >= t) {
            months_to_target = Some(month_index);
        }
        series.push(ProjectionPoint {
            month_index,
            balance,
        });
    }

    let total_contributed = contribution * f64::from(months);
    ProjectionResult {
        series,
        final_balance: balance,
        months_to_target,
        total_contributed,
        interest_earned: (balance - starting_balance - total_contributed).max(0.0),
    }
}

/// Monthly amount a budget sets aside for savings, used to seed a projection.
pub fn monthly_savings_from(allocation: &AllocationResult) -> f64 {
    if allocation.total_income <= 0.0 {
        return 0.0;
    }
    non_negative(allocation.savings_pool_target)
}

impl ProjectionInput {
    pub fn seeded_from(allocation: &AllocationResult) -> Self {
        Self {
            monthly_contribution: monthly_savings_from(allocation),
            ..Self::default()
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}
