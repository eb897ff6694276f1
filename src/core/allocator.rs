use super::types::{AllocationInput, AllocationResult, PartyShare, PoolContributions, SplitPolicy};

pub const OVER_BUDGET_WARNING: &str = "Targets exceed combined income; leftovers go negative.";

#[derive(Debug, Clone, Copy)]
struct PoolTargets {
    monthly: f64,
    expenses: f64,
    savings: f64,
}

impl PoolTargets {
    fn total(self) -> f64 {
        self.monthly + self.expenses + self.savings
    }

    fn split_by(self, fraction_a: f64) -> PoolContributions {
        PoolContributions {
            monthly: PartyShare::split(self.monthly, fraction_a),
            expenses: PartyShare::split(self.expenses, fraction_a),
            savings: PartyShare::split(self.savings, fraction_a),
        }
    }
}

pub fn allocate(input: &AllocationInput) -> AllocationResult {
    let income_a = finite_or_zero(input.income_a);
    let income_b = finite_or_zero(input.income_b);
    let total_income = income_a + income_b;

    let savings_rate = non_negative(input.savings_rate_percent);
    let targets = PoolTargets {
        monthly: non_negative(input.monthly_pool_target),
        expenses: non_negative(input.expenses_pool_target),
        savings: savings_rate / 100.0 * total_income,
    };
    let total_target = targets.total();

    let mut warning = None;
    let per_party = match input.split_policy {
        SplitPolicy::Equal => targets.split_by(0.5),
        SplitPolicy::Proportional => {
            if total_income > 0.0 {
                targets.split_by(income_a / total_income)
            } else {
                PoolContributions::default()
            }
        }
        SplitPolicy::EqualLeftover => {
            let leftover = (income_a + income_b - total_target) / 2.0;
            if leftover < 0.0 {
                warning = Some(OVER_BUDGET_WARNING.to_string());
            }
            if total_target > 0.0 {
                let contribution_a = (income_a - leftover).clamp(0.0, total_target);
                targets.split_by(contribution_a / total_target)
            } else {
                PoolContributions::default()
            }
        }
    };

    AllocationResult {
        total_income,
        monthly_pool_target: targets.monthly,
        expenses_pool_target: targets.expenses,
        savings_pool_target: targets.savings,
        total_target,
        remainder_a: income_a - per_party.for_a(),
        remainder_b: income_b - per_party.for_b(),
        per_party,
        warning,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}
