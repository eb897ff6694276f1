use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitPolicy {
    #[default]
    Equal,
    Proportional,
    #[serde(alias = "equalLeftover", alias = "equal_leftover")]
    EqualLeftover,
}

impl SplitPolicy {
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "equal" => Some(Self::Equal),
            "proportional" => Some(Self::Proportional),
            "equal-leftover" | "equalleftover" => Some(Self::EqualLeftover),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Pool {
    Monthly,
    Expenses,
    Savings,
}

impl Pool {
    pub const ALL: [Pool; 3] = [Pool::Monthly, Pool::Expenses, Pool::Savings];

    pub fn label(self) -> &'static str {
        match self {
            Pool::Monthly => "Monthly",
            Pool::Expenses => "Expenses",
            Pool::Savings => "Savings",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationInput {
    pub income_a: f64,
    pub income_b: f64,
    pub monthly_pool_target: f64,
    pub expenses_pool_target: f64,
    pub savings_rate_percent: f64,
    pub split_policy: SplitPolicy,
}

impl Default for AllocationInput {
    fn default() -> Self {
        Self {
            income_a: 0.0,
            income_b: 0.0,
            monthly_pool_target: 0.0,
            expenses_pool_target: 0.0,
            savings_rate_percent: 20.0,
            split_policy: SplitPolicy::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PartyShare {
    pub a: f64,
    pub b: f64,
}

impl PartyShare {
    pub fn total(self) -> f64 {
        self.a + self.b
    }

    /// Splits `target` so that party A carries `fraction_a` of it.
    pub(crate) fn split(target: f64, fraction_a: f64) -> Self {
        Self {
            a: target * fraction_a,
            b: target * (1.0 - fraction_a),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoolContributions {
    pub monthly: PartyShare,
    pub expenses: PartyShare,
    pub savings: PartyShare,
}

impl PoolContributions {
    pub fn get(&self, pool: Pool) -> PartyShare {
        match pool {
            Pool::Monthly => self.monthly,
            Pool::Expenses => self.expenses,
            Pool::Savings => self.savings,
        }
    }

    pub fn for_a(&self) -> f64 {
        self.monthly.a + self.expenses.a + self.savings.a
    }

    pub fn for_b(&self) -> f64 {
        self.monthly.b + self.expenses.b + self.savings.b
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    pub total_income: f64,
    pub monthly_pool_target: f64,
    pub expenses_pool_target: f64,
    pub savings_pool_target: f64,
    pub total_target: f64,
    pub per_party: PoolContributions,
    pub remainder_a: f64,
    pub remainder_b: f64,
    pub warning: Option<String>,
}

impl AllocationResult {
    pub fn pool_target(&self, pool: Pool) -> f64 {
        match pool {
            Pool::Monthly => self.monthly_pool_target,
            Pool::Expenses => self.expenses_pool_target,
            Pool::Savings => self.savings_pool_target,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInput {
    pub starting_balance: f64,
    pub monthly_contribution: f64,
    pub extra_monthly_contribution: f64,
    pub annual_rate_percent: f64,
    pub horizon_months: i64,
    pub target_amount: Option<f64>,
    pub compounding: bool,
}

impl Default for ProjectionInput {
    fn default() -> Self {
        Self {
            starting_balance: 0.0,
            monthly_contribution: 200.0,
            extra_monthly_contribution: 0.0,
            annual_rate_percent: 0.0,
            horizon_months: 12,
            target_amount: Some(5000.0),
            compounding: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month_index: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    pub series: Vec<ProjectionPoint>,
    pub final_balance: f64,
    pub months_to_target: Option<u32>,
    pub total_contributed: f64,
    pub interest_earned: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_policy_parses_loose_spellings() {
        assert_eq!(SplitPolicy::parse_loose("equal"), Some(SplitPolicy::Equal));
        assert_eq!(
            SplitPolicy::parse_loose(" Proportional "),
            Some(SplitPolicy::Proportional)
        );
        for raw in ["equal-leftover", "equal_leftover", "equalLeftover", "EQUAL-LEFTOVER"] {
            assert_eq!(
                SplitPolicy::parse_loose(raw),
                Some(SplitPolicy::EqualLeftover)
            );
        }
        assert_eq!(SplitPolicy::parse_loose("half"), None);
    }

    #[test]
    fn split_policy_deserializes_wire_names() {
        let policy: SplitPolicy = serde_json::from_str("\"equalLeftover\"").expect("alias");
        assert_eq!(policy, SplitPolicy::EqualLeftover);
        assert_eq!(
            serde_json::to_string(&SplitPolicy::EqualLeftover).expect("serialize"),
            "\"equal-leftover\""
        );
    }

    #[test]
    fn pool_contributions_sum_per_party() {
        let contributions = PoolContributions {
            monthly: PartyShare { a: 450.0, b: 450.0 },
            expenses: PartyShare { a: 200.0, b: 100.0 },
            savings: PartyShare { a: 50.0, b: 25.0 },
        };
        assert_eq!(contributions.for_a(), 700.0);
        assert_eq!(contributions.for_b(), 575.0);
        assert_eq!(contributions.get(Pool::Expenses).total(), 300.0);
    }
}
