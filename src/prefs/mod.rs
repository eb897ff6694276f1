//! Preference blobs saved by the budget and savings pages.
//!
//! Blobs are stored exactly as submitted and only interpreted on load. Loading
//! never fails: missing fields, wrong types and unknown values fall back to the
//! documented defaults, and numeric strings are accepted the way form inputs
//! send them.

mod error;
mod store;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::chart::PartyNames;
use crate::core::{AllocationInput, ProjectionInput, SplitPolicy};

pub use error::PrefsError;
pub use store::{JsonFileStore, MAX_KEY_LEN, MemoryStore, PreferenceStore, validate_key};

pub const FINANCE_KEY: &str = "finance-form";
pub const SAVINGS_KEY: &str = "savings-projection";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancePreferences {
    pub party_a_name: String,
    pub party_b_name: String,
    pub income_a: f64,
    pub income_b: f64,
    pub monthly_pool_target: f64,
    pub expenses_pool_target: f64,
    pub savings_rate_percent: f64,
    pub split_policy: SplitPolicy,
}

impl Default for FinancePreferences {
    fn default() -> Self {
        let names = PartyNames::default();
        let input = AllocationInput::default();
        Self {
            party_a_name: names.a,
            party_b_name: names.b,
            income_a: input.income_a,
            income_b: input.income_b,
            monthly_pool_target: input.monthly_pool_target,
            expenses_pool_target: input.expenses_pool_target,
            savings_rate_percent: input.savings_rate_percent,
            split_policy: input.split_policy,
        }
    }
}

impl FinancePreferences {
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };

        Self {
            party_a_name: text(obj, &["partyAName", "nameA"]).unwrap_or(defaults.party_a_name),
            party_b_name: text(obj, &["partyBName", "nameB"]).unwrap_or(defaults.party_b_name),
            income_a: number(obj, &["incomeA", "ryanIncome"]).unwrap_or(defaults.income_a),
            income_b: number(obj, &["incomeB", "steffIncome"]).unwrap_or(defaults.income_b),
            monthly_pool_target: number(obj, &["monthlyPoolTarget", "monthlyBudget"])
                .unwrap_or(defaults.monthly_pool_target),
            expenses_pool_target: number(obj, &["expensesPoolTarget", "expensesTopUp"])
                .unwrap_or(defaults.expenses_pool_target),
            savings_rate_percent: number(obj, &["savingsRatePercent", "savingsRate"])
                .unwrap_or(defaults.savings_rate_percent),
            split_policy: text(obj, &["splitPolicy", "splitMethod"])
                .and_then(|raw| SplitPolicy::parse_loose(&raw))
                .unwrap_or(defaults.split_policy),
        }
    }

    pub fn to_allocation_input(&self) -> AllocationInput {
        AllocationInput {
            income_a: self.income_a,
            income_b: self.income_b,
            monthly_pool_target: self.monthly_pool_target,
            expenses_pool_target: self.expenses_pool_target,
            savings_rate_percent: self.savings_rate_percent,
            split_policy: self.split_policy,
        }
    }

    pub fn party_names(&self) -> PartyNames {
        PartyNames {
            a: self.party_a_name.clone(),
            b: self.party_b_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPreferences {
    pub current_balance: f64,
    pub annual_rate_percent: f64,
    pub months: i64,
    pub monthly_contribution: Option<f64>,
    pub extra_monthly: f64,
    pub goal: f64,
    pub show_goal: bool,
    pub compounding: bool,
    pub start_month: Option<String>,
}

impl Default for SavingsPreferences {
    fn default() -> Self {
        Self {
            current_balance: 0.0,
            annual_rate_percent: 1.5,
            months: 18,
            monthly_contribution: None,
            extra_monthly: 0.0,
            goal: 5000.0,
            show_goal: true,
            compounding: true,
            start_month: None,
        }
    }
}

impl SavingsPreferences {
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };

        Self {
            current_balance: number(obj, &["currentBalance", "startingBalance"])
                .unwrap_or(defaults.current_balance),
            annual_rate_percent: number(obj, &["annualRatePercent", "annualRate"])
                .unwrap_or(defaults.annual_rate_percent),
            months: number(obj, &["months", "horizonMonths"])
                .map(|m| m.trunc() as i64)
                .unwrap_or(defaults.months),
            monthly_contribution: number(obj, &["monthlyContribution", "monthlySavings"]),
            extra_monthly: number(obj, &["extraMonthly", "extraMonthlyContribution"])
                .unwrap_or(defaults.extra_monthly),
            goal: number(obj, &["goal", "targetAmount"]).unwrap_or(defaults.goal),
            show_goal: boolean(obj, &["showGoal"]).unwrap_or(defaults.show_goal),
            compounding: boolean(obj, &["compounding", "useCompounding"])
                .unwrap_or(defaults.compounding),
            start_month: text(obj, &["startMonth"]),
        }
    }

    /// A saved contribution of zero or less defers to `derived_monthly`, the
    /// savings pool of the current budget.
    pub fn to_projection_input(&self, derived_monthly: f64) -> ProjectionInput {
        let monthly_contribution = self
            .monthly_contribution
            .filter(|c| *c > 0.0)
            .unwrap_or(derived_monthly);
        ProjectionInput {
            starting_balance: self.current_balance,
            monthly_contribution,
            extra_monthly_contribution: self.extra_monthly,
            annual_rate_percent: self.annual_rate_percent,
            horizon_months: self.months,
            target_amount: (self.goal > 0.0).then_some(self.goal),
            compounding: self.compounding,
        }
    }

    /// Goal line for the projection chart; `show_goal` only toggles the line.
    pub fn chart_goal(&self) -> Option<f64> {
        (self.show_goal && self.goal > 0.0).then_some(self.goal)
    }
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let parsed = match field(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match field(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn boolean(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    match field(obj, keys)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }
}
