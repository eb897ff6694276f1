use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::chart::{ChartFocus, PartyNames};
use crate::core::{
    AllocationInput, AllocationResult, MAX_HORIZON_MONTHS, ProjectionInput, SplitPolicy, allocate,
    monthly_savings_from,
};

// Numbers, flags and policies arrive the way form inputs send them. Values
// that do not parse are treated as absent and fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AllocatePayload {
    #[serde(alias = "ryanIncome", deserialize_with = "loose_number")]
    income_a: Option<f64>,
    #[serde(alias = "steffIncome", deserialize_with = "loose_number")]
    income_b: Option<f64>,
    #[serde(alias = "monthlyBudget", deserialize_with = "loose_number")]
    monthly_pool_target: Option<f64>,
    #[serde(alias = "expensesTopUp", deserialize_with = "loose_number")]
    expenses_pool_target: Option<f64>,
    #[serde(alias = "savingsRate", deserialize_with = "loose_number")]
    savings_rate_percent: Option<f64>,
    #[serde(alias = "splitMethod", deserialize_with = "loose_policy")]
    split_policy: Option<SplitPolicy>,
    party_a_name: Option<String>,
    party_b_name: Option<String>,
    focus: Option<ChartFocus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPayload {
    #[serde(alias = "currentBalance", deserialize_with = "loose_number")]
    starting_balance: Option<f64>,
    #[serde(alias = "monthlySavings", deserialize_with = "loose_number")]
    monthly_contribution: Option<f64>,
    #[serde(alias = "extraMonthly", deserialize_with = "loose_number")]
    extra_monthly_contribution: Option<f64>,
    #[serde(
        alias = "annualRate",
        alias = "annualInterestPct",
        deserialize_with = "loose_number"
    )]
    annual_rate_percent: Option<f64>,
    #[serde(alias = "months", deserialize_with = "loose_months")]
    horizon_months: Option<i64>,
    #[serde(alias = "goal", deserialize_with = "loose_number")]
    target_amount: Option<f64>,
    #[serde(alias = "useCompounding", deserialize_with = "loose_flag")]
    compounding: Option<bool>,
    start_month: Option<String>,
}

fn loose_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let parsed = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|n| n.is_finite()))
}

fn loose_months<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(loose_number(deserializer)?.map(|m| m.trunc() as i64))
}

fn loose_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    })
}

fn loose_policy<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SplitPolicy>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => SplitPolicy::parse_loose(&s),
        _ => None,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanPayload {
    allocation: AllocatePayload,
    projection: ProjectPayload,
}

#[derive(Debug, Clone)]
pub struct AllocateRequest {
    pub input: AllocationInput,
    pub names: PartyNames,
    pub focus: ChartFocus,
}

#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub input: ProjectionInput,
    pub start_month: Option<String>,
}

pub fn allocate_request_from_payload(payload: AllocatePayload) -> AllocateRequest {
    let mut input = AllocationInput::default();
    let mut names = PartyNames::default();

    if let Some(v) = payload.income_a {
        input.income_a = v;
    }
    if let Some(v) = payload.income_b {
        input.income_b = v;
    }
    if let Some(v) = payload.monthly_pool_target {
        input.monthly_pool_target = v;
    }
    if let Some(v) = payload.expenses_pool_target {
        input.expenses_pool_target = v;
    }
    if let Some(v) = payload.savings_rate_percent {
        input.savings_rate_percent = v;
    }
    if let Some(v) = payload.split_policy {
        input.split_policy = v;
    }
    if let Some(v) = payload.party_a_name.filter(|s| !s.trim().is_empty()) {
        names.a = v;
    }
    if let Some(v) = payload.party_b_name.filter(|s| !s.trim().is_empty()) {
        names.b = v;
    }

    AllocateRequest {
        input,
        names,
        focus: payload.focus.unwrap_or_default(),
    }
}

/// `derived_contribution` replaces the default monthly contribution when the
/// payload does not carry one.
pub fn project_request_from_payload(
    payload: ProjectPayload,
    derived_contribution: Option<f64>,
) -> Result<ProjectRequest, String> {
    let mut input = ProjectionInput::default();
    if let Some(v) = derived_contribution {
        input.monthly_contribution = v;
    }

    if let Some(v) = payload.starting_balance {
        input.starting_balance = v;
    }
    if let Some(v) = payload.monthly_contribution {
        input.monthly_contribution = v;
    }
    if let Some(v) = payload.extra_monthly_contribution {
        input.extra_monthly_contribution = v;
    }
    if let Some(v) = payload.annual_rate_percent {
        input.annual_rate_percent = v;
    }
    if let Some(v) = payload.horizon_months {
        input.horizon_months = v;
    }
    if let Some(v) = payload.target_amount {
        input.target_amount = Some(v);
    }
    if let Some(v) = payload.compounding {
        input.compounding = v;
    }

    if input.horizon_months > MAX_HORIZON_MONTHS {
        return Err(format!("horizonMonths must be <= {MAX_HORIZON_MONTHS}"));
    }

    Ok(ProjectRequest {
        input,
        start_month: payload.start_month,
    })
}

pub fn plan_requests_from_payload(
    payload: PlanPayload,
) -> Result<(AllocateRequest, AllocationResult, ProjectRequest), String> {
    let allocate_request = allocate_request_from_payload(payload.allocation);
    let allocation = allocate(&allocate_request.input);
    let project_request = project_request_from_payload(
        payload.projection,
        Some(monthly_savings_from(&allocation)),
    )?;
    Ok((allocate_request, allocation, project_request))
}

#[cfg(test)]
pub fn allocate_request_from_json(json: &str) -> Result<AllocateRequest, String> {
    let payload = serde_json::from_str::<AllocatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(allocate_request_from_payload(payload))
}

#[cfg(test)]
pub fn project_request_from_json(json: &str) -> Result<ProjectRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    project_request_from_payload(payload, None)
}
