//! Chart-ready arrays for the allocation doughnut and the projection line.
//!
//! This is the presentation edge: values are rounded to cents here and nowhere
//! in the computations themselves.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{AllocationResult, Pool, ProjectionResult};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFocus {
    #[default]
    Totals,
    Monthly,
    Expenses,
    Savings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyNames {
    pub a: String,
    pub b: String,
}

impl Default for PartyNames {
    fn default() -> Self {
        Self {
            a: "Partner A".to_string(),
            b: "Partner B".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    /// Flat goal line drawn beside a projection, one value per label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<Vec<f64>>,
}

pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

pub fn format_money(value: f64) -> String {
    format!("{:.2}", round_cents(value))
}

pub fn allocation_chart(
    result: &AllocationResult,
    focus: ChartFocus,
    names: &PartyNames,
) -> ChartData {
    let pool = match focus {
        ChartFocus::Totals => {
            return ChartData {
                labels: Pool::ALL.iter().map(|p| p.label().to_string()).collect(),
                data: Pool::ALL
                    .iter()
                    .map(|&p| round_cents(result.pool_target(p)))
                    .collect(),
                goal: None,
            };
        }
        ChartFocus::Monthly => Pool::Monthly,
        ChartFocus::Expenses => Pool::Expenses,
        ChartFocus::Savings => Pool::Savings,
    };

    let share = result.per_party.get(pool);
    ChartData {
        labels: vec![names.a.clone(), names.b.clone()],
        data: vec![round_cents(share.a), round_cents(share.b)],
        goal: None,
    }
}

/// Line chart of a projection. `start_month` is `YYYY-MM`; when it is missing or
/// malformed the labels fall back to `M1`, `M2`, ...
///
/// A goal line is added only for a positive goal and a non-empty series.
pub fn projection_chart(
    result: &ProjectionResult,
    start_month: Option<&str>,
    goal: Option<f64>,
) -> ChartData {
    let start = start_month.and_then(parse_start_month);
    let labels = result
        .series
        .iter()
        .map(|point| {
            start
                .and_then(|date| date.checked_add_months(Months::new(point.month_index - 1)))
                .map(|date| date.format("%b %Y").to_string())
                .unwrap_or_else(|| format!("M{}", point.month_index))
        })
        .collect();
    let goal = goal
        .filter(|g| g.is_finite() && *g > 0.0 && !result.series.is_empty())
        .map(|g| vec![round_cents(g); result.series.len()]);

    ChartData {
        labels,
        data: result
            .series
            .iter()
            .map(|point| round_cents(point.balance))
            .collect(),
        goal,
    }
}

pub fn parse_start_month(raw: &str) -> Option<NaiveDate> {
    let (year, month) = raw.trim().split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AllocationInput, ProjectionInput, SplitPolicy, allocate, project};

    fn scenario_allocation() -> AllocationResult {
        allocate(&AllocationInput {
            income_a: 2000.0,
            income_b: 1000.0,
            monthly_pool_target: 900.0,
            expenses_pool_target: 300.0,
            savings_rate_percent: 10.0,
            split_policy: SplitPolicy::Proportional,
        })
    }

    #[test]
    fn round_cents_rounds_half_away_from_zero_and_guards_nan() {
        assert_eq!(round_cents(1.005_f64 + 1e-12), 1.01);
        assert_eq!(round_cents(2.344), 2.34);
        assert_eq!(round_cents(-2.345_000_1), -2.35);
        assert_eq!(round_cents(f64::NAN), 0.0);
        assert_eq!(round_cents(f64::INFINITY), 0.0);
    }

    #[test]
    fn format_money_always_has_two_decimals() {
        assert_eq!(format_money(1250.0), "1250.00");
        assert_eq!(format_money(2.0 / 3.0), "0.67");
        assert_eq!(format_money(f64::NAN), "0.00");
    }

    #[test]
    fn totals_focus_charts_pool_targets() {
        let chart = allocation_chart(
            &scenario_allocation(),
            ChartFocus::Totals,
            &PartyNames::default(),
        );
        assert_eq!(chart.labels, vec!["Monthly", "Expenses", "Savings"]);
        assert_eq!(chart.data, vec![900.0, 300.0, 300.0]);
    }

    #[test]
    fn pool_focus_charts_party_contributions() {
        let names = PartyNames {
            a: "Sam".to_string(),
            b: "Alex".to_string(),
        };
        let chart = allocation_chart(&scenario_allocation(), ChartFocus::Monthly, &names);
        assert_eq!(chart.labels, vec!["Sam", "Alex"]);
        assert_eq!(chart.data, vec![600.0, 300.0]);
    }

    #[test]
    fn projection_chart_uses_calendar_labels_from_start_month() {
        let result = project(&ProjectionInput {
            starting_balance: 0.0,
            monthly_contribution: 100.0 / 3.0,
            horizon_months: 3,
            target_amount: None,
            ..ProjectionInput::default()
        });

        let chart = projection_chart(&result, Some("2025-11"), None);
        assert_eq!(chart.labels, vec!["Nov 2025", "Dec 2025", "Jan 2026"]);
        assert_eq!(chart.data, vec![33.33, 66.67, 100.0]);
        assert_eq!(chart.goal, None);
    }

    #[test]
    fn projection_chart_draws_flat_goal_line() {
        let result = project(&ProjectionInput {
            horizon_months: 3,
            ..ProjectionInput::default()
        });

        let chart = projection_chart(&result, None, Some(5000.0));
        assert_eq!(chart.goal, Some(vec![5000.0, 5000.0, 5000.0]));
        let json = serde_json::to_value(&chart).expect("serialize");
        assert_eq!(json["goal"], serde_json::json!([5000.0, 5000.0, 5000.0]));

        for goal in [Some(0.0), Some(-10.0), Some(f64::NAN), None] {
            let chart = projection_chart(&result, None, goal);
            assert_eq!(chart.goal, None);
            let json = serde_json::to_value(&chart).expect("serialize");
            assert!(json.get("goal").is_none());
        }
    }

    #[test]
    fn empty_projection_has_no_goal_line() {
        let result = project(&ProjectionInput {
            horizon_months: 0,
            ..ProjectionInput::default()
        });
        assert_eq!(projection_chart(&result, None, Some(5000.0)).goal, None);
    }

    #[test]
    fn projection_chart_falls_back_to_month_numbers() {
        let result = project(&ProjectionInput {
            horizon_months: 2,
            ..ProjectionInput::default()
        });

        for start in [None, Some("not-a-month"), Some("2025-13"), Some("25-01")] {
            let chart = projection_chart(&result, start, None);
            assert_eq!(chart.labels, vec!["M1", "M2"]);
        }
    }
}
