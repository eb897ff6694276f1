use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::api::{
    AllocateRequest, ServerConfig, build_allocation_response, build_projection_response,
};
use crate::chart::{ChartFocus, PartyNames};
use crate::core::{
    AllocationInput, MAX_HORIZON_MONTHS, ProjectionInput, SplitPolicy, allocate, project,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliSplitPolicy {
    Equal,
    Proportional,
    EqualLeftover,
}

impl From<CliSplitPolicy> for SplitPolicy {
    fn from(value: CliSplitPolicy) -> Self {
        match value {
            CliSplitPolicy::Equal => SplitPolicy::Equal,
            CliSplitPolicy::Proportional => SplitPolicy::Proportional,
            CliSplitPolicy::EqualLeftover => SplitPolicy::EqualLeftover,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliChartFocus {
    Totals,
    Monthly,
    Expenses,
    Savings,
}

impl From<CliChartFocus> for ChartFocus {
    fn from(value: CliChartFocus) -> Self {
        match value {
            CliChartFocus::Totals => ChartFocus::Totals,
            CliChartFocus::Monthly => ChartFocus::Monthly,
            CliChartFocus::Expenses => ChartFocus::Expenses,
            CliChartFocus::Savings => ChartFocus::Savings,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Household budget splitter and savings projector"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the JSON API
    Serve(ServeArgs),
    /// Split the household pools between two partners
    Allocate(AllocateArgs),
    /// Project a savings balance month by month
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    #[arg(
        long,
        default_value = ".nestegg",
        help = "Directory holding saved preferences"
    )]
    pub data_dir: PathBuf,
    #[arg(
        long,
        help = "Keep preferences in memory only; nothing is written to disk"
    )]
    pub in_memory: bool,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        ServerConfig {
            bind: args.bind,
            port: args.port,
            data_dir: (!args.in_memory).then_some(args.data_dir),
        }
    }
}

#[derive(Args, Debug)]
pub struct AllocateArgs {
    #[arg(long, default_value_t = 0.0)]
    pub income_a: f64,
    #[arg(long, default_value_t = 0.0)]
    pub income_b: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly expense account target")]
    pub monthly: f64,
    #[arg(long, default_value_t = 0.0, help = "Fixed expenses top-up target")]
    pub expenses: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Share of combined income set aside for savings, in percent"
    )]
    pub savings_rate: f64,
    #[arg(long, value_enum, default_value_t = CliSplitPolicy::Equal)]
    pub policy: CliSplitPolicy,
    #[arg(long, default_value = "Partner A")]
    pub name_a: String,
    #[arg(long, default_value = "Partner B")]
    pub name_b: String,
    #[arg(long, value_enum, default_value_t = CliChartFocus::Totals)]
    pub focus: CliChartFocus,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 0.0)]
    pub starting_balance: f64,
    #[arg(long, default_value_t = 200.0)]
    pub contribution: f64,
    #[arg(long, default_value_t = 0.0, help = "Extra amount saved every month")]
    pub extra: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 12, allow_hyphen_values = true)]
    pub months: i64,
    #[arg(long, help = "Balance to reach; omit to skip the time-to-target estimate")]
    pub target: Option<f64>,
    #[arg(long, help = "Add contributions without applying interest")]
    pub no_compounding: bool,
    #[arg(long, help = "First projected month as YYYY-MM, used for chart labels")]
    pub start_month: Option<String>,
}

pub fn run_allocate(args: AllocateArgs) -> Result<String, String> {
    let request = AllocateRequest {
        input: AllocationInput {
            income_a: args.income_a,
            income_b: args.income_b,
            monthly_pool_target: args.monthly,
            expenses_pool_target: args.expenses,
            savings_rate_percent: args.savings_rate,
            split_policy: args.policy.into(),
        },
        names: PartyNames {
            a: args.name_a,
            b: args.name_b,
        },
        focus: args.focus.into(),
    };
    let result = allocate(&request.input);
    if let Some(warning) = &result.warning {
        log::warn!("{warning}");
    }
    serde_json::to_string_pretty(&build_allocation_response(&request, &result))
        .map_err(|e| format!("Failed to render allocation: {e}"))
}

pub fn run_project(args: ProjectArgs) -> Result<String, String> {
    if args.months > MAX_HORIZON_MONTHS {
        return Err(format!("--months must be <= {MAX_HORIZON_MONTHS}"));
    }
    let input = ProjectionInput {
        starting_balance: args.starting_balance,
        monthly_contribution: args.contribution,
        extra_monthly_contribution: args.extra,
        annual_rate_percent: args.annual_rate,
        horizon_months: args.months,
        target_amount: args.target,
        compounding: !args.no_compounding,
    };
    let result = project(&input);
    serde_json::to_string_pretty(&build_projection_response(
        &result,
        args.start_month.as_deref(),
        input.target_amount,
    ))
    .map_err(|e| format!("Failed to render projection: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid arguments")
    }

    #[test]
    fn allocate_command_renders_rounded_json() {
        let cli = parse(&[
            "nestegg",
            "allocate",
            "--income-a",
            "2000",
            "--income-b",
            "1000",
            "--monthly",
            "900",
            "--expenses",
            "300",
            "--savings-rate",
            "10",
            "--policy",
            "proportional",
        ]);
        let Command::Allocate(args) = cli.command else {
            panic!("expected allocate command");
        };
        assert_eq!(args.policy, CliSplitPolicy::Proportional);

        let rendered = run_allocate(args).expect("allocation renders");
        let json: Value = serde_json::from_str(&rendered).expect("valid JSON");
        assert_eq!(json["perParty"]["expenses"]["a"], json!(200.0));
        assert_eq!(json["remainderB"], json!(500.0));
    }

    #[test]
    fn allocate_command_defaults_savings_rate() {
        let cli = parse(&["nestegg", "allocate", "--income-a", "1000"]);
        let Command::Allocate(args) = cli.command else {
            panic!("expected allocate command");
        };
        assert_eq!(args.savings_rate, 20.0);
        assert_eq!(args.policy, CliSplitPolicy::Equal);
    }

    #[test]
    fn project_command_renders_series() {
        let cli = parse(&[
            "nestegg",
            "project",
            "--starting-balance",
            "1000",
            "--contribution",
            "200",
            "--months",
            "3",
            "--target",
            "1500",
        ]);
        let Command::Project(args) = cli.command else {
            panic!("expected project command");
        };

        let rendered = run_project(args).expect("projection renders");
        let json: Value = serde_json::from_str(&rendered).expect("valid JSON");
        assert_eq!(json["chart"]["data"], json!([1200.0, 1400.0, 1600.0]));
        assert_eq!(json["chart"]["goal"], json!([1500.0, 1500.0, 1500.0]));
        assert_eq!(json["monthsToTarget"], json!(3));
    }

    #[test]
    fn project_command_rejects_excessive_horizon() {
        let cli = parse(&["nestegg", "project", "--months", "5000"]);
        let Command::Project(args) = cli.command else {
            panic!("expected project command");
        };
        let err = run_project(args).expect_err("must reject horizon");
        assert!(err.contains("--months"));
    }

    #[test]
    fn serve_args_map_to_server_config() {
        let cli = parse(&["nestegg", "serve", "--port", "9000", "--in-memory"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        let config = ServerConfig::from(args);
        assert_eq!(config.port, 9000);
        assert!(config.data_dir.is_none());

        let cli = parse(&["nestegg", "serve", "--data-dir", "/tmp/prefs"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        let config = ServerConfig::from(args);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/prefs")));
    }
}
