mod commands;
mod input;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::risk::{ExposuresArgs, ReportArgs, StressTestArgs};

/// Portfolio risk and liquidity reports
#[derive(Parser)]
#[command(
    name = "prisk",
    version,
    about = "Portfolio risk and liquidity reports",
    long_about = "A CLI for analysing fund and direct holdings with decimal precision. \
                  Produces exposure breakdowns, cash-flow history, liquidity forecasts, \
                  policy breaches, risk scores and stress scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Report date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    as_of: Option<String>,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full risk report
    Report(ReportArgs),
    /// Exposure breakdown by asset class, geography, manager, vintage, currency and sector
    Exposures(ExposuresArgs),
    /// Liquidity summary and the eight-quarter forward schedule
    Liquidity(ReportArgs),
    /// Trailing eight quarters of capital calls and distributions
    History(ReportArgs),
    /// Policy limit breaches
    Breaches(ReportArgs),
    /// Concentration, liquidity, performance and policy risk scores
    Scores(ReportArgs),
    /// Run liquidity stress scenarios
    StressTest(StressTestArgs),
    /// Print the default policy limits
    DefaultPolicy,
    /// Print the default stress scenarios
    DefaultScenarios,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    // stdout carries the report, so logs go to stderr.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn resolve_as_of(raw: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        Some(s) => Ok(portfolio_risk_core::parse_as_of(s)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> =
        resolve_as_of(cli.as_of.as_deref()).and_then(|as_of| {
            tracing::debug!(%as_of, "report date");
            match cli.command {
                Commands::Report(args) => commands::risk::run_report(args, as_of),
                Commands::Exposures(args) => commands::risk::run_exposures(args, as_of),
                Commands::Liquidity(args) => commands::risk::run_liquidity(args, as_of),
                Commands::History(args) => commands::risk::run_history(args, as_of),
                Commands::Breaches(args) => commands::risk::run_breaches(args, as_of),
                Commands::Scores(args) => commands::risk::run_scores(args, as_of),
                Commands::StressTest(args) => commands::risk::run_stress_test(args, as_of),
                Commands::DefaultPolicy => commands::defaults::run_default_policy(),
                Commands::DefaultScenarios => commands::defaults::run_default_scenarios(),
                Commands::Version => {
                    println!("prisk {}", env!("CARGO_PKG_VERSION"));
                    process::exit(0);
                }
            }
        });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
