mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortize::AmortizeArgs;
use commands::analyze::AnalyzeArgs;
use commands::cash_flows::CashFlowsArgs;
use commands::compare::CompareArgs;
use commands::sensitivity::SensitivityArgs;
use commands::validate::ValidateArgs;

/// Month-by-month rent vs buy analysis
#[derive(Parser)]
#[command(
    name = "rvb",
    version,
    about = "Month-by-month rent vs buy analysis",
    long_about = "Projects owning and renting side by side over a fixed horizon with \
                  decimal precision: amortized mortgage, owner costs, tax shield and \
                  appreciation against rent growth and an invested surplus. Reports \
                  net worth difference, NPV, IRR and break-even."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and print the summary metrics
    Analyze(AnalyzeArgs),
    /// Print the month-by-month buy and rent tables
    CashFlows(CashFlowsArgs),
    /// Print a mortgage amortization schedule
    Amortize(AmortizeArgs),
    /// Sweep one or two inputs and report how the outcome moves
    Sensitivity(SensitivityArgs),
    /// Compare the scenarios and recommend buy, rent or neutral
    Compare(CompareArgs),
    /// Check inputs for errors and feasibility warnings
    Validate(ValidateArgs),
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

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::CashFlows(args) => commands::cash_flows::run_cash_flows(args),
        Commands::Amortize(args) => commands::amortize::run_amortize(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Validate(args) => commands::validate::run_validate(args),
        Commands::Version => {
            println!("rvb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

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
