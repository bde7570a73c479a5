use clap::{Args, ValueEnum};
use serde_json::Value;

use rentbuy_core::analysis::engine;
use rentbuy_core::models::AnalysisInput;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Scenario {
    Buy,
    Rent,
    Both,
}

/// Arguments for the month-by-month cash-flow tables
#[derive(Args)]
pub struct CashFlowsArgs {
    /// Path to a JSON or YAML file with `user_inputs` and `tax_params`
    #[arg(long)]
    pub input: Option<String>,

    /// Which table to print
    #[arg(long, value_enum, default_value = "both")]
    pub scenario: Scenario,
}

pub fn run_cash_flows(args: CashFlowsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis: AnalysisInput = input::load(args.input.as_deref(), "cash-flows")?;
    engine::validate_analysis_input(&analysis)?;
    let detail = engine::get_detailed_cash_flows(&analysis.user_inputs, &analysis.tax_params)?;

    let value = match args.scenario {
        Scenario::Buy => serde_json::to_value(detail.buy)?,
        Scenario::Rent => serde_json::to_value(detail.rent)?,
        Scenario::Both => serde_json::to_value(detail)?,
    };
    Ok(value)
}
