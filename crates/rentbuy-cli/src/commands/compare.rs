use clap::Args;
use serde_json::Value;

use rentbuy_core::analysis::{comparison, engine};
use rentbuy_core::models::AnalysisInput;

use crate::input;

/// Arguments for the buy/rent comparison and recommendation
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON or YAML file with `user_inputs` and `tax_params`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis: AnalysisInput = input::load(args.input.as_deref(), "compare")?;
    let output = engine::analyze(&analysis)?;
    let comparison = comparison::compare_scenarios(&output.result, &analysis.user_inputs);

    let mut value = serde_json::to_value(&output)?;
    value["result"] = serde_json::to_value(comparison)?;
    Ok(value)
}
