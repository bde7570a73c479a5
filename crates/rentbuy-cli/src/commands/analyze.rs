use clap::Args;
use serde_json::Value;

use rentbuy_core::analysis::engine;
use rentbuy_core::models::AnalysisInput;

use crate::input;

/// Arguments for a full rent vs buy analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON or YAML file with `user_inputs` and `tax_params`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis: AnalysisInput = input::load(args.input.as_deref(), "analyze")?;
    let result = engine::analyze(&analysis)?;
    Ok(serde_json::to_value(result)?)
}
