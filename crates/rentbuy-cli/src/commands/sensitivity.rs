use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rentbuy_core::analysis::sensitivity::{
    self, OneWaySensitivityInput, SensitivitySweep, SensitivityVariableName,
    TwoWaySensitivityInput,
};
use rentbuy_core::models::AnalysisInput;

use crate::input;

/// Arguments for sensitivity sweeps over the base scenario
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON or YAML file with the base `user_inputs` and `tax_params`
    #[arg(long)]
    pub input: Option<String>,

    /// Variable to sweep as name:min:max:step
    /// (e.g. "mortgage_rate:0.05:0.08:0.005")
    #[arg(long)]
    pub var1: String,

    /// Second variable; produces a net worth difference matrix
    #[arg(long)]
    pub var2: Option<String>,
}

fn parse_sweep(spec: &str) -> Result<SensitivitySweep, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    let [name, min, max, step] = parts.as_slice() else {
        return Err(format!("Sensitivity variable must be name:min:max:step, got '{spec}'").into());
    };
    let name: SensitivityVariableName = serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| format!("Unknown sensitivity variable '{name}'"))?;
    Ok(SensitivitySweep {
        name,
        min: min.parse::<Decimal>()?,
        max: max.parse::<Decimal>()?,
        step: step.parse::<Decimal>()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base: AnalysisInput = input::load(args.input.as_deref(), "sensitivity")?;
    let variable_1 = parse_sweep(&args.var1)?;

    match args.var2 {
        Some(ref spec) => {
            let output = sensitivity::run_two_way_sensitivity(&TwoWaySensitivityInput {
                base_inputs: base.user_inputs,
                tax_params: base.tax_params,
                variable_1,
                variable_2: parse_sweep(spec)?,
            })?;
            Ok(serde_json::to_value(output)?)
        }
        None => {
            let output = sensitivity::run_one_way_sensitivity(&OneWaySensitivityInput {
                base_inputs: base.user_inputs,
                tax_params: base.tax_params,
                variable: variable_1,
            })?;
            Ok(serde_json::to_value(output)?)
        }
    }
}
