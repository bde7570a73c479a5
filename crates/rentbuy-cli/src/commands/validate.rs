use clap::Args;
use serde::Serialize;
use serde_json::Value;

use rentbuy_core::models::{AnalysisInput, DerivedInputs, UserInputs};
use rentbuy_core::validation;

use crate::input;

/// Arguments for input validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a JSON or YAML file with `user_inputs` and `tax_params`
    #[arg(long)]
    pub input: Option<String>,

    /// Include the sanitized inputs (rounded and clamped) in the output
    #[arg(long)]
    pub sanitize: bool,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<String>,
    feasible: bool,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sanitized: Option<UserInputs>,
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis: AnalysisInput = input::load(args.input.as_deref(), "validate")?;
    let user = &analysis.user_inputs;

    let mut errors = validation::validate_user_inputs(user);
    // An overflowing horizon is already among the user-input errors
    if let Ok(derived) = DerivedInputs::from_user_inputs(user) {
        errors.extend(validation::validate_calculation_inputs(
            user,
            &derived,
            &analysis.tax_params,
        ));
    }
    let (feasible, warnings) = validation::check_calculation_feasibility(user);

    let report = ValidationReport {
        valid: errors.is_empty(),
        errors,
        feasible,
        warnings,
        sanitized: args.sanitize.then(|| validation::sanitize_inputs(user)),
    };
    Ok(serde_json::to_value(report)?)
}
