use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::engine::run_full_analysis;
use crate::error::RentBuyError;
use crate::models::{TaxParams, UserInputs};
use crate::types::*;
use crate::validation::MAX_HORIZON_YEARS;
use crate::RentBuyResult;

/// Numeric scenario inputs that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariableName {
    PurchasePrice,
    DownPaymentPct,
    MortgageRate,
    PropertyTaxRate,
    MaintenancePct,
    AnnualAppreciation,
    SellingCostPct,
    RentTodayMonthly,
    RentGrowthPct,
    AltReturnAnnual,
    InflationDiscountAnnual,
    HorizonYears,
}

impl SensitivityVariableName {
    /// Copy of `base` with this variable set to `value`.
    pub fn apply(&self, base: &UserInputs, value: Decimal) -> RentBuyResult<UserInputs> {
        let mut inputs = base.clone();
        match self {
            Self::PurchasePrice => inputs.purchase_price = value,
            Self::DownPaymentPct => inputs.down_payment_pct = value,
            Self::MortgageRate => inputs.mortgage_rate = value,
            Self::PropertyTaxRate => inputs.property_tax_rate = value,
            Self::MaintenancePct => inputs.maintenance_pct = value,
            Self::AnnualAppreciation => inputs.annual_appreciation = value,
            Self::SellingCostPct => inputs.selling_cost_pct = value,
            Self::RentTodayMonthly => inputs.rent_today_monthly = value,
            Self::RentGrowthPct => inputs.rent_growth_pct = value,
            Self::AltReturnAnnual => inputs.alt_return_annual = value,
            Self::InflationDiscountAnnual => inputs.inflation_discount_annual = value,
            Self::HorizonYears => {
                if !value.fract().is_zero()
                    || value < Decimal::ONE
                    || value > Decimal::from(MAX_HORIZON_YEARS)
                {
                    return Err(RentBuyError::InvalidInput {
                        field: "horizon_years".into(),
                        reason: format!(
                            "horizon must be a whole number of years from 1 to {MAX_HORIZON_YEARS}, got {value}"
                        ),
                    });
                }
                inputs.horizon_years = value.to_u32().ok_or_else(|| RentBuyError::InvalidInput {
                    field: "horizon_years".into(),
                    reason: format!("horizon {value} out of range"),
                })?;
            }
        }
        Ok(inputs)
    }

    pub fn current_value(&self, inputs: &UserInputs) -> Decimal {
        match self {
            Self::PurchasePrice => inputs.purchase_price,
            Self::DownPaymentPct => inputs.down_payment_pct,
            Self::MortgageRate => inputs.mortgage_rate,
            Self::PropertyTaxRate => inputs.property_tax_rate,
            Self::MaintenancePct => inputs.maintenance_pct,
            Self::AnnualAppreciation => inputs.annual_appreciation,
            Self::SellingCostPct => inputs.selling_cost_pct,
            Self::RentTodayMonthly => inputs.rent_today_monthly,
            Self::RentGrowthPct => inputs.rent_growth_pct,
            Self::AltReturnAnnual => inputs.alt_return_annual,
            Self::InflationDiscountAnnual => inputs.inflation_discount_annual,
            Self::HorizonYears => Decimal::from(inputs.horizon_years),
        }
    }
}

/// A variable swept from `min` to `max` in steps of `step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivitySweep {
    pub name: SensitivityVariableName,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

// ---------------------------------------------------------------------------
// One-way
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneWaySensitivityInput {
    pub base_inputs: UserInputs,
    pub tax_params: TaxParams,
    pub variable: SensitivitySweep,
}

/// Headline metrics at one sweep value; `None` when that run failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: Decimal,
    pub npv_difference: Option<Money>,
    pub net_worth_difference: Option<Money>,
    pub breakeven_month: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneWaySensitivityOutput {
    pub variable: SensitivityVariableName,
    pub base_value: Decimal,
    pub points: Vec<SensitivityPoint>,
}

// ---------------------------------------------------------------------------
// Two-way
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoWaySensitivityInput {
    pub base_inputs: UserInputs,
    pub tax_params: TaxParams,
    pub variable_1: SensitivitySweep,
    pub variable_2: SensitivitySweep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoWaySensitivityOutput {
    pub variable_1_name: SensitivityVariableName,
    pub variable_2_name: SensitivityVariableName,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    /// matrix[i][j] = net worth difference at (variable_1_values[i],
    /// variable_2_values[j]); `None` where the run failed
    pub matrix: Vec<Vec<Option<Money>>>,
}

/// Values from min to max by step, max always included.
fn generate_sweep_values(sweep: &SensitivitySweep) -> RentBuyResult<Vec<Decimal>> {
    if sweep.step <= Decimal::ZERO {
        return Err(RentBuyError::InvalidInput {
            field: format!("variable:{:?}", sweep.name),
            reason: "Step must be positive".into(),
        });
    }
    if sweep.min > sweep.max {
        return Err(RentBuyError::InvalidInput {
            field: format!("variable:{:?}", sweep.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = sweep.min;
    while current <= sweep.max {
        values.push(current);
        current += sweep.step;
    }
    if let Some(&last) = values.last() {
        if last < sweep.max {
            values.push(sweep.max);
        }
    }
    Ok(values)
}

pub fn run_one_way_sensitivity(
    input: &OneWaySensitivityInput,
) -> RentBuyResult<ComputationOutput<OneWaySensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let name = input.variable.name;

    let values = generate_sweep_values(&input.variable)?;
    let mut points = Vec::with_capacity(values.len());

    for value in values {
        let run = name
            .apply(&input.base_inputs, value)
            .and_then(|inputs| run_full_analysis(&inputs, &input.tax_params));
        match run {
            Ok(results) => points.push(SensitivityPoint {
                value,
                npv_difference: Some(results.npv_difference),
                net_worth_difference: Some(results.net_worth_difference),
                breakeven_month: results.breakeven_month,
            }),
            Err(e) => {
                warnings.push(format!("Evaluation failed at {value}: {e}"));
                points.push(SensitivityPoint {
                    value,
                    npv_difference: None,
                    net_worth_difference: None,
                    breakeven_month: None,
                });
            }
        }
    }

    let output = OneWaySensitivityOutput {
        variable: name,
        base_value: name.current_value(&input.base_inputs),
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "1-Way Rent vs Buy Sensitivity",
        &serde_json::json!({
            "variable": name,
            "min": input.variable.min.to_string(),
            "max": input.variable.max.to_string(),
            "step": input.variable.step.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

pub fn run_two_way_sensitivity(
    input: &TwoWaySensitivityInput,
) -> RentBuyResult<ComputationOutput<TwoWaySensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let (name_1, name_2) = (input.variable_1.name, input.variable_2.name);

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let run = name_1
                .apply(&input.base_inputs, *v1)
                .and_then(|inputs| name_2.apply(&inputs, *v2))
                .and_then(|inputs| run_full_analysis(&inputs, &input.tax_params));
            match run {
                Ok(results) => row.push(Some(results.net_worth_difference)),
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    let output = TwoWaySensitivityOutput {
        variable_1_name: name_1,
        variable_2_name: name_2,
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        matrix,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Rent vs Buy Sensitivity (net worth difference)",
        &serde_json::json!({
            "variable_1": name_1,
            "variable_2": name_2,
            "output_metric": "net_worth_difference",
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilingStatus;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn tax_params() -> TaxParams {
        TaxParams {
            federal_marginal_rate: dec!(0.24),
            state_marginal_rate: dec!(0.10),
            salt_cap: dec!(10000),
            standard_deduction: dec!(29200),
            location: "NYC, NY".into(),
            filing_status: FilingStatus::Married,
        }
    }

    fn base() -> UserInputs {
        let mut inputs = UserInputs::new(dec!(150000), dec!(800000), dec!(4000));
        inputs.income_spouse = dec!(100000);
        inputs.mortgage_rate = dec!(0.06);
        inputs.annual_appreciation = dec!(0.04);
        inputs.horizon_years = 5;
        inputs
    }

    fn sweep(name: SensitivityVariableName, min: Decimal, max: Decimal, step: Decimal) -> SensitivitySweep {
        SensitivitySweep { name, min, max, step }
    }

    #[test]
    fn test_sweep_includes_max() {
        let values = generate_sweep_values(&sweep(
            SensitivityVariableName::MortgageRate,
            dec!(0.05),
            dec!(0.06),
            dec!(0.004),
        ))
        .unwrap();
        assert_eq!(values, vec![dec!(0.05), dec!(0.054), dec!(0.058), dec!(0.06)]);
    }

    #[test]
    fn test_sweep_rejects_bad_ranges() {
        let zero_step = sweep(SensitivityVariableName::MortgageRate, dec!(0.05), dec!(0.06), Decimal::ZERO);
        assert!(generate_sweep_values(&zero_step).is_err());
        let inverted = sweep(SensitivityVariableName::MortgageRate, dec!(0.06), dec!(0.05), dec!(0.01));
        assert!(generate_sweep_values(&inverted).is_err());
    }

    #[test]
    fn test_apply_sets_field() {
        let applied = SensitivityVariableName::AltReturnAnnual
            .apply(&base(), dec!(0.09))
            .unwrap();
        assert_eq!(applied.alt_return_annual, dec!(0.09));
        assert_eq!(applied.purchase_price, dec!(800000));

        let horizon = SensitivityVariableName::HorizonYears.apply(&base(), dec!(7)).unwrap();
        assert_eq!(horizon.horizon_years, 7);
        assert!(SensitivityVariableName::HorizonYears.apply(&base(), dec!(2.5)).is_err());
    }

    #[test]
    fn test_apply_rejects_horizon_above_max() {
        let max = Decimal::from(MAX_HORIZON_YEARS);
        assert!(SensitivityVariableName::HorizonYears.apply(&base(), max).is_ok());
        for value in [max + Decimal::ONE, dec!(400000000), dec!(99999999999)] {
            assert!(matches!(
                SensitivityVariableName::HorizonYears.apply(&base(), value),
                Err(RentBuyError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_one_way_huge_horizon_is_recorded_not_fatal() {
        let input = OneWaySensitivityInput {
            base_inputs: base(),
            tax_params: tax_params(),
            variable: sweep(
                SensitivityVariableName::HorizonYears,
                dec!(10),
                dec!(400000000),
                dec!(399999990),
            ),
        };
        let output = run_one_way_sensitivity(&input).unwrap();
        let points = &output.result.points;
        assert_eq!(points.len(), 2);
        assert!(points[0].net_worth_difference.is_some());
        assert_eq!(points[1].net_worth_difference, None);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_one_way_appreciation_raises_net_worth_difference() {
        let input = OneWaySensitivityInput {
            base_inputs: base(),
            tax_params: tax_params(),
            variable: sweep(
                SensitivityVariableName::AnnualAppreciation,
                dec!(0.00),
                dec!(0.06),
                dec!(0.02),
            ),
        };
        let output = run_one_way_sensitivity(&input).unwrap();
        assert_eq!(output.result.base_value, dec!(0.04));
        assert_eq!(output.result.points.len(), 4);

        let nwd: Vec<Money> = output
            .result
            .points
            .iter()
            .map(|p| p.net_worth_difference.unwrap())
            .collect();
        for pair in nwd.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_one_way_records_failures() {
        let input = OneWaySensitivityInput {
            base_inputs: base(),
            tax_params: tax_params(),
            variable: sweep(SensitivityVariableName::HorizonYears, dec!(0.5), dec!(1.5), dec!(0.5)),
        };
        let output = run_one_way_sensitivity(&input).unwrap();
        let points = &output.result.points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].net_worth_difference, None);
        assert!(points[1].net_worth_difference.is_some());
        assert_eq!(points[2].net_worth_difference, None);
        assert_eq!(output.warnings.len(), 2);
    }

    #[test]
    fn test_two_way_matrix_shape() {
        let input = TwoWaySensitivityInput {
            base_inputs: base(),
            tax_params: tax_params(),
            variable_1: sweep(SensitivityVariableName::MortgageRate, dec!(0.05), dec!(0.07), dec!(0.01)),
            variable_2: sweep(SensitivityVariableName::AltReturnAnnual, dec!(0.05), dec!(0.07), dec!(0.02)),
        };
        let output = run_two_way_sensitivity(&input).unwrap();
        let result = &output.result;
        assert_eq!(result.matrix.len(), 3);
        assert!(result.matrix.iter().all(|row| row.len() == 2));

        // Higher mortgage rate, same alt return: buying looks worse
        let low_rate = result.matrix[0][0].unwrap();
        let high_rate = result.matrix[2][0].unwrap();
        assert!(high_rate < low_rate);
    }
}
