//! Orchestration: derive inputs, project both scenarios, reduce to metrics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::metrics;
use crate::error::RentBuyError;
use crate::models::{AnalysisInput, CalculationResults, DerivedInputs, TaxParams, UserInputs};
use crate::projection::buy_flow::{self, BuyCashFlowRow};
use crate::projection::rent_flow::{self, RentCashFlowRow, RentOpportunityCost};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::validation;
use crate::RentBuyResult;

/// Month-by-month tables of both scenarios plus the derived inputs used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedCashFlows {
    pub buy: Vec<BuyCashFlowRow>,
    pub rent: Vec<RentCashFlowRow>,
    /// Renting totals on their own, without the invested surplus.
    pub rent_opportunity_cost: RentOpportunityCost,
    pub derived_inputs: DerivedInputs,
}

fn mean<I: ExactSizeIterator<Item = Money>>(values: I) -> Money {
    let count = values.len();
    if count == 0 {
        return Decimal::ZERO;
    }
    values.sum::<Money>() / Decimal::from(count as u64)
}

fn project(user_inputs: &UserInputs, tax_params: &TaxParams) -> RentBuyResult<DetailedCashFlows> {
    // Bounds the per-month row allocations for every entry point
    if user_inputs.horizon_years == 0 || user_inputs.horizon_years > validation::MAX_HORIZON_YEARS {
        return Err(RentBuyError::InvalidInput {
            field: "horizon_years".into(),
            reason: format!(
                "Analysis horizon must be between 1 and {} years, got {}",
                validation::MAX_HORIZON_YEARS,
                user_inputs.horizon_years
            ),
        });
    }
    let derived_inputs = DerivedInputs::from_user_inputs(user_inputs)?;
    log::debug!(
        "derived inputs: loan {}, down payment {}, {} months",
        derived_inputs.loan_amount,
        derived_inputs.down_payment_amount,
        derived_inputs.horizon_months
    );

    let buy = buy_flow::calculate_buy_cash_flows(user_inputs, &derived_inputs, tax_params)?;
    let buy_net_outflows: Vec<Money> = buy.iter().map(|r| r.net_monthly_outflow).collect();
    let rent = rent_flow::calculate_rent_cash_flows(user_inputs, &derived_inputs, &buy_net_outflows)?;
    let rent_opportunity_cost = rent_flow::calculate_rent_opportunity_cost(user_inputs, &derived_inputs)?;

    Ok(DetailedCashFlows {
        buy,
        rent,
        rent_opportunity_cost,
        derived_inputs,
    })
}

/// Run the full rent vs buy analysis.
///
/// Deterministic: identical inputs give identical results. An undefined IRR
/// or a break-even that never happens leaves only that field `None`.
pub fn run_full_analysis(
    user_inputs: &UserInputs,
    tax_params: &TaxParams,
) -> RentBuyResult<CalculationResults> {
    let DetailedCashFlows {
        buy,
        rent,
        derived_inputs,
        ..
    } = project(user_inputs, tax_params)?;

    let final_home_equity = buy_flow::calculate_home_equity_at_exit(
        user_inputs,
        &derived_inputs,
        derived_inputs.horizon_months,
    )?;
    let final_portfolio_value = rent
        .last()
        .map(|r| r.portfolio_balance)
        .unwrap_or(Decimal::ZERO);

    let buy_outflows: Vec<Money> = buy.iter().map(|r| r.net_monthly_outflow).collect();
    let rent_outflows: Vec<Money> = rent.iter().map(|r| r.total_rent_outflow).collect();
    let npv_buy_costs = metrics::calculate_npv(&buy_outflows, derived_inputs.monthly_inflation_rate)?;
    let npv_rent_costs =
        metrics::calculate_npv(&rent_outflows, derived_inputs.monthly_inflation_rate)?;

    let buy_net_cost: Vec<Money> = buy.iter().map(|r| r.cumulative_net_cost).collect();
    let rent_net_cost: Vec<Money> = rent.iter().map(|r| r.cumulative_net_cost).collect();
    let breakeven_month = metrics::calculate_breakeven_month(&buy_net_cost, &rent_net_cost)?;

    let buy_cash: Vec<Money> = buy.iter().map(|r| r.cumulative_net_outflow).collect();
    let rent_cash: Vec<Money> = rent.iter().map(|r| r.cumulative_rent_outflow).collect();
    let cash_breakeven_month = metrics::calculate_breakeven_month(&buy_cash, &rent_cash)?;

    let irr_buy_investment =
        metrics::calculate_buy_vs_rent_irr(user_inputs, &buy, final_home_equity);

    let avg_buy_payment = mean(buy_outflows.iter().copied());
    let avg_rent_payment = mean(rent_outflows.iter().copied());
    let avg_invested_surplus = mean(rent.iter().map(|r| r.monthly_surplus));

    let total_interest_paid: Money = buy.iter().map(|r| r.mortgage_interest).sum();
    let total_tax_shield: Money = buy.iter().map(|r| r.tax_shield).sum();
    let total_appreciation = if final_home_equity > Decimal::ZERO {
        final_home_equity - derived_inputs.down_payment_amount
    } else {
        Decimal::ZERO
    };

    log::debug!(
        "analysis complete: equity {final_home_equity}, portfolio {final_portfolio_value}, breakeven {breakeven_month:?}"
    );

    Ok(CalculationResults {
        monthly_buy_payment: avg_buy_payment,
        // The projector outflow is already after the tax shield
        monthly_buy_after_tax: avg_buy_payment,
        monthly_rent_payment: avg_rent_payment,
        monthly_invested_surplus: avg_invested_surplus,
        home_equity_at_exit: final_home_equity,
        investment_portfolio_value: final_portfolio_value,
        net_worth_difference: final_home_equity - final_portfolio_value,
        npv_buy_costs,
        npv_rent_costs,
        npv_difference: npv_buy_costs - npv_rent_costs,
        irr_buy_investment,
        breakeven_month,
        cash_breakeven_month,
        total_interest_paid,
        total_tax_shield,
        total_appreciation,
    })
}

/// Per-month tables for both scenarios, for charting and detailed display.
pub fn get_detailed_cash_flows(
    user_inputs: &UserInputs,
    tax_params: &TaxParams,
) -> RentBuyResult<DetailedCashFlows> {
    project(user_inputs, tax_params)
}

/// Every user-input and calculation-input check, joined into one error.
pub fn validate_analysis_input(input: &AnalysisInput) -> RentBuyResult<()> {
    let mut errors = validation::validate_user_inputs(&input.user_inputs);
    // An overflowing horizon is already reported by the user-input checks
    if let Ok(derived) = DerivedInputs::from_user_inputs(&input.user_inputs) {
        errors.extend(validation::validate_calculation_inputs(
            &input.user_inputs,
            &derived,
            &input.tax_params,
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RentBuyError::InvalidInput {
            field: "user_inputs".into(),
            reason: errors.join("; "),
        })
    }
}

/// Validate, run the analysis and wrap it with feasibility warnings.
pub fn analyze(input: &AnalysisInput) -> RentBuyResult<ComputationOutput<CalculationResults>> {
    let start = Instant::now();

    validate_analysis_input(input)?;

    let (feasible, mut warnings) = validation::check_calculation_feasibility(&input.user_inputs);
    if !feasible {
        warnings.push("Scenario flagged as infeasible; results are indicative only".into());
    }

    let results = run_full_analysis(&input.user_inputs, &input.tax_params)?;
    if results.irr_buy_investment.is_none() {
        warnings.push("IRR of the buy decision is undefined for this scenario".into());
    }
    if results.breakeven_month.is_none() {
        warnings.push("Buying does not break even within the analysis horizon".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent vs Buy: monthly projection with invested surplus",
        &serde_json::json!({
            "horizon_years": input.user_inputs.horizon_years,
            "discount_rate_annual": input.user_inputs.inflation_discount_annual.to_string(),
            "alt_return_annual": input.user_inputs.alt_return_annual.to_string(),
            "breakeven_basis": "cumulative net cost (cash out minus recoverable wealth)",
            "location": input.tax_params.location,
        }),
        warnings,
        elapsed,
        results,
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

    fn inputs() -> UserInputs {
        let mut inputs = UserInputs::new(dec!(150000), dec!(800000), dec!(4000));
        inputs.income_spouse = dec!(100000);
        inputs.filing_status = FilingStatus::Married;
        inputs.mortgage_rate = dec!(0.06);
        inputs.annual_appreciation = dec!(0.04);
        inputs
    }

    #[test]
    fn test_summary_identities() {
        let results = run_full_analysis(&inputs(), &tax_params()).unwrap();
        assert_eq!(
            results.net_worth_difference,
            results.home_equity_at_exit - results.investment_portfolio_value
        );
        assert_eq!(
            results.npv_difference,
            results.npv_buy_costs - results.npv_rent_costs
        );
        assert_eq!(results.monthly_buy_after_tax, results.monthly_buy_payment);
    }

    #[test]
    fn test_totals_match_tables() {
        let detail = get_detailed_cash_flows(&inputs(), &tax_params()).unwrap();
        let results = run_full_analysis(&inputs(), &tax_params()).unwrap();
        let interest: Money = detail.buy.iter().map(|r| r.mortgage_interest).sum();
        assert_eq!(results.total_interest_paid, interest);
        assert_eq!(
            results.investment_portfolio_value,
            detail.rent.last().unwrap().portfolio_balance
        );
    }

    #[test]
    fn test_analyze_wraps_results() {
        let input = AnalysisInput {
            user_inputs: inputs(),
            tax_params: tax_params(),
        };
        let output = analyze(&input).unwrap();
        let direct = run_full_analysis(&input.user_inputs, &input.tax_params).unwrap();
        assert_eq!(output.result, direct);
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_analyze_rejects_invalid_inputs() {
        let mut bad = inputs();
        bad.horizon_years = 0;
        let input = AnalysisInput {
            user_inputs: bad,
            tax_params: tax_params(),
        };
        assert!(matches!(analyze(&input), Err(RentBuyError::InvalidInput { .. })));
    }

    #[test]
    fn test_out_of_range_horizon_rejected_before_projecting() {
        for years in [0, validation::MAX_HORIZON_YEARS + 1, 400_000_000, u32::MAX] {
            let mut bad = inputs();
            bad.horizon_years = years;
            assert!(matches!(
                get_detailed_cash_flows(&bad, &tax_params()),
                Err(RentBuyError::InvalidInput { .. })
            ));
            assert!(run_full_analysis(&bad, &tax_params()).is_err());
        }
    }

    #[test]
    fn test_oversized_term_is_error_not_panic() {
        let mut bad = inputs();
        bad.mortgage_term_years = 400_000_000;
        assert!(matches!(
            get_detailed_cash_flows(&bad, &tax_params()),
            Err(RentBuyError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_analysis_input_collects_messages() {
        let mut bad = inputs();
        bad.horizon_years = u32::MAX;
        bad.mortgage_term_years = 400_000_000;
        let err = validate_analysis_input(&AnalysisInput {
            user_inputs: bad,
            tax_params: tax_params(),
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Analysis horizon cannot exceed 50 years"), "{message}");
        assert!(message.contains("Mortgage term must be between 1 and 50 years"), "{message}");

        assert!(validate_analysis_input(&AnalysisInput {
            user_inputs: inputs(),
            tax_params: tax_params(),
        })
        .is_ok());
    }

    #[test]
    fn test_detail_carries_rent_opportunity_cost() {
        let detail = get_detailed_cash_flows(&inputs(), &tax_params()).unwrap();
        let rent_paid: Money = detail.rent.iter().map(|r| r.rent_payment).sum();
        let total_outflow: Money = detail.rent.iter().map(|r| r.total_rent_outflow).sum();
        assert_eq!(detail.rent_opportunity_cost.total_rent_paid, rent_paid);
        let renting = detail.rent_opportunity_cost.total_renting_costs;
        assert!((renting - total_outflow).abs() < dec!(0.000001), "{renting} vs {total_outflow}");
        assert_eq!(detail.rent.last().unwrap().cumulative_rent_outflow, total_outflow);
    }

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean(Vec::<Money>::new().into_iter()), Decimal::ZERO);
        assert_eq!(mean(vec![dec!(1), dec!(2), dec!(3)].into_iter()), dec!(2));
    }
}
