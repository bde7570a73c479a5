use pretty_assertions::assert_eq;
use rentbuy_core::analysis::comparison::{compare_scenarios, Recommendation};
use rentbuy_core::analysis::engine::{analyze, get_detailed_cash_flows, run_full_analysis};
use rentbuy_core::models::{AnalysisInput, TaxParams, UserInputs};
use rentbuy_core::{FilingStatus, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn married_nyc() -> TaxParams {
    TaxParams {
        federal_marginal_rate: dec!(0.24),
        state_marginal_rate: dec!(0.10),
        salt_cap: dec!(10_000),
        standard_deduction: dec!(29_200),
        location: "NYC, NY".into(),
        filing_status: FilingStatus::Married,
    }
}

/// $800k home, 20% down, 6% 30-year loan, $4,000 rent, 10-year horizon.
fn nyc_family() -> UserInputs {
    let mut inputs = UserInputs::new(dec!(150_000), dec!(800_000), dec!(4_000));
    inputs.income_spouse = dec!(100_000);
    inputs.filing_status = FilingStatus::Married;
    inputs.mortgage_rate = dec!(0.06);
    inputs.annual_appreciation = dec!(0.04);
    inputs.alt_return_annual = dec!(0.07);
    inputs.horizon_years = 10;
    inputs
}

/// Expensive money, cheap rent, strong markets elsewhere.
fn expensive_money() -> UserInputs {
    let mut inputs = nyc_family();
    inputs.mortgage_rate = dec!(0.08);
    inputs.rent_today_monthly = dec!(3_500);
    inputs.alt_return_annual = dec!(0.09);
    inputs.annual_appreciation = dec!(0.02);
    inputs
}

fn cash_buyer() -> UserInputs {
    let mut inputs = nyc_family();
    inputs.purchase_price = dec!(500_000);
    inputs.down_payment_pct = Decimal::ONE;
    inputs.rent_today_monthly = dec!(3_000);
    inputs.horizon_years = 5;
    inputs
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_appreciating_market_favours_buying() {
    let results = run_full_analysis(&nyc_family(), &married_nyc()).unwrap();

    assert!(
        results.net_worth_difference > Decimal::ZERO,
        "expected buying ahead, got {}",
        results.net_worth_difference
    );
    let month = results.breakeven_month.expect("buying should break even");
    assert!(month <= 120, "break-even at month {month}");

    let irr = results.irr_buy_investment.expect("IRR should be defined");
    assert!(irr > dec!(-0.20) && irr < Decimal::ZERO, "IRR {irr}");

    assert!(results.total_interest_paid > dec!(300_000));
    assert!(results.total_tax_shield > Decimal::ZERO);
    assert!(results.total_appreciation > Decimal::ZERO);
}

#[test]
fn test_expensive_money_favours_renting() {
    let results = run_full_analysis(&expensive_money(), &married_nyc()).unwrap();
    assert!(
        results.net_worth_difference < Decimal::ZERO,
        "expected renting ahead, got {}",
        results.net_worth_difference
    );

    let comparison = compare_scenarios(&results, &expensive_money());
    assert_eq!(comparison.recommendation, Recommendation::Rent);
}

#[test]
fn test_cash_purchase_has_no_interest() {
    let inputs = cash_buyer();
    let results = run_full_analysis(&inputs, &married_nyc()).unwrap();
    assert_eq!(results.total_interest_paid, Decimal::ZERO);

    let detail = get_detailed_cash_flows(&inputs, &married_nyc()).unwrap();
    assert_eq!(detail.buy.len(), 60);
    assert_eq!(detail.rent.len(), 60);
    assert!(detail.buy.iter().all(|r| r.mortgage_payment.is_zero() && r.pmi.is_zero()));
}

/// Falling market over a short horizon: the sale never recovers the loan.
fn underwater_seller() -> UserInputs {
    let mut inputs = nyc_family();
    inputs.annual_appreciation = dec!(-0.05);
    inputs.horizon_years = 5;
    inputs
}

#[test]
fn test_undefined_metrics_degrade_only_their_fields() {
    let inputs = underwater_seller();
    let results = run_full_analysis(&inputs, &married_nyc()).unwrap();
    let detail = get_detailed_cash_flows(&inputs, &married_nyc()).unwrap();

    // No inflow at exit, so the buy stream never changes sign
    assert_eq!(results.irr_buy_investment, None);
    assert_eq!(results.breakeven_month, None);
    assert_eq!(results.cash_breakeven_month, None);

    assert_eq!(results.home_equity_at_exit, Decimal::ZERO);
    assert_eq!(results.total_appreciation, Decimal::ZERO);
    assert_eq!(detail.buy.len(), 60);
    assert_eq!(detail.buy.last().unwrap().home_equity, Decimal::ZERO);

    let portfolio = detail.rent.last().unwrap().portfolio_balance;
    assert!(portfolio > inputs.upfront_capital());
    assert_eq!(results.investment_portfolio_value, portfolio);
    assert_eq!(results.net_worth_difference, -portfolio);

    let interest: Money = detail.buy.iter().map(|r| r.mortgage_interest).sum();
    let shield: Money = detail.buy.iter().map(|r| r.tax_shield).sum();
    assert_eq!(results.total_interest_paid, interest);
    assert_eq!(results.total_tax_shield, shield);
    assert!(interest > Decimal::ZERO);

    assert!(results.npv_buy_costs > Decimal::ZERO);
    assert!(results.npv_rent_costs > Decimal::ZERO);
    assert!(results.npv_buy_costs > results.npv_rent_costs);
    assert_eq!(
        results.npv_difference,
        results.npv_buy_costs - results.npv_rent_costs
    );

    let comparison = compare_scenarios(&results, &inputs);
    assert_eq!(comparison.recommendation, Recommendation::Rent);

    let output = analyze(&AnalysisInput {
        user_inputs: inputs,
        tax_params: married_nyc(),
    })
    .unwrap();
    assert_eq!(output.result, results);
    assert!(output
        .warnings
        .iter()
        .any(|w| w.starts_with("IRR of the buy decision is undefined")));
    assert!(output
        .warnings
        .iter()
        .any(|w| w.starts_with("Buying does not break even")));
}

#[test]
fn test_oversized_inputs_are_errors() {
    let mut long_horizon = nyc_family();
    long_horizon.horizon_years = 400_000_000;
    assert!(get_detailed_cash_flows(&long_horizon, &married_nyc()).is_err());
    assert!(analyze(&AnalysisInput {
        user_inputs: long_horizon,
        tax_params: married_nyc(),
    })
    .is_err());

    let mut long_term = nyc_family();
    long_term.mortgage_term_years = 400_000_000;
    assert!(get_detailed_cash_flows(&long_term, &married_nyc()).is_err());
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_analysis_is_idempotent() {
    let first = run_full_analysis(&nyc_family(), &married_nyc()).unwrap();
    let second = run_full_analysis(&nyc_family(), &married_nyc()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_small_price_change_small_effect() {
    let base = run_full_analysis(&nyc_family(), &married_nyc()).unwrap();
    let mut bumped_inputs = nyc_family();
    bumped_inputs.purchase_price += dec!(1_000);
    let bumped = run_full_analysis(&bumped_inputs, &married_nyc()).unwrap();

    let delta = (bumped.net_worth_difference - base.net_worth_difference).abs();
    assert!(delta < dec!(10_000), "net worth moved by {delta}");
}

#[test]
fn test_higher_appreciation_raises_net_worth_difference() {
    let base = run_full_analysis(&nyc_family(), &married_nyc()).unwrap();
    let mut hot = nyc_family();
    hot.annual_appreciation = dec!(0.08);
    let hot = run_full_analysis(&hot, &married_nyc()).unwrap();
    assert!(hot.net_worth_difference > base.net_worth_difference);
}

#[test]
fn test_short_and_long_horizons_run() {
    for years in [1u32, 30] {
        let mut inputs = nyc_family();
        inputs.horizon_years = years;
        let results = run_full_analysis(&inputs, &married_nyc()).unwrap();
        let detail = get_detailed_cash_flows(&inputs, &married_nyc()).unwrap();
        assert_eq!(detail.buy.len(), (years * 12) as usize);
        assert!(results.home_equity_at_exit >= Decimal::ZERO);
    }
}

#[test]
fn test_detailed_tables_agree_with_summary() {
    let inputs = nyc_family();
    let results = run_full_analysis(&inputs, &married_nyc()).unwrap();
    let detail = get_detailed_cash_flows(&inputs, &married_nyc()).unwrap();

    assert_eq!(detail.buy.len(), 120);
    assert_eq!(detail.rent.len(), 120);
    assert_eq!(detail.derived_inputs.loan_amount, dec!(640_000));

    let shield: Money = detail.buy.iter().map(|r| r.tax_shield).sum();
    assert_eq!(results.total_tax_shield, shield);

    for (buy, rent) in detail.buy.iter().zip(&detail.rent) {
        assert_eq!(buy.month, rent.month);
        let expected_surplus = (buy.net_monthly_outflow - rent.total_rent_outflow).max(Decimal::ZERO);
        assert_eq!(rent.monthly_surplus, expected_surplus);
    }
}

// ===========================================================================
// Enveloped entry point
// ===========================================================================

#[test]
fn test_analyze_from_json_with_defaults() {
    let json = r#"{
        "user_inputs": {
            "income_you": "150000",
            "income_spouse": "100000",
            "purchase_price": "800000",
            "rent_today_monthly": "4000",
            "filing_status": "married",
            "mortgage_rate": "0.06",
            "annual_appreciation": "0.04"
        },
        "tax_params": {
            "federal_marginal_rate": "0.24",
            "state_marginal_rate": "0.10",
            "salt_cap": "10000",
            "standard_deduction": "29200"
        }
    }"#;
    let input: AnalysisInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.user_inputs.horizon_years, 10);
    assert_eq!(input.user_inputs.down_payment_pct, dec!(0.20));

    let output = analyze(&input).unwrap();
    let direct = run_full_analysis(&nyc_family(), &married_nyc()).unwrap();
    assert_eq!(output.result, direct);
}

#[test]
fn test_analyze_surfaces_feasibility_warnings() {
    let mut inputs = nyc_family();
    inputs.horizon_years = 2;
    let output = analyze(&AnalysisInput {
        user_inputs: inputs,
        tax_params: married_nyc(),
    })
    .unwrap();
    assert!(output
        .warnings
        .iter()
        .any(|w| w.starts_with("Short analysis horizon")));
}
