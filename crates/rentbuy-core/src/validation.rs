//! Input validation, sanitization and feasibility checks.
//!
//! Validators collect every problem as a human-readable message instead of
//! stopping at the first one, so callers can show them all at once.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{DerivedInputs, TaxParams, UserInputs};
use crate::types::{Money, Rate};

const MAX_HOUSEHOLD_INCOME: Money = dec!(10000000);
const MAX_PURCHASE_PRICE: Money = dec!(50000000);
const MIN_DOWN_PAYMENT: Money = dec!(1000);
const MAX_MONTHLY_RENT: Money = dec!(100000);
/// Longest analysis horizon accepted anywhere in the engine.
pub const MAX_HORIZON_YEARS: u32 = 50;

fn outside(value: Rate, low: Rate, high: Rate) -> bool {
    value < low || value > high
}

fn monthly_income(user_inputs: &UserInputs) -> Money {
    user_inputs.household_income() / dec!(12)
}

/// Range and plausibility checks on raw user inputs. Empty when valid.
pub fn validate_user_inputs(inputs: &UserInputs) -> Vec<String> {
    let mut errors = Vec::new();

    if inputs.income_you <= Decimal::ZERO {
        errors.push("Your income must be greater than $0".to_string());
    }
    if inputs.household_income() > MAX_HOUSEHOLD_INCOME {
        errors.push("Combined income exceeds reasonable limits ($10M)".to_string());
    }

    if inputs.purchase_price <= Decimal::ZERO {
        errors.push("Purchase price must be greater than $0".to_string());
    }
    if inputs.purchase_price > MAX_PURCHASE_PRICE {
        errors.push("Purchase price exceeds reasonable limits ($50M)".to_string());
    }

    let down_payment = inputs.purchase_price * inputs.down_payment_pct;
    if inputs.down_payment_pct > Decimal::ZERO && down_payment < MIN_DOWN_PAYMENT {
        errors.push("Down payment amount is too small (minimum $1,000)".to_string());
    }
    if outside(inputs.down_payment_pct, Decimal::ZERO, Decimal::ONE) {
        errors.push("Down payment must be between 0% and 100% of purchase price".to_string());
    }

    let loan_amount = inputs.purchase_price * (Decimal::ONE - inputs.down_payment_pct);
    // A cash purchase never uses the rate
    if loan_amount > Decimal::ZERO
        && (inputs.mortgage_rate <= Decimal::ZERO || inputs.mortgage_rate > dec!(0.30))
    {
        errors.push("Mortgage rate must be greater than 0% and at most 30%".to_string());
    }
    if inputs.mortgage_term_years < 1 || inputs.mortgage_term_years > 50 {
        errors.push("Mortgage term must be between 1 and 50 years".to_string());
    }

    if inputs.rent_today_monthly <= Decimal::ZERO {
        errors.push("Monthly rent must be greater than $0".to_string());
    }
    if inputs.rent_today_monthly > MAX_MONTHLY_RENT {
        errors.push("Monthly rent exceeds reasonable limits ($100K)".to_string());
    }

    if outside(inputs.alt_return_annual, dec!(-0.50), dec!(0.50)) {
        errors.push("Alternative return rate must be between -50% and 50%".to_string());
    }
    if outside(inputs.annual_appreciation, dec!(-0.20), dec!(0.30)) {
        errors.push("Home appreciation rate must be between -20% and 30%".to_string());
    }
    if outside(inputs.rent_growth_pct, dec!(-0.10), dec!(0.20)) {
        errors.push("Rent growth rate must be between -10% and 20%".to_string());
    }

    if inputs.horizon_years < 1 {
        errors.push("Analysis horizon must be at least 1 year".to_string());
    }
    if inputs.horizon_years > MAX_HORIZON_YEARS {
        errors.push("Analysis horizon cannot exceed 50 years".to_string());
    }

    if outside(inputs.property_tax_rate, Decimal::ZERO, dec!(0.10)) {
        errors.push("Property tax rate must be between 0% and 10%".to_string());
    }

    let income = monthly_income(inputs);
    if loan_amount > Decimal::ZERO {
        // Interest-only approximation of the first payment
        let payment_estimate = loan_amount * inputs.mortgage_rate / dec!(12);
        if payment_estimate > income * dec!(0.80) {
            errors.push(
                "Mortgage payment exceeds 80% of monthly income - unrealistic scenario".to_string(),
            );
        }
    }
    if inputs.rent_today_monthly > income * dec!(0.90) {
        errors.push("Rent exceeds 90% of monthly income - unrealistic scenario".to_string());
    }

    errors
}

/// Checks on derived and tax parameters right before calculating.
pub fn validate_calculation_inputs(
    _user_inputs: &UserInputs,
    derived_inputs: &DerivedInputs,
    tax_params: &TaxParams,
) -> Vec<String> {
    let mut errors = Vec::new();

    if derived_inputs.loan_amount < Decimal::ZERO {
        errors.push("Loan amount cannot be negative".to_string());
    }
    if derived_inputs.horizon_months == 0 {
        errors.push("Analysis horizon must be positive".to_string());
    }

    if outside(tax_params.federal_marginal_rate, Decimal::ZERO, Decimal::ONE) {
        errors.push("Federal tax rate must be between 0% and 100%".to_string());
    }
    if outside(tax_params.state_marginal_rate, Decimal::ZERO, Decimal::ONE) {
        errors.push("State tax rate must be between 0% and 100%".to_string());
    }
    if tax_params.salt_cap < Decimal::ZERO {
        errors.push("SALT cap cannot be negative".to_string());
    }
    if tax_params.standard_deduction < Decimal::ZERO {
        errors.push("Standard deduction cannot be negative".to_string());
    }

    // 60% a year
    if derived_inputs.monthly_mortgage_rate > dec!(0.05) {
        errors.push("Mortgage rate too high for reliable calculations".to_string());
    }
    if derived_inputs.monthly_alt_return_rate < dec!(-0.10) {
        errors.push("Investment return rate too negative for reliable calculations".to_string());
    }

    errors
}

/// Round money to cents and rates to six places, and clamp the percentages
/// that have a hard physical range.
pub fn sanitize_inputs(inputs: &UserInputs) -> UserInputs {
    let mut clean = inputs.clone();

    for money in [
        &mut clean.purchase_price,
        &mut clean.rent_today_monthly,
        &mut clean.closing_costs_buy,
        &mut clean.insurance_hoa_annual,
        &mut clean.other_owner_costs_annual,
        &mut clean.other_renter_costs_monthly,
    ] {
        *money = money.round_dp(2);
    }
    for rate in [
        &mut clean.mortgage_rate,
        &mut clean.property_tax_rate,
        &mut clean.annual_appreciation,
        &mut clean.alt_return_annual,
        &mut clean.rent_growth_pct,
    ] {
        *rate = rate.round_dp(6);
    }

    clean.down_payment_pct = clean.down_payment_pct.clamp(Decimal::ZERO, Decimal::ONE);
    clean.maintenance_pct = clean.maintenance_pct.clamp(Decimal::ZERO, dec!(0.10));
    clean.selling_cost_pct = clean.selling_cost_pct.clamp(Decimal::ZERO, dec!(0.20));
    clean.pmi_threshold_ltv = clean
        .pmi_threshold_ltv
        .map(|ltv| ltv.clamp(dec!(0.05), dec!(0.95)));
    clean.pmi_annual_pct = clean
        .pmi_annual_pct
        .map(|pct| pct.clamp(Decimal::ZERO, dec!(0.05)));

    clean
}

/// Whether the scenario is plausible enough to be meaningful, plus warnings
/// about assumptions that may skew the result.
pub fn check_calculation_feasibility(user_inputs: &UserInputs) -> (bool, Vec<String>) {
    let mut warnings = Vec::new();
    let mut feasible = true;

    let income = monthly_income(user_inputs);
    let loan_amount = user_inputs.purchase_price * (Decimal::ONE - user_inputs.down_payment_pct);
    if loan_amount > Decimal::ZERO {
        // Interest plus a rough allowance for taxes and insurance
        let estimated_payment = loan_amount * user_inputs.mortgage_rate / dec!(12) * dec!(1.5);
        if estimated_payment > income * dec!(0.50) {
            warnings.push("Mortgage payment exceeds 50% of income - high debt-to-income ratio".to_string());
        }
        if estimated_payment > income {
            warnings.push("Mortgage payment exceeds total income - scenario not feasible".to_string());
            feasible = false;
        }
    }

    if user_inputs.rent_today_monthly > income * dec!(0.70) {
        warnings.push("Rent exceeds 70% of income - high rent burden".to_string());
    }

    if user_inputs.annual_appreciation > user_inputs.alt_return_annual + dec!(0.05) {
        warnings.push(
            "Home appreciation significantly exceeds investment returns - may favor buying unrealistically"
                .to_string(),
        );
    }
    if user_inputs.alt_return_annual > user_inputs.annual_appreciation + dec!(0.05) {
        warnings.push(
            "Investment returns significantly exceed home appreciation - may favor renting unrealistically"
                .to_string(),
        );
    }

    if user_inputs.horizon_years < 3 {
        warnings.push("Short analysis horizon - transaction costs may dominate".to_string());
    }
    if user_inputs.horizon_years > 30 {
        warnings.push("Very long analysis horizon - projections become less reliable".to_string());
    }

    if loan_amount > Decimal::ZERO && user_inputs.mortgage_rate > dec!(0.12) {
        warnings.push("Very high mortgage rate - consider if this scenario is realistic".to_string());
    }
    if loan_amount > Decimal::ZERO && user_inputs.mortgage_rate < dec!(0.02) {
        warnings.push("Very low mortgage rate - consider if this scenario is realistic".to_string());
    }

    (feasible, warnings)
}
