//! Buy scenario: month-by-month ownership cash flows.
//!
//! Each month combines the amortized mortgage payment, owner costs on the
//! appreciated home value, PMI at the current loan-to-value and the tax
//! shield from itemizing. Principal is an outflow but not a cost: it shows up
//! in `net_monthly_outflow` and not in `true_monthly_cost`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::{DerivedInputs, TaxParams, UserInputs};
use crate::mortgage::amortization::{self, AmortizationRow};
use crate::tax::shield;
use crate::time_value;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Recurring ownership costs for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerCosts {
    pub property_tax: Money,
    pub insurance_hoa: Money,
    pub maintenance: Money,
    pub other_costs: Money,
    pub pmi: Money,
    pub total_monthly_costs: Money,
}

/// One month of the buy scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyCashFlowRow {
    pub month: u32,
    pub home_value: Money,
    pub mortgage_interest: Money,
    pub mortgage_principal: Money,
    pub mortgage_payment: Money,
    /// Loan balance after this month's payment.
    pub loan_balance: Money,
    pub property_tax: Money,
    pub insurance_hoa: Money,
    pub maintenance: Money,
    pub other_costs: Money,
    pub pmi: Money,
    pub total_other_costs: Money,
    pub tax_shield: Money,
    pub gross_monthly_outflow: Money,
    pub net_monthly_outflow: Money,
    pub true_monthly_cost: Money,
    pub cumulative_net_outflow: Money,
    /// Down payment + closing costs + cumulative true cost.
    pub cumulative_true_cost: Money,
    /// Equity if the home were sold at the end of this month, net of selling
    /// costs and floored at zero.
    pub home_equity: Money,
    /// Upfront capital + cumulative net outflow - home equity.
    pub cumulative_net_cost: Money,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Home value at `month` (1-indexed); month 1 is the purchase price.
pub fn home_value_at_month(
    purchase_price: Money,
    monthly_appreciation: Rate,
    month: u32,
) -> RentBuyResult<Money> {
    let growth = time_value::compound(monthly_appreciation, month.saturating_sub(1))?;
    Ok(purchase_price * growth)
}

/// Ownership costs at `month` for a home currently worth `home_value`.
///
/// PMI is re-evaluated every month against the remaining balance and the
/// current value; it applies only when both a PMI rate and an LTV threshold
/// are configured.
pub fn calculate_monthly_owner_costs(
    user_inputs: &UserInputs,
    derived_inputs: &DerivedInputs,
    home_value: Money,
    month: u32,
) -> RentBuyResult<OwnerCosts> {
    let twelve = dec!(12);
    let property_tax = home_value * user_inputs.property_tax_rate / twelve;
    let insurance_hoa = user_inputs.insurance_hoa_annual / twelve;
    let maintenance = home_value * user_inputs.maintenance_pct / twelve;
    let other_costs = user_inputs.other_owner_costs_annual / twelve;

    let pmi = match (user_inputs.pmi_annual_pct, user_inputs.pmi_threshold_ltv) {
        (Some(pmi_rate), Some(threshold)) if pmi_rate > Decimal::ZERO => {
            let balance = amortization::remaining_balance_at_month(
                derived_inputs.loan_amount,
                user_inputs.mortgage_rate,
                user_inputs.mortgage_term_years,
                month,
            )?;
            amortization::calculate_pmi(balance, home_value, pmi_rate, threshold)
                .unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    };

    Ok(OwnerCosts {
        property_tax,
        insurance_hoa,
        maintenance,
        other_costs,
        pmi,
        total_monthly_costs: property_tax + insurance_hoa + maintenance + other_costs + pmi,
    })
}

/// All-zero schedule standing in for a cash purchase.
fn zero_schedule(months: u32) -> Vec<AmortizationRow> {
    (1..=months)
        .map(|month| AmortizationRow {
            month,
            interest: Decimal::ZERO,
            principal: Decimal::ZERO,
            balance: Decimal::ZERO,
            cumulative_interest: Decimal::ZERO,
            cumulative_principal: Decimal::ZERO,
        })
        .collect()
}

fn net_sale_equity(home_value: Money, loan_balance: Money, selling_cost_pct: Rate) -> Money {
    let selling_costs = home_value * selling_cost_pct;
    (home_value - loan_balance - selling_costs).max(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Project the buy scenario over the full horizon, one row per month.
pub fn calculate_buy_cash_flows(
    user_inputs: &UserInputs,
    derived_inputs: &DerivedInputs,
    tax_params: &TaxParams,
) -> RentBuyResult<Vec<BuyCashFlowRow>> {
    let mut schedule = amortization::amortize(
        derived_inputs.loan_amount,
        user_inputs.mortgage_rate,
        user_inputs.mortgage_term_years,
    )?;
    if schedule.is_empty() {
        schedule = zero_schedule(derived_inputs.horizon_months);
    }
    log::debug!(
        "buy projection: {} months, schedule of {} rows, loan {}",
        derived_inputs.horizon_months,
        schedule.len(),
        derived_inputs.loan_amount
    );

    let points_annual = shield::points_annual_deduction(
        derived_inputs.loan_amount,
        user_inputs.points_pct,
        user_inputs.mortgage_term_years,
    );
    let points_window = shield::points_window_months(user_inputs.mortgage_term_years);
    let upfront_capital = user_inputs.upfront_capital();

    let mut rows = Vec::with_capacity(derived_inputs.horizon_months as usize);
    let mut cumulative_net_outflow = Decimal::ZERO;
    let mut cumulative_true_cost = upfront_capital;

    for month in 1..=derived_inputs.horizon_months {
        let home_value = home_value_at_month(
            user_inputs.purchase_price,
            derived_inputs.monthly_appreciation_rate,
            month,
        )?;

        // Past the end of the term the loan is paid off
        let (interest, principal, loan_balance) = match schedule.get((month - 1) as usize) {
            Some(row) => (row.interest, row.principal, row.balance),
            None => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };
        let mortgage_payment = interest + principal;

        let costs = calculate_monthly_owner_costs(user_inputs, derived_inputs, home_value, month)?;

        let points_deduction = if month <= points_window {
            points_annual
        } else {
            Decimal::ZERO
        };
        let tax_shield =
            shield::calculate_tax_shield(interest, costs.property_tax, tax_params, points_deduction);

        let gross_outflow = mortgage_payment + costs.total_monthly_costs;
        let net_outflow = gross_outflow - tax_shield;
        let true_monthly_cost = interest + costs.total_monthly_costs - tax_shield;

        cumulative_net_outflow += net_outflow;
        cumulative_true_cost += true_monthly_cost;

        let home_equity = net_sale_equity(home_value, loan_balance, user_inputs.selling_cost_pct);

        rows.push(BuyCashFlowRow {
            month,
            home_value,
            mortgage_interest: interest,
            mortgage_principal: principal,
            mortgage_payment,
            loan_balance,
            property_tax: costs.property_tax,
            insurance_hoa: costs.insurance_hoa,
            maintenance: costs.maintenance,
            other_costs: costs.other_costs,
            pmi: costs.pmi,
            total_other_costs: costs.total_monthly_costs,
            tax_shield,
            gross_monthly_outflow: gross_outflow,
            net_monthly_outflow: net_outflow,
            true_monthly_cost,
            cumulative_net_outflow,
            cumulative_true_cost,
            home_equity,
            cumulative_net_cost: upfront_capital + cumulative_net_outflow - home_equity,
        });
    }

    Ok(rows)
}

/// Net equity if the home is sold at `exit_month`, after selling costs.
///
/// Floored at zero: an underwater owner is modelled as walking away.
pub fn calculate_home_equity_at_exit(
    user_inputs: &UserInputs,
    derived_inputs: &DerivedInputs,
    exit_month: u32,
) -> RentBuyResult<Money> {
    let exit_home_value = home_value_at_month(
        user_inputs.purchase_price,
        derived_inputs.monthly_appreciation_rate,
        exit_month,
    )?;
    let remaining_balance = amortization::remaining_balance_at_month(
        derived_inputs.loan_amount,
        user_inputs.mortgage_rate,
        user_inputs.mortgage_term_years,
        exit_month,
    )?;

    Ok(net_sale_equity(
        exit_home_value,
        remaining_balance,
        user_inputs.selling_cost_pct,
    ))
}
