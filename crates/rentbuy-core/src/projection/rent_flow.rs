//! Rent scenario: rent payments plus an investment portfolio funded by the
//! capital not spent on buying.
//!
//! The portfolio starts with the down payment and closing costs and, each
//! month, grows at the alternative return and receives whatever the buy
//! scenario would have cost above the rent. It is never debited: when renting
//! costs more than owning, nothing is added that month.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RentBuyError;
use crate::models::{DerivedInputs, UserInputs};
use crate::time_value;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One month of the rent scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentCashFlowRow {
    pub month: u32,
    pub rent_payment: Money,
    pub other_renter_costs: Money,
    pub total_rent_outflow: Money,
    /// Buy net outflow minus rent outflow, floored at zero, invested this month.
    pub monthly_surplus: Money,
    pub portfolio_balance: Money,
    pub cumulative_rent_outflow: Money,
    pub cumulative_surplus: Money,
    /// Upfront capital + cumulative rent outflow + cumulative surplus -
    /// portfolio balance.
    pub cumulative_net_cost: Money,
}

/// Totals of the rent scenario over the horizon, independent of the buy side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentOpportunityCost {
    pub total_rent_paid: Money,
    pub total_other_costs: Money,
    pub total_renting_costs: Money,
    pub average_monthly_rent: Money,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Project the rent scenario over the horizon.
///
/// `buy_net_outflows` is the buy scenario's `net_monthly_outflow` series and
/// must hold exactly one entry per horizon month.
pub fn calculate_rent_cash_flows(
    user_inputs: &UserInputs,
    derived_inputs: &DerivedInputs,
    buy_net_outflows: &[Money],
) -> RentBuyResult<Vec<RentCashFlowRow>> {
    if buy_net_outflows.len() != derived_inputs.horizon_months as usize {
        return Err(RentBuyError::InvalidInput {
            field: "buy_net_outflows".into(),
            reason: format!(
                "expected {} monthly buy outflows, got {}",
                derived_inputs.horizon_months,
                buy_net_outflows.len()
            ),
        });
    }

    let upfront_capital = user_inputs.upfront_capital();
    let other_costs = user_inputs.other_renter_costs_monthly;
    let rents = project_rent_growth(
        user_inputs.rent_today_monthly,
        user_inputs.rent_growth_pct,
        derived_inputs.horizon_months,
    )?;
    let surpluses: Vec<Money> = buy_net_outflows
        .iter()
        .zip(&rents)
        .map(|(buy_outflow, rent)| (*buy_outflow - (*rent + other_costs)).max(Decimal::ZERO))
        .collect();
    let balances = calculate_investment_portfolio_value(
        upfront_capital,
        &surpluses,
        derived_inputs.monthly_alt_return_rate,
    );

    let mut rows = Vec::with_capacity(rents.len());
    let mut cumulative_rent_outflow = Decimal::ZERO;
    let mut cumulative_surplus = Decimal::ZERO;

    for (idx, ((rent_payment, monthly_surplus), portfolio_balance)) in
        rents.into_iter().zip(surpluses).zip(balances).enumerate()
    {
        let total_rent_outflow = rent_payment + other_costs;
        cumulative_rent_outflow += total_rent_outflow;
        cumulative_surplus += monthly_surplus;

        rows.push(RentCashFlowRow {
            month: idx as u32 + 1,
            rent_payment,
            other_renter_costs: other_costs,
            total_rent_outflow,
            monthly_surplus,
            portfolio_balance,
            cumulative_rent_outflow,
            cumulative_surplus,
            cumulative_net_cost: upfront_capital + cumulative_rent_outflow + cumulative_surplus
                - portfolio_balance,
        });
    }

    Ok(rows)
}

/// Portfolio value after each contribution: grow first, then add.
pub fn calculate_investment_portfolio_value(
    initial_investment: Money,
    monthly_contributions: &[Money],
    monthly_return_rate: Rate,
) -> Vec<Money> {
    let growth = Decimal::ONE + monthly_return_rate;
    monthly_contributions
        .iter()
        .scan(initial_investment, |balance, contribution| {
            *balance = *balance * growth + contribution;
            Some(*balance)
        })
        .collect()
}

/// Monthly rent for `horizon_months` months starting at `initial_rent`.
pub fn project_rent_growth(
    initial_rent: Money,
    growth_rate_annual: Rate,
    horizon_months: u32,
) -> RentBuyResult<Vec<Money>> {
    let monthly_rate = growth_rate_annual / Decimal::from(12);
    (0..horizon_months)
        .map(|m| time_value::compound(monthly_rate, m).map(|growth| initial_rent * growth))
        .collect()
}

/// Total cost of renting over the horizon.
pub fn calculate_rent_opportunity_cost(
    user_inputs: &UserInputs,
    derived_inputs: &DerivedInputs,
) -> RentBuyResult<RentOpportunityCost> {
    let rents = project_rent_growth(
        user_inputs.rent_today_monthly,
        user_inputs.rent_growth_pct,
        derived_inputs.horizon_months,
    )?;
    let total_rent_paid: Money = rents.iter().copied().sum();
    let total_other_costs =
        user_inputs.other_renter_costs_monthly * Decimal::from(derived_inputs.horizon_months);

    let average_monthly_rent = if derived_inputs.horizon_months > 0 {
        total_rent_paid / Decimal::from(derived_inputs.horizon_months)
    } else {
        Decimal::ZERO
    };

    Ok(RentOpportunityCost {
        total_rent_paid,
        total_other_costs,
        total_renting_costs: total_rent_paid + total_other_costs,
        average_monthly_rent,
    })
}
