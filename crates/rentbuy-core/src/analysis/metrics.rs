//! Summary metrics over the projected cash-flow tables: NPV of costs, the
//! buy-vs-rent IRR and the break-even month.
//!
//! Outflows are positive numbers throughout, so an NPV here is the present
//! value of a cost and lower is better.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::RentBuyError;
use crate::models::UserInputs;
use crate::projection::buy_flow::BuyCashFlowRow;
use crate::time_value;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

/// Annualized IRRs below this are treated as unreliable.
pub const IRR_MIN_ANNUAL: Rate = dec!(-0.99);
/// Annualized IRRs above this are treated as unreliable.
pub const IRR_MAX_ANNUAL: Rate = dec!(10.0);

const IRR_MONTHLY_GUESS: Rate = dec!(0.005);

/// Present value of a monthly series, first flow undiscounted.
pub fn calculate_npv(cash_flows: &[Money], discount_rate_monthly: Rate) -> RentBuyResult<Money> {
    if cash_flows.is_empty() {
        return Ok(Decimal::ZERO);
    }
    time_value::npv(discount_rate_monthly, cash_flows)
}

/// `(1 + monthly)^12 - 1`
pub fn annualize_monthly_rate(monthly_rate: Rate) -> RentBuyResult<Rate> {
    Ok(time_value::compound(monthly_rate, 12)? - Decimal::ONE)
}

/// Keep an annual IRR only inside [-99%, +1000%].
pub fn apply_irr_sanity_band(annual_irr: Rate) -> Option<Rate> {
    if annual_irr < IRR_MIN_ANNUAL || annual_irr > IRR_MAX_ANNUAL {
        log::warn!("discarding annualized IRR {annual_irr} outside sanity band");
        return None;
    }
    Some(annual_irr)
}

/// Annualized IRR of a monthly cash-flow stream.
///
/// `None` when the solver fails or the result falls outside the sanity band.
pub fn calculate_irr(cash_flows: &[Money]) -> Option<Rate> {
    let monthly = match time_value::irr(cash_flows, IRR_MONTHLY_GUESS) {
        Ok(rate) => rate,
        Err(e) => {
            log::warn!("IRR undefined: {e}");
            return None;
        }
    };
    let annual = annualize_monthly_rate(monthly).ok()?;
    apply_irr_sanity_band(annual)
}

/// First month (1-indexed) where the cumulative buy cost is at or below the
/// cumulative rent cost; `Ok(None)` if that never happens.
///
/// The two series must be the same length.
pub fn calculate_breakeven_month(
    buy_cumulative_costs: &[Money],
    rent_cumulative_costs: &[Money],
) -> RentBuyResult<Option<u32>> {
    if buy_cumulative_costs.len() != rent_cumulative_costs.len() {
        return Err(RentBuyError::InvalidInput {
            field: "cumulative_costs".into(),
            reason: format!(
                "buy series has {} months, rent series has {}",
                buy_cumulative_costs.len(),
                rent_cumulative_costs.len()
            ),
        });
    }

    Ok(buy_cumulative_costs
        .iter()
        .zip(rent_cumulative_costs)
        .position(|(buy, rent)| buy <= rent)
        .map(|idx| idx as u32 + 1))
}

/// Signed monthly stream of the buy decision: upfront capital out at month 0,
/// each month's net outflow out, and sale equity in at the final month.
pub fn build_buy_vs_rent_cash_flows(
    user_inputs: &UserInputs,
    buy_cash_flows: &[BuyCashFlowRow],
    final_home_equity: Money,
) -> Vec<Money> {
    let initial_investment = -user_inputs.upfront_capital();

    let mut flows = Vec::with_capacity(buy_cash_flows.len() + 1);
    flows.push(initial_investment);
    flows.extend(buy_cash_flows.iter().map(|row| -row.net_monthly_outflow));

    if let Some(last) = flows.last_mut() {
        *last += final_home_equity;
    }
    flows
}

/// Annualized IRR of buying, see `build_buy_vs_rent_cash_flows`.
pub fn calculate_buy_vs_rent_irr(
    user_inputs: &UserInputs,
    buy_cash_flows: &[BuyCashFlowRow],
    final_home_equity: Money,
) -> Option<Rate> {
    let flows = build_buy_vs_rent_cash_flows(user_inputs, buy_cash_flows, final_home_equity);
    calculate_irr(&flows)
}
