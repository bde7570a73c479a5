use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::{CalculationResults, UserInputs};
use crate::types::{Money, Rate};

/// Outcomes within this fraction of the purchase price are called even.
pub const NEUTRAL_BAND_PCT: Rate = dec!(0.05);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Rent,
    /// Too close to call on the numbers; lifestyle factors decide.
    Neutral,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "Buy"),
            Recommendation::Rent => write!(f, "Rent"),
            Recommendation::Neutral => write!(f, "Neutral - consider lifestyle factors"),
        }
    }
}

/// Side-by-side view of the two scenarios with a headline recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub buy_net_worth: Money,
    pub rent_net_worth: Money,
    pub net_worth_difference: Money,
    pub buy_npv_costs: Money,
    pub rent_npv_costs: Money,
    pub npv_difference: Money,
    /// Average monthly buy outflow minus average monthly rent outflow.
    pub monthly_difference: Money,
    pub breakeven_month: Option<u32>,
    pub recommendation: Recommendation,
}

/// Buy when it ends ahead on net worth, rent otherwise, neutral when the gap
/// is under 5% of the purchase price.
pub fn recommend(net_worth_difference: Money, purchase_price: Money) -> Recommendation {
    if net_worth_difference.abs() < purchase_price * NEUTRAL_BAND_PCT {
        Recommendation::Neutral
    } else if net_worth_difference > Money::ZERO {
        Recommendation::Buy
    } else {
        Recommendation::Rent
    }
}

pub fn compare_scenarios(
    results: &CalculationResults,
    user_inputs: &UserInputs,
) -> ScenarioComparison {
    ScenarioComparison {
        buy_net_worth: results.home_equity_at_exit,
        rent_net_worth: results.investment_portfolio_value,
        net_worth_difference: results.net_worth_difference,
        buy_npv_costs: results.npv_buy_costs,
        rent_npv_costs: results.npv_rent_costs,
        npv_difference: results.npv_difference,
        monthly_difference: results.monthly_buy_after_tax - results.monthly_rent_payment,
        breakeven_month: results.breakeven_month,
        recommendation: recommend(results.net_worth_difference, user_inputs.purchase_price),
    }
}
