//! Scenario inputs, derived monthly parameters, tax parameters and the
//! summary result of an analysis run.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::mortgage::amortization::DEFAULT_PMI_THRESHOLD_LTV;
use crate::time_value;
use crate::types::{FilingStatus, Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_income_growth() -> Rate {
    dec!(0.03)
}
fn default_location() -> String {
    "NYC, NY".to_string()
}
fn default_down_payment_pct() -> Rate {
    dec!(0.20)
}
fn default_mortgage_rate() -> Rate {
    dec!(0.07)
}
fn default_mortgage_term_years() -> u32 {
    30
}
fn default_property_tax_rate() -> Rate {
    dec!(0.012)
}
fn default_maintenance_pct() -> Rate {
    dec!(0.015)
}
fn default_annual_appreciation() -> Rate {
    dec!(0.03)
}
fn default_selling_cost_pct() -> Rate {
    dec!(0.06)
}
fn default_rent_growth_pct() -> Rate {
    dec!(0.03)
}
fn default_alt_return_annual() -> Rate {
    dec!(0.07)
}
fn default_inflation_discount_annual() -> Rate {
    dec!(0.03)
}
fn default_horizon_years() -> u32 {
    10
}
fn default_pmi_threshold_ltv() -> Option<Rate> {
    Some(DEFAULT_PMI_THRESHOLD_LTV)
}
fn default_pmi_annual_pct() -> Option<Rate> {
    Some(dec!(0.005))
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Every parameter of a rent vs buy scenario.
///
/// Only `income_you`, `purchase_price` and `rent_today_monthly` are required
/// when deserializing; all other fields fall back to the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputs {
    // Household
    pub income_you: Money,
    #[serde(default)]
    pub income_spouse: Money,
    /// Annual income growth. Not used by the projection.
    #[serde(default = "default_income_growth")]
    pub income_growth: Rate,
    #[serde(default)]
    pub filing_status: FilingStatus,
    #[serde(default = "default_location")]
    pub location: String,

    // Buy side
    pub purchase_price: Money,
    #[serde(default = "default_down_payment_pct")]
    pub down_payment_pct: Rate,
    #[serde(default)]
    pub closing_costs_buy: Money,
    #[serde(default = "default_mortgage_rate")]
    pub mortgage_rate: Rate,
    #[serde(default = "default_mortgage_term_years")]
    pub mortgage_term_years: u32,
    /// Points paid upfront as a fraction of the loan amount.
    #[serde(default)]
    pub points_pct: Option<Rate>,
    /// Annual property tax as a fraction of current home value.
    #[serde(default = "default_property_tax_rate")]
    pub property_tax_rate: Rate,
    #[serde(default)]
    pub insurance_hoa_annual: Money,
    /// Annual maintenance as a fraction of current home value.
    #[serde(default = "default_maintenance_pct")]
    pub maintenance_pct: Rate,
    #[serde(default)]
    pub other_owner_costs_annual: Money,
    #[serde(default = "default_annual_appreciation")]
    pub annual_appreciation: Rate,
    #[serde(default = "default_selling_cost_pct")]
    pub selling_cost_pct: Rate,

    // Rent side
    pub rent_today_monthly: Money,
    #[serde(default = "default_rent_growth_pct")]
    pub rent_growth_pct: Rate,
    #[serde(default)]
    pub other_renter_costs_monthly: Money,

    // Finance
    #[serde(default = "default_alt_return_annual")]
    pub alt_return_annual: Rate,
    #[serde(default = "default_inflation_discount_annual")]
    pub inflation_discount_annual: Rate,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    // PMI, refinance
    /// PMI is charged while loan balance / home value exceeds this LTV.
    #[serde(default = "default_pmi_threshold_ltv")]
    pub pmi_threshold_ltv: Option<Rate>,
    #[serde(default = "default_pmi_annual_pct")]
    pub pmi_annual_pct: Option<Rate>,
    /// Carried for callers; the projection never refinances.
    #[serde(default)]
    pub refinance_enabled: bool,
    #[serde(default)]
    pub expected_refi_rate: Option<Rate>,
}

impl UserInputs {
    /// Scenario with the required fields set and every other field at its
    /// default.
    pub fn new(income_you: Money, purchase_price: Money, rent_today_monthly: Money) -> Self {
        Self {
            income_you,
            income_spouse: Decimal::ZERO,
            income_growth: default_income_growth(),
            filing_status: FilingStatus::default(),
            location: default_location(),
            purchase_price,
            down_payment_pct: default_down_payment_pct(),
            closing_costs_buy: Decimal::ZERO,
            mortgage_rate: default_mortgage_rate(),
            mortgage_term_years: default_mortgage_term_years(),
            points_pct: None,
            property_tax_rate: default_property_tax_rate(),
            insurance_hoa_annual: Decimal::ZERO,
            maintenance_pct: default_maintenance_pct(),
            other_owner_costs_annual: Decimal::ZERO,
            annual_appreciation: default_annual_appreciation(),
            selling_cost_pct: default_selling_cost_pct(),
            rent_today_monthly,
            rent_growth_pct: default_rent_growth_pct(),
            other_renter_costs_monthly: Decimal::ZERO,
            alt_return_annual: default_alt_return_annual(),
            inflation_discount_annual: default_inflation_discount_annual(),
            horizon_years: default_horizon_years(),
            pmi_threshold_ltv: default_pmi_threshold_ltv(),
            pmi_annual_pct: default_pmi_annual_pct(),
            refinance_enabled: false,
            expected_refi_rate: None,
        }
    }

    /// Combined household income.
    pub fn household_income(&self) -> Money {
        self.income_you + self.income_spouse
    }

    /// Capital the buyer spends upfront and the renter keeps invested.
    pub fn upfront_capital(&self) -> Money {
        self.purchase_price * self.down_payment_pct + self.closing_costs_buy
    }
}

/// Monthly parameters computed once per analysis from `UserInputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedInputs {
    pub loan_amount: Money,
    pub monthly_mortgage_rate: Rate,
    pub monthly_rent_growth_rate: Rate,
    pub monthly_alt_return_rate: Rate,
    pub monthly_inflation_rate: Rate,
    pub monthly_appreciation_rate: Rate,
    pub horizon_months: u32,
    pub down_payment_amount: Money,
}

impl DerivedInputs {
    /// Fails only when the horizon in months does not fit in a `u32`.
    pub fn from_user_inputs(user_inputs: &UserInputs) -> RentBuyResult<Self> {
        let twelve = dec!(12);
        let loan_amount = user_inputs.purchase_price * (Decimal::ONE - user_inputs.down_payment_pct);

        Ok(Self {
            loan_amount,
            monthly_mortgage_rate: user_inputs.mortgage_rate / twelve,
            monthly_rent_growth_rate: user_inputs.rent_growth_pct / twelve,
            monthly_alt_return_rate: user_inputs.alt_return_annual / twelve,
            monthly_inflation_rate: user_inputs.inflation_discount_annual / twelve,
            monthly_appreciation_rate: user_inputs.annual_appreciation / twelve,
            horizon_months: time_value::years_to_months(user_inputs.horizon_years, "horizon_years")?,
            down_payment_amount: user_inputs.purchase_price * user_inputs.down_payment_pct,
        })
    }
}

/// Tax parameters for a location and filing status, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxParams {
    pub federal_marginal_rate: Rate,
    /// State plus local marginal rate.
    pub state_marginal_rate: Rate,
    /// Ceiling on deductible state/local/property tax.
    pub salt_cap: Money,
    pub standard_deduction: Money,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub filing_status: FilingStatus,
}

impl TaxParams {
    pub fn combined_marginal_rate(&self) -> Rate {
        self.federal_marginal_rate + self.state_marginal_rate
    }
}

/// Scenario and tax parameters bundled for a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub user_inputs: UserInputs,
    pub tax_params: TaxParams,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Summary of one rent vs buy analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResults {
    // Monthly flows (averages over the horizon)
    pub monthly_buy_payment: Money,
    pub monthly_buy_after_tax: Money,
    pub monthly_rent_payment: Money,
    pub monthly_invested_surplus: Money,

    // End state
    pub home_equity_at_exit: Money,
    pub investment_portfolio_value: Money,
    /// Home equity minus investment portfolio; positive favours buying.
    pub net_worth_difference: Money,

    // Metrics
    pub npv_buy_costs: Money,
    pub npv_rent_costs: Money,
    /// Buy minus rent; negative means buying costs less in present value.
    pub npv_difference: Money,
    pub irr_buy_investment: Option<Rate>,
    /// First month the cumulative net cost of buying drops to or below renting.
    pub breakeven_month: Option<u32>,
    /// First month cumulative buy cash outflow drops to or below cumulative rent.
    pub cash_breakeven_month: Option<u32>,

    // Totals
    pub total_interest_paid: Money,
    pub total_tax_shield: Money,
    pub total_appreciation: Money,
}
