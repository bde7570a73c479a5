//! Tax benefit of owning: itemized mortgage interest, SALT-capped property tax
//! and amortized points, valued only on the excess over the standard
//! deduction.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::TaxParams;
use crate::types::{Money, Rate};

/// Points are deducted over the loan term or this many years, whichever is
/// shorter.
pub const MAX_POINTS_AMORTIZATION_YEARS: u32 = 5;

/// Monthly tax shield from itemizing.
///
/// `monthly_interest` and `monthly_property_tax` are annualized (×12);
/// `points_deduction_annual` is already an annual amount. Property tax is
/// capped at the SALT cap. The shield is the combined marginal rate applied to
/// the itemized total in excess of the standard deduction, returned as a
/// monthly figure, and exactly zero when the standard deduction is larger.
pub fn calculate_tax_shield(
    monthly_interest: Money,
    monthly_property_tax: Money,
    tax_params: &TaxParams,
    points_deduction_annual: Money,
) -> Money {
    let twelve = dec!(12);
    let annual_mortgage_interest = monthly_interest * twelve;
    let annual_property_tax = monthly_property_tax * twelve;

    let salt_limited_property_tax = annual_property_tax.min(tax_params.salt_cap);
    let total_itemizable =
        annual_mortgage_interest + salt_limited_property_tax + points_deduction_annual;

    if total_itemizable <= tax_params.standard_deduction {
        return Decimal::ZERO;
    }

    let excess_deduction = total_itemizable - tax_params.standard_deduction;
    excess_deduction * tax_params.combined_marginal_rate() / twelve
}

/// Years over which points are deducted: `min(term, 5)`.
pub fn points_amortization_years(term_years: u32) -> u32 {
    term_years.min(MAX_POINTS_AMORTIZATION_YEARS)
}

/// Number of months in which the points deduction applies.
pub fn points_window_months(term_years: u32) -> u32 {
    points_amortization_years(term_years) * 12
}

/// Annual deduction from points paid upfront, spread evenly over the points
/// amortization window. Zero when no points were paid.
pub fn points_annual_deduction(loan_amount: Money, points_pct: Option<Rate>, term_years: u32) -> Money {
    let years = points_amortization_years(term_years);
    match points_pct {
        Some(pct) if pct > Decimal::ZERO && loan_amount > Decimal::ZERO && years > 0 => {
            loan_amount * pct / Decimal::from(years)
        }
        _ => Decimal::ZERO,
    }
}
