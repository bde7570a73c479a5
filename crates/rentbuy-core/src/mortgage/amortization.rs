//! Fixed-rate mortgage amortization.
//!
//! The level payment comes from `time_value::pmt`; the closed-form remaining
//! balance reuses that same payment so the O(1) lookup and the iterative
//! schedule agree month for month.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentBuyError;
use crate::time_value;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

/// LTV above which PMI is charged when the caller does not say otherwise.
pub const DEFAULT_PMI_THRESHOLD_LTV: Rate = dec!(0.80);

/// Longest loan term a schedule is built for.
pub const MAX_TERM_YEARS: u32 = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub interest: Money,
    pub principal: Money,
    /// Balance after this month's payment.
    pub balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Totals over an entire schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTotals {
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_payments: Money,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Number of payments for a term of 1 to `MAX_TERM_YEARS` years.
fn term_months(term_years: u32) -> RentBuyResult<u32> {
    if term_years == 0 || term_years > MAX_TERM_YEARS {
        return Err(RentBuyError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Loan term must be between 1 and {MAX_TERM_YEARS} years, got {term_years}"),
        });
    }
    time_value::years_to_months(term_years, "term_years")
}

/// Level monthly payment for a loan. Zero when there is no loan.
pub fn monthly_payment(loan_amount: Money, annual_rate: Rate, term_years: u32) -> RentBuyResult<Money> {
    if loan_amount <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let n = term_months(term_years)?;
    time_value::pmt(annual_rate / dec!(12), n, -loan_amount, Decimal::ZERO)
}

/// Month-by-month schedule of a fixed-rate loan.
///
/// A non-positive `loan_amount` models a cash purchase and yields an empty
/// schedule.
pub fn amortize(
    loan_amount: Money,
    annual_rate: Rate,
    term_years: u32,
) -> RentBuyResult<Vec<AmortizationRow>> {
    if loan_amount <= Decimal::ZERO {
        return Ok(Vec::new());
    }

    let n = term_months(term_years)?;
    let r = annual_rate / dec!(12);
    let pmt = monthly_payment(loan_amount, annual_rate, term_years)?;

    let mut balance = loan_amount;
    let mut cumulative_interest = Decimal::ZERO;
    let mut cumulative_principal = Decimal::ZERO;
    let mut rows = Vec::with_capacity(n as usize);

    for month in 1..=n {
        let interest = balance * r;
        let principal = pmt - interest;
        // Floor against drift past zero in the last payment
        balance = (balance - principal).max(Decimal::ZERO);

        cumulative_interest += interest;
        cumulative_principal += principal;

        rows.push(AmortizationRow {
            month,
            interest,
            principal,
            balance,
            cumulative_interest,
            cumulative_principal,
        });
    }

    Ok(rows)
}

/// Balance outstanding after `month` payments, in constant time.
///
/// Zero for no loan, for `month == 0` and for any month at or past the end of
/// the term.
pub fn remaining_balance_at_month(
    loan_amount: Money,
    annual_rate: Rate,
    term_years: u32,
    month: u32,
) -> RentBuyResult<Money> {
    if loan_amount <= Decimal::ZERO || month == 0 {
        return Ok(Decimal::ZERO);
    }

    let total_months = time_value::years_to_months(term_years, "term_years")?;
    if month >= total_months {
        return Ok(Decimal::ZERO);
    }

    let r = annual_rate / dec!(12);
    let pmt = monthly_payment(loan_amount, annual_rate, term_years)?;
    let remaining = time_value::pv(r, total_months - month, -pmt, Decimal::ZERO)?;

    Ok(remaining.max(Decimal::ZERO))
}

/// Monthly PMI owed at the current loan-to-value, or `None` when the LTV is at
/// or below the threshold.
pub fn calculate_pmi(
    loan_balance: Money,
    home_value: Money,
    pmi_annual_rate: Rate,
    pmi_threshold_ltv: Rate,
) -> Option<Money> {
    if loan_balance <= Decimal::ZERO || home_value <= Decimal::ZERO {
        return None;
    }

    let current_ltv = loan_balance / home_value;
    if current_ltv <= pmi_threshold_ltv {
        return None;
    }

    Some(loan_balance * pmi_annual_rate / dec!(12))
}

/// Total interest, principal and payments over a schedule.
pub fn total_payments(schedule: &[AmortizationRow]) -> LoanTotals {
    let total_interest: Money = schedule.iter().map(|r| r.interest).sum();
    let total_principal: Money = schedule.iter().map(|r| r.principal).sum();

    LoanTotals {
        total_interest,
        total_principal,
        total_payments: total_interest + total_principal,
    }
}
