use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rentbuy_core::mortgage::amortization::{self, AmortizationRow, LoanTotals};

use crate::input;

/// Arguments for a fixed-rate amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Loan principal
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual mortgage rate (e.g. 0.065 for 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Print only the payment and totals, not the schedule
    #[arg(long)]
    pub summary: bool,

    /// Path to JSON/YAML with loan_amount, rate, term_years (overrides flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoanInput {
    loan_amount: Decimal,
    #[serde(default = "default_rate")]
    rate: Decimal,
    #[serde(default = "default_term")]
    term_years: u32,
}

fn default_rate() -> Decimal {
    dec!(0.07)
}

fn default_term() -> u32 {
    30
}

#[derive(Debug, Serialize)]
struct AmortizationSummary {
    monthly_payment: Decimal,
    #[serde(flatten)]
    totals: LoanTotals,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else {
        LoanInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            rate: args.rate.unwrap_or_else(default_rate),
            term_years: args.term_years.unwrap_or_else(default_term),
        }
    };

    let monthly_payment = amortization::monthly_payment(loan.loan_amount, loan.rate, loan.term_years)?;
    let schedule: Vec<AmortizationRow> =
        amortization::amortize(loan.loan_amount, loan.rate, loan.term_years)?;

    if args.summary {
        let summary = AmortizationSummary {
            monthly_payment,
            totals: amortization::total_payments(&schedule),
        };
        return Ok(serde_json::to_value(summary)?);
    }
    Ok(serde_json::to_value(schedule)?)
}
