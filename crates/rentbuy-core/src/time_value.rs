use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::RentBuyError;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const STEP_THRESHOLD: Decimal = dec!(0.000000000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 200;

/// Lower clamp for the Newton iterate (per period).
const NEWTON_FLOOR: Rate = dec!(-0.99);
/// Upper clamp for the Newton iterate (per period).
const NEWTON_CEILING: Rate = dec!(1.0);

/// Bisection bracket (per period). Monthly -32% annualizes just below -99%,
/// monthly +25% well above +1000%.
const BISECTION_LOW: Rate = dec!(-0.32);
const BISECTION_HIGH: Rate = dec!(0.25);

/// Whole years to monthly periods, rejecting counts that overflow `u32`.
pub fn years_to_months(years: u32, field: &str) -> RentBuyResult<u32> {
    years.checked_mul(12).ok_or_else(|| RentBuyError::InvalidInput {
        field: field.into(),
        reason: format!("{years} years overflows the month count"),
    })
}

/// (1 + rate)^periods, checked against overflow.
pub fn compound(rate: Rate, periods: u32) -> RentBuyResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| RentBuyError::InvalidInput {
            field: "rate".into(),
            reason: format!("(1 + {rate})^{periods} overflows"),
        })
}

/// Net Present Value of a series of cash flows, first flow at t = 0
pub fn npv(rate: Rate, cash_flows: &[Money]) -> RentBuyResult<Money> {
    if rate <= dec!(-1) {
        return Err(RentBuyError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| RentBuyError::DivisionByZero {
                    context: format!("NPV discount factor overflow at period {t}"),
                })?;
        }
        if discount.is_zero() {
            return Err(RentBuyError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return (per period).
///
/// Newton-Raphson from `guess`; when Newton diverges, overflows or stalls the
/// root is bracketed and refined by bisection instead.
pub fn irr(cash_flows: &[Money], guess: Rate) -> RentBuyResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(RentBuyError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    let has_inflow = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_outflow = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !(has_inflow && has_outflow) {
        return Err(RentBuyError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least one positive and one negative cash flow".into(),
        });
    }

    match newton_irr(cash_flows, guess) {
        Ok(rate) => Ok(rate),
        Err(e) => {
            log::warn!("IRR Newton-Raphson failed ({e}); falling back to bisection");
            bisection_irr(cash_flows, BISECTION_LOW, BISECTION_HIGH)
        }
    }
}

fn newton_irr(cash_flows: &[Money], guess: Rate) -> RentBuyResult<Rate> {
    let mut rate = guess;
    let mut last_delta = Decimal::ZERO;

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) =
            npv_with_derivative(rate, cash_flows).ok_or_else(|| {
                RentBuyError::ConvergenceFailure {
                    function: "IRR".into(),
                    iterations: i,
                    last_delta,
                }
            })?;
        last_delta = npv_val;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(RentBuyError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let step = npv_val
            .checked_div(dnpv)
            .ok_or_else(|| RentBuyError::DivisionByZero {
                context: "IRR Newton step".into(),
            })?;
        rate -= step;

        if step.abs() < STEP_THRESHOLD {
            return Ok(rate);
        }

        // Guard against divergence
        if rate < NEWTON_FLOOR {
            rate = NEWTON_FLOOR;
        } else if rate > NEWTON_CEILING {
            rate = NEWTON_CEILING;
        }
    }

    Err(RentBuyError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}

/// NPV and dNPV/dr in one pass. `None` on overflow.
fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let inv = Decimal::ONE.checked_div(one_plus_r)?;

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        let pv = cf.checked_mul(discount)?;
        npv_val = npv_val.checked_add(pv)?;
        if t > 0 {
            let term = Decimal::from(t as u64).checked_mul(pv)?.checked_mul(inv)?;
            dnpv = dnpv.checked_sub(term)?;
        }
        discount = discount.checked_mul(inv)?;
    }

    Some((npv_val, dnpv))
}

/// A positive multiple of NPV at `rate`, computed without overflow.
///
/// Non-negative rates discount back to t = 0 (Horner from the last flow);
/// negative rates compound forward to the last period, which is the NPV
/// scaled by (1 + r)^n. Both keep every intermediate bounded by the sum of
/// absolute flows, so only the sign and root location are meaningful.
fn scaled_npv(rate: Rate, cash_flows: &[Money]) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let mut acc = Decimal::ZERO;
    if rate >= Decimal::ZERO {
        for cf in cash_flows.iter().rev() {
            acc = acc.checked_div(one_plus_r)?.checked_add(*cf)?;
        }
    } else {
        for cf in cash_flows {
            acc = acc.checked_mul(one_plus_r)?.checked_add(*cf)?;
        }
    }
    Some(acc)
}

fn bisection_irr(cash_flows: &[Money], mut lo: Rate, mut hi: Rate) -> RentBuyResult<Rate> {
    let eval = |rate: Rate| {
        scaled_npv(rate, cash_flows).ok_or_else(|| RentBuyError::DivisionByZero {
            context: format!("IRR bisection at rate {rate}"),
        })
    };

    let mut f_lo = eval(lo)?;
    let f_hi = eval(hi)?;
    if f_lo.is_zero() {
        return Ok(lo);
    }
    if f_hi.is_zero() {
        return Ok(hi);
    }
    if f_lo.is_sign_negative() == f_hi.is_sign_negative() {
        return Err(RentBuyError::ConvergenceFailure {
            function: "IRR bisection".into(),
            iterations: 0,
            last_delta: f_lo.abs().min(f_hi.abs()),
        });
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = eval(mid)?;
        if f_mid.is_zero() || (hi - lo) < STEP_THRESHOLD {
            return Ok(mid);
        }
        if f_mid.is_sign_negative() == f_lo.is_sign_negative() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Ok((lo + hi) / dec!(2))
}

/// Present Value
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> RentBuyResult<Money> {
    if rate.is_zero() {
        return Ok(-(pmt * Decimal::from(nper) + fv));
    }

    let factor = compound(rate, nper)?;

    if factor.is_zero() {
        return Err(RentBuyError::DivisionByZero {
            context: "PV factor".into(),
        });
    }

    let annuity_factor = (Decimal::ONE - Decimal::ONE / factor) / rate;
    Ok(-(pmt * annuity_factor + fv / factor))
}

/// Payment (PMT)
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> RentBuyResult<Money> {
    if nper == 0 {
        return Err(RentBuyError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = compound(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(RentBuyError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_years_to_months() {
        assert_eq!(years_to_months(30, "term_years").unwrap(), 360);
        assert!(matches!(
            years_to_months(400_000_000, "horizon_years"),
            Err(RentBuyError::InvalidInput { field, .. }) if field == "horizon_years"
        ));
    }

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_below_minus_one() {
        assert!(npv(dec!(-1), &[dec!(100)]).is_err());
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs, dec!(0.10)).unwrap();
        // IRR should be ~9.7%
        assert!((result - dec!(0.097)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_negative_return() {
        // Get back 900 on 1000 after one period: -10%
        let cfs = vec![dec!(-1000), dec!(900)];
        let result = irr(&cfs, dec!(0.05)).unwrap();
        assert!((result - dec!(-0.10)).abs() < dec!(0.0001), "got {result}");
    }

    #[test]
    fn test_irr_long_series_falls_back_without_overflow() {
        // 360 months of -100 followed by a large terminal inflow; a bad guess
        // pushes Newton into the clamp, bisection still finds the root.
        let mut cfs = vec![dec!(-10000)];
        cfs.extend(std::iter::repeat(dec!(-100)).take(359));
        cfs.push(dec!(200000));
        let result = irr(&cfs, dec!(0.9)).unwrap();
        let check = npv(result, &cfs).unwrap();
        assert!(check.abs() < dec!(1), "NPV at IRR should be ~0, got {check}");
    }

    #[test]
    fn test_irr_requires_sign_change() {
        let cfs = vec![dec!(-100), dec!(-50), dec!(-25)];
        assert!(irr(&cfs, dec!(0.01)).is_err());
    }

    #[test]
    fn test_irr_requires_two_flows() {
        assert!(irr(&[dec!(-100)], dec!(0.01)).is_err());
    }

    #[test]
    fn test_scaled_npv_sign_matches_npv() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        for rate in [dec!(-0.2), dec!(-0.01), dec!(0), dec!(0.05), dec!(0.2)] {
            let exact = npv(rate, &cfs).unwrap();
            let scaled = scaled_npv(rate, &cfs).unwrap();
            assert_eq!(exact.is_sign_negative(), scaled.is_sign_negative(), "rate {rate}");
        }
    }

    #[test]
    fn test_pv_basic() {
        let result = pv(dec!(0.08), 10, dec!(-100), dec!(0)).unwrap();
        // PV of annuity: 100 * (1 - 1/1.08^10) / 0.08 = ~671
        assert!((result - dec!(671)).abs() < dec!(2.0));
    }

    #[test]
    fn test_pmt_standard_mortgage() {
        // 640k at 6%/12 over 360 months: ~3837.12
        let result = pmt(dec!(0.005), 360, dec!(-640000), Decimal::ZERO).unwrap();
        assert!((result - dec!(3837.12)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_pmt_zero_rate_is_straight_line() {
        let result = pmt(Decimal::ZERO, 120, dec!(-12000), Decimal::ZERO).unwrap();
        assert_eq!(result, dec!(100));
    }

    #[test]
    fn test_pmt_zero_periods_rejected() {
        assert!(pmt(dec!(0.01), 0, dec!(-100), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_compound_matches_repeated_multiplication() {
        let mut expected = Decimal::ONE;
        for _ in 0..24 {
            expected *= dec!(1.005);
        }
        let got = compound(dec!(0.005), 24).unwrap();
        assert!((got - expected).abs() < dec!(0.0000000001));
    }
}
