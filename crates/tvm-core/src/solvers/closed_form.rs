//! Direct solutions of the annuity identity
//!
//! `PV·(1+i)^N + PMT·g·((1+i)^N − 1)/i + FV = 0`
//!
//! for PV, FV, PMT and N. `i` is the per-payment-period rate and `g` the
//! annuity multiplier from [`crate::rate_conversion::annuity_multiplier`].
//! At `i == 0` every formula falls back to its linear form.

use crate::error::TvmError;
use crate::rounding::snap_to_zero;
use crate::types::{Money, Rate};
use crate::TvmResult;

/// Present value
pub fn pv(rate: Rate, multiplier: f64, nper: f64, pmt: Money, fv: Money) -> TvmResult<Money> {
    if rate == 0.0 {
        return finish(-(fv + pmt * nper), "PV");
    }

    let growth = (1.0 + rate).powf(nper);
    let annuity = pmt * multiplier * (growth - 1.0) / rate;
    finish(-(fv + annuity) / growth, "PV")
}

/// Future value
pub fn fv(rate: Rate, multiplier: f64, nper: f64, pmt: Money, pv: Money) -> TvmResult<Money> {
    if rate == 0.0 {
        return finish(-(pv + pmt * nper), "FV");
    }

    let growth = (1.0 + rate).powf(nper);
    let annuity = pmt * multiplier * (growth - 1.0) / rate;
    finish(-(pv * growth + annuity), "FV")
}

/// Payment (PMT)
pub fn pmt(rate: Rate, multiplier: f64, nper: f64, pv: Money, fv: Money) -> TvmResult<Money> {
    if rate == 0.0 {
        return finish(-(pv + fv) / nper, "PMT");
    }

    let growth = (1.0 + rate).powf(nper);
    finish(
        -(pv * growth + fv) * rate / (multiplier * (growth - 1.0)),
        "PMT",
    )
}

/// Number of periods
///
/// Fails when the cash-flow signs cannot balance, i.e. when the logarithm's
/// argument is not positive.
pub fn nper(rate: Rate, multiplier: f64, pmt: Money, pv: Money, fv: Money) -> TvmResult<f64> {
    if rate == 0.0 {
        return finish(-(pv + fv) / pmt, "NPER");
    }

    let ratio = (pmt * multiplier - fv * rate) / (pmt * multiplier + pv * rate);
    if ratio <= 0.0 {
        tracing::warn!(ratio, "no period count balances these cash flows");
        return Err(TvmError::NumericalDegeneracy {
            context: format!("NPER logarithm of non-positive ratio {ratio}"),
        });
    }
    finish(ratio.ln() / (1.0 + rate).ln(), "NPER")
}

fn finish(value: f64, context: &str) -> TvmResult<f64> {
    if !value.is_finite() {
        tracing::warn!(context, value, "rejecting non-finite closed-form result");
        return Err(TvmError::NumericalDegeneracy {
            context: format!("{context} closed form (result {value})"),
        });
    }
    Ok(snap_to_zero(value))
}
