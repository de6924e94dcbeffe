//! Conversions between nominal annual rates and per-payment-period rates.

use crate::types::{PaymentTiming, Percent, Rate};

/// Effective rate per payment period for a nominal annual rate (in percent)
/// compounded `compounding_periods_per_year` times a year, with
/// `payments_per_year` payments.
///
/// `(1 + R / 100 / C)^(C / P) - 1`. When the frequencies match this is simply
/// `R / 100 / P`.
pub fn period_rate(
    nominal_annual_rate: Percent,
    payments_per_year: u32,
    compounding_periods_per_year: u32,
) -> Rate {
    let c = f64::from(compounding_periods_per_year);
    let p = f64::from(payments_per_year);
    (1.0 + 0.01 * nominal_annual_rate / c).powf(c / p) - 1.0
}

/// Inverse of [`period_rate`]: the nominal annual percentage that produces
/// `rate` per payment period.
pub fn nominal_rate(
    rate: Rate,
    payments_per_year: u32,
    compounding_periods_per_year: u32,
) -> Percent {
    let c = f64::from(compounding_periods_per_year);
    let p = f64::from(payments_per_year);
    if payments_per_year == compounding_periods_per_year {
        return rate * 100.0 * c;
    }
    100.0 * c * ((1.0 + rate).powf(p / c) - 1.0)
}

/// Multiplier applied to every payment term of the annuity identity: one
/// period of extra growth when payments fall at the start of each period.
pub fn annuity_multiplier(rate: Rate, timing: PaymentTiming) -> f64 {
    match timing {
        PaymentTiming::EndOfPeriod => 1.0,
        PaymentTiming::BeginningOfPeriod => 1.0 + rate,
    }
}
