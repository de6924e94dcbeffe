//! Decimal rounding for binary floating-point amounts.
//!
//! Rounding goes through `rust_decimal`, which avoids the scale-multiply-round
//! error of doing it in `f64`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for monetary amounts.
pub const CENT_PLACES: u32 = 2;

/// Decimal places kept when stripping floating-point noise.
pub const NOISE_PLACES: u32 = 12;

/// Closed-form results closer to zero than this are reported as zero.
pub const ZERO_SNAP_THRESHOLD: f64 = 1e-7;

/// Round half away from zero to `places` decimal places.
///
/// Values outside the range `Decimal` can represent are returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

pub fn round_cents(value: f64) -> f64 {
    round_to(value, CENT_PLACES)
}

/// Strip noise at 12 places, then round to cents.
pub fn round_cents_denoised(value: f64) -> f64 {
    round_cents(round_to(value, NOISE_PLACES))
}

pub fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < ZERO_SNAP_THRESHOLD {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn as_decimal(value: f64) -> Decimal {
        Decimal::from_f64(value).unwrap()
    }

    #[test]
    fn test_round_cents_basic() {
        assert_eq!(as_decimal(round_cents(425.844_7)), dec!(425.84));
        assert_eq!(as_decimal(round_cents(-425.844_7)), dec!(-425.84));
        assert_eq!(as_decimal(round_cents(343.75)), dec!(343.75));
    }

    #[test]
    fn test_round_cents_midpoint_away_from_zero() {
        // exact binary midpoints; banker's rounding would give 0.12 / -0.62
        assert_eq!(as_decimal(round_cents(0.125)), dec!(0.13));
        assert_eq!(as_decimal(round_cents(-0.625)), dec!(-0.63));
    }

    #[test]
    fn test_denoised_rounding_absorbs_float_error() {
        // 0.1 + 0.2 = 0.30000000000000004
        let noisy = 0.1 + 0.2;
        assert_eq!(as_decimal(round_to(noisy, NOISE_PLACES)), dec!(0.3));
        assert_eq!(as_decimal(round_cents_denoised(-343.749_999_999_999_9)), dec!(-343.75));
    }

    #[test]
    fn test_round_non_finite_passthrough() {
        assert!(round_cents(f64::NAN).is_nan());
        assert_eq!(round_cents(f64::INFINITY), f64::INFINITY);
        assert_eq!(round_cents(1e40), 1e40);
    }

    #[test]
    fn test_snap_to_zero() {
        assert_eq!(snap_to_zero(5e-8), 0.0);
        assert_eq!(snap_to_zero(-9.9e-8), 0.0);
        assert_eq!(snap_to_zero(1e-6), 1e-6);
    }
}
