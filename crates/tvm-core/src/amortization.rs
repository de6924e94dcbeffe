//! Amortization of a fully resolved parameter set.
//!
//! Amounts are carried at cent precision the way a printed amortization table
//! is: each period's interest is rounded to the cent before it is added to the
//! balance. The full schedule and the range summary run the same recurrence
//! from period 1 independently, so they agree period for period.

use serde::{Deserialize, Serialize};

use crate::rate_conversion::period_rate;
use crate::rounding::{round_cents, round_cents_denoised};
use crate::types::{Money, PeriodRange, Rate, TvmParameters};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cent-rounded loan terms the recurrence runs on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTerms {
    /// Opening balance, rounded to the cent.
    pub present_value: Money,
    /// Period rate derived from the cent-rounded nominal rate.
    pub period_rate: Rate,
    /// Payment, rounded to the cent.
    pub payment: Money,
    /// Whole periods in the schedule.
    pub periods: u32,
    /// Whether the period count had a fractional part that was dropped.
    pub fractional_periods: bool,
}

impl AmortizationTerms {
    pub fn from_parameters(parameters: &TvmParameters) -> Self {
        let nominal = round_cents(parameters.interest_rate);
        let periods = round_cents(parameters.number_of_periods).max(0.0);
        Self {
            present_value: round_cents(parameters.present_value),
            period_rate: period_rate(
                nominal,
                parameters.payments_per_year,
                parameters.compounding_periods_per_year,
            ),
            payment: round_cents(parameters.payment),
            periods: periods.trunc().min(f64::from(u32::MAX)) as u32,
            fractional_periods: periods.fract() != 0.0,
        }
    }

    /// Ending balances for periods 1, 2, ...
    fn balances(&self) -> Balances {
        Balances {
            balance: self.present_value,
            rate: self.period_rate,
            payment: self.payment,
        }
    }
}

/// Period-by-period amortization, indexed from period 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Balance at the end of each period.
    pub balance: Vec<Money>,
    /// Principal component of each payment.
    pub principal: Vec<Money>,
    /// Interest component of each payment.
    pub interest: Vec<Money>,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.balance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balance.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = AmortizationRow> + '_ {
        self.balance
            .iter()
            .zip(&self.principal)
            .zip(&self.interest)
            .enumerate()
            .map(|(i, ((&balance, &principal), &interest))| AmortizationRow {
                period: i as u32 + 1,
                balance,
                principal,
                interest,
            })
    }

    pub fn total_principal(&self) -> Money {
        self.principal.iter().sum()
    }

    pub fn total_interest(&self) -> Money {
        self.interest.iter().sum()
    }
}

/// One row of an [`AmortizationSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub balance: Money,
    pub principal: Money,
    pub interest: Money,
}

/// Aggregates over an inclusive period range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub range: PeriodRange,
    /// Balance at the end of the range.
    pub balance: Money,
    /// Principal paid within the range.
    pub principal: Money,
    /// Interest paid within the range.
    pub interest: Money,
}

struct Balances {
    balance: Money,
    rate: Rate,
    payment: Money,
}

impl Iterator for Balances {
    type Item = Money;

    fn next(&mut self) -> Option<Money> {
        let interest = round_cents_denoised(-self.rate * self.balance);
        self.balance = self.balance - interest + self.payment;
        Some(self.balance)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Full schedule for periods `1..=terms.periods`.
pub fn build_schedule(terms: &AmortizationTerms) -> AmortizationSchedule {
    let periods = terms.periods as usize;
    let mut schedule = AmortizationSchedule {
        balance: Vec::with_capacity(periods),
        principal: Vec::with_capacity(periods),
        interest: Vec::with_capacity(periods),
    };

    // Principal comes from the cumulative change in balance
    let mut cumulative_principal = 0.0;
    for balance in terms.balances().take(periods) {
        let principal = (balance - terms.present_value) - cumulative_principal;
        cumulative_principal += principal;

        schedule.balance.push(balance);
        schedule.principal.push(principal);
        schedule.interest.push(terms.payment - principal);
    }

    schedule
}

/// Balance at the end of `range`, with principal and interest paid within it.
///
/// The recurrence runs through `range.end` even past `terms.periods`. The
/// caller guarantees `1 <= range.start <= range.end`.
pub fn summarize_range(terms: &AmortizationTerms, range: PeriodRange) -> RangeSummary {
    let mut baseline = terms.present_value;
    let mut balance = terms.present_value;

    for (period, ending) in (1..=range.end).zip(terms.balances()) {
        if period + 1 == range.start {
            baseline = ending;
        }
        balance = ending;
    }

    let principal = balance - baseline;
    RangeSummary {
        range,
        balance,
        principal,
        interest: f64::from(range.len()) * terms.payment - principal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentTiming;
    use approx::assert_abs_diff_eq;

    fn mortgage_terms() -> AmortizationTerms {
        AmortizationTerms::from_parameters(&TvmParameters {
            present_value: 75_000.0,
            future_value: 0.0,
            interest_rate: 5.5,
            number_of_periods: 360.0,
            payment: -425.844_657,
            payments_per_year: 12,
            compounding_periods_per_year: 12,
            timing: PaymentTiming::EndOfPeriod,
        })
    }

    #[test]
    fn test_terms_rounded_to_cents() {
        let terms = mortgage_terms();
        assert_eq!(terms.payment, -425.84);
        assert_eq!(terms.present_value, 75_000.0);
        assert_eq!(terms.periods, 360);
        assert!(!terms.fractional_periods);
    }

    #[test]
    fn test_fractional_periods_truncated() {
        let mut params = TvmParameters {
            present_value: 1_000.0,
            future_value: 0.0,
            interest_rate: 6.0,
            number_of_periods: 11.4,
            payment: -90.0,
            payments_per_year: 12,
            compounding_periods_per_year: 12,
            timing: PaymentTiming::EndOfPeriod,
        };
        let terms = AmortizationTerms::from_parameters(&params);
        assert_eq!(terms.periods, 11);
        assert!(terms.fractional_periods);

        // 359.996 rounds to a whole 360.00 first
        params.number_of_periods = 359.996;
        let terms = AmortizationTerms::from_parameters(&params);
        assert_eq!(terms.periods, 360);
        assert!(!terms.fractional_periods);
    }

    #[test]
    fn test_first_period() {
        let schedule = build_schedule(&mortgage_terms());
        assert_eq!(schedule.len(), 360);
        assert_abs_diff_eq!(schedule.balance[0], 74_917.91, epsilon = 1e-6);
        assert_abs_diff_eq!(schedule.principal[0], -82.09, epsilon = 1e-6);
        assert_abs_diff_eq!(schedule.interest[0], -343.75, epsilon = 1e-6);
    }

    #[test]
    fn test_range_first_period() {
        let summary = summarize_range(&mortgage_terms(), PeriodRange::new(1, 1));
        assert_abs_diff_eq!(summary.balance, 74_917.91, epsilon = 0.005);
        assert_abs_diff_eq!(summary.principal, -82.09, epsilon = 0.005);
        assert_abs_diff_eq!(summary.interest, -343.75, epsilon = 0.005);
    }

    #[test]
    fn test_range_year_twelve() {
        let summary = summarize_range(&mortgage_terms(), PeriodRange::new(133, 144));
        assert_abs_diff_eq!(summary.balance, 58_309.61, epsilon = 0.005);
        assert_abs_diff_eq!(summary.principal, -1_847.54, epsilon = 0.005);
        assert_abs_diff_eq!(summary.interest, -3_262.54, epsilon = 0.005);
    }

    #[test]
    fn test_range_agrees_with_schedule() {
        let terms = mortgage_terms();
        let schedule = build_schedule(&terms);
        let summary = summarize_range(&terms, PeriodRange::new(133, 144));

        let principal: Money = schedule.principal[132..144].iter().sum();
        let interest: Money = schedule.interest[132..144].iter().sum();
        assert_abs_diff_eq!(summary.balance, schedule.balance[143], epsilon = 1e-9);
        assert_abs_diff_eq!(summary.principal, principal, epsilon = 1e-6);
        assert_abs_diff_eq!(summary.interest, interest, epsilon = 1e-6);
    }

    #[test]
    fn test_interest_is_cent_rounded() {
        let schedule = build_schedule(&mortgage_terms());
        for row in schedule.rows().take(24) {
            let cents = row.interest * 100.0;
            assert_abs_diff_eq!(cents, cents.round(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rows_numbered_from_one() {
        let schedule = build_schedule(&mortgage_terms());
        let rows: Vec<AmortizationRow> = schedule.rows().collect();
        assert_eq!(rows.len(), 360);
        assert_eq!(rows[0].period, 1);
        assert_eq!(rows[359].period, 360);
        assert_eq!(rows[5].balance, schedule.balance[5]);
    }

    #[test]
    fn test_zero_rate_schedule_is_linear() {
        let terms = AmortizationTerms::from_parameters(&TvmParameters {
            present_value: 1_200.0,
            future_value: 0.0,
            interest_rate: 0.0,
            number_of_periods: 12.0,
            payment: -100.0,
            payments_per_year: 12,
            compounding_periods_per_year: 12,
            timing: PaymentTiming::EndOfPeriod,
        });
        let schedule = build_schedule(&terms);
        assert!(schedule.interest.iter().all(|&i| i.abs() < 1e-9));
        assert_abs_diff_eq!(schedule.balance[11], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.total_principal(), -1_200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_range_past_maturity_keeps_running() {
        let terms = AmortizationTerms {
            present_value: 100.0,
            period_rate: 0.0,
            payment: -10.0,
            periods: 5,
            fractional_periods: false,
        };
        let summary = summarize_range(&terms, PeriodRange::new(4, 8));
        assert_abs_diff_eq!(summary.balance, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.principal, -50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.interest, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_periods_empty_schedule() {
        let terms = AmortizationTerms {
            present_value: 100.0,
            period_rate: 0.01,
            payment: 0.0,
            periods: 0,
            fractional_periods: false,
        };
        assert!(build_schedule(&terms).is_empty());
    }
}
