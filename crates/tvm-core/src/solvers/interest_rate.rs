//! Interest rate solver.
//!
//! There is no closed form for the rate, so it is found by Newton-Raphson on
//! the per-payment-period rate `r`, with the residual of the annuity identity
//! and its analytic derivative. A bisection bracket is tightened from the sign
//! of each residual and reported alongside the answer; it never overrides the
//! Newton step.

use serde::{Deserialize, Serialize};

use crate::error::TvmError;
use crate::rate_conversion::{annuity_multiplier, nominal_rate};
use crate::types::{CashFlowProfile, Money, PaymentTiming, Percent, Rate};
use crate::TvmResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Newton step size (per-period rate) below which the solve has converged.
pub const RATE_TOLERANCE: f64 = 0.00001;
pub const MAX_RATE_ITERATIONS: u32 = 1000;
/// Starting per-period rate.
pub const INITIAL_RATE_GUESS: Rate = 0.1;

const BRACKET_LOW: Rate = 0.0;
const BRACKET_HIGH: Rate = 1.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Tuning for the Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSolverConfig {
    pub tolerance: f64,
    pub max_iterations: u32,
    pub initial_guess: Rate,
}

impl Default for RateSolverConfig {
    fn default() -> Self {
        Self {
            tolerance: RATE_TOLERANCE,
            max_iterations: MAX_RATE_ITERATIONS,
            initial_guess: INITIAL_RATE_GUESS,
        }
    }
}

/// The four known quantities the rate is solved from.
#[derive(Debug, Clone, Copy)]
pub struct RateProblem {
    pub present_value: Money,
    pub future_value: Money,
    pub number_of_periods: f64,
    pub payment: Money,
    pub profile: CashFlowProfile,
    pub timing: PaymentTiming,
}

impl RateProblem {
    fn is_lump_sum(&self) -> bool {
        self.profile == CashFlowProfile::LumpSum || self.payment == 0.0
    }

    /// Residual of the annuity identity at `rate` and its derivative.
    fn residual(&self, rate: Rate) -> (f64, f64) {
        let n = self.number_of_periods;
        let growth = (1.0 + rate).powf(n);
        let d_growth = n * (1.0 + rate).powf(n - 1.0);

        let f = self.present_value * growth + self.future_value;
        let df = self.present_value * d_growth;
        if self.is_lump_sum() {
            return (f, df);
        }

        let g = annuity_multiplier(rate, self.timing);
        let dg = match self.timing {
            PaymentTiming::EndOfPeriod => 0.0,
            PaymentTiming::BeginningOfPeriod => 1.0,
        };
        let annuity = (growth - 1.0) / rate;
        let d_annuity = (d_growth * rate - (growth - 1.0)) / (rate * rate);

        (
            f + self.payment * g * annuity,
            df + self.payment * (dg * annuity + g * d_annuity),
        )
    }
}

/// A converged rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    /// Nominal annual rate in percent.
    pub nominal_rate: Percent,
    pub period_rate: Rate,
    pub iterations: u32,
    /// Last bisection bracket observed, `(low, high)`.
    pub bracket: (Rate, Rate),
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Solve for the nominal annual rate (percent).
pub fn solve_interest_rate(
    problem: &RateProblem,
    payments_per_year: u32,
    compounding_periods_per_year: u32,
    config: &RateSolverConfig,
) -> TvmResult<RateSolution> {
    let mut solution = solve_period_rate(problem, config)?;
    solution.nominal_rate = nominal_rate(
        solution.period_rate,
        payments_per_year,
        compounding_periods_per_year,
    );
    Ok(solution)
}

/// Newton-Raphson on the per-payment-period rate. The returned solution's
/// `nominal_rate` is left at zero; see [`solve_interest_rate`].
pub fn solve_period_rate(
    problem: &RateProblem,
    config: &RateSolverConfig,
) -> TvmResult<RateSolution> {
    let mut rate = config.initial_guess;
    let mut low = BRACKET_LOW;
    let mut high = BRACKET_HIGH;
    let mut last_step = f64::NAN;

    for i in 0..config.max_iterations {
        if rate == 0.0 && !problem.is_lump_sum() {
            return Err(degenerate(i, rate, "annuity factor undefined at a zero rate"));
        }

        let (f, df) = problem.residual(rate);
        if !f.is_finite() || !df.is_finite() {
            return Err(degenerate(i, rate, "non-finite residual"));
        }
        if df == 0.0 {
            return Err(degenerate(i, rate, "zero derivative"));
        }

        let next = rate - f / df;
        if !next.is_finite() {
            return Err(degenerate(i, rate, "non-finite Newton step"));
        }
        last_step = next - rate;
        tracing::trace!(iteration = i, rate, next, residual = f, "rate solver step");

        if last_step.abs() < config.tolerance {
            tracing::debug!(
                iterations = i + 1,
                period_rate = next,
                low,
                high,
                "rate solver converged"
            );
            return Ok(RateSolution {
                nominal_rate: 0.0,
                period_rate: next,
                iterations: i + 1,
                bracket: (low, high),
            });
        }

        // The root lies above `rate` when the residual is heading towards zero
        if (f < 0.0) == (df > 0.0) {
            low = rate;
        } else {
            high = rate;
        }
        rate = next;
    }

    tracing::warn!(
        iterations = config.max_iterations,
        rate,
        low,
        high,
        "rate solver did not converge"
    );
    Err(TvmError::ConvergenceFailure {
        function: "interest rate".into(),
        iterations: config.max_iterations,
        last_delta: last_step,
    })
}

fn degenerate(iteration: u32, rate: Rate, reason: &str) -> TvmError {
    tracing::warn!(iteration, rate, reason, "rate solver aborted");
    TvmError::NumericalDegeneracy {
        context: format!("interest rate solver at iteration {iteration} (rate {rate}): {reason}"),
    }
}
