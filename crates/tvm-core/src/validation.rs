//! Precondition checks run before any solve.

use crate::calculator::TvmInput;
use crate::error::TvmError;
use crate::solvers::interest_rate::RateSolverConfig;
use crate::types::{CashFlowProfile, PeriodRange, TvmParameters, TvmVariable};
use crate::TvmResult;

/// Lowest nominal rate (percent) the closed forms accept.
const MIN_INTEREST_RATE: f64 = -100.0;

/// A parameter set that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedInput {
    /// The unknown's slot, and payment for lump sums, hold zero.
    pub parameters: TvmParameters,
    pub profile: CashFlowProfile,
}

pub fn validate_input(input: &TvmInput) -> TvmResult<ValidatedInput> {
    if input.payments_per_year == 0 {
        return Err(invalid("payments_per_year", "Payments per year must be at least 1"));
    }
    if input.compounding_periods_per_year == 0 {
        return Err(invalid(
            "compounding_periods_per_year",
            "Compounding periods per year must be at least 1",
        ));
    }

    let unknown = input.solve_for;
    let present_value = required(input.present_value, TvmVariable::PresentValue, unknown)?;
    let future_value = required(input.future_value, TvmVariable::FutureValue, unknown)?;
    let interest_rate = required(input.interest_rate, TvmVariable::InterestRate, unknown)?;
    let number_of_periods =
        required(input.number_of_periods, TvmVariable::NumberOfPeriods, unknown)?;

    // Absence and zero only differ here; downstream both are a zero payment.
    let (payment, profile) = if unknown == TvmVariable::Payment {
        (0.0, CashFlowProfile::Annuity)
    } else {
        match input.payment {
            None => (0.0, CashFlowProfile::LumpSum),
            Some(p) => {
                ensure_finite(p, "payment")?;
                if p == 0.0 {
                    (0.0, CashFlowProfile::LumpSum)
                } else {
                    (p, CashFlowProfile::Annuity)
                }
            }
        }
    };

    match unknown {
        TvmVariable::PresentValue | TvmVariable::FutureValue | TvmVariable::Payment => {
            if number_of_periods < 0.0 {
                return Err(invalid("number_of_periods", "Number of periods cannot be negative"));
            }
            check_rate_floor(interest_rate)?;
        }
        TvmVariable::InterestRate => {
            if number_of_periods <= 0.0 {
                return Err(invalid(
                    "number_of_periods",
                    "Number of periods must be greater than zero to solve for the rate",
                ));
            }
        }
        TvmVariable::NumberOfPeriods => check_rate_floor(interest_rate)?,
    }

    validate_range(&input.period_range)?;
    validate_solver_config(&input.solver)?;

    Ok(ValidatedInput {
        parameters: TvmParameters {
            present_value,
            future_value,
            interest_rate,
            number_of_periods,
            payment,
            payments_per_year: input.payments_per_year,
            compounding_periods_per_year: input.compounding_periods_per_year,
            timing: input.timing,
        },
        profile,
    })
}

/// The value of a known quantity, or zero for the unknown.
fn required(value: Option<f64>, variable: TvmVariable, unknown: TvmVariable) -> TvmResult<f64> {
    if variable == unknown {
        return Ok(0.0);
    }
    let field = variable.field_name();
    let value = value.ok_or_else(|| invalid(field, "Required unless it is the unknown"))?;
    ensure_finite(value, field)?;
    Ok(value)
}

fn ensure_finite(value: f64, field: &str) -> TvmResult<()> {
    if !value.is_finite() {
        return Err(invalid(field, &format!("Must be a finite number, got {value}")));
    }
    Ok(())
}

fn check_rate_floor(interest_rate: f64) -> TvmResult<()> {
    if interest_rate < MIN_INTEREST_RATE {
        return Err(invalid(
            "interest_rate",
            &format!("Interest rate must be at least -100%, got {interest_rate}"),
        ));
    }
    Ok(())
}

fn validate_range(range: &PeriodRange) -> TvmResult<()> {
    if range.start == 0 {
        return Err(invalid("period_range", "Periods are numbered from 1"));
    }
    if range.is_empty() {
        return Err(invalid(
            "period_range",
            &format!("Range start {} is after end {}", range.start, range.end),
        ));
    }
    Ok(())
}

fn validate_solver_config(config: &RateSolverConfig) -> TvmResult<()> {
    if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
        return Err(invalid("solver.tolerance", "Tolerance must be positive"));
    }
    if config.max_iterations == 0 {
        return Err(invalid("solver.max_iterations", "At least one iteration is required"));
    }
    ensure_finite(config.initial_guess, "solver.initial_guess")
}

fn invalid(field: &str, reason: &str) -> TvmError {
    TvmError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
