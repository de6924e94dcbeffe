//! Single entry point: solve whichever of PV, FV, rate, N or PMT is unknown,
//! then amortize the completed parameter set.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{
    build_schedule, summarize_range, AmortizationSchedule, AmortizationTerms, RangeSummary,
};
use crate::solvers::closed_form;
use crate::solvers::interest_rate::{solve_interest_rate, RateProblem, RateSolverConfig};
use crate::types::{
    with_metadata, CashFlowProfile, ComputationOutput, Money, PaymentTiming, PeriodRange, Percent,
    Rate, TvmParameters, TvmVariable,
};
use crate::validation::{validate_input, ValidatedInput};
use crate::TvmResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Calculator input. Every quantity except `solve_for` must be supplied;
/// `payment` may also be omitted to describe a lump sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvmInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_value: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_value: Option<Money>,
    /// Nominal annual rate in percent (5.5 = 5.5%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_periods: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    #[serde(default = "default_frequency")]
    pub payments_per_year: u32,
    #[serde(default = "default_frequency")]
    pub compounding_periods_per_year: u32,
    #[serde(default)]
    pub timing: PaymentTiming,
    /// Periods aggregated into [`TvmOutput::summary`].
    #[serde(default)]
    pub period_range: PeriodRange,
    pub solve_for: TvmVariable,
    #[serde(default)]
    pub solver: RateSolverConfig,
}

fn default_frequency() -> u32 {
    1
}

impl TvmInput {
    /// An input with nothing known yet: annual payments and compounding,
    /// end-of-period timing, range `[1, 1]`.
    pub fn solving_for(solve_for: TvmVariable) -> Self {
        Self {
            present_value: None,
            future_value: None,
            interest_rate: None,
            number_of_periods: None,
            payment: None,
            payments_per_year: default_frequency(),
            compounding_periods_per_year: default_frequency(),
            timing: PaymentTiming::default(),
            period_range: PeriodRange::default(),
            solve_for,
            solver: RateSolverConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvmOutput {
    pub solved_for: TvmVariable,
    /// The resolved unknown (a percentage when the rate was solved).
    pub value: f64,
    /// All five quantities after the solve.
    pub parameters: TvmParameters,
    pub profile: CashFlowProfile,
    /// Effective rate per payment period used by the solve.
    pub period_rate: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_solver_iterations: Option<u32>,
    /// Balance, principal and interest over the requested period range.
    pub summary: RangeSummary,
    pub schedule: AmortizationSchedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate(input: &TvmInput) -> TvmResult<ComputationOutput<TvmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let ValidatedInput {
        parameters,
        profile,
    } = validate_input(input)?;
    tracing::debug!(solve_for = ?input.solve_for, ?profile, "solving time value of money");

    if profile == CashFlowProfile::LumpSum {
        warnings.push("No periodic payment: solved as a lump sum".into());
    }

    let (value, rate_solver_iterations) = solve_unknown(input, &parameters, profile)?;
    let parameters = parameters.with_resolved(input.solve_for, value);

    // --- Amortization ---
    let terms = AmortizationTerms::from_parameters(&parameters);
    if terms.fractional_periods {
        warnings.push(format!(
            "Number of periods {:.2} is not whole; the schedule covers {} full periods",
            parameters.number_of_periods, terms.periods
        ));
    }
    if input.period_range.end > terms.periods {
        warnings.push(format!(
            "Period range ends at {} beyond the final period {}; balances continue past maturity",
            input.period_range.end, terms.periods
        ));
    }

    let schedule = build_schedule(&terms);
    let summary = summarize_range(&terms, input.period_range);

    let output = TvmOutput {
        solved_for: input.solve_for,
        value,
        parameters,
        profile,
        period_rate: parameters.period_rate(),
        rate_solver_iterations,
        summary,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        methodology(input.solve_for),
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// [`calculate`] from and to JSON.
pub fn calculate_json(input_json: &str) -> TvmResult<String> {
    let input: TvmInput = serde_json::from_str(input_json)?;
    let output = calculate(&input)?;
    Ok(serde_json::to_string(&output)?)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn solve_unknown(
    input: &TvmInput,
    p: &TvmParameters,
    profile: CashFlowProfile,
) -> TvmResult<(f64, Option<u32>)> {
    let rate = p.period_rate();
    let g = p.annuity_multiplier();

    let value = match input.solve_for {
        TvmVariable::PresentValue => {
            closed_form::pv(rate, g, p.number_of_periods, p.payment, p.future_value)?
        }
        TvmVariable::FutureValue => {
            closed_form::fv(rate, g, p.number_of_periods, p.payment, p.present_value)?
        }
        TvmVariable::Payment => {
            closed_form::pmt(rate, g, p.number_of_periods, p.present_value, p.future_value)?
        }
        TvmVariable::NumberOfPeriods => {
            closed_form::nper(rate, g, p.payment, p.present_value, p.future_value)?
        }
        TvmVariable::InterestRate => {
            let problem = RateProblem {
                present_value: p.present_value,
                future_value: p.future_value,
                number_of_periods: p.number_of_periods,
                payment: p.payment,
                profile,
                timing: p.timing,
            };
            let solution = solve_interest_rate(
                &problem,
                p.payments_per_year,
                p.compounding_periods_per_year,
                &input.solver,
            )?;
            return Ok((solution.nominal_rate, Some(solution.iterations)));
        }
    };

    Ok((value, None))
}

fn methodology(solve_for: TvmVariable) -> &'static str {
    match solve_for {
        TvmVariable::InterestRate => {
            "Interest rate via Newton-Raphson on the annuity identity; cent-rounded amortization"
        }
        _ => "Closed-form solution of the annuity identity; cent-rounded amortization",
    }
}
