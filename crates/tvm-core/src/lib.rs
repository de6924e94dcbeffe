//! Time-value-of-money solver.
//!
//! Given four of present value, future value, interest rate, number of
//! periods and payment, [`calculate`] solves for the fifth and amortizes the
//! result to the cent. The component solvers are exposed for direct use.

pub mod amortization;
pub mod calculator;
pub mod error;
pub mod rate_conversion;
pub mod rounding;
pub mod solvers;
pub mod types;
pub mod validation;

pub use amortization::{AmortizationRow, AmortizationSchedule, RangeSummary};
pub use calculator::{calculate, calculate_json, TvmInput, TvmOutput};
pub use error::TvmError;
pub use solvers::interest_rate::RateSolverConfig;
pub use types::*;

/// Standard result type for all tvm operations
pub type TvmResult<T> = Result<T, TvmError>;
