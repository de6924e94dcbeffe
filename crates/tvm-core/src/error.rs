use thiserror::Error;

#[derive(Debug, Error)]
pub enum TvmError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: f64,
    },

    #[error("Numerical degeneracy in {context}")]
    NumericalDegeneracy { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TvmError {
    /// Solver failures all surface to callers as invalid input; only the JSON
    /// boundary can fail for another reason.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, TvmError::SerializationError(_))
    }
}

impl From<serde_json::Error> for TvmError {
    fn from(e: serde_json::Error) -> Self {
        TvmError::SerializationError(e.to_string())
    }
}
