use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReturnsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ReturnsError {
    fn from(e: serde_json::Error) -> Self {
        ReturnsError::SerializationError(e.to_string())
    }
}
