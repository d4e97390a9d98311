use thiserror::Error;

/// Errors raised at the edges of the engine: request decoding and date
/// parsing. The risk computation itself is total and never returns one.
#[derive(Debug, Error)]
pub enum PortfolioRiskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PortfolioRiskError {
    fn from(e: serde_json::Error) -> Self {
        PortfolioRiskError::SerializationError(e.to_string())
    }
}
