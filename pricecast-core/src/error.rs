//! Error taxonomy surfaced to the CLI and TUI.
//!
//! Every variant is terminal for a single interaction only: the front-ends
//! show the message and let the user adjust inputs and try again.

use thiserror::Error;

use crate::data::provider::DataError;

#[derive(Debug, Error)]
pub enum PricecastError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[source] DataError),

    #[error("model fit failed: {0}")]
    ModelFit(String),

    #[error("config error: {0}")]
    Config(String),
}

impl PricecastError {
    /// Short category tag for status bars and error history.
    pub fn category(&self) -> &'static str {
        match self {
            PricecastError::InvalidParameter(_) => "PARAM",
            PricecastError::InsufficientData(_) => "DATA",
            PricecastError::UpstreamFetch(_) => "NET",
            PricecastError::ModelFit(_) => "MODEL",
            PricecastError::Config(_) => "CONFIG",
        }
    }
}

impl From<DataError> for PricecastError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::SymbolNotFound { symbol } => {
                PricecastError::InsufficientData(format!("no price history for symbol '{symbol}'"))
            }
            other => PricecastError::UpstreamFetch(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_not_found_is_insufficient_data() {
        let err: PricecastError = DataError::SymbolNotFound {
            symbol: "NOPE".into(),
        }
        .into();
        assert!(matches!(err, PricecastError::InsufficientData(_)));
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn network_failure_is_upstream() {
        let err: PricecastError = DataError::NetworkUnreachable("timeout".into()).into();
        assert!(matches!(err, PricecastError::UpstreamFetch(_)));
        assert_eq!(err.category(), "NET");
    }
}
