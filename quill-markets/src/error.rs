//! Engine error types.

use thiserror::Error;

use crate::data::SourceError;

/// Errors surfaced by engine operations.
///
/// Per-symbol failures inside a scan never reach callers as errors; they are
/// logged, counted in the scan report, and the scan continues. These variants
/// cover single-symbol operations (quote, analysis, backtest) where there is
/// nothing useful to return.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source answered but has no data for the symbol
    #[error("no market data available for {symbol}")]
    DataUnavailable { symbol: String },

    /// The symbol's history is too short for the requested computation
    #[error("{symbol}: {have} bars of history, need at least {need}")]
    InsufficientHistory {
        symbol: String,
        have: usize,
        need: usize,
    },

    /// A source call exceeded the configured fetch timeout
    #[error("fetch for {symbol} timed out after {seconds}s")]
    FetchTimeout { symbol: String, seconds: u64 },

    /// The source itself failed
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl EngineError {
    /// True when the failure is about missing data rather than a broken source.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. } | Self::InsufficientHistory { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InsufficientHistory {
            symbol: "AAPL".to_string(),
            have: 12,
            need: 50,
        };
        assert_eq!(err.to_string(), "AAPL: 12 bars of history, need at least 50");
        assert!(err.is_no_data());

        let err = EngineError::FetchTimeout {
            symbol: "MSFT".to_string(),
            seconds: 10,
        };
        assert_eq!(err.to_string(), "fetch for MSFT timed out after 10s");
        assert!(!err.is_no_data());
    }

    #[test]
    fn test_source_error_conversion() {
        let err: EngineError = SourceError::Network("reset".into()).into();
        assert_eq!(err.to_string(), "network error: reset");
    }
}
