//! Data source abstraction for market data.
//!
//! Defines the `MarketDataSource` trait the host application implements over
//! whatever transport it uses (HTTP client, cache, broker SDK). The engine
//! only ever sees this trait, which keeps every analytics path testable
//! offline through [`StaticSource`].

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

use super::{BarInterval, ChartRange, Headline, Quote, Series};

// ============================================================================
// Source Error
// ============================================================================

/// Errors raised by data sources.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Network error (connection failed, DNS, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// Rate limit exceeded
    #[error("rate limited{}", .retry_after_secs.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// Response could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Source is temporarily unavailable
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Check if the error is recoverable (worth retrying on a later call)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::Unavailable(_)
        )
    }
}

// ============================================================================
// Market Data Source Trait
// ============================================================================

/// Trait for market data sources.
///
/// The engine issues three kinds of calls: batched quote snapshots, per-symbol
/// chart history, and per-symbol headlines. Implementations may retry
/// internally; the engine itself never retries and wraps every call in a
/// timeout.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Get the source name (e.g., "yahoo", "static")
    fn name(&self) -> &'static str;

    /// Fetch quote snapshots for a batch of symbols.
    ///
    /// Symbols absent from the returned map, or mapped to `None`, have no
    /// quote available. A partial map is a normal response, not an error.
    async fn batch_quote(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Option<Quote>>, SourceError>;

    /// Fetch price history for a symbol.
    ///
    /// `Ok(None)` means the source answered but has no data for the symbol.
    async fn chart(
        &self,
        symbol: &str,
        range: ChartRange,
        interval: BarInterval,
    ) -> Result<Option<Series>, SourceError>;

    /// Fetch recent headlines for a symbol.
    async fn headlines(&self, symbol: &str) -> Result<Vec<Headline>, SourceError>;
}

// ============================================================================
// Static Source (in-memory fixtures)
// ============================================================================

/// In-memory data source backed by pre-loaded fixtures.
///
/// Used by the test suites and by host applications that want to run the
/// engine against recorded data. Symbols registered via [`with_failure`]
/// fail their chart/headline calls, and [`with_delay`] slows every call,
/// which is how the timeout paths get exercised.
///
/// [`with_failure`]: StaticSource::with_failure
/// [`with_delay`]: StaticSource::with_delay
#[derive(Default)]
pub struct StaticSource {
    quotes: HashMap<String, Quote>,
    charts: HashMap<String, Series>,
    headlines: HashMap<String, Vec<Headline>>,
    failing: HashSet<String>,
    fail_batch: bool,
    delay: Option<Duration>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quote, keyed by its symbol.
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    /// Register a price history, keyed by its symbol.
    pub fn with_chart(mut self, series: Series) -> Self {
        self.charts.insert(series.symbol.clone(), series);
        self
    }

    /// Register headlines for a symbol.
    pub fn with_headlines(mut self, symbol: impl Into<String>, headlines: Vec<Headline>) -> Self {
        self.headlines.insert(symbol.into(), headlines);
        self
    }

    /// Make chart and headline calls fail for a symbol.
    pub fn with_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }

    /// Make every `batch_quote` call fail.
    pub fn with_batch_failure(mut self) -> Self {
        self.fail_batch = true;
        self
    }

    /// Delay every call, for exercising timeout handling.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketDataSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn batch_quote(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Option<Quote>>, SourceError> {
        self.simulate_latency().await;
        if self.fail_batch {
            return Err(SourceError::Unavailable("batch quote disabled".into()));
        }
        Ok(symbols
            .iter()
            .map(|s| (s.clone(), self.quotes.get(s).cloned()))
            .collect())
    }

    async fn chart(
        &self,
        symbol: &str,
        _range: ChartRange,
        _interval: BarInterval,
    ) -> Result<Option<Series>, SourceError> {
        self.simulate_latency().await;
        if self.failing.contains(symbol) {
            return Err(SourceError::Unavailable(format!(
                "chart disabled for {}",
                symbol
            )));
        }
        Ok(self.charts.get(symbol).cloned())
    }

    async fn headlines(&self, symbol: &str) -> Result<Vec<Headline>, SourceError> {
        self.simulate_latency().await;
        if self.failing.contains(symbol) {
            return Err(SourceError::Unavailable(format!(
                "headlines disabled for {}",
                symbol
            )));
        }
        Ok(self.headlines.get(symbol).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bar, MarketState};
    use chrono::{TimeZone, Utc};

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            change_pct: 0.0,
            prev_close: price,
            volume: 0.0,
            market_cap: None,
            pe_ratio: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            state: MarketState::Regular,
            revenue_growth: None,
            gross_margin: None,
            return_on_equity: None,
            debt_to_equity: None,
            dividend_yield: None,
            payout_ratio: None,
        }
    }

    fn one_bar_series(symbol: &str) -> Series {
        Series::new(
            symbol,
            vec![Bar {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.5,
                volume: 100.0,
            }],
        )
    }

    #[test]
    fn test_batch_quote_partial() {
        let source = StaticSource::new().with_quote(quote("AAPL", 190.0));
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];

        let quotes = tokio_test::block_on(source.batch_quote(&symbols)).unwrap();
        assert!(quotes.get("AAPL").unwrap().is_some());
        assert!(quotes.get("MSFT").unwrap().is_none());
    }

    #[test]
    fn test_chart_miss_is_none_not_error() {
        let source = StaticSource::new().with_chart(one_bar_series("AAPL"));

        let hit =
            tokio_test::block_on(source.chart("AAPL", ChartRange::OneYear, BarInterval::Daily))
                .unwrap();
        assert!(hit.is_some());

        let miss =
            tokio_test::block_on(source.chart("ZZZZ", ChartRange::OneYear, BarInterval::Daily))
                .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_failing_symbol() {
        let source = StaticSource::new()
            .with_chart(one_bar_series("AAPL"))
            .with_failure("AAPL");

        let err =
            tokio_test::block_on(source.chart("AAPL", ChartRange::OneYear, BarInterval::Daily))
                .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "rate limited, retry after 30s");

        let err = SourceError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");
    }
}
