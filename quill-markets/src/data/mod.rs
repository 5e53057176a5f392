//! Market data model for US equities.
//!
//! Defines the bar/series/quote types every other module consumes, plus the
//! [`MarketDataSource`] trait the host application implements over its
//! transport of choice. The engine never talks HTTP itself.

mod source;

pub use source::{MarketDataSource, SourceError, StaticSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// Chart history range accepted by data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartRange {
    /// ~21 trading days
    OneMonth,
    /// ~63 trading days
    ThreeMonths,
    /// ~126 trading days
    SixMonths,
    /// ~252 trading days
    OneYear,
    /// ~504 trading days
    TwoYears,
    /// ~1260 trading days
    FiveYears,
}

impl ChartRange {
    /// Parse from string (e.g., "1y", "6mo")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1mo" | "1m" => Some(Self::OneMonth),
            "3mo" | "3m" => Some(Self::ThreeMonths),
            "6mo" | "6m" => Some(Self::SixMonths),
            "1y" | "12mo" => Some(Self::OneYear),
            "2y" => Some(Self::TwoYears),
            "5y" => Some(Self::FiveYears),
            _ => None,
        }
    }

    /// Convert to API range string (for data sources)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }
}

impl std::fmt::Display for ChartRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bar interval for chart data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarInterval {
    /// Daily bars
    Daily,
    /// Weekly bars
    Weekly,
}

impl BarInterval {
    /// Parse from string (e.g., "1d", "1wk")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1d" | "d" | "daily" => Some(Self::Daily),
            "1wk" | "w" | "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// Convert to API interval string (for data sources)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
        }
    }
}

impl std::fmt::Display for BarInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume in shares
    pub volume: f64,
}

impl Bar {
    /// True range relative to the previous close
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// An ordered price history for one symbol.
///
/// The constructor normalizes whatever the source returned: bars are sorted
/// ascending by timestamp and duplicate timestamps collapse to the last
/// occurrence (sources resend corrected bars under the same timestamp).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Symbol/ticker
    pub symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Create a normalized series from raw source bars.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        // dedup_by keeps the FIRST of a run, so walk from the back instead
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars.into_iter().rev() {
            if deduped.last().map(|b: &Bar| b.timestamp) != Some(bar.timestamp) {
                deduped.push(bar);
            }
        }
        deduped.reverse();

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    /// All bars, ascending by timestamp.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// High prices, oldest first.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Low prices, oldest first.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Volumes, oldest first.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Last closing price, if any bars exist.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Simple bar-over-bar returns. Bars with a non-positive previous
    /// close are skipped rather than dividing by zero.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .filter(|w| w[0].close > 0.0)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect()
    }

    /// Calendar years spanned by the series, from first to last bar.
    pub fn elapsed_years(&self) -> Option<f64> {
        if self.bars.len() < 2 {
            return None;
        }
        let first = self.bars.first()?.timestamp;
        let last = self.bars.last()?.timestamp;
        let secs = (last - first).num_seconds() as f64;
        Some(secs / (365.25 * 24.0 * 3600.0))
    }
}

// ============================================================================
// Quote Snapshot
// ============================================================================

/// Market session state at quote time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketState {
    PreMarket,
    Regular,
    PostMarket,
    Closed,
}

impl Default for MarketState {
    fn default() -> Self {
        // Assumed when the source does not report a session
        Self::Regular
    }
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreMarket => write!(f, "pre-market"),
            Self::Regular => write!(f, "regular"),
            Self::PostMarket => write!(f, "post-market"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Real-time quote snapshot.
///
/// Ephemeral by design: fetched, rendered or scored, and dropped. The
/// fundamental ratios are fractions (0.15 = 15%); `change_pct` is in
/// percent units because that is what every upstream API reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol/ticker
    pub symbol: String,
    /// Last traded price
    pub price: f64,
    /// Day change in percent units (1.5 = +1.5%)
    pub change_pct: f64,
    /// Previous session close
    pub prev_close: f64,
    /// Day's volume in shares
    pub volume: f64,
    /// Market capitalization in dollars
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Trailing P/E ratio
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// 52-week high price
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    /// 52-week low price
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,
    /// Market session state
    #[serde(default)]
    pub state: MarketState,
    /// Year-over-year revenue growth (fraction)
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    /// Gross margin (fraction)
    #[serde(default)]
    pub gross_margin: Option<f64>,
    /// Return on equity (fraction)
    #[serde(default)]
    pub return_on_equity: Option<f64>,
    /// Debt-to-equity ratio
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    /// Dividend yield (fraction)
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    /// Dividend payout ratio (fraction)
    #[serde(default)]
    pub payout_ratio: Option<f64>,
}

impl Quote {
    /// Dollar change from previous close
    pub fn change(&self) -> f64 {
        self.price - self.prev_close
    }

    /// Price as a fraction of the 52-week high (1.0 = at the high)
    pub fn high_proximity(&self) -> Option<f64> {
        match self.fifty_two_week_high {
            Some(high) if high > 0.0 => Some(self.price / high),
            _ => None,
        }
    }

    /// Distance above the 52-week low as a fraction (0.0 = at the low)
    pub fn low_discount(&self) -> Option<f64> {
        match self.fifty_two_week_low {
            Some(low) if low > 0.0 => Some(self.price / low - 1.0),
            _ => None,
        }
    }
}

// ============================================================================
// Headlines
// ============================================================================

/// A news headline attached to a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    /// Headline text
    pub title: String,
    /// Publisher name
    #[serde(default)]
    pub source: Option<String>,
    /// Publication time
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Headline {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: None,
            published_at: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar_at(day: u32, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Bar {
            timestamp: ts,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_chart_range_strings() {
        assert_eq!(ChartRange::from_str("1y"), Some(ChartRange::OneYear));
        assert_eq!(ChartRange::from_str("6mo"), Some(ChartRange::SixMonths));
        assert_eq!(ChartRange::from_str("bogus"), None);
        assert_eq!(ChartRange::TwoYears.as_str(), "2y");
        assert_eq!(BarInterval::from_str("1wk"), Some(BarInterval::Weekly));
        assert_eq!(BarInterval::Daily.as_str(), "1d");
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let bars = vec![bar_at(3, 12.0), bar_at(1, 10.0), bar_at(3, 13.0), bar_at(2, 11.0)];
        let series = Series::new("AAPL", bars);

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 13.0]);
        // Duplicate timestamp keeps the later occurrence
        assert_eq!(series.last_close(), Some(13.0));
    }

    #[test]
    fn test_series_daily_returns() {
        let series = Series::new("AAPL", vec![bar_at(1, 100.0), bar_at(2, 110.0), bar_at(3, 99.0)]);
        let returns = series.daily_returns();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-10);
        assert!((returns[1] + 0.10).abs() < 1e-10);
    }

    #[test]
    fn test_series_elapsed_years() {
        let series = Series::new("AAPL", vec![bar_at(1, 100.0)]);
        assert!(series.elapsed_years().is_none());

        let mut bars = vec![bar_at(1, 100.0)];
        bars.push(Bar {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            ..bar_at(1, 120.0)
        });
        let series = Series::new("AAPL", bars);
        let years = series.elapsed_years().unwrap();
        assert!((years - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_bar_true_range() {
        let bar = bar_at(1, 10.0); // high 11, low 9
        assert!((bar.true_range(10.0) - 2.0).abs() < 1e-10);
        // Gap down: previous close far above the bar
        assert!((bar.true_range(15.0) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_quote_helpers() {
        let quote = Quote {
            symbol: "AAPL".to_string(),
            price: 95.0,
            change_pct: -1.2,
            prev_close: 96.15,
            volume: 1_000_000.0,
            market_cap: Some(2.0e12),
            pe_ratio: Some(28.0),
            fifty_two_week_high: Some(100.0),
            fifty_two_week_low: Some(80.0),
            state: MarketState::Regular,
            revenue_growth: None,
            gross_margin: None,
            return_on_equity: None,
            debt_to_equity: None,
            dividend_yield: None,
            payout_ratio: None,
        };

        assert!((quote.change() + 1.15).abs() < 1e-9);
        assert!((quote.high_proximity().unwrap() - 0.95).abs() < 1e-9);
        assert!((quote.low_discount().unwrap() - 0.1875).abs() < 1e-9);
    }

    #[test]
    fn test_market_state_display() {
        assert_eq!(MarketState::PreMarket.to_string(), "pre-market");
        assert_eq!(MarketState::Closed.to_string(), "closed");
        assert_eq!(MarketState::default(), MarketState::Regular);
    }
}
