//! Full single-symbol analysis.
//!
//! Assembles indicators, summary statistics, signals, and the verdict into
//! one result the chat layer renders as the "analyze SYMBOL" answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::Series;
use crate::error::EngineError;
use crate::indicators::{
    adx, atr, bollinger, macd, rsi, sma, ADX_PERIOD, ATR_PERIOD, BOLLINGER_PERIOD,
    BOLLINGER_WIDTH, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD, SMA_TREND_FAST,
    SMA_TREND_SLOW,
};
use crate::patterns::{classify_verdict, detect_signals, Signal, Verdict};
use crate::stats::{quant_stats, SummaryStats};

/// Minimum history for a full analysis
pub const MIN_ANALYSIS_BARS: usize = 50;

/// Latest value of every tracked indicator.
///
/// A `None` means the indicator was still warming up on the last bar; with a
/// year of daily history only `sma200` is typically affected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub atr14: Option<f64>,
    pub adx14: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

/// Complete analysis of one symbol's price history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Symbol/ticker
    pub symbol: String,
    /// Timestamp of the last bar analyzed
    pub as_of: DateTime<Utc>,
    /// Last closing price
    pub last_close: f64,
    /// Number of bars analyzed
    pub bar_count: usize,
    /// Return and risk statistics
    pub stats: SummaryStats,
    /// Latest indicator values
    pub technicals: TechnicalSnapshot,
    /// Signals on the latest bar
    pub signals: Vec<Signal>,
    /// Risk-adjusted verdict
    pub verdict: Verdict,
}

fn last_value(values: &[Option<f64>]) -> Option<f64> {
    values.last().copied().flatten()
}

/// Analyze a full series.
///
/// Errors with `InsufficientHistory` below [`MIN_ANALYSIS_BARS`] bars; a
/// short history would silently produce an all-warm-up snapshot, which reads
/// like an answer but says nothing.
pub fn analyze_series(series: &Series) -> Result<Analysis, EngineError> {
    let n = series.len();
    if n < MIN_ANALYSIS_BARS {
        return Err(EngineError::InsufficientHistory {
            symbol: series.symbol.clone(),
            have: n,
            need: MIN_ANALYSIS_BARS,
        });
    }

    let closes = series.closes();
    let bars = series.bars();

    let sma50 = sma(&closes, SMA_TREND_FAST);
    let sma200 = sma(&closes, SMA_TREND_SLOW);
    let rsi14 = rsi(&closes, RSI_PERIOD);
    let atr14 = atr(bars, ATR_PERIOD);
    let adx14 = adx(bars, ADX_PERIOD);
    let macd_all = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let bands = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH);

    let stats = quant_stats(series);
    let signals = detect_signals(&closes, &sma50, &sma200, &rsi14, &macd_all, &bands);
    let verdict = classify_verdict(&stats);

    let technicals = TechnicalSnapshot {
        sma50: last_value(&sma50),
        sma200: last_value(&sma200),
        rsi14: last_value(&rsi14),
        macd: last_value(&macd_all.line),
        macd_signal: last_value(&macd_all.signal),
        macd_histogram: last_value(&macd_all.histogram),
        atr14: last_value(&atr14),
        adx14: last_value(&adx14),
        bollinger_upper: last_value(&bands.upper),
        bollinger_middle: last_value(&bands.middle),
        bollinger_lower: last_value(&bands.lower),
    };

    // Bars exist: n >= MIN_ANALYSIS_BARS was checked above
    let last_bar = bars[n - 1];

    Ok(Analysis {
        symbol: series.symbol.clone(),
        as_of: last_bar.timestamp,
        last_close: last_bar.close,
        bar_count: n,
        stats,
        technicals,
        signals,
        verdict,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn daily_series(symbol: &str, closes: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        Series::new(symbol, bars)
    }

    #[test]
    fn test_insufficient_history() {
        let series = daily_series("AAPL", &[100.0; 20]);
        let err = analyze_series(&series).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientHistory { have: 20, need: 50, .. }
        ));
    }

    #[test]
    fn test_linear_rally_analysis() {
        // 300 bars climbing linearly from 100 to 400
        let closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + 300.0 * i as f64 / 299.0)
            .collect();
        let series = daily_series("NVDA", &closes);
        let analysis = analyze_series(&series).unwrap();

        assert_eq!(analysis.symbol, "NVDA");
        assert_eq!(analysis.bar_count, 300);
        assert!((analysis.last_close - 400.0).abs() < 1e-9);

        // Both trend SMAs exist and the fast one leads in a rally
        let sma50 = analysis.technicals.sma50.unwrap();
        let sma200 = analysis.technicals.sma200.unwrap();
        assert!(sma50 > sma200);
        assert!(sma50 < 400.0);

        // Straight-line rise saturates RSI
        assert!(analysis.technicals.rsi14.unwrap() > 99.0);
        assert!(analysis.technicals.adx14.is_some());
        assert!(analysis.technicals.atr14.is_some());
        assert!(analysis.technicals.macd.is_some());
        assert!(analysis.technicals.bollinger_upper.is_some());

        // Stats all populated, drawdown flat at zero
        assert!((analysis.stats.total_return.unwrap() - 3.0).abs() < 1e-9);
        assert!((analysis.stats.max_drawdown.unwrap()).abs() < 1e-12);
        assert!(analysis.stats.sharpe.unwrap() > crate::patterns::VERDICT_SHARPE_BULL);

        assert!(analysis.signals.contains(&Signal::Overbought));
        assert!(analysis.signals.contains(&Signal::TrailingHigh));
        assert_eq!(analysis.verdict, Verdict::Bullish);
    }

    #[test]
    fn test_one_year_history_lacks_sma200() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.1)).collect();
        let series = daily_series("MSFT", &closes);
        let analysis = analyze_series(&series).unwrap();

        assert!(analysis.technicals.sma50.is_some());
        // 120 bars cannot fill a 200-bar window
        assert!(analysis.technicals.sma200.is_none());
        assert!(analysis.technicals.rsi14.is_some());
    }

    #[test]
    fn test_serializes_for_downstream_render() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.2).sin()).collect();
        let analysis = analyze_series(&daily_series("AAPL", &closes)).unwrap();

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["symbol"], "AAPL");
        assert!(json["technicals"].get("rsi14").is_some());
        assert!(json["verdict"].is_string());
    }
}
