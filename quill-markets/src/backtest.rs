//! RSI threshold backtest.
//!
//! Simulates the classic mean-reversion rule on one symbol: buy the full
//! notional when RSI crosses down through the buy threshold, sell everything
//! when it crosses up through the sell threshold, and compare the outcome to
//! just holding over the same window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::Series;
use crate::error::EngineError;
use crate::indicators;

/// Bars required before a backtest is meaningful
pub const MIN_BACKTEST_BARS: usize = 50;
/// Trades kept in the result's recent tail
pub const RECENT_TRADE_LIMIT: usize = 10;

/// Backtest parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestParams {
    /// RSI lookback period
    pub rsi_period: usize,
    /// Enter when RSI crosses below this while flat
    pub buy_below: f64,
    /// Exit when RSI crosses above this while holding
    pub sell_above: f64,
    /// Starting cash
    pub initial_capital: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            rsi_period: indicators::RSI_PERIOD,
            buy_below: 30.0,
            sell_above: 70.0,
            initial_capital: 10_000.0,
        }
    }
}

/// Which way a trade went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// One signal-driven trade in the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestTrade {
    /// Buy or sell
    pub side: TradeSide,
    /// Fill price (the bar close)
    pub price: f64,
    /// Bar timestamp the signal fired on
    pub date: DateTime<Utc>,
    /// RSI value at the signal
    pub rsi: f64,
}

/// Backtest result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiBacktest {
    /// Symbol tested
    pub symbol: String,
    /// Parameters used
    pub params: BacktestParams,
    /// Bars simulated
    pub bars: usize,
    /// First bar timestamp
    pub first_bar: DateTime<Utc>,
    /// Last bar timestamp
    pub last_bar: DateTime<Utc>,
    /// Strategy return over the window (fraction)
    pub strategy_return: f64,
    /// Buy-and-hold return over the same window (fraction)
    pub buy_hold_return: f64,
    /// Equity at the end, open position liquidated at the final close
    pub final_equity: f64,
    /// Signal-driven trades executed
    pub total_trades: usize,
    /// Chronological tail of the trade log, at most `RECENT_TRADE_LIMIT`
    pub recent_trades: Vec<BacktestTrade>,
    /// Whether a position was still open at series end
    pub open_at_end: bool,
}

/// Run the RSI threshold rule over a series.
///
/// The simulation starts flat with the full notional. Entries and exits are
/// strict crossings, so a series that begins already below the buy threshold
/// does not trigger until RSI has come back up and crossed down again. A
/// position still open at the end is liquidated at the final close for the
/// equity figure but is not logged as a sell.
pub fn run_rsi_backtest(series: &Series, params: &BacktestParams) -> Result<RsiBacktest, EngineError> {
    let bars = series.bars();
    let n = bars.len();
    if n < MIN_BACKTEST_BARS {
        return Err(EngineError::InsufficientHistory {
            symbol: series.symbol.clone(),
            have: n,
            need: MIN_BACKTEST_BARS,
        });
    }

    let closes = series.closes();
    let rsi = indicators::rsi(&closes, params.rsi_period);

    let mut cash = params.initial_capital;
    let mut units = 0.0_f64;
    let mut holding = false;
    let mut trades: Vec<BacktestTrade> = Vec::new();
    let mut prev_rsi: Option<f64> = None;

    for (bar, value) in bars.iter().zip(rsi.iter()) {
        let Some(value) = *value else { continue };
        if let Some(prev) = prev_rsi {
            if !holding && prev >= params.buy_below && value < params.buy_below && bar.close > 0.0
            {
                units = cash / bar.close;
                cash = 0.0;
                holding = true;
                trades.push(BacktestTrade {
                    side: TradeSide::Buy,
                    price: bar.close,
                    date: bar.timestamp,
                    rsi: value,
                });
            } else if holding && prev <= params.sell_above && value > params.sell_above {
                cash = units * bar.close;
                units = 0.0;
                holding = false;
                trades.push(BacktestTrade {
                    side: TradeSide::Sell,
                    price: bar.close,
                    date: bar.timestamp,
                    rsi: value,
                });
            }
        }
        prev_rsi = Some(value);
    }

    let first_close = bars[0].close;
    let last_close = bars[n - 1].close;
    let final_equity = if holding { units * last_close } else { cash };

    let strategy_return = if params.initial_capital > 0.0 {
        final_equity / params.initial_capital - 1.0
    } else {
        0.0
    };
    let buy_hold_return = if first_close > 0.0 {
        last_close / first_close - 1.0
    } else {
        0.0
    };

    let total_trades = trades.len();
    let recent_trades = trades.split_off(total_trades.saturating_sub(RECENT_TRADE_LIMIT));

    Ok(RsiBacktest {
        symbol: series.symbol.clone(),
        params: params.clone(),
        bars: n,
        first_bar: bars[0].timestamp,
        last_bar: bars[n - 1].timestamp,
        strategy_return,
        buy_hold_return,
        final_equity,
        total_trades,
        recent_trades,
        open_at_end: holding,
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

    fn series(closes: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        Series::new("TEST", bars)
    }

    /// Drifts sideways, sells off hard, then rallies: RSI crosses 30 going
    /// down exactly once and 70 going up exactly once.
    fn dip_and_recover() -> Vec<f64> {
        let mut closes = Vec::new();
        let mut price = 100.0;
        for i in 0..21 {
            price += if i % 2 == 0 { 0.1 } else { -0.1 };
            closes.push(price);
        }
        for _ in 0..15 {
            price -= 1.0;
            closes.push(price);
        }
        for _ in 0..20 {
            price += 1.5;
            closes.push(price);
        }
        closes
    }

    #[test]
    fn test_default_params() {
        let params = BacktestParams::default();
        assert_eq!(params.rsi_period, 14);
        assert!((params.buy_below - 30.0).abs() < 1e-12);
        assert!((params.sell_above - 70.0).abs() < 1e-12);
        assert!((params.initial_capital - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_history() {
        let closes: Vec<f64> = (0..49).map(|i| 100.0 + i as f64).collect();
        let err = run_rsi_backtest(&series(&closes), &BacktestParams::default()).unwrap_err();
        match err {
            EngineError::InsufficientHistory { have, need, .. } => {
                assert_eq!(have, 49);
                assert_eq!(need, MIN_BACKTEST_BARS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_one_dip_yields_one_round_trip() {
        let closes = dip_and_recover();
        let result = run_rsi_backtest(&series(&closes), &BacktestParams::default()).unwrap();

        assert_eq!(result.total_trades, 2);
        assert_eq!(result.recent_trades.len(), 2);
        assert!(!result.open_at_end);

        let buy = &result.recent_trades[0];
        let sell = &result.recent_trades[1];
        assert_eq!(buy.side, TradeSide::Buy);
        assert_eq!(sell.side, TradeSide::Sell);
        assert!(buy.date < sell.date);
        assert!(buy.rsi < 30.0);
        assert!(sell.rsi > 70.0);

        // Full-notional round trip: equity is just the price ratio
        let expected_equity = 10_000.0 / buy.price * sell.price;
        assert!((result.final_equity - expected_equity).abs() < 1e-6);
        assert!((result.strategy_return - (expected_equity / 10_000.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_open_position_liquidates_without_phantom_sell() {
        // Sideways then a 30-bar decline: the buy fires and nothing closes it
        let mut closes = Vec::new();
        let mut price = 100.0;
        for i in 0..25 {
            price += if i % 2 == 0 { 0.1 } else { -0.1 };
            closes.push(price);
        }
        for _ in 0..30 {
            price -= 1.0;
            closes.push(price);
        }

        let result = run_rsi_backtest(&series(&closes), &BacktestParams::default()).unwrap();

        assert_eq!(result.total_trades, 1);
        assert!(result.open_at_end);
        let buy = result.recent_trades.last().unwrap();
        assert_eq!(buy.side, TradeSide::Buy);

        // Liquidated at the final close, no sell appended
        let last_close = *closes.last().unwrap();
        let expected_equity = 10_000.0 / buy.price * last_close;
        assert!((result.final_equity - expected_equity).abs() < 1e-6);
        assert!(result.strategy_return < 0.0);
    }

    #[test]
    fn test_buy_hold_return_spans_the_window() {
        let closes = dip_and_recover();
        let result = run_rsi_backtest(&series(&closes), &BacktestParams::default()).unwrap();
        let expected = closes.last().unwrap() / closes.first().unwrap() - 1.0;
        assert!((result.buy_hold_return - expected).abs() < 1e-12);
        assert_eq!(result.bars, closes.len());
    }
}
