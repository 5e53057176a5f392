//! Qualitative signal detection and verdict classification.
//!
//! Signals are read off the latest bar (and the bar before it, for
//! crossovers). A signal that cannot be evaluated because its indicator is
//! still warming up is simply not emitted.

use serde::{Deserialize, Serialize};

use crate::indicators::{BollingerBands, Macd};
use crate::stats::SummaryStats;

/// RSI level above which a symbol reads overbought
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI level below which a symbol reads oversold
pub const RSI_OVERSOLD: f64 = 30.0;
/// Window for the trailing closing high/low check
pub const BREAKOUT_WINDOW: usize = 20;

// ============================================================================
// Signals
// ============================================================================

/// A qualitative pattern observed on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// SMA50 crossed above SMA200 on this bar
    GoldenCross,
    /// SMA50 crossed below SMA200 on this bar
    DeathCross,
    /// RSI above the overbought level
    Overbought,
    /// RSI below the oversold level
    Oversold,
    /// Close at or above the upper Bollinger band
    UpperBandTouch,
    /// Close at or below the lower Bollinger band
    LowerBandTouch,
    /// MACD histogram flipped positive on this bar
    MacdBullishCross,
    /// MACD histogram flipped negative on this bar
    MacdBearishCross,
    /// Close is the highest of the trailing window
    TrailingHigh,
    /// Close is the lowest of the trailing window
    TrailingLow,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoldenCross => write!(f, "golden cross (SMA50 over SMA200)"),
            Self::DeathCross => write!(f, "death cross (SMA50 under SMA200)"),
            Self::Overbought => write!(f, "RSI overbought"),
            Self::Oversold => write!(f, "RSI oversold"),
            Self::UpperBandTouch => write!(f, "upper Bollinger band touch"),
            Self::LowerBandTouch => write!(f, "lower Bollinger band touch"),
            Self::MacdBullishCross => write!(f, "MACD bullish crossover"),
            Self::MacdBearishCross => write!(f, "MACD bearish crossover"),
            Self::TrailingHigh => write!(f, "20-bar closing high"),
            Self::TrailingLow => write!(f, "20-bar closing low"),
        }
    }
}

/// Detect signals on the latest bar.
///
/// All indicator vectors must be aligned with `closes`. Crossover signals
/// need two bars of indicator history; level signals need one.
pub fn detect_signals(
    closes: &[f64],
    sma50: &[Option<f64>],
    sma200: &[Option<f64>],
    rsi14: &[Option<f64>],
    macd: &Macd,
    bands: &BollingerBands,
) -> Vec<Signal> {
    let n = closes.len();
    if n == 0 {
        return Vec::new();
    }
    let last = n - 1;
    let mut signals = Vec::new();

    // SMA trend crossovers need the previous bar as well
    if n >= 2 {
        let prev = last - 1;
        if let (Some(f0), Some(s0), Some(f1), Some(s1)) =
            (sma50[prev], sma200[prev], sma50[last], sma200[last])
        {
            if f0 <= s0 && f1 > s1 {
                signals.push(Signal::GoldenCross);
            }
            if f0 >= s0 && f1 < s1 {
                signals.push(Signal::DeathCross);
            }
        }

        if let (Some(h0), Some(h1)) = (macd.histogram[prev], macd.histogram[last]) {
            if h0 <= 0.0 && h1 > 0.0 {
                signals.push(Signal::MacdBullishCross);
            }
            if h0 >= 0.0 && h1 < 0.0 {
                signals.push(Signal::MacdBearishCross);
            }
        }
    }

    if let Some(rsi) = rsi14[last] {
        if rsi > RSI_OVERBOUGHT {
            signals.push(Signal::Overbought);
        }
        if rsi < RSI_OVERSOLD {
            signals.push(Signal::Oversold);
        }
    }

    let close = closes[last];
    if let Some(upper) = bands.upper[last] {
        if close >= upper {
            signals.push(Signal::UpperBandTouch);
        }
    }
    if let Some(lower) = bands.lower[last] {
        if close <= lower {
            signals.push(Signal::LowerBandTouch);
        }
    }

    if n >= BREAKOUT_WINDOW {
        let window = &closes[n - BREAKOUT_WINDOW..];
        let high = window.iter().cloned().fold(f64::MIN, f64::max);
        let low = window.iter().cloned().fold(f64::MAX, f64::min);
        if close >= high {
            signals.push(Signal::TrailingHigh);
        }
        if close <= low {
            signals.push(Signal::TrailingLow);
        }
    }

    signals
}

// ============================================================================
// Verdict
// ============================================================================

/// Sharpe above which a symbol can read bullish
pub const VERDICT_SHARPE_BULL: f64 = 1.2;
/// Drawdown shallower than this is required for a bullish read
pub const VERDICT_DRAWDOWN_BULL: f64 = -0.3;
/// Sharpe below which a symbol can read bearish
pub const VERDICT_SHARPE_BEAR: f64 = 0.3;
/// Drawdown deeper than this is required for a bearish read
pub const VERDICT_DRAWDOWN_BEAR: f64 = -0.4;

/// Coarse risk-adjusted read on a symbol's recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Bullish,
    Neutral,
    Bearish,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Neutral => write!(f, "neutral"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

/// Classify summary stats into a verdict.
///
/// Missing Sharpe or drawdown always reads neutral.
pub fn classify_verdict(stats: &SummaryStats) -> Verdict {
    let (Some(sharpe), Some(drawdown)) = (stats.sharpe, stats.max_drawdown) else {
        return Verdict::Neutral;
    };

    if sharpe > VERDICT_SHARPE_BULL && drawdown > VERDICT_DRAWDOWN_BULL {
        Verdict::Bullish
    } else if sharpe < VERDICT_SHARPE_BEAR && drawdown < VERDICT_DRAWDOWN_BEAR {
        Verdict::Bearish
    } else {
        Verdict::Neutral
    }
}

// ============================================================================
// Tests
// ============================================================================
