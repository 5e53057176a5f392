//! Momentum scan scoring.

use serde::{Deserialize, Serialize};

use super::{composite_return, volume_z_score};
use crate::data::{Quote, Series};
use crate::indicators::{adx, rsi, ADX_PERIOD, RSI_PERIOD};

/// Cap applied to the volume z-score before weighting
pub const VOLUME_Z_CAP: f64 = 3.0;
/// Weight of the capped volume z-score in the final score
pub const VOLUME_Z_WEIGHT: f64 = 0.15;
/// Proximity to the 52-week high above which the bonus kicks in
pub const HIGH_PROXIMITY_FLOOR: f64 = 0.95;
/// Weight of the proximity excess above the floor
pub const HIGH_PROXIMITY_WEIGHT: f64 = 2.0;
/// ADX level that counts as an established trend
pub const ADX_TREND_LEVEL: f64 = 20.0;
/// Bonus for a trending symbol
pub const ADX_TREND_BONUS: f64 = 0.05;
/// Lower bound of the healthy RSI band
pub const RSI_HEALTHY_MIN: f64 = 20.0;
/// Upper bound of the healthy RSI band
pub const RSI_HEALTHY_MAX: f64 = 80.0;
/// Penalty when RSI sits outside the healthy band
pub const RSI_EXTREME_PENALTY: f64 = 0.05;

/// A symbol ranked by multi-horizon momentum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumCandidate {
    /// Symbol/ticker
    pub symbol: String,
    /// Final score the ranking uses
    pub score: f64,
    /// Weighted multi-horizon return
    pub composite_return: f64,
    /// Volume z-score against the prior window, when measurable
    pub volume_z: Option<f64>,
    /// Price as a fraction of the 52-week high, when the quote carries one
    pub high_proximity: Option<f64>,
    /// Latest RSI
    pub rsi14: Option<f64>,
    /// Latest ADX
    pub adx14: Option<f64>,
}

/// Score a symbol for the momentum scan.
///
/// The composite trailing return is the backbone; volume surprise, 52-week
/// high proximity, trend strength, and RSI health nudge it. `None` means the
/// history cannot support even the shortest lookback.
pub fn score_momentum(series: &Series, quote: Option<&Quote>) -> Option<MomentumCandidate> {
    let closes = series.closes();
    let composite = composite_return(&closes)?;

    let volume_z = volume_z_score(&series.volumes());
    let rsi14 = rsi(&closes, RSI_PERIOD).last().copied().flatten();
    let adx14 = adx(series.bars(), ADX_PERIOD).last().copied().flatten();
    let high_proximity = quote.and_then(Quote::high_proximity);

    let mut score = composite;
    if let Some(z) = volume_z {
        score += z.min(VOLUME_Z_CAP) * VOLUME_Z_WEIGHT;
    }
    if let Some(proximity) = high_proximity {
        if proximity > HIGH_PROXIMITY_FLOOR {
            score += (proximity - HIGH_PROXIMITY_FLOOR) * HIGH_PROXIMITY_WEIGHT;
        }
    }
    if let Some(adx) = adx14 {
        if adx >= ADX_TREND_LEVEL {
            score += ADX_TREND_BONUS;
        }
    }
    if let Some(rsi) = rsi14 {
        if !(RSI_HEALTHY_MIN..=RSI_HEALTHY_MAX).contains(&rsi) {
            score -= RSI_EXTREME_PENALTY;
        }
    }

    Some(MomentumCandidate {
        symbol: series.symbol.clone(),
        score,
        composite_return: composite,
        volume_z,
        high_proximity,
        rsi14,
        adx14,
    })
}

// ============================================================================
// Tests
// ============================================================================
