//! Quiet-accumulation ("moonshot") scoring.
//!
//! Looks for the setup before the move: volume at least doubling while the
//! price has not yet reacted, with the close still pinned near its ten-day
//! high. Candidates are ranked by the size of the volume spike.

use serde::{Deserialize, Serialize};

use crate::data::Series;

/// Largest day move (percent, either direction) still counted as quiet
pub const MAX_DAY_MOVE_PCT: f64 = 4.0;
/// Minimum ratio of today's volume to yesterday's
pub const MIN_VOLUME_RATIO: f64 = 2.0;
/// Bars in the trailing high window
pub const TEN_DAY_WINDOW: usize = 10;
/// Close must hold at least this fraction of the trailing high
pub const NEAR_HIGH_RATIO: f64 = 0.95;
/// Minimum price, filters out penny names where volume spikes mean little
pub const MIN_PRICE: f64 = 5.0;

/// A symbol showing volume accumulation without a price move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonshotCandidate {
    /// Symbol/ticker
    pub symbol: String,
    /// Last close
    pub price: f64,
    /// Last-session change in percent units
    pub day_change_pct: f64,
    /// Today's volume over yesterday's
    pub volume_ratio: f64,
    /// Highest high of the trailing window
    pub ten_day_high: f64,
}

/// Score a series for the moonshot scan.
///
/// Every gate must pass: enough history, a non-penny price, a day move inside
/// `MAX_DAY_MOVE_PCT`, volume at least `MIN_VOLUME_RATIO` times the prior
/// session, and a close holding `NEAR_HIGH_RATIO` of the ten-day high.
pub fn score_moonshot(series: &Series) -> Option<MoonshotCandidate> {
    let bars = series.bars();
    let n = bars.len();
    if n < TEN_DAY_WINDOW {
        return None;
    }

    let last = &bars[n - 1];
    let prev = &bars[n - 2];
    let price = last.close;
    if price < MIN_PRICE || prev.close <= 0.0 || prev.volume <= 0.0 {
        return None;
    }

    let day_change_pct = (last.close / prev.close - 1.0) * 100.0;
    if day_change_pct.abs() > MAX_DAY_MOVE_PCT {
        return None;
    }

    let volume_ratio = last.volume / prev.volume;
    if volume_ratio < MIN_VOLUME_RATIO {
        return None;
    }

    let ten_day_high = bars[n - TEN_DAY_WINDOW..]
        .iter()
        .map(|bar| bar.high)
        .fold(f64::MIN, f64::max);
    if price < NEAR_HIGH_RATIO * ten_day_high {
        return None;
    }

    Some(MoonshotCandidate {
        symbol: series.symbol.clone(),
        price,
        day_change_pct,
        volume_ratio,
        ten_day_high,
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

    /// One `(close, high, volume)` row per daily bar.
    fn series(rows: &[(f64, f64, f64)]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, &(close, high, volume))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high,
                low: close,
                close,
                volume,
            })
            .collect();
        Series::new("MOON", bars)
    }

    /// Nine quiet bars at 10.0, then a +2% close on 2.5x volume.
    fn accumulation_rows() -> Vec<(f64, f64, f64)> {
        let mut rows = vec![(10.0, 10.0, 1_000_000.0); 9];
        rows.push((10.2, 10.2, 2_500_000.0));
        rows
    }

    #[test]
    fn test_short_history_is_unscorable() {
        let rows = vec![(10.0, 10.0, 1_000_000.0); TEN_DAY_WINDOW - 1];
        assert!(score_moonshot(&series(&rows)).is_none());
    }

    #[test]
    fn test_quiet_accumulation_passes() {
        let hit = score_moonshot(&series(&accumulation_rows())).unwrap();
        assert_eq!(hit.symbol, "MOON");
        assert!((hit.price - 10.2).abs() < 1e-12);
        assert!((hit.day_change_pct - 2.0).abs() < 1e-9);
        assert!((hit.volume_ratio - 2.5).abs() < 1e-12);
        assert!((hit.ten_day_high - 10.2).abs() < 1e-12);
    }

    #[test]
    fn test_penny_stocks_are_rejected() {
        let mut rows = vec![(4.0, 4.0, 1_000_000.0); 9];
        rows.push((4.05, 4.05, 2_500_000.0));
        assert!(score_moonshot(&series(&rows)).is_none());

        // The floor itself passes
        let mut rows = vec![(5.0, 5.0, 1_000_000.0); 9];
        rows.push((5.0, 5.0, 2_500_000.0));
        assert!(score_moonshot(&series(&rows)).is_some());
    }

    #[test]
    fn test_big_day_moves_are_rejected() {
        // Already up 5% on the day: the move has started without us
        let mut rows = vec![(10.0, 10.0, 1_000_000.0); 9];
        rows.push((10.5, 10.5, 2_500_000.0));
        assert!(score_moonshot(&series(&rows)).is_none());

        // A 5% flush fails the same gate
        let mut rows = vec![(10.0, 10.0, 1_000_000.0); 9];
        rows.push((9.5, 10.0, 2_500_000.0));
        assert!(score_moonshot(&series(&rows)).is_none());
    }

    #[test]
    fn test_needs_volume_spike() {
        let mut rows = vec![(10.0, 10.0, 1_000_000.0); 9];
        rows.push((10.2, 10.2, 1_500_000.0));
        assert!(score_moonshot(&series(&rows)).is_none());

        // Exactly doubled volume passes
        let mut rows = vec![(10.0, 10.0, 1_000_000.0); 9];
        rows.push((10.2, 10.2, 2_000_000.0));
        let hit = score_moonshot(&series(&rows)).unwrap();
        assert!((hit.volume_ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_must_hold_near_ten_day_high() {
        // An intraday spike to 12 three days ago leaves 10.2 below 95% of it
        let mut rows = accumulation_rows();
        rows[6].1 = 12.0;
        assert!(score_moonshot(&series(&rows)).is_none());
    }
}
