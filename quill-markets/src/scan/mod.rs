//! Ranked market scans.
//!
//! Each scan is split in two: a pure scoring function in this module tree
//! (series/quote in, candidate out) and the async orchestration in
//! [`crate::engine`], which owns fetching, timeouts, and failure isolation.
//! Scoring functions return `None` for symbols that fail a scan's filters or
//! lack the history to be scored at all.

mod ideas;
mod momentum;
mod moonshot;
mod value;

pub use ideas::{
    score_income, score_momentum_idea, score_quality, IdeaSet, IncomeIdea, QualityIdea,
    AVG_VOLUME_WINDOW, INCOME_MAX_PAYOUT, INCOME_MIN_YIELD, MOMENTUM_MIN_AVG_VOLUME,
    QUALITY_MAX_DEBT_TO_EQUITY, QUALITY_MIN_GROSS_MARGIN, QUALITY_MIN_REVENUE_GROWTH,
    QUALITY_MIN_ROE,
};
pub use momentum::{
    score_momentum, MomentumCandidate, ADX_TREND_BONUS, ADX_TREND_LEVEL, HIGH_PROXIMITY_FLOOR,
    HIGH_PROXIMITY_WEIGHT, RSI_EXTREME_PENALTY, RSI_HEALTHY_MAX, RSI_HEALTHY_MIN, VOLUME_Z_CAP,
    VOLUME_Z_WEIGHT,
};
pub use moonshot::{
    score_moonshot, MoonshotCandidate, MAX_DAY_MOVE_PCT, MIN_PRICE, MIN_VOLUME_RATIO,
    NEAR_HIGH_RATIO, TEN_DAY_WINDOW,
};
pub use value::{
    score_dislocation, score_value_idea, DislocationCandidate, ValueIdea, LOW_DISCOUNT_WEIGHT,
    LOW_DISCOUNT_WINDOW, MAX_MARKET_CAP, PE_CEILING, PE_FLOOR,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

// ============================================================================
// Scan Report
// ============================================================================

/// Outcome of one scan over a symbol universe.
///
/// `hits` is ranked best-first and truncated to the requested size.
/// `skipped` counts symbols whose data could not be fetched or scored;
/// symbols that were evaluated but failed the scan's filters are neither
/// hits nor skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport<T> {
    /// Ranked candidates, best first
    pub hits: Vec<T>,
    /// Number of symbols scanned
    pub universe: usize,
    /// Symbols dropped for missing or unusable data
    pub skipped: usize,
    /// Scan start time
    pub started_at: DateTime<Utc>,
    /// Scan completion time
    pub completed_at: DateTime<Utc>,
}

impl<T> ScanReport<T> {
    /// Wall-clock scan duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

// ============================================================================
// Composite Trailing Return
// ============================================================================

/// Momentum lookbacks in trading days, with their weights.
///
/// Longer horizons dominate; weights renormalize over whichever lookbacks
/// the history can support, so a nine-month series is scored on its three
/// shorter horizons instead of being penalized with zeros.
pub const MOMENTUM_LOOKBACKS: [(usize, f64); 4] =
    [(21, 0.10), (63, 0.20), (126, 0.30), (252, 0.40)];

/// Return over the trailing `lookback` bars, if the history reaches back
/// that far.
pub fn trailing_return(closes: &[f64], lookback: usize) -> Option<f64> {
    let n = closes.len();
    if lookback == 0 || n <= lookback {
        return None;
    }
    let past = closes[n - 1 - lookback];
    if past <= 0.0 {
        return None;
    }
    Some(closes[n - 1] / past - 1.0)
}

/// Weighted multi-horizon return. `None` when not even the shortest
/// lookback fits the history.
pub fn composite_return(closes: &[f64]) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for (lookback, weight) in MOMENTUM_LOOKBACKS {
        if let Some(ret) = trailing_return(closes, lookback) {
            weighted += ret * weight;
            weight_sum += weight;
        }
    }
    if weight_sum > 0.0 {
        Some(weighted / weight_sum)
    } else {
        None
    }
}

// ============================================================================
// Volume Z-Score
// ============================================================================

/// Window of prior bars the latest volume is compared against
pub const VOLUME_Z_WINDOW: usize = 20;

/// Z-score of the latest volume against the prior window.
///
/// `None` when the window is too short or has no spread, which downstream
/// scoring treats as "no volume information" rather than zero surprise.
pub fn volume_z_score(volumes: &[f64]) -> Option<f64> {
    let n = volumes.len();
    if n < 3 {
        return None;
    }
    let latest = volumes[n - 1];
    let start = n.saturating_sub(VOLUME_Z_WINDOW + 1);
    let window = &volumes[start..n - 1];
    if window.len() < 2 {
        return None;
    }

    let mean = window.iter().copied().mean();
    let sd = window.iter().copied().std_dev();
    if sd > 0.0 {
        Some((latest - mean) / sd)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trailing_return() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        // 21 bars back from the last close of 129 is 108
        let ret = trailing_return(&closes, 21).unwrap();
        assert!((ret - (129.0 / 108.0 - 1.0)).abs() < 1e-12);

        // History must be strictly longer than the lookback
        assert!(trailing_return(&closes, 29).is_some());
        assert!(trailing_return(&closes, 30).is_none());
        assert!(trailing_return(&closes, 0).is_none());
    }

    #[test]
    fn test_composite_uses_all_horizons_when_available() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 * 1.001f64.powi(i)).collect();
        let composite = composite_return(&closes).unwrap();

        // Constant growth rate: composite must sit between the shortest and
        // longest horizon returns
        let short = trailing_return(&closes, 21).unwrap();
        let long = trailing_return(&closes, 252).unwrap();
        assert!(composite > short);
        assert!(composite < long);
    }

    #[test]
    fn test_composite_renormalizes_for_short_history() {
        // 100 bars: only the 21 and 63 day lookbacks fit
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let composite = composite_return(&closes).unwrap();

        let r21 = trailing_return(&closes, 21).unwrap();
        let r63 = trailing_return(&closes, 63).unwrap();
        let expected = (r21 * 0.10 + r63 * 0.20) / 0.30;
        assert!((composite - expected).abs() < 1e-12);
    }

    #[test]
    fn test_composite_none_below_shortest_lookback() {
        let closes: Vec<f64> = (0..21).map(|i| 100.0 + i as f64).collect();
        assert!(composite_return(&closes).is_none());
    }

    #[test]
    fn test_volume_z_score() {
        // Alternating window, spiked latest volume
        let mut volumes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 900_000.0 } else { 1_100_000.0 })
            .collect();
        volumes.push(2_000_000.0);

        let z = volume_z_score(&volumes).unwrap();
        assert!(z > 3.0);

        // Flat window has no spread to measure against
        let mut flat = vec![1_000_000.0; 20];
        flat.push(5_000_000.0);
        assert!(volume_z_score(&flat).is_none());

        assert!(volume_z_score(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_scan_report_duration() {
        let started = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let report: ScanReport<()> = ScanReport {
            hits: Vec::new(),
            universe: 10,
            skipped: 2,
            started_at: started,
            completed_at: started + chrono::Duration::milliseconds(1500),
        };
        assert!((report.duration_secs() - 1.5).abs() < 1e-9);
    }
}
