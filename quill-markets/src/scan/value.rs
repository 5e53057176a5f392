//! Value dislocation scoring.
//!
//! The dislocation scan hunts for cheap earnings among mid-size names:
//! sanity-banded P/E, a market-cap ceiling to skip the megacaps everyone
//! already owns, and `1/PE` as the score so cheaper ranks higher.

use serde::{Deserialize, Serialize};

use crate::data::Quote;

/// P/E below this is treated as a data artifact, not value
pub const PE_FLOOR: f64 = 2.0;
/// P/E above this is growth pricing, not value
pub const PE_CEILING: f64 = 80.0;
/// Market-cap ceiling in dollars
pub const MAX_MARKET_CAP: f64 = 500e9;
/// Discount band above the 52-week low that still earns a bonus
pub const LOW_DISCOUNT_WINDOW: f64 = 0.25;
/// Weight of the 52-week-low discount bonus
pub const LOW_DISCOUNT_WEIGHT: f64 = 0.2;

/// A symbol ranked by earnings-yield dislocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DislocationCandidate {
    /// Symbol/ticker
    pub symbol: String,
    /// Earnings yield (1 / P/E)
    pub score: f64,
    /// Trailing P/E ratio
    pub pe_ratio: f64,
    /// Market capitalization in dollars
    pub market_cap: f64,
}

/// Score a quote for the dislocation scan.
///
/// Requires a P/E inside `[PE_FLOOR, PE_CEILING]` and a known market cap
/// below the ceiling. An unknown cap cannot prove the filter, so it fails it.
pub fn score_dislocation(quote: &Quote) -> Option<DislocationCandidate> {
    let pe = quote.pe_ratio?;
    if !(PE_FLOOR..=PE_CEILING).contains(&pe) {
        return None;
    }
    let market_cap = quote.market_cap?;
    if market_cap >= MAX_MARKET_CAP {
        return None;
    }

    Some(DislocationCandidate {
        symbol: quote.symbol.clone(),
        score: 1.0 / pe,
        pe_ratio: pe,
        market_cap,
    })
}

/// A value idea: dislocation score plus a 52-week-low discount bonus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueIdea {
    /// Symbol/ticker
    pub symbol: String,
    /// Earnings yield plus the low-discount bonus
    pub score: f64,
    /// Trailing P/E ratio
    pub pe_ratio: f64,
    /// Distance above the 52-week low as a fraction, when known
    pub low_discount: Option<f64>,
}

/// Score a quote for the value idea bucket.
///
/// Builds on [`score_dislocation`]; trading near the 52-week low adds up to
/// `LOW_DISCOUNT_WINDOW * LOW_DISCOUNT_WEIGHT` so beaten-down names edge out
/// equally cheap ones still near their highs.
pub fn score_value_idea(quote: &Quote) -> Option<ValueIdea> {
    let base = score_dislocation(quote)?;
    let low_discount = quote.low_discount();

    let mut score = base.score;
    if let Some(discount) = low_discount {
        score += (LOW_DISCOUNT_WINDOW - discount).max(0.0) * LOW_DISCOUNT_WEIGHT;
    }

    Some(ValueIdea {
        symbol: base.symbol,
        score,
        pe_ratio: base.pe_ratio,
        low_discount,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MarketState;

    fn value_quote(pe: Option<f64>, market_cap: Option<f64>) -> Quote {
        Quote {
            symbol: "VAL".to_string(),
            price: 40.0,
            change_pct: 0.0,
            prev_close: 40.0,
            volume: 1_000_000.0,
            market_cap,
            pe_ratio: pe,
            fifty_two_week_high: Some(60.0),
            fifty_two_week_low: Some(38.0),
            state: MarketState::Regular,
            revenue_growth: None,
            gross_margin: None,
            return_on_equity: None,
            debt_to_equity: None,
            dividend_yield: None,
            payout_ratio: None,
        }
    }

    #[test]
    fn test_pe_band_is_enforced() {
        // Artifact-cheap and growth-priced names never pass
        assert!(score_dislocation(&value_quote(Some(1.5), Some(10e9))).is_none());
        assert!(score_dislocation(&value_quote(Some(90.0), Some(10e9))).is_none());
        // Band edges are inclusive
        assert!(score_dislocation(&value_quote(Some(2.0), Some(10e9))).is_some());
        assert!(score_dislocation(&value_quote(Some(80.0), Some(10e9))).is_some());
        assert!(score_dislocation(&value_quote(None, Some(10e9))).is_none());
    }

    #[test]
    fn test_market_cap_ceiling() {
        assert!(score_dislocation(&value_quote(Some(10.0), Some(600e9))).is_none());
        assert!(score_dislocation(&value_quote(Some(10.0), None)).is_none());

        let hit = score_dislocation(&value_quote(Some(10.0), Some(100e9))).unwrap();
        assert!((hit.score - 0.1).abs() < 1e-12);
        assert!((hit.pe_ratio - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_cheaper_scores_higher() {
        let cheap = score_dislocation(&value_quote(Some(5.0), Some(10e9))).unwrap();
        let rich = score_dislocation(&value_quote(Some(40.0), Some(10e9))).unwrap();
        assert!(cheap.score > rich.score);
    }

    #[test]
    fn test_value_idea_low_discount_bonus() {
        // Price 40 over a 38 low: discount ~5.26%, inside the bonus band
        let idea = score_value_idea(&value_quote(Some(10.0), Some(10e9))).unwrap();
        let discount = idea.low_discount.unwrap();
        assert!((discount - (40.0 / 38.0 - 1.0)).abs() < 1e-12);

        let expected = 0.1 + (LOW_DISCOUNT_WINDOW - discount) * LOW_DISCOUNT_WEIGHT;
        assert!((idea.score - expected).abs() < 1e-12);

        // Far above the low: bonus clamps to zero
        let mut extended = value_quote(Some(10.0), Some(10e9));
        extended.price = 55.0;
        let idea = score_value_idea(&extended).unwrap();
        assert!((idea.score - 0.1).abs() < 1e-12);
    }
}
