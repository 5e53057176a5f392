//! Keyword-polarity sentiment over headlines.
//!
//! Deliberately crude: fixed keyword lists, case-insensitive substring
//! matching, each keyword counted at most once per headline. The integer sum
//! maps to five qualitative bands. No headlines is a distinct "no data"
//! state, not an error and not neutral.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::Headline;

const POSITIVE_KEYWORDS: &[&str] = &[
    "beat",
    "surge",
    "rally",
    "upgrade",
    "strong",
    "growth",
    "profit",
    "record",
    "soar",
    "outperform",
    "buyback",
    "breakthrough",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "miss",
    "plunge",
    "downgrade",
    "weak",
    "lawsuit",
    "recall",
    "layoff",
    "warn",
    "probe",
    "fraud",
    "bankrupt",
    "slump",
];

/// Qualitative read of the headline tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentBand {
    StronglyBullish,
    Bullish,
    Neutral,
    Bearish,
    StronglyBearish,
}

impl SentimentBand {
    /// Map an integer keyword score to its band.
    pub fn from_score(score: i32) -> Self {
        match score {
            3.. => SentimentBand::StronglyBullish,
            1..=2 => SentimentBand::Bullish,
            0 => SentimentBand::Neutral,
            -2..=-1 => SentimentBand::Bearish,
            _ => SentimentBand::StronglyBearish,
        }
    }
}

impl fmt::Display for SentimentBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SentimentBand::StronglyBullish => "strongly bullish",
            SentimentBand::Bullish => "bullish",
            SentimentBand::Neutral => "neutral",
            SentimentBand::Bearish => "bearish",
            SentimentBand::StronglyBearish => "strongly bearish",
        };
        write!(f, "{label}")
    }
}

/// Sentiment result for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    /// Symbol the headlines were fetched for
    pub symbol: String,
    /// Net keyword score, positive minus negative
    pub score: i32,
    /// Headlines examined
    pub headline_count: usize,
    /// Band, or `None` when there were no headlines to read
    pub band: Option<SentimentBand>,
}

/// Score a batch of headlines for a symbol.
pub fn score_headlines(symbol: &str, headlines: &[Headline]) -> SentimentReport {
    let mut score = 0i32;
    for headline in headlines {
        let text = headline.title.to_lowercase();
        for keyword in POSITIVE_KEYWORDS {
            if text.contains(keyword) {
                score += 1;
            }
        }
        for keyword in NEGATIVE_KEYWORDS {
            if text.contains(keyword) {
                score -= 1;
            }
        }
    }

    let band = if headlines.is_empty() {
        None
    } else {
        Some(SentimentBand::from_score(score))
    };

    SentimentReport {
        symbol: symbol.to_string(),
        score,
        headline_count: headlines.len(),
        band,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headlines(titles: &[&str]) -> Vec<Headline> {
        titles.iter().copied().map(Headline::new).collect()
    }

    #[test]
    fn test_no_headlines_is_no_data() {
        let report = score_headlines("AAPL", &[]);
        assert_eq!(report.score, 0);
        assert_eq!(report.headline_count, 0);
        assert!(report.band.is_none());
    }

    #[test]
    fn test_keyword_counted_once_per_headline() {
        let report = score_headlines("AAPL", &headlines(&["Profit, profit and more profit"]));
        assert_eq!(report.score, 1);

        // The same keyword in a second headline counts again
        let report = score_headlines(
            "AAPL",
            &headlines(&["Record profit this quarter", "Profit outlook improves"]),
        );
        assert_eq!(report.score, 3);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let report = score_headlines("TSLA", &headlines(&["Shares SURGE after earnings BEAT"]));
        assert_eq!(report.score, 2);
        assert_eq!(report.band, Some(SentimentBand::Bullish));
    }

    #[test]
    fn test_mixed_tape_cancels_to_neutral() {
        let report = score_headlines(
            "MSFT",
            &headlines(&["Strong quarter for cloud", "Analysts warn on valuation"]),
        );
        assert_eq!(report.score, 0);
        assert_eq!(report.band, Some(SentimentBand::Neutral));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(SentimentBand::from_score(5), SentimentBand::StronglyBullish);
        assert_eq!(SentimentBand::from_score(3), SentimentBand::StronglyBullish);
        assert_eq!(SentimentBand::from_score(2), SentimentBand::Bullish);
        assert_eq!(SentimentBand::from_score(1), SentimentBand::Bullish);
        assert_eq!(SentimentBand::from_score(0), SentimentBand::Neutral);
        assert_eq!(SentimentBand::from_score(-1), SentimentBand::Bearish);
        assert_eq!(SentimentBand::from_score(-2), SentimentBand::Bearish);
        assert_eq!(SentimentBand::from_score(-3), SentimentBand::StronglyBearish);
        assert_eq!(SentimentBand::from_score(-9), SentimentBand::StronglyBearish);
    }

    #[test]
    fn test_bearish_tape() {
        let report = score_headlines(
            "NFLX",
            &headlines(&[
                "Subscriber miss sends shares lower",
                "Downgrade follows weak guidance",
            ]),
        );
        assert_eq!(report.score, -3);
        assert_eq!(report.band, Some(SentimentBand::StronglyBearish));
    }
}
