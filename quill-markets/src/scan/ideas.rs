//! Daily idea buckets.
//!
//! One pass over the watchlist fills four independent buckets: value
//! (dislocation plus a 52-week-low bonus), momentum (liquid names only),
//! quality (fundamental gates) and income (sustainable dividends). A symbol
//! can appear in several buckets at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::{Quote, Series};
use crate::scan::momentum::{score_momentum, MomentumCandidate};
use crate::scan::value::ValueIdea;

/// Minimum year-over-year revenue growth for the quality bucket
pub const QUALITY_MIN_REVENUE_GROWTH: f64 = 0.15;
/// Minimum gross margin for the quality bucket
pub const QUALITY_MIN_GROSS_MARGIN: f64 = 0.40;
/// Minimum return on equity for the quality bucket
pub const QUALITY_MIN_ROE: f64 = 0.15;
/// Maximum debt-to-equity for the quality bucket
pub const QUALITY_MAX_DEBT_TO_EQUITY: f64 = 2.0;
/// Minimum dividend yield for the income bucket
pub const INCOME_MIN_YIELD: f64 = 0.03;
/// Maximum payout ratio the dividend is considered sustainable at
pub const INCOME_MAX_PAYOUT: f64 = 0.8;
/// Bars in the liquidity average
pub const AVG_VOLUME_WINDOW: usize = 20;
/// Minimum average daily volume for the momentum bucket
pub const MOMENTUM_MIN_AVG_VOLUME: f64 = 2_000_000.0;

/// A compounder: growing, high-margin, profitable, lightly levered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIdea {
    /// Symbol/ticker
    pub symbol: String,
    /// Weighted blend of growth, margin and profitability
    pub score: f64,
    /// Year-over-year revenue growth (fraction)
    pub revenue_growth: f64,
    /// Gross margin (fraction)
    pub gross_margin: f64,
    /// Return on equity (fraction)
    pub return_on_equity: f64,
    /// Debt-to-equity ratio
    pub debt_to_equity: f64,
}

/// Score a quote for the quality bucket.
///
/// All four fundamentals must be reported and inside their gates. The score
/// leans on growth first, margin second, profitability third.
pub fn score_quality(quote: &Quote) -> Option<QualityIdea> {
    let revenue_growth = quote.revenue_growth?;
    let gross_margin = quote.gross_margin?;
    let return_on_equity = quote.return_on_equity?;
    let debt_to_equity = quote.debt_to_equity?;

    if revenue_growth < QUALITY_MIN_REVENUE_GROWTH
        || gross_margin < QUALITY_MIN_GROSS_MARGIN
        || return_on_equity < QUALITY_MIN_ROE
        || debt_to_equity > QUALITY_MAX_DEBT_TO_EQUITY
    {
        return None;
    }

    Some(QualityIdea {
        symbol: quote.symbol.clone(),
        score: 0.5 * revenue_growth + 0.3 * gross_margin + 0.2 * return_on_equity,
        revenue_growth,
        gross_margin,
        return_on_equity,
        debt_to_equity,
    })
}

/// A dividend payer with room to keep paying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeIdea {
    /// Symbol/ticker
    pub symbol: String,
    /// Yield blended with payout headroom
    pub score: f64,
    /// Dividend yield (fraction)
    pub dividend_yield: f64,
    /// Dividend payout ratio (fraction)
    pub payout_ratio: f64,
}

/// Score a quote for the income bucket.
///
/// Needs a real yield and a payout ratio that is positive but not stretched.
/// Headroom below `INCOME_MAX_PAYOUT` is rewarded so two equal yields rank
/// by sustainability.
pub fn score_income(quote: &Quote) -> Option<IncomeIdea> {
    let dividend_yield = quote.dividend_yield?;
    let payout_ratio = quote.payout_ratio?;

    if dividend_yield < INCOME_MIN_YIELD {
        return None;
    }
    if payout_ratio <= 0.0 || payout_ratio > INCOME_MAX_PAYOUT {
        return None;
    }

    Some(IncomeIdea {
        symbol: quote.symbol.clone(),
        score: 0.7 * dividend_yield + 0.3 * (INCOME_MAX_PAYOUT - payout_ratio),
        dividend_yield,
        payout_ratio,
    })
}

/// Momentum scoring with a liquidity gate in front.
///
/// The idea bucket only wants names an actual order could get in and out of,
/// so the trailing average volume must clear `MOMENTUM_MIN_AVG_VOLUME` before
/// the regular momentum score runs.
pub fn score_momentum_idea(series: &Series, quote: Option<&Quote>) -> Option<MomentumCandidate> {
    let volumes = series.volumes();
    if volumes.len() < AVG_VOLUME_WINDOW {
        return None;
    }
    let recent = &volumes[volumes.len() - AVG_VOLUME_WINDOW..];
    if recent.iter().copied().mean() < MOMENTUM_MIN_AVG_VOLUME {
        return None;
    }
    score_momentum(series, quote)
}

/// The four ranked buckets from one watchlist pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaSet {
    /// Value bucket, best first
    pub value: Vec<ValueIdea>,
    /// Momentum bucket, best first
    pub momentum: Vec<MomentumCandidate>,
    /// Quality bucket, best first
    pub quality: Vec<QualityIdea>,
    /// Income bucket, best first
    pub income: Vec<IncomeIdea>,
    /// Symbols examined
    pub universe: usize,
    /// Symbols dropped for fetch failures or unusable data
    pub skipped: usize,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// When the pass finished
    pub completed_at: DateTime<Utc>,
}

impl IdeaSet {
    /// Wall-clock duration of the pass in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Total hits across all four buckets.
    pub fn total(&self) -> usize {
        self.value.len() + self.momentum.len() + self.quality.len() + self.income.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
