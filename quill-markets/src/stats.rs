//! Summary return and risk statistics.
//!
//! Every field of [`SummaryStats`] is optional: a short or degenerate history
//! nulls the fields it cannot support instead of failing the whole
//! computation. A flat series, for example, has zero volatility and therefore
//! no defined Sharpe ratio, which is reported as `None` rather than an error.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::Series;

/// Trading days per year used for annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum bars needed before any statistic is computed
pub const MIN_STATS_BARS: usize = 2;

/// Summary statistics over a price series.
///
/// Returns are fractions (0.25 = +25%); `max_drawdown` is zero or negative.
/// The Sharpe ratio treats the risk-free rate as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Total return from first to last close
    pub total_return: Option<f64>,
    /// Geometric annualized return
    pub annual_return: Option<f64>,
    /// Annualized volatility of daily returns
    pub annual_volatility: Option<f64>,
    /// Annual return over annual volatility
    pub sharpe: Option<f64>,
    /// Deepest peak-to-trough decline, as a non-positive fraction
    pub max_drawdown: Option<f64>,
}

/// Compute summary statistics for a series.
///
/// Fewer than [`MIN_STATS_BARS`] bars yields the all-`None` struct.
pub fn quant_stats(series: &Series) -> SummaryStats {
    if series.len() < MIN_STATS_BARS {
        return SummaryStats::default();
    }

    let closes = series.closes();
    let first = closes[0];
    let last = closes[closes.len() - 1];

    let total_return = if first > 0.0 {
        Some(last / first - 1.0)
    } else {
        None
    };

    let annual_return = match (total_return, series.elapsed_years()) {
        (Some(total), Some(years)) if years > 0.0 => {
            let growth = 1.0 + total;
            if growth > 0.0 {
                Some(growth.powf(1.0 / years) - 1.0)
            } else {
                None
            }
        }
        _ => None,
    };

    let returns = series.daily_returns();
    // Sample standard deviation needs at least two observations
    let annual_volatility = if returns.len() >= 2 {
        Some(returns.iter().copied().std_dev() * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        None
    };

    let sharpe = match (annual_return, annual_volatility) {
        (Some(ret), Some(vol)) if vol > 0.0 => Some(ret / vol),
        _ => None,
    };

    SummaryStats {
        total_return,
        annual_return,
        annual_volatility,
        sharpe,
        max_drawdown: max_drawdown(&closes),
    }
}

/// Deepest decline from a running peak, as a non-positive fraction.
///
/// A series that never dips below its peak reads `Some(0.0)`.
pub fn max_drawdown(closes: &[f64]) -> Option<f64> {
    if closes.len() < MIN_STATS_BARS {
        return None;
    }

    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &close in closes {
        if close > peak {
            peak = close;
        }
        if peak > 0.0 {
            let dd = (close - peak) / peak;
            if dd < worst {
                worst = dd;
            }
        }
    }
    Some(worst)
}

// ============================================================================
// Tests
// ============================================================================
