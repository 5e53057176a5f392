//! Engine facade: async orchestration over a market data source.
//!
//! All math lives in the pure modules; this one owns the source handle and
//! the config, wraps every fetch in the configured timeout, fans scans out
//! with bounded concurrency, and isolates per-symbol failures so one bad
//! symbol never aborts a scan. Ranking happens only after every symbol has
//! resolved, with the symbol as tie-break, so output order is independent of
//! fetch completion order.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, warn};

use quill_common::config::MarketsConfig;

use crate::analysis::{self, Analysis};
use crate::backtest::{self, BacktestParams, RsiBacktest};
use crate::data::{BarInterval, ChartRange, MarketDataSource, Quote, Series};
use crate::error::EngineError;
use crate::scan::{
    self, DislocationCandidate, IdeaSet, IncomeIdea, MomentumCandidate, MoonshotCandidate,
    QualityIdea, ScanReport, ValueIdea,
};
use crate::sentiment::{self, SentimentReport};

// ============================================================================
// Ranking
// ============================================================================

/// Sort key shared by every ranked candidate type.
trait Ranked {
    fn rank_score(&self) -> f64;
    fn rank_symbol(&self) -> &str;
}

impl Ranked for MomentumCandidate {
    fn rank_score(&self) -> f64 {
        self.score
    }
    fn rank_symbol(&self) -> &str {
        &self.symbol
    }
}

impl Ranked for DislocationCandidate {
    fn rank_score(&self) -> f64 {
        self.score
    }
    fn rank_symbol(&self) -> &str {
        &self.symbol
    }
}

impl Ranked for MoonshotCandidate {
    // Moonshots rank by the size of the volume spike
    fn rank_score(&self) -> f64 {
        self.volume_ratio
    }
    fn rank_symbol(&self) -> &str {
        &self.symbol
    }
}

impl Ranked for ValueIdea {
    fn rank_score(&self) -> f64 {
        self.score
    }
    fn rank_symbol(&self) -> &str {
        &self.symbol
    }
}

impl Ranked for QualityIdea {
    fn rank_score(&self) -> f64 {
        self.score
    }
    fn rank_symbol(&self) -> &str {
        &self.symbol
    }
}

impl Ranked for IncomeIdea {
    fn rank_score(&self) -> f64 {
        self.score
    }
    fn rank_symbol(&self) -> &str {
        &self.symbol
    }
}

/// Descending by score, symbol ascending on ties, trimmed to `top`.
fn rank_hits<T: Ranked>(mut hits: Vec<T>, top: usize) -> Vec<T> {
    hits.sort_by(|a, b| {
        b.rank_score()
            .partial_cmp(&a.rank_score())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.rank_symbol().cmp(b.rank_symbol()))
    });
    hits.truncate(top);
    hits
}

// ============================================================================
// Engine
// ============================================================================

/// Per-symbol output of the idea pass; a symbol can land in several buckets.
struct IdeaHits {
    value: Option<ValueIdea>,
    momentum: Option<MomentumCandidate>,
    quality: Option<QualityIdea>,
    income: Option<IncomeIdea>,
}

/// The analytics engine.
///
/// Holds the data source behind an [`Arc`] so hosts can share one transport
/// across engines and tasks. Every operation is a fresh computation; the
/// engine keeps no state between calls.
pub struct MarketEngine {
    source: Arc<dyn MarketDataSource>,
    config: MarketsConfig,
}

impl MarketEngine {
    pub fn new(source: Arc<dyn MarketDataSource>, config: MarketsConfig) -> Self {
        Self { source, config }
    }

    /// The configured default scan universe.
    pub fn watchlist(&self) -> &[String] {
        &self.config.watchlist
    }

    // ------------------------------------------------------------------
    // Single-symbol operations
    // ------------------------------------------------------------------

    /// Fetch a quote snapshot for one symbol.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, EngineError> {
        let symbols = vec![symbol.to_string()];
        let mut quotes = self.fetch_batch_quotes(&symbols).await?;
        quotes
            .remove(symbol)
            .flatten()
            .ok_or_else(|| EngineError::DataUnavailable {
                symbol: symbol.to_string(),
            })
    }

    /// Full technical and statistical analysis over a year of daily bars.
    pub async fn analyze(&self, symbol: &str) -> Result<Analysis, EngineError> {
        let series = self.fetch_chart(symbol, ChartRange::OneYear).await?;
        analysis::analyze_series(&series)
    }

    /// Run the RSI threshold backtest over the requested range.
    pub async fn backtest(
        &self,
        symbol: &str,
        range: ChartRange,
        params: &BacktestParams,
    ) -> Result<RsiBacktest, EngineError> {
        let series = self.fetch_chart(symbol, range).await?;
        backtest::run_rsi_backtest(&series, params)
    }

    /// Keyword sentiment over the symbol's current headlines.
    ///
    /// Never fails: a fetch error or timeout degrades to the explicit
    /// no-data report.
    pub async fn sentiment(&self, symbol: &str) -> SentimentReport {
        match timeout(self.config.fetch_timeout(), self.source.headlines(symbol)).await {
            Ok(Ok(headlines)) => sentiment::score_headlines(symbol, &headlines),
            Ok(Err(error)) => {
                warn!(symbol, error = %error, "headline fetch failed, reporting no data");
                sentiment::score_headlines(symbol, &[])
            }
            Err(_) => {
                warn!(
                    symbol,
                    timeout_secs = self.config.fetch_timeout_secs,
                    "headline fetch timed out, reporting no data"
                );
                sentiment::score_headlines(symbol, &[])
            }
        }
    }

    // ------------------------------------------------------------------
    // Scans
    // ------------------------------------------------------------------

    /// Momentum scan over `universe`, or the watchlist when `None`.
    pub async fn scan_momentum(
        &self,
        universe: Option<&[String]>,
    ) -> Result<ScanReport<MomentumCandidate>, EngineError> {
        let symbols = self.resolve_universe(universe);
        let started_at = Utc::now();

        // Quotes only add the 52-week-high bonus, so a failed batch call
        // degrades the scores instead of aborting the scan.
        let quotes = match self.fetch_batch_quotes(&symbols).await {
            Ok(map) => map,
            Err(error) => {
                warn!(error = %error, "batch quote failed, scanning without quote context");
                HashMap::new()
            }
        };
        let quotes = &quotes;

        let (hits, skipped) = self
            .collect_scan(&symbols, move |symbol| async move {
                let quote = quotes.get(&symbol).and_then(Option::as_ref);
                let result = self.evaluate_momentum(&symbol, quote).await;
                (symbol, result)
            })
            .await;

        info!(
            universe = symbols.len(),
            hits = hits.len(),
            skipped,
            "momentum scan complete"
        );
        Ok(ScanReport {
            hits: rank_hits(hits, self.config.scan_top_n),
            universe: symbols.len(),
            skipped,
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Value dislocation scan. Quote-driven; a failed batch call aborts it.
    pub async fn scan_dislocation(
        &self,
        universe: Option<&[String]>,
    ) -> Result<ScanReport<DislocationCandidate>, EngineError> {
        let symbols = self.resolve_universe(universe);
        let started_at = Utc::now();
        let quotes = self.fetch_batch_quotes(&symbols).await?;

        let mut hits = Vec::new();
        let mut skipped = 0usize;
        for symbol in &symbols {
            match quotes.get(symbol).and_then(Option::as_ref) {
                Some(quote) => {
                    if let Some(hit) = scan::score_dislocation(quote) {
                        hits.push(hit);
                    }
                }
                None => {
                    warn!(symbol = %symbol, "no quote, symbol skipped");
                    skipped += 1;
                }
            }
        }

        Ok(ScanReport {
            hits: rank_hits(hits, self.config.scan_top_n),
            universe: symbols.len(),
            skipped,
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Quiet-accumulation scan, ranked by volume spike.
    pub async fn scan_moonshot(
        &self,
        universe: Option<&[String]>,
    ) -> Result<ScanReport<MoonshotCandidate>, EngineError> {
        let symbols = self.resolve_universe(universe);
        let started_at = Utc::now();

        let (hits, skipped) = self
            .collect_scan(&symbols, move |symbol| async move {
                let result = self.evaluate_moonshot(&symbol).await;
                (symbol, result)
            })
            .await;

        Ok(ScanReport {
            hits: rank_hits(hits, self.config.scan_top_n),
            universe: symbols.len(),
            skipped,
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// One pass over the universe filling all four idea buckets.
    pub async fn generate_ideas(
        &self,
        universe: Option<&[String]>,
    ) -> Result<IdeaSet, EngineError> {
        let symbols = self.resolve_universe(universe);
        let started_at = Utc::now();
        let quotes = self.fetch_batch_quotes(&symbols).await?;
        let quotes = &quotes;

        let (contributions, skipped) = self
            .collect_scan(&symbols, move |symbol| async move {
                let quote = quotes.get(&symbol).and_then(Option::as_ref);
                let result = self.evaluate_ideas(&symbol, quote).await;
                (symbol, result)
            })
            .await;

        let mut value = Vec::new();
        let mut momentum = Vec::new();
        let mut quality = Vec::new();
        let mut income = Vec::new();
        for hit in contributions {
            if let Some(idea) = hit.value {
                value.push(idea);
            }
            if let Some(idea) = hit.momentum {
                momentum.push(idea);
            }
            if let Some(idea) = hit.quality {
                quality.push(idea);
            }
            if let Some(idea) = hit.income {
                income.push(idea);
            }
        }

        let top = self.config.idea_bucket_size;
        Ok(IdeaSet {
            value: rank_hits(value, top),
            momentum: rank_hits(momentum, top),
            quality: rank_hits(quality, top),
            income: rank_hits(income, top),
            universe: symbols.len(),
            skipped,
            started_at,
            completed_at: Utc::now(),
        })
    }

    // ------------------------------------------------------------------
    // Per-symbol evaluation
    // ------------------------------------------------------------------

    async fn evaluate_momentum(
        &self,
        symbol: &str,
        quote: Option<&Quote>,
    ) -> Result<Option<MomentumCandidate>, EngineError> {
        let series = self.fetch_chart(symbol, ChartRange::TwoYears).await?;
        match scan::score_momentum(&series, quote) {
            Some(hit) => Ok(Some(hit)),
            // Unscorable means even the shortest lookback had no history
            None => Err(EngineError::InsufficientHistory {
                symbol: symbol.to_string(),
                have: series.len(),
                need: scan::MOMENTUM_LOOKBACKS[0].0 + 1,
            }),
        }
    }

    async fn evaluate_moonshot(
        &self,
        symbol: &str,
    ) -> Result<Option<MoonshotCandidate>, EngineError> {
        let series = self.fetch_chart(symbol, ChartRange::OneMonth).await?;
        if series.len() < scan::TEN_DAY_WINDOW {
            return Err(EngineError::InsufficientHistory {
                symbol: symbol.to_string(),
                have: series.len(),
                need: scan::TEN_DAY_WINDOW,
            });
        }
        Ok(scan::score_moonshot(&series))
    }

    async fn evaluate_ideas(
        &self,
        symbol: &str,
        quote: Option<&Quote>,
    ) -> Result<Option<IdeaHits>, EngineError> {
        let Some(quote) = quote else {
            return Err(EngineError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        };
        let series = self.fetch_chart(symbol, ChartRange::TwoYears).await?;
        Ok(Some(IdeaHits {
            value: scan::score_value_idea(quote),
            momentum: scan::score_momentum_idea(&series, Some(quote)),
            quality: scan::score_quality(quote),
            income: scan::score_income(quote),
        }))
    }

    // ------------------------------------------------------------------
    // Fetch plumbing
    // ------------------------------------------------------------------

    fn resolve_universe(&self, universe: Option<&[String]>) -> Vec<String> {
        match universe {
            Some(symbols) => symbols.to_vec(),
            None => self.config.watchlist.clone(),
        }
    }

    /// Fan `eval` out over the symbols with bounded concurrency, splitting
    /// the outcomes into hits (`Ok(Some)`), silent filter misses (`Ok(None)`)
    /// and skips (`Err`, logged and counted).
    async fn collect_scan<T, F, Fut>(&self, symbols: &[String], eval: F) -> (Vec<T>, usize)
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = (String, Result<Option<T>, EngineError>)>,
    {
        let concurrency = self.config.max_concurrent_fetches.max(1);
        let results: Vec<(String, Result<Option<T>, EngineError>)> =
            stream::iter(symbols.iter().cloned().map(eval))
                .buffer_unordered(concurrency)
                .collect()
                .await;

        let mut hits = Vec::new();
        let mut skipped = 0usize;
        for (symbol, result) in results {
            match result {
                Ok(Some(hit)) => hits.push(hit),
                Ok(None) => {}
                Err(error) => {
                    warn!(symbol = %symbol, error = %error, "symbol skipped");
                    skipped += 1;
                }
            }
        }
        (hits, skipped)
    }

    async fn fetch_chart(&self, symbol: &str, range: ChartRange) -> Result<Series, EngineError> {
        let fetched = timeout(
            self.config.fetch_timeout(),
            self.source.chart(symbol, range, BarInterval::Daily),
        )
        .await
        .map_err(|_| EngineError::FetchTimeout {
            symbol: symbol.to_string(),
            seconds: self.config.fetch_timeout_secs,
        })??;

        fetched.ok_or_else(|| EngineError::DataUnavailable {
            symbol: symbol.to_string(),
        })
    }

    async fn fetch_batch_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Option<Quote>>, EngineError> {
        let quotes = timeout(self.config.fetch_timeout(), self.source.batch_quote(symbols))
            .await
            .map_err(|_| EngineError::FetchTimeout {
                symbol: "batch".to_string(),
                seconds: self.config.fetch_timeout_secs,
            })??;
        Ok(quotes)
    }
}

// ============================================================================
// Tests
// ============================================================================
