//! Quill Markets — analytics engine for US equities.
//!
//! Computes technical indicators, summary statistics, qualitative signals,
//! ranked symbol scans, an RSI threshold backtest and headline sentiment over
//! data supplied by a host-implemented [`MarketDataSource`]. The engine owns
//! no transport: hosts plug in an HTTP client, a cache, or recorded fixtures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        quill-markets                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌───────────┐  ┌──────────┐  ┌──────────┐  │
//! │  │ indicators │  │   stats   │  │ patterns │  │ analysis │  │
//! │  └────────────┘  └───────────┘  └──────────┘  └──────────┘  │
//! │  ┌────────────┐  ┌───────────┐  ┌──────────┐  ┌──────────┐  │
//! │  │    scan    │  │ backtest  │  │sentiment │  │  format  │  │
//! │  └────────────┘  └───────────┘  └──────────┘  └──────────┘  │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │     engine — timeouts, bounded fan-out, ranking         ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//!                  │ MarketDataSource (async trait)
//!                  ▼
//!          host transport (HTTP client, cache, fixtures)
//! ```
//!
//! The pure modules take arrays in and hand results out; only `engine` is
//! async. Warm-up entries in indicator vectors are `None`, never sentinel
//! zeros, and all per-symbol scan failures are isolated and counted.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod backtest;
pub mod data;
pub mod engine;
pub mod error;
pub mod format;
pub mod indicators;
pub mod patterns;
pub mod scan;
pub mod sentiment;
pub mod stats;

pub use analysis::{analyze_series, Analysis, TechnicalSnapshot};
pub use backtest::{run_rsi_backtest, BacktestParams, BacktestTrade, RsiBacktest, TradeSide};
pub use data::{
    Bar, BarInterval, ChartRange, Headline, MarketDataSource, MarketState, Quote, Series,
    SourceError, StaticSource,
};
pub use engine::MarketEngine;
pub use error::EngineError;
pub use patterns::{classify_verdict, detect_signals, Signal, Verdict};
pub use scan::{IdeaSet, ScanReport};
pub use sentiment::{score_headlines, SentimentBand, SentimentReport};
pub use stats::{max_drawdown, quant_stats, SummaryStats};
