//! Text renderers for engine results.
//!
//! Presentation only. Each renderer prints every computed field of its result
//! in struct order so downstream consumers can rely on nothing being dropped.
//! Correctness lives in the result types, not here.

use crate::analysis::Analysis;
use crate::backtest::RsiBacktest;
use crate::data::Quote;
use crate::scan::{
    DislocationCandidate, IdeaSet, MomentumCandidate, MoonshotCandidate, ScanReport,
};
use crate::sentiment::SentimentReport;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const DIVIDER: &str = "───────────────────────────────────────────────────────────────";

fn opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "n/a".to_string(),
    }
}

/// Fraction as a percentage, `n/a` when missing.
fn opt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

/// Dollar size with a T/B/M suffix.
fn cap(value: f64) -> String {
    if value >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{value:.0}")
    }
}

fn header(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("  {title}\n"));
    out.push_str(RULE);
    out.push_str("\n\n");
}

fn line(out: &mut String, label: &str, value: impl AsRef<str>) {
    out.push_str(&format!("  {:<16}{}\n", label, value.as_ref()));
}

// ============================================================================
// Quote
// ============================================================================

pub fn render_quote(quote: &Quote) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} quote", quote.symbol));

    line(&mut out, "price", format!("{:.2}", quote.price));
    line(
        &mut out,
        "change",
        format!("{:+.2} ({:+.2}%)", quote.change(), quote.change_pct),
    );
    line(&mut out, "prev close", format!("{:.2}", quote.prev_close));
    line(&mut out, "volume", format!("{:.0}", quote.volume));
    line(
        &mut out,
        "market cap",
        quote.market_cap.map_or("n/a".to_string(), cap),
    );
    line(&mut out, "p/e", opt(quote.pe_ratio, 2));
    line(&mut out, "52w high", opt(quote.fifty_two_week_high, 2));
    line(&mut out, "52w low", opt(quote.fifty_two_week_low, 2));
    line(&mut out, "session", quote.state.to_string());
    line(&mut out, "revenue growth", opt_pct(quote.revenue_growth));
    line(&mut out, "gross margin", opt_pct(quote.gross_margin));
    line(&mut out, "roe", opt_pct(quote.return_on_equity));
    line(&mut out, "debt/equity", opt(quote.debt_to_equity, 2));
    line(&mut out, "dividend yield", opt_pct(quote.dividend_yield));
    line(&mut out, "payout ratio", opt_pct(quote.payout_ratio));

    out
}

// ============================================================================
// Analysis
// ============================================================================

pub fn render_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    header(
        &mut out,
        &format!(
            "{} analysis — {}",
            analysis.symbol,
            analysis.as_of.format("%Y-%m-%d %H:%M:%S")
        ),
    );

    line(&mut out, "last close", format!("{:.2}", analysis.last_close));
    line(&mut out, "bars", analysis.bar_count.to_string());
    out.push('\n');

    out.push_str("  statistics\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    line(&mut out, "total return", opt_pct(analysis.stats.total_return));
    line(&mut out, "annual return", opt_pct(analysis.stats.annual_return));
    line(&mut out, "annual vol", opt_pct(analysis.stats.annual_volatility));
    line(&mut out, "sharpe", opt(analysis.stats.sharpe, 2));
    line(&mut out, "max drawdown", opt_pct(analysis.stats.max_drawdown));
    out.push('\n');

    out.push_str("  technicals\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    line(&mut out, "sma 50", opt(analysis.technicals.sma50, 2));
    line(&mut out, "sma 200", opt(analysis.technicals.sma200, 2));
    line(&mut out, "rsi 14", opt(analysis.technicals.rsi14, 1));
    line(&mut out, "macd", opt(analysis.technicals.macd, 3));
    line(&mut out, "macd signal", opt(analysis.technicals.macd_signal, 3));
    line(&mut out, "macd hist", opt(analysis.technicals.macd_histogram, 3));
    line(&mut out, "atr 14", opt(analysis.technicals.atr14, 2));
    line(&mut out, "adx 14", opt(analysis.technicals.adx14, 1));
    line(&mut out, "boll upper", opt(analysis.technicals.bollinger_upper, 2));
    line(&mut out, "boll middle", opt(analysis.technicals.bollinger_middle, 2));
    line(&mut out, "boll lower", opt(analysis.technicals.bollinger_lower, 2));
    out.push('\n');

    out.push_str("  signals\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    if analysis.signals.is_empty() {
        out.push_str("  (none)\n");
    } else {
        for signal in &analysis.signals {
            out.push_str(&format!("  • {signal}\n"));
        }
    }
    out.push('\n');

    line(&mut out, "verdict", analysis.verdict.to_string());
    out
}

// ============================================================================
// Backtest
// ============================================================================

pub fn render_backtest(result: &RsiBacktest) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} RSI backtest", result.symbol));

    line(
        &mut out,
        "rule",
        format!(
            "RSI({}) buy < {:.0}, sell > {:.0}",
            result.params.rsi_period, result.params.buy_below, result.params.sell_above
        ),
    );
    line(
        &mut out,
        "capital",
        format!("{:.2}", result.params.initial_capital),
    );
    line(
        &mut out,
        "window",
        format!(
            "{} → {} ({} bars)",
            result.first_bar.format("%Y-%m-%d"),
            result.last_bar.format("%Y-%m-%d"),
            result.bars
        ),
    );
    line(
        &mut out,
        "strategy",
        format!("{:+.2}%", result.strategy_return * 100.0),
    );
    line(
        &mut out,
        "buy & hold",
        format!("{:+.2}%", result.buy_hold_return * 100.0),
    );
    line(&mut out, "final equity", format!("{:.2}", result.final_equity));
    line(&mut out, "trades", result.total_trades.to_string());
    line(
        &mut out,
        "open at end",
        if result.open_at_end { "yes" } else { "no" },
    );

    if !result.recent_trades.is_empty() {
        out.push('\n');
        out.push_str("  recent trades\n");
        out.push_str(&format!("  {DIVIDER}\n"));
        for trade in &result.recent_trades {
            out.push_str(&format!(
                "  {} {:<4} @ {:>10.2}  rsi {:>5.1}\n",
                trade.date.format("%Y-%m-%d"),
                trade.side.to_string(),
                trade.price,
                trade.rsi
            ));
        }
    }

    out
}

// ============================================================================
// Scans
// ============================================================================

fn scan_footer<T>(out: &mut String, report: &ScanReport<T>) {
    out.push('\n');
    out.push_str(&format!(
        "  {} of {} symbols ranked, {} skipped, {:.1}s\n",
        report.hits.len(),
        report.universe,
        report.skipped,
        report.duration_secs()
    ));
}

pub fn render_momentum(report: &ScanReport<MomentumCandidate>) -> String {
    let mut out = String::new();
    header(&mut out, "momentum scan");

    if report.hits.is_empty() {
        out.push_str("  (no candidates)\n");
    }
    for (i, hit) in report.hits.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<6} score {:>7.3}  composite {:>7.2}%  vol z {:>5}  52w {:>5}  rsi {:>5}  adx {:>5}\n",
            i + 1,
            hit.symbol,
            hit.score,
            hit.composite_return * 100.0,
            opt(hit.volume_z, 2),
            opt(hit.high_proximity, 2),
            opt(hit.rsi14, 1),
            opt(hit.adx14, 1),
        ));
    }

    scan_footer(&mut out, report);
    out
}

pub fn render_dislocation(report: &ScanReport<DislocationCandidate>) -> String {
    let mut out = String::new();
    header(&mut out, "value dislocation scan");

    if report.hits.is_empty() {
        out.push_str("  (no candidates)\n");
    }
    for (i, hit) in report.hits.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<6} score {:>6.3}  p/e {:>6.1}  cap {:>8}\n",
            i + 1,
            hit.symbol,
            hit.score,
            hit.pe_ratio,
            cap(hit.market_cap),
        ));
    }

    scan_footer(&mut out, report);
    out
}

pub fn render_moonshot(report: &ScanReport<MoonshotCandidate>) -> String {
    let mut out = String::new();
    header(&mut out, "moonshot scan");

    if report.hits.is_empty() {
        out.push_str("  (no candidates)\n");
    }
    for (i, hit) in report.hits.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<6} price {:>8.2}  day {:>6.2}%  vol {:>5.1}x  10d high {:>8.2}\n",
            i + 1,
            hit.symbol,
            hit.price,
            hit.day_change_pct,
            hit.volume_ratio,
            hit.ten_day_high,
        ));
    }

    scan_footer(&mut out, report);
    out
}

// ============================================================================
// Ideas
// ============================================================================

pub fn render_ideas(set: &IdeaSet) -> String {
    let mut out = String::new();
    header(&mut out, "idea buckets");

    out.push_str("  value\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    if set.value.is_empty() {
        out.push_str("  (none)\n");
    }
    for idea in &set.value {
        out.push_str(&format!(
            "  {:<6} score {:>6.3}  p/e {:>6.1}  above low {:>6}\n",
            idea.symbol,
            idea.score,
            idea.pe_ratio,
            opt_pct(idea.low_discount),
        ));
    }
    out.push('\n');

    out.push_str("  momentum\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    if set.momentum.is_empty() {
        out.push_str("  (none)\n");
    }
    for idea in &set.momentum {
        out.push_str(&format!(
            "  {:<6} score {:>7.3}  composite {:>7.2}%\n",
            idea.symbol,
            idea.score,
            idea.composite_return * 100.0,
        ));
    }
    out.push('\n');

    out.push_str("  quality\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    if set.quality.is_empty() {
        out.push_str("  (none)\n");
    }
    for idea in &set.quality {
        out.push_str(&format!(
            "  {:<6} score {:>6.3}  growth {:>6.1}%  margin {:>5.1}%  roe {:>5.1}%  d/e {:>4.2}\n",
            idea.symbol,
            idea.score,
            idea.revenue_growth * 100.0,
            idea.gross_margin * 100.0,
            idea.return_on_equity * 100.0,
            idea.debt_to_equity,
        ));
    }
    out.push('\n');

    out.push_str("  income\n");
    out.push_str(&format!("  {DIVIDER}\n"));
    if set.income.is_empty() {
        out.push_str("  (none)\n");
    }
    for idea in &set.income {
        out.push_str(&format!(
            "  {:<6} score {:>6.3}  yield {:>5.2}%  payout {:>5.1}%\n",
            idea.symbol,
            idea.score,
            idea.dividend_yield * 100.0,
            idea.payout_ratio * 100.0,
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "  {} ideas over {} symbols, {} skipped, {:.1}s\n",
        set.total(),
        set.universe,
        set.skipped,
        set.duration_secs()
    ));
    out
}

// ============================================================================
// Sentiment
// ============================================================================

pub fn render_sentiment(report: &SentimentReport) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} headline sentiment", report.symbol));

    line(&mut out, "score", report.score.to_string());
    line(&mut out, "headlines", report.headline_count.to_string());
    line(
        &mut out,
        "read",
        report
            .band
            .map_or("no data".to_string(), |band| band.to_string()),
    );

    out
}

// ============================================================================
// Tests
// ============================================================================
