//! Technical indicator library.
//!
//! Every function returns a vector the same length as its input, aligned
//! index-for-index with the source bars. Leading entries are `None` until the
//! indicator's warm-up window is satisfied; an impossible request (zero
//! period, history shorter than the warm-up) yields an all-`None` vector
//! rather than an error. Downstream code can therefore zip indicator vectors
//! against bars without any offset bookkeeping.

use statrs::statistics::Statistics;

use crate::data::Bar;

/// Default RSI lookback
pub const RSI_PERIOD: usize = 14;
/// Default ATR lookback
pub const ATR_PERIOD: usize = 14;
/// Default ADX lookback
pub const ADX_PERIOD: usize = 14;
/// Fast EMA period for MACD
pub const MACD_FAST: usize = 12;
/// Slow EMA period for MACD
pub const MACD_SLOW: usize = 26;
/// Signal EMA period for MACD
pub const MACD_SIGNAL: usize = 9;
/// Default Bollinger window
pub const BOLLINGER_PERIOD: usize = 20;
/// Default Bollinger band width in standard deviations
pub const BOLLINGER_WIDTH: f64 = 2.0;
/// Medium trend SMA period
pub const SMA_TREND_FAST: usize = 50;
/// Long trend SMA period
pub const SMA_TREND_SLOW: usize = 200;

// ============================================================================
// Moving Averages
// ============================================================================

/// Simple moving average over a trailing window.
///
/// First value lands at index `period - 1`.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let mut window_sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(window_sum / period as f64);
    for i in period..n {
        window_sum += values[i] - values[i - period];
        out[i] = Some(window_sum / period as f64);
    }
    out
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values so early output is not biased toward the first sample.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        prev = values[i] * k + prev * (1.0 - k);
        out[i] = Some(prev);
    }
    out
}

// ============================================================================
// RSI
// ============================================================================

/// Relative strength index with Wilder smoothing.
///
/// Needs `period` price changes, so the first value lands at index `period`.
/// A window with zero average loss reads exactly 100.
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = values[i] - values[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += -delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in (period + 1)..n {
        let delta = values[i] - values[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// ============================================================================
// ATR
// ============================================================================

/// Average true range: true range averaged over a trailing window.
///
/// True range needs a previous close, so the first value lands at index
/// `period` (one later than an SMA of the same period).
pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let true_ranges: Vec<f64> = bars
        .windows(2)
        .map(|w| w[1].true_range(w[0].close))
        .collect();

    // true_ranges[j] belongs to bar j + 1
    for (j, value) in sma(&true_ranges, period).into_iter().enumerate() {
        out[j + 1] = value;
    }
    out
}

// ============================================================================
// ADX
// ============================================================================

/// Average directional index.
///
/// Directional movement and true range are EMA-smoothed, the DI pair is
/// reduced to DX, and DX is EMA-smoothed again. The double smoothing means
/// the first value lands at index `2 * period - 1`; shorter histories yield
/// all `None`.
pub fn adx(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < 2 * period {
        return out;
    }

    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut true_ranges = Vec::with_capacity(n - 1);
    for w in bars.windows(2) {
        let up = w[1].high - w[0].high;
        let down = w[0].low - w[1].low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        true_ranges.push(w[1].true_range(w[0].close));
    }

    let smoothed_pdm = ema(&plus_dm, period);
    let smoothed_mdm = ema(&minus_dm, period);
    let smoothed_tr = ema(&true_ranges, period);

    // DI pair is dense from index period - 1 of the difference arrays
    let mut dx_values = Vec::with_capacity(n - period);
    for j in (period - 1)..(n - 1) {
        let (pdm, mdm, tr) = match (smoothed_pdm[j], smoothed_mdm[j], smoothed_tr[j]) {
            (Some(p), Some(m), Some(t)) => (p, m, t),
            _ => continue,
        };
        let (plus_di, minus_di) = if tr > 0.0 {
            (100.0 * pdm / tr, 100.0 * mdm / tr)
        } else {
            (0.0, 0.0)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        };
        dx_values.push(dx);
    }

    // dx_values[m] belongs to bar m + period
    for (m, value) in ema(&dx_values, period).into_iter().enumerate() {
        out[m + period] = value;
    }
    out
}

// ============================================================================
// MACD
// ============================================================================

/// MACD line, signal line, and histogram, all aligned with the input.
#[derive(Debug, Clone)]
pub struct Macd {
    /// Fast EMA minus slow EMA
    pub line: Vec<Option<f64>>,
    /// EMA of the MACD line
    pub signal: Vec<Option<f64>>,
    /// Line minus signal
    pub histogram: Vec<Option<f64>>,
}

/// Moving average convergence/divergence.
///
/// The signal line is the EMA over the valid portion of the MACD line,
/// left-padded back to full length. When fewer valid line values exist than
/// the signal period requires, the signal (and histogram) stay all-`None`.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
    let n = values.len();
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let mut line = vec![None; n];
    for i in 0..n {
        if let (Some(f), Some(s)) = (fast_ema[i], slow_ema[i]) {
            line[i] = Some(f - s);
        }
    }

    let first_valid = line.iter().position(Option::is_some);
    let mut signal = vec![None; n];
    if let Some(start) = first_valid {
        let line_values: Vec<f64> = line[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
        for (m, value) in ema(&line_values, signal_period).into_iter().enumerate() {
            signal[start + m] = value;
        }
    }

    let mut histogram = vec![None; n];
    for i in 0..n {
        if let (Some(l), Some(s)) = (line[i], signal[i]) {
            histogram[i] = Some(l - s);
        }
    }

    Macd {
        line,
        signal,
        histogram,
    }
}

// ============================================================================
// Bollinger Bands
// ============================================================================

/// Bollinger middle/upper/lower bands, aligned with the input.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    /// SMA of the window
    pub middle: Vec<Option<f64>>,
    /// Middle plus `width` standard deviations
    pub upper: Vec<Option<f64>>,
    /// Middle minus `width` standard deviations
    pub lower: Vec<Option<f64>>,
}

/// Bollinger bands over a rolling window.
///
/// Band width uses the population standard deviation of the window, the
/// convention charting tools use for the 20-bar default.
pub fn bollinger(values: &[f64], period: usize, width: f64) -> BollingerBands {
    let n = values.len();
    let middle = sma(values, period);
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    if period > 0 && n >= period {
        for i in (period - 1)..n {
            let Some(mid) = middle[i] else { continue };
            let window = &values[i + 1 - period..=i];
            let sd = window.iter().copied().population_std_dev();
            upper[i] = Some(mid + width * sd);
            lower[i] = Some(mid - width * sd);
        }
    }

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

// ============================================================================
// Tests
// ============================================================================
