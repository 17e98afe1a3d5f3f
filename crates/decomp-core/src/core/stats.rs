//! Streaming mean / sample standard deviation over accumulated solver lines.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// 1-indexed whitespace-delimited field that carries the energy value.
pub const VALUE_FIELD: usize = 5;

static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?[0-9]*\.?[0-9]+([eE][+-]?[0-9]+)?$").expect("Invalid numeric token pattern")
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStat {
    pub mean: f64,
    pub sd: f64,
    pub count: usize,
}

impl SummaryStat {
    pub const UNDEFINED: SummaryStat = SummaryStat {
        mean: f64::NAN,
        sd: f64::NAN,
        count: 0,
    };
}

impl fmt::Display for SummaryStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ± {}",
            format_scientific(self.mean),
            format_scientific(self.sd)
        )
    }
}

/// Running count, sum and sum of squares.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Folds the value field of `line` in; returns `false` when the line has
    /// no valid numeric value there.
    pub fn push_line(&mut self, line: &str) -> bool {
        match parse_value_field(line) {
            Some(value) => {
                self.push(value);
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(&self) -> SummaryStat {
        match self.count {
            0 => SummaryStat::UNDEFINED,
            1 => SummaryStat {
                mean: self.sum,
                sd: 0.0,
                count: 1,
            },
            n => {
                let n_f = n as f64;
                let mean = self.sum / n_f;
                let variance = (self.sum_sq - n_f * mean * mean) / (n_f - 1.0);
                SummaryStat {
                    mean,
                    sd: variance.max(0.0).sqrt(),
                    count: n,
                }
            }
        }
    }
}

pub fn is_numeric_token(token: &str) -> bool {
    NUMERIC_TOKEN.is_match(token)
}

/// Extracts and validates the value field of a solver line.
pub fn parse_value_field(line: &str) -> Option<f64> {
    let token = line.split_whitespace().nth(VALUE_FIELD - 1)?;
    if !is_numeric_token(token) {
        return None;
    }
    token.parse().ok()
}

/// Mean and sample standard deviation over the value field of every line.
///
/// Lines whose value field is missing or not numeric are skipped. No valid
/// value at all yields NaN for both outputs.
pub fn compute_stats<I>(lines: I) -> SummaryStat
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut running = RunningStats::new();
    for line in lines {
        running.push_line(line.as_ref());
    }
    running.finish()
}

/// `ΔE = E(complex) − E(isolated) − E(neutralized)`; NaN in, NaN out.
pub fn delta_e(complex: f64, isolated: f64, neutralized: f64) -> f64 {
    if complex.is_nan() || isolated.is_nan() || neutralized.is_nan() {
        return f64::NAN;
    }
    complex - isolated - neutralized
}

/// Scientific notation with ten fractional digits and a signed, two-digit
/// exponent (`-1.2000000000e+02`).
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{:.10e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}
