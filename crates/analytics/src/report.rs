use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A metric outcome that may be undefined or unbounded.
///
/// Ratios with a degenerate denominator (zero variance, no losing trades)
/// must stay representable without leaking floating-point `NaN`/`inf` into
/// formatted output, so the sentinel is an explicit tag rather than a raw
/// `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Value(f64),
    NotAvailable,
    Infinite,
}

impl MetricValue {
    /// Formats the inner value as a percentage with the given precision.
    /// `NotAvailable` renders as "N/A" and `Infinite` as "∞".
    pub fn to_percent_string(&self, decimals: usize) -> String {
        match self {
            MetricValue::Value(v) => format!("{:.*}%", decimals, v * 100.0),
            MetricValue::NotAvailable => "N/A".to_string(),
            MetricValue::Infinite => "∞".to_string(),
        }
    }

    /// Formats the inner value as a plain ratio with the given precision.
    pub fn to_ratio_string(&self, decimals: usize) -> String {
        match self {
            MetricValue::Value(v) => format!("{:.*}", decimals, v),
            MetricValue::NotAvailable => "N/A".to_string(),
            MetricValue::Infinite => "∞".to_string(),
        }
    }

    /// Applies `f` to the inner value, propagating the sentinels unchanged.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            MetricValue::Value(v) => MetricValue::Value(f(v)),
            other => other,
        }
    }
}

/// One display row of the published metrics table. The `value` is a
/// pre-formatted human-readable string; `note` annotates the convention
/// (annualized vs. raw, sampling basis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub label: String,
    pub value: String,
    pub note: String,
}

/// Aggregated return for one calendar month present in the input, in
/// chronological order. Months with no observations have no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    /// Month label formatted as "%b %Y", e.g. "Mar 2025".
    pub month: String,
    /// Aggregated fractional return for the month (summed or compounded,
    /// per the configured mode).
    pub value: f64,
}

/// One point of the cumulative-return series, aligned one-to-one with the
/// input observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// 1-based position in the input sequence.
    pub sequence: usize,
    pub timestamp: DateTime<Utc>,
    pub label: Option<String>,
    /// Fractional return of this observation.
    pub value: f64,
    pub value_pct: f64,
    /// Cumulative return up to and including this observation (running sum,
    /// or running product net of the initial unit).
    pub cumulative: f64,
    pub cumulative_pct: f64,
}

/// The unformatted numbers behind the metrics table, kept alongside it so
/// downstream consumers are not forced to parse display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub observation_count: usize,
    pub winning_count: usize,
    pub losing_count: usize,
    /// Elapsed wall time between first and last observation, floored at one
    /// minute.
    pub total_hours: f64,
    /// `total_hours` in years, floored at one hour-equivalent of a year.
    pub total_years: f64,
    /// Empirical observation frequency; the single annualization factor.
    pub observations_per_year: f64,
    pub mean: f64,
    /// Population standard deviation (denominator N); 0.0 below 2 samples.
    pub std_dev: f64,
    pub total_return: f64,
    pub annualized_return: MetricValue,
    pub monthly_return: MetricValue,
    pub annualized_volatility: f64,
    pub sharpe: MetricValue,
    pub sortino: MetricValue,
    pub profit_factor: MetricValue,
    pub win_rate: f64,
    /// Deepest decline from a running peak; always <= 0.
    pub max_drawdown: f64,
}

/// Small run summary persisted next to the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub observation_count: usize,
    pub duration_days: f64,
    /// Date of the last observation, formatted "%Y-%m-%d".
    pub last_updated: String,
}

/// The complete output of one engine run: everything the renderer needs and
/// nothing it has to compute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub metrics: RawMetrics,
    /// Ordered display rows; order is significant.
    pub table: Vec<MetricRow>,
    pub monthly: Vec<MonthlyReturn>,
    pub series: Vec<CumulativePoint>,
    pub overview: Overview,
}

/// Formats a count with thousands separators ("12,345").
pub(crate) fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
