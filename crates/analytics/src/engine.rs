use crate::error::AnalyticsError;
use crate::report::{
    CumulativePoint, MetricRow, MetricValue, MonthlyReturn, Overview, RawMetrics, ReportBundle,
    group_thousands,
};
use core_types::{CompoundingMode, ReturnObservation};
use tracing::debug;

const HOURS_PER_YEAR: f64 = 24.0 * 365.0;
/// Floor for the elapsed span, so a same-timestamp dataset still yields a
/// finite annualization factor.
const MIN_SPAN_SECONDS: f64 = 60.0;

/// A stateless calculator for deriving performance metrics from a return
/// series.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

/// Annualization basis derived from the input's actual time range.
struct TimeSpan {
    total_hours: f64,
    total_years: f64,
    observations_per_year: f64,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `observations` - The chronologically sorted return series.
    /// * `mode` - The compounding convention for the cumulative curve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the full `ReportBundle` or an `AnalyticsError`.
    /// An empty series is the only error; numerical degeneracy (zero
    /// variance, no losing trades, near-zero span) degrades the affected
    /// metric to a sentinel instead.
    pub fn calculate(
        &self,
        observations: &[ReturnObservation],
        mode: CompoundingMode,
    ) -> Result<ReportBundle, AnalyticsError> {
        if observations.is_empty() {
            return Err(AnalyticsError::EmptySeries);
        }

        let span = self.normalize_time_span(observations);
        debug!(
            count = observations.len(),
            total_hours = span.total_hours,
            observations_per_year = span.observations_per_year,
            "annualization basis"
        );

        let (series, max_drawdown) = self.build_cumulative_series(observations, mode);
        let metrics = self.calculate_scalar_metrics(observations, &series, &span, max_drawdown, mode);
        let monthly = self.aggregate_monthly(observations, mode);
        let table = self.build_table(&metrics, mode);
        let overview = Overview {
            observation_count: metrics.observation_count,
            duration_days: (span.total_hours / 24.0 * 10.0).round() / 10.0,
            last_updated: observations[observations.len() - 1]
                .timestamp
                .format("%Y-%m-%d")
                .to_string(),
        };

        Ok(ReportBundle {
            metrics,
            table,
            monthly,
            series,
            overview,
        })
    }

    /// Computes the annualization basis from the true elapsed time between
    /// the first and last observation.
    ///
    /// Using the empirical frequency makes the same formulas correct whether
    /// observations are per-trade (irregular, possibly dozens per day) or
    /// per-month (fixed spacing). The span is floored at one minute and the
    /// year count at one hour-equivalent, so a single-day dataset yields a
    /// very large but bounded frequency rather than infinity.
    fn normalize_time_span(&self, observations: &[ReturnObservation]) -> TimeSpan {
        let start = observations[0].timestamp;
        let end = observations[observations.len() - 1].timestamp;
        let total_seconds = ((end - start).num_seconds() as f64).max(MIN_SPAN_SECONDS);
        let total_hours = total_seconds / 3600.0;
        let total_years = (total_hours / HOURS_PER_YEAR).max(1.0 / HOURS_PER_YEAR);

        TimeSpan {
            total_hours,
            total_years,
            observations_per_year: observations.len() as f64 / total_years,
        }
    }

    /// Builds the per-observation cumulative series and the deepest drawdown
    /// in a single causal left-to-right pass.
    ///
    /// Additive mode: prefix sums, drawdown is `cumulative - running_peak`.
    /// Multiplicative mode: prefix products of `(1 + r)` reported net of the
    /// initial unit, drawdown is `level / running_peak - 1` since growth
    /// compounds.
    fn build_cumulative_series(
        &self,
        observations: &[ReturnObservation],
        mode: CompoundingMode,
    ) -> (Vec<CumulativePoint>, f64) {
        let mut series = Vec::with_capacity(observations.len());
        let mut max_drawdown = 0.0_f64;

        match mode {
            CompoundingMode::Additive => {
                let mut cumulative = 0.0_f64;
                let mut peak = f64::NEG_INFINITY;
                for (i, obs) in observations.iter().enumerate() {
                    cumulative += obs.value;
                    peak = peak.max(cumulative);
                    max_drawdown = max_drawdown.min(cumulative - peak);
                    series.push(point(i, obs, cumulative));
                }
            }
            CompoundingMode::Multiplicative => {
                let mut level = 1.0_f64;
                let mut peak = f64::NEG_INFINITY;
                for (i, obs) in observations.iter().enumerate() {
                    level *= 1.0 + obs.value;
                    peak = peak.max(level);
                    // A non-positive peak means the series lost all capital;
                    // relative drawdown is meaningless from there.
                    if peak > 0.0 {
                        max_drawdown = max_drawdown.min(level / peak - 1.0);
                    }
                    series.push(point(i, obs, level - 1.0));
                }
            }
        }

        (series, max_drawdown)
    }

    /// Computes the fixed set of scalar performance/risk numbers.
    fn calculate_scalar_metrics(
        &self,
        observations: &[ReturnObservation],
        series: &[CumulativePoint],
        span: &TimeSpan,
        max_drawdown: f64,
        mode: CompoundingMode,
    ) -> RawMetrics {
        let count = observations.len();
        let n = count as f64;

        let mean = observations.iter().map(|o| o.value).sum::<f64>() / n;
        let std_dev = if count > 1 {
            let variance = observations
                .iter()
                .map(|o| (o.value - mean).powi(2))
                .sum::<f64>()
                / n;
            variance.sqrt()
        } else {
            0.0
        };

        let total_return = series[series.len() - 1].cumulative;

        // --- Win/loss tallies ---
        let winning_count = observations.iter().filter(|o| o.value > 0.0).count();
        let losing_count = count - winning_count;
        let win_rate = winning_count as f64 / n;

        let positive_sum: f64 = observations.iter().map(|o| o.value.max(0.0)).sum();
        let negative_sum: f64 = observations.iter().map(|o| o.value.min(0.0)).sum();
        let profit_factor = if negative_sum == 0.0 {
            MetricValue::Infinite
        } else {
            MetricValue::Value(positive_sum / negative_sum.abs())
        };

        // --- Annualization ---
        let opy = span.observations_per_year;
        let (annualized_return, monthly_return) = match mode {
            // Simple scaling of the mean, matching the additive cumulative
            // convention.
            CompoundingMode::Additive => {
                let annual = MetricValue::Value(mean * opy);
                (annual, annual.map(|a| a / 12.0))
            }
            // Compound annual growth rate over the elapsed years.
            CompoundingMode::Multiplicative => {
                let growth = 1.0 + total_return;
                if growth > 0.0 && span.total_years > 0.0 {
                    let cagr = growth.powf(1.0 / span.total_years) - 1.0;
                    (
                        MetricValue::Value(cagr),
                        MetricValue::Value((1.0 + cagr).powf(1.0 / 12.0) - 1.0),
                    )
                } else {
                    (MetricValue::NotAvailable, MetricValue::NotAvailable)
                }
            }
        };

        let annualized_volatility = std_dev * opy.sqrt();

        let sharpe = if std_dev > 0.0 && opy > 0.0 {
            MetricValue::Value(mean * opy.sqrt() / std_dev)
        } else {
            MetricValue::NotAvailable
        };

        // Sortino replaces total volatility with the deviation of
        // negative-only returns, measured about their own mean.
        let downside: Vec<f64> = observations
            .iter()
            .map(|o| o.value)
            .filter(|r| *r < 0.0)
            .collect();
        let sortino = if downside.is_empty() {
            MetricValue::NotAvailable
        } else {
            let downside_mean = downside.iter().sum::<f64>() / downside.len() as f64;
            let downside_std = (downside
                .iter()
                .map(|r| (r - downside_mean).powi(2))
                .sum::<f64>()
                / downside.len() as f64)
                .sqrt();
            if downside_std > 0.0 && opy > 0.0 {
                MetricValue::Value(mean * opy.sqrt() / downside_std)
            } else {
                MetricValue::NotAvailable
            }
        };

        RawMetrics {
            observation_count: count,
            winning_count,
            losing_count,
            total_hours: span.total_hours,
            total_years: span.total_years,
            observations_per_year: opy,
            mean,
            std_dev,
            total_return,
            annualized_return,
            monthly_return,
            annualized_volatility,
            sharpe,
            sortino,
            profit_factor,
            win_rate,
            max_drawdown,
        }
    }

    /// Buckets observations by calendar month (UTC) and aggregates each
    /// bucket under the configured mode.
    ///
    /// The input is pre-sorted, so each month's observations are contiguous
    /// and first-encountered order is chronological order.
    fn aggregate_monthly(
        &self,
        observations: &[ReturnObservation],
        mode: CompoundingMode,
    ) -> Vec<MonthlyReturn> {
        let mut buckets: Vec<(String, f64)> = Vec::new();

        for obs in observations {
            let month = obs.timestamp.format("%b %Y").to_string();
            match buckets.last_mut() {
                Some((label, acc)) if *label == month => match mode {
                    CompoundingMode::Additive => *acc += obs.value,
                    CompoundingMode::Multiplicative => *acc *= 1.0 + obs.value,
                },
                _ => {
                    let seed = match mode {
                        CompoundingMode::Additive => obs.value,
                        CompoundingMode::Multiplicative => 1.0 + obs.value,
                    };
                    buckets.push((month, seed));
                }
            }
        }

        buckets
            .into_iter()
            .map(|(month, acc)| MonthlyReturn {
                month,
                value: match mode {
                    CompoundingMode::Additive => acc,
                    CompoundingMode::Multiplicative => acc - 1.0,
                },
            })
            .collect()
    }

    /// Assembles the ordered display table from the raw numbers.
    fn build_table(&self, m: &RawMetrics, mode: CompoundingMode) -> Vec<MetricRow> {
        let basis_note = match mode {
            CompoundingMode::Additive => "simple basis",
            CompoundingMode::Multiplicative => "compounded basis",
        };
        let annual_note = match mode {
            CompoundingMode::Additive => "scaled by observation frequency",
            CompoundingMode::Multiplicative => "CAGR",
        };
        let monthly_note = match mode {
            CompoundingMode::Additive => "annual / 12",
            CompoundingMode::Multiplicative => "geometric, from CAGR",
        };

        vec![
            row(
                "Observations",
                group_thousands(m.observation_count),
                format!("span {:.1} days", m.total_hours / 24.0),
            ),
            row(
                "Cumulative Return",
                MetricValue::Value(m.total_return).to_percent_string(2),
                basis_note.to_string(),
            ),
            row(
                "Win Rate",
                MetricValue::Value(m.win_rate).to_percent_string(1),
                format!("{} wins / {} losses", m.winning_count, m.losing_count),
            ),
            row(
                "Profit Factor",
                m.profit_factor.to_ratio_string(2),
                "gross profit / gross loss".to_string(),
            ),
            row(
                "Monthly Return",
                m.monthly_return.to_percent_string(2),
                monthly_note.to_string(),
            ),
            row(
                "Annual Return",
                m.annualized_return.to_percent_string(2),
                annual_note.to_string(),
            ),
            row(
                "Sharpe Ratio",
                m.sharpe.to_ratio_string(2),
                "annualized".to_string(),
            ),
            row(
                "Sortino Ratio",
                m.sortino.to_ratio_string(2),
                "annualized, downside deviation".to_string(),
            ),
            row(
                "Max Drawdown",
                MetricValue::Value(m.max_drawdown).to_percent_string(2),
                "peak to trough".to_string(),
            ),
        ]
    }
}

fn point(index: usize, obs: &ReturnObservation, cumulative: f64) -> CumulativePoint {
    CumulativePoint {
        sequence: index + 1,
        timestamp: obs.timestamp,
        label: obs.label.clone(),
        value: obs.value,
        value_pct: obs.value * 100.0,
        cumulative,
        cumulative_pct: cumulative * 100.0,
    }
}

fn row(label: &str, value: String, note: String) -> MetricRow {
    MetricRow {
        label: label.to_string(),
        value,
        note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    const EPS: f64 = 1e-12;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn obs(timestamp: &str, value: f64) -> ReturnObservation {
        ReturnObservation::new(ts(timestamp), value, Some("BTCUSDT".to_string()))
    }

    fn daily_series(values: &[f64]) -> Vec<ReturnObservation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                obs(
                    &format!("2025-03-{:02}T00:00:00Z", i + 1),
                    *v,
                )
            })
            .collect()
    }

    #[test]
    fn empty_series_is_a_hard_error() {
        let engine = MetricsEngine::new();
        let result = engine.calculate(&[], CompoundingMode::Additive);
        assert!(matches!(result, Err(AnalyticsError::EmptySeries)));
    }

    #[test]
    fn additive_three_trade_scenario() {
        // Returns 0.01, -0.02, 0.015 one day apart; cumulative sums are
        // 0.01, -0.01, 0.005 and the deepest drawdown is -0.02.
        let engine = MetricsEngine::new();
        let bundle = engine
            .calculate(&daily_series(&[0.01, -0.02, 0.015]), CompoundingMode::Additive)
            .unwrap();

        assert!((bundle.metrics.total_return - 0.005).abs() < EPS);
        assert!((bundle.metrics.win_rate - 2.0 / 3.0).abs() < EPS);
        assert!((bundle.metrics.max_drawdown - (-0.02)).abs() < EPS);

        let cumulative: Vec<f64> = bundle.series.iter().map(|p| p.cumulative).collect();
        assert!((cumulative[0] - 0.01).abs() < EPS);
        assert!((cumulative[1] - (-0.01)).abs() < EPS);
        assert!((cumulative[2] - 0.005).abs() < EPS);

        // Profit factor = 0.025 / 0.02.
        assert_eq!(bundle.metrics.profit_factor, MetricValue::Value(1.25));
    }

    #[test]
    fn all_winning_trades_degrade_to_sentinels() {
        let engine = MetricsEngine::new();
        let bundle = engine
            .calculate(&daily_series(&[0.01, 0.02, 0.03]), CompoundingMode::Additive)
            .unwrap();

        assert_eq!(bundle.metrics.profit_factor, MetricValue::Infinite);
        assert_eq!(bundle.metrics.sortino, MetricValue::NotAvailable);
        assert!((bundle.metrics.win_rate - 1.0).abs() < EPS);
        assert_eq!(bundle.metrics.max_drawdown, 0.0);

        let table_pf = bundle
            .table
            .iter()
            .find(|r| r.label == "Profit Factor")
            .unwrap();
        assert_eq!(table_pf.value, "∞");
    }

    #[test]
    fn single_observation_is_not_an_error() {
        let engine = MetricsEngine::new();
        let bundle = engine
            .calculate(&[obs("2025-03-01T12:00:00Z", 0.05)], CompoundingMode::Additive)
            .unwrap();

        assert_eq!(bundle.metrics.std_dev, 0.0);
        assert_eq!(bundle.metrics.sharpe, MetricValue::NotAvailable);
        assert_eq!(bundle.metrics.sortino, MetricValue::NotAvailable);
        assert!((bundle.metrics.total_return - 0.05).abs() < EPS);
        assert_eq!(bundle.metrics.max_drawdown, 0.0);
    }

    #[test]
    fn degenerate_span_is_floored_not_infinite() {
        // Two observations sharing a timestamp: the span floors at 60s and
        // the year count at one hour-equivalent, so the frequency is large
        // but finite.
        let engine = MetricsEngine::new();
        let series = vec![
            obs("2025-03-01T12:00:00Z", 0.01),
            obs("2025-03-01T12:00:00Z", 0.02),
        ];
        let bundle = engine.calculate(&series, CompoundingMode::Additive).unwrap();

        let m = &bundle.metrics;
        assert!((m.total_years - 1.0 / (24.0 * 365.0)).abs() < EPS);
        assert!((m.observations_per_year - 2.0 * 24.0 * 365.0).abs() < 1e-6);
        assert!(m.observations_per_year.is_finite());
        match m.annualized_return {
            MetricValue::Value(v) => assert!(v.is_finite()),
            other => panic!("expected a finite annual return, got {other:?}"),
        }
    }

    #[test]
    fn multiplicative_monthly_scenario() {
        // Monthly returns 0.02, -0.01, 0.03 across three distinct months:
        // growth = 1.02 * 0.99 * 1.03, reported net of the initial unit.
        let engine = MetricsEngine::new();
        let series = vec![
            obs("2025-01-31T00:00:00Z", 0.02),
            obs("2025-02-28T00:00:00Z", -0.01),
            obs("2025-03-31T00:00:00Z", 0.03),
        ];
        let bundle = engine
            .calculate(&series, CompoundingMode::Multiplicative)
            .unwrap();

        let growth = 1.02 * 0.99 * 1.03;
        assert!((bundle.metrics.total_return - (growth - 1.0)).abs() < EPS);

        let expected_cagr = growth.powf(1.0 / bundle.metrics.total_years) - 1.0;
        match bundle.metrics.annualized_return {
            MetricValue::Value(cagr) => assert!((cagr - expected_cagr).abs() < EPS),
            other => panic!("expected CAGR, got {other:?}"),
        }

        // Each month has a single observation, so the monthly table
        // reproduces the inputs unchanged.
        let months: Vec<&str> = bundle.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);
        let values: Vec<f64> = bundle.monthly.iter().map(|m| m.value).collect();
        assert!((values[0] - 0.02).abs() < EPS);
        assert!((values[1] - (-0.01)).abs() < EPS);
        assert!((values[2] - 0.03).abs() < EPS);
    }

    #[test]
    fn multiplicative_buckets_compound_within_a_month() {
        let engine = MetricsEngine::new();
        let series = vec![
            obs("2025-03-03T00:00:00Z", 0.1),
            obs("2025-03-20T00:00:00Z", 0.1),
        ];
        let bundle = engine
            .calculate(&series, CompoundingMode::Multiplicative)
            .unwrap();

        assert_eq!(bundle.monthly.len(), 1);
        assert!((bundle.monthly[0].value - 0.21).abs() < EPS);
    }

    #[test]
    fn multiplicative_drawdown_is_relative_to_the_peak() {
        // Levels: 1.1, then 1.1 * 0.8 = 0.88; drawdown = 0.88/1.1 - 1 = -0.2.
        let engine = MetricsEngine::new();
        let series = vec![
            obs("2025-01-31T00:00:00Z", 0.1),
            obs("2025-02-28T00:00:00Z", -0.2),
        ];
        let bundle = engine
            .calculate(&series, CompoundingMode::Multiplicative)
            .unwrap();
        assert!((bundle.metrics.max_drawdown - (-0.2)).abs() < EPS);
    }

    #[test]
    fn monthly_aggregation_partitions_the_total_return() {
        // Additive mode: the monthly sums must add up to the final
        // cumulative return, and every observation lands in exactly one
        // bucket.
        let engine = MetricsEngine::new();
        let series = vec![
            obs("2025-01-02T00:00:00Z", 0.01),
            obs("2025-01-20T00:00:00Z", -0.005),
            obs("2025-02-01T00:00:00Z", 0.02),
            obs("2025-04-10T00:00:00Z", -0.01),
            obs("2025-04-11T00:00:00Z", 0.003),
        ];
        let bundle = engine.calculate(&series, CompoundingMode::Additive).unwrap();

        let monthly_sum: f64 = bundle.monthly.iter().map(|m| m.value).sum();
        assert!((monthly_sum - bundle.metrics.total_return).abs() < EPS);

        // No bucket for March, which has no observations.
        let months: Vec<&str> = bundle.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["Jan 2025", "Feb 2025", "Apr 2025"]);
    }

    #[test]
    fn drawdown_is_zero_iff_cumulative_never_declines() {
        let engine = MetricsEngine::new();

        let rising = engine
            .calculate(&daily_series(&[0.01, 0.0, 0.02]), CompoundingMode::Additive)
            .unwrap();
        assert_eq!(rising.metrics.max_drawdown, 0.0);

        let dipping = engine
            .calculate(&daily_series(&[0.01, -0.001, 0.02]), CompoundingMode::Additive)
            .unwrap();
        assert!(dipping.metrics.max_drawdown < 0.0);
    }

    #[test]
    fn series_is_aligned_one_to_one_with_the_input() {
        let engine = MetricsEngine::new();
        let input = daily_series(&[0.01, -0.02, 0.015]);
        let bundle = engine.calculate(&input, CompoundingMode::Additive).unwrap();

        assert_eq!(bundle.series.len(), input.len());
        for (i, p) in bundle.series.iter().enumerate() {
            assert_eq!(p.sequence, i + 1);
            assert_eq!(p.timestamp, input[i].timestamp);
            assert_eq!(p.label.as_deref(), Some("BTCUSDT"));
            assert!((p.value_pct - input[i].value * 100.0).abs() < EPS);
        }
    }

    #[test]
    fn same_input_yields_identical_output() {
        let engine = MetricsEngine::new();
        let input = daily_series(&[0.01, -0.02, 0.015, 0.0, 0.007]);
        let first = engine.calculate(&input, CompoundingMode::Additive).unwrap();
        let second = engine.calculate(&input, CompoundingMode::Additive).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn table_has_the_nine_published_rows_in_order() {
        let engine = MetricsEngine::new();
        let bundle = engine
            .calculate(&daily_series(&[0.01, -0.02, 0.015]), CompoundingMode::Additive)
            .unwrap();

        let labels: Vec<&str> = bundle.table.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Observations",
                "Cumulative Return",
                "Win Rate",
                "Profit Factor",
                "Monthly Return",
                "Annual Return",
                "Sharpe Ratio",
                "Sortino Ratio",
                "Max Drawdown",
            ]
        );
        assert_eq!(bundle.table[1].value, "0.50%");
        assert_eq!(bundle.table[2].note, "2 wins / 1 losses");
    }

    #[test]
    fn overview_reflects_the_last_observation() {
        let engine = MetricsEngine::new();
        let bundle = engine
            .calculate(&daily_series(&[0.01, -0.02, 0.015]), CompoundingMode::Additive)
            .unwrap();

        assert_eq!(bundle.overview.observation_count, 3);
        assert_eq!(bundle.overview.last_updated, "2025-03-03");
        assert!((bundle.overview.duration_days - 2.0).abs() < EPS);
    }
}
