//! # Performance Metrics Engine
//!
//! This crate converts an ordered series of return observations into the
//! derived numbers published on a performance page: a scalar metrics table,
//! a monthly return breakdown, and a cumulative-return series suitable for
//! charting.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** The crate has no knowledge of files, formats or charts.
//!   It depends only on `core-types`.
//! - **Stateless calculation:** `MetricsEngine` holds no state across
//!   invocations; the same input and configuration always produce the same
//!   output, which keeps published reports reproducible.
//! - **Degrade, don't fail:** structural problems (an empty series) are hard
//!   errors, but numerical degeneracy (zero variance, no losing trades, a
//!   near-zero time span) degrades the affected metric to an explicit
//!   sentinel while everything else computes normally.
//!
//! ## Public API
//!
//! - `MetricsEngine`: the calculator.
//! - `ReportBundle` and its parts (`MetricRow`, `MonthlyReturn`,
//!   `CumulativePoint`, `Overview`, `RawMetrics`).
//! - `MetricValue`: the tagged value/not-available/infinite sentinel type.
//! - `AnalyticsError`: the specific error types returned from this crate.

pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::{
    CumulativePoint, MetricRow, MetricValue, MonthlyReturn, Overview, RawMetrics, ReportBundle,
};
