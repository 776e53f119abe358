//! Wellspring - habit and wellbeing correlation engine
//!
//! Wellspring turns irregular daily logs of habits (behavioral factors) and
//! self-reported wellbeing scores into aligned daily series, then measures how
//! they move together: daily aggregation → alignment (optionally lagged) →
//! Pearson correlation with significance → factor × metric sweep.
//!
//! ## Modules
//!
//! - **Correlation**: [`series`], [`align`], [`correlation`], [`sweep`], [`lag`]
//! - **Completion**: [`streak`] for streaks and calendar heatmaps
//! - **Trends**: [`trends`] for moving averages and per-metric summaries
//! - **Boundary**: [`store`] for read access, [`engine`] as the facade, [`report`]
//!   for JSON envelopes

pub mod align;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod lag;
pub mod metrics;
pub mod report;
pub mod series;
pub mod store;
pub mod streak;
pub mod sweep;
pub mod trends;
pub mod types;

pub use align::{align, AlignedTable, MissingValuePolicy};
pub use config::AnalysisConfig;
pub use correlation::evaluate_correlation;
pub use engine::InsightsEngine;
pub use error::AnalysisError;
pub use lag::LagProfile;
pub use metrics::WellbeingMetric;
pub use report::{InsightsReport, ReportEncoder};
pub use series::{aggregate_daily, DailySeries};
pub use store::{EntryStore, Snapshot};
pub use streak::streak_stats;
pub use sweep::{sweep, SweepFilters, SweepReport};
pub use types::{
    BehavioralEntry, BehavioralFactor, Correlation, CorrelationResult, DateRange, FactorId,
    StreakStats, WellbeingEntry,
};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "wellspring";

/// Round to `decimals` places, ties to even
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
