//! Engine facade
//!
//! This module provides the public API for Wellspring. Each call validates
//! the request, reads a snapshot of entries from an [`EntryStore`] and hands
//! them to one of the pure computation stages.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::lag::{lag_profile, LagProfile};
use crate::metrics::WellbeingMetric;
use crate::store::EntryStore;
use crate::streak::{completion_heatmap, streak_stats, HeatmapCell};
use crate::sweep::{sweep, SweepFilters, SweepReport};
use crate::trends::{metric_summary, metric_trend, MetricSummary, MetricTrend};
use crate::types::{BehavioralFactor, DateRange, FactorId, StreakStats};
use chrono::NaiveDate;

/// Stateless analytics over a read-only entry store.
///
/// # Example
/// ```ignore
/// let store = Snapshot::from_json(&json)?;
/// let engine = InsightsEngine::new();
/// let report = engine.correlations(&store, DateRange::unbounded(), &SweepFilters::default())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InsightsEngine {
    config: AnalysisConfig,
}

impl InsightsEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a validated configuration
    pub fn with_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn require_factor(
        &self,
        store: &dyn EntryStore,
        id: FactorId,
    ) -> Result<BehavioralFactor, AnalysisError> {
        store.factor(id)?.ok_or(AnalysisError::UnknownFactor(id))
    }

    /// Correlate every factor with every metric, optionally narrowed by `filters`
    pub fn correlations(
        &self,
        store: &dyn EntryStore,
        range: DateRange,
        filters: &SweepFilters,
    ) -> Result<SweepReport, AnalysisError> {
        range.validate()?;
        if let Some(id) = filters.factor {
            self.require_factor(store, id)?;
        }

        let factors = store.factors()?;
        let behavioral = store.behavioral_entries(filters.factor, range)?;
        let wellbeing = store.wellbeing_entries(range)?;

        sweep(
            &factors,
            &behavioral,
            &wellbeing,
            &range,
            filters,
            &self.config,
        )
    }

    /// Same-day, next-day and two-day correlations for one pair
    pub fn lag_profile(
        &self,
        store: &dyn EntryStore,
        factor_id: FactorId,
        metric: WellbeingMetric,
        range: DateRange,
    ) -> Result<LagProfile, AnalysisError> {
        range.validate()?;
        let factor = self.require_factor(store, factor_id)?;

        let behavioral = store.behavioral_entries(Some(factor_id), range)?;
        let wellbeing = store.wellbeing_entries(range)?;

        let profile = lag_profile(
            &factor,
            metric,
            &behavioral,
            &wellbeing,
            self.config.lag_min_samples,
            self.config.missing_value_policy,
        );

        tracing::info!(
            factor_id = %factor_id,
            %metric,
            points = profile.data_points.len(),
            same_day = profile.same_day.is_some(),
            next_day = profile.next_day.is_some(),
            two_days = profile.two_days.is_some(),
            "Lag profile computed"
        );

        Ok(profile)
    }

    /// Completion statistics over a factor's full history
    pub fn streak_stats(
        &self,
        store: &dyn EntryStore,
        factor_id: FactorId,
        today: NaiveDate,
    ) -> Result<StreakStats, AnalysisError> {
        let factor = self.require_factor(store, factor_id)?;
        let entries = store.behavioral_entries(Some(factor_id), DateRange::unbounded())?;
        Ok(streak_stats(&factor, &entries, today))
    }

    /// Daily values of one metric with a moving average
    pub fn metric_trend(
        &self,
        store: &dyn EntryStore,
        metric: WellbeingMetric,
        range: DateRange,
    ) -> Result<MetricTrend, AnalysisError> {
        range.validate()?;
        let wellbeing = store.wellbeing_entries(range)?;
        Ok(metric_trend(&wellbeing, metric, self.config.trend_window))
    }

    /// Per-metric averages over the range
    pub fn metric_summary(
        &self,
        store: &dyn EntryStore,
        range: DateRange,
    ) -> Result<MetricSummary, AnalysisError> {
        range.validate()?;
        let wellbeing = store.wellbeing_entries(range)?;
        Ok(metric_summary(&wellbeing))
    }

    /// One calendar year of a factor's completions
    pub fn heatmap(
        &self,
        store: &dyn EntryStore,
        factor_id: FactorId,
        year: i32,
    ) -> Result<Vec<HeatmapCell>, AnalysisError> {
        let factor = self.require_factor(store, factor_id)?;
        let range = DateRange::year(year)
            .ok_or_else(|| AnalysisError::InvalidEntry(format!("year {year} is out of range")))?;
        let entries = store.behavioral_entries(Some(factor_id), range)?;
        Ok(completion_heatmap(&factor, &entries, year))
    }
}
