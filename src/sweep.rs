//! Factor × metric sweep
//!
//! Correlates every behavioral factor against every wellbeing metric at lag 0
//! and presents the surviving pairs two ways: grouped by metric (ranked by
//! strength) and grouped by factor.

use crate::align::align;
use crate::config::AnalysisConfig;
use crate::correlation::try_evaluate;
use crate::error::AnalysisError;
use crate::metrics::WellbeingMetric;
use crate::series::{completion_series, metric_series, DailySeries};
use crate::types::{
    BehavioralEntry, BehavioralFactor, CorrelationResult, DateRange, FactorId, WellbeingEntry,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Optional restrictions on a sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<WellbeingMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<FactorId>,
}

impl SweepFilters {
    pub fn metric(metric: WellbeingMetric) -> Self {
        Self {
            metric: Some(metric),
            factor: None,
        }
    }

    pub fn factor(factor: FactorId) -> Self {
        Self {
            metric: None,
            factor: Some(factor),
        }
    }

    fn metrics(&self) -> Vec<WellbeingMetric> {
        match self.metric {
            Some(metric) => vec![metric],
            None => WellbeingMetric::ALL.to_vec(),
        }
    }
}

/// Results for one metric, strongest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCorrelations {
    pub metric: WellbeingMetric,
    pub label: String,
    pub higher_is_better: bool,
    pub correlations: Vec<CorrelationResult>,
}

/// Output of [`sweep`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub by_metric: Vec<MetricCorrelations>,
    pub by_factor: BTreeMap<FactorId, Vec<CorrelationResult>>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.by_metric.is_empty() && self.by_factor.is_empty()
    }

    /// Number of pairs that produced a correlation
    pub fn result_count(&self) -> usize {
        self.by_factor.values().map(Vec::len).sum()
    }

    /// Build both groupings from per-metric results.
    ///
    /// `by_factor` receives every result in metric order; `by_metric` is
    /// ranked by |r| and capped at `top_n`.
    fn from_groups(groups: Vec<(WellbeingMetric, Vec<CorrelationResult>)>, top_n: usize) -> Self {
        let by_factor = groups
            .iter()
            .flat_map(|(_, results)| results.iter())
            .fold(BTreeMap::new(), |mut acc: BTreeMap<_, Vec<_>>, result| {
                acc.entry(result.factor_id).or_default().push(result.clone());
                acc
            });

        let by_metric = groups
            .into_iter()
            .map(|(metric, correlations)| MetricCorrelations {
                metric,
                label: metric.label().to_string(),
                higher_is_better: metric.higher_is_better(),
                correlations: rank(correlations, top_n),
            })
            .collect();

        Self {
            by_metric,
            by_factor,
        }
    }
}

/// Sort by descending |r| and keep the first `top_n`. The sort is stable, so
/// ties keep factor order.
fn rank(mut results: Vec<CorrelationResult>, top_n: usize) -> Vec<CorrelationResult> {
    results.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(top_n);
    results
}

/// Correlate one factor series against one metric series at lag 0
pub fn correlate_pair(
    factor: &BehavioralFactor,
    factor_series: &DailySeries,
    metric: WellbeingMetric,
    metric_series: &DailySeries,
    config: &AnalysisConfig,
) -> Option<CorrelationResult> {
    let aligned = align(
        metric_series,
        factor_series,
        0,
        config.missing_value_policy,
    );

    match try_evaluate(&aligned, config.sweep_min_samples) {
        Ok(stats) => Some(CorrelationResult::new(factor, metric, stats)),
        Err(reason) => {
            tracing::debug!(
                factor_id = %factor.id,
                metric = %metric,
                %reason,
                "Skipping factor/metric pair"
            );
            None
        }
    }
}

/// Run the full factor × metric sweep over a date range.
///
/// Entries outside `range` are ignored. A factor filter naming a factor that
/// is not in `factors` is a caller error. Pairs that fail any evaluation guard
/// are left out of both groupings.
pub fn sweep(
    factors: &[BehavioralFactor],
    behavioral: &[BehavioralEntry],
    wellbeing: &[WellbeingEntry],
    range: &DateRange,
    filters: &SweepFilters,
    config: &AnalysisConfig,
) -> Result<SweepReport, AnalysisError> {
    range.validate()?;

    if let Some(id) = filters.factor {
        if !factors.iter().any(|f| f.id == id) {
            return Err(AnalysisError::UnknownFactor(id));
        }
    }

    let selected: Vec<&BehavioralFactor> = factors
        .iter()
        .filter(|f| filters.factor.map_or(true, |id| f.id == id))
        .collect();

    if selected.is_empty() {
        return Ok(SweepReport::default());
    }

    let in_range: Vec<&WellbeingEntry> = wellbeing
        .iter()
        .filter(|entry| range.contains(entry.date))
        .collect();

    let metric_columns: Vec<(WellbeingMetric, DailySeries)> = filters
        .metrics()
        .into_iter()
        .map(|metric| (metric, metric_series(in_range.iter().copied(), metric)))
        .filter(|(_, series)| !series.is_empty())
        .collect();

    if metric_columns.is_empty() {
        return Ok(SweepReport::default());
    }

    let factor_series: Vec<(&BehavioralFactor, DailySeries)> = selected
        .into_iter()
        .map(|factor| {
            let series = completion_series(
                behavioral
                    .iter()
                    .filter(|e| e.factor_id == factor.id && range.contains(e.date)),
            );
            (factor, series)
        })
        .collect();

    let groups: Vec<(WellbeingMetric, Vec<CorrelationResult>)> = metric_columns
        .iter()
        .map(|(metric, m_series)| {
            let results = factor_series
                .iter()
                .filter_map(|(factor, f_series)| {
                    correlate_pair(factor, f_series, *metric, m_series, config)
                })
                .collect();
            (*metric, results)
        })
        .collect();

    let report = SweepReport::from_groups(groups, config.top_n);

    tracing::info!(
        factors = factor_series.len(),
        metrics = metric_columns.len(),
        results = report.result_count(),
        "Correlation sweep complete"
    );

    Ok(report)
}
