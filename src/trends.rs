//! Metric trends and summaries
//!
//! Read-side views over the wellbeing history that need no pairing with a
//! factor: a smoothed daily series for one metric and per-metric averages.

use crate::metrics::WellbeingMetric;
use crate::round_to;
use crate::series::metric_series;
use crate::types::WellbeingEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// One day of a metric trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Daily mean, rounded to 2 decimals
    pub value: f64,
    /// Trailing mean over up to `window` series points, rounded to 2 decimals
    pub moving_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub metric: WellbeingMetric,
    pub label: String,
    pub window: usize,
    pub points: Vec<TrendPoint>,
}

/// Daily series of `metric` with a trailing moving average.
///
/// The window counts series rows, not calendar days, and the first points
/// average over however many rows exist so far. A zero window is treated
/// as one.
pub fn metric_trend(
    entries: &[WellbeingEntry],
    metric: WellbeingMetric,
    window: usize,
) -> MetricTrend {
    let window = window.max(1);
    let series = metric_series(entries, metric);

    let mut recent: VecDeque<f64> = VecDeque::with_capacity(window);
    let mut running = 0.0;
    let mut points = Vec::with_capacity(series.len());

    for (date, value) in series.iter() {
        if recent.len() == window {
            if let Some(oldest) = recent.pop_front() {
                running -= oldest;
            }
        }
        recent.push_back(value);
        running += value;

        points.push(TrendPoint {
            date,
            value: round_to(value, 2),
            moving_average: round_to(running / recent.len() as f64, 2),
        });
    }

    MetricTrend {
        metric,
        label: metric.label().to_string(),
        window,
        points,
    }
}

/// Averages across every wellbeing entry in a range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub total_entries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
    /// Mean per metric over raw entries; `None` when never logged
    pub averages: BTreeMap<WellbeingMetric, Option<f64>>,
}

/// Summarize raw entries. Means are taken per entry, not per day, and
/// rounded to 2 decimals.
pub fn metric_summary(entries: &[WellbeingEntry]) -> MetricSummary {
    let averages = WellbeingMetric::ALL
        .iter()
        .map(|&metric| {
            let (sum, count) = entries
                .iter()
                .filter_map(|entry| entry.value(metric))
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            let mean = (count > 0).then(|| round_to(sum / count as f64, 2));
            (metric, mean)
        })
        .collect();

    MetricSummary {
        total_entries: entries.len(),
        first_date: entries.iter().map(|entry| entry.date).min(),
        last_date: entries.iter().map(|entry| entry.date).max(),
        averages,
    }
}
