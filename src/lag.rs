//! Lag profiles
//!
//! Correlates one factor with one metric at 0, 1 and 2 days of delay, and
//! emits the raw joined days for charting.

use crate::align::{align, inner_join, MissingValuePolicy};
use crate::correlation::try_evaluate;
use crate::metrics::WellbeingMetric;
use crate::series::{completion_series, metric_series, DailySeries};
use crate::types::{BehavioralEntry, BehavioralFactor, Correlation, FactorId, WellbeingEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metric used when a caller does not name one
pub const DEFAULT_LAG_METRIC: WellbeingMetric = WellbeingMetric::Mood;

/// A joined day for visualization (inner join, no fill)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub completed: bool,
    pub value: f64,
}

/// Correlations at three lags plus chart data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagProfile {
    pub factor_id: FactorId,
    pub factor_name: String,
    pub metric: WellbeingMetric,
    pub same_day: Option<Correlation>,
    pub next_day: Option<Correlation>,
    pub two_days: Option<Correlation>,
    pub data_points: Vec<DataPoint>,
}

impl LagProfile {
    fn empty(factor: &BehavioralFactor, metric: WellbeingMetric) -> Self {
        Self {
            factor_id: factor.id,
            factor_name: factor.name.clone(),
            metric,
            same_day: None,
            next_day: None,
            two_days: None,
            data_points: Vec::new(),
        }
    }
}

fn lagged(
    metric_series: &DailySeries,
    factor_series: &DailySeries,
    lag_days: i64,
    min_samples: usize,
    policy: MissingValuePolicy,
) -> Option<Correlation> {
    let aligned = align(metric_series, factor_series, lag_days, policy);
    match try_evaluate(&aligned, min_samples) {
        Ok(stats) => Some(stats),
        Err(reason) => {
            tracing::debug!(lag_days, %reason, "Lag slot left empty");
            None
        }
    }
}

/// Build the lag profile for one factor against one metric.
///
/// `behavioral` and `wellbeing` are expected to be pre-filtered to the
/// requested date range; behavioral entries of other factors are ignored.
/// Missing history on either side gives an all-empty profile.
pub fn lag_profile(
    factor: &BehavioralFactor,
    metric: WellbeingMetric,
    behavioral: &[BehavioralEntry],
    wellbeing: &[WellbeingEntry],
    min_samples: usize,
    policy: MissingValuePolicy,
) -> LagProfile {
    let factor_series =
        completion_series(behavioral.iter().filter(|e| e.factor_id == factor.id));
    let metric_series = metric_series(wellbeing, metric);

    if factor_series.is_empty() || metric_series.is_empty() {
        tracing::debug!(factor_id = %factor.id, %metric, "No history for lag profile");
        return LagProfile::empty(factor, metric);
    }

    let data_points = inner_join(&metric_series, &factor_series)
        .rows
        .into_iter()
        .map(|row| DataPoint {
            date: row.date,
            completed: row.secondary > 0.0,
            value: row.reference,
        })
        .collect();

    LagProfile {
        factor_id: factor.id,
        factor_name: factor.name.clone(),
        metric,
        same_day: lagged(&metric_series, &factor_series, 0, min_samples, policy),
        next_day: lagged(&metric_series, &factor_series, 1, min_samples, policy),
        two_days: lagged(&metric_series, &factor_series, 2, min_samples, policy),
        data_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::DEFAULT_LAG_MIN_SAMPLES;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i)
    }

    fn walk() -> BehavioralFactor {
        BehavioralFactor::new(7, "Walk")
    }

    #[test]
    fn test_next_day_effect_detected() {
        // Walking on day i lifts mood on day i + 1
        let pattern = [true, false, false, true, true, false, true, false, false, true];
        let behavioral: Vec<BehavioralEntry> = pattern
            .iter()
            .enumerate()
            .map(|(i, done)| BehavioralEntry::new(7, day(i as i64), *done))
            .collect();
        let wellbeing: Vec<WellbeingEntry> = (0..11)
            .map(|i| {
                let lifted = i > 0 && pattern.get(i - 1).copied().unwrap_or(false);
                WellbeingEntry::on(day(i as i64))
                    .with(WellbeingMetric::Mood, if lifted { 5.0 } else { 2.0 })
            })
            .collect();

        let profile = lag_profile(
            &walk(),
            WellbeingMetric::Mood,
            &behavioral,
            &wellbeing,
            DEFAULT_LAG_MIN_SAMPLES,
            MissingValuePolicy::default(),
        );

        let next = profile.next_day.unwrap();
        assert_eq!(next.correlation, 1.0);
        assert_eq!(next.sample_size, 11);
        assert!(profile.same_day.unwrap().correlation < 1.0);
    }

    #[test]
    fn test_lag_one_uses_only_following_day() {
        // One completion on Jan 5: at lag 1 it pairs with Jan 6 only
        let behavioral = vec![BehavioralEntry::new(7, day(4), true)];
        let wellbeing: Vec<WellbeingEntry> = (0..8)
            .map(|i| {
                WellbeingEntry::on(day(i))
                    .with(WellbeingMetric::Mood, if i == 5 { 5.0 } else { 3.0 })
            })
            .collect();

        let profile = lag_profile(
            &walk(),
            WellbeingMetric::Mood,
            &behavioral,
            &wellbeing,
            5,
            MissingValuePolicy::default(),
        );

        assert_eq!(profile.next_day.unwrap().correlation, 1.0);
        // Same day the completion lines up with an ordinary 3
        assert!(profile.same_day.unwrap().correlation < 0.0);
    }

    #[test]
    fn test_data_points_use_inner_join() {
        let behavioral = vec![
            BehavioralEntry::new(7, day(0), true),
            BehavioralEntry::new(7, day(2), false),
            BehavioralEntry::new(8, day(1), true),
        ];
        let wellbeing = vec![
            WellbeingEntry::on(day(0)).with(WellbeingMetric::Mood, 4.0),
            WellbeingEntry::on(day(1)).with(WellbeingMetric::Mood, 3.0),
            WellbeingEntry::on(day(2)).with(WellbeingMetric::Mood, 2.0),
        ];

        let profile = lag_profile(
            &walk(),
            WellbeingMetric::Mood,
            &behavioral,
            &wellbeing,
            5,
            MissingValuePolicy::default(),
        );

        assert_eq!(
            profile.data_points,
            vec![
                DataPoint {
                    date: day(0),
                    completed: true,
                    value: 4.0
                },
                DataPoint {
                    date: day(2),
                    completed: false,
                    value: 2.0
                },
            ]
        );
        // Three rows is below the lag threshold
        assert_eq!(profile.same_day, None);
    }

    #[test]
    fn test_missing_history_gives_empty_profile() {
        let wellbeing = vec![WellbeingEntry::on(day(0)).with(WellbeingMetric::Mood, 4.0)];
        let profile = lag_profile(
            &walk(),
            WellbeingMetric::Mood,
            &[],
            &wellbeing,
            5,
            MissingValuePolicy::default(),
        );

        assert_eq!(profile, LagProfile::empty(&walk(), WellbeingMetric::Mood));
    }
}
