//! Daily aggregation
//!
//! Collapses irregular, possibly duplicated entries into one value per
//! calendar day. Same-day values are averaged; a day with no usable value is
//! absent from the series rather than zero.

use crate::metrics::WellbeingMetric;
use crate::types::{BehavioralEntry, WellbeingEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One numeric value per calendar day, ordered by date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    values: BTreeMap<NaiveDate, f64>,
}

impl DailySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(date, value)` pairs in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(date, value)| (*date, *value))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.values.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.values.keys().next_back().copied()
    }
}

impl FromIterator<(NaiveDate, f64)> for DailySeries {
    /// Later values for the same date replace earlier ones; use
    /// [`aggregate_daily`] when duplicates must be averaged.
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Group observations by date and average same-day values.
///
/// `selector` maps each item to its `(date, value)` observation, or `None`
/// when the item carries no value for the quantity being aggregated.
pub fn aggregate_daily<I, F>(entries: I, selector: F) -> DailySeries
where
    I: IntoIterator,
    F: Fn(I::Item) -> Option<(NaiveDate, f64)>,
{
    let mut sums: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();

    for (date, value) in entries.into_iter().filter_map(selector) {
        let slot = sums.entry(date).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    sums.into_iter()
        .map(|(date, (sum, count))| (date, sum / f64::from(count)))
        .collect()
}

/// Daily completion indicator for a factor: 1.0 completed, 0.0 not.
/// Duplicate same-day entries average, so partial days are possible.
pub fn completion_series<'a, I>(entries: I) -> DailySeries
where
    I: IntoIterator<Item = &'a BehavioralEntry>,
{
    aggregate_daily(entries, |entry| {
        Some((entry.date, if entry.completed { 1.0 } else { 0.0 }))
    })
}

/// Daily mean of one wellbeing metric, skipping entries where it is null
pub fn metric_series<'a, I>(entries: I, metric: WellbeingMetric) -> DailySeries
where
    I: IntoIterator<Item = &'a WellbeingEntry>,
{
    aggregate_daily(entries, |entry| {
        entry.value(metric).map(|value| (entry.date, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_single_entry_per_day_is_identity() {
        let raw = vec![(date(3), 2.0), (date(1), 4.0), (date(2), 5.0)];
        let series = aggregate_daily(raw.iter(), |(d, v)| Some((*d, *v)));

        let values: Vec<(NaiveDate, f64)> = series.iter().collect();
        assert_eq!(values, vec![(date(1), 4.0), (date(2), 5.0), (date(3), 2.0)]);
    }

    #[test]
    fn test_duplicate_completion_averages_to_half() {
        let entries = vec![
            BehavioralEntry::new(1, date(5), true),
            BehavioralEntry::new(1, date(5), false),
            BehavioralEntry::new(1, date(6), true),
        ];
        let series = completion_series(&entries);

        assert_eq!(series.get(date(5)), Some(0.5));
        assert_eq!(series.get(date(6)), Some(1.0));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_metric_series_skips_nulls() {
        let entries = vec![
            WellbeingEntry::on(date(1)).with(WellbeingMetric::Mood, 2.0),
            WellbeingEntry::on(date(1)).with(WellbeingMetric::Mood, 4.0),
            WellbeingEntry::on(date(1)),
            WellbeingEntry::on(date(2)).with(WellbeingMetric::Energy, 3.0),
        ];
        let series = metric_series(&entries, WellbeingMetric::Mood);

        assert_eq!(series.get(date(1)), Some(3.0));
        // Only nulls for mood on day 2: absent, not zero
        assert_eq!(series.get(date(2)), None);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        let entries: Vec<BehavioralEntry> = Vec::new();
        let series = completion_series(&entries);
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn test_first_and_last_date() {
        let series: DailySeries = vec![(date(9), 1.0), (date(2), 0.0)].into_iter().collect();
        assert_eq!(series.first_date(), Some(date(2)));
        assert_eq!(series.last_date(), Some(date(9)));
    }
}
