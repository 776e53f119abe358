//! Read-only entry storage
//!
//! The engine never writes. It fetches factors and entries for one request
//! through [`EntryStore`] and computes purely from what it gets back.

use crate::error::AnalysisError;
use crate::metrics::WellbeingMetric;
use crate::types::{BehavioralEntry, BehavioralFactor, DateRange, FactorId, WellbeingEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Trait for read access to tracked data
///
/// Implementations report read failures as [`AnalysisError::Storage`]; the
/// engine passes them through unchanged.
pub trait EntryStore {
    /// All known factors, in a stable order
    fn factors(&self) -> Result<Vec<BehavioralFactor>, AnalysisError>;

    /// A single factor, or `None` when the id is unknown
    fn factor(&self, id: FactorId) -> Result<Option<BehavioralFactor>, AnalysisError> {
        Ok(self.factors()?.into_iter().find(|factor| factor.id == id))
    }

    /// Behavioral entries within `range`, optionally limited to one factor
    fn behavioral_entries(
        &self,
        factor_id: Option<FactorId>,
        range: DateRange,
    ) -> Result<Vec<BehavioralEntry>, AnalysisError>;

    /// Wellbeing entries within `range`
    fn wellbeing_entries(&self, range: DateRange) -> Result<Vec<WellbeingEntry>, AnalysisError>;
}

/// An in-memory copy of everything a user has tracked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub factors: Vec<BehavioralFactor>,
    #[serde(default)]
    pub behavioral_entries: Vec<BehavioralEntry>,
    #[serde(default)]
    pub wellbeing_entries: Vec<WellbeingEntry>,
}

/// A data problem found by [`Snapshot::validate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    /// A wellbeing value outside its metric's declared range
    OutOfRange {
        index: usize,
        date: chrono::NaiveDate,
        metric: WellbeingMetric,
        value: f64,
    },
    /// A behavioral entry pointing at a factor that does not exist
    UnknownFactor {
        index: usize,
        date: chrono::NaiveDate,
        factor_id: FactorId,
    },
    /// Two factors sharing one id
    DuplicateFactor { factor_id: FactorId },
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Scan the snapshot for data problems.
    ///
    /// Analysis does not reject these; out-of-range values are correlated
    /// as-is. This is a report for whoever maintains the data.
    pub fn validate(&self) -> Vec<DataIssue> {
        let mut issues = Vec::new();

        let mut seen = BTreeSet::new();
        for factor in &self.factors {
            if !seen.insert(factor.id) {
                issues.push(DataIssue::DuplicateFactor {
                    factor_id: factor.id,
                });
            }
        }

        issues.extend(
            self.behavioral_entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| !seen.contains(&entry.factor_id))
                .map(|(index, entry)| DataIssue::UnknownFactor {
                    index,
                    date: entry.date,
                    factor_id: entry.factor_id,
                }),
        );

        for (index, entry) in self.wellbeing_entries.iter().enumerate() {
            for metric in WellbeingMetric::ALL {
                if let Some(value) = entry.value(metric) {
                    if !metric.in_range(value) {
                        issues.push(DataIssue::OutOfRange {
                            index,
                            date: entry.date,
                            metric,
                            value,
                        });
                    }
                }
            }
        }

        issues
    }
}

impl EntryStore for Snapshot {
    fn factors(&self) -> Result<Vec<BehavioralFactor>, AnalysisError> {
        Ok(self.factors.clone())
    }

    fn factor(&self, id: FactorId) -> Result<Option<BehavioralFactor>, AnalysisError> {
        Ok(self.factors.iter().find(|factor| factor.id == id).cloned())
    }

    fn behavioral_entries(
        &self,
        factor_id: Option<FactorId>,
        range: DateRange,
    ) -> Result<Vec<BehavioralEntry>, AnalysisError> {
        Ok(self
            .behavioral_entries
            .iter()
            .filter(|entry| factor_id.map_or(true, |id| entry.factor_id == id))
            .filter(|entry| range.contains(entry.date))
            .cloned()
            .collect())
    }

    fn wellbeing_entries(&self, range: DateRange) -> Result<Vec<WellbeingEntry>, AnalysisError> {
        Ok(self
            .wellbeing_entries
            .iter()
            .filter(|entry| range.contains(entry.date))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            factors: vec![BehavioralFactor::new(1, "Walk"), BehavioralFactor::new(2, "Read")],
            behavioral_entries: vec![
                BehavioralEntry::new(1, date(1), true),
                BehavioralEntry::new(2, date(2), false),
                BehavioralEntry::new(1, date(10), true),
            ],
            wellbeing_entries: vec![
                WellbeingEntry::on(date(1)).with(WellbeingMetric::Mood, 4.0),
                WellbeingEntry::on(date(12)).with(WellbeingMetric::Mood, 2.0),
            ],
        }
    }

    #[test]
    fn test_range_filtering_is_inclusive() {
        let store = snapshot();
        let range = DateRange::new(Some(date(1)), Some(date(10))).unwrap();

        let behavioral = store.behavioral_entries(Some(FactorId(1)), range).unwrap();
        assert_eq!(behavioral.len(), 2);

        let all = store.behavioral_entries(None, range).unwrap();
        assert_eq!(all.len(), 3);

        let wellbeing = store.wellbeing_entries(range).unwrap();
        assert_eq!(wellbeing.len(), 1);
    }

    #[test]
    fn test_factor_lookup() {
        let store = snapshot();
        assert_eq!(store.factor(FactorId(2)).unwrap().unwrap().name, "Read");
        assert_eq!(store.factor(FactorId(9)).unwrap(), None);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "factors": [{"id": 1, "name": "Walk", "category": "Exercise"}],
            "behavioral_entries": [{"factor_id": 1, "date": "2024-04-01", "completed": true}],
            "wellbeing_entries": [{"date": "2024-04-01", "mood_score": 4}]
        }"#;
        let store = Snapshot::from_json(json).unwrap();

        assert_eq!(store.factors[0].category, "Exercise");
        assert_eq!(store.wellbeing_entries[0].mood_score, Some(4.0));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let store = Snapshot::from_json("{}").unwrap();
        assert_eq!(store, Snapshot::default());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut store = snapshot();
        store.behavioral_entries.push(BehavioralEntry::new(5, date(3), true));
        store
            .wellbeing_entries
            .push(WellbeingEntry::on(date(4)).with(WellbeingMetric::Stress, 7.0));

        assert_eq!(
            store.validate(),
            vec![
                DataIssue::UnknownFactor {
                    index: 3,
                    date: date(3),
                    factor_id: FactorId(5),
                },
                DataIssue::OutOfRange {
                    index: 2,
                    date: date(4),
                    metric: WellbeingMetric::Stress,
                    value: 7.0,
                },
            ]
        );
        assert!(snapshot().validate().is_empty());
    }
}
