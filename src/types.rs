//! Core types for the Wellspring engine
//!
//! This module defines the read-only entities the engine consumes (factors,
//! behavioral entries, wellbeing entries) and the records it produces
//! (correlations, streak statistics, chart points).

use crate::error::AnalysisError;
use crate::metrics::WellbeingMetric;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identity of a behavioral factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorId(pub i64);

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FactorId {
    fn from(id: i64) -> Self {
        FactorId(id)
    }
}

fn default_category() -> String {
    "General".to_string()
}

fn default_active() -> bool {
    true
}

/// A trackable habit or lifestyle item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralFactor {
    pub id: FactorId,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl BehavioralFactor {
    pub fn new(id: impl Into<FactorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: default_category(),
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// One day's completion record for a factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralEntry {
    pub factor_id: FactorId,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BehavioralEntry {
    pub fn new(factor_id: impl Into<FactorId>, date: NaiveDate, completed: bool) -> Self {
        Self {
            factor_id: factor_id.into(),
            date,
            completed,
            notes: None,
        }
    }
}

/// A wellbeing self-report. Several may exist for the same date and every
/// metric is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellbeingEntry {
    pub date: NaiveDate,
    /// Time of day the report was logged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mood_score: Option<f64>,
    #[serde(default)]
    pub energy_level: Option<f64>,
    #[serde(default)]
    pub stress_level: Option<f64>,
    #[serde(default)]
    pub anxiety_level: Option<f64>,
    #[serde(default)]
    pub rumination_level: Option<f64>,
    #[serde(default)]
    pub anger_level: Option<f64>,
    #[serde(default)]
    pub general_health: Option<f64>,
    #[serde(default)]
    pub sleep_quality: Option<f64>,
    #[serde(default)]
    pub sweating_level: Option<f64>,
    #[serde(default)]
    pub libido_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Accepts a list or a single comma-separated string
    #[serde(
        default,
        deserialize_with = "de_tags",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

fn de_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Joined(String),
    }

    let tags = match Option::<Tags>::deserialize(deserializer)? {
        Some(Tags::List(tags)) => tags,
        Some(Tags::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };

    Ok(tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect())
}

impl WellbeingEntry {
    /// An entry on `date` with no metrics recorded
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    /// Builder-style setter for a single metric
    pub fn with(mut self, metric: WellbeingMetric, value: f64) -> Self {
        *self.slot_mut(metric) = Some(value);
        self
    }

    /// Value recorded for `metric`, if any
    pub fn value(&self, metric: WellbeingMetric) -> Option<f64> {
        match metric {
            WellbeingMetric::Mood => self.mood_score,
            WellbeingMetric::Energy => self.energy_level,
            WellbeingMetric::Stress => self.stress_level,
            WellbeingMetric::Anxiety => self.anxiety_level,
            WellbeingMetric::Rumination => self.rumination_level,
            WellbeingMetric::Anger => self.anger_level,
            WellbeingMetric::GeneralHealth => self.general_health,
            WellbeingMetric::SleepQuality => self.sleep_quality,
            WellbeingMetric::Sweating => self.sweating_level,
            WellbeingMetric::Libido => self.libido_level,
        }
    }

    fn slot_mut(&mut self, metric: WellbeingMetric) -> &mut Option<f64> {
        match metric {
            WellbeingMetric::Mood => &mut self.mood_score,
            WellbeingMetric::Energy => &mut self.energy_level,
            WellbeingMetric::Stress => &mut self.stress_level,
            WellbeingMetric::Anxiety => &mut self.anxiety_level,
            WellbeingMetric::Rumination => &mut self.rumination_level,
            WellbeingMetric::Anger => &mut self.anger_level,
            WellbeingMetric::GeneralHealth => &mut self.general_health,
            WellbeingMetric::SleepQuality => &mut self.sleep_quality,
            WellbeingMetric::Sweating => &mut self.sweating_level,
            WellbeingMetric::Libido => &mut self.libido_level,
        }
    }
}

/// Inclusive date bounds; a missing bound is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A range with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a range, rejecting `start > end`
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, AnalysisError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Range covering one calendar year
    pub fn year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(AnalysisError::InvalidDateRange { start, end })
            }
            _ => Ok(()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Output of one successful correlation evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Pearson r, rounded to 3 decimals
    pub correlation: f64,
    /// Two-tailed p-value, rounded to 4 decimals
    pub p_value: f64,
    pub significant: bool,
    pub sample_size: usize,
}

/// A correlation between one factor and one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub factor_id: FactorId,
    pub factor_name: String,
    pub factor_category: String,
    pub metric: WellbeingMetric,
    pub correlation: f64,
    pub p_value: f64,
    pub significant: bool,
    pub sample_size: usize,
}

impl CorrelationResult {
    pub fn new(factor: &BehavioralFactor, metric: WellbeingMetric, stats: Correlation) -> Self {
        Self {
            factor_id: factor.id,
            factor_name: factor.name.clone(),
            factor_category: factor.category.clone(),
            metric,
            correlation: stats.correlation,
            p_value: stats.p_value,
            significant: stats.significant,
            sample_size: stats.sample_size,
        }
    }
}

/// Completion statistics for one factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakStats {
    pub factor_id: FactorId,
    pub factor_name: String,
    pub total_days: usize,
    pub completed_days: usize,
    /// Percentage, rounded to 2 decimals
    pub completion_rate: f64,
    pub current_streak: usize,
    pub longest_streak: usize,
}
