//! Wellbeing metric registry
//!
//! The metric set is closed: every metric a wellbeing entry can carry is a
//! variant of [`WellbeingMetric`], and its range, polarity and display label
//! come from a static lookup table.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named, range-bounded daily self-report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WellbeingMetric {
    #[serde(rename = "mood_score")]
    Mood,
    #[serde(rename = "energy_level")]
    Energy,
    #[serde(rename = "stress_level")]
    Stress,
    #[serde(rename = "anxiety_level")]
    Anxiety,
    #[serde(rename = "rumination_level")]
    Rumination,
    #[serde(rename = "anger_level")]
    Anger,
    #[serde(rename = "general_health")]
    GeneralHealth,
    #[serde(rename = "sleep_quality")]
    SleepQuality,
    #[serde(rename = "sweating_level")]
    Sweating,
    #[serde(rename = "libido_level")]
    Libido,
}

/// Static description of a metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSpec {
    pub metric: WellbeingMetric,
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    /// Presentation only; never used by the correlation math
    pub higher_is_better: bool,
}

const REGISTRY: [MetricSpec; 10] = [
    MetricSpec {
        metric: WellbeingMetric::Mood,
        name: "mood_score",
        label: "Mood",
        min: 1.0,
        max: 5.0,
        higher_is_better: true,
    },
    MetricSpec {
        metric: WellbeingMetric::Energy,
        name: "energy_level",
        label: "Energy",
        min: 1.0,
        max: 5.0,
        higher_is_better: true,
    },
    MetricSpec {
        metric: WellbeingMetric::Stress,
        name: "stress_level",
        label: "Stress",
        min: 0.0,
        max: 3.0,
        higher_is_better: false,
    },
    MetricSpec {
        metric: WellbeingMetric::Anxiety,
        name: "anxiety_level",
        label: "Anxiety",
        min: 0.0,
        max: 3.0,
        higher_is_better: false,
    },
    MetricSpec {
        metric: WellbeingMetric::Rumination,
        name: "rumination_level",
        label: "Rumination",
        min: 0.0,
        max: 3.0,
        higher_is_better: false,
    },
    MetricSpec {
        metric: WellbeingMetric::Anger,
        name: "anger_level",
        label: "Anger",
        min: 0.0,
        max: 3.0,
        higher_is_better: false,
    },
    MetricSpec {
        metric: WellbeingMetric::GeneralHealth,
        name: "general_health",
        label: "General health",
        min: 0.0,
        max: 5.0,
        higher_is_better: true,
    },
    MetricSpec {
        metric: WellbeingMetric::SleepQuality,
        name: "sleep_quality",
        label: "Sleep quality",
        min: 0.0,
        max: 3.0,
        higher_is_better: true,
    },
    MetricSpec {
        metric: WellbeingMetric::Sweating,
        name: "sweating_level",
        label: "Sweating",
        min: 0.0,
        max: 3.0,
        higher_is_better: false,
    },
    MetricSpec {
        metric: WellbeingMetric::Libido,
        name: "libido_level",
        label: "Libido",
        min: 0.0,
        max: 3.0,
        higher_is_better: true,
    },
];

impl WellbeingMetric {
    /// Every metric, in registry order
    pub const ALL: [WellbeingMetric; 10] = [
        WellbeingMetric::Mood,
        WellbeingMetric::Energy,
        WellbeingMetric::Stress,
        WellbeingMetric::Anxiety,
        WellbeingMetric::Rumination,
        WellbeingMetric::Anger,
        WellbeingMetric::GeneralHealth,
        WellbeingMetric::SleepQuality,
        WellbeingMetric::Sweating,
        WellbeingMetric::Libido,
    ];

    fn index(self) -> usize {
        match self {
            WellbeingMetric::Mood => 0,
            WellbeingMetric::Energy => 1,
            WellbeingMetric::Stress => 2,
            WellbeingMetric::Anxiety => 3,
            WellbeingMetric::Rumination => 4,
            WellbeingMetric::Anger => 5,
            WellbeingMetric::GeneralHealth => 6,
            WellbeingMetric::SleepQuality => 7,
            WellbeingMetric::Sweating => 8,
            WellbeingMetric::Libido => 9,
        }
    }

    /// Registry entry for this metric
    pub fn spec(self) -> &'static MetricSpec {
        &REGISTRY[self.index()]
    }

    pub fn as_str(self) -> &'static str {
        self.spec().name
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn higher_is_better(self) -> bool {
        self.spec().higher_is_better
    }

    /// Whether a value lies inside the metric's declared range (inclusive)
    pub fn in_range(self, value: f64) -> bool {
        let spec = self.spec();
        value >= spec.min && value <= spec.max
    }
}

/// The full registry, in declaration order
pub fn registry() -> &'static [MetricSpec] {
    &REGISTRY
}

impl fmt::Display for WellbeingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellbeingMetric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        WellbeingMetric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == name)
            .ok_or_else(|| AnalysisError::UnknownMetric(name.to_string()))
    }
}
