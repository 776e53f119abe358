//! Series alignment
//!
//! Joins a reference series (a wellbeing metric) with a secondary series (a
//! factor's daily completion) on date. The secondary series can be shifted
//! forward by a number of days to model a delayed effect.

use crate::series::DailySeries;
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// What to do with a reference day that has no secondary value after shifting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "value")]
pub enum MissingValuePolicy {
    /// Substitute a constant. `FillWith(0.0)` reads an untracked day as
    /// "factor not completed", which shifts both sign and magnitude of r.
    FillWith(f64),
    /// Drop reference days the factor was not tracked on
    ExcludeUntracked,
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        MissingValuePolicy::FillWith(0.0)
    }
}

impl MissingValuePolicy {
    /// Resolve a possibly-missing secondary value; `None` drops the row
    pub fn resolve(&self, value: Option<f64>) -> Option<f64> {
        match (value, self) {
            (Some(v), _) => Some(v),
            (None, MissingValuePolicy::FillWith(fill)) => Some(*fill),
            (None, MissingValuePolicy::ExcludeUntracked) => None,
        }
    }
}

/// One joined day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub reference: f64,
    pub secondary: f64,
}

/// Rows produced by [`align`], in ascending date order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn reference_values(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.reference).collect()
    }

    pub fn secondary_values(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.secondary).collect()
    }

    /// The same table with the two columns exchanged
    pub fn swapped(&self) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| AlignedRow {
                    date: row.date,
                    reference: row.secondary,
                    secondary: row.reference,
                })
                .collect(),
        }
    }
}

/// Shift every date of `series` forward by `lag_days`.
///
/// Dates that would leave chrono's representable range are dropped, so an
/// out-of-range lag yields an empty series.
pub fn shift(series: &DailySeries, lag_days: i64) -> DailySeries {
    if lag_days == 0 {
        return series.clone();
    }
    let Some(offset) = TimeDelta::try_days(lag_days) else {
        return DailySeries::new();
    };
    series
        .iter()
        .filter_map(|(date, value)| date.checked_add_signed(offset).map(|d| (d, value)))
        .collect()
}

/// Left join on the reference dates.
///
/// A secondary entry on day D lands on reference day D + `lag_days`. Every
/// reference date is kept unless `policy` drops it.
pub fn align(
    primary: &DailySeries,
    secondary: &DailySeries,
    lag_days: i64,
    policy: MissingValuePolicy,
) -> AlignedTable {
    let shifted = shift(secondary, lag_days);

    let rows = primary
        .iter()
        .filter_map(|(date, reference)| {
            policy.resolve(shifted.get(date)).map(|secondary| AlignedRow {
                date,
                reference,
                secondary,
            })
        })
        .collect();

    AlignedTable { rows }
}

/// Inner join without lag or fill: only days present in both series.
///
/// Used for chart points, where synthetic filled days must not appear.
pub fn inner_join(primary: &DailySeries, secondary: &DailySeries) -> AlignedTable {
    let rows = primary
        .iter()
        .filter_map(|(date, reference)| {
            secondary.get(date).map(|secondary| AlignedRow {
                date,
                reference,
                secondary,
            })
        })
        .collect();

    AlignedTable { rows }
}
