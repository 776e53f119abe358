//! Streak and completion statistics
//!
//! Works on a factor's raw entries, not on the daily series: every entry
//! counts as one tracked day.

use crate::round_to;
use crate::types::{BehavioralEntry, BehavioralFactor, DateRange, StreakStats};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Compute completion statistics for `factor` as of `today`.
///
/// Streaks count adjacent entries in date order, so a gap in tracking does
/// not break a run. Entries dated after `today` are ignored by the current
/// streak but still count toward the totals. The current streak also stops
/// at the first entry older than `total_days` days, so a run that ended long
/// ago is not reported as live.
pub fn streak_stats(
    factor: &BehavioralFactor,
    entries: &[BehavioralEntry],
    today: NaiveDate,
) -> StreakStats {
    let mut sorted: Vec<&BehavioralEntry> = entries
        .iter()
        .filter(|entry| entry.factor_id == factor.id)
        .collect();
    sorted.sort_by_key(|entry| entry.date);

    let total_days = sorted.len();
    let completed_days = sorted.iter().filter(|entry| entry.completed).count();
    let completion_rate = if total_days == 0 {
        0.0
    } else {
        round_to(completed_days as f64 / total_days as f64 * 100.0, 2)
    };

    StreakStats {
        factor_id: factor.id,
        factor_name: factor.name.clone(),
        total_days,
        completed_days,
        completion_rate,
        current_streak: current_streak(&sorted, today),
        longest_streak: longest_streak(&sorted),
    }
}

fn longest_streak(sorted: &[&BehavioralEntry]) -> usize {
    let (longest, _) = sorted.iter().fold((0, 0), |(longest, run), entry| {
        let run = if entry.completed { run + 1 } else { 0 };
        (longest.max(run), run)
    });
    longest
}

fn current_streak(sorted: &[&BehavioralEntry], today: NaiveDate) -> usize {
    let max_age = i64::try_from(sorted.len()).unwrap_or(i64::MAX);
    sorted
        .iter()
        .rev()
        .filter(|entry| entry.date <= today)
        .take_while(|entry| entry.completed && (today - entry.date).num_days() <= max_age)
        .count()
}

/// One cell of a completion calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub completed: bool,
    /// 1 when completed, 0 otherwise
    pub value: u8,
}

/// Raw entries of `factor` falling in calendar `year`, sorted by date
pub fn completion_heatmap(
    factor: &BehavioralFactor,
    entries: &[BehavioralEntry],
    year: i32,
) -> Vec<HeatmapCell> {
    let Some(range) = DateRange::year(year) else {
        return Vec::new();
    };

    let mut cells: Vec<HeatmapCell> = entries
        .iter()
        .filter(|entry| entry.factor_id == factor.id && range.contains(entry.date))
        .map(|entry| HeatmapCell {
            date: entry.date,
            completed: entry.completed,
            value: u8::from(entry.completed),
        })
        .collect();
    cells.sort_by_key(|cell| cell.date);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(i)
    }

    fn factor() -> BehavioralFactor {
        BehavioralFactor::new(1, "Meditation")
    }

    fn entries(pattern: &[bool]) -> Vec<BehavioralEntry> {
        pattern
            .iter()
            .enumerate()
            .map(|(i, done)| BehavioralEntry::new(1, day(i as i64), *done))
            .collect()
    }

    #[test]
    fn test_streaks_follow_entry_order() {
        let stats = streak_stats(
            &factor(),
            &entries(&[true, true, true, false, true, true]),
            day(6),
        );

        assert_eq!(stats.total_days, 6);
        assert_eq!(stats.completed_days, 5);
        assert_eq!(stats.completion_rate, 83.33);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_no_entries_gives_zero_stats() {
        let stats = streak_stats(&factor(), &[], day(0));
        assert_eq!(
            stats,
            StreakStats {
                factor_id: factor().id,
                factor_name: "Meditation".to_string(),
                total_days: 0,
                completed_days: 0,
                completion_rate: 0.0,
                current_streak: 0,
                longest_streak: 0,
            }
        );
    }

    #[test]
    fn test_tracking_gap_does_not_break_streak() {
        let gapped = vec![
            BehavioralEntry::new(1, day(0), true),
            BehavioralEntry::new(1, day(5), true),
            BehavioralEntry::new(1, day(9), true),
        ];
        let stats = streak_stats(&factor(), &gapped, day(9));
        assert_eq!(stats.longest_streak, 3);
        // Day 5 is older than the three tracked days, so the live run stops there
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn test_future_entries_skipped_by_current_streak() {
        // Entry on day 3 is after "today" and incomplete; it must not break the run
        let pattern = entries(&[false, true, true, false]);
        let stats = streak_stats(&factor(), &pattern, day(2));

        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_days, 4);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let mut shuffled = entries(&[true, false, true, true]);
        shuffled.reverse();
        let stats = streak_stats(&factor(), &shuffled, day(3));
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_stale_run_is_not_current() {
        // Completed on Mar 1-3, viewed two and a half months later
        let run = entries(&[true, true, true]);
        let today = NaiveDate::from_ymd_opt(2024, 5, 21).unwrap();
        let stats = streak_stats(&factor(), &run, today);

        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn test_current_streak_within_entry_count_of_today() {
        // Three entries, the oldest exactly three days back
        let run = entries(&[true, true, true]);
        let stats = streak_stats(&factor(), &run, day(3));
        assert_eq!(stats.current_streak, 3);

        let stats = streak_stats(&factor(), &run, day(4));
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_completion_rate_ties_round_to_even() {
        let mut list = entries(&[true]);
        list.extend((1..32).map(|i| BehavioralEntry::new(1, day(i), false)));
        let stats = streak_stats(&factor(), &list, day(40));

        assert_eq!(stats.total_days, 32);
        assert_eq!(stats.completion_rate, 3.12);
    }

    #[test]
    fn test_other_factors_ignored() {
        let mut mixed = entries(&[true, true]);
        mixed.push(BehavioralEntry::new(2, day(2), false));
        let stats = streak_stats(&factor(), &mixed, day(10));
        assert_eq!(stats.total_days, 2);
        assert_eq!(stats.completion_rate, 100.0);
    }

    #[test]
    fn test_heatmap_limited_to_year() {
        let list = vec![
            BehavioralEntry::new(1, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), true),
            BehavioralEntry::new(1, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), true),
            BehavioralEntry::new(1, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), false),
        ];
        let cells = completion_heatmap(&factor(), &list, 2024);

        assert_eq!(
            cells,
            vec![
                HeatmapCell {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    completed: false,
                    value: 0,
                },
                HeatmapCell {
                    date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                    completed: true,
                    value: 1,
                },
            ]
        );
    }
}
