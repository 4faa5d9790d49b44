//! Occupancy window helpers
//!
//! The occupancy report covers the inclusive window `[today, today + 6]`.
//! Days without reservations must still appear, so the map is seeded with
//! zeros before the per-day sums are merged in.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

/// Number of days covered by the occupancy report.
pub const OCCUPANCY_WINDOW_DAYS: i64 = 7;

/// The seven dates of the occupancy window, starting at `today`.
pub fn occupancy_window(today: NaiveDate) -> Vec<NaiveDate> {
    (0..OCCUPANCY_WINDOW_DAYS)
        .map(|offset| today + Duration::days(offset))
        .collect()
}

/// Merge per-day sums into a zero-seeded map over the window.
pub fn seed_occupancy(
    window: &[NaiveDate],
    sums: impl IntoIterator<Item = (NaiveDate, i64)>,
) -> BTreeMap<NaiveDate, i64> {
    let mut by_day: BTreeMap<NaiveDate, i64> = window.iter().map(|d| (*d, 0)).collect();
    for (date, people) in sums {
        // Sums outside the window are the store's bug, not the report's
        if let Some(entry) = by_day.get_mut(&date) {
            *entry = people;
        }
    }
    by_day
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn window_is_seven_consecutive_days_inclusive() {
        let window = occupancy_window(date("2025-06-01"));
        assert_eq!(window.len(), 7);
        assert_eq!(window[0], date("2025-06-01"));
        assert_eq!(window[6], date("2025-06-07"));
    }

    #[test]
    fn seeding_reports_zero_for_empty_days() {
        let window = occupancy_window(date("2025-06-01"));
        let by_day = seed_occupancy(&window, [(date("2025-06-03"), 8)]);
        assert_eq!(by_day.len(), 7);
        assert_eq!(by_day[&date("2025-06-03")], 8);
        assert_eq!(by_day[&date("2025-06-01")], 0);
        assert_eq!(by_day[&date("2025-06-07")], 0);
    }

    #[test]
    fn sums_outside_the_window_are_ignored() {
        let window = occupancy_window(date("2025-06-01"));
        let by_day = seed_occupancy(&window, [(date("2025-06-20"), 12)]);
        assert!(by_day.values().all(|&v| v == 0));
    }
}
