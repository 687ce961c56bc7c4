//! Grouping module - day-keyed index over a workout snapshot
//!
//! Rebuilt from scratch on every refresh, never patched incrementally.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Local, NaiveDate};

use crate::db::Workout;

/// Grouping key: the local calendar day a workout falls on, or an explicit
/// bucket for workouts with no date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayKey {
    Day(NaiveDate),
    Unscheduled,
}

impl DayKey {
    /// Truncate a workout's timestamp to its local calendar day
    pub fn for_workout(workout: &Workout) -> DayKey {
        match workout.date {
            Some(d) => DayKey::Day(d.with_timezone(&Local).date_naive()),
            None => DayKey::Unscheduled,
        }
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayKey::Day(d) => write!(f, "{}", d.format("%A, %B %-d, %Y")),
            DayKey::Unscheduled => write!(f, "Unscheduled"),
        }
    }
}

/// Day-keyed view of the store's current contents
#[derive(Debug, Default)]
pub struct DayIndex {
    buckets: HashMap<DayKey, Vec<Workout>>,
}

impl DayIndex {
    /// Build the index from a list snapshot
    ///
    /// Within a bucket, workouts with identical attribute values collapse to a
    /// single entry even when their ids differ. Distinct legitimate workouts
    /// that happen to share every field are merged too; kept deliberately to
    /// match the app's established listing behavior.
    pub fn build(workouts: &[Workout]) -> Self {
        let mut buckets: HashMap<DayKey, Vec<Workout>> = HashMap::new();

        for workout in workouts {
            let bucket = buckets.entry(DayKey::for_workout(workout)).or_default();
            if !bucket.contains(workout) {
                bucket.push(workout.clone());
            }
        }

        Self { buckets }
    }

    /// Keys in display order: most recent day first, unscheduled last
    pub fn days(&self) -> Vec<DayKey> {
        let mut keys: Vec<DayKey> = self.buckets.keys().copied().collect();
        keys.sort_by(|a, b| match (a, b) {
            (DayKey::Day(x), DayKey::Day(y)) => y.cmp(x),
            (DayKey::Day(_), DayKey::Unscheduled) => Ordering::Less,
            (DayKey::Unscheduled, DayKey::Day(_)) => Ordering::Greater,
            (DayKey::Unscheduled, DayKey::Unscheduled) => Ordering::Equal,
        });
        keys
    }

    /// Workouts grouped under the given key
    pub fn bucket(&self, key: &DayKey) -> &[Workout] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn workout(id: i64, ty: &str, sets: i32, reps: i32, date: Option<DateTime<Utc>>) -> Workout {
        Workout {
            id: Some(id),
            workout_type: Some(ty.to_string()),
            sets,
            reps,
            date,
            notes: None,
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_groups_by_local_day() {
        let d = noon(2024, 3, 14);
        let index = DayIndex::build(&[workout(1, "Squat", 3, 10, Some(d))]);

        let key = DayKey::Day(d.with_timezone(&Local).date_naive());
        assert_eq!(index.bucket(&key).len(), 1);
        assert_eq!(index.days(), vec![key]);
    }

    #[test]
    fn test_identical_values_collapse_within_bucket() {
        let d = noon(2024, 3, 14);
        let index = DayIndex::build(&[
            workout(1, "Squat", 3, 10, Some(d)),
            workout(2, "Squat", 3, 10, Some(d)),
        ]);

        let key = DayKey::for_workout(&workout(1, "Squat", 3, 10, Some(d)));
        assert_eq!(index.bucket(&key).len(), 1);
    }

    #[test]
    fn test_distinct_values_both_survive() {
        let d = noon(2024, 3, 14);
        let index = DayIndex::build(&[
            workout(1, "Squat", 3, 10, Some(d)),
            workout(2, "Squat", 5, 5, Some(d)),
        ]);

        let key = DayKey::for_workout(&workout(1, "Squat", 3, 10, Some(d)));
        assert_eq!(index.bucket(&key).len(), 2);
    }

    #[test]
    fn test_days_descend_with_unscheduled_last() {
        let index = DayIndex::build(&[
            workout(1, "Row", 3, 8, Some(noon(2024, 3, 10))),
            workout(2, "Press", 3, 8, Some(noon(2024, 3, 20))),
            workout(3, "Curl", 3, 8, None),
            workout(4, "Squat", 3, 8, Some(noon(2024, 3, 15))),
        ]);

        let days = index.days();
        assert_eq!(days.len(), 4);
        assert_eq!(days[3], DayKey::Unscheduled);

        let dated: Vec<NaiveDate> = days[..3]
            .iter()
            .map(|k| match k {
                DayKey::Day(d) => *d,
                DayKey::Unscheduled => unreachable!(),
            })
            .collect();
        assert!(dated.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_undated_workouts_bucket_as_unscheduled() {
        let index = DayIndex::build(&[workout(1, "Plank", 1, 1, None)]);
        assert_eq!(index.bucket(&DayKey::Unscheduled).len(), 1);
    }

    #[test]
    fn test_empty_snapshot_builds_empty_index() {
        let index = DayIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.days().is_empty());
    }
}
