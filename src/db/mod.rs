//! Database module - SQLite storage for workout records

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One logged workout
///
/// `id` is the SQLite rowid, assigned on insert and stable for the record's
/// lifetime. Equality compares the five attributes and ignores `id`; the
/// day-index dedup relies on that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: Option<i64>,
    pub workout_type: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl PartialEq for Workout {
    fn eq(&self, other: &Self) -> bool {
        self.workout_type == other.workout_type
            && self.sets == other.sets
            && self.reps == other.reps
            && self.date == other.date
            && self.notes == other.notes
    }
}

impl Eq for Workout {}

/// Store wrapper - sole reader/writer of the workouts table
pub struct WorkoutStore {
    conn: Connection,
}

impl WorkoutStore {
    /// Open or create the store at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_type TEXT,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                date TEXT,
                notes TEXT
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert a new workout and return it with its fresh id
    pub fn add(&self, workout: &Workout) -> Result<Workout> {
        self.conn.execute(
            "INSERT INTO workouts (workout_type, sets, reps, date, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                workout.workout_type,
                workout.sets,
                workout.reps,
                workout.date.map(|d| d.to_rfc3339()),
                workout.notes,
            ],
        )?;
        Ok(Workout {
            id: Some(self.conn.last_insert_rowid()),
            ..workout.clone()
        })
    }

    /// Get all workouts in storage order
    pub fn list(&self) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workout_type, sets, reps, date, notes FROM workouts",
        )?;

        let workouts = stmt
            .query_map([], |row| {
                let date_str: Option<String> = row.get(4)?;
                Ok(Workout {
                    id: Some(row.get(0)?),
                    workout_type: row.get(1)?,
                    sets: row.get(2)?,
                    reps: row.get(3)?,
                    date: date_str.and_then(|s| {
                        DateTime::parse_from_rfc3339(&s)
                            .map(|d| d.with_timezone(&Utc))
                            .ok()
                    }),
                    notes: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(workouts)
    }

    /// Delete a workout by its stable id
    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM workouts WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> WorkoutStore {
        let path = dir.path().join("fittrack.db");
        WorkoutStore::open(path.to_str().unwrap()).unwrap()
    }

    fn squat(date: Option<DateTime<Utc>>) -> Workout {
        Workout {
            id: None,
            workout_type: Some("Squat".to_string()),
            sets: 3,
            reps: 10,
            date,
            notes: Some(String::new()),
        }
    }

    #[test]
    fn test_add_then_list_round_trips_attributes() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let date = Utc.with_ymd_and_hms(2024, 3, 14, 18, 30, 0).unwrap();
        let saved = store.add(&squat(Some(date))).unwrap();
        assert!(saved.id.is_some());

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].workout_type.as_deref(), Some("Squat"));
        assert_eq!(listed[0].sets, 3);
        assert_eq!(listed[0].reps, 10);
        assert_eq!(listed[0].date, Some(date));
        assert_eq!(listed[0].notes.as_deref(), Some(""));
    }

    #[test]
    fn test_ids_are_fresh_and_unique() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let a = store.add(&squat(None)).unwrap();
        let b = store.add(&squat(None)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_delete_removes_by_id() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let a = store.add(&squat(None)).unwrap();
        let b = store.add(&squat(None)).unwrap();

        store.delete(a.id.unwrap()).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);
    }

    #[test]
    fn test_absent_fields_survive_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let bare = Workout {
            id: None,
            workout_type: None,
            sets: 0,
            reps: 0,
            date: None,
            notes: None,
        };
        store.add(&bare).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0].workout_type, None);
        assert_eq!(listed[0].date, None);
        assert_eq!(listed[0].notes, None);
    }

    #[test]
    fn test_value_equality_ignores_id() {
        let a = Workout { id: Some(1), ..squat(None) };
        let b = Workout { id: Some(2), ..squat(None) };
        assert_eq!(a, b);
    }

    #[test]
    fn test_log_view_delete_scenario() {
        use crate::grouping::{DayIndex, DayKey};

        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let date = Utc.with_ymd_and_hms(2024, 3, 14, 18, 30, 0).unwrap();
        let saved = store.add(&squat(Some(date))).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], squat(Some(date)));

        let index = DayIndex::build(&listed);
        let key = DayKey::for_workout(&listed[0]);
        assert!(matches!(key, DayKey::Day(_)));
        assert_eq!(index.bucket(&key).len(), 1);

        store.delete(saved.id.unwrap()).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fittrack.db");

        {
            let store = WorkoutStore::open(path.to_str().unwrap()).unwrap();
            store.add(&squat(None)).unwrap();
        }

        let store = WorkoutStore::open(path.to_str().unwrap()).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
