//! SQLite-based workout storage.
//!
//! Provides persistent storage for:
//! - Logged sessions and their sets
//! - User-created workout plans
//! - Key-value store for application state (the running timer snapshot)

use chrono::{Datelike, NaiveDate, Utc};
use indexmap::IndexMap;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

use super::data_dir;
use super::store::{DateRange, WorkoutStore};
use crate::error::{Result, StoreError, ValidationError};
use crate::stats::{PersonalRecord, PersonalRecordDetector};
use crate::timer::{SnapshotStore, TimerSnapshot};
use crate::workout::{NewSession, PlannedExercise, SetRecord, WorkoutPlan, WorkoutSession};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite database for workout storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/ironlog/ironlog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(data_dir()?.join("ironlog.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened workout database");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS sessions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                date        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sets (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id   INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                exercise_key TEXT,
                weight       REAL NOT NULL,
                reps         INTEGER NOT NULL,
                ord          INTEGER NOT NULL,
                is_warmup    INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS plans (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL UNIQUE COLLATE NOCASE,
                exercises   TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
            CREATE INDEX IF NOT EXISTS idx_sets_session ON sets(session_id, ord);
            CREATE INDEX IF NOT EXISTS idx_sets_exercise ON sets(exercise_key);",
        )?;
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Store `session` and report the personal records it set.
    ///
    /// Records are computed against the history as it stood before this
    /// session, inside the same transaction that inserts it.
    pub fn finish_session(
        &mut self,
        session: &NewSession,
    ) -> Result<(WorkoutSession, Vec<PersonalRecord>), StoreError> {
        let tx = self.conn.transaction()?;
        let history = Self::query_sets(&tx)?;
        let records = PersonalRecordDetector::new().detect(&history, &session.sets);
        let stored = Self::insert_session(&tx, session)?;
        tx.commit()?;

        tracing::info!(
            session_id = stored.id,
            sets = stored.sets.len(),
            personal_records = records.len(),
            "session finished"
        );
        Ok((stored, records))
    }

    /// Delete a session and its sets. Returns whether it existed.
    pub fn delete_session(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Dates of every logged session, oldest first.
    pub fn session_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM sessions ORDER BY date, id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut dates = Vec::new();
        for raw in rows {
            dates.push(parse_date(&raw?)?);
        }
        Ok(dates)
    }

    fn insert_session(tx: &Transaction<'_>, session: &NewSession) -> Result<WorkoutSession, StoreError> {
        tx.execute(
            "INSERT INTO sessions (date, created_at) VALUES (?1, ?2)",
            params![
                session.date.format(DATE_FORMAT).to_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        let id = tx.last_insert_rowid();

        let mut stored = Vec::with_capacity(session.sets.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sets (session_id, exercise_key, weight, reps, ord, is_warmup)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for set in session.sets.iter().filter(|s| !s.is_empty()) {
                let order = stored.len() as u32 + 1;
                stmt.execute(params![
                    id,
                    set.exercise_key,
                    set.weight,
                    set.reps,
                    order,
                    set.is_warmup
                ])?;
                stored.push(SetRecord {
                    order,
                    ..set.clone()
                });
            }
        }

        Ok(WorkoutSession {
            id,
            date: session.date,
            sets: stored,
        })
    }

    fn query_sets(conn: &Connection) -> Result<Vec<SetRecord>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT exercise_key, weight, reps, ord, is_warmup FROM sets ORDER BY session_id, ord",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SetRecord {
                exercise_key: row.get(0)?,
                weight: row.get(1)?,
                reps: row.get(2)?,
                order: row.get(3)?,
                is_warmup: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ── Plans ────────────────────────────────────────────────────────

    /// Store a user plan. Names are unique ignoring case and may not
    /// shadow a built-in plan.
    pub fn save_plan(&mut self, plan: &WorkoutPlan) -> Result<()> {
        if WorkoutPlan::builtin(&plan.name).is_some() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: format!("'{}' is a built-in plan", plan.name),
            }
            .into());
        }
        let exercises = serde_json::to_string(&plan.exercises)?;
        let inserted = self.conn.execute(
            "INSERT INTO plans (name, exercises, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO NOTHING",
            params![plan.name, exercises, Utc::now().to_rfc3339()],
        )?;
        if inserted == 0 {
            return Err(StoreError::Duplicate {
                table: "plans",
                key: plan.name.clone(),
            }
            .into());
        }
        tracing::info!(plan = %plan.name, exercises = plan.exercises.len(), "plan saved");
        Ok(())
    }

    /// Built-in plans first, then user plans in creation order.
    pub fn plans(&self) -> Result<Vec<WorkoutPlan>, StoreError> {
        let mut plans = WorkoutPlan::builtins();
        let mut stmt = self
            .conn
            .prepare("SELECT name, exercises FROM plans ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (name, exercises) = row?;
            plans.push(decode_plan(name, &exercises)?);
        }
        Ok(plans)
    }

    /// Look a plan up by name, ignoring case.
    pub fn plan(&self, name: &str) -> Result<Option<WorkoutPlan>, StoreError> {
        if let Some(plan) = WorkoutPlan::builtin(name) {
            return Ok(Some(plan));
        }
        let row = self
            .conn
            .query_row(
                "SELECT name, exercises FROM plans WHERE name = ?1",
                params![name.trim()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        row.map(|(name, exercises)| decode_plan(name, &exercises))
            .transpose()
    }

    /// Delete a user plan. Built-in plans are never in the table, so this
    /// returns `false` for them.
    pub fn delete_plan(&mut self, name: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM plans WHERE name = ?1", params![name.trim()])?;
        Ok(removed > 0)
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl WorkoutStore for Database {
    fn sessions(&self, range: Option<DateRange>) -> Result<Vec<WorkoutSession>, StoreError> {
        let (start, end) = match range {
            Some(r) => (sql_date(r.start), sql_date(r.end)),
            None => ("0000-01-01".to_string(), "9999-12-31".to_string()),
        };

        let mut sessions: IndexMap<i64, WorkoutSession> = IndexMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT id, date FROM sessions
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date, id",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, date) = row?;
            sessions.insert(
                id,
                WorkoutSession {
                    id,
                    date: parse_date(&date)?,
                    sets: Vec::new(),
                },
            );
        }

        let mut stmt = self.conn.prepare(
            "SELECT s.session_id, s.exercise_key, s.weight, s.reps, s.ord, s.is_warmup
             FROM sets s JOIN sessions w ON w.id = s.session_id
             WHERE w.date >= ?1 AND w.date <= ?2
             ORDER BY s.session_id, s.ord",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                SetRecord {
                    exercise_key: row.get(1)?,
                    weight: row.get(2)?,
                    reps: row.get(3)?,
                    order: row.get(4)?,
                    is_warmup: row.get(5)?,
                },
            ))
        })?;
        for row in rows {
            let (session_id, set) = row?;
            match sessions.get_mut(&session_id) {
                Some(session) => session.sets.push(set),
                None => {
                    return Err(StoreError::CorruptRow {
                        table: "sets",
                        message: format!("set references missing session {session_id}"),
                    })
                }
            }
        }

        Ok(sessions.into_values().collect())
    }

    fn historical_sets(&self) -> Result<Vec<SetRecord>, StoreError> {
        Self::query_sets(&self.conn)
    }

    fn append_session(&mut self, session: &NewSession) -> Result<WorkoutSession, StoreError> {
        let tx = self.conn.transaction()?;
        let stored = Self::insert_session(&tx, session)?;
        tx.commit()?;
        Ok(stored)
    }
}

impl SnapshotStore for Database {
    fn get(&self, key: &str) -> Option<TimerSnapshot> {
        match self.kv_get(key) {
            Ok(raw) => raw.as_deref().and_then(TimerSnapshot::from_json),
            Err(e) => {
                tracing::warn!(error = %e, key, "failed to read timer snapshot");
                None
            }
        }
    }

    fn contains_key(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.kv_get(key)?.is_some())
    }

    fn set(&mut self, key: &str, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        let raw = snapshot
            .to_json()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        self.kv_set(key, &raw)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.kv_delete(key)
    }
}

fn decode_plan(name: String, exercises: &str) -> Result<WorkoutPlan, StoreError> {
    let exercises: Vec<PlannedExercise> =
        serde_json::from_str(exercises).map_err(|e| StoreError::CorruptRow {
            table: "plans",
            message: format!("bad exercises for '{name}': {e}"),
        })?;
    Ok(WorkoutPlan {
        name,
        exercises,
        builtin: false,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| StoreError::CorruptRow {
        table: "sessions",
        message: format!("bad date '{raw}': {e}"),
    })
}

/// Format `date` for text comparison, clamped to four-digit years.
fn sql_date(date: NaiveDate) -> String {
    if date.year() > 9999 {
        "9999-12-31".to_string()
    } else if date.year() < 0 {
        "0000-01-01".to_string()
    } else {
        date.format(DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::timer::{Phase, SNAPSHOT_KEY};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn session(date: NaiveDate, sets: Vec<SetRecord>) -> NewSession {
        NewSession::new(date, sets).unwrap()
    }

    #[test]
    fn append_and_read_back_in_order() {
        let mut db = Database::open_memory().unwrap();
        db.append_session(&session(
            date(10, 12),
            vec![
                SetRecord::warmup("Squat", 60.0, 5),
                SetRecord::working("Squat", 100.0, 5),
            ],
        ))
        .unwrap();
        db.append_session(&session(date(10, 5), vec![SetRecord::working("Bench Press", 80.0, 8)]))
            .unwrap();

        let sessions = db.sessions(None).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].date, date(10, 5));
        assert_eq!(sessions[1].sets.len(), 2);
        assert!(sessions[1].sets[0].is_warmup);
        assert_eq!(sessions[1].sets[1].order, 2);
        assert_eq!(sessions[1].volume(), 800.0);
        assert_eq!(db.historical_sets().unwrap().len(), 3);
    }

    #[test]
    fn sessions_respect_inclusive_range() {
        let mut db = Database::open_memory().unwrap();
        for d in [5, 12, 19] {
            db.append_session(&session(date(10, d), vec![SetRecord::working("Squat", 100.0, 5)]))
                .unwrap();
        }
        let range = DateRange::new(date(10, 12), date(10, 19)).unwrap();
        let dates: Vec<_> = db
            .sessions(Some(range))
            .unwrap()
            .into_iter()
            .map(|s| s.date)
            .collect();
        assert_eq!(dates, vec![date(10, 12), date(10, 19)]);
        assert_eq!(db.sessions(Some(DateRange::since(date(10, 13)))).unwrap().len(), 1);
    }

    #[test]
    fn finish_session_compares_against_prior_history() {
        let mut db = Database::open_memory().unwrap();
        let (_, first) = db
            .finish_session(&session(date(10, 5), vec![SetRecord::working("Bench Press", 100.0, 5)]))
            .unwrap();
        assert_eq!(first.len(), 1);

        let (_, tie) = db
            .finish_session(&session(date(10, 12), vec![SetRecord::working("Bench Press", 100.0, 3)]))
            .unwrap();
        assert!(tie.is_empty());

        let (stored, pr) = db
            .finish_session(&session(
                date(10, 19),
                vec![
                    SetRecord::warmup("Bench Press", 120.0, 1),
                    SetRecord::working("Bench Press", 100.5, 2),
                ],
            ))
            .unwrap();
        assert_eq!(stored.sets.len(), 2);
        assert_eq!(
            pr,
            vec![PersonalRecord {
                exercise_key: "Bench Press".into(),
                new_best_weight: 100.5,
            }]
        );
        assert_eq!(db.session_dates().unwrap().len(), 3);
    }

    #[test]
    fn empty_sets_are_not_stored() {
        let mut db = Database::open_memory().unwrap();
        let raw = NewSession {
            date: date(10, 19),
            sets: vec![
                SetRecord::working("Squat", 0.0, 0),
                SetRecord::working("Squat", 100.0, 5),
            ],
        };
        let stored = db.append_session(&raw).unwrap();
        assert_eq!(stored.sets.len(), 1);
        assert_eq!(stored.sets[0].order, 1);
        assert_eq!(db.historical_sets().unwrap().len(), 1);
    }

    #[test]
    fn delete_session_removes_its_sets() {
        let mut db = Database::open_memory().unwrap();
        let stored = db
            .append_session(&session(date(10, 19), vec![SetRecord::working("Squat", 100.0, 5)]))
            .unwrap();
        assert!(db.delete_session(stored.id).unwrap());
        assert!(!db.delete_session(stored.id).unwrap());
        assert!(db.historical_sets().unwrap().is_empty());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn snapshot_store_roundtrip_and_garbage() {
        let mut db = Database::open_memory().unwrap();
        let snapshot = TimerSnapshot {
            phase: Phase::Rest,
            time_left_seconds: 42,
            current_set: 3,
            work_duration_seconds: 90,
            rest_duration_seconds: 120,
            saved_at_epoch_millis: 1_760_000_000_000,
        };
        db.set(SNAPSHOT_KEY, &snapshot).unwrap();
        assert_eq!(SnapshotStore::get(&db, SNAPSHOT_KEY), Some(snapshot));

        db.kv_set(SNAPSHOT_KEY, "{not json").unwrap();
        assert_eq!(SnapshotStore::get(&db, SNAPSHOT_KEY), None);

        SnapshotStore::delete(&mut db, SNAPSHOT_KEY).unwrap();
        assert!(db.kv_get(SNAPSHOT_KEY).unwrap().is_none());
    }

    #[test]
    fn plans_are_stored_after_builtins() {
        let mut db = Database::open_memory().unwrap();
        assert_eq!(db.plans().unwrap().len(), 2);

        let push = WorkoutPlan::new(
            "Push Day",
            vec![
                PlannedExercise::new("Bench Press", 4, "6-8"),
                PlannedExercise::new("Dips", 3, "8-12"),
            ],
        )
        .unwrap();
        db.save_plan(&push).unwrap();

        let plans = db.plans().unwrap();
        let names: Vec<_> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Day A", "Day B", "Push Day"]);
        assert_eq!(plans[2], push);
        assert_eq!(db.plan("push day").unwrap(), Some(push));
        assert!(db.plan("Day A").unwrap().unwrap().builtin);
        assert!(db.plan("Pull Day").unwrap().is_none());
    }

    #[test]
    fn plan_names_are_unique_and_builtins_reserved() {
        let mut db = Database::open_memory().unwrap();
        let legs = |name: &str| {
            WorkoutPlan::new(name, vec![PlannedExercise::new("Squat", 5, "5")]).unwrap()
        };
        db.save_plan(&legs("Legs")).unwrap();
        assert!(matches!(
            db.save_plan(&legs("LEGS")),
            Err(CoreError::Store(StoreError::Duplicate { table: "plans", .. }))
        ));
        assert!(matches!(
            db.save_plan(&legs("day a")),
            Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));

        assert!(!db.delete_plan("Day A").unwrap());
        assert!(db.delete_plan("legs").unwrap());
        assert!(!db.delete_plan("Legs").unwrap());
        assert_eq!(db.plans().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_plan_row_is_reported() {
        let db = Database::open_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO plans (name, exercises, created_at) VALUES ('Broken', '[{', '')",
                [],
            )
            .unwrap();
        assert!(matches!(
            db.plan("Broken"),
            Err(StoreError::CorruptRow { table: "plans", .. })
        ));
    }

    #[test]
    fn reopening_a_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ironlog.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            db.append_session(&session(date(10, 19), vec![SetRecord::working("Squat", 100.0, 5)]))
                .unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.sessions(None).unwrap().len(), 1);
    }

    #[test]
    fn open_at_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("ironlog.db");
        assert!(matches!(
            Database::open_at(&path),
            Err(StoreError::OpenFailed { .. })
        ));
    }
}
