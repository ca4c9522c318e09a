//! SQLite-based storage for quests, completion records, and the family
//! roster.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError};
use crate::quest::{CompletionRecord, FamilyMember, Quest, Recurrence, TimeOfDay};

// === Helper Functions ===

/// Parse recurrence from database string
fn parse_recurrence(raw: &str) -> Recurrence {
    match raw {
        "daily" => Recurrence::Daily,
        "weekly" => Recurrence::Weekly,
        _ => Recurrence::None,
    }
}

/// Format recurrence for database storage
fn format_recurrence(recurrence: Recurrence) -> &'static str {
    match recurrence {
        Recurrence::None => "none",
        Recurrence::Daily => "daily",
        Recurrence::Weekly => "weekly",
    }
}

/// Parse time-of-day bucket from database string
fn parse_time_of_day(raw: &str) -> TimeOfDay {
    match raw {
        "morning" => TimeOfDay::Morning,
        "afternoon" => TimeOfDay::Afternoon,
        "evening" => TimeOfDay::Evening,
        _ => TimeOfDay::AnyTime,
    }
}

/// Format time-of-day bucket for database storage
fn format_time_of_day(time_of_day: TimeOfDay) -> &'static str {
    match time_of_day {
        TimeOfDay::Morning => "morning",
        TimeOfDay::Afternoon => "afternoon",
        TimeOfDay::Evening => "evening",
        TimeOfDay::AnyTime => "any_time",
    }
}

/// Parse a calendar date stored as YYYY-MM-DD
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a due time stored as HH:MM
fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a Quest from a database row
fn row_to_quest(row: &rusqlite::Row) -> Result<Quest, rusqlite::Error> {
    let time_of_day_str: String = row.get(6)?;
    let recurrence_str: String = row.get(7)?;
    let anchor_str: Option<String> = row.get(8)?;
    let due_str: Option<String> = row.get(9)?;
    let created_str: String = row.get(12)?;
    let updated_str: String = row.get(13)?;

    Ok(Quest {
        id: row.get(0)?,
        family_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        assignee_id: row.get(4)?,
        points: row.get(5)?,
        time_of_day: parse_time_of_day(&time_of_day_str),
        recurrence: parse_recurrence(&recurrence_str),
        anchor_date: anchor_str.as_deref().and_then(parse_date),
        due_time: due_str.as_deref().and_then(parse_time),
        completed: row.get(10)?,
        created_by: row.get(11)?,
        created_at: parse_datetime_fallback(&created_str),
        updated_at: parse_datetime_fallback(&updated_str),
    })
}

const QUEST_COLUMNS: &str = "id, family_id, title, description, assignee_id, points, \
     time_of_day, recurrence, anchor_date, due_time, completed, created_by, \
     created_at, updated_at";

fn row_to_completion(row: &rusqlite::Row) -> Result<CompletionRecord, rusqlite::Error> {
    let completed_on: Option<String> = row.get(4)?;
    let created_str: String = row.get(5)?;
    Ok(CompletionRecord {
        id: row.get(0)?,
        quest_id: row.get(1)?,
        completed_by: row.get(2)?,
        points: row.get(3)?,
        completed_on: completed_on.as_deref().and_then(parse_date),
        created_at: parse_datetime_fallback(&created_str),
    })
}

fn row_to_member(row: &rusqlite::Row) -> Result<FamilyMember, rusqlite::Error> {
    Ok(FamilyMember {
        id: row.get(0)?,
        family_id: row.get(1)?,
        display_name: row.get(2)?,
        nickname: row.get(3)?,
        points: row.get(4)?,
    })
}

/// SQLite database for quest storage.
///
/// Stores quest definitions, completion records, member profiles, and a
/// small key-value store for caller state.
pub struct QuestDb {
    conn: Connection,
}

impl QuestDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/questboard/questboard.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("questboard.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate().map_err(DatabaseError::from)?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate().map_err(DatabaseError::from)?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // Create base tables (v1 schema) first
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS quests (
                id          TEXT PRIMARY KEY,
                family_id   TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT,
                assignee_id TEXT,
                points      INTEGER NOT NULL DEFAULT 0,
                time_of_day TEXT NOT NULL DEFAULT 'any_time',
                recurrence  TEXT NOT NULL DEFAULT 'none',
                anchor_date TEXT,
                completed   INTEGER NOT NULL DEFAULT 0,
                created_by  TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id           TEXT PRIMARY KEY,
                quest_id     TEXT NOT NULL,
                completed_by TEXT NOT NULL,
                points       INTEGER NOT NULL,
                completed_on TEXT,
                created_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id           TEXT PRIMARY KEY,
                family_id    TEXT NOT NULL,
                display_name TEXT NOT NULL,
                points       INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_quests_family_anchor ON quests(family_id, anchor_date);
            CREATE INDEX IF NOT EXISTS idx_completions_quest_date ON completions(quest_id, completed_on);",
        )?;

        // Run incremental migrations (v1 -> v2, etc.)
        migrations::migrate(&self.conn)?;

        // One completion record per recurring occurrence, even under
        // concurrent clients. One-off quests store NULL here and are guarded
        // by the quest row's own completed flag instead.
        self.conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_completions_occurrence
             ON completions(quest_id, completed_on)
             WHERE completed_on IS NOT NULL",
            [],
        )?;

        Ok(())
    }

    // === Quest CRUD ===

    /// Create a new quest.
    pub fn create_quest(&self, quest: &Quest) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO quests (id, family_id, title, description, assignee_id, points,
                                 time_of_day, recurrence, anchor_date, due_time, completed,
                                 created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                quest.id,
                quest.family_id,
                quest.title,
                quest.description,
                quest.assignee_id,
                quest.points,
                format_time_of_day(quest.time_of_day),
                format_recurrence(quest.recurrence),
                quest.anchor_date.map(format_date),
                quest.due_time.map(format_time),
                quest.completed,
                quest.created_by,
                quest.created_at.to_rfc3339(),
                quest.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_quest(&self, id: &str) -> Result<Option<Quest>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {QUEST_COLUMNS} FROM quests WHERE id = ?1"))?;
        let quest = stmt.query_row(params![id], row_to_quest).optional()?;
        Ok(quest)
    }

    pub fn list_quests(&self, family_id: &str) -> Result<Vec<Quest>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests WHERE family_id = ?1 ORDER BY created_at ASC"
        ))?;
        let rows = stmt.query_map(params![family_id], row_to_quest)?;
        let mut quests = Vec::new();
        for row in rows {
            quests.push(row?);
        }
        Ok(quests)
    }

    /// Update a quest definition in place.
    pub fn update_quest(&self, quest: &Quest) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE quests
             SET title = ?2, description = ?3, assignee_id = ?4, points = ?5,
                 time_of_day = ?6, recurrence = ?7, anchor_date = ?8, due_time = ?9,
                 completed = ?10, updated_at = ?11
             WHERE id = ?1",
            params![
                quest.id,
                quest.title,
                quest.description,
                quest.assignee_id,
                quest.points,
                format_time_of_day(quest.time_of_day),
                format_recurrence(quest.recurrence),
                quest.anchor_date.map(format_date),
                quest.due_time.map(format_time),
                quest.completed,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Delete a quest and its completion records.
    pub fn delete_quest(&self, id: &str) -> Result<bool, DatabaseError> {
        self.conn
            .execute("DELETE FROM completions WHERE quest_id = ?1", params![id])?;
        let deleted = self
            .conn
            .execute("DELETE FROM quests WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Flip the one-off completed flag on the quest row.
    pub fn set_quest_completed(&self, id: &str, completed: bool) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE quests SET completed = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, completed, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Quests that could be due on `date`: anchor date set and not after it.
    ///
    /// The anchor filter runs in SQL so resolution never scans quests that
    /// start in the future, and quests without an anchor never surface.
    pub fn due_candidates(
        &self,
        family_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Quest>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests
             WHERE family_id = ?1 AND anchor_date IS NOT NULL AND anchor_date <= ?2
             ORDER BY created_at ASC"
        ))?;
        let rows = stmt.query_map(params![family_id, format_date(date)], row_to_quest)?;
        let mut quests = Vec::new();
        for row in rows {
            quests.push(row?);
        }
        Ok(quests)
    }

    // === Completion records ===

    /// Insert a completion record.
    pub fn insert_completion(&self, record: &CompletionRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO completions (id, quest_id, completed_by, points, completed_on, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.quest_id,
                record.completed_by,
                record.points,
                record.completed_on.map(format_date),
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Complete a one-off quest: flip its flag and log the record in one
    /// transaction, so a failure cannot leave the two halves disagreeing.
    pub fn complete_one_time(&mut self, record: &CompletionRecord) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE quests SET completed = 1, updated_at = ?2 WHERE id = ?1",
            params![record.quest_id, Utc::now().to_rfc3339()],
        )?;
        tx.execute(
            "INSERT INTO completions (id, quest_id, completed_by, points, completed_on, created_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![
                record.id,
                record.quest_id,
                record.completed_by,
                record.points,
                record.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete the completion record for one recurring occurrence.
    pub fn delete_completion(
        &self,
        quest_id: &str,
        date: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        let deleted = self.conn.execute(
            "DELETE FROM completions WHERE quest_id = ?1 AND completed_on = ?2",
            params![quest_id, format_date(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Quest ids among `quest_ids` that have a completion record on `date`.
    pub fn completions_on(
        &self,
        quest_ids: &[String],
        date: NaiveDate,
    ) -> Result<HashSet<String>, DatabaseError> {
        if quest_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let placeholders = vec!["?"; quest_ids.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT quest_id FROM completions
             WHERE completed_on = ? AND quest_id IN ({placeholders})"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let date_str = format_date(date);
        let mut sql_params: Vec<&dyn rusqlite::ToSql> = vec![&date_str];
        for id in quest_ids {
            sql_params.push(id);
        }

        let rows = stmt.query_map(sql_params.as_slice(), |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// All completion records for one quest, oldest first.
    pub fn completions_for_quest(
        &self,
        quest_id: &str,
    ) -> Result<Vec<CompletionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, quest_id, completed_by, points, completed_on, created_at
             FROM completions WHERE quest_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![quest_id], row_to_completion)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    // === Family roster ===

    /// Insert or update a member profile. Points are preserved on update.
    pub fn upsert_member(&self, member: &FamilyMember) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO profiles (id, family_id, display_name, nickname, points)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 family_id = excluded.family_id,
                 display_name = excluded.display_name,
                 nickname = excluded.nickname",
            params![
                member.id,
                member.family_id,
                member.display_name,
                member.nickname,
                member.points,
            ],
        )?;
        Ok(())
    }

    pub fn get_member(&self, id: &str) -> Result<Option<FamilyMember>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, family_id, display_name, nickname, points FROM profiles WHERE id = ?1",
        )?;
        let member = stmt.query_row(params![id], row_to_member).optional()?;
        Ok(member)
    }

    pub fn list_members(&self, family_id: &str) -> Result<Vec<FamilyMember>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, family_id, display_name, nickname, points
             FROM profiles WHERE family_id = ?1 ORDER BY display_name ASC",
        )?;
        let rows = stmt.query_map(params![family_id], row_to_member)?;
        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    pub fn remove_member(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Add a point delta to a member's running total.
    ///
    /// The core computes the delta; applying it to the aggregate is this
    /// layer's job. Unknown members are an error, not a silent no-op.
    pub fn add_points(&self, member_id: &str, delta: i64) -> Result<(), DatabaseError> {
        let updated = self.conn.execute(
            "UPDATE profiles SET points = points + ?2 WHERE id = ?1",
            params![member_id, delta],
        )?;
        if updated == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "unknown member: {member_id}"
            )));
        }
        Ok(())
    }

    /// A member's running point total (0 for unknown members).
    pub fn member_points(&self, member_id: &str) -> Result<i64, DatabaseError> {
        let points = self
            .conn
            .query_row(
                "SELECT points FROM profiles WHERE id = ?1",
                params![member_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(points.unwrap_or(0))
    }

    // === Key-value store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quest_round_trip() {
        let db = QuestDb::open_memory().unwrap();
        let mut quest = Quest::new(
            "fam-1",
            "Vacuum the stairs",
            15,
            Recurrence::Weekly,
            Some(date(2025, 3, 3)),
            "member-1",
        );
        quest.due_time = NaiveTime::from_hms_opt(18, 30, 0);
        quest.description = Some("Top to bottom".to_string());
        db.create_quest(&quest).unwrap();

        let loaded = db.get_quest(&quest.id).unwrap().unwrap();
        assert_eq!(loaded.title, quest.title);
        assert_eq!(loaded.recurrence, Recurrence::Weekly);
        assert_eq!(loaded.anchor_date, quest.anchor_date);
        assert_eq!(loaded.due_time, quest.due_time);
        assert_eq!(loaded.points, 15);
    }

    #[test]
    fn due_candidates_filters_anchor_in_sql() {
        let db = QuestDb::open_memory().unwrap();
        let past = Quest::new("fam-1", "Past", 5, Recurrence::Daily, Some(date(2025, 3, 1)), "m");
        let future = Quest::new("fam-1", "Future", 5, Recurrence::Daily, Some(date(2025, 4, 1)), "m");
        let unanchored = Quest::new("fam-1", "Unanchored", 5, Recurrence::Daily, None, "m");
        for q in [&past, &future, &unanchored] {
            db.create_quest(q).unwrap();
        }

        let candidates = db.due_candidates("fam-1", date(2025, 3, 10)).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Past");
    }

    #[test]
    fn unique_index_rejects_duplicate_occurrence() {
        let db = QuestDb::open_memory().unwrap();
        let quest = Quest::new("fam-1", "Dishes", 5, Recurrence::Daily, Some(date(2025, 3, 1)), "m");
        db.create_quest(&quest).unwrap();

        let first = CompletionRecord::new(&quest.id, "m", 5, Some(date(2025, 3, 10)));
        db.insert_completion(&first).unwrap();
        let dup = CompletionRecord::new(&quest.id, "m", 5, Some(date(2025, 3, 10)));
        assert!(db.insert_completion(&dup).is_err());

        // A different date is a different occurrence.
        let other = CompletionRecord::new(&quest.id, "m", 5, Some(date(2025, 3, 11)));
        db.insert_completion(&other).unwrap();
    }

    #[test]
    fn completions_on_batches_by_quest_id() {
        let db = QuestDb::open_memory().unwrap();
        let q1 = Quest::new("fam-1", "A", 5, Recurrence::Daily, Some(date(2025, 3, 1)), "m");
        let q2 = Quest::new("fam-1", "B", 5, Recurrence::Daily, Some(date(2025, 3, 1)), "m");
        db.create_quest(&q1).unwrap();
        db.create_quest(&q2).unwrap();
        db.insert_completion(&CompletionRecord::new(&q1.id, "m", 5, Some(date(2025, 3, 10))))
            .unwrap();

        let ids = vec![q1.id.clone(), q2.id.clone()];
        let done = db.completions_on(&ids, date(2025, 3, 10)).unwrap();
        assert!(done.contains(&q1.id));
        assert!(!done.contains(&q2.id));

        assert!(db.completions_on(&[], date(2025, 3, 10)).unwrap().is_empty());
    }

    #[test]
    fn member_points_accumulate() {
        let db = QuestDb::open_memory().unwrap();
        let member = FamilyMember::new("fam-1", "Sarah", None);
        db.upsert_member(&member).unwrap();

        db.add_points(&member.id, 10).unwrap();
        db.add_points(&member.id, 5).unwrap();
        assert_eq!(db.member_points(&member.id).unwrap(), 15);

        assert!(db.add_points("nobody", 5).is_err());
        assert_eq!(db.member_points("nobody").unwrap(), 0);
    }

    #[test]
    fn upsert_member_preserves_points() {
        let db = QuestDb::open_memory().unwrap();
        let mut member = FamilyMember::new("fam-1", "Sarah", None);
        db.upsert_member(&member).unwrap();
        db.add_points(&member.id, 25).unwrap();

        member.nickname = Some("Sar".to_string());
        db.upsert_member(&member).unwrap();

        let loaded = db.get_member(&member.id).unwrap().unwrap();
        assert_eq!(loaded.nickname.as_deref(), Some("Sar"));
        assert_eq!(loaded.points, 25);
    }

    #[test]
    fn kv_store() {
        let db = QuestDb::open_memory().unwrap();
        assert!(db.kv_get("history").unwrap().is_none());
        db.kv_set("history", "[]").unwrap();
        assert_eq!(db.kv_get("history").unwrap().unwrap(), "[]");
    }

    #[test]
    fn open_at_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questboard.db");

        let quest_id;
        {
            let db = QuestDb::open_at(&path).unwrap();
            let quest =
                Quest::new("fam-1", "Sweep", 5, Recurrence::Daily, Some(date(2025, 3, 1)), "m");
            db.create_quest(&quest).unwrap();
            quest_id = quest.id;
        }

        let db = QuestDb::open_at(&path).unwrap();
        assert!(db.get_quest(&quest_id).unwrap().is_some());
    }
}
