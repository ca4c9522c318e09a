//! Database schema migrations for questboard.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration
//! version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema
/// version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: per-day due times on quests.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    if !column_exists(conn, "quests", "due_time")? {
        conn.execute("ALTER TABLE quests ADD COLUMN due_time TEXT", [])?;
    }
    set_schema_version(conn, 1)
}

/// v2: nicknames on profiles, used by assignee resolution.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    if !column_exists(conn, "profiles", "nickname")? {
        conn.execute("ALTER TABLE profiles ADD COLUMN nickname TEXT", [])?;
    }
    set_schema_version(conn, 2)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> SqliteResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_schema(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE quests (id TEXT PRIMARY KEY, title TEXT NOT NULL);
             CREATE TABLE profiles (id TEXT PRIMARY KEY, display_name TEXT NOT NULL);",
        )
        .unwrap();
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        base_schema(&conn);
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
        assert!(column_exists(&conn, "quests", "due_time").unwrap());
        assert!(column_exists(&conn, "profiles", "nickname").unwrap());
    }
}
