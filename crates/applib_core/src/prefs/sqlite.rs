//! SQLite-backed preference store.
//!
//! # Invariants
//! - Every read and write is scoped to this store's node.
//! - Connections come from [`crate::db`], so the schema is current before the
//!   first query.

use super::{validate_name, Preferences, PrefsResult};
use crate::db::migrations::apply_migrations;
use crate::db::{open_db, open_db_in_memory};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Preference node persisted in a SQLite database.
#[derive(Debug)]
pub struct SqlitePreferences {
    conn: Connection,
    node: String,
}

impl SqlitePreferences {
    /// Opens (or creates) `path` and scopes the store to `node`.
    pub fn open(path: impl AsRef<Path>, node: &str) -> PrefsResult<Self> {
        validate_name(node)?;
        let conn = open_db(path)?;
        Ok(Self::scoped(conn, node))
    }

    pub fn open_in_memory(node: &str) -> PrefsResult<Self> {
        validate_name(node)?;
        let conn = open_db_in_memory()?;
        Ok(Self::scoped(conn, node))
    }

    /// Wraps an existing connection, migrating it first if needed.
    pub fn from_connection(mut conn: Connection, node: &str) -> PrefsResult<Self> {
        validate_name(node)?;
        apply_migrations(&mut conn)?;
        Ok(Self::scoped(conn, node))
    }

    fn scoped(conn: Connection, node: &str) -> Self {
        Self {
            conn,
            node: node.to_string(),
        }
    }

    /// Gives the connection back, e.g. to reopen another node on it.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl Preferences for SqlitePreferences {
    fn node(&self) -> &str {
        self.node.as_str()
    }

    fn get_text(&self, name: &str) -> PrefsResult<Option<String>> {
        validate_name(name)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE node = ?1 AND name = ?2;",
                params![self.node.as_str(), name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_text(&mut self, name: &str, value: &str) -> PrefsResult<()> {
        validate_name(name)?;
        self.conn.execute(
            "INSERT INTO preferences (node, name, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(node, name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.node.as_str(), name, value, now_epoch_ms()],
        )?;
        debug!(
            "event=prefs_put module=prefs node={} name={} status=ok",
            self.node, name
        );
        Ok(())
    }

    fn remove(&mut self, name: &str) -> PrefsResult<bool> {
        validate_name(name)?;
        let changed = self.conn.execute(
            "DELETE FROM preferences WHERE node = ?1 AND name = ?2;",
            params![self.node.as_str(), name],
        )?;
        Ok(changed > 0)
    }

    fn names(&self) -> PrefsResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM preferences WHERE node = ?1 ORDER BY name ASC;")?;
        let rows = stmt.query_map(params![self.node.as_str()], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, saturating_millis)
}

fn saturating_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{saturating_millis, SqlitePreferences};
    use crate::prefs::{Preferences, PrefsError};
    use std::time::Duration;

    #[test]
    fn upsert_overwrites_existing_value() {
        let mut prefs = SqlitePreferences::open_in_memory("app").expect("open");
        prefs.put_int("window.size.width", 100).expect("first put");
        prefs.put_int("window.size.width", 640).expect("second put");
        assert_eq!(prefs.get_int("window.size.width", 0).expect("get"), 640);
        assert_eq!(prefs.names().expect("names"), vec!["window.size.width"]);
    }

    #[test]
    fn nodes_sharing_a_connection_are_isolated() {
        let mut first = SqlitePreferences::open_in_memory("first").expect("open");
        first.put_bool("window.maximized", true).expect("put");

        let second = SqlitePreferences::from_connection(first.into_connection(), "second")
            .expect("rescope");
        assert!(!second.contains("window.maximized").expect("contains"));
        assert!(second.names().expect("names").is_empty());
    }

    #[test]
    fn rejects_invalid_node() {
        let err = SqlitePreferences::open_in_memory("My App").expect_err("invalid node must fail");
        assert!(matches!(err, PrefsError::InvalidName(_)));
    }

    #[test]
    fn timestamp_millis_saturate_instead_of_wrapping() {
        assert_eq!(saturating_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(saturating_millis(Duration::MAX), i64::MAX);
    }
}
