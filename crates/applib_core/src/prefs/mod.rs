//! Preference store collaborator.
//!
//! # Responsibility
//! - Define the key/value contract the application uses for window geometry
//!   and other small settings.
//! - Provide an in-memory store and a SQLite-backed store.
//!
//! # Invariants
//! - Names match `[a-z0-9]+([._-][a-z0-9]+)*`, e.g. `window.location.x`.
//! - Values are stored as text; typed getters fall back to the default only
//!   when the name is absent, never when the stored text fails to parse.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryPreferences;
pub use sqlite::SqlitePreferences;

static PREFERENCE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*$").expect("valid preference name regex")
});

pub type PrefsResult<T> = Result<T, PrefsError>;

#[derive(Debug)]
pub enum PrefsError {
    InvalidName(String),
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
    Sqlite(rusqlite::Error),
    /// The database was written by a newer build; it is never downgraded.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for PrefsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "preference name is invalid: `{name}`"),
            Self::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "preference `{name}` holds `{value}`, expected {expected}"),
            Self::Sqlite(err) => write!(f, "preference store failed: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "preference store schema {db_version} is newer than this build ({latest_supported})"
            ),
        }
    }
}

impl Error for PrefsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for PrefsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Returns whether `name` is a valid preference name or node id.
pub fn is_valid_name(name: &str) -> bool {
    PREFERENCE_NAME_RE.is_match(name)
}

pub(crate) fn validate_name(name: &str) -> PrefsResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(PrefsError::InvalidName(name.to_string()))
    }
}

/// Key/value store scoped to one preference node.
pub trait Preferences {
    /// Node (namespace) this store reads and writes.
    fn node(&self) -> &str;

    fn get_text(&self, name: &str) -> PrefsResult<Option<String>>;

    fn put_text(&mut self, name: &str, value: &str) -> PrefsResult<()>;

    /// Removes `name`; `Ok(false)` when it was absent.
    fn remove(&mut self, name: &str) -> PrefsResult<bool>;

    /// Stored names in sorted order.
    fn names(&self) -> PrefsResult<Vec<String>>;

    fn contains(&self, name: &str) -> PrefsResult<bool> {
        Ok(self.get_text(name)?.is_some())
    }

    fn get_int(&self, name: &str, default: i64) -> PrefsResult<i64> {
        match self.get_text(name)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| PrefsError::InvalidValue {
                name: name.to_string(),
                value: raw,
                expected: "integer",
            }),
        }
    }

    fn put_int(&mut self, name: &str, value: i64) -> PrefsResult<()> {
        self.put_text(name, &value.to_string())
    }

    fn get_bool(&self, name: &str, default: bool) -> PrefsResult<bool> {
        match self.get_text(name)? {
            None => Ok(default),
            Some(raw) => match raw.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(PrefsError::InvalidValue {
                    name: name.to_string(),
                    value: raw,
                    expected: "true|false",
                }),
            },
        }
    }

    fn put_bool(&mut self, name: &str, value: bool) -> PrefsResult<()> {
        self.put_text(name, if value { "true" } else { "false" })
    }
}
