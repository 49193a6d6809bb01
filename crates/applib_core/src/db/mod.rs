//! SQLite bootstrap for the preference store.
//!
//! Schema version is tracked via `PRAGMA user_version`; failures surface as
//! [`crate::prefs::PrefsError`].

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
