//! Recent-search history backed by SQLite.
//!
//! Keeps the last few searches a user ran so the UI can offer them again.
//! Access is async via tokio-rusqlite; the schema is versioned through a
//! simple migrations table.

pub mod connection;
pub mod migrations;
pub mod recent;

pub use crate::Error;

pub use connection::HistoryDb;
pub use recent::RecentSearch;
