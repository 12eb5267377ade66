//! Data ingestion and storage
//!
//! JSON feed import and SQLite storage for games and betting lines.

pub mod database;
pub mod import;

pub use database::{Database, DatabaseStats, GameFilter};
pub use import::{GameFeed, ImportSummary};
