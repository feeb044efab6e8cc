//! Cafe Hunter storage crate - SQLite cafe store and dataset import.
//!
//! Provides a WAL-mode SQLite database with migrations, a cafe repository
//! that answers geohash prefix range queries, and an importer for the
//! public cafe dataset JSON format.

pub mod db;
pub mod import;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use import::{CafeImporter, ImportSummary};
pub use repository::CafeRepository;
