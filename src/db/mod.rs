//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool setup and the storage wrapper

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DraftRow, GuidelineRow};
pub use schema::SQLITE_INIT;
pub use sqlite::{ForgeStorage, SqlitePool, connect};
