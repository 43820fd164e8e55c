//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed target registry and stream cursor store using
//! Diesel ORM.

pub mod cursor;
pub mod database;
pub mod registry;

pub use cursor::SqliteCursorStore;
pub use registry::SqliteTargetRegistry;
