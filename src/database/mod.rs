/*!
 * Database module for persistent storage of languages, lessons and words.
 *
 * This module provides SQLite-based persistence for:
 * - Languages and their lessons
 * - Per-lesson vocabulary with annotations
 * - The global word audio cache
 * - AI provider settings and study options
 */

pub mod connection;
pub mod models;
pub mod query;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::{ConnectionState, DatabaseConnection, DatabaseStats};
pub use query::{Columns, QueryBuilder, Statement};
pub use repository::Repository;
