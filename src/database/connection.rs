/*!
 * Database connection management.
 *
 * A `DatabaseConnection` starts unconnected. `connect` opens SQLite, runs the
 * schema bootstrap and keeps the handle until `disconnect`. Blocking work runs
 * through tokio's `spawn_blocking`.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;

use super::schema;
use crate::errors::{AppError, AppResult};

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "database.db";

/// Default database directory name under the user's data directory
const DEFAULT_DB_DIRNAME: &str = "linguadeck";

const IN_MEMORY: &str = ":memory:";

/// Lifecycle state of the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Connected,
    Disconnected,
}

/// Shared SQLite handle with an explicit connect/disconnect lifecycle
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file, or `:memory:`
    db_path: PathBuf,
    /// `None` until connected
    connection: Arc<Mutex<Option<Connection>>>,
    state: Arc<Mutex<ConnectionState>>,
    /// Held across the whole open + bootstrap sequence
    connect_lock: Arc<tokio::sync::Mutex<()>>,
}

impl DatabaseConnection {
    /// Handle for the default location; not connected yet
    pub fn new_default() -> AppResult<Self> {
        Ok(Self::new(Self::default_database_path()?))
    }

    /// Handle for the given path; not connected yet
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            connection: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(ConnectionState::Uninitialized)),
            connect_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// In-memory handle (for testing); content is lost on disconnect
    pub fn new_in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    /// `<data_local_dir>/linguadeck/database.db`
    pub fn default_database_path() -> AppResult<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| AppError::Configuration("Could not determine data directory".into()))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY
    }

    /// Open the database and bootstrap the schema.
    ///
    /// Returns the tables created by this call. A no-op when already connected.
    /// Concurrent callers are serialized; only the first one opens the database.
    pub async fn connect(&self) -> AppResult<Vec<&'static str>> {
        let _guard = self.connect_lock.lock().await;
        if self.is_connected() {
            debug!("Database already connected: {:?}", self.db_path);
            return Ok(Vec::new());
        }

        let db_path = self.db_path.clone();
        let in_memory = self.is_in_memory();

        let (conn, created) = tokio::task::spawn_blocking(move || -> AppResult<_> {
            let conn = if in_memory {
                debug!("Creating in-memory database");
                Connection::open_in_memory()?
            } else {
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Filesystem(format!(
                            "Failed to create database directory {:?}: {}",
                            parent, e
                        ))
                    })?;
                }
                info!("Opening database at: {:?}", db_path);
                Connection::open(&db_path)?
            };

            let created = schema::bootstrap(&conn)?;
            Ok((conn, created))
        })
        .await
        .map_err(|e| AppError::Configuration(format!("Database task panicked: {}", e)))??;

        *self.connection.lock() = Some(conn);
        *self.state.lock() = ConnectionState::Connected;

        if !created.is_empty() {
            info!("Created tables: {}", created.join(", "));
        }
        Ok(created)
    }

    /// Drop the SQLite handle; a later `connect` bootstraps again
    pub fn disconnect(&self) {
        let dropped = self.connection.lock().take();
        if dropped.is_some() {
            info!("Database disconnected: {:?}", self.db_path);
        }
        *self.state.lock() = ConnectionState::Disconnected;
    }

    /// Run `f` against the connection on the blocking pool.
    ///
    /// Fails with a Configuration error when the handle is not connected.
    pub async fn execute_async<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        if !self.is_connected() {
            return Err(not_connected());
        }

        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            match guard.as_ref() {
                Some(conn) => f(conn),
                None => Err(not_connected()),
            }
        })
        .await
        .map_err(|e| AppError::Configuration(format!("Database task panicked: {}", e)))?
    }

    /// Row counts per table
    pub async fn stats(&self) -> AppResult<DatabaseStats> {
        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            tokio::fs::metadata(&self.db_path)
                .await
                .map(|m| m.len())
                .unwrap_or(0)
        };

        self.execute_async(move |conn| {
            let count = |table: &str| -> AppResult<i64> {
                let sql = format!("SELECT COUNT(*) FROM {}", table);
                Ok(conn.query_row(&sql, [], |row| row.get(0))?)
            };

            Ok(DatabaseStats {
                language_count: count(schema::LANGUAGE_TABLE)?,
                lesson_count: count(schema::LESSON_TABLE)?,
                word_count: count(schema::WORD_TABLE)?,
                cached_audio_count: count(schema::AUDIO_CACHE_TABLE)?,
                file_size_bytes,
            })
        })
        .await
    }
}

fn not_connected() -> AppError {
    AppError::Configuration("database is not connected".to_string())
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub language_count: i64,
    pub lesson_count: i64,
    pub word_count: i64,
    pub cached_audio_count: i64,
    /// Database file size in bytes; 0 for in-memory databases
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Languages: {}, Lessons: {}, Words: {}, Cached audio: {}, Size: {} KB",
            self.language_count,
            self.lesson_count,
            self.word_count,
            self.cached_audio_count,
            self.file_size_bytes / 1024
        )
    }
}
