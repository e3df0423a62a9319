use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Keys under which application state is persisted.
pub mod keys {
    /// Durable: the flat account registry.
    pub const REGISTRY: &str = "registry";
    /// Durable: the logged-in user's identity.
    pub const SESSION: &str = "session";
    /// Durable: completed attempt history, newest first.
    pub const HISTORY: &str = "history";
    /// Session: the in-progress question list.
    pub const ACTIVE_EXAM: &str = "active_exam";
    /// Session: the per-question answer map.
    pub const ANSWERS: &str = "answers";
    /// Session: remaining countdown seconds.
    pub const TIME_LEFT: &str = "time_left";
}

/// Lifetime of a stored key. Durable keys survive until removed; session
/// keys are cleared wholesale on finalize or logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Durable,
    Session,
}

impl Scope {
    fn as_str(&self) -> &'static str {
        match self {
            Scope::Durable => "durable",
            Scope::Session => "session",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Scoped key-value store backed by sqlite. Injected into the exam
/// controller and account layer; nothing references it ambiently.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\tka-simulator")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/tka-simulator")
    }
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join("tka.db")
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

impl Store {
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = get_db_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        Self::open(&db_path)
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE scope = ? AND key = ?")?;
        let value = stmt
            .query_row(rusqlite::params![scope.as_str(), key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (scope, key, value, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(scope, key) DO UPDATE SET value = excluded.value,
                                                   updated_at = excluded.updated_at",
            rusqlite::params![scope.as_str(), key, value, now()],
        )?;
        Ok(())
    }

    pub fn remove(&self, scope: Scope, key: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM kv WHERE scope = ? AND key = ?",
            rusqlite::params![scope.as_str(), key],
        )?;
        Ok(())
    }

    /// Clears every key in a scope. Used on finalize and logout to drop the
    /// in-progress exam state.
    pub fn clear_scope(&self, scope: Scope) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM kv WHERE scope = ?",
            rusqlite::params![scope.as_str()],
        )?;
        Ok(())
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        scope: Scope,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.get(scope, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(
        &self,
        scope: Scope,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        self.set(scope, key, &serde_json::to_string(value)?)
    }
}

fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            scope TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (scope, key)
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_kv_scope ON kv(scope)", [])?;
    Ok(())
}
