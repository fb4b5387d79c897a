//! Challenge Store
//!
//! Keyed persistence of `UserChallengeState` per user. Three backends:
//!
//! - `JsonFileStore`: one JSON document for all users, rewritten in full on
//!   every save (the default, compatible with `tracker_data.json`)
//! - `SqliteStore`: one row per user
//! - `MemoryStore`: in-process, for tests and dry runs
//!
//! Writes within one process are serialized. Two processes sharing a JSON
//! file can still lose each other's updates.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::model::{UserChallengeState, UserId};

/// All users' states, as held in the JSON document
pub type StateMap = BTreeMap<UserId, UserChallengeState>;

/// Per-user keyed store
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Fetch a user's state, `None` if the user has never been seen
    async fn get(&self, user: UserId) -> Result<Option<UserChallengeState>, StoreError>;

    /// Replace a user's state
    async fn put(&self, user: UserId, state: &UserChallengeState) -> Result<(), StoreError>;
}

// ============ JSON document ============

/// Whole-document JSON store
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: AsyncMutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("JSON challenge store: {}", path.display());
        Self {
            path,
            write_lock: AsyncMutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document. A missing or empty file is an empty map.
    pub async fn load(&self) -> Result<StateMap, StoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StateMap::new()),
            Err(e) => return Err(e.into()),
        };

        if data.trim().is_empty() {
            return Ok(StateMap::new());
        }

        Ok(serde_json::from_str(&data)?)
    }

    /// Rewrite the whole document
    pub async fn save(&self, states: &StateMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_string_pretty(states)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Saved {} user states to {}", states.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ChallengeStore for JsonFileStore {
    async fn get(&self, user: UserId) -> Result<Option<UserChallengeState>, StoreError> {
        let mut states = self.load().await?;
        Ok(states.remove(&user))
    }

    async fn put(&self, user: UserId, state: &UserChallengeState) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut states = self.load().await?;
        states.insert(user, state.clone());
        self.save(&states).await
    }
}

// ============ SQLite ============

/// One row per user, state stored as JSON text
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS challenge_states (
                user_id INTEGER PRIMARY KEY,
                state TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (unixepoch())
            );
            "#,
        )?;

        info!("SQLite challenge store opened: {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl ChallengeStore for SqliteStore {
    async fn get(&self, user: UserId) -> Result<Option<UserChallengeState>, StoreError> {
        let raw: Option<String> = {
            let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
            conn.query_row(
                "SELECT state FROM challenge_states WHERE user_id = ?1",
                params![user as i64],
                |row| row.get(0),
            )
            .optional()?
        };

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, user: UserId, state: &UserChallengeState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO challenge_states (user_id, state, updated_at)
             VALUES (?1, ?2, unixepoch())
             ON CONFLICT(user_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
            params![user as i64, json],
        )?;
        debug!("Stored challenge state for user {}", user);
        Ok(())
    }
}

// ============ In-memory ============

#[derive(Default)]
pub struct MemoryStore {
    states: RwLock<HashMap<UserId, UserChallengeState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn get(&self, user: UserId) -> Result<Option<UserChallengeState>, StoreError> {
        Ok(self.states.read().await.get(&user).cloned())
    }

    async fn put(&self, user: UserId, state: &UserChallengeState) -> Result<(), StoreError> {
        self.states.write().await.insert(user, state.clone());
        Ok(())
    }
}
