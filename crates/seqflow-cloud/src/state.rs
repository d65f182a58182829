//! State management for Seq resources
//!
//! Manages the `.seqflow/state.json` file which records every API key the
//! tool has created or imported, including the secret token Seq only hands
//! out once.

use crate::apikey::ApiKeyState;
use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".seqflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Recorded state of the whole project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// API keys indexed by address
    #[serde(default)]
    pub api_keys: BTreeMap<String, ApiKeyState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            api_keys: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(&self, address: &str) -> Option<&ApiKeyState> {
        self.api_keys.get(address)
    }

    /// Record an API key, replacing any previous state at the address
    pub fn set_api_key(&mut self, address: impl Into<String>, state: ApiKeyState) {
        self.api_keys.insert(address.into(), state);
        self.updated_at = Utc::now();
    }

    pub fn remove_api_key(&mut self, address: &str) -> Option<ApiKeyState> {
        let result = self.api_keys.remove(address);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }
}

/// Reads and writes the state file of one project
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !fs::try_exists(&dir).await? {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state; a missing file is an empty state
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !fs::try_exists(&path).await? {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} api keys", state.api_keys.len());
        Ok(state)
    }

    /// Save the state, moving the previous file to `state.json.backup`
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if fs::try_exists(&path).await? {
            if fs::try_exists(&backup).await? {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} api keys", state.api_keys.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    ///
    /// Locks older than one hour are considered stale and taken over.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        if fs::try_exists(&lock_path).await? {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(CloudError::LockError(format!(
                    "State is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: format!("{}:{}", hostname(), std::process::id()),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("HOST"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if fs::try_exists(&self.lock_path).await? {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            // Drop cannot await
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn ingest_key() -> ApiKeyState {
        ApiKeyState {
            id: Some("k1".to_string()),
            title: "ingest".to_string(),
            token: Some("tok-123".to_string()),
            owner_id: None,
            permissions: BTreeSet::from(["Ingest".to_string()]),
        }
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.set_api_key("ingest", ingest_key());
        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.api_keys.len(), 1);
        assert_eq!(loaded.api_key("ingest"), Some(&ingest_key()));
    }

    #[tokio::test]
    async fn test_token_is_persisted() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.set_api_key("ingest", ingest_key());
        manager.save(&state).await.unwrap();

        let raw = std::fs::read_to_string(manager.state_path()).unwrap();
        assert!(raw.contains("\"token\": \"tok-123\""));
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.api_keys.is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        manager.save(&state).await.unwrap();
        state.set_api_key("ingest", ingest_key());
        manager.save(&state).await.unwrap();

        let backup = temp_dir.path().join(".seqflow").join("state.json.backup");
        let previous: GlobalState =
            serde_json::from_str(&std::fs::read_to_string(backup).unwrap()).unwrap();
        assert!(previous.api_keys.is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = GlobalState {
            version: STATE_VERSION + 1,
            ..Default::default()
        };
        manager.save(&state).await.unwrap();

        let result = manager.load().await;
        assert!(matches!(result, Err(CloudError::StateError(_))));
    }

    #[test]
    fn test_remove_api_key() {
        let mut state = GlobalState::new();
        state.set_api_key("ingest", ingest_key());

        assert!(state.remove_api_key("ingest").is_some());
        assert!(state.remove_api_key("ingest").is_none());
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let lock = manager.acquire_lock().await.unwrap();
        assert!(matches!(
            manager.acquire_lock().await,
            Err(CloudError::LockError(_))
        ));

        lock.release().await.unwrap();
        let again = manager.acquire_lock().await.unwrap();
        drop(again);
        assert!(!temp_dir.path().join(".seqflow").join("lock.json").exists());
    }

    #[tokio::test]
    async fn test_stale_lock_is_taken_over() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());
        manager.ensure_state_dir().await.unwrap();

        let stale = LockInfo {
            holder: "old-host:1".to_string(),
            acquired_at: Utc::now() - chrono::Duration::hours(2),
        };
        std::fs::write(
            manager.lock_path(),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        assert!(manager.acquire_lock().await.is_ok());
    }
}
