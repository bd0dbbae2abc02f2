//! Persistence for the respawn policy.
//!
//! The persisted form is three keys:
//!
//! ```toml
//! active = true
//! worlds = ["limbo", "world_nether"]
//! destination = "spawn"
//! ```
//!
//! Missing keys fall back to their defaults (`active = true`, no worlds, no
//! destination), so a hand-written file may omit any of them.

use crate::error::RespawnError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::{debug, info};

fn default_active() -> bool {
    true
}

/// Serializable copy of the respawn policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Whether login redirection is enabled
    #[serde(default = "default_active")]
    pub active: bool,
    /// Worlds whose players are redirected on login, in insertion order
    #[serde(default)]
    pub worlds: Vec<String>,
    /// Name of the world players are sent to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl Default for PolicySnapshot {
    fn default() -> Self {
        Self {
            active: default_active(),
            worlds: Vec::new(),
            destination: None,
        }
    }
}

/// Durable storage for [`PolicySnapshot`]s.
#[async_trait]
pub trait PolicyStorage: Send + Sync + Debug {
    /// Reads the persisted policy.
    async fn load(&self) -> Result<PolicySnapshot, RespawnError>;

    /// Writes the policy. Must preserve the order of `worlds`.
    async fn save(&self, snapshot: &PolicySnapshot) -> Result<(), RespawnError>;
}

/// Stores the policy in a TOML file.
///
/// Loading a missing file writes the default policy to disk and returns it,
/// so operators always find a file to edit after the first start.
#[derive(Debug, Clone)]
pub struct TomlPolicyStorage {
    path: PathBuf,
}

impl TomlPolicyStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PolicyStorage for TomlPolicyStorage {
    async fn load(&self) -> Result<PolicySnapshot, RespawnError> {
        if tokio::fs::try_exists(&self.path).await? {
            let content = tokio::fs::read_to_string(&self.path).await?;
            let snapshot: PolicySnapshot = toml::from_str(&content)?;
            debug!("📄 Loaded respawn policy from {}", self.path.display());
            Ok(snapshot)
        } else {
            let snapshot = PolicySnapshot::default();
            self.save(&snapshot).await?;
            info!("Created default respawn policy file: {}", self.path.display());
            Ok(snapshot)
        }
    }

    async fn save(&self, snapshot: &PolicySnapshot) -> Result<(), RespawnError> {
        let content = toml::to_string_pretty(snapshot)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, content).await?;
        debug!("💾 Saved respawn policy to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the policy in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryPolicyStorage {
    snapshot: RwLock<PolicySnapshot>,
    saves: AtomicUsize,
}

impl MemoryPolicyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: PolicySnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// The most recently saved snapshot.
    pub fn current(&self) -> Result<PolicySnapshot, RespawnError> {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| RespawnError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl PolicyStorage for MemoryPolicyStorage {
    async fn load(&self) -> Result<PolicySnapshot, RespawnError> {
        self.current()
    }

    async fn save(&self, snapshot: &PolicySnapshot) -> Result<(), RespawnError> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|e| RespawnError::Persistence(e.to_string()))?;
        *guard = snapshot.clone();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
