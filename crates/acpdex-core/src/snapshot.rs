//! Registry snapshots and their durable storage
//!
//! A snapshot is an immutable, fully-formed view of the registry at one
//! point in time. The store persists the current snapshot as a single JSON
//! document next to a SHA-256 digest sidecar and verifies the digest on
//! reload, so a torn or tampered write is detected instead of adopted.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::agent::Agent;
use crate::error::{RegistryError, Result};

/// Immutable view of the mirrored registry.
///
/// Agents keep fetch order. `error` carries the per-page error strings of
/// the refresh that produced this snapshot, if any - staleness and partial
/// failure are communicated here, never raised to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub agents: Vec<Agent>,
    pub last_updated: Option<DateTime<Utc>>,
    pub total_count: usize,
    pub error: Option<Vec<String>>,
}

impl RegistrySnapshot {
    /// The cold-start snapshot: nothing loaded yet.
    pub fn empty() -> Self {
        RegistrySnapshot {
            agents: Vec::new(),
            last_updated: None,
            total_count: 0,
            error: None,
        }
    }

    /// Build a fresh snapshot from a completed sweep, stamped now.
    pub fn from_agents(agents: Vec<Agent>, errors: Vec<String>) -> Self {
        let total_count = agents.len();
        RegistrySnapshot {
            agents,
            last_updated: Some(Utc::now()),
            total_count,
            error: if errors.is_empty() { None } else { Some(errors) },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Durable JSON storage for the current snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn digest_path(&self) -> PathBuf {
        self.path.with_extension("digest")
    }

    /// Persist `<path>` and `<path with .digest>` sidecar.
    pub fn save(&self, snapshot: &RegistrySnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(snapshot)?;
        let digest = hex::encode(Sha256::digest(&json));

        std::fs::write(&self.path, &json)?;
        std::fs::write(self.digest_path(), digest.as_bytes())?;

        info!(
            event = "snapshot.saved",
            path = %self.path.display(),
            agents = snapshot.agents.len(),
        );
        Ok(())
    }

    /// Load the persisted snapshot, verifying integrity when the digest
    /// sidecar is present. `Ok(None)` when nothing has been persisted yet.
    pub fn load(&self) -> Result<Option<RegistrySnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = std::fs::read(&self.path)?;

        // Caches written before the sidecar existed load unverified.
        let digest_path = self.digest_path();
        if digest_path.exists() {
            let expected = std::fs::read_to_string(&digest_path)?;
            let actual = hex::encode(Sha256::digest(&json));
            if expected.trim() != actual {
                return Err(RegistryError::DigestMismatch {
                    expected: expected.trim().to_string(),
                    actual,
                });
            }
        }

        Ok(Some(serde_json::from_slice(&json)?))
    }
}
