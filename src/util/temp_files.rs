//! Temporary artifact lifecycle for captured screenshots
//!
//! Every request gets its own `mcp-screenshot-*` directory holding exactly one
//! file. Directories are not tracked or removed on drop; instead a detached
//! task deletes each one after a TTL (see [`config::cleanup_ttl_ms`]).
//!
//! # Examples
//!
//! ```
//! use screenshot_mac_mcp::{model::ImageFormat, util::temp_files::{artifact_file_name, TempArtifacts}};
//!
//! let root = tempfile::tempdir().unwrap();
//! let artifacts = TempArtifacts::with_root(root.path());
//!
//! let dir = artifacts.create_artifact_dir().unwrap();
//! let file = dir.join(artifact_file_name(ImageFormat::Png));
//! assert!(file.to_string_lossy().ends_with(".png"));
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{TimeDelta, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{config, model::ImageFormat};

/// Prefix of per-request capture directories
pub const ARTIFACT_DIR_PREFIX: &str = "mcp-screenshot-";

/// Creates per-request capture directories
#[derive(Debug, Clone)]
pub struct TempArtifacts {
    root: PathBuf,
}

impl TempArtifacts {
    /// Directories under the system temp directory
    pub fn new() -> Self {
        Self::with_root(std::env::temp_dir())
    }

    /// Directories under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh, uniquely named directory that outlives this call
    pub fn create_artifact_dir(&self) -> std::io::Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(ARTIFACT_DIR_PREFIX)
            .tempdir_in(&self.root)?
            .keep();
        Ok(dir)
    }
}

impl Default for TempArtifacts {
    fn default() -> Self {
        Self::new()
    }
}

/// `shot-<uuid>.<ext>`
pub fn artifact_file_name(format: ImageFormat) -> String {
    format!("shot-{}.{}", Uuid::new_v4(), format.extension())
}

/// Deletes `dir` recursively once `ttl_ms` has elapsed
///
/// A TTL of zero schedules nothing. Otherwise a detached task is spawned on
/// the current tokio runtime; removal errors are logged and dropped. The
/// returned handle may be ignored.
pub fn schedule_cleanup(dir: PathBuf, ttl_ms: u64) -> Option<JoinHandle<()>> {
    if ttl_ms == 0 {
        tracing::debug!(dir = %dir.display(), "cleanup disabled");
        return None;
    }

    let expires_at = TimeDelta::try_milliseconds(ttl_ms.min(i64::MAX as u64) as i64)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl));
    tracing::debug!(
        dir = %dir.display(),
        ttl_ms,
        expires_at = ?expires_at.map(|t| t.to_rfc3339()),
        "scheduled cleanup"
    );

    Some(tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(ttl_ms)).await;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::debug!(dir = %dir.display(), "removed capture directory"),
            Err(e) => tracing::debug!(dir = %dir.display(), error = %e, "cleanup failed"),
        }
    }))
}

/// Deferred deletion of capture directories
pub trait CleanupScheduler: Send + Sync {
    /// Current TTL in milliseconds; `0` disables cleanup
    fn ttl_ms(&self) -> u64;

    /// Arranges for `dir` to be deleted after `ttl_ms`; must not block
    fn schedule_cleanup(&self, dir: &Path, ttl_ms: u64);
}

/// [`CleanupScheduler`] spawning tokio timers
///
/// Reads `MCP_SCREENSHOT_MAC_TTL_MS` on every request unless a fixed TTL was
/// given.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtlCleanup {
    fixed_ttl_ms: Option<u64>,
}

impl TtlCleanup {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_ttl_ms(ttl_ms: u64) -> Self {
        Self {
            fixed_ttl_ms: Some(ttl_ms),
        }
    }
}

impl CleanupScheduler for TtlCleanup {
    fn ttl_ms(&self) -> u64 {
        self.fixed_ttl_ms.unwrap_or_else(config::cleanup_ttl_ms)
    }

    fn schedule_cleanup(&self, dir: &Path, ttl_ms: u64) {
        let _ = schedule_cleanup(dir.to_path_buf(), ttl_ms);
    }
}
