//! Transfer tunables (spec.md §2, §6): compile-time defaults, optionally
//! overridden by `$XDG_CONFIG_HOME/s3get/config.toml`, then by CLI flags.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// `RequestSlots` capacity: max in-flight ranged GETs (spec.md §3).
    pub max_concurrent_requests: usize,
    /// Upper bound on a single segment's size in bytes (spec.md §2, §4.2).
    pub max_segment_size: u64,
    /// `BufferSlots` capacity: max in-flight buffered segments (spec.md §3).
    pub max_pending_appends: usize,
    /// `BufWriter` capacity for file destinations (spec.md §4.5).
    pub file_buffer_size: usize,
    /// Watchdog inactivity deadline, in seconds (spec.md §4.6).
    pub timeout_secs: u64,
    /// Launch-loop admission poll interval, in milliseconds; kept ≤ 1000 so
    /// abort/timeout signals are observed promptly (spec.md §5).
    pub poll_interval_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 128,
            max_segment_size: 128 * 1024 * 1024,
            max_pending_appends: 512,
            file_buffer_size: 256 * 1024 * 1024,
            timeout_secs: 60,
            poll_interval_ms: 250,
        }
    }
}

impl TransferConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.min(1000))
    }

    /// Rejects settings that would make the pipeline meaningless: zero
    /// segment size would divide by zero in the planner, zero slots would
    /// deadlock admission forever.
    pub fn validate(&self) -> Result<()> {
        if self.max_segment_size == 0 {
            bail!("max_segment_size must be greater than zero");
        }
        if self.max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be greater than zero");
        }
        if self.max_pending_appends == 0 {
            bail!("max_pending_appends must be greater than zero");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("s3get")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Loads configuration from disk if present, falling back to defaults.
/// Unlike the teacher's config loader, this never writes a file — per
/// spec.md §6, the staging file is the only file s3get ever persists.
pub fn load() -> Result<TransferConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(TransferConfig::default());
    }

    let data = fs::read_to_string(&path)?;
    let cfg: TransferConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
