use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/pansync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Destination root for downloaded files.
    pub save_dir: PathBuf,
    /// Worker pool width: how many files download at once.
    pub max_threads: usize,
    /// Files at or below this many bytes are treated as truncated and re-fetched.
    pub completion_threshold_bytes: u64,
    /// How many of the newest numeric identifiers are re-fetched unconditionally
    /// (the listing may still be appending to them upstream).
    pub recency_window: u64,
    /// Exclusive upper bound on numeric identifiers when extending the plan tail.
    pub catalog_upper_bound: u64,
    /// Archive file suffix; directory entries without it are ignored.
    pub file_suffix: String,
    /// Connect/response timeout in seconds. Not a total-transfer timeout.
    pub connect_timeout_secs: u64,
    /// Transfer buffer size for streamed writes.
    pub chunk_size_bytes: usize,
    /// User-Agent sent with every GET.
    pub user_agent: String,
    /// Maximum listing polls before giving up on a stable snapshot.
    pub max_catalog_polls: u32,
    /// Where the plan tail starts when the archive has no numeric max.
    /// Unset means a cold run plans no tail at all.
    #[serde(default)]
    pub bootstrap_floor: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("./Downloads"),
            max_threads: 8,
            completion_threshold_bytes: 730 * 1024 * 1024,
            recency_window: 10,
            catalog_upper_bound: 560,
            file_suffix: ".fa.gz".to_string(),
            connect_timeout_secs: 30,
            chunk_size_bytes: 8192,
            user_agent: concat!("pansync/", env!("CARGO_PKG_VERSION")).to_string(),
            max_catalog_polls: 200,
            bootstrap_floor: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pansync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}
