use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 2 MiB: downloads smaller than this are left to the native download manager.
pub const DEFAULT_MIN_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Global configuration loaded from `~/.config/divert/config.toml`.
///
/// Only `enabled` changes at runtime (via the control surface); every other
/// field is fixed for the lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivertConfig {
    /// Minimum declared size in bytes for a download to be intercepted (inclusive).
    pub min_file_size: u64,
    /// Master switch for interception.
    pub enabled: bool,
    /// Extensions (without the dot) that are eligible for interception.
    pub monitored_extensions: Vec<String>,
    /// Referrer domains whose downloads are never intercepted (substring match on hostname).
    pub blacklist_domains: Vec<String>,
    /// Subfolder (relative to the host's download dir) for re-submitted transfers.
    pub download_folder: String,
    /// Maximum number of candidate records kept by the response observer.
    pub candidate_capacity: usize,
    /// Maximum number of intercept records kept in the ledger.
    pub max_history: usize,
}

impl Default for DivertConfig {
    fn default() -> Self {
        Self {
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            enabled: true,
            monitored_extensions: [
                "exe", "zip", "rar", "7z", "iso", "dmg", "pkg", "deb", "rpm", "apk",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            blacklist_domains: ["youtube.com", "youku.com", "bilibili.com", "iqiyi.com"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            download_folder: "InterceptedDownloads".to_string(),
            candidate_capacity: 256,
            max_history: 500,
        }
    }
}

impl DivertConfig {
    /// Lower-case and de-duplicate extensions and domains; strip a leading dot from extensions.
    pub fn normalized(mut self) -> Self {
        self.monitored_extensions = normalize_list(
            self.monitored_extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_string()),
        );
        self.blacklist_domains =
            normalize_list(self.blacklist_domains.iter().map(|d| d.trim().to_string()));
        self.candidate_capacity = self.candidate_capacity.max(1);
        self.max_history = self.max_history.max(1);
        self
    }

    /// True if `ext` (already lower-cased) is in the monitored set.
    pub fn monitors_extension(&self, ext: &str) -> bool {
        self.monitored_extensions.iter().any(|e| e == ext)
    }

    /// First blacklisted domain contained in `host`, if any.
    pub fn blacklisted_domain_in(&self, host: &str) -> Option<&str> {
        let host = host.to_ascii_lowercase();
        self.blacklist_domains
            .iter()
            .find(|d| host.contains(d.as_str()))
            .map(String::as_str)
    }
}

fn normalize_list(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.to_ascii_lowercase();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("divert")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<DivertConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: DivertConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg.normalized())
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DivertConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DivertConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}
