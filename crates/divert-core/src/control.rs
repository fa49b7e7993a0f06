//! Status/control surface consumed by an external presentation layer.
//!
//! Requests are JSON objects tagged by `action`; responses keep the shapes
//! the popup UI expects (`{downloads}`, `{enabled}`, `{config}`, ...).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::DivertConfig;
use crate::events::HostEvent;
use crate::ledger::{InterceptRecord, LedgerStats};
use crate::observer::CandidateRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlRequest {
    GetInterceptedDownloads,
    GetStats,
    GetConfig,
    ToggleEnabled,
    ClearHistory,
    GetCandidates,
}

impl ControlRequest {
    /// Parse a bare action name (`getStats`, `toggleEnabled`, ...).
    pub fn from_action(action: &str) -> Option<Self> {
        serde_json::from_value(serde_json::json!({ "action": action })).ok()
    }
}

/// Read-only view of the configuration, with the field names the UI reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    #[serde(rename = "MIN_FILE_SIZE")]
    pub min_file_size: u64,
    pub enabled: bool,
    pub monitored_extensions: Vec<String>,
    pub blacklist_domains: Vec<String>,
    pub download_folder: String,
}

impl From<&DivertConfig> for ConfigSnapshot {
    fn from(cfg: &DivertConfig) -> Self {
        Self {
            min_file_size: cfg.min_file_size,
            enabled: cfg.enabled,
            monitored_extensions: cfg.monitored_extensions.clone(),
            blacklist_domains: cfg.blacklist_domains.clone(),
            download_folder: cfg.download_folder.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlResponse {
    Downloads { downloads: Vec<InterceptRecord> },
    Stats(LedgerStats),
    Config { config: ConfigSnapshot },
    Enabled { enabled: bool },
    Cleared { success: bool },
    Candidates { candidates: Vec<CandidateRecord> },
    Error { error: String },
}

impl ControlResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ControlResponse::Error {
            error: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has neither an \"action\" nor an \"event\" field")]
    UnknownKind,
}

/// Anything that arrives on the message channel.
#[derive(Debug, Clone)]
pub enum Inbound {
    Control(ControlRequest),
    Event(HostEvent),
}

impl Inbound {
    /// Parse one JSON message; `action` selects a control request and `event` a host event.
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if value.get("action").is_some() {
            Ok(Inbound::Control(serde_json::from_value(value)?))
        } else if value.get("event").is_some() {
            Ok(Inbound::Event(serde_json::from_value(value)?))
        } else {
            Err(MessageError::UnknownKind)
        }
    }
}

/// Default path for the control socket (same XDG state dir as the log).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("divert")?.get_state_home();
    Ok(dir.join("control.sock"))
}
