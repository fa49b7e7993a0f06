//! Host lifecycle events consumed by the engine.
//!
//! Field names follow the browser extension API on the wire (camelCase), so a
//! thin bridge can forward the runtime's callback payloads unchanged.

use serde::{Deserialize, Serialize};

/// Host-assigned identifier of a native download.
pub type DownloadId = u64;

/// Host-assigned identifier of a re-submitted background transfer.
pub type TransferId = u64;

/// One raw response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeader {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Kind of request a response belongs to. Only navigations are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    #[serde(other)]
    Other,
}

impl ResourceType {
    pub fn is_navigation(self) -> bool {
        matches!(self, ResourceType::MainFrame | ResourceType::SubFrame)
    }
}

/// Response headers have arrived for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersReceived {
    pub request_id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status_code: u16,
    pub url: String,
    #[serde(default)]
    pub response_headers: Vec<HttpHeader>,
    #[serde(default = "no_tab")]
    pub tab_id: i64,
}

fn no_tab() -> i64 {
    -1
}

/// A native download about to be assigned its filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItem {
    pub id: DownloadId,
    #[serde(default)]
    pub filename: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Declared size in bytes; negative when the host does not know it.
    #[serde(default)]
    pub file_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl DownloadItem {
    /// Declared size, or 0 when unknown.
    pub fn declared_size(&self) -> u64 {
        u64::try_from(self.file_size).unwrap_or(0)
    }

    /// Referrer URL, treating an empty string as absent.
    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// URL after redirects if the host reported one, else the original URL.
    pub fn resolved_url(&self) -> &str {
        self.final_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.url)
    }
}

/// Host-side download state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    InProgress,
    Interrupted,
    Complete,
}

/// A changed field: new value plus (optionally) the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta<T> {
    pub current: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<T>,
}

impl<T> Delta<T> {
    pub fn to(current: T) -> Self {
        Self {
            current,
            previous: None,
        }
    }
}

/// Changes to a background transfer reported by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDelta {
    pub id: TransferId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Delta<DownloadState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<Delta<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Delta<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<Delta<String>>,
}

/// Any inbound lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HostEvent {
    HeadersReceived(HeadersReceived),
    DeterminingFilename(DownloadItem),
    DownloadChanged(DownloadDelta),
}
