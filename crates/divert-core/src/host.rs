//! Port to the host runtime that owns native downloads and the cookie store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{DownloadId, TransferId};

/// Error reported by the host; the message is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One cookie from the host's store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Join cookies as a `Cookie` header value, preserving the store's order.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// What to do when the target filename already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    Uniquify,
}

/// Request to start a new host download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub url: String,
    /// Path relative to the host's download directory.
    pub filename: String,
    pub save_as: bool,
    pub conflict_action: ConflictAction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
}

impl SubmitRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Operations the engine needs from the host.
#[async_trait]
pub trait DownloadHost: Send + Sync {
    /// Cancel a native download.
    async fn cancel(&self, id: DownloadId) -> Result<(), HostError>;

    /// Remove a native download from the host's history.
    async fn erase(&self, id: DownloadId) -> Result<(), HostError>;

    /// Cookies scoped to `url`, in the store's order.
    async fn cookies(&self, url: &str) -> Result<Vec<Cookie>, HostError>;

    /// Start a new download; returns the transfer id.
    async fn submit(&self, request: SubmitRequest) -> Result<TransferId, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_joins_in_order() {
        let cookies = vec![Cookie::new("sid", "abc"), Cookie::new("lang", "en")];
        assert_eq!(cookie_header(&cookies), "sid=abc; lang=en");
        assert_eq!(cookie_header(&[]), "");
    }

    #[test]
    fn submit_request_header_lookup() {
        let req = SubmitRequest {
            url: "https://e.com/a".into(),
            filename: "dir/a".into(),
            save_as: false,
            conflict_action: ConflictAction::Uniquify,
            headers: vec![("Referer".into(), "https://e.com/".into())],
        };
        assert_eq!(req.header("referer"), Some("https://e.com/"));
        assert_eq!(req.header("cookie"), None);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["conflictAction"], "uniquify");
        assert_eq!(v["saveAs"], false);
    }

    #[test]
    fn host_error_displays_verbatim() {
        assert_eq!(HostError::new("NETWORK_FAILED").to_string(), "NETWORK_FAILED");
    }
}
