//! Response observer: records candidate downloads from navigation responses.
//!
//! The observer is pure bookkeeping. It never blocks or rewrites a response,
//! and the interception decision does not depend on its records; they exist
//! for correlation and inspection (`getCandidates`).

mod content_disposition;
mod headers;
mod store;

pub use content_disposition::parse_content_disposition_filename;
pub use headers::{extract_headers, HeaderBundle};
pub use store::CandidateStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::HeadersReceived;

/// Content types that mark a response as a download (substring match on the lower-cased value).
const DOWNLOAD_CONTENT_TYPES: &[&str] = &[
    "application/octet-stream",
    "application/x-msdownload",
    "application/zip",
    "application/x-rar",
];

/// Metadata captured from a response that looks like a download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub request_id: String,
    pub url: String,
    pub headers: HeaderBundle,
    /// Filename from `Content-Disposition`, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_filename: Option<String>,
    pub tab_id: i64,
    pub captured_at: DateTime<Utc>,
}

/// True if the headers indicate a binary/archive payload or an attachment.
pub fn looks_like_download(headers: &HeaderBundle) -> bool {
    let content_type = headers.content_type.to_ascii_lowercase();
    DOWNLOAD_CONTENT_TYPES
        .iter()
        .any(|t| content_type.contains(t))
        || headers
            .content_disposition
            .to_ascii_lowercase()
            .contains("attachment")
}

/// Build a candidate record for a qualifying response.
///
/// Returns `None` for non-navigation requests, non-2xx statuses, and responses
/// whose headers do not look like a download.
pub fn candidate_from_response(event: &HeadersReceived) -> Option<CandidateRecord> {
    if !event.resource_type.is_navigation() {
        return None;
    }
    if !(200..300).contains(&event.status_code) {
        return None;
    }

    let headers = extract_headers(&event.response_headers);
    if !looks_like_download(&headers) {
        return None;
    }

    let suggested_filename = if headers.content_disposition.is_empty() {
        None
    } else {
        parse_content_disposition_filename(&headers.content_disposition)
    };

    Some(CandidateRecord {
        request_id: event.request_id.clone(),
        url: event.url.clone(),
        headers,
        suggested_filename,
        tab_id: event.tab_id,
        captured_at: Utc::now(),
    })
}
