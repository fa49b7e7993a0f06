//! Intercept record and its lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{DownloadId, TransferId};

/// Engine-assigned record identifier; increases monotonically per engine.
pub type RecordId = u64;

/// Lifecycle of a diverted download.
///
/// ```text
/// intercepted --submit ok--> downloading --complete--> completed
///      \--submit error--> failed          \--interrupted--> failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterceptStatus {
    Intercepted,
    Downloading,
    Completed,
    Failed,
}

impl InterceptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterceptStatus::Intercepted => "intercepted",
            InterceptStatus::Downloading => "downloading",
            InterceptStatus::Completed => "completed",
            InterceptStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, InterceptStatus::Completed | InterceptStatus::Failed)
    }
}

/// Authoritative record of one diverted download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptRecord {
    pub id: RecordId,
    /// Id of the cancelled native download.
    pub download_id: DownloadId,
    /// Filename the host originally proposed.
    pub filename: String,
    /// Resolved (post-redirect) URL.
    pub url: String,
    /// Declared size in bytes; 0 when unknown.
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// Cookies for `url` as `name=value; name2=value2`.
    pub cookies: String,
    pub timestamp: DateTime<Utc>,
    pub status: InterceptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<TransferId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<u64>,
    /// Integer percent of `size`; may exceed 100 if the host over-reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    /// Filename the host actually saved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InterceptRecord {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn mark_downloading(&mut self, transfer_id: TransferId) {
        self.transfer_id = Some(transfer_id);
        self.status = InterceptStatus::Downloading;
    }

    pub(crate) fn mark_failed(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.status = InterceptStatus::Failed;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.status = InterceptStatus::Completed;
    }

    /// Store cumulative bytes and recompute progress when the size is known.
    pub(crate) fn record_bytes(&mut self, bytes: u64) {
        self.bytes_received = Some(bytes);
        if self.size > 0 {
            let pct = u128::from(bytes) * 100 / u128::from(self.size);
            self.progress = Some(u64::try_from(pct).unwrap_or(u64::MAX));
        }
    }
}
