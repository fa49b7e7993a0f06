//! Background transfer tracking: re-submission and host progress deltas.

use crate::events::{DownloadDelta, DownloadState, TransferId};
use crate::filename;
use crate::host::{ConflictAction, HostError, SubmitRequest};
use crate::ledger::{InterceptRecord, InterceptStatus, Ledger, RecordId};

/// Error stored on an interrupted transfer when the host gives no reason.
const INTERRUPTED_WITHOUT_REASON: &str = "interrupted";

/// Build the silent re-submission for an intercepted download.
///
/// Targets `<folder>/<name>`, never prompts, uniquifies on conflict and
/// forwards the referrer, which some origins require.
pub fn submit_request(record: &InterceptRecord, folder: &str) -> SubmitRequest {
    let mut headers = Vec::new();
    if let Some(referrer) = record.referrer.as_deref().filter(|r| !r.is_empty()) {
        headers.push(("Referer".to_string(), referrer.to_string()));
    }
    SubmitRequest {
        url: record.url.clone(),
        filename: filename::target_path(folder, &record.filename),
        save_as: false,
        conflict_action: ConflictAction::Uniquify,
        headers,
    }
}

/// Apply the host's answer to a submission. Returns the record's new status,
/// or `None` if the record disappeared while the submission was in flight.
pub fn apply_submission(
    ledger: &mut Ledger,
    id: RecordId,
    result: Result<TransferId, HostError>,
) -> Option<InterceptStatus> {
    let record = ledger.get_mut(id)?;
    match result {
        Ok(transfer_id) => {
            record.mark_downloading(transfer_id);
            ledger.index_transfer(transfer_id, id);
            tracing::info!(record_id = id, transfer_id, "background transfer started");
            Some(InterceptStatus::Downloading)
        }
        Err(e) => {
            tracing::warn!(record_id = id, "background transfer submission failed: {}", e);
            record.mark_failed(e.message);
            Some(InterceptStatus::Failed)
        }
    }
}

/// What [`apply_delta`] did with a host delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// No record is indexed under this transfer id.
    Unknown,
    /// The record is already completed or failed; nothing changed.
    IgnoredTerminal(InterceptStatus),
    /// Fields were updated; carries the (possibly new) status.
    Applied(InterceptStatus),
}

/// Apply a host delta to the record indexed under `delta.id`.
///
/// Bytes and filename are applied before the state change. Completed and
/// failed records ignore every field of later deltas.
pub fn apply_delta(ledger: &mut Ledger, delta: &DownloadDelta) -> DeltaOutcome {
    let Some(record) = ledger.by_transfer_mut(delta.id) else {
        tracing::debug!(transfer_id = delta.id, "delta for untracked transfer");
        return DeltaOutcome::Unknown;
    };

    if record.is_terminal() {
        tracing::debug!(
            transfer_id = delta.id,
            status = record.status.as_str(),
            "ignoring delta for finished transfer"
        );
        return DeltaOutcome::IgnoredTerminal(record.status);
    }

    if let Some(bytes) = &delta.bytes_received {
        record.record_bytes(bytes.current);
    }
    if let Some(name) = &delta.filename {
        record.saved_filename = Some(name.current.clone());
    }

    match delta.state.as_ref().map(|s| s.current) {
        Some(DownloadState::Complete) => {
            record.mark_completed();
            tracing::info!(record_id = record.id, transfer_id = delta.id, "transfer completed");
        }
        Some(DownloadState::Interrupted) => {
            let reason = delta
                .error
                .as_ref()
                .map(|e| e.current.clone())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| INTERRUPTED_WITHOUT_REASON.to_string());
            tracing::warn!(record_id = record.id, transfer_id = delta.id, "transfer interrupted: {}", reason);
            record.mark_failed(reason);
        }
        Some(DownloadState::InProgress) | None => {}
    }

    DeltaOutcome::Applied(record.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Delta;
    use chrono::Utc;

    fn record(size: u64, referrer: Option<&str>) -> InterceptRecord {
        InterceptRecord {
            id: 0,
            download_id: 5,
            filename: "/tmp/setup.exe".to_string(),
            url: "https://cdn.example.com/setup.exe".to_string(),
            size,
            referrer: referrer.map(str::to_string),
            cookies: "sid=1".to_string(),
            timestamp: Utc::now(),
            status: InterceptStatus::Intercepted,
            transfer_id: None,
            bytes_received: None,
            progress: None,
            saved_filename: None,
            error: None,
        }
    }

    fn started(size: u64) -> (Ledger, RecordId) {
        let mut ledger = Ledger::new(16);
        let id = ledger.append(record(size, None));
        apply_submission(&mut ledger, id, Ok(900));
        (ledger, id)
    }

    fn bytes(id: TransferId, n: u64) -> DownloadDelta {
        DownloadDelta {
            id,
            bytes_received: Some(Delta::to(n)),
            ..DownloadDelta::default()
        }
    }

    fn state(id: TransferId, s: DownloadState) -> DownloadDelta {
        DownloadDelta {
            id,
            state: Some(Delta::to(s)),
            ..DownloadDelta::default()
        }
    }

    #[test]
    fn submit_request_shape() {
        let r = record(10, Some("https://site.example.org/page"));
        let req = submit_request(&r, "InterceptedDownloads");
        assert_eq!(req.url, "https://cdn.example.com/setup.exe");
        assert_eq!(req.filename, "InterceptedDownloads/setup.exe");
        assert!(!req.save_as);
        assert_eq!(req.conflict_action, ConflictAction::Uniquify);
        assert_eq!(req.header("Referer"), Some("https://site.example.org/page"));
    }

    #[test]
    fn submit_request_without_referrer_has_no_headers() {
        let req = submit_request(&record(10, None), "dl");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn submission_ok_indexes_and_downloads() {
        let (ledger, id) = started(100);
        let r = ledger.get(id).unwrap();
        assert_eq!(r.status, InterceptStatus::Downloading);
        assert_eq!(r.transfer_id, Some(900));
        assert_eq!(ledger.by_transfer(900).unwrap().id, id);
    }

    #[test]
    fn submission_error_fails_with_message() {
        let mut ledger = Ledger::new(4);
        let id = ledger.append(record(100, None));
        let status = apply_submission(&mut ledger, id, Err(HostError::new("Invalid URL")));
        assert_eq!(status, Some(InterceptStatus::Failed));
        let r = ledger.get(id).unwrap();
        assert_eq!(r.error.as_deref(), Some("Invalid URL"));
        assert_eq!(ledger.transfer_count(), 0);
    }

    #[test]
    fn submission_for_cleared_record_is_dropped() {
        let mut ledger = Ledger::new(4);
        let id = ledger.append(record(100, None));
        ledger.clear();
        assert_eq!(apply_submission(&mut ledger, id, Ok(1)), None);
        assert_eq!(ledger.transfer_count(), 0);
    }

    #[test]
    fn progress_non_decreasing_and_uncapped() {
        let (mut ledger, id) = started(1000);
        let mut last = 0;
        for n in [0, 1, 9, 10, 499, 500, 999, 1000, 1500] {
            apply_delta(&mut ledger, &bytes(900, n));
            let p = ledger.get(id).unwrap().progress.unwrap();
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 150);
    }

    #[test]
    fn complete_event_completes() {
        let (mut ledger, id) = started(10);
        let out = apply_delta(&mut ledger, &state(900, DownloadState::Complete));
        assert_eq!(out, DeltaOutcome::Applied(InterceptStatus::Completed));
        assert_eq!(ledger.get(id).unwrap().status, InterceptStatus::Completed);
    }

    #[test]
    fn interrupted_event_fails_with_host_error() {
        let (mut ledger, id) = started(10);
        let mut d = state(900, DownloadState::Interrupted);
        d.error = Some(Delta::to("SERVER_FORBIDDEN".to_string()));
        apply_delta(&mut ledger, &d);
        let r = ledger.get(id).unwrap();
        assert_eq!(r.status, InterceptStatus::Failed);
        assert_eq!(r.error.as_deref(), Some("SERVER_FORBIDDEN"));
    }

    #[test]
    fn interrupted_without_reason() {
        let (mut ledger, id) = started(10);
        apply_delta(&mut ledger, &state(900, DownloadState::Interrupted));
        assert_eq!(ledger.get(id).unwrap().error.as_deref(), Some("interrupted"));
    }

    #[test]
    fn filename_delta_keeps_original_name() {
        let (mut ledger, id) = started(10);
        let d = DownloadDelta {
            id: 900,
            filename: Some(Delta::to("/dl/InterceptedDownloads/setup (1).exe".to_string())),
            ..DownloadDelta::default()
        };
        apply_delta(&mut ledger, &d);
        let r = ledger.get(id).unwrap();
        assert_eq!(r.filename, "/tmp/setup.exe");
        assert_eq!(r.saved_filename.as_deref(), Some("/dl/InterceptedDownloads/setup (1).exe"));
    }

    #[test]
    fn terminal_records_ignore_later_deltas() {
        let (mut ledger, id) = started(100);
        apply_delta(&mut ledger, &bytes(900, 100));
        apply_delta(&mut ledger, &state(900, DownloadState::Complete));

        let out = apply_delta(&mut ledger, &bytes(900, 5));
        assert_eq!(out, DeltaOutcome::IgnoredTerminal(InterceptStatus::Completed));
        let out = apply_delta(&mut ledger, &state(900, DownloadState::Interrupted));
        assert_eq!(out, DeltaOutcome::IgnoredTerminal(InterceptStatus::Completed));

        let r = ledger.get(id).unwrap();
        assert_eq!(r.status, InterceptStatus::Completed);
        assert_eq!(r.bytes_received, Some(100));
        assert!(r.error.is_none());
    }

    #[test]
    fn unknown_transfer_is_ignored() {
        let (mut ledger, _) = started(100);
        assert_eq!(apply_delta(&mut ledger, &bytes(1, 5)), DeltaOutcome::Unknown);
    }
}
