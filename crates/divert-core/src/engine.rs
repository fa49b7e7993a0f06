//! Interception engine: wires host events to the observer, policy, ledger and tracker.
//!
//! All mutable state (config, ledger, transfer index, candidates) sits behind
//! one mutex. The lock is never held across a call into the host, so every
//! continuation after an `.await` re-locks and addresses its record by id.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;

use crate::config::DivertConfig;
use crate::control::{ConfigSnapshot, ControlRequest, ControlResponse, Inbound};
use crate::events::{DownloadDelta, DownloadItem, HeadersReceived, HostEvent};
use crate::host::{cookie_header, DownloadHost};
use crate::ledger::{InterceptRecord, InterceptStatus, Ledger, LedgerStats, RecordId};
use crate::observer::{self, CandidateStore};
use crate::policy::{self, InterceptDecision, SkipReason};
use crate::tracker::{self, DeltaOutcome};

/// Everything the engine mutates.
#[derive(Debug)]
pub struct EngineState {
    pub config: DivertConfig,
    pub ledger: Ledger,
    pub candidates: CandidateStore,
}

impl EngineState {
    pub fn new(config: DivertConfig) -> Self {
        let config = config.normalized();
        Self {
            ledger: Ledger::new(config.max_history),
            candidates: CandidateStore::new(config.candidate_capacity),
            config,
        }
    }
}

/// Result of the download-naming hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// Native download left alone.
    Skipped(SkipReason),
    /// Native download diverted; `status` is the record's status after submission.
    Intercepted {
        record_id: RecordId,
        status: InterceptStatus,
    },
}

/// Result of any host event, for the message channel reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Observed { candidate: bool },
    Decided(InterceptOutcome),
    Tracked(DeltaOutcome),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventReply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    intercepted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<InterceptStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl EventOutcome {
    /// JSON reply for the message channel.
    pub fn to_json(&self) -> serde_json::Value {
        let mut reply = EventReply {
            ok: true,
            candidate: None,
            intercepted: None,
            record_id: None,
            status: None,
            reason: None,
        };
        match self {
            EventOutcome::Observed { candidate } => reply.candidate = Some(*candidate),
            EventOutcome::Decided(InterceptOutcome::Skipped(reason)) => {
                reply.intercepted = Some(false);
                reply.reason = Some(reason.to_string());
            }
            EventOutcome::Decided(InterceptOutcome::Intercepted { record_id, status }) => {
                reply.intercepted = Some(true);
                reply.record_id = Some(*record_id);
                reply.status = Some(*status);
            }
            EventOutcome::Tracked(DeltaOutcome::Unknown) => {
                reply.reason = Some("untracked transfer".to_string());
            }
            EventOutcome::Tracked(DeltaOutcome::IgnoredTerminal(status)) => {
                reply.status = Some(*status);
                reply.reason = Some("transfer already finished".to_string());
            }
            EventOutcome::Tracked(DeltaOutcome::Applied(status)) => reply.status = Some(*status),
        }
        serde_json::to_value(reply).unwrap_or_else(|_| serde_json::json!({ "ok": true }))
    }
}

pub struct Engine<H> {
    host: H,
    state: Mutex<EngineState>,
}

impl<H: DownloadHost> Engine<H> {
    pub fn new(config: DivertConfig, host: H) -> Self {
        Self {
            host,
            state: Mutex::new(EngineState::new(config)),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // No handler panics with the lock held.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Response observer hook. Returns true if a candidate was recorded.
    pub fn on_headers_received(&self, event: &HeadersReceived) -> bool {
        let Some(candidate) = observer::candidate_from_response(event) else {
            return false;
        };
        tracing::debug!(
            request_id = %candidate.request_id,
            url = %candidate.url,
            "stored candidate download"
        );
        if let Some(evicted) = self.state().candidates.upsert(candidate) {
            tracing::debug!(request_id = %evicted.request_id, "candidate store full, evicted oldest");
        }
        true
    }

    /// Download-naming hook: decide, and on a match divert the download.
    pub async fn on_determining_filename(&self, item: &DownloadItem) -> InterceptOutcome {
        let decision = policy::decide(item, &self.state().config);
        if let InterceptDecision::Skip(reason) = decision {
            tracing::debug!(download_id = item.id, filename = %item.filename, "not intercepted: {}", reason);
            return InterceptOutcome::Skipped(reason);
        }

        tracing::info!(download_id = item.id, filename = %item.filename, "intercepting download");

        let cookies = match self.host.cookies(&item.url).await {
            Ok(cookies) => cookie_header(&cookies),
            Err(e) => {
                tracing::warn!(download_id = item.id, "cookie retrieval failed: {}", e);
                String::new()
            }
        };

        let (record_id, request) = {
            let mut state = self.state();
            let record = InterceptRecord {
                id: state.ledger.next_id(),
                download_id: item.id,
                filename: item.filename.clone(),
                url: item.resolved_url().to_string(),
                size: item.declared_size(),
                referrer: item.referrer().map(str::to_string),
                cookies,
                timestamp: Utc::now(),
                status: InterceptStatus::Intercepted,
                transfer_id: None,
                bytes_received: None,
                progress: None,
                saved_filename: None,
                error: None,
            };
            let request = tracker::submit_request(&record, &state.config.download_folder);
            (state.ledger.append(record), request)
        };

        if let Err(e) = self.host.cancel(item.id).await {
            tracing::warn!(download_id = item.id, "cancelling native download failed: {}", e);
        }
        if let Err(e) = self.host.erase(item.id).await {
            tracing::warn!(download_id = item.id, "erasing native download failed: {}", e);
        }

        let result = self.host.submit(request).await;
        let status = tracker::apply_submission(&mut self.state().ledger, record_id, result)
            .unwrap_or(InterceptStatus::Intercepted);

        InterceptOutcome::Intercepted { record_id, status }
    }

    /// Progress/state hook for background transfers.
    pub fn on_download_changed(&self, delta: &DownloadDelta) -> DeltaOutcome {
        tracker::apply_delta(&mut self.state().ledger, delta)
    }

    pub async fn handle_event(&self, event: &HostEvent) -> EventOutcome {
        match event {
            HostEvent::HeadersReceived(h) => EventOutcome::Observed {
                candidate: self.on_headers_received(h),
            },
            HostEvent::DeterminingFilename(item) => {
                EventOutcome::Decided(self.on_determining_filename(item).await)
            }
            HostEvent::DownloadChanged(delta) => {
                EventOutcome::Tracked(self.on_download_changed(delta))
            }
        }
    }

    /// Handle one JSON message from the channel (control request or host event)
    /// and return the JSON reply. Malformed messages get an `{error}` reply.
    pub async fn handle_message(&self, text: &str) -> serde_json::Value {
        let reply = match Inbound::parse(text) {
            Ok(Inbound::Control(request)) => serde_json::to_value(self.handle_control(request)),
            Ok(Inbound::Event(event)) => Ok(self.handle_event(&event).await.to_json()),
            Err(e) => {
                tracing::debug!("rejected message: {}", e);
                serde_json::to_value(ControlResponse::error(e.to_string()))
            }
        };
        reply.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
    }

    pub fn handle_control(&self, request: ControlRequest) -> ControlResponse {
        let mut state = self.state();
        match request {
            ControlRequest::GetInterceptedDownloads => ControlResponse::Downloads {
                downloads: state.ledger.snapshot(),
            },
            ControlRequest::GetStats => ControlResponse::Stats(state.ledger.stats()),
            ControlRequest::GetConfig => ControlResponse::Config {
                config: ConfigSnapshot::from(&state.config),
            },
            ControlRequest::ToggleEnabled => {
                state.config.enabled = !state.config.enabled;
                tracing::info!(enabled = state.config.enabled, "interception toggled");
                ControlResponse::Enabled {
                    enabled: state.config.enabled,
                }
            }
            ControlRequest::ClearHistory => {
                state.ledger.clear();
                tracing::info!("intercept history cleared");
                ControlResponse::Cleared { success: true }
            }
            ControlRequest::GetCandidates => ControlResponse::Candidates {
                candidates: state.candidates.iter().cloned().collect(),
            },
        }
    }

    pub fn records(&self) -> Vec<InterceptRecord> {
        self.state().ledger.snapshot()
    }

    pub fn record(&self, id: RecordId) -> Option<InterceptRecord> {
        self.state().ledger.get(id).cloned()
    }

    pub fn stats(&self) -> LedgerStats {
        self.state().ledger.stats()
    }

    pub fn config(&self) -> DivertConfig {
        self.state().config.clone()
    }

    pub fn transfer_count(&self) -> usize {
        self.state().ledger.transfer_count()
    }

    pub fn candidate(&self, request_id: &str) -> Option<observer::CandidateRecord> {
        self.state().candidates.get(request_id).cloned()
    }
}
