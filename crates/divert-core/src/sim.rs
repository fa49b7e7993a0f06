//! In-memory host used by the CLI and tests in place of a browser runtime.
//!
//! Submissions are accepted and assigned increasing transfer ids; the
//! "external downloader" does no I/O. Progress arrives later as
//! `downloadChanged` events from whoever drives the engine.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::events::{DownloadId, TransferId};
use crate::host::{Cookie, DownloadHost, HostError, SubmitRequest};

/// First transfer id handed out by a fresh host.
const FIRST_TRANSFER_ID: TransferId = 1000;

#[derive(Debug, Default)]
struct SimState {
    cookies: HashMap<String, Vec<Cookie>>,
    next_transfer: TransferId,
    cancelled: Vec<DownloadId>,
    erased: Vec<DownloadId>,
    submitted: Vec<SubmitRequest>,
    cookie_error: Option<String>,
    cancel_error: Option<String>,
    submit_error: Option<String>,
}

#[derive(Debug)]
pub struct SimulatedHost {
    state: Mutex<SimState>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                next_transfer: FIRST_TRANSFER_ID,
                ..SimState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register cookies returned for any URL on `host`.
    pub fn set_cookies(&self, host: &str, cookies: Vec<Cookie>) {
        self.state().cookies.insert(host.to_ascii_lowercase(), cookies);
    }

    /// Make cookie lookups fail with `message` (None restores success).
    pub fn fail_cookies(&self, message: Option<&str>) {
        self.state().cookie_error = message.map(str::to_string);
    }

    /// Make cancel and erase fail with `message`.
    pub fn fail_cancel(&self, message: Option<&str>) {
        self.state().cancel_error = message.map(str::to_string);
    }

    /// Make submissions fail with `message`.
    pub fn fail_submit(&self, message: Option<&str>) {
        self.state().submit_error = message.map(str::to_string);
    }

    pub fn cancelled(&self) -> Vec<DownloadId> {
        self.state().cancelled.clone()
    }

    pub fn erased(&self) -> Vec<DownloadId> {
        self.state().erased.clone()
    }

    pub fn submitted(&self) -> Vec<SubmitRequest> {
        self.state().submitted.clone()
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

#[async_trait]
impl DownloadHost for SimulatedHost {
    async fn cancel(&self, id: DownloadId) -> Result<(), HostError> {
        let mut state = self.state();
        if let Some(msg) = &state.cancel_error {
            return Err(HostError::new(msg.clone()));
        }
        state.cancelled.push(id);
        Ok(())
    }

    async fn erase(&self, id: DownloadId) -> Result<(), HostError> {
        let mut state = self.state();
        if let Some(msg) = &state.cancel_error {
            return Err(HostError::new(msg.clone()));
        }
        state.erased.push(id);
        Ok(())
    }

    async fn cookies(&self, url: &str) -> Result<Vec<Cookie>, HostError> {
        let state = self.state();
        if let Some(msg) = &state.cookie_error {
            return Err(HostError::new(msg.clone()));
        }
        Ok(host_of(url)
            .and_then(|h| state.cookies.get(&h).cloned())
            .unwrap_or_default())
    }

    async fn submit(&self, request: SubmitRequest) -> Result<TransferId, HostError> {
        let mut state = self.state();
        if let Some(msg) = &state.submit_error {
            return Err(HostError::new(msg.clone()));
        }
        let id = state.next_transfer;
        state.next_transfer += 1;
        tracing::debug!(transfer_id = id, url = %request.url, target = %request.filename, "simulated transfer accepted");
        state.submitted.push(request);
        Ok(id)
    }
}
