//! Event builders and an engine wired to the simulated host.

#![allow(dead_code)]

use divert_core::config::DivertConfig;
use divert_core::engine::Engine;
use divert_core::events::{
    Delta, DownloadDelta, DownloadItem, DownloadState, HeadersReceived, HttpHeader, ResourceType,
    TransferId,
};
use divert_core::sim::SimulatedHost;

pub const MIB: i64 = 1024 * 1024;

pub fn engine() -> Engine<SimulatedHost> {
    Engine::new(DivertConfig::default(), SimulatedHost::new())
}

pub fn engine_with(config: DivertConfig) -> Engine<SimulatedHost> {
    Engine::new(config, SimulatedHost::new())
}

pub fn download(id: u64, filename: &str, size: i64, referrer: Option<&str>) -> DownloadItem {
    DownloadItem {
        id,
        filename: filename.to_string(),
        url: format!("https://files.example.com/get?id={id}"),
        final_url: Some(format!("https://cdn.example.com/{filename}")),
        file_size: size,
        referrer: referrer.map(str::to_string),
    }
}

pub fn response(request_id: &str, status: u16, headers: &[(&str, &str)]) -> HeadersReceived {
    HeadersReceived {
        request_id: request_id.to_string(),
        resource_type: ResourceType::MainFrame,
        status_code: status,
        url: format!("https://files.example.com/{request_id}"),
        response_headers: headers
            .iter()
            .map(|(n, v)| HttpHeader::new(*n, *v))
            .collect(),
        tab_id: 3,
    }
}

pub fn progress(id: TransferId, bytes: u64) -> DownloadDelta {
    DownloadDelta {
        id,
        bytes_received: Some(Delta::to(bytes)),
        ..DownloadDelta::default()
    }
}

pub fn finished(id: TransferId) -> DownloadDelta {
    DownloadDelta {
        id,
        state: Some(Delta::to(DownloadState::Complete)),
        ..DownloadDelta::default()
    }
}

pub fn interrupted(id: TransferId, error: &str) -> DownloadDelta {
    DownloadDelta {
        id,
        state: Some(Delta::to(DownloadState::Interrupted)),
        error: Some(Delta::to(error.to_string())),
        ..DownloadDelta::default()
    }
}
