//! `divert serve` – run the engine behind the control socket until Ctrl-C.

use anyhow::Result;
use divert_core::config::DivertConfig;
use divert_core::engine::Engine;
use divert_core::sim::SimulatedHost;
use std::path::Path;
use std::sync::Arc;

use crate::cli::control_socket::spawn_control_listener;

pub async fn run_serve(cfg: DivertConfig, socket: &Path) -> Result<()> {
    let engine = Arc::new(Engine::new(cfg, SimulatedHost::new()));
    let listener = spawn_control_listener(Arc::clone(&engine), socket)?;
    println!("divert engine listening on {}", socket.display());

    tokio::signal::ctrl_c().await?;
    listener.abort();
    let _ = std::fs::remove_file(socket);

    let stats = engine.stats();
    tracing::info!(
        total = stats.total,
        completed = stats.completed,
        failed = stats.failed,
        "engine stopped"
    );
    println!("Stopped. {} intercepted, {} completed, {} failed.", stats.total, stats.completed, stats.failed);
    Ok(())
}
