//! `divert replay <file>` – run a recorded event stream through a simulated host.
//!
//! Each non-blank line not starting with `#` is one JSON message (host event
//! or control request). Replies are printed one per line, then the ledger.

use anyhow::{Context, Result};
use divert_core::config::DivertConfig;
use divert_core::engine::Engine;
use divert_core::sim::SimulatedHost;
use std::path::Path;

pub async fn run_replay(cfg: DivertConfig, path: &Path) -> Result<()> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let engine = Engine::new(cfg, SimulatedHost::new());

    for line in replay_lines(&data) {
        let reply = engine.handle_message(line).await;
        println!("{}", reply);
    }

    print_ledger(&engine);
    Ok(())
}

/// Message lines of a replay file: blank lines and `#` comments are skipped.
pub(crate) fn replay_lines(data: &str) -> impl Iterator<Item = &str> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

fn print_ledger(engine: &Engine<SimulatedHost>) {
    let records = engine.records();
    if records.is_empty() {
        println!("No intercepted downloads.");
        return;
    }
    println!("{:<6} {:<12} {:<10} {:<8} {}", "ID", "STATUS", "SIZE", "PROG", "FILENAME");
    for r in records {
        let progress = r
            .progress
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<12} {:<10} {:<8} {}",
            r.id,
            r.status.as_str(),
            r.size,
            progress,
            r.filename
        );
    }
    let stats = engine.stats();
    println!(
        "total={} downloading={} completed={} failed={}",
        stats.total, stats.downloading, stats.completed, stats.failed
    );
}
