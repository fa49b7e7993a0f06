//! Control socket: server (during `divert serve`) and client (for `divert send`).
//! Protocol: one JSON message per line in, one JSON reply per line out.

use anyhow::{Context, Result};
use divert_core::engine::Engine;
use divert_core::host::DownloadHost;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Binds `path` (replacing a stale socket) and spawns the accept loop.
/// Each connection is served on its own task; blank lines are skipped.
pub fn spawn_control_listener<H>(
    engine: Arc<Engine<H>>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>>
where
    H: DownloadHost + 'static,
{
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)
        .with_context(|| format!("binding control socket {}", path.display()))?;
    tracing::info!(path = %path.display(), "control socket listening");

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let engine = Arc::clone(&engine);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(engine, stream).await {
                            tracing::debug!("control connection closed: {}", e);
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

async fn serve_connection<H: DownloadHost>(engine: Arc<Engine<H>>, stream: UnixStream) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = engine.handle_message(line).await;
        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        write.write_all(out.as_bytes()).await?;
    }
    Ok(())
}

/// Sends one JSON message and returns the parsed reply line.
pub async fn send_message(socket_path: &Path, message: &serde_json::Value) -> Result<serde_json::Value> {
    let stream = UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connecting to {}", socket_path.display()))?;
    let (read, mut write) = stream.into_split();

    let mut msg = serde_json::to_string(message)?;
    msg.push('\n');
    write.write_all(msg.as_bytes()).await?;

    let mut lines = BufReader::new(read).lines();
    let reply = lines
        .next_line()
        .await?
        .context("engine closed the connection without replying")?;
    Ok(serde_json::from_str(&reply)?)
}
