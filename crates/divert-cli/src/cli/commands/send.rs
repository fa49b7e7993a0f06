//! `divert send <action>` – query or control a running engine.

use anyhow::{bail, Result};
use divert_core::control::ControlRequest;
use std::path::Path;

use crate::cli::control_socket::send_message;

pub async fn run_send(socket: &Path, action: &str) -> Result<()> {
    let Some(request) = ControlRequest::from_action(action) else {
        bail!("unknown action {action:?}");
    };
    let reply = send_message(socket, &serde_json::to_value(request)?).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
