//! CLI for the divert interception engine.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Parser, Subcommand};
use divert_core::config::{self, DivertConfig};
use divert_core::control;
use std::path::{Path, PathBuf};

use commands::{run_check, run_replay, run_send, run_serve, run_show_config};

/// Top-level CLI for divert.
#[derive(Debug, Parser)]
#[command(name = "divert")]
#[command(about = "divert: intercept large downloads and hand them to a background transfer tracker", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/divert/config.toml.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the engine behind a control socket (one JSON message per line).
    Serve {
        /// Socket path (default: ~/.local/state/divert/control.sock).
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Feed a JSON-lines file of events and control messages through a simulated host.
    Replay {
        /// Path to the JSON-lines file.
        path: PathBuf,
    },

    /// Evaluate the interception rules for one download without side effects.
    Check {
        /// Filename the browser proposed.
        #[arg(long)]
        filename: String,
        /// Declared size in bytes (-1 if unknown).
        #[arg(long, allow_hyphen_values = true)]
        size: i64,
        /// Referrer URL of the download.
        #[arg(long)]
        referrer: Option<String>,
    },

    /// Send a control action to a running engine and print the reply.
    Send {
        /// getInterceptedDownloads, getStats, getConfig, toggleEnabled, clearHistory or getCandidates.
        action: String,
        /// Socket path (default: ~/.local/state/divert/control.sock).
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Print the effective configuration.
    #[command(name = "config")]
    ShowConfig,
}

fn load_config(path: Option<&Path>) -> Result<DivertConfig> {
    match path {
        Some(p) => config::load_from(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config_file.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve { socket } => {
                let socket = match socket {
                    Some(p) => p,
                    None => control::default_control_socket_path()?,
                };
                run_serve(cfg, &socket).await?
            }
            CliCommand::Replay { path } => run_replay(cfg, &path).await?,
            CliCommand::Check {
                filename,
                size,
                referrer,
            } => run_check(&cfg, &filename, size, referrer.as_deref()),
            CliCommand::Send { action, socket } => {
                let socket = match socket {
                    Some(p) => p,
                    None => control::default_control_socket_path()?,
                };
                run_send(&socket, &action).await?
            }
            CliCommand::ShowConfig => run_show_config(&cfg, cli.config_file.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
