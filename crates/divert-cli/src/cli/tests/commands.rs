//! Tests for subcommand parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_serve_default_socket() {
    match parse(&["divert", "serve"]).command {
        CliCommand::Serve { socket } => assert!(socket.is_none()),
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_serve_socket() {
    match parse(&["divert", "serve", "--socket", "/tmp/d.sock"]).command {
        CliCommand::Serve { socket } => {
            assert_eq!(socket.as_deref(), Some(Path::new("/tmp/d.sock")))
        }
        _ => panic!("expected Serve with socket"),
    }
}

#[test]
fn cli_parse_replay_with_global_config() {
    let cli = parse(&["divert", "replay", "events.jsonl", "--config", "/etc/divert.toml"]);
    assert_eq!(cli.config_file.as_deref(), Some(Path::new("/etc/divert.toml")));
    match cli.command {
        CliCommand::Replay { path } => assert_eq!(path, Path::new("events.jsonl")),
        _ => panic!("expected Replay"),
    }
}

#[test]
fn cli_parse_check() {
    match parse(&[
        "divert",
        "check",
        "--filename",
        "setup.EXE",
        "--size",
        "2097152",
        "--referrer",
        "https://www.youtube.com/",
    ])
    .command
    {
        CliCommand::Check {
            filename,
            size,
            referrer,
        } => {
            assert_eq!(filename, "setup.EXE");
            assert_eq!(size, 2_097_152);
            assert_eq!(referrer.as_deref(), Some("https://www.youtube.com/"));
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_unknown_size() {
    match parse(&["divert", "check", "--filename", "a.zip", "--size", "-1"]).command {
        CliCommand::Check { size, referrer, .. } => {
            assert_eq!(size, -1);
            assert!(referrer.is_none());
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_requires_size() {
    assert!(Cli::try_parse_from(["divert", "check", "--filename", "a.zip"]).is_err());
}

#[test]
fn cli_parse_send() {
    match parse(&["divert", "send", "getStats"]).command {
        CliCommand::Send { action, socket } => {
            assert_eq!(action, "getStats");
            assert!(socket.is_none());
        }
        _ => panic!("expected Send"),
    }
}

#[test]
fn cli_parse_config() {
    assert!(matches!(
        parse(&["divert", "config"]).command,
        CliCommand::ShowConfig
    ));
}

#[test]
fn replay_lines_skip_comments_and_blanks() {
    let data = "# header\n\n  {\"action\":\"getStats\"}  \n#x\n{\"action\":\"getConfig\"}\n";
    let lines: Vec<_> = crate::cli::commands::replay_lines(data).collect();
    assert_eq!(lines, vec![r#"{"action":"getStats"}"#, r#"{"action":"getConfig"}"#]);
}
