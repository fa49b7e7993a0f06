//! `divert config` – print the effective configuration.

use anyhow::Result;
use divert_core::config::{self, DivertConfig};
use std::path::Path;

pub fn run_show_config(cfg: &DivertConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
