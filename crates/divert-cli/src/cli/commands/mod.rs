//! CLI command handlers. Each command is in its own file.

mod check;
mod replay;
mod send;
mod serve;
mod show_config;

pub use check::run_check;
pub use replay::run_replay;
#[cfg(test)]
pub(crate) use replay::replay_lines;
pub use send::run_send;
pub use serve::run_serve;
pub use show_config::run_show_config;
