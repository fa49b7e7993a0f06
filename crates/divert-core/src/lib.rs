pub mod config;
pub mod logging;

pub mod control;
pub mod engine;
pub mod events;
pub mod filename;
pub mod host;
pub mod ledger;
pub mod observer;
pub mod policy;
pub mod sim;
pub mod tracker;
