pub mod cli;
pub mod commands;
pub mod config;
pub mod tui;

pub use tally_core as core;
pub use tally_core::keyboard;
pub use tally_core::model;
pub use tally_core::store;

pub use tally_core::AppConfig;
