pub use tally_tui::cli;
pub use tally_tui::commands;
pub use tally_tui::config;
pub use tally_tui::tui;
pub use tally_tui::AppConfig;

pub use tally_core as core;
pub use tally_core::keyboard;
pub use tally_core::model;
pub use tally_core::store;
