use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);

pub(crate) const STATUS_ENTER_ADD: &str = "Enter a task description (Esc to cancel)";
pub(crate) const STATUS_ENTER_SEARCH: &str =
    "Type to search as you go • Enter/Esc to leave the search box";
pub(crate) const STATUS_HELP: &str = "Keyboard reference (? or Esc closes)";
pub(crate) const STATUS_CONFIRM_DELETE: &str =
    "Confirm deletion: arrows choose, Enter confirms, Esc cancels";
pub(crate) const STATUS_SEARCH_CLEARED: &str = "Cleared search";
pub(crate) const STATUS_SHORTCUTS_DISABLED: &str = "Global shortcuts disabled (g re-enables)";
pub(crate) const STATUS_SHORTCUTS_ENABLED: &str = "Global shortcuts enabled";
