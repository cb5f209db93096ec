pub mod config;
pub mod keyboard;
pub mod model;
pub mod storage;
pub mod store;

pub use config::AppConfig;
pub use keyboard::{
    format_shortcut, Category, DefaultShortcut, Dispatch, DispatchOptions, KeyPress, Modifiers,
    Shortcut, ShortcutAction, ShortcutEngine, TargetKind,
};
pub use model::{AddOutcome, DeleteResult, Filter, StatusUpdate, Task};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, STATE_KEY};
pub use store::{reduce, Action, StoreState, TaskStore};
