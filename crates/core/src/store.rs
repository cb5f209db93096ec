//! Reducer-driven task store with write-through persistence.
//!
//! All mutations funnel through [`reduce`], a pure transition function over
//! the closed [`Action`] set; the surrounding [`TaskStore`] validates input,
//! logs rejected operations, and persists the whole state after every change.
//! Persistence is best effort: a failed write is logged and the in-memory
//! state stays authoritative for the rest of the session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AppConfig;
use crate::model::{AddOutcome, DeleteResult, Filter, StatusUpdate, Task};
use crate::storage::{FileStorage, StorageBackend, STATE_KEY};

/// The canonical state owned by the store, which doubles as the persisted
/// payload: `{tasks, filter, searchQuery}` serialized as one unit.
///
/// `filter` and `searchQuery` default when absent so snapshots written by
/// older versions still hydrate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub search_query: String,
}

/// Every way the state can change. Mutating entry points translate validated
/// input into one of these and hand it to [`reduce`].
#[derive(Debug, Clone)]
pub enum Action {
    Add(Task),
    Toggle(String),
    Delete(String),
    SetFilter(Filter),
    SetSearch(String),
    Load(StoreState),
}

/// Pure, total transition function. Produces a fresh task vector on every
/// collection change so consumers can rely on cheap change detection; never
/// touches I/O.
pub fn reduce(state: &StoreState, action: Action) -> StoreState {
    match action {
        Action::Add(task) => {
            let mut tasks = state.tasks.clone();
            tasks.push(task);
            StoreState {
                tasks,
                ..state.clone()
            }
        }
        Action::Toggle(id) => StoreState {
            tasks: state
                .tasks
                .iter()
                .map(|task| {
                    if task.id == id {
                        Task {
                            completed: !task.completed,
                            ..task.clone()
                        }
                    } else {
                        task.clone()
                    }
                })
                .collect(),
            ..state.clone()
        },
        Action::Delete(id) => StoreState {
            tasks: state
                .tasks
                .iter()
                .filter(|task| task.id != id)
                .cloned()
                .collect(),
            ..state.clone()
        },
        Action::SetFilter(filter) => StoreState {
            filter,
            ..state.clone()
        },
        Action::SetSearch(search_query) => StoreState {
            search_query,
            ..state.clone()
        },
        Action::Load(loaded) => loaded,
    }
}

/// Owns the one [`StoreState`] for the session. Constructed explicitly and
/// injected into consumers; there is no process-wide instance.
pub struct TaskStore {
    state: StoreState,
    backend: Box<dyn StorageBackend>,
}

impl TaskStore {
    /// Open the store against file storage under the configured data
    /// directory, hydrating from a prior snapshot when one exists.
    ///
    /// An unusable data directory is a hard construction failure; a missing
    /// or corrupt snapshot is not.
    pub fn open(config: &AppConfig) -> Result<Self> {
        std::fs::create_dir_all(config.data_dir()).with_context(|| {
            format!(
                "Failed to prepare data directory at {}",
                config.data_dir().display()
            )
        })?;
        let backend = FileStorage::new(config.data_dir().to_path_buf());
        Ok(Self::with_backend(Box::new(backend)))
    }

    /// Open the store over an arbitrary backend, hydrating from it.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        let state = hydrate(backend.as_ref());
        Self { state, backend }
    }

    /// Read-only view of the current state. Presentation code reads through
    /// this and mutates only via the operations below.
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Append a task. Empty or whitespace-only text is rejected as a logged
    /// no-op; the UI is expected to have prevented it already.
    pub fn add_task(&mut self, text: &str) -> Option<AddOutcome> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            warn!("rejected add: task text is empty");
            return None;
        }

        let task = Task::new(trimmed.to_string());
        let outcome = AddOutcome {
            id: task.id.clone(),
            text: task.text.clone(),
        };
        self.apply(Action::Add(task));
        Some(outcome)
    }

    /// Flip completion on one task. Unknown ids are logged no-ops.
    pub fn toggle_task(&mut self, id: &str) -> StatusUpdate {
        if !self.contains(id) {
            warn!(id, "toggle ignored: no task with that id");
            return StatusUpdate {
                id: id.to_string(),
                changed: false,
            };
        }

        self.apply(Action::Toggle(id.to_string()));
        StatusUpdate {
            id: id.to_string(),
            changed: true,
        }
    }

    /// Remove one task, preserving the relative order of the rest. Deleting
    /// an id that is already gone is a logged no-op.
    pub fn delete_task(&mut self, id: &str) -> DeleteResult {
        if !self.contains(id) {
            warn!(id, "delete ignored: no task with that id");
            return DeleteResult {
                id: id.to_string(),
                deleted: false,
            };
        }

        self.apply(Action::Delete(id.to_string()));
        DeleteResult {
            id: id.to_string(),
            deleted: true,
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.apply(Action::SetFilter(filter));
    }

    /// Set the search query verbatim; not trimmed.
    pub fn set_search<T: Into<String>>(&mut self, query: T) {
        self.apply(Action::SetSearch(query.into()));
    }

    /// Derived view: filter predicate, then case-insensitive substring
    /// search, insertion order preserved. Recomputed on every call.
    pub fn visible_tasks(&self) -> Vec<Task> {
        let query = self.state.search_query.to_lowercase();
        self.state
            .tasks
            .iter()
            .filter(|task| self.state.filter.matches(task))
            .filter(|task| query.is_empty() || task.text.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.state.tasks.iter().any(|task| task.id == id)
    }

    fn apply(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
        self.persist();
    }

    // Write-through after every mutation. Failures never reach the caller.
    fn persist(&self) {
        let payload = match serde_json::to_string(&self.state) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize store state");
                return;
            }
        };
        if let Err(err) = self.backend.write(STATE_KEY, &payload) {
            warn!(error = %err, "failed to persist store state");
        }
    }
}

/// Restore a prior snapshot, falling back to defaults on anything but a
/// clean read. Absent and unparseable payloads differ only in log noise.
fn hydrate(backend: &dyn StorageBackend) -> StoreState {
    let payload = match backend.read(STATE_KEY) {
        Ok(Some(payload)) => payload,
        Ok(None) => return StoreState::default(),
        Err(err) => {
            warn!(error = %err, "failed to read stored state; starting fresh");
            return StoreState::default();
        }
    };

    match serde_json::from_str::<StoreState>(&payload) {
        Ok(state) => reduce(&StoreState::default(), Action::Load(state)),
        Err(err) => {
            warn!(error = %err, "stored state is unparseable; starting fresh");
            StoreState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::SubsecRound;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::storage::MemoryStorage;

    fn memory_store() -> TaskStore {
        TaskStore::with_backend(Box::new(MemoryStorage::new()))
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.text.as_str()).collect()
    }

    #[test]
    fn add_appends_non_empty_text_only() {
        let mut store = memory_store();

        assert!(store.add_task("Buy milk").is_some());
        assert!(store.add_task("   ").is_none());
        assert!(store.add_task("").is_none());
        assert!(store.add_task("  Call mom  ").is_some());

        assert_eq!(texts(&store.state().tasks), vec!["Buy milk", "Call mom"]);
    }

    #[test]
    fn add_trims_before_storage() {
        let mut store = memory_store();
        let outcome = store.add_task("  pay rent \n").unwrap();
        assert_eq!(outcome.text, "pay rent");
        assert_eq!(store.state().tasks[0].text, "pay rent");
    }

    #[test]
    fn toggle_twice_is_involution() {
        let mut store = memory_store();
        let id = store.add_task("water plants").unwrap().id;

        assert!(store.toggle_task(&id).changed);
        assert!(store.state().tasks[0].completed);

        assert!(store.toggle_task(&id).changed);
        assert!(!store.state().tasks[0].completed);
    }

    #[test]
    fn toggle_touches_only_the_named_task() {
        let mut store = memory_store();
        let first = store.add_task("one").unwrap().id;
        store.add_task("two").unwrap();

        store.toggle_task(&first);

        assert!(store.state().tasks[0].completed);
        assert!(!store.state().tasks[1].completed);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = memory_store();
        store.add_task("one").unwrap();

        let update = store.toggle_task("missing");
        assert!(!update.changed);
        assert!(!store.state().tasks[0].completed);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = memory_store();
        let id = store.add_task("one").unwrap().id;
        store.add_task("two").unwrap();

        assert!(store.delete_task(&id).deleted);
        assert!(!store.delete_task(&id).deleted);
        assert_eq!(texts(&store.state().tasks), vec!["two"]);
    }

    #[test]
    fn delete_preserves_relative_order() {
        let mut store = memory_store();
        store.add_task("a").unwrap();
        let middle = store.add_task("b").unwrap().id;
        store.add_task("c").unwrap();

        store.delete_task(&middle);
        assert_eq!(texts(&store.state().tasks), vec!["a", "c"]);
    }

    #[rstest]
    #[case(Filter::All, vec!["Buy milk", "Call mom", "Ship crate"])]
    #[case(Filter::Active, vec!["Call mom", "Ship crate"])]
    #[case(Filter::Completed, vec!["Buy milk"])]
    fn visible_tasks_respects_filter(#[case] filter: Filter, #[case] expected: Vec<&str>) {
        let mut store = memory_store();
        let done = store.add_task("Buy milk").unwrap().id;
        store.add_task("Call mom").unwrap();
        store.add_task("Ship crate").unwrap();
        store.toggle_task(&done);

        store.set_filter(filter);
        assert_eq!(texts(&store.visible_tasks()), expected);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut store = memory_store();
        store.add_task("Review PR").unwrap();
        store.add_task("prepare slides").unwrap();
        store.add_task("lunch").unwrap();

        store.set_search("PR");
        assert_eq!(
            texts(&store.visible_tasks()),
            vec!["Review PR", "prepare slides"]
        );
    }

    #[test]
    fn search_composes_with_filter() {
        let mut store = memory_store();
        let done = store.add_task("abc done").unwrap().id;
        store.add_task("abc open").unwrap();
        store.add_task("xyz done").unwrap();
        store.toggle_task(&done);

        store.set_filter(Filter::Completed);
        store.set_search("abc");
        assert_eq!(texts(&store.visible_tasks()), vec!["abc done"]);
    }

    #[test]
    fn search_query_is_not_trimmed() {
        let mut store = memory_store();
        store.add_task("a b").unwrap();
        store.add_task("ab").unwrap();

        store.set_search(" b");
        assert_eq!(store.state().search_query, " b");
        assert_eq!(texts(&store.visible_tasks()), vec!["a b"]);
    }

    #[test]
    fn scenario_add_toggle_delete() {
        let mut store = memory_store();
        let milk = store.add_task("Buy milk").unwrap().id;
        let mom = store.add_task("Call mom").unwrap().id;

        store.toggle_task(&milk);

        store.set_filter(Filter::Active);
        assert_eq!(texts(&store.visible_tasks()), vec!["Call mom"]);
        store.set_filter(Filter::Completed);
        assert_eq!(texts(&store.visible_tasks()), vec!["Buy milk"]);

        store.delete_task(&mom);
        store.set_filter(Filter::All);
        assert_eq!(texts(&store.visible_tasks()), vec!["Buy milk"]);
    }

    #[test]
    fn reduce_leaves_input_state_untouched() {
        let mut store = memory_store();
        store.add_task("stable").unwrap();
        let before = store.state().clone();

        let after = reduce(&before, Action::SetFilter(Filter::Active));
        assert_eq!(before.filter, Filter::All);
        assert_eq!(after.filter, Filter::Active);
        assert_eq!(before.tasks, after.tasks);
    }

    #[test]
    fn every_mutation_writes_through() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = TaskStore::with_backend(Box::new(backend.clone()));

        store.add_task("persisted").unwrap();
        let raw = backend.read(STATE_KEY).unwrap().unwrap();
        assert!(raw.contains("persisted"));

        store.set_filter(Filter::Active);
        let raw = backend.read(STATE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"filter\":\"active\""));
        assert!(raw.contains("\"searchQuery\""));
    }

    #[test]
    fn snapshot_round_trip_preserves_state() {
        let mut store = memory_store();
        let id = store.add_task("round trip").unwrap().id;
        store.toggle_task(&id);
        store.set_filter(Filter::Completed);
        store.set_search("round");

        let payload = serde_json::to_string(store.state()).unwrap();
        let restored: StoreState = serde_json::from_str(&payload).unwrap();
        assert_eq!(&restored, store.state());
        assert_eq!(restored.tasks[0].created_at, store.state().tasks[0].created_at);
    }

    #[test]
    fn hydrates_from_prior_session() {
        let backend = Arc::new(MemoryStorage::new());
        {
            let mut store = TaskStore::with_backend(Box::new(backend.clone()));
            store.add_task("from last time").unwrap();
            store.set_filter(Filter::Active);
            store.set_search("last");
        }

        let store = TaskStore::with_backend(Box::new(backend));
        assert_eq!(texts(&store.state().tasks), vec!["from last time"]);
        assert_eq!(store.state().filter, Filter::Active);
        assert_eq!(store.state().search_query, "last");
    }

    #[test]
    fn hydrates_timestamps_with_fidelity() {
        let backend = Arc::new(MemoryStorage::new());
        let created = {
            let mut store = TaskStore::with_backend(Box::new(backend.clone()));
            store.add_task("timed").unwrap();
            store.state().tasks[0].created_at
        };

        let store = TaskStore::with_backend(Box::new(backend));
        let restored = store.state().tasks[0].created_at;
        // RFC 3339 payload keeps sub-second precision.
        assert_eq!(restored, created);
        assert_eq!(restored.round_subsecs(3), created.round_subsecs(3));
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let backend = Arc::new(MemoryStorage::new());
        backend.write(STATE_KEY, "{not json").unwrap();

        let store = TaskStore::with_backend(Box::new(backend));
        assert_eq!(store.state(), &StoreState::default());
    }

    #[test]
    fn snapshot_without_optional_fields_hydrates() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .write(STATE_KEY, "{\"tasks\":[]}")
            .unwrap();

        let store = TaskStore::with_backend(Box::new(backend));
        assert_eq!(store.state().filter, Filter::All);
        assert_eq!(store.state().search_query, "");
    }

    #[test]
    fn write_failure_keeps_session_working() {
        struct FailingWrites;
        impl StorageBackend for FailingWrites {
            fn read(&self, _key: &str) -> Result<Option<String>, crate::storage::StorageError> {
                Ok(None)
            }
            fn write(&self, key: &str, _value: &str) -> Result<(), crate::storage::StorageError> {
                Err(crate::storage::StorageError::Write {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                })
            }
        }

        let mut store = TaskStore::with_backend(Box::new(FailingWrites));
        assert!(store.add_task("still works").is_some());
        assert_eq!(texts(&store.state().tasks), vec!["still works"]);
    }

    #[test]
    fn open_persists_across_processes_on_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig::from_data_dir(temp.path().to_path_buf());

        {
            let mut store = TaskStore::open(&config).unwrap();
            store.add_task("durable").unwrap();
        }
        assert!(config.state_path().exists());

        let store = TaskStore::open(&config).unwrap();
        assert_eq!(texts(&store.state().tasks), vec!["durable"]);
    }
}
