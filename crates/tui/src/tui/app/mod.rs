use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::anyhow;
use ratatui::style::{Color, Style};
use ratatui::widgets::ListState;

use super::buffer::TextBuffer;
use super::constants::*;
use tally_core::keyboard::{DefaultShortcut, ShortcutAction, ShortcutEngine};
use tally_core::model::{Filter, Task};
use tally_core::TaskStore;

mod input;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Add,
    Search,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    fn toggle(self) -> Self {
        match self {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

const STATUS_TTL: Duration = Duration::from_secs(6);

/// What a shortcut action asks the app to do. Actions run inside dispatch
/// and only enqueue; the app drains the queue afterwards and applies store
/// operations and focus changes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppCommand {
    FocusAdd,
    FocusSearch,
    ToggleTheme,
    ToggleHelp,
    SetFilter(Filter),
    ClearSearch,
}

fn enqueue(sender: &Sender<AppCommand>, command: AppCommand) -> ShortcutAction {
    let sender = sender.clone();
    Box::new(move || {
        sender
            .send(command.clone())
            .map_err(|_| anyhow!("app command channel closed"))
    })
}

/// Bind the whole default table to app commands.
fn wire_shortcuts(engine: &mut ShortcutEngine, sender: &Sender<AppCommand>) {
    engine.register_default(DefaultShortcut::AddTodo, enqueue(sender, AppCommand::FocusAdd));
    engine.register_default(
        DefaultShortcut::SearchTodo,
        enqueue(sender, AppCommand::FocusSearch),
    );
    engine.register_default(
        DefaultShortcut::ToggleTheme,
        enqueue(sender, AppCommand::ToggleTheme),
    );
    engine.register_default(DefaultShortcut::ShowHelp, enqueue(sender, AppCommand::ToggleHelp));
    engine.register_default(
        DefaultShortcut::FilterAll,
        enqueue(sender, AppCommand::SetFilter(Filter::All)),
    );
    engine.register_default(
        DefaultShortcut::FilterActive,
        enqueue(sender, AppCommand::SetFilter(Filter::Active)),
    );
    engine.register_default(
        DefaultShortcut::FilterCompleted,
        enqueue(sender, AppCommand::SetFilter(Filter::Completed)),
    );
    engine.register_default(
        DefaultShortcut::ClearSearch,
        enqueue(sender, AppCommand::ClearSearch),
    );
}

pub(crate) struct App {
    store: TaskStore,
    engine: ShortcutEngine,
    commands: Receiver<AppCommand>,
    input_mode: InputMode,
    input: TextBuffer,
    selected: usize,
    list_state: ListState,
    status: Option<StatusMessage>,
    pending_delete: Option<String>,
    confirm_choice: ConfirmChoice,
    dark_theme: bool,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(store: TaskStore) -> Self {
        let (sender, receiver) = channel();
        let mut engine = ShortcutEngine::new();
        wire_shortcuts(&mut engine, &sender);

        let mut app = Self {
            store,
            engine,
            commands: receiver,
            input_mode: InputMode::Normal,
            input: TextBuffer::new(),
            selected: 0,
            list_state: ListState::default(),
            status: None,
            pending_delete: None,
            confirm_choice: ConfirmChoice::No,
            dark_theme: true,
            should_quit: false,
        };
        app.clamp_selection();
        app
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn on_tick(&mut self) {
        if let Some(status) = &self.status {
            if status.created_at.elapsed() >= STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, text: T) {
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, text: T) {
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }

    fn visible(&self) -> Vec<Task> {
        self.store.visible_tasks()
    }

    fn selected_task(&self) -> Option<Task> {
        self.visible().into_iter().nth(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    fn drain_commands(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.apply_command(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply_command(&mut self, command: AppCommand) {
        match command {
            AppCommand::FocusAdd => {
                self.input_mode = InputMode::Add;
                self.input.clear();
                self.set_status_info(STATUS_ENTER_ADD);
            }
            AppCommand::FocusSearch => {
                self.input_mode = InputMode::Search;
                let query = self.store.state().search_query.clone();
                self.input.set(query);
                self.set_status_info(STATUS_ENTER_SEARCH);
            }
            AppCommand::ToggleTheme => {
                self.dark_theme = !self.dark_theme;
                let label = if self.dark_theme { "dark" } else { "light" };
                self.set_status_info(format!("Switched to the {label} theme"));
            }
            AppCommand::ToggleHelp => {
                self.engine.toggle_help();
                if self.engine.help_visible() {
                    self.input_mode = InputMode::Help;
                    self.set_status_info(STATUS_HELP);
                } else {
                    self.input_mode = InputMode::Normal;
                    self.status = None;
                }
            }
            AppCommand::SetFilter(filter) => {
                self.store.set_filter(filter);
                self.clamp_selection();
                self.set_status_info(format!("Showing {filter} tasks"));
            }
            AppCommand::ClearSearch => {
                if !self.store.state().search_query.is_empty() {
                    self.store.set_search("");
                    self.clamp_selection();
                    self.set_status_info(STATUS_SEARCH_CLEARED);
                }
            }
        }
    }
}
