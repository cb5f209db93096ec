use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{App, AppCommand, ConfirmChoice, InputMode};
use crate::tui::constants::{
    STATUS_CONFIRM_DELETE, STATUS_SHORTCUTS_DISABLED, STATUS_SHORTCUTS_ENABLED,
};
use tally_core::keyboard::{KeyPress, Modifiers, TargetKind};

/// Translate a terminal key event into the engine's event shape. Keys the
/// registry could never bind (arrows, function keys) are not translated.
fn key_press_from_event(key: &KeyEvent, target: TargetKind) -> Option<KeyPress> {
    let modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        meta: key.modifiers.contains(KeyModifiers::SUPER),
    };
    let label = match key.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Esc => "Escape".to_string(),
        _ => return None,
    };
    Some(KeyPress::from_target(label, modifiers, target))
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Add => self.handle_add_mode(key),
            InputMode::Search => self.handle_search_mode(key),
            InputMode::Help => self.handle_help_mode(key),
            InputMode::ConfirmDelete => self.handle_confirm_delete_mode(key),
        }
        Ok(())
    }

    /// Run one event through the shortcut engine and apply whatever the
    /// bound actions enqueued. Returns true when the event was consumed.
    fn global_dispatch(&mut self, key: &KeyEvent, target: TargetKind) -> bool {
        let Some(press) = key_press_from_event(key, target) else {
            return false;
        };
        let result = self.engine.dispatch(&press);
        self.drain_commands();
        if let Some(error) = result.error {
            self.set_status_error(format!("Shortcut failed: {error}"));
        }
        result.consumed
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if self.global_dispatch(&key, TargetKind::Window) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('a') => self.apply_command(AppCommand::FocusAdd),
            KeyCode::Char('/') => self.apply_command(AppCommand::FocusSearch),
            KeyCode::Char('g') => {
                self.engine.toggle_enabled();
                let status = if self.engine.enabled() {
                    STATUS_SHORTCUTS_ENABLED
                } else {
                    STATUS_SHORTCUTS_DISABLED
                };
                self.set_status_info(status);
            }
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('x') | KeyCode::Delete => self.prompt_delete(),
            _ => {}
        }
    }

    fn handle_add_mode(&mut self, key: KeyEvent) {
        // The add input is a form target: global bindings must stay inert
        // while it has focus.
        if self.global_dispatch(&key, TargetKind::TextInput) {
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_add(),
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete_char(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert_char(c);
            }
            _ => {}
        }
    }

    fn handle_search_mode(&mut self, key: KeyEvent) {
        if self.global_dispatch(&key, TargetKind::TextInput) {
            return;
        }

        let mut edited = false;
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Backspace => {
                self.input.backspace();
                edited = true;
            }
            KeyCode::Delete => {
                self.input.delete_char();
                edited = true;
            }
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert_char(c);
                edited = true;
            }
            _ => {}
        }

        // Search narrows live, keystroke by keystroke.
        if edited {
            self.store.set_search(self.input.as_str());
            self.clamp_selection();
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') => {
                self.apply_command(AppCommand::ToggleHelp);
            }
            _ => {}
        }
    }

    fn handle_confirm_delete_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.pending_delete = None;
                self.input_mode = InputMode::Normal;
                self.set_status_info("Deletion cancelled");
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                self.confirm_choice = self.confirm_choice.toggle();
            }
            KeyCode::Enter => {
                if self.confirm_choice == ConfirmChoice::Yes {
                    self.perform_delete();
                } else {
                    self.pending_delete = None;
                    self.set_status_info("Deletion cancelled");
                }
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn submit_add(&mut self) {
        match self.store.add_task(self.input.as_str()) {
            Some(outcome) => {
                self.set_status_info(format!("Added \"{}\"", outcome.text));
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.select_last();
            }
            None => self.set_status_error("Task text is empty"),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        self.store.toggle_task(&task.id);
        self.clamp_selection();
    }

    fn prompt_delete(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        self.pending_delete = Some(task.id);
        self.confirm_choice = ConfirmChoice::No;
        self.input_mode = InputMode::ConfirmDelete;
        self.set_status_info(STATUS_CONFIRM_DELETE);
    }

    fn perform_delete(&mut self) {
        if let Some(id) = self.pending_delete.take() {
            let result = self.store.delete_task(&id);
            if result.deleted {
                self.set_status_info("Task deleted");
            } else {
                self.set_status_error("Task was already gone");
            }
            self.clamp_selection();
        }
    }

    fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.clamp_selection();
    }

    fn select_first(&mut self) {
        self.selected = 0;
        self.clamp_selection();
    }

    fn select_last(&mut self) {
        let len = self.visible().len();
        self.selected = len.saturating_sub(1);
        self.clamp_selection();
    }
}
