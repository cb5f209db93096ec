//! One-shot CLI commands executed against the store without the TUI.

use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::CliCommand;
use crate::model::Task;
use crate::tui::helpers::short_id;
use tally_core::{AppConfig, TaskStore};

pub fn execute(config: &AppConfig, command: CliCommand, out: &mut dyn Write) -> Result<()> {
    let mut store = TaskStore::open(config)?;

    match command {
        CliCommand::Tui => unreachable!("tui is dispatched before command execution"),
        CliCommand::Add(args) => {
            let text = args.text.join(" ");
            match store.add_task(&text) {
                Some(outcome) => writeln!(out, "Added {}  {}", outcome.id, outcome.text)?,
                None => writeln!(out, "Nothing added: task text is empty")?,
            }
        }
        CliCommand::List(args) => {
            if let Some(filter) = args.filter {
                store.set_filter(filter);
            }
            if let Some(search) = args.search {
                store.set_search(search);
            }
            let visible = store.visible_tasks();
            if visible.is_empty() {
                writeln!(out, "No tasks match")?;
            }
            for task in &visible {
                writeln!(out, "{}", render_line(task))?;
            }
        }
        CliCommand::ClearDone => {
            let done: Vec<String> = store
                .state()
                .tasks
                .iter()
                .filter(|task| task.completed)
                .map(|task| task.id.clone())
                .collect();
            for id in &done {
                store.delete_task(id);
            }
            writeln!(out, "Cleared {} completed task(s)", done.len())?;
        }
    }

    out.flush().context("failed to flush output")?;
    Ok(())
}

fn render_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!(
        "[{}] {}  {}  ({})",
        mark,
        short_id(&task.id),
        task.text,
        task.created_at.format("%Y-%m-%d %H:%M")
    )
}
