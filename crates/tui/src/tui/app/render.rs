use chrono::Utc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use super::{App, ConfirmChoice, InputMode};
use crate::tui::constants::APP_VERSION;
use crate::tui::helpers::{age_label, centered_rect, short_id};
use tally_core::keyboard::{format_shortcut, Category};
use tally_core::model::Filter;

const FILTER_TABS: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

const HELP_CATEGORIES: [Category; 6] = [
    Category::Editing,
    Category::Navigation,
    Category::Filtering,
    Category::Theme,
    Category::Accessibility,
    Category::General,
];

impl App {
    fn accent(&self) -> Color {
        if self.dark_theme {
            Color::Cyan
        } else {
            Color::Blue
        }
    }

    pub(crate) fn draw(&mut self, f: &mut Frame) {
        let editing = matches!(self.input_mode, InputMode::Add | InputMode::Search);
        let input_height = if editing { 3 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(input_height),
                Constraint::Length(2),
            ])
            .split(f.size());

        self.draw_tabs(f, chunks[0]);
        self.draw_list(f, chunks[1]);
        if editing {
            self.draw_input(f, chunks[2]);
        }
        self.draw_footer(f, chunks[3]);

        if self.engine.help_visible() {
            self.draw_help_overlay(f);
        }
        if self.input_mode == InputMode::ConfirmDelete {
            self.draw_confirm_overlay(f);
        }
    }

    fn draw_tabs(&self, f: &mut Frame, area: Rect) {
        let state = self.store.state();
        let titles: Vec<Line> = FILTER_TABS
            .iter()
            .map(|filter| {
                let count = state.tasks.iter().filter(|t| filter.matches(t)).count();
                Line::from(format!("{} ({})", filter, count))
            })
            .collect();
        let selected = FILTER_TABS
            .iter()
            .position(|filter| *filter == state.filter)
            .unwrap_or(0);

        let mut title = String::from(" tally ");
        if !state.search_query.is_empty() {
            title = format!(" tally / search: \"{}\" ", state.search_query);
        }

        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(self.accent())
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(tabs, area);
    }

    fn draw_list(&mut self, f: &mut Frame, area: Rect) {
        let now = Utc::now();
        let items: Vec<ListItem> = self
            .visible()
            .iter()
            .map(|task| {
                let mark = if task.completed { "[x]" } else { "[ ]" };
                let mut text_style = Style::default();
                if task.completed {
                    text_style = text_style
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT);
                }
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{mark} "), Style::default().fg(self.accent())),
                    Span::styled(task.text.clone(), text_style),
                    Span::styled(
                        format!(
                            "  {}  {}",
                            short_id(&task.id),
                            age_label(task.created_at, now)
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let empty = items.is_empty();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ")
            .block(Block::default().borders(Borders::ALL).title(" tasks "));
        f.render_stateful_widget(list, area, &mut self.list_state);

        if empty {
            let hint = Paragraph::new("No tasks here. Press a (or Ctrl+N) to add one.")
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            let inner = Rect {
                x: area.x + 2,
                y: area.y + 1,
                width: area.width.saturating_sub(4),
                height: 1,
            };
            f.render_widget(hint, inner);
        }
    }

    fn draw_input(&self, f: &mut Frame, area: Rect) {
        let title = match self.input_mode {
            InputMode::Add => " add task ",
            InputMode::Search => " search ",
            _ => "",
        };
        let input = Paragraph::new(self.input.as_str())
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
        f.set_cursor(area.x + 1 + self.input.cursor_col() as u16, area.y + 1);
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(status) => Line::styled(status.text.clone(), status.style()),
            None => {
                let mut hints = String::from(
                    "a add • / search • Space toggle • x delete • Shift+? help • q quit",
                );
                if !self.engine.enabled() {
                    hints.push_str(" • shortcuts OFF");
                }
                Line::styled(hints, Style::default().fg(Color::DarkGray))
            }
        };
        let footer = Paragraph::new(vec![
            line,
            Line::styled(
                format!("tally v{APP_VERSION}"),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(footer, area);
    }

    fn draw_help_overlay(&self, f: &mut Frame) {
        let area = centered_rect(46, 20, f.size());
        f.render_widget(Clear, area);

        let mut lines: Vec<Line> = Vec::new();
        for category in HELP_CATEGORIES {
            let shortcuts = self.engine.shortcuts_by_category(category);
            if shortcuts.is_empty() {
                continue;
            }
            lines.push(Line::styled(
                category.to_string(),
                Style::default()
                    .fg(self.accent())
                    .add_modifier(Modifier::BOLD),
            ));
            for shortcut in shortcuts {
                lines.push(Line::from(format!(
                    "  {:<14} {}",
                    format_shortcut(shortcut),
                    shortcut.description
                )));
            }
            lines.push(Line::from(""));
        }

        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" keyboard "))
            .wrap(Wrap { trim: false });
        f.render_widget(help, area);
    }

    fn draw_confirm_overlay(&self, f: &mut Frame) {
        let area = centered_rect(34, 5, f.size());
        f.render_widget(Clear, area);

        let choice_style = |choice: ConfirmChoice| {
            if self.confirm_choice == choice {
                Style::default()
                    .fg(self.accent())
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            }
        };

        let body = vec![
            Line::from("Delete this task?"),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Yes  ", choice_style(ConfirmChoice::Yes)),
                Span::raw("   "),
                Span::styled("  No  ", choice_style(ConfirmChoice::No)),
            ]),
        ];
        let dialog = Paragraph::new(body)
            .block(Block::default().borders(Borders::ALL).title(" confirm "));
        f.render_widget(dialog, area);
    }
}
