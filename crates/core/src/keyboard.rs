//! Keybinding registry and dispatch.
//!
//! The engine owns a registry of id -> [`Shortcut`] and matches incoming
//! [`KeyPress`] events against it: key labels compare case-insensitively and
//! all four modifier flags must match exactly. Registry iteration is
//! unordered; if two enabled shortcuts collide on the same key+modifier pair,
//! either may win. There is no priority rule; callers are expected to keep
//! bindings disjoint.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use tracing::warn;

/// Modifier flags carried by an input event. Dispatch requires an exact
/// match: a modifier not asked for must be absent in the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };
}

/// Where a key event originated. Events from form-style targets are excluded
/// from global dispatch by default so typing never triggers shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Window,
    TextInput,
    TextArea,
    Select,
}

/// A single key event as reported by the host.
///
/// Key labels follow the DOM convention: printable keys by their character
/// (`"n"`, `"?"`), named keys by name (`"Escape"`).
#[derive(Debug, Clone)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
    pub target: TargetKind,
}

impl KeyPress {
    /// Event with no focused control, the common case for global shortcuts.
    pub fn window<K: Into<String>>(key: K, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            target: TargetKind::Window,
        }
    }

    pub fn from_target<K: Into<String>>(key: K, modifiers: Modifiers, target: TargetKind) -> Self {
        Self {
            key: key.into(),
            modifiers,
            target,
        }
    }
}

/// Shortcut grouping for the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Navigation,
    Editing,
    Filtering,
    General,
    Accessibility,
    Theme,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Navigation => "navigation",
            Category::Editing => "editing",
            Category::Filtering => "filtering",
            Category::General => "general",
            Category::Accessibility => "accessibility",
            Category::Theme => "theme",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "navigation" => Ok(Category::Navigation),
            "editing" => Ok(Category::Editing),
            "filtering" => Ok(Category::Filtering),
            "general" => Ok(Category::General),
            "accessibility" => Ok(Category::Accessibility),
            "theme" => Ok(Category::Theme),
            other => Err(anyhow!(
                "Unknown category '{}': expected navigation|editing|filtering|general|accessibility|theme",
                other
            )),
        }
    }
}

/// Zero-argument side-effecting callback bound to a shortcut. A returned
/// error is caught at dispatch, logged, and surfaced in the [`Dispatch`]
/// result; it never unwinds the event loop.
pub type ShortcutAction = Box<dyn Fn() -> anyhow::Result<()>>;

/// One registered keybinding.
pub struct Shortcut {
    pub id: String,
    pub key: String,
    pub modifiers: Modifiers,
    pub description: String,
    pub category: Category,
    pub enabled: bool,
    action: ShortcutAction,
}

impl Shortcut {
    pub fn new<I, K, D>(
        id: I,
        key: K,
        modifiers: Modifiers,
        description: D,
        category: Category,
        action: ShortcutAction,
    ) -> Self
    where
        I: Into<String>,
        K: Into<String>,
        D: Into<String>,
    {
        Self {
            id: id.into(),
            key: key.into(),
            modifiers,
            description: description.into(),
            category,
            enabled: true,
            action,
        }
    }

    fn matches(&self, event: &KeyPress) -> bool {
        self.enabled && self.key.eq_ignore_ascii_case(&event.key) && self.modifiers == event.modifiers
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shortcut")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("modifiers", &self.modifiers)
            .field("category", &self.category)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// How dispatch treats matched events.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Report the event as consumed so the host suppresses its default effect.
    pub prevent_default: bool,
    /// Report the event as consumed so the host stops forwarding it.
    pub stop_propagation: bool,
    /// Target kinds whose events never reach the registry.
    pub exclude_targets: Vec<TargetKind>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
            exclude_targets: vec![TargetKind::TextInput, TargetKind::TextArea, TargetKind::Select],
        }
    }
}

/// Outcome of one dispatch.
///
/// `consumed` is decided on match, before the action runs, so a failing
/// action still swallows the event exactly once.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub handled: bool,
    pub shortcut_id: Option<String>,
    pub consumed: bool,
    pub error: Option<String>,
}

impl Dispatch {
    fn unhandled() -> Self {
        Self::default()
    }
}

/// The fixed table of well-known bindings. Each is registered only when the
/// caller supplies an action for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultShortcut {
    AddTodo,
    SearchTodo,
    ToggleTheme,
    ShowHelp,
    FilterAll,
    FilterActive,
    FilterCompleted,
    ClearSearch,
}

impl DefaultShortcut {
    pub const ALL: [DefaultShortcut; 8] = [
        DefaultShortcut::AddTodo,
        DefaultShortcut::SearchTodo,
        DefaultShortcut::ToggleTheme,
        DefaultShortcut::ShowHelp,
        DefaultShortcut::FilterAll,
        DefaultShortcut::FilterActive,
        DefaultShortcut::FilterCompleted,
        DefaultShortcut::ClearSearch,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DefaultShortcut::AddTodo => "ADD_TODO",
            DefaultShortcut::SearchTodo => "SEARCH_TODO",
            DefaultShortcut::ToggleTheme => "TOGGLE_THEME",
            DefaultShortcut::ShowHelp => "SHOW_HELP",
            DefaultShortcut::FilterAll => "FILTER_ALL",
            DefaultShortcut::FilterActive => "FILTER_ACTIVE",
            DefaultShortcut::FilterCompleted => "FILTER_COMPLETED",
            DefaultShortcut::ClearSearch => "CLEAR_SEARCH",
        }
    }

    fn binding(&self) -> (&'static str, Modifiers, &'static str, Category) {
        match self {
            DefaultShortcut::AddTodo => {
                ("n", Modifiers::CTRL, "Add a task", Category::Editing)
            }
            DefaultShortcut::SearchTodo => {
                ("f", Modifiers::CTRL, "Search tasks", Category::Navigation)
            }
            DefaultShortcut::ToggleTheme => {
                ("t", Modifiers::CTRL, "Toggle theme", Category::Theme)
            }
            DefaultShortcut::ShowHelp => (
                "?",
                Modifiers::SHIFT,
                "Show keyboard help",
                Category::Accessibility,
            ),
            DefaultShortcut::FilterAll => {
                ("1", Modifiers::CTRL, "Show all tasks", Category::Filtering)
            }
            DefaultShortcut::FilterActive => (
                "2",
                Modifiers::CTRL,
                "Show active tasks",
                Category::Filtering,
            ),
            DefaultShortcut::FilterCompleted => (
                "3",
                Modifiers::CTRL,
                "Show completed tasks",
                Category::Filtering,
            ),
            DefaultShortcut::ClearSearch => (
                "Escape",
                Modifiers::NONE,
                "Clear the search",
                Category::Navigation,
            ),
        }
    }
}

/// Registry plus the two engine-wide toggles.
pub struct ShortcutEngine {
    shortcuts: HashMap<String, Shortcut>,
    options: DispatchOptions,
    enabled: bool,
    help_visible: bool,
}

impl Default for ShortcutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutEngine {
    pub fn new() -> Self {
        Self::with_options(DispatchOptions::default())
    }

    pub fn with_options(options: DispatchOptions) -> Self {
        Self {
            shortcuts: HashMap::new(),
            options,
            enabled: true,
            help_visible: false,
        }
    }

    /// Upsert by id; re-registering an id replaces the previous binding.
    pub fn register(&mut self, shortcut: Shortcut) {
        self.shortcuts.insert(shortcut.id.clone(), shortcut);
    }

    /// Register one entry from the default table with the supplied action.
    pub fn register_default(&mut self, which: DefaultShortcut, action: ShortcutAction) {
        let (key, modifiers, description, category) = which.binding();
        self.register(Shortcut::new(
            which.id(),
            key,
            modifiers,
            description,
            category,
            action,
        ));
    }

    /// Remove a binding; unknown ids are a no-op.
    pub fn unregister(&mut self, id: &str) {
        self.shortcuts.remove(id);
    }

    /// Drop every registered binding. Engine toggles are untouched.
    pub fn clear(&mut self) {
        self.shortcuts.clear();
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shortcuts.contains_key(id)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }

    /// Match an event against the registry and run the bound action.
    ///
    /// Never panics and never blocks: an action error is caught, logged and
    /// reported in the result so one bad binding cannot wedge the loop or
    /// disable itself for later dispatches.
    pub fn dispatch(&self, event: &KeyPress) -> Dispatch {
        if !self.enabled {
            return Dispatch::unhandled();
        }
        if self.options.exclude_targets.contains(&event.target) {
            return Dispatch::unhandled();
        }

        for shortcut in self.shortcuts.values() {
            if !shortcut.matches(event) {
                continue;
            }

            let consumed = self.options.prevent_default || self.options.stop_propagation;
            return match (shortcut.action)() {
                Ok(()) => Dispatch {
                    handled: true,
                    shortcut_id: Some(shortcut.id.clone()),
                    consumed,
                    error: None,
                },
                Err(err) => {
                    warn!(id = shortcut.id.as_str(), error = %err, "shortcut action failed");
                    Dispatch {
                        handled: false,
                        shortcut_id: Some(shortcut.id.clone()),
                        consumed,
                        error: Some(err.to_string()),
                    }
                }
            };
        }

        Dispatch::unhandled()
    }

    /// Shortcuts in one category, sorted by description for stable display.
    pub fn shortcuts_by_category(&self, category: Category) -> Vec<&Shortcut> {
        let mut found: Vec<&Shortcut> = self
            .shortcuts
            .values()
            .filter(|shortcut| shortcut.category == category)
            .collect();
        found.sort_by(|a, b| a.description.cmp(&b.description));
        found
    }
}

/// Render a binding as display text, e.g. "Ctrl + N" or "Shift + ?".
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts: Vec<String> = Vec::new();
    if shortcut.modifiers.ctrl {
        parts.push("Ctrl".into());
    }
    if shortcut.modifiers.alt {
        parts.push("Alt".into());
    }
    if shortcut.modifiers.shift {
        parts.push("Shift".into());
    }
    if shortcut.modifiers.meta {
        parts.push("\u{2318}".into());
    }
    parts.push(shortcut.key.to_uppercase());
    parts.join(" + ")
}
