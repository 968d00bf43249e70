//! User configuration — reader settings, keybindings, and persistence.
//!
//! Stored as simple `key = value` lines at
//! `$XDG_CONFIG_HOME/tikkun/config.toml` (default `~/.config/tikkun/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ToggleAnnotations,
    JumpToPage,
    NextSection,
    PreviousSection,
    Quit,
}

impl Action {
    /// Ordered list of all actions (config file and help line order).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::ToggleAnnotations,
        Action::JumpToPage,
        Action::NextSection,
        Action::PreviousSection,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::ToggleAnnotations => "toggle_annotations",
            Action::JumpToPage => "jump_to_page",
            Action::NextSection => "next_section",
            Action::PreviousSection => "previous_section",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT take part in matching.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// `"Shift+Tab"`, `"PgDn"`, `"q"`.  `short` picks the status-bar
    /// spelling over the config-file one.
    fn render(&self, short: bool) -> String {
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let key = match (self.code, short) {
            (KeyCode::Char(' '), _) => "Space".to_string(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::Up, false) => "Up".into(),
            (KeyCode::Down, false) => "Down".into(),
            (KeyCode::PageUp, false) => "PageUp".into(),
            (KeyCode::PageDown, false) => "PageDown".into(),
            (KeyCode::Left, _) => "Left".into(),
            (KeyCode::Right, _) => "Right".into(),
            (KeyCode::Enter, _) => "Enter".into(),
            (KeyCode::Esc, _) => "Esc".into(),
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => "Tab".into(),
            (KeyCode::Home, _) => "Home".into(),
            (KeyCode::End, _) => "End".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Parse `"Ctrl+c"`, `"Shift+Tab"`, `"PageDown"`, `"j"`.
    fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key = parts.pop()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let code = match key.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            // crossterm reports Shift+Tab as BackTab.
            "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key.chars().count() == 1 => KeyCode::Char(key.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

const DEFAULT_DEBOUNCE_MS: u64 = 100;
const DEFAULT_THRESHOLD_ROWS: u32 = 8;
const DEFAULT_SCROLL_STEP: u32 = 3;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Start with annotations shown.
    pub annotations: bool,
    /// Quiet window before the title follows the viewport.
    pub title_debounce_ms: u64,
    /// Rows from an edge at which the next page is requested.
    pub edge_threshold_rows: u32,
    /// Rows moved per scroll step (wheel notch or arrow key).
    pub scroll_step: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            annotations: false,
            title_debounce_ms: DEFAULT_DEBOUNCE_MS,
            edge_threshold_rows: DEFAULT_THRESHOLD_ROWS,
            scroll_step: DEFAULT_SCROLL_STEP,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        let n = KeyModifiers::NONE;
        let bind = |code| KeyBind::new(code, n);
        HashMap::from([
            (Action::ScrollUp, vec![bind(KeyCode::Up), bind(KeyCode::Char('k'))]),
            (Action::ScrollDown, vec![bind(KeyCode::Down), bind(KeyCode::Char('j'))]),
            (Action::PageUp, vec![bind(KeyCode::PageUp), bind(KeyCode::Char('b'))]),
            (Action::PageDown, vec![bind(KeyCode::PageDown), bind(KeyCode::Char(' '))]),
            (Action::ToggleAnnotations, vec![bind(KeyCode::Char('a'))]),
            (Action::JumpToPage, vec![bind(KeyCode::Char('g'))]),
            (Action::NextSection, vec![bind(KeyCode::Tab)]),
            (
                Action::PreviousSection,
                vec![KeyBind::new(KeyCode::BackTab, KeyModifiers::SHIFT)],
            ),
            (Action::Quit, vec![bind(KeyCode::Char('q'))]),
        ])
    }

    pub fn title_debounce(&self) -> Duration {
        Duration::from_millis(self.title_debounce_ms)
    }

    /// Action bound to a key event.  Bindings with more modifiers win.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    fn first_binding(&self, action: Action) -> String {
        self.bindings
            .get(&action)
            .and_then(|binds| binds.first())
            .map_or_else(|| "?".into(), KeyBind::display)
    }

    /// Status-bar hint built from the current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: annotations | {}: go to page | {}: next section | {}: quit",
            self.first_binding(Action::ScrollUp),
            self.first_binding(Action::ScrollDown),
            self.first_binding(Action::ToggleAnnotations),
            self.first_binding(Action::JumpToPage),
            self.first_binding(Action::NextSection),
            self.first_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("reading {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Persist to disk and return the path written.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(path)
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "annotations" => {
                    config.annotations = value == "true";
                    continue;
                }
                "title_debounce_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.title_debounce_ms = v.clamp(20, 2000);
                    }
                    continue;
                }
                "edge_threshold_rows" => {
                    if let Ok(v) = value.parse() {
                        config.edge_threshold_rows = v;
                    }
                    continue;
                }
                "scroll_step" => {
                    if let Ok(v) = value.parse::<u32>() {
                        config.scroll_step = v.max(1);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# tikkun configuration".to_string(),
            String::new(),
            "# Reader".to_string(),
            format!("annotations = {}", self.annotations),
            format!("title_debounce_ms = {}", self.title_debounce_ms),
            format!("edge_threshold_rows = {}", self.edge_threshold_rows),
            format!("scroll_step = {}", self.scroll_step),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.render(false)).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/tikkun/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("tikkun").join("config.toml")
}
