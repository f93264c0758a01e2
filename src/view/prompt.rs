//! Line prompt shown in the status bar.
//!
//! The prompt is fed one key token at a time by the handler loop and reports
//! whether the line was submitted, cancelled or is still being edited. Each
//! prompt kind keeps its own history, persisted as JSON under the data
//! directory.

use crate::input::actions::{Action, ActionArg, ActionType};
use crate::input::key::KeyToken;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of entries kept per history
const MAX_HISTORY: usize = 100;

/// What a prompt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Command,
    Search,
    ReverseSearch,
    Filter,
}

impl PromptKind {
    pub fn from_action(action_type: ActionType) -> Option<Self> {
        match action_type {
            ActionType::Prompt => Some(PromptKind::Command),
            ActionType::SearchPrompt => Some(PromptKind::Search),
            ActionType::ReverseSearchPrompt => Some(PromptKind::ReverseSearch),
            ActionType::FilterPrompt => Some(PromptKind::Filter),
            _ => None,
        }
    }

    /// Text shown before the input
    pub fn prefix(self) -> &'static str {
        match self {
            PromptKind::Command => ":",
            PromptKind::Search => "/",
            PromptKind::ReverseSearch => "?",
            PromptKind::Filter => "filter: ",
        }
    }

    /// Name of the history this kind records into. Both search
    /// directions share one history.
    pub fn history_name(self) -> &'static str {
        match self {
            PromptKind::Command => "command",
            PromptKind::Search | PromptKind::ReverseSearch => "search",
            PromptKind::Filter => "filter",
        }
    }

    /// The action a submitted line turns into. Command lines are evaluated
    /// by the command layer instead.
    pub fn submit_action(self, text: String) -> Option<Action> {
        let action_type = match self {
            PromptKind::Command => return None,
            PromptKind::Search => ActionType::Search,
            PromptKind::ReverseSearch => ActionType::ReverseSearch,
            PromptKind::Filter => ActionType::AddFilter,
        };
        Some(Action::with_args(action_type, vec![ActionArg::Text(text)]))
    }
}

/// Result of feeding one key to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Still editing
    Continue,
    Submitted(String),
    Cancelled,
}

/// Previously submitted lines, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHistory {
    items: Vec<String>,
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Record `line`, moving it to the end if it was already present.
    pub fn push(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.items.retain(|item| item != line);
        self.items.push(line.to_string());
        if self.items.len() > MAX_HISTORY {
            let excess = self.items.len() - MAX_HISTORY;
            self.items.drain(..excess);
        }
    }

    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// All prompt histories, with the directory they persist to.
#[derive(Debug, Clone, Default)]
pub struct PromptHistories {
    dir: Option<PathBuf>,
    histories: std::collections::HashMap<&'static str, InputHistory>,
}

impl PromptHistories {
    /// Histories that are never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load every history from `dir`. Unreadable files start empty.
    pub fn load(dir: PathBuf) -> Self {
        let mut histories = std::collections::HashMap::new();
        for name in ["command", "search", "filter"] {
            let path = history_path(&dir, name);
            let history = InputHistory::load_from_file(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load {} history: {}", name, e);
                InputHistory::new()
            });
            histories.insert(name, history);
        }
        Self {
            dir: Some(dir),
            histories,
        }
    }

    pub fn get(&self, kind: PromptKind) -> Option<&InputHistory> {
        self.histories.get(kind.history_name())
    }

    /// Record a submitted line and persist that history.
    pub fn record(&mut self, kind: PromptKind, line: &str) {
        let name = kind.history_name();
        let history = self.histories.entry(name).or_default();
        history.push(line);
        if let Some(dir) = &self.dir {
            if let Err(e) = history.save_to_file(&history_path(dir, name)) {
                tracing::warn!("Failed to save {} history: {}", name, e);
            }
        }
    }
}

fn history_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}_history.json"))
}

/// An editable line
#[derive(Debug, Clone)]
pub struct LinePrompt {
    kind: PromptKind,
    input: String,
    /// Cursor position in chars
    cursor: usize,
    history: Vec<String>,
    /// Position while browsing history; `history.len()` is the live line
    history_index: usize,
    /// Live line saved while browsing history
    draft: String,
}

impl LinePrompt {
    pub fn new(kind: PromptKind, history: Option<&InputHistory>) -> Self {
        let history = history.map(|h| h.items().to_vec()).unwrap_or_default();
        Self {
            kind,
            input: String::new(),
            cursor: 0,
            history_index: history.len(),
            history,
            draft: String::new(),
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in chars
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Full prompt line as displayed
    pub fn display(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.input)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    fn set_input(&mut self, text: String) {
        self.input = text;
        self.cursor = self.char_len();
    }

    /// Apply one key.
    pub fn feed(&mut self, token: &KeyToken) -> PromptOutcome {
        match token.as_str() {
            "<Enter>" => return PromptOutcome::Submitted(self.input.clone()),
            "<Esc>" | "<C-c>" | "<C-g>" => return PromptOutcome::Cancelled,
            "<Backspace>" | "<C-h>" => {
                if self.input.is_empty() {
                    return PromptOutcome::Cancelled;
                }
                if self.cursor > 0 {
                    let at = self.byte_index(self.cursor - 1);
                    self.input.remove(at);
                    self.cursor -= 1;
                }
            }
            "<Delete>" | "<C-d>" => {
                if self.cursor < self.char_len() {
                    let at = self.byte_index(self.cursor);
                    self.input.remove(at);
                }
            }
            "<Left>" | "<C-b>" => self.cursor = self.cursor.saturating_sub(1),
            "<Right>" | "<C-f>" => self.cursor = (self.cursor + 1).min(self.char_len()),
            "<Home>" | "<C-a>" => self.cursor = 0,
            "<End>" | "<C-e>" => self.cursor = self.char_len(),
            "<C-u>" => {
                let at = self.byte_index(self.cursor);
                self.input.drain(..at);
                self.cursor = 0;
            }
            "<C-k>" => {
                let at = self.byte_index(self.cursor);
                self.input.truncate(at);
            }
            "<C-w>" => self.delete_word_before_cursor(),
            "<Up>" | "<C-p>" => self.history_prev(),
            "<Down>" | "<C-n>" => self.history_next(),
            _ => {
                if let Some(c) = token.printable() {
                    let at = self.byte_index(self.cursor);
                    self.input.insert(at, c);
                    self.cursor += 1;
                }
            }
        }
        PromptOutcome::Continue
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.input.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor);
        self.input.replace_range(from..to, "");
        self.cursor = start;
    }

    fn history_prev(&mut self) {
        if self.history_index == 0 {
            return;
        }
        if self.history_index == self.history.len() {
            self.draft = self.input.clone();
        }
        self.history_index -= 1;
        self.set_input(self.history[self.history_index].clone());
    }

    fn history_next(&mut self) {
        if self.history_index >= self.history.len() {
            return;
        }
        self.history_index += 1;
        let text = if self.history_index == self.history.len() {
            std::mem::take(&mut self.draft)
        } else {
            self.history[self.history_index].clone()
        };
        self.set_input(text);
    }
}
