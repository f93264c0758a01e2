//! Status bar: the last screen row.
//!
//! Shows, in order of priority, the live prompt line, the last status
//! message, or the tab list. Keys waiting for a longer binding are shown on
//! the right.

use super::prompt::LinePrompt;
use super::surface::{display_width, Surface};
use super::{Pane, ViewId, ViewState};
use crate::error::EngineError;
use crate::input::actions::{Action, ActionType};
use crate::input::handler::{ActionContext, ActionResult};
use ratatui::style::{Modifier, Style};

/// Prompt line as last published by the handler loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLine {
    pub text: String,
    /// Cursor column within `text`
    pub cursor_column: u16,
}

impl PromptLine {
    pub fn from_prompt(prompt: &LinePrompt) -> Self {
        let before_cursor: String = prompt.input().chars().take(prompt.cursor()).collect();
        let column = display_width(prompt.kind().prefix()) + display_width(&before_cursor);
        Self {
            text: prompt.display(),
            cursor_column: column as u16,
        }
    }
}

#[derive(Debug, Default)]
pub struct StatusBarView {
    message: Option<String>,
    pending_keys: String,
    prompt: Option<PromptLine>,
    tabs: Vec<String>,
    current_tab: usize,
    state: Option<ViewState>,
}

impl StatusBarView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn set_pending_keys(&mut self, keys: impl Into<String>) {
        self.pending_keys = keys.into();
    }

    pub fn prompt(&self) -> Option<&PromptLine> {
        self.prompt.as_ref()
    }

    pub fn set_prompt(&mut self, prompt: Option<PromptLine>) {
        self.prompt = prompt;
    }

    pub fn set_tabs(&mut self, tabs: Vec<String>, current: usize) {
        self.tabs = tabs;
        self.current_tab = current;
    }

    pub fn is_active(&self) -> bool {
        self.state == Some(ViewState::Active)
    }
}

impl Pane for StatusBarView {
    fn view_id(&self) -> ViewId {
        ViewId::StatusBar
    }

    fn title(&self) -> String {
        "Status".to_string()
    }

    fn render(&mut self, surface: &mut Surface, _state: ViewState) {
        surface.set_line(0, "", Style::default().add_modifier(Modifier::REVERSED));

        if let Some(prompt) = &self.prompt {
            surface.set_line(0, &prompt.text, Style::default());
            surface.set_cursor(0, prompt.cursor_column);
            return;
        }

        let base = Style::default().add_modifier(Modifier::REVERSED);
        match &self.message {
            Some(message) => {
                surface.set_cell(0, 0, message, base);
            }
            None => {
                let mut col = 0;
                for (index, name) in self.tabs.iter().enumerate() {
                    let style = if index == self.current_tab {
                        base.add_modifier(Modifier::BOLD)
                    } else {
                        base.add_modifier(Modifier::DIM)
                    };
                    col += surface.set_cell(0, col, &format!("[{}:{}] ", index + 1, name), style);
                }
            }
        }

        if !self.pending_keys.is_empty() {
            let width = display_width(&self.pending_keys) as u16;
            let col = surface.width().saturating_sub(width + 1);
            surface.set_cell(0, col, &self.pending_keys, base.add_modifier(Modifier::BOLD));
        }
    }

    fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        match action.action_type {
            ActionType::ShowStatus => {
                self.message = action.optional_text(0)?.map(str::to_string);
                Ok(ctx.changed(true))
            }
            _ => Ok(ActionResult::Ignored),
        }
    }

    fn on_state_change(&mut self, state: ViewState) {
        self.state = Some(state);
    }
}
