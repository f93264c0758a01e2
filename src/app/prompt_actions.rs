//! Focus changes around a line prompt.
//!
//! While a prompt runs, the view that had focus (the top popup or the
//! current tab's active path) is inactive and the status bar is active. Ending
//! the prompt reverses exactly that.

use super::Dashboard;
use crate::view::prompt::LinePrompt;
use crate::view::status_bar::PromptLine;
use crate::view::{Pane, ViewState};

impl Dashboard {
    pub fn begin_prompt(&mut self, prompt: &LinePrompt) {
        tracing::debug!("Prompt {:?} opened", prompt.kind());
        self.set_focus_state(ViewState::InactiveVisible);
        self.status_bar.clear_message();
        self.status_bar.set_prompt(Some(PromptLine::from_prompt(prompt)));
        self.status_bar.on_state_change(ViewState::Active);
    }

    /// Publish the prompt line after a keystroke.
    pub fn update_prompt(&mut self, prompt: &LinePrompt) {
        self.status_bar.set_prompt(Some(PromptLine::from_prompt(prompt)));
    }

    pub fn end_prompt(&mut self) {
        self.status_bar.set_prompt(None);
        self.status_bar.on_state_change(ViewState::InactiveVisible);
        self.set_focus_state(ViewState::Active);
        tracing::debug!("Prompt closed");
    }

    pub fn is_prompting(&self) -> bool {
        self.status_bar.prompt().is_some()
    }

    fn set_focus_state(&mut self, state: ViewState) {
        match self.popups.last_mut() {
            Some(popup) => {
                popup.view.set_state(state);
            }
            None => {
                if let Some(tab) = self.tabs.get_mut(self.current_tab) {
                    tab.set_state(state);
                }
            }
        }
    }
}
