//! Hierarchical action handling.
//!
//! Actions that reach the view tree are delivered to the deepest focused
//! element first. If it does not consume the action, the action bubbles up to
//! the enclosing composites and finally to the tab:
//!
//! 1. **Leaf-first, bubble up**: a list view handles movement and search, its
//!    container handles layout actions such as `full-screen-view`, the tab
//!    handles focus cycling with `next-view`/`prev-view`.
//!
//! 2. **Explicit consumption**: handlers return [`ActionResult::Consumed`] to
//!    stop propagation or [`ActionResult::Ignored`] to let parents try.
//!
//! 3. **Deferred work**: handlers cannot reach the dashboard that owns them.
//!    Anything that needs it (opening a popup, adding a view, showing a status
//!    message) is pushed onto the [`ActionContext`] and routed afterwards.

use crate::input::actions::Action;
use crate::services::search::SearchEngine;
use crate::view::PaneId;

/// Result of handling an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// The action was handled - stop propagation.
    Consumed,
    /// The action was not handled - try parent.
    Ignored,
}

impl ActionResult {
    /// Returns true if the action was consumed.
    pub fn is_consumed(self) -> bool {
        self == ActionResult::Consumed
    }
}

/// Context passed to action handlers.
#[derive(Default)]
pub struct ActionContext {
    /// Pane currently handling the action, set by the hierarchy before delivery.
    pub pane: Option<PaneId>,
    /// Status message to display (set by handlers).
    pub status_message: Option<String>,
    /// Actions to route after the current one, in order.
    pub deferred_actions: Vec<Action>,
    /// Whether something visible changed.
    pub redraw: bool,
    /// Background search engine. Without one, searches run inline.
    pub search: Option<SearchEngine>,
}

impl ActionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(search: Option<SearchEngine>) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.redraw = true;
    }

    pub fn defer(&mut self, action: Action) {
        self.deferred_actions.push(action);
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Mark a redraw when `changed` is true and pass the result through.
    pub fn changed(&mut self, changed: bool) -> ActionResult {
        if changed {
            self.redraw = true;
        }
        ActionResult::Consumed
    }

    /// Take the deferred actions, leaving the list empty.
    pub fn take_deferred(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.deferred_actions)
    }
}
