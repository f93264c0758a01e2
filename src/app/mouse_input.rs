//! Mouse input handling.
//!
//! The input loop turns crossterm mouse events into actions carrying screen
//! coordinates. The dashboard finds the view under the pointer and hands it
//! the action with coordinates local to that view.

use super::Dashboard;
use crate::error::EngineError;
use crate::input::actions::{Action, ActionArg, ActionType};
use crate::input::handler::ActionContext;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use std::time::{Duration, Instant};

/// Two clicks on the same cell within this interval select the row
const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);

/// Translates mouse events into actions, tracking clicks for double-click
/// detection.
#[derive(Debug, Default)]
pub struct MouseTranslator {
    previous_click: Option<(Instant, u16, u16)>,
}

impl MouseTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions for `event` at time `now`. A double click yields the click
    /// followed by `select`.
    pub fn translate(&mut self, event: &MouseEvent, now: Instant) -> Vec<Action> {
        let Some(action) = mouse_action(event) else {
            return Vec::new();
        };
        if action.action_type != ActionType::MouseSelect {
            return vec![action];
        }

        let (column, row) = (event.column, event.row);
        let is_double = matches!(
            self.previous_click,
            Some((at, c, r)) if c == column && r == row && now.duration_since(at) < DOUBLE_CLICK_INTERVAL
        );
        if is_double {
            self.previous_click = None;
            vec![action, Action::new(ActionType::Select)]
        } else {
            self.previous_click = Some((now, column, row));
            vec![action]
        }
    }
}

/// The action for a single mouse event, if it means anything.
pub fn mouse_action(event: &MouseEvent) -> Option<Action> {
    let action_type = match event.kind {
        MouseEventKind::Down(MouseButton::Left) => ActionType::MouseSelect,
        MouseEventKind::ScrollDown => ActionType::MouseScrollDown,
        MouseEventKind::ScrollUp => ActionType::MouseScrollUp,
        _ => return None,
    };
    Some(Action::with_args(
        action_type,
        vec![ActionArg::Point {
            column: event.column,
            row: event.row,
        }],
    ))
}

fn localize(action: &Action, column: u16, row: u16) -> Action {
    Action::with_args(action.action_type, vec![ActionArg::Point { column, row }])
}

impl Dashboard {
    /// Deliver a mouse action to the view under the pointer. A click also
    /// focuses that view. While a popup is open, only the top popup
    /// receives mouse input.
    pub(super) fn route_mouse(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<(), EngineError> {
        let (column, row) = action.point(0)?;
        let position = ratatui::layout::Position::new(column, row);

        if let Some(popup) = self.popups.last_mut() {
            let rect = popup.view.rect();
            if rect.contains(position) {
                let local = localize(action, column - rect.x, row - rect.y);
                popup.view.handle_action(&local, ctx)?;
            }
            return Ok(());
        }

        let Some(tab) = self.tabs.get_mut(self.current_tab) else {
            return Ok(());
        };
        let Some(path) = tab.root().pane_at(column, row) else {
            tracing::trace!("No view at {},{}", column, row);
            return Ok(());
        };

        if action.action_type == ActionType::MouseSelect && tab.focus_path(&path) {
            ctx.request_redraw();
        }
        if let Some(view) = tab.root_mut().pane_by_path_mut(&path) {
            let rect = view.rect();
            let local = localize(action, column - rect.x, row - rect.y);
            view.handle_action(&local, ctx)?;
        }
        Ok(())
    }
}
