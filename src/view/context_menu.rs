//! Context menu popup.

use super::surface::Surface;
use super::viewport::ViewPosition;
use super::{Pane, ViewId, ViewState};
use crate::error::EngineError;
use crate::input::actions::{Action, ActionType, MenuEntry};
use crate::input::handler::{ActionContext, ActionResult};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};

/// A popup listing menu entries. Selecting an entry closes the menu and runs
/// the entry's action.
pub struct ContextMenuView {
    entries: Vec<MenuEntry>,
    position: ViewPosition,
}

impl ContextMenuView {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Self {
            entries,
            position: ViewPosition::new(),
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&MenuEntry> {
        self.entries.get(self.position.active_row_index)
    }

    /// Width and height the popup needs, borders included.
    pub fn preferred_size(&self) -> (u16, u16) {
        let width = self
            .entries
            .iter()
            .map(|e| super::surface::display_width(&e.label))
            .max()
            .unwrap_or(0)
            .max(10);
        (width as u16 + 4, self.entries.len() as u16 + 2)
    }

    fn select(&mut self, ctx: &mut ActionContext) {
        let follow_up = self.selected().map(|entry| entry.action.clone());
        ctx.defer(Action::new(ActionType::RemovePopup));
        if let Some(action) = follow_up {
            ctx.defer(action);
        }
    }
}

impl Pane for ContextMenuView {
    fn view_id(&self) -> ViewId {
        ViewId::ContextMenu
    }

    fn title(&self) -> String {
        "Menu".to_string()
    }

    fn render(&mut self, surface: &mut Surface, _state: ViewState) {
        surface.render_widget(Block::default().borders(Borders::ALL).title(" Menu "));
        let inner_rows = surface.height().saturating_sub(2) as usize;
        self.position
            .determine_view_start(inner_rows.max(1), self.entries.len());

        let start = self.position.view_start_row_index;
        for (offset, entry) in self.entries.iter().skip(start).take(inner_rows).enumerate() {
            let style = if start + offset == self.position.active_row_index {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            surface.set_cell(offset as u16 + 1, 2, &entry.label, style);
        }
    }

    fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        let rows = self.entries.len();
        let changed = match action.action_type {
            ActionType::NextLine => self.position.move_line_down(rows),
            ActionType::PrevLine => self.position.move_line_up(),
            ActionType::FirstLine => self.position.move_to_first_line(),
            ActionType::LastLine => self.position.move_to_last_line(rows),
            ActionType::SelectRow => self.position.select_row(action.index(0)?, rows),
            ActionType::MouseSelect => {
                let (_, row) = action.point(0)?;
                // Inside the top border
                if row == 0 || row as usize > rows {
                    return Ok(ActionResult::Consumed);
                }
                let index = self.position.view_start_row_index + row as usize - 1;
                self.position.select_row(index, rows);
                self.select(ctx);
                true
            }
            ActionType::Select => {
                self.select(ctx);
                false
            }
            // The menu is modal: everything else is swallowed
            _ => return Ok(ActionResult::Consumed),
        };
        Ok(ctx.changed(changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn menu() -> ContextMenuView {
        ContextMenuView::new(vec![
            MenuEntry::new("Show status", Action::status("one")),
            MenuEntry::new("Exit", Action::new(ActionType::Exit)),
        ])
    }

    #[test]
    fn test_select_closes_then_runs_entry() {
        let mut view = menu();
        let mut ctx = ActionContext::new();
        view.handle_action(&Action::new(ActionType::NextLine), &mut ctx)
            .unwrap();
        view.handle_action(&Action::new(ActionType::Select), &mut ctx)
            .unwrap();
        let deferred = ctx.take_deferred();
        assert_eq!(deferred.len(), 2);
        assert_eq!(deferred[0].action_type, ActionType::RemovePopup);
        assert_eq!(deferred[1].action_type, ActionType::Exit);
    }

    #[test]
    fn test_other_actions_are_swallowed() {
        let mut view = menu();
        let mut ctx = ActionContext::new();
        let result = view
            .handle_action(&Action::new(ActionType::NextTab), &mut ctx)
            .unwrap();
        assert_eq!(result, ActionResult::Consumed);
        assert!(ctx.take_deferred().is_empty());
    }

    #[test]
    fn test_render_draws_entries_inside_border() {
        let mut view = menu();
        let (width, height) = view.preferred_size();
        assert_eq!(height, 4);
        let mut surface = Surface::new(Rect::new(0, 0, width, height));
        view.render(&mut surface, ViewState::Active);
        assert!(surface.row_text(1).contains("Show status"));
        assert!(surface.row_text(2).contains("Exit"));
    }
}
