//! Action routing.
//!
//! Every action goes through [`Dashboard::route`]:
//!
//! 1. While a popup is open, the top popup gets every action except the few
//!    that must reach the router anyway (status, popup management, prompts).
//! 2. Prompt actions are returned to the handler loop, which owns the prompt.
//! 3. Actions that change the dashboard itself (tabs, popups, adding and
//!    removing views, mouse, help) are handled here.
//! 4. Everything else goes down the active path of the current tab.

use super::{Dashboard, RouteOutcome};
use crate::error::EngineError;
use crate::input::actions::{Action, ActionType};
use crate::input::handler::{ActionContext, ActionResult};
use crate::input::key::KeySequence;
use crate::input::keybindings::KeyBindingRegistry;
use crate::services::search::SearchToken;
use crate::view::hierarchy::{PaneView, ViewNode};
use crate::view::prompt::PromptKind;
use crate::view::{Orientation, Pane, PaneId, ViewId};
use std::collections::VecDeque;

/// Tab that `show-help-view` opens or switches to
const HELP_TAB: &str = "Help";

impl Dashboard {
    /// Route `action` and every action deferred while handling it, in order.
    ///
    /// Stops at the first outcome that needs the handler loop (exit, suspend,
    /// prompt); actions still queued at that point are dropped.
    pub fn dispatch(
        &mut self,
        action: Action,
        registry: &KeyBindingRegistry,
        ctx: &mut ActionContext,
    ) -> Result<RouteOutcome, EngineError> {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let outcome = self.route(&action, registry, ctx)?;
            if let Some(message) = ctx.status_message.take() {
                self.status_bar.set_message(message);
            }
            queue.extend(ctx.take_deferred());
            if !outcome.is_handled() {
                if !queue.is_empty() {
                    tracing::debug!("Dropping {} deferred actions", queue.len());
                }
                return Ok(outcome);
            }
        }
        Ok(RouteOutcome::Handled)
    }

    /// Route a single action.
    pub fn route(
        &mut self,
        action: &Action,
        registry: &KeyBindingRegistry,
        ctx: &mut ActionContext,
    ) -> Result<RouteOutcome, EngineError> {
        let action_type = action.action_type;
        tracing::debug!("route {}", action_type.name());

        if matches!(
            action_type,
            ActionType::MouseSelect | ActionType::MouseScrollDown | ActionType::MouseScrollUp
        ) {
            self.route_mouse(action, ctx)?;
            return Ok(RouteOutcome::Handled);
        }

        if !self.popups.is_empty() && !action_type.passes_popups() {
            if action_type == ActionType::RemoveView {
                self.pop_popup();
                ctx.request_redraw();
            } else if let Some(popup) = self.popups.last_mut() {
                popup.view.handle_action(action, ctx)?;
            }
            return Ok(RouteOutcome::Handled);
        }

        if let Some(kind) = PromptKind::from_action(action_type) {
            return Ok(RouteOutcome::Prompt(kind));
        }

        match action_type {
            ActionType::None => {}
            ActionType::Exit => return Ok(RouteOutcome::Exit),
            ActionType::Suspend => return Ok(RouteOutcome::Suspend),
            ActionType::Refresh => {
                self.reload_all(ctx)?;
                ctx.set_status("Reloaded");
            }
            ActionType::ShowStatus => {
                self.status_bar.handle_action(action, ctx)?;
            }
            ActionType::NextTab | ActionType::PrevTab => {
                let count = self.tabs.len();
                if count > 1 {
                    let next = if action_type == ActionType::NextTab {
                        (self.current_tab + 1) % count
                    } else {
                        (self.current_tab + count - 1) % count
                    };
                    self.activate_tab(next);
                    ctx.request_redraw();
                }
            }
            ActionType::NewTab => {
                let name = match action.optional_text(0)? {
                    Some(name) => name.to_string(),
                    None => format!("Tab {}", self.tabs.len() + 1),
                };
                let view = match action.args.get(1) {
                    Some(_) => action.view(1)?,
                    None => ViewId::Refs,
                };
                let pane = self.create_view(view, None, registry)?;
                self.open_tab(name, Orientation::Dynamic, vec![pane]);
                ctx.request_redraw();
            }
            ActionType::RemoveTab => {
                ctx.request_redraw();
                if !self.remove_current_tab() {
                    return Ok(RouteOutcome::Exit);
                }
            }
            ActionType::SelectTabByName => {
                let name = action.text(0)?;
                match self.tabs.iter().position(|t| t.name() == name) {
                    Some(index) => {
                        self.activate_tab(index);
                        ctx.request_redraw();
                    }
                    None => ctx.set_status(format!("No tab named {name}")),
                }
            }
            ActionType::CreateContextMenu => {
                let entries = action.menu(0)?.to_vec();
                self.push_popup(entries);
                ctx.request_redraw();
            }
            ActionType::RemovePopup => {
                if self.pop_popup() {
                    ctx.request_redraw();
                }
            }
            ActionType::ShowHelpView => {
                match self.tabs.iter().position(|t| t.name() == HELP_TAB) {
                    Some(index) => self.activate_tab(index),
                    None => {
                        let pane = self.create_view(ViewId::Help, None, registry)?;
                        self.open_tab(HELP_TAB, Orientation::Dynamic, vec![pane]);
                    }
                }
                ctx.request_redraw();
            }
            ActionType::AddView => {
                let view = action.view(0)?;
                let pane = self.create_view(view, action.optional_text(1)?, registry)?;
                self.add_view(pane, None);
                ctx.request_redraw();
            }
            ActionType::SplitView => {
                let view = action.view(0)?;
                let orientation = match action.args.get(1) {
                    Some(_) => action.orientation(1)?,
                    None => Orientation::Dynamic,
                };
                let pane = self.create_view(view, action.optional_text(2)?, registry)?;
                self.add_view(pane, Some(orientation));
                ctx.request_redraw();
            }
            ActionType::RemoveView => {
                ctx.request_redraw();
                if !self.remove_active_view() {
                    return Ok(RouteOutcome::Exit);
                }
            }
            _ => {
                let result = match self.tabs.get_mut(self.current_tab) {
                    Some(tab) => tab.handle_action(action, ctx)?,
                    None => ActionResult::Ignored,
                };
                if !result.is_consumed() {
                    tracing::trace!("{} not handled by the active view", action_type.name());
                }
            }
        }
        Ok(RouteOutcome::Handled)
    }

    /// Add `pane` to the current tab, splitting the active view when an
    /// orientation is given. Opens a tab when there is none.
    fn add_view(&mut self, pane: Box<dyn Pane>, split: Option<Orientation>) {
        let Some(tab) = self.tabs.get_mut(self.current_tab) else {
            self.open_tab("Main", split.unwrap_or(Orientation::Dynamic), vec![pane]);
            return;
        };
        let node = ViewNode::pane(pane);
        match split {
            Some(orientation) => tab.root_mut().split_active(node, orientation),
            None => tab.root_mut().add_to_active(node),
        }
    }

    /// Close the active view; a tab left empty is closed too. Returns false
    /// when the last tab was closed.
    fn remove_active_view(&mut self) -> bool {
        let Some(tab) = self.tabs.get_mut(self.current_tab) else {
            return false;
        };
        if let Some(pane) = tab.root_mut().remove_active() {
            tracing::debug!("Removed {}", pane.view_id().name());
            pane.remove();
        }
        if tab.is_empty() {
            return self.remove_current_tab();
        }
        true
    }

    /// Keys that resolved to no binding go to the focused view.
    pub fn handle_key_press(
        &mut self,
        keys: &KeySequence,
        ctx: &mut ActionContext,
    ) -> Result<(), EngineError> {
        let target = match self.popups.last_mut() {
            Some(popup) => Some(&mut popup.view),
            None => self
                .tabs
                .get_mut(self.current_tab)
                .and_then(|tab| tab.root_mut().active_pane_mut()),
        };
        if let Some(view) = target {
            ctx.pane = Some(view.id());
            if !view.pane_mut().handle_key_press(keys, ctx)?.is_consumed() {
                tracing::trace!("{} unbound in {}", keys, view.view_id().name());
            }
        }
        Ok(())
    }

    /// Hand a finished background search to the pane that started it.
    pub fn on_search_result(
        &mut self,
        pane: PaneId,
        token: SearchToken,
        pattern: &str,
        index: Option<usize>,
        ctx: &mut ActionContext,
    ) {
        let popup = self.popups.iter_mut().map(|p| &mut p.view).find(|v| v.id() == pane);
        let target = match popup {
            Some(view) => Some(view),
            None => self
                .tabs
                .iter_mut()
                .find_map(|tab| tab.root_mut().find_pane_mut(pane)),
        };
        match target {
            Some(view) => {
                ctx.pane = Some(pane);
                view.pane_mut().on_search_match(token, pattern, index, ctx);
            }
            None => tracing::debug!("Search result for closed pane {:?}", pane),
        }
    }

    /// Reload every view after the repository changed. Every view is
    /// reloaded even if some fail; the first failure is returned.
    pub fn reload_all(&mut self, ctx: &mut ActionContext) -> Result<(), EngineError> {
        self.for_each_view(ctx, |pane, ctx| pane.reload(ctx))
    }

    /// Refresh views that display file content.
    pub fn refresh_all(&mut self, ctx: &mut ActionContext) -> Result<(), EngineError> {
        self.for_each_view(ctx, |pane, ctx| pane.refresh(ctx))
    }

    fn for_each_view(
        &mut self,
        ctx: &mut ActionContext,
        mut f: impl FnMut(&mut dyn Pane, &mut ActionContext) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let mut first_error = None;
        let mut visit = |view: &mut PaneView| {
            if let Err(e) = f(view.pane_mut(), ctx) {
                tracing::warn!("Updating {} failed: {}", view.view_id().name(), e);
                first_error.get_or_insert(e);
            }
        };
        for tab in &mut self.tabs {
            tab.root_mut().for_each_pane(&mut visit);
        }
        for popup in &mut self.popups {
            visit(&mut popup.view);
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::dashboard;
    use crate::input::actions::{ActionArg, MenuEntry};
    use crate::view::ViewState;

    fn route(dashboard: &mut Dashboard, action: Action) -> RouteOutcome {
        let registry = KeyBindingRegistry::with_defaults();
        let mut ctx = ActionContext::new();
        dashboard.dispatch(action, &registry, &mut ctx).unwrap()
    }

    #[test]
    fn test_tab_navigation_is_circular() {
        let mut d = dashboard();
        route(&mut d, Action::with_args(ActionType::NewTab, vec![ActionArg::Text("Two".into())]));
        assert_eq!(d.current_tab_index(), 1);
        route(&mut d, Action::new(ActionType::NextTab));
        assert_eq!(d.current_tab_index(), 0);
        route(&mut d, Action::new(ActionType::PrevTab));
        assert_eq!(d.current_tab_index(), 1);
        assert_eq!(d.tabs()[0].state(), ViewState::Invisible);
    }

    #[test]
    fn test_removing_last_tab_exits() {
        let mut d = dashboard();
        assert_eq!(route(&mut d, Action::new(ActionType::RemoveTab)), RouteOutcome::Exit);
    }

    #[test]
    fn test_removing_every_view_exits() {
        let mut d = dashboard();
        assert_eq!(route(&mut d, Action::new(ActionType::RemoveView)), RouteOutcome::Handled);
        assert_eq!(route(&mut d, Action::new(ActionType::RemoveView)), RouteOutcome::Exit);
    }

    #[test]
    fn test_unknown_tab_name_is_a_status() {
        let mut d = dashboard();
        route(
            &mut d,
            Action::with_args(ActionType::SelectTabByName, vec![ActionArg::Text("Nope".into())]),
        );
        assert_eq!(d.status_bar().message(), Some("No tab named Nope"));
    }

    #[test]
    fn test_popup_isolates_actions() {
        let mut d = dashboard();
        let menu = vec![MenuEntry::new("Quit", Action::new(ActionType::Exit))];
        route(
            &mut d,
            Action::with_args(ActionType::CreateContextMenu, vec![ActionArg::Menu(menu)]),
        );
        assert!(d.has_popups());

        // Tab actions go to the popup and change nothing
        route(&mut d, Action::new(ActionType::NextTab));
        route(&mut d, Action::new(ActionType::NextView));
        assert_eq!(d.active_hierarchy(), vec![ViewId::ContextMenu]);

        // Status passes through
        route(&mut d, Action::status("hi"));
        assert_eq!(d.status_bar().message(), Some("hi"));

        // Selecting the entry closes the popup, then runs the entry
        assert_eq!(route(&mut d, Action::new(ActionType::Select)), RouteOutcome::Exit);
        assert!(!d.has_popups());
        assert_eq!(d.active_hierarchy(), vec![ViewId::Refs, ViewId::Main]);
    }

    #[test]
    fn test_prompt_actions_return_to_handler() {
        let mut d = dashboard();
        assert_eq!(
            route(&mut d, Action::new(ActionType::SearchPrompt)),
            RouteOutcome::Prompt(PromptKind::Search)
        );
    }

    #[test]
    fn test_split_view_adds_container() {
        let mut d = dashboard();
        route(
            &mut d,
            Action::with_args(
                ActionType::SplitView,
                vec![ActionArg::View(ViewId::Preview), ActionArg::Orientation(Orientation::Horizontal)],
            ),
        );
        assert_eq!(
            d.active_hierarchy(),
            vec![ViewId::Preview, ViewId::Container, ViewId::Main]
        );
    }

    #[test]
    fn test_help_tab_is_reused() {
        let mut d = dashboard();
        route(&mut d, Action::new(ActionType::ShowHelpView));
        route(&mut d, Action::new(ActionType::NextTab));
        route(&mut d, Action::new(ActionType::ShowHelpView));
        assert_eq!(d.tabs().len(), 2);
        assert_eq!(d.tabs()[d.current_tab_index()].name(), "Help");
        assert_eq!(d.active_hierarchy(), vec![ViewId::Help, ViewId::Main]);
    }

    #[test]
    fn test_wrong_argument_is_fatal() {
        let mut d = dashboard();
        let registry = KeyBindingRegistry::new();
        let mut ctx = ActionContext::new();
        let err = d
            .dispatch(
                Action::with_args(ActionType::AddView, vec![ActionArg::Index(3)]),
                &registry,
                &mut ctx,
            )
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
