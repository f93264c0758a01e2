//! The dashboard: tabs, the popup stack and the status bar.
//!
//! The dashboard is the state shared by the handler loop, which mutates it
//! by routing actions, and the render loop, which draws it. Both reach it
//! through [`SharedDashboard`] and hold the lock for one routing step or one
//! render pass at a time.

mod input_dispatch;
mod mouse_input;
mod prompt_actions;
mod render;
pub mod types;

pub use mouse_input::{mouse_action, MouseTranslator};
pub use types::RouteOutcome;

use crate::config::TabConfig;
use crate::error::EngineError;
use crate::input::actions::MenuEntry;
use crate::input::keybindings::{parse_scope, KeyBindingRegistry};
use crate::view::context_menu::ContextMenuView;
use crate::view::hierarchy::{PaneView, Tab, ViewNode};
use crate::view::list_view::ListView;
use crate::view::sources::HelpSource;
use crate::view::status_bar::StatusBarView;
use crate::view::{Orientation, Pane, ViewFactory, ViewId, ViewState};
use ratatui::layout::Rect;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Dashboard shared between the handler and render loops
pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Lock the dashboard, recovering it from a poisoned lock.
pub fn lock(dashboard: &SharedDashboard) -> MutexGuard<'_, Dashboard> {
    dashboard.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An overlay view and the size it asks for
pub struct Popup {
    pub view: PaneView,
    pub width: u16,
    pub height: u16,
}

pub struct Dashboard {
    tabs: Vec<Tab>,
    current_tab: usize,
    popups: Vec<Popup>,
    status_bar: StatusBarView,
    factory: Box<dyn ViewFactory>,
    /// Screen size of the last render pass
    screen: Rect,
}

impl Dashboard {
    pub fn new(factory: Box<dyn ViewFactory>) -> Self {
        Self {
            tabs: Vec::new(),
            current_tab: 0,
            popups: Vec::new(),
            status_bar: StatusBarView::new(),
            factory,
            screen: Rect::default(),
        }
    }

    pub fn share(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_names(&self) -> Vec<String> {
        self.tabs.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn current_tab_index(&self) -> usize {
        self.current_tab
    }

    pub fn current_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.current_tab)
    }

    pub fn current_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.current_tab)
    }

    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    pub fn has_popups(&self) -> bool {
        !self.popups.is_empty()
    }

    pub fn status_bar(&self) -> &StatusBarView {
        &self.status_bar
    }

    pub fn status_bar_mut(&mut self) -> &mut StatusBarView {
        &mut self.status_bar
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_bar.set_message(message);
    }

    /// Screen size of the last render pass
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Binding scopes for key resolution, most specific first. While a popup
    /// is open only the popup's scope applies.
    pub fn active_hierarchy(&self) -> Vec<ViewId> {
        if let Some(popup) = self.popups.last() {
            return vec![popup.view.view_id()];
        }
        self.current_tab()
            .map(Tab::active_hierarchy)
            .unwrap_or_default()
    }

    /// Build a pane. The help view lists the live bindings, so it is built
    /// here rather than by the factory.
    pub fn create_view(
        &self,
        view: ViewId,
        arg: Option<&str>,
        registry: &KeyBindingRegistry,
    ) -> Result<Box<dyn Pane>, EngineError> {
        match view {
            ViewId::Help => Ok(Box::new(ListView::new(HelpSource::new(registry))?)),
            _ => self.factory.create(view, arg),
        }
    }

    /// Open the tabs of the startup layout and focus the first one.
    pub fn open_configured_tabs(
        &mut self,
        tabs: &[TabConfig],
        registry: &KeyBindingRegistry,
    ) -> Result<(), EngineError> {
        for tab in tabs {
            let orientation = Orientation::from_name(&tab.orientation).ok_or_else(|| {
                EngineError::runtime(format!("Unknown orientation {}", tab.orientation))
            })?;
            let views = tab
                .views
                .iter()
                .map(|name| {
                    let view = parse_scope(name)?;
                    self.create_view(view, None, registry)
                })
                .collect::<Result<Vec<_>, EngineError>>()?;
            self.open_tab(tab.name.clone(), orientation, views);
        }
        self.activate_tab(0);
        Ok(())
    }

    /// Append a tab holding `views` and switch to it.
    pub fn open_tab(
        &mut self,
        name: impl Into<String>,
        orientation: Orientation,
        views: Vec<Box<dyn Pane>>,
    ) {
        let mut tab = Tab::new(name, orientation);
        for pane in views {
            tab.root_mut().add_child(ViewNode::pane(pane));
        }
        if !tab.is_empty() {
            // Focus the first view, like a freshly opened layout
            tab.root_mut().set_active_path(&[0]);
        }
        tracing::info!("Opened tab {}", tab.name());
        self.tabs.push(tab);
        self.activate_tab(self.tabs.len() - 1);
    }

    /// Make tab `index` current, hiding the previous one.
    pub fn activate_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        if index != self.current_tab {
            if let Some(old) = self.tabs.get_mut(self.current_tab) {
                old.set_state(ViewState::Invisible);
            }
        }
        self.current_tab = index;
        let state = if self.popups.is_empty() && self.status_bar.prompt().is_none() {
            ViewState::Active
        } else {
            ViewState::InactiveVisible
        };
        self.tabs[index].set_state(state);
    }

    /// Remove the current tab. Returns false when no tab is left.
    pub fn remove_current_tab(&mut self) -> bool {
        if self.current_tab >= self.tabs.len() {
            return !self.tabs.is_empty();
        }
        let mut tab = self.tabs.remove(self.current_tab);
        tracing::info!("Closed tab {}", tab.name());
        tab.set_state(ViewState::Invisible);
        tab.root_mut().remove_all();

        if self.tabs.is_empty() {
            self.current_tab = 0;
            return false;
        }
        // The removed tab was current, so there is nothing to hide
        let next = self.current_tab.min(self.tabs.len() - 1);
        self.current_tab = next;
        self.activate_tab(next);
        true
    }

    /// Push a popup on top of the stack. Whatever had focus stays visible
    /// but inactive.
    pub fn push_popup(&mut self, entries: Vec<MenuEntry>) {
        let menu = ContextMenuView::new(entries);
        let (width, height) = menu.preferred_size();

        match self.popups.last_mut() {
            Some(top) => {
                top.view.set_state(ViewState::InactiveVisible);
            }
            None => {
                if let Some(tab) = self.tabs.get_mut(self.current_tab) {
                    tab.set_state(ViewState::InactiveVisible);
                }
            }
        }

        let mut view = PaneView::new(Box::new(menu));
        view.set_state(ViewState::Active);
        tracing::debug!("Popup opened, {} on the stack", self.popups.len() + 1);
        self.popups.push(Popup {
            view,
            width,
            height,
        });
    }

    /// Pop the top popup and give focus back to what is below it.
    pub fn pop_popup(&mut self) -> bool {
        let Some(popup) = self.popups.pop() else {
            return false;
        };
        popup.view.remove();

        match self.popups.last_mut() {
            Some(top) => {
                top.view.set_state(ViewState::Active);
            }
            None => {
                if let Some(tab) = self.tabs.get_mut(self.current_tab) {
                    tab.set_state(ViewState::Active);
                }
            }
        }
        tracing::debug!("Popup closed, {} left", self.popups.len());
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::view::hierarchy::tests::RecordingPane;

    /// Factory producing recording panes, for tests
    pub(crate) struct RecordingFactory;

    impl ViewFactory for RecordingFactory {
        fn create(&self, view: ViewId, _arg: Option<&str>) -> Result<Box<dyn Pane>, EngineError> {
            Ok(RecordingPane::boxed(view).0)
        }
    }

    pub(crate) fn dashboard() -> Dashboard {
        let mut dashboard = Dashboard::new(Box::new(RecordingFactory));
        dashboard.open_tab(
            "Main",
            Orientation::Vertical,
            vec![
                RecordingPane::boxed(ViewId::Refs).0,
                RecordingPane::boxed(ViewId::Files).0,
            ],
        );
        dashboard
    }

    #[test]
    fn test_open_tab_focuses_first_view() {
        let dashboard = dashboard();
        assert_eq!(dashboard.active_hierarchy(), vec![ViewId::Refs, ViewId::Main]);
    }

    #[test]
    fn test_popup_push_and_pop_restore_focus() {
        let mut dashboard = dashboard();
        dashboard.push_popup(vec![]);
        assert_eq!(dashboard.active_hierarchy(), vec![ViewId::ContextMenu]);
        assert_eq!(dashboard.tabs()[0].state(), ViewState::InactiveVisible);

        dashboard.push_popup(vec![]);
        assert_eq!(dashboard.popups()[0].view.state(), ViewState::InactiveVisible);

        assert!(dashboard.pop_popup());
        assert_eq!(dashboard.popups()[0].view.state(), ViewState::Active);
        assert_eq!(dashboard.tabs()[0].state(), ViewState::InactiveVisible);

        assert!(dashboard.pop_popup());
        assert_eq!(dashboard.tabs()[0].state(), ViewState::Active);
        assert!(!dashboard.pop_popup());
    }

    /// However deep the stack gets, the view under it is dimmed once and
    /// reactivated once, and its visible sibling hears nothing
    #[test]
    fn test_popup_stack_notifies_symmetrically() {
        for depth in 1..=5 {
            let mut dashboard = Dashboard::new(Box::new(RecordingFactory));
            let (refs, refs_states) = RecordingPane::boxed(ViewId::Refs);
            let (files, files_states) = RecordingPane::boxed(ViewId::Files);
            dashboard.open_tab("Main", Orientation::Vertical, vec![refs, files]);
            refs_states.lock().unwrap().clear();
            files_states.lock().unwrap().clear();

            for _ in 0..depth {
                dashboard.push_popup(vec![]);
            }
            assert_eq!(*refs_states.lock().unwrap(), vec![ViewState::InactiveVisible]);
            for _ in 0..depth {
                assert!(dashboard.pop_popup());
            }

            assert_eq!(
                *refs_states.lock().unwrap(),
                vec![ViewState::InactiveVisible, ViewState::Active],
                "depth {depth}"
            );
            assert!(files_states.lock().unwrap().is_empty(), "depth {depth}");
            assert_eq!(dashboard.active_hierarchy(), vec![ViewId::Refs, ViewId::Main]);
        }
    }

    #[test]
    fn test_configured_tabs_open_in_order() {
        let mut dashboard = Dashboard::new(Box::new(RecordingFactory));
        let tabs = vec![
            TabConfig {
                name: "Main".into(),
                orientation: "vertical".into(),
                views: vec!["RefView".into(), "FileView".into()],
            },
            TabConfig {
                name: "Help".into(),
                orientation: "dynamic".into(),
                views: vec!["HelpView".into()],
            },
        ];
        dashboard
            .open_configured_tabs(&tabs, &KeyBindingRegistry::new())
            .unwrap();
        assert_eq!(dashboard.tab_names(), vec!["Main", "Help"]);
        assert_eq!(dashboard.current_tab_index(), 0);
        assert_eq!(dashboard.tabs()[0].state(), ViewState::Active);
        assert_eq!(dashboard.tabs()[1].state(), ViewState::Invisible);

        let bad = vec![TabConfig {
            name: "Bad".into(),
            orientation: "dynamic".into(),
            views: vec!["NoSuchView".into()],
        }];
        assert!(dashboard
            .open_configured_tabs(&bad, &KeyBindingRegistry::new())
            .unwrap_err()
            .is_fatal());
    }

    #[test]
    fn test_removing_last_tab_reports_empty() {
        let mut dashboard = dashboard();
        dashboard.open_tab("Second", Orientation::Dynamic, vec![]);
        assert_eq!(dashboard.current_tab_index(), 1);
        assert_eq!(dashboard.tabs()[0].state(), ViewState::Invisible);
        assert!(dashboard.remove_current_tab());
        assert_eq!(dashboard.current_tab_index(), 0);
        assert_eq!(dashboard.tabs()[0].state(), ViewState::Active);
        assert!(!dashboard.remove_current_tab());
    }
}
