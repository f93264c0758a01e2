//! View and UI layer
//!
//! Identifiers and states shared by every view, the [`Pane`] interface that
//! leaf views implement, and the modules that compose them into tabs.

pub mod context_menu;
pub mod error_view;
pub mod hierarchy;
pub mod list_view;
pub mod prompt;
pub mod sources;
pub mod status_bar;
pub mod surface;
pub mod viewport;

use crate::error::EngineError;
use crate::input::actions::Action;
use crate::input::handler::{ActionContext, ActionResult};
use crate::input::key::KeySequence;
use crate::services::search::SearchToken;
use std::sync::atomic::{AtomicU64, Ordering};
use surface::Surface;

/// Identifies a kind of view. Doubles as the key binding scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewId {
    /// Global scope, consulted after every other
    All,
    /// Root composite of a tab
    Main,
    /// Nested composite created by splits
    Container,
    Refs,
    Files,
    Preview,
    Help,
    ContextMenu,
    StatusBar,
    Errors,
}

impl ViewId {
    pub const ALL: &'static [ViewId] = &[
        ViewId::All,
        ViewId::Main,
        ViewId::Container,
        ViewId::Refs,
        ViewId::Files,
        ViewId::Preview,
        ViewId::Help,
        ViewId::ContextMenu,
        ViewId::StatusBar,
        ViewId::Errors,
    ];

    /// Name used for binding scopes and in commands.
    pub fn name(self) -> &'static str {
        match self {
            ViewId::All => "All",
            ViewId::Main => "MainView",
            ViewId::Container => "ContainerView",
            ViewId::Refs => "RefView",
            ViewId::Files => "FileView",
            ViewId::Preview => "PreviewView",
            ViewId::Help => "HelpView",
            ViewId::ContextMenu => "ContextMenuView",
            ViewId::StatusBar => "StatusBarView",
            ViewId::Errors => "ErrorView",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }

    /// Views that can be created with `addview`/`split`.
    pub fn is_creatable(self) -> bool {
        matches!(
            self,
            ViewId::Refs | ViewId::Files | ViewId::Preview | ViewId::Help
        )
    }
}

/// Visibility and focus of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    Invisible,
    InactiveVisible,
    Active,
}

impl ViewState {
    pub fn is_visible(self) -> bool {
        self != ViewState::Invisible
    }
}

/// How a composite lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children side by side
    Vertical,
    /// Children stacked
    Horizontal,
    /// Chosen from the aspect ratio at render time
    Dynamic,
}

impl Orientation {
    pub fn name(self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
            Orientation::Dynamic => "dynamic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vertical" | "v" => Some(Orientation::Vertical),
            "horizontal" | "h" => Some(Orientation::Horizontal),
            "dynamic" | "d" => Some(Orientation::Dynamic),
            _ => None,
        }
    }

    /// The concrete orientation for an area of `width` x `height` cells.
    /// Terminal cells are roughly twice as tall as wide, so an area counts
    /// as wide when its width is at least three times its height.
    pub fn resolve(self, width: u16, height: u16) -> Orientation {
        match self {
            Orientation::Dynamic if width as u32 >= height as u32 * 3 => Orientation::Vertical,
            Orientation::Dynamic => Orientation::Horizontal,
            fixed => fixed,
        }
    }

    /// The other concrete orientation.
    pub fn toggle(self, width: u16, height: u16) -> Orientation {
        match self.resolve(width, height) {
            Orientation::Vertical => Orientation::Horizontal,
            _ => Orientation::Vertical,
        }
    }
}

/// Identity of one leaf view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u64);

static NEXT_PANE_ID: AtomicU64 = AtomicU64::new(1);

impl PaneId {
    pub fn next() -> Self {
        PaneId(NEXT_PANE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A leaf view.
///
/// Panes own all of their state. The engine only ever changes a pane's
/// [`ViewState`], through [`on_state_change`](Pane::on_state_change).
pub trait Pane: Send {
    fn view_id(&self) -> ViewId;

    fn title(&self) -> String;

    /// Draw into `surface`, which covers exactly the pane's rectangle.
    fn render(&mut self, surface: &mut Surface, state: ViewState);

    fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError>;

    /// Keys that resolved to no binding.
    fn handle_key_press(
        &mut self,
        _keys: &KeySequence,
        _ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        Ok(ActionResult::Ignored)
    }

    fn on_state_change(&mut self, _state: ViewState) {}

    /// Result of a background search started by this pane. `index` is `None`
    /// when nothing matched.
    fn on_search_match(
        &mut self,
        _token: SearchToken,
        _pattern: &str,
        _index: Option<usize>,
        _ctx: &mut ActionContext,
    ) {
    }

    /// Reload content after a structural change of the data source.
    fn reload(&mut self, _ctx: &mut ActionContext) -> Result<(), EngineError> {
        Ok(())
    }

    /// Lightweight refresh after file content changed.
    fn refresh(&mut self, _ctx: &mut ActionContext) -> Result<(), EngineError> {
        Ok(())
    }

    /// The pane left the dashboard.
    fn on_removed(&mut self) {}
}

/// Creates panes for `addview`, `split` and follow-up actions.
pub trait ViewFactory: Send + Sync {
    fn create(&self, view: ViewId, arg: Option<&str>) -> Result<Box<dyn Pane>, EngineError>;
}
