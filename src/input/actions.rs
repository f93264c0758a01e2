//! Actions - the unit of work the router dispatches.
//!
//! An [`Action`] is an [`ActionType`] plus a heterogeneous argument list.
//! Key bindings only ever carry the type; arguments are attached by whoever
//! produces the action (mouse translation, prompts, context menus, the
//! command layer). Accessors check argument types at dispatch time and report
//! a [`ResolutionError`] when an action was wired up incorrectly.

use crate::error::ResolutionError;
use crate::view::{Orientation, ViewId};

/// Every action the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// No-op sentinel. Binding a sequence to it swallows the keys.
    None,

    // Engine lifecycle
    Exit,
    Suspend,
    Refresh,

    // Prompts
    Prompt,
    SearchPrompt,
    ReverseSearchPrompt,
    FilterPrompt,

    // Search and filter
    Search,
    ReverseSearch,
    SearchFindNext,
    SearchFindPrev,
    ClearSearch,
    AddFilter,
    RemoveFilter,

    // Status
    ShowStatus,

    // Movement
    NextLine,
    PrevLine,
    NextPage,
    PrevPage,
    NextHalfPage,
    PrevHalfPage,
    ScrollRight,
    ScrollLeft,
    FirstLine,
    LastLine,
    CenterView,
    ScrollCursorTop,
    ScrollCursorBottom,
    CursorTopView,
    CursorMiddleView,
    CursorBottomView,
    Select,
    SelectRow,

    // View layout
    NextView,
    PrevView,
    FullScreenView,
    ToggleViewLayout,
    AddView,
    SplitView,
    RemoveView,

    // Tabs
    NewTab,
    RemoveTab,
    NextTab,
    PrevTab,
    SelectTabByName,

    // Popups
    ShowContextMenu,
    CreateContextMenu,
    RemovePopup,
    ShowHelpView,

    // Mouse
    MouseSelect,
    MouseScrollDown,
    MouseScrollUp,
}

impl ActionType {
    pub const ALL: &'static [ActionType] = &[
        ActionType::None,
        ActionType::Exit,
        ActionType::Suspend,
        ActionType::Refresh,
        ActionType::Prompt,
        ActionType::SearchPrompt,
        ActionType::ReverseSearchPrompt,
        ActionType::FilterPrompt,
        ActionType::Search,
        ActionType::ReverseSearch,
        ActionType::SearchFindNext,
        ActionType::SearchFindPrev,
        ActionType::ClearSearch,
        ActionType::AddFilter,
        ActionType::RemoveFilter,
        ActionType::ShowStatus,
        ActionType::NextLine,
        ActionType::PrevLine,
        ActionType::NextPage,
        ActionType::PrevPage,
        ActionType::NextHalfPage,
        ActionType::PrevHalfPage,
        ActionType::ScrollRight,
        ActionType::ScrollLeft,
        ActionType::FirstLine,
        ActionType::LastLine,
        ActionType::CenterView,
        ActionType::ScrollCursorTop,
        ActionType::ScrollCursorBottom,
        ActionType::CursorTopView,
        ActionType::CursorMiddleView,
        ActionType::CursorBottomView,
        ActionType::Select,
        ActionType::SelectRow,
        ActionType::NextView,
        ActionType::PrevView,
        ActionType::FullScreenView,
        ActionType::ToggleViewLayout,
        ActionType::AddView,
        ActionType::SplitView,
        ActionType::RemoveView,
        ActionType::NewTab,
        ActionType::RemoveTab,
        ActionType::NextTab,
        ActionType::PrevTab,
        ActionType::SelectTabByName,
        ActionType::ShowContextMenu,
        ActionType::CreateContextMenu,
        ActionType::RemovePopup,
        ActionType::ShowHelpView,
        ActionType::MouseSelect,
        ActionType::MouseScrollDown,
        ActionType::MouseScrollUp,
    ];

    /// Name used in config files, the command prompt and the help view.
    pub fn name(self) -> &'static str {
        self.descriptor().0
    }

    pub fn description(self) -> &'static str {
        self.descriptor().1
    }

    fn descriptor(self) -> (&'static str, &'static str) {
        match self {
            ActionType::None => ("none", "Do nothing"),
            ActionType::Exit => ("exit", "Exit the dashboard"),
            ActionType::Suspend => ("suspend", "Suspend to the shell"),
            ActionType::Refresh => ("refresh", "Reload every view"),
            ActionType::Prompt => ("prompt", "Open the command prompt"),
            ActionType::SearchPrompt => ("search-prompt", "Search forwards"),
            ActionType::ReverseSearchPrompt => ("reverse-search-prompt", "Search backwards"),
            ActionType::FilterPrompt => ("filter-prompt", "Filter the rows of the view"),
            ActionType::Search => ("search", "Search forwards for a pattern"),
            ActionType::ReverseSearch => ("reverse-search", "Search backwards for a pattern"),
            ActionType::SearchFindNext => ("search-find-next", "Move to the next match"),
            ActionType::SearchFindPrev => ("search-find-prev", "Move to the previous match"),
            ActionType::ClearSearch => ("clear-search", "Clear search highlighting"),
            ActionType::AddFilter => ("add-filter", "Filter the rows of the view"),
            ActionType::RemoveFilter => ("remove-filter", "Remove the row filter"),
            ActionType::ShowStatus => ("show-status", "Show a status message"),
            ActionType::NextLine => ("next-line", "Move down one line"),
            ActionType::PrevLine => ("prev-line", "Move up one line"),
            ActionType::NextPage => ("next-page", "Move down one page"),
            ActionType::PrevPage => ("prev-page", "Move up one page"),
            ActionType::NextHalfPage => ("next-half-page", "Move down half a page"),
            ActionType::PrevHalfPage => ("prev-half-page", "Move up half a page"),
            ActionType::ScrollRight => ("scroll-right", "Scroll right half a page"),
            ActionType::ScrollLeft => ("scroll-left", "Scroll left half a page"),
            ActionType::FirstLine => ("first-line", "Move to the first line"),
            ActionType::LastLine => ("last-line", "Move to the last line"),
            ActionType::CenterView => ("center-view", "Center the view on the cursor"),
            ActionType::ScrollCursorTop => ("scroll-cursor-top", "Scroll the cursor line to the top"),
            ActionType::ScrollCursorBottom => {
                ("scroll-cursor-bottom", "Scroll the cursor line to the bottom")
            }
            ActionType::CursorTopView => ("cursor-top-view", "Move to the top of the view"),
            ActionType::CursorMiddleView => ("cursor-middle-view", "Move to the middle of the view"),
            ActionType::CursorBottomView => ("cursor-bottom-view", "Move to the bottom of the view"),
            ActionType::Select => ("select", "Select the current row"),
            ActionType::SelectRow => ("select-row", "Move to a row by index"),
            ActionType::NextView => ("next-view", "Focus the next view"),
            ActionType::PrevView => ("prev-view", "Focus the previous view"),
            ActionType::FullScreenView => ("full-screen-view", "Toggle full screen for the view"),
            ActionType::ToggleViewLayout => ("toggle-view-layout", "Toggle the split orientation"),
            ActionType::AddView => ("add-view", "Add a view to the current tab"),
            ActionType::SplitView => ("split-view", "Split the current view"),
            ActionType::RemoveView => ("remove-view", "Close the current view"),
            ActionType::NewTab => ("new-tab", "Open a new tab"),
            ActionType::RemoveTab => ("remove-tab", "Close the current tab"),
            ActionType::NextTab => ("next-tab", "Switch to the next tab"),
            ActionType::PrevTab => ("prev-tab", "Switch to the previous tab"),
            ActionType::SelectTabByName => ("select-tab-by-name", "Switch to a tab by name"),
            ActionType::ShowContextMenu => ("show-context-menu", "Open the context menu"),
            ActionType::CreateContextMenu => ("create-context-menu", "Open a context menu popup"),
            ActionType::RemovePopup => ("remove-popup", "Close the top popup"),
            ActionType::ShowHelpView => ("show-help-view", "Show key bindings"),
            ActionType::MouseSelect => ("mouse-select", "Select with the mouse"),
            ActionType::MouseScrollDown => ("mouse-scroll-down", "Scroll down with the mouse"),
            ActionType::MouseScrollUp => ("mouse-scroll-up", "Scroll up with the mouse"),
        }
    }

    /// Look up an action by its config name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Actions that open the line prompt.
    pub fn is_prompt(self) -> bool {
        matches!(
            self,
            ActionType::Prompt
                | ActionType::SearchPrompt
                | ActionType::ReverseSearchPrompt
                | ActionType::FilterPrompt
        )
    }

    /// Actions that reach the router even while a popup is open.
    pub fn passes_popups(self) -> bool {
        self.is_prompt()
            || matches!(
                self,
                ActionType::ShowStatus | ActionType::CreateContextMenu | ActionType::RemovePopup
            )
    }
}

/// An entry in a context menu: a label and the action it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub label: String,
    pub action: Action,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Heterogeneous action payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionArg {
    Text(String),
    Index(usize),
    /// Screen coordinate (0-based)
    Point { column: u16, row: u16 },
    View(ViewId),
    Orientation(Orientation),
    Menu(Vec<MenuEntry>),
}

impl ActionArg {
    fn type_name(&self) -> &'static str {
        match self {
            ActionArg::Text(_) => "text",
            ActionArg::Index(_) => "index",
            ActionArg::Point { .. } => "point",
            ActionArg::View(_) => "view",
            ActionArg::Orientation(_) => "orientation",
            ActionArg::Menu(_) => "menu",
        }
    }
}

/// A typed command with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub action_type: ActionType,
    pub args: Vec<ActionArg>,
}

impl Action {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            args: Vec::new(),
        }
    }

    pub fn with_args(action_type: ActionType, args: Vec<ActionArg>) -> Self {
        Self { action_type, args }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::with_args(ActionType::ShowStatus, vec![ActionArg::Text(message.into())])
    }

    fn arg<'a, T>(
        &'a self,
        index: usize,
        expected: &'static str,
        extract: impl Fn(&'a ActionArg) -> Option<T>,
    ) -> Result<Option<T>, ResolutionError> {
        match self.args.get(index) {
            None => Ok(None),
            Some(arg) => extract(arg).map(Some).ok_or_else(|| {
                tracing::error!(
                    "Action {} argument {} is {} (expected {})",
                    self.action_type.name(),
                    index,
                    arg.type_name(),
                    expected
                );
                ResolutionError::WrongArgumentType {
                    action: self.action_type,
                    index,
                    expected,
                }
            }),
        }
    }

    fn required<T>(
        &self,
        value: Result<Option<T>, ResolutionError>,
        index: usize,
        expected: &'static str,
    ) -> Result<T, ResolutionError> {
        value?.ok_or(ResolutionError::MissingArgument {
            action: self.action_type,
            index,
            expected,
        })
    }

    pub fn optional_text(&self, index: usize) -> Result<Option<&str>, ResolutionError> {
        self.arg(index, "text", |arg| match arg {
            ActionArg::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn text(&self, index: usize) -> Result<&str, ResolutionError> {
        self.required(self.optional_text(index), index, "text")
    }

    pub fn index(&self, index: usize) -> Result<usize, ResolutionError> {
        let value = self.arg(index, "index", |arg| match arg {
            ActionArg::Index(i) => Some(*i),
            _ => None,
        });
        self.required(value, index, "index")
    }

    pub fn point(&self, index: usize) -> Result<(u16, u16), ResolutionError> {
        let value = self.arg(index, "point", |arg| match arg {
            ActionArg::Point { column, row } => Some((*column, *row)),
            _ => None,
        });
        self.required(value, index, "point")
    }

    pub fn view(&self, index: usize) -> Result<ViewId, ResolutionError> {
        let value = self.arg(index, "view", |arg| match arg {
            ActionArg::View(id) => Some(*id),
            _ => None,
        });
        self.required(value, index, "view")
    }

    pub fn orientation(&self, index: usize) -> Result<Orientation, ResolutionError> {
        let value = self.arg(index, "orientation", |arg| match arg {
            ActionArg::Orientation(o) => Some(*o),
            _ => None,
        });
        self.required(value, index, "orientation")
    }

    pub fn menu(&self, index: usize) -> Result<&[MenuEntry], ResolutionError> {
        let value = self.arg(index, "menu", |arg| match arg {
            ActionArg::Menu(entries) => Some(entries.as_slice()),
            _ => None,
        });
        self.required(value, index, "menu")
    }
}

impl From<ActionType> for Action {
    fn from(action_type: ActionType) -> Self {
        Action::new(action_type)
    }
}
