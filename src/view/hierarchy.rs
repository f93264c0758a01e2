//! The view hierarchy.
//!
//! A tab is a tree of composites and leaf panes with exactly one active path
//! from the root to a focused leaf:
//!
//! ```text
//! ┌──────────┬─────────┐      Tab "Main"
//! │          │ FileView│      └─ Container (vertical)
//! │ RefView  ├─────────┤         ├─ RefView
//! │          │ Preview │         └─ Container (horizontal)   <- active
//! └──────────┴─────────┘            ├─ FileView
//!                                   └─ PreviewView            <- active
//! ```
//!
//! State changes are pushed top-down: the active child of an active
//! composite is active, its siblings are inactive but visible (or invisible
//! when the composite shows its active child full screen). A leaf is only
//! notified when its state actually changes.

use super::surface::Surface;
use super::{Orientation, Pane, PaneId, ViewId, ViewState};
use crate::error::EngineError;
use crate::input::actions::{Action, ActionType};
use crate::input::handler::{ActionContext, ActionResult};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// A leaf pane plus the bookkeeping the hierarchy keeps for it.
pub struct PaneView {
    id: PaneId,
    state: ViewState,
    rect: Rect,
    pane: Box<dyn Pane>,
}

impl PaneView {
    pub fn new(pane: Box<dyn Pane>) -> Self {
        Self {
            id: PaneId::next(),
            state: ViewState::Invisible,
            rect: Rect::default(),
            pane,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn view_id(&self) -> ViewId {
        self.pane.view_id()
    }

    pub fn title(&self) -> String {
        self.pane.title()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Rectangle of the last render pass.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn pane_mut(&mut self) -> &mut dyn Pane {
        self.pane.as_mut()
    }

    /// Returns whether the state changed. The pane is notified only then.
    pub fn set_state(&mut self, state: ViewState) -> bool {
        if self.state == state {
            return false;
        }
        tracing::trace!("{} {:?} -> {:?}", self.view_id().name(), self.state, state);
        self.state = state;
        self.pane.on_state_change(state);
        true
    }

    pub fn render(&mut self, area: Rect) -> Surface {
        self.rect = area;
        let mut surface = Surface::new(area);
        self.pane.render(&mut surface, self.state);
        surface
    }

    pub fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        ctx.pane = Some(self.id);
        self.pane.handle_action(action, ctx)
    }

    pub fn remove(mut self) {
        self.set_state(ViewState::Invisible);
        self.pane.on_removed();
    }
}

/// A node of the hierarchy
pub enum ViewNode {
    Pane(PaneView),
    Container(Container),
}

impl ViewNode {
    pub fn pane(pane: Box<dyn Pane>) -> Self {
        ViewNode::Pane(PaneView::new(pane))
    }

    fn set_state(&mut self, state: ViewState) {
        match self {
            ViewNode::Pane(p) => {
                p.set_state(state);
            }
            ViewNode::Container(c) => c.set_state(state),
        }
    }

    fn render(&mut self, area: Rect, out: &mut Vec<Surface>) {
        match self {
            ViewNode::Pane(p) => out.push(p.render(area)),
            ViewNode::Container(c) => c.render(area, out),
        }
    }

    fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        match self {
            ViewNode::Pane(p) => p.handle_action(action, ctx),
            ViewNode::Container(c) => c.handle_action(action, ctx),
        }
    }

    fn collect_leaf_paths(&self, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        match self {
            ViewNode::Pane(_) => out.push(prefix.clone()),
            ViewNode::Container(c) => c.collect_leaf_paths(prefix, out),
        }
    }

    fn for_each_pane(&mut self, f: &mut dyn FnMut(&mut PaneView)) {
        match self {
            ViewNode::Pane(p) => f(p),
            ViewNode::Container(c) => c.for_each_pane(f),
        }
    }

    fn remove_all(self) {
        match self {
            ViewNode::Pane(p) => p.remove(),
            ViewNode::Container(c) => {
                for child in c.children {
                    child.remove_all();
                }
            }
        }
    }
}

/// A composite view
pub struct Container {
    view_id: ViewId,
    title: String,
    orientation: Orientation,
    children: Vec<ViewNode>,
    active_child: usize,
    state: ViewState,
    full_screen: bool,
    area: Rect,
}

impl Container {
    pub fn new(view_id: ViewId, title: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            view_id,
            title: title.into(),
            orientation,
            children: Vec::new(),
            active_child: 0,
            state: ViewState::Invisible,
            full_screen: false,
            area: Rect::default(),
        }
    }

    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[ViewNode] {
        &self.children
    }

    /// Append `node` and make it the active child.
    pub fn add_child(&mut self, node: ViewNode) {
        self.children.push(node);
        self.active_child = self.children.len() - 1;
        self.set_state(self.state);
    }

    /// Push `state` down the tree.
    pub fn set_state(&mut self, state: ViewState) {
        self.state = state;
        let active = self.active_child;
        let full_screen = self.full_screen;
        for (index, child) in self.children.iter_mut().enumerate() {
            let child_state = if index == active {
                state
            } else if full_screen || state == ViewState::Invisible {
                ViewState::Invisible
            } else {
                ViewState::InactiveVisible
            };
            child.set_state(child_state);
        }
    }

    /// Render the visible children into `area`.
    pub fn render(&mut self, area: Rect, out: &mut Vec<Surface>) {
        self.area = area;
        if self.children.is_empty() {
            return;
        }

        if self.full_screen {
            let active = self.active_child;
            self.children[active].render(area, out);
            return;
        }

        // Vertical means side by side, which is a horizontal layout direction
        let direction = match self.orientation.resolve(area.width, area.height) {
            Orientation::Vertical => Direction::Horizontal,
            _ => Direction::Vertical,
        };
        let count = self.children.len() as u32;
        let rects = Layout::default()
            .direction(direction)
            .constraints(vec![Constraint::Ratio(1, count); self.children.len()])
            .split(area);

        for (child, rect) in self.children.iter_mut().zip(rects.iter()) {
            child.render(*rect, out);
        }
    }

    /// Scopes along the active path, most specific first.
    pub fn active_hierarchy(&self) -> Vec<ViewId> {
        let mut ids = match self.children.get(self.active_child) {
            Some(ViewNode::Pane(p)) => vec![p.view_id()],
            Some(ViewNode::Container(c)) => c.active_hierarchy(),
            None => Vec::new(),
        };
        ids.push(self.view_id);
        ids
    }

    pub fn active_pane(&self) -> Option<&PaneView> {
        match self.children.get(self.active_child)? {
            ViewNode::Pane(p) => Some(p),
            ViewNode::Container(c) => c.active_pane(),
        }
    }

    pub fn active_pane_mut(&mut self) -> Option<&mut PaneView> {
        match self.children.get_mut(self.active_child)? {
            ViewNode::Pane(p) => Some(p),
            ViewNode::Container(c) => c.active_pane_mut(),
        }
    }

    /// Deliver `action` to the active leaf, then bubble it up through the
    /// composites on the active path.
    pub fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        let active = self.active_child;
        if let Some(child) = self.children.get_mut(active) {
            if child.handle_action(action, ctx)?.is_consumed() {
                return Ok(ActionResult::Consumed);
            }
        }

        if self.children.len() < 2 {
            return Ok(ActionResult::Ignored);
        }

        match action.action_type {
            ActionType::FullScreenView => {
                self.full_screen = !self.full_screen;
                tracing::debug!("{} full screen: {}", self.title, self.full_screen);
                self.set_state(self.state);
                ctx.request_redraw();
                Ok(ActionResult::Consumed)
            }
            ActionType::ToggleViewLayout => {
                self.orientation = self.orientation.toggle(self.area.width, self.area.height);
                tracing::debug!("{} layout: {}", self.title, self.orientation.name());
                ctx.request_redraw();
                Ok(ActionResult::Consumed)
            }
            _ => Ok(ActionResult::Ignored),
        }
    }

    fn collect_leaf_paths(&self, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (index, child) in self.children.iter().enumerate() {
            prefix.push(index);
            child.collect_leaf_paths(prefix, out);
            prefix.pop();
        }
    }

    /// Paths (child indices from this container) of every leaf, in order.
    pub fn leaf_paths(&self) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        self.collect_leaf_paths(&mut Vec::new(), &mut out);
        out
    }

    pub fn active_path(&self) -> Vec<usize> {
        let mut path = vec![self.active_child];
        if let Some(ViewNode::Container(c)) = self.children.get(self.active_child) {
            path.extend(c.active_path());
        }
        path
    }

    /// Make the leaf at `path` the active one. State is not re-derived.
    pub fn set_active_path(&mut self, path: &[usize]) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        if *first >= self.children.len() {
            return;
        }
        self.active_child = *first;
        if let ViewNode::Container(c) = &mut self.children[*first] {
            c.set_active_path(rest);
        }
    }

    /// Replace the active leaf with a container of `orientation` holding the
    /// old leaf and `node`, which becomes active.
    pub fn split_active(&mut self, node: ViewNode, orientation: Orientation) {
        let active = self.active_child;
        let Some(child) = self.children.get_mut(active) else {
            self.add_child(node);
            return;
        };

        if let ViewNode::Container(c) = child {
            c.split_active(node, orientation);
            self.set_state(self.state);
            return;
        }

        let mut split = Container::new(ViewId::Container, self.title.clone(), orientation);
        let leaf = std::mem::replace(
            child,
            ViewNode::Container(Container::new(ViewId::Container, "", orientation)),
        );
        split.children.push(leaf);
        split.children.push(node);
        split.active_child = 1;
        *child = ViewNode::Container(split);
        self.set_state(self.state);
    }

    /// Add `node` next to the active leaf, in the innermost container.
    pub fn add_to_active(&mut self, node: ViewNode) {
        let active = self.active_child;
        if let Some(ViewNode::Container(c)) = self.children.get_mut(active) {
            c.add_to_active(node);
            self.set_state(self.state);
        } else {
            self.add_child(node);
        }
    }

    /// Remove the active leaf. Nested containers left empty are removed and
    /// those left with a single child are collapsed into it.
    pub fn remove_active(&mut self) -> Option<PaneView> {
        let active = self.active_child;
        let removed = match self.children.get_mut(active)? {
            ViewNode::Container(c) => {
                let removed = c.remove_active();
                if c.children.is_empty() {
                    self.children.remove(active);
                } else if c.children.len() == 1 {
                    if let Some(only) = c.children.pop() {
                        self.children[active] = only;
                    }
                }
                removed
            }
            ViewNode::Pane(_) => match self.children.remove(active) {
                ViewNode::Pane(p) => Some(p),
                ViewNode::Container(_) => None,
            },
        };

        self.active_child = active.min(self.children.len().saturating_sub(1));
        if self.children.len() < 2 {
            self.full_screen = false;
        }
        self.set_state(self.state);
        removed
    }

    pub fn for_each_pane(&mut self, f: &mut dyn FnMut(&mut PaneView)) {
        for child in &mut self.children {
            child.for_each_pane(f);
        }
    }

    pub fn find_pane_mut(&mut self, id: PaneId) -> Option<&mut PaneView> {
        for child in &mut self.children {
            match child {
                ViewNode::Pane(p) if p.id() == id => return Some(p),
                ViewNode::Pane(_) => {}
                ViewNode::Container(c) => {
                    if let Some(p) = c.find_pane_mut(id) {
                        return Some(p);
                    }
                }
            }
        }
        None
    }

    pub fn pane_by_path_mut(&mut self, path: &[usize]) -> Option<&mut PaneView> {
        let (first, rest) = path.split_first()?;
        match self.children.get_mut(*first)? {
            ViewNode::Pane(p) if rest.is_empty() => Some(p),
            ViewNode::Pane(_) => None,
            ViewNode::Container(c) => c.pane_by_path_mut(rest),
        }
    }

    /// Path of the visible leaf drawn at (`column`, `row`) in the last render.
    pub fn pane_at(&self, column: u16, row: u16) -> Option<Vec<usize>> {
        let position = ratatui::layout::Position::new(column, row);
        for (index, child) in self.children.iter().enumerate() {
            let found = match child {
                ViewNode::Pane(p) if p.state().is_visible() && p.rect().contains(position) => {
                    Some(Vec::new())
                }
                ViewNode::Pane(_) => None,
                ViewNode::Container(c) => c.pane_at(column, row),
            };
            if let Some(mut path) = found {
                path.insert(0, index);
                return Some(path);
            }
        }
        None
    }

    /// Remove every child, notifying each pane.
    pub fn remove_all(&mut self) {
        for child in self.children.drain(..) {
            child.remove_all();
        }
        self.active_child = 0;
    }
}

/// A named root composite.
pub struct Tab {
    name: String,
    root: Container,
}

impl Tab {
    pub fn new(name: impl Into<String>, orientation: Orientation) -> Self {
        let name = name.into();
        Self {
            root: Container::new(ViewId::Main, name.clone(), orientation),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Container {
        &mut self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn set_state(&mut self, state: ViewState) {
        self.root.set_state(state);
    }

    pub fn state(&self) -> ViewState {
        self.root.state()
    }

    pub fn active_hierarchy(&self) -> Vec<ViewId> {
        self.root.active_hierarchy()
    }

    /// Deliver to the active path; the tab itself cycles focus.
    pub fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        if self.root.handle_action(action, ctx)?.is_consumed() {
            return Ok(ActionResult::Consumed);
        }
        let changed = match action.action_type {
            ActionType::NextView => self.cycle_view(true),
            ActionType::PrevView => self.cycle_view(false),
            _ => return Ok(ActionResult::Ignored),
        };
        Ok(ctx.changed(changed))
    }

    /// Move focus to the next (or previous) leaf, wrapping around.
    pub fn cycle_view(&mut self, forward: bool) -> bool {
        let paths = self.root.leaf_paths();
        if paths.len() < 2 {
            return false;
        }
        let current = self.root.active_path();
        let Some(position) = paths.iter().position(|p| *p == current) else {
            return false;
        };
        let next = if forward {
            (position + 1) % paths.len()
        } else if position == 0 {
            paths.len() - 1
        } else {
            position - 1
        };
        self.root.set_active_path(&paths[next]);
        self.root.set_state(self.root.state());
        true
    }

    /// Focus the leaf at `path` (mouse click).
    pub fn focus_path(&mut self, path: &[usize]) -> bool {
        if self.root.active_path() == path {
            return false;
        }
        self.root.set_active_path(path);
        self.root.set_state(self.root.state());
        true
    }

    pub fn render(&mut self, area: Rect, out: &mut Vec<Surface>) {
        self.root.render(area, out);
    }
}
