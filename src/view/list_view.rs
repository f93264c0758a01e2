//! Scrollable list view shared by every row-based pane.
//!
//! A [`ListView`] owns a [`ViewPosition`] and a snapshot of rows supplied by
//! a [`RowSource`]. It implements movement, horizontal scrolling, searching
//! and filtering; the source only decides what the rows are and what
//! selecting one means.

use super::surface::{display_width, Surface};
use super::viewport::ViewPosition;
use super::{Pane, ViewId, ViewState};
use crate::error::EngineError;
use crate::input::actions::{Action, ActionArg, ActionType, MenuEntry};
use crate::input::handler::{ActionContext, ActionResult};
use crate::services::search::{
    compile_pattern, find_match, SearchDirection, SearchRequest, SearchToken,
};
use ratatui::style::{Color, Modifier, Style};
use regex::Regex;
use std::sync::Arc;

/// Rows scrolled per mouse wheel step
const MOUSE_SCROLL_ROWS: usize = 3;

/// One displayed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Text shown and searched
    pub text: String,
    /// Identifier handed to follow-up actions (ref name, file path, ...)
    pub value: String,
}

impl Row {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            text,
        }
    }

    pub fn with_value(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Supplies the content of a [`ListView`].
pub trait RowSource: Send {
    fn view_id(&self) -> ViewId;

    fn title(&self) -> String;

    /// Produce the full set of rows.
    fn load(&mut self) -> Result<Vec<Row>, EngineError>;

    /// Action to run when `row` is selected.
    fn on_select(&self, _row: &Row) -> Option<Action> {
        None
    }

    /// Context menu entries for `row`.
    fn context_menu(&self, _row: &Row) -> Vec<MenuEntry> {
        Vec::new()
    }

    /// Whether file content changes should reload the rows.
    fn tracks_content(&self) -> bool {
        false
    }
}

/// A pane showing rows from a [`RowSource`]
pub struct ListView<S: RowSource> {
    source: S,
    rows: Arc<Vec<Row>>,
    /// Rows left after filtering; what is displayed and searched
    visible: Arc<Vec<Row>>,
    filter: Option<Regex>,
    position: ViewPosition,
    /// Bumped whenever `visible` is replaced
    epoch: u64,
    /// Bumped whenever a search starts
    search_generation: u64,
    page_rows: usize,
    page_cols: usize,
    state: ViewState,
    last_search: Option<(Regex, SearchDirection)>,
}

impl<S: RowSource> ListView<S> {
    pub fn new(mut source: S) -> Result<Self, EngineError> {
        let rows = Arc::new(source.load()?);
        Ok(Self {
            source,
            visible: rows.clone(),
            rows,
            filter: None,
            position: ViewPosition::new(),
            epoch: 0,
            search_generation: 0,
            page_rows: 1,
            page_cols: 1,
            state: ViewState::Invisible,
            last_search: None,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn position(&self) -> ViewPosition {
        self.position
    }

    /// Replace the position wholesale. Any search in flight becomes stale.
    pub fn set_position(&mut self, position: ViewPosition) {
        self.position = position;
        self.epoch += 1;
    }

    pub fn visible_rows(&self) -> &[Row] {
        &self.visible
    }

    pub fn selected(&self) -> Option<&Row> {
        self.visible.get(self.position.active_row_index)
    }

    pub fn search_token(&self) -> SearchToken {
        SearchToken {
            position: self.position,
            epoch: self.epoch,
            generation: self.search_generation,
        }
    }

    /// Set the page size used by movement before the first render.
    pub fn set_page_rows(&mut self, page_rows: usize) {
        self.page_rows = page_rows.max(1);
    }

    fn row_count(&self) -> usize {
        self.visible.len()
    }

    fn apply_filter(&mut self) {
        self.visible = match &self.filter {
            Some(re) => Arc::new(
                self.rows
                    .iter()
                    .filter(|row| re.is_match(&row.text))
                    .cloned()
                    .collect(),
            ),
            None => self.rows.clone(),
        };
        self.epoch += 1;
        self.position
            .determine_view_start(self.page_rows, self.row_count());
    }

    fn moved(&mut self, changed: bool, ctx: &mut ActionContext) -> ActionResult {
        let adjusted = self
            .position
            .determine_view_start(self.page_rows, self.row_count());
        ctx.changed(changed || adjusted)
    }

    fn start_search(&mut self, regex: Regex, direction: SearchDirection, ctx: &mut ActionContext) {
        self.last_search = Some((regex.clone(), direction));
        ctx.request_redraw();
        self.launch_search(regex, direction, ctx);
    }

    fn repeat_search(&mut self, reverse: bool, ctx: &mut ActionContext) {
        match self.last_search.clone() {
            Some((regex, direction)) => {
                let direction = if reverse { direction.reversed() } else { direction };
                self.launch_search(regex, direction, ctx);
            }
            None => ctx.set_status("No previous search"),
        }
    }

    /// Search from the selection. Results of earlier searches from this view
    /// become stale.
    fn launch_search(&mut self, regex: Regex, direction: SearchDirection, ctx: &mut ActionContext) {
        self.search_generation += 1;
        let token = self.search_token();
        let start = self.position.active_row_index;

        match (&ctx.search, ctx.pane) {
            (Some(engine), Some(pane)) => engine.start(SearchRequest {
                pane,
                token,
                rows: self.visible.clone(),
                regex,
                start,
                direction,
            }),
            _ => {
                let index = find_match(&self.visible, &regex, start, direction);
                self.on_search_match(token, regex.as_str(), index, ctx);
            }
        }
    }

    fn render_row(&self, surface: &mut Surface, screen_row: u16, row: &Row, selected: bool) {
        let shown: String = row
            .text
            .chars()
            .skip(self.position.view_start_column)
            .collect();

        let style = if selected && self.state == ViewState::Active {
            Style::default().add_modifier(Modifier::REVERSED)
        } else if selected {
            Style::default().add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        surface.set_line(screen_row, &shown, style);

        if let Some((regex, _)) = &self.last_search {
            for m in regex.find_iter(&shown) {
                if m.as_str().is_empty() {
                    continue;
                }
                let col = display_width(&shown[..m.start()]) as u16;
                surface.set_cell(screen_row, col, m.as_str(), style.fg(Color::Yellow));
            }
        }
    }
}

impl<S: RowSource> Pane for ListView<S> {
    fn view_id(&self) -> ViewId {
        self.source.view_id()
    }

    fn title(&self) -> String {
        self.source.title()
    }

    fn render(&mut self, surface: &mut Surface, state: ViewState) {
        self.state = state;
        self.page_rows = (surface.height() as usize).saturating_sub(1).max(1);
        self.page_cols = (surface.width() as usize).max(1);
        self.position
            .determine_view_start(self.page_rows, self.row_count());

        let count = self.row_count();
        let current = if count == 0 {
            0
        } else {
            self.position.active_row_index + 1
        };
        let mut title = format!(" {} ({}/{})", self.source.title(), current, count);
        if let Some(filter) = &self.filter {
            title.push_str(&format!(" filter: {}", filter.as_str()));
        }
        let title_style = match state {
            ViewState::Active => Style::default()
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            _ => Style::default().add_modifier(Modifier::DIM | Modifier::REVERSED),
        };
        surface.set_line(0, &title, title_style);

        let start = self.position.view_start_row_index;
        let end = (start + self.page_rows).min(count);
        let visible = self.visible.clone();
        for (offset, row) in visible[start.min(end)..end].iter().enumerate() {
            let index = start + offset;
            self.render_row(
                surface,
                offset as u16 + 1,
                row,
                index == self.position.active_row_index,
            );
        }
    }

    fn handle_action(
        &mut self,
        action: &Action,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, EngineError> {
        let rows = self.row_count();
        let page = self.page_rows;
        let p = &mut self.position;

        let result = match action.action_type {
            ActionType::NextLine => {
                let changed = p.move_line_down(rows);
                self.moved(changed, ctx)
            }
            ActionType::PrevLine => {
                let changed = p.move_line_up();
                self.moved(changed, ctx)
            }
            ActionType::NextPage => {
                let changed = p.move_page_down(page, rows);
                self.moved(changed, ctx)
            }
            ActionType::PrevPage => {
                let changed = p.move_page_up(page);
                self.moved(changed, ctx)
            }
            ActionType::NextHalfPage => {
                let changed = p.move_half_page_down(page, rows);
                self.moved(changed, ctx)
            }
            ActionType::PrevHalfPage => {
                let changed = p.move_half_page_up(page);
                self.moved(changed, ctx)
            }
            ActionType::FirstLine => {
                let changed = p.move_to_first_line();
                self.moved(changed, ctx)
            }
            ActionType::LastLine => {
                let changed = p.move_to_last_line(rows);
                self.moved(changed, ctx)
            }
            ActionType::ScrollRight => {
                let changed = p.move_page_right(self.page_cols);
                ctx.changed(changed)
            }
            ActionType::ScrollLeft => {
                let changed = p.move_page_left(self.page_cols);
                ctx.changed(changed)
            }
            ActionType::CenterView => {
                let changed = p.center_active_row(page);
                self.moved(changed, ctx)
            }
            ActionType::ScrollCursorTop => {
                let changed = p.scroll_active_row_top();
                self.moved(changed, ctx)
            }
            ActionType::ScrollCursorBottom => {
                let changed = p.scroll_active_row_bottom(page);
                self.moved(changed, ctx)
            }
            ActionType::CursorTopView => {
                let changed = p.move_cursor_top(page, rows);
                self.moved(changed, ctx)
            }
            ActionType::CursorMiddleView => {
                let changed = p.move_cursor_middle(page, rows);
                self.moved(changed, ctx)
            }
            ActionType::CursorBottomView => {
                let changed = p.move_cursor_bottom(page, rows);
                self.moved(changed, ctx)
            }
            ActionType::SelectRow => {
                let index = action.index(0)?;
                let changed = p.select_row(index, rows);
                self.moved(changed, ctx)
            }
            ActionType::MouseSelect => {
                let (_, row) = action.point(0)?;
                // Row 0 is the title
                if row == 0 {
                    return Ok(ActionResult::Consumed);
                }
                let index = p.view_start_row_index + row as usize - 1;
                let changed = p.select_row(index, rows);
                self.moved(changed, ctx)
            }
            ActionType::MouseScrollDown => {
                let changed = p.scroll_down(MOUSE_SCROLL_ROWS, page, rows);
                self.moved(changed, ctx)
            }
            ActionType::MouseScrollUp => {
                let changed = p.scroll_up(MOUSE_SCROLL_ROWS, page);
                self.moved(changed, ctx)
            }
            ActionType::Select => {
                if let Some(follow_up) = self.selected().and_then(|row| self.source.on_select(row)) {
                    ctx.defer(follow_up);
                }
                ActionResult::Consumed
            }
            ActionType::ShowContextMenu => {
                let entries = self
                    .selected()
                    .map(|row| self.source.context_menu(row))
                    .unwrap_or_default();
                if entries.is_empty() {
                    ctx.set_status(format!("No context menu for {}", self.source.title()));
                } else {
                    ctx.defer(Action::with_args(
                        ActionType::CreateContextMenu,
                        vec![ActionArg::Menu(entries)],
                    ));
                }
                ActionResult::Consumed
            }
            ActionType::Search | ActionType::ReverseSearch => {
                let pattern = action.text(0)?;
                let direction = if action.action_type == ActionType::Search {
                    SearchDirection::Forward
                } else {
                    SearchDirection::Backward
                };
                match compile_pattern(pattern) {
                    Ok(regex) => self.start_search(regex, direction, ctx),
                    Err(e) => return Err(e),
                }
                ActionResult::Consumed
            }
            ActionType::SearchFindNext => {
                self.repeat_search(false, ctx);
                ActionResult::Consumed
            }
            ActionType::SearchFindPrev => {
                self.repeat_search(true, ctx);
                ActionResult::Consumed
            }
            ActionType::ClearSearch => {
                let had_search = self.last_search.take().is_some();
                ctx.changed(had_search)
            }
            ActionType::AddFilter => {
                let regex = compile_pattern(action.text(0)?)?;
                tracing::debug!("{} filter {}", self.source.title(), regex.as_str());
                self.filter = Some(regex);
                self.position = ViewPosition::new();
                self.apply_filter();
                ctx.changed(true)
            }
            ActionType::RemoveFilter => {
                if self.filter.take().is_some() {
                    self.apply_filter();
                    ctx.changed(true)
                } else {
                    ActionResult::Consumed
                }
            }
            _ => ActionResult::Ignored,
        };
        Ok(result)
    }

    fn on_search_match(
        &mut self,
        token: SearchToken,
        pattern: &str,
        index: Option<usize>,
        ctx: &mut ActionContext,
    ) {
        if token != self.search_token() {
            tracing::debug!("Discarding stale search result for {}", pattern);
            return;
        }
        match index {
            None => ctx.set_status(format!("Pattern not found: {pattern}")),
            Some(index) if index < self.row_count() => {
                let changed = self.position.select_row(index, self.row_count());
                self.moved(changed, ctx);
            }
            Some(index) => {
                tracing::debug!("Search match {} beyond {} rows", index, self.row_count());
            }
        }
    }

    fn on_state_change(&mut self, state: ViewState) {
        self.state = state;
    }

    fn reload(&mut self, ctx: &mut ActionContext) -> Result<(), EngineError> {
        self.rows = Arc::new(self.source.load()?);
        self.apply_filter();
        ctx.request_redraw();
        Ok(())
    }

    fn refresh(&mut self, ctx: &mut ActionContext) -> Result<(), EngineError> {
        if self.source.tracks_content() {
            self.reload(ctx)?;
        }
        Ok(())
    }
}
