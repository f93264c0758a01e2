use super::Dashboard;
use crate::view::surface::Surface;
use crate::view::{Pane, ViewState};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

impl Dashboard {
    /// Lay out and draw everything into surfaces, in paint order: the
    /// current tab, popups from the bottom of the stack up, the status bar.
    pub fn render(&mut self, area: Rect) -> Vec<Surface> {
        let _span = tracing::trace_span!("render").entered();
        self.screen = area;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let content = chunks[0];
        let status_area = chunks[1];

        let mut surfaces = Vec::new();
        if let Some(tab) = self.tabs.get_mut(self.current_tab) {
            tab.render(content, &mut surfaces);
        }

        for popup in &mut self.popups {
            let rect = centered(content, popup.width, popup.height);
            surfaces.push(popup.view.render(rect));
        }

        let names = self.tab_names();
        self.status_bar.set_tabs(names, self.current_tab);
        let mut status = Surface::new(status_area);
        let state = if self.is_prompting() {
            ViewState::Active
        } else {
            ViewState::InactiveVisible
        };
        self.status_bar.render(&mut status, state);
        surfaces.push(status);
        surfaces
    }
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
