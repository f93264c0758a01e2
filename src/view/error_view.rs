//! Error surface owned by the render loop.
//!
//! Recoverable errors are collected here and drawn above the status bar
//! until the render loop decides they have been shown long enough.

use super::surface::Surface;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

/// Most errors kept at once; older ones are dropped first
const MAX_ERRORS: usize = 50;

#[derive(Debug, Default)]
pub struct ErrorView {
    errors: Vec<String>,
}

impl ErrorView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = String>) {
        self.errors.extend(errors);
        if self.errors.len() > MAX_ERRORS {
            let excess = self.errors.len() - MAX_ERRORS;
            self.errors.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Rows needed to show every error plus the header, capped to `max`.
    pub fn height(&self, max: u16) -> u16 {
        if self.errors.is_empty() {
            return 0;
        }
        (self.errors.len() as u16 + 1).min(max)
    }

    /// Draw the newest errors that fit in `area`.
    pub fn render(&self, area: Rect) -> Surface {
        let mut surface = Surface::new(area);
        let header = Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD);
        surface.set_line(0, &format!(" Errors ({})", self.errors.len()), header);

        let rows = area.height.saturating_sub(1) as usize;
        let skip = self.errors.len().saturating_sub(rows);
        for (offset, error) in self.errors.iter().skip(skip).enumerate() {
            surface.set_line(offset as u16 + 1, error, Style::default().fg(Color::Red));
        }
        surface
    }
}
