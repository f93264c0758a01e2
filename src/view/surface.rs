//! Drawing surfaces and the backend that puts them on screen.
//!
//! Every view renders into its own [`Surface`], a ratatui buffer covering
//! exactly the rectangle the layout gave it. Surfaces are addressed in local
//! coordinates; the backend merges them into the frame in order, so later
//! surfaces (popups, the error view) cover earlier ones.

use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::Widget;
use ratatui::Terminal;
use unicode_width::UnicodeWidthStr;

/// A rectangle of cells owned by one view for one render pass.
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: Buffer,
    cursor: Option<Position>,
}

impl Surface {
    pub fn new(area: Rect) -> Self {
        Self {
            buffer: Buffer::empty(area),
            cursor: None,
        }
    }

    pub fn area(&self) -> Rect {
        self.buffer.area
    }

    pub fn width(&self) -> u16 {
        self.buffer.area.width
    }

    pub fn height(&self) -> u16 {
        self.buffer.area.height
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Write `text` starting at local (`row`, `col`), clipped to the surface.
    /// Returns the number of columns written.
    pub fn set_cell(&mut self, row: u16, col: u16, text: &str, style: Style) -> u16 {
        let area = self.buffer.area;
        if row >= area.height || col >= area.width {
            return 0;
        }
        let max_width = (area.width - col) as usize;
        let (end_x, _) = self
            .buffer
            .set_stringn(area.x + col, area.y + row, text, max_width, style);
        end_x - (area.x + col)
    }

    /// Write a full row, padding with `style` to the surface width.
    pub fn set_line(&mut self, row: u16, text: &str, style: Style) {
        let area = self.buffer.area;
        if row >= area.height {
            return;
        }
        self.buffer
            .set_style(Rect::new(area.x, area.y + row, area.width, 1), style);
        self.set_cell(row, 0, text, style);
    }

    /// Style a whole row without changing its text.
    pub fn style_line(&mut self, row: u16, style: Style) {
        let area = self.buffer.area;
        if row < area.height {
            self.buffer
                .set_style(Rect::new(area.x, area.y + row, area.width, 1), style);
        }
    }

    /// Place the terminal cursor at local (`row`, `col`).
    pub fn set_cursor(&mut self, row: u16, col: u16) {
        let area = self.buffer.area;
        if row < area.height && col <= area.width {
            self.cursor = Some(Position::new(area.x + col, area.y + row));
        }
    }

    /// Absolute cursor position, if the view placed one.
    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W) {
        let area = self.buffer.area;
        widget.render(area, &mut self.buffer);
    }

    /// Text of a local row with trailing blanks trimmed. Used by tests.
    pub fn row_text(&self, row: u16) -> String {
        let area = self.buffer.area;
        let mut line = String::new();
        for x in area.x..area.x + area.width {
            if let Some(cell) = self.buffer.cell((x, area.y + row)) {
                line.push_str(cell.symbol());
            }
        }
        line.trim_end().to_string()
    }
}

/// Number of columns `text` occupies on screen.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Where surfaces are drawn.
pub trait RenderBackend: Send {
    /// Current screen size.
    fn dimension(&self) -> std::io::Result<Rect>;

    /// Draw one frame made of `surfaces`, in order.
    fn draw(&mut self, surfaces: &[Surface]) -> std::io::Result<()>;

    /// Forget what is on screen so the next frame is drawn in full.
    fn clear(&mut self) -> std::io::Result<()>;
}

impl<B> RenderBackend for Terminal<B>
where
    B: Backend + Send,
{
    fn dimension(&self) -> std::io::Result<Rect> {
        let size = self.size()?;
        Ok(Rect::new(0, 0, size.width, size.height))
    }

    fn draw(&mut self, surfaces: &[Surface]) -> std::io::Result<()> {
        Terminal::draw(self, |frame| {
            let frame_area = frame.area();
            let buffer = frame.buffer_mut();
            let mut cursor = None;
            for surface in surfaces {
                if frame_area.contains(surface.area().as_position()) {
                    buffer.merge(&surface.buffer);
                }
                if surface.cursor.is_some() {
                    cursor = surface.cursor;
                }
            }
            if let Some(position) = cursor {
                frame.set_cursor_position(position);
            }
        })?;
        Ok(())
    }

    fn clear(&mut self) -> std::io::Result<()> {
        Terminal::clear(self)
    }
}
