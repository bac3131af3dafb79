use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    text::Line,
    widgets::Widget,
};
use stackfall_engine::ShapeColor;

use crate::ui::widgets::style;

/// What occupies a single board cell on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDisplay {
    Empty,
    /// Part of a piece that has already locked.
    Locked,
    /// Part of the falling piece.
    Falling(ShapeColor),
}

impl CellDisplay {
    /// Terminal columns per cell, so that cells look roughly square.
    pub const WIDTH: u16 = 2;
    pub const HEIGHT: u16 = 1;

    pub const fn style(self) -> Style {
        match self {
            Self::Empty => style::EMPTY_DOT,
            Self::Locked => style::LOCKED,
            Self::Falling(color) => style::piece(color),
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Empty => " .",
            Self::Locked | Self::Falling(_) => "  ",
        }
    }
}

impl Widget for CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.style());
        Line::styled(self.symbol(), self.style()).render(area, buf);
    }
}
