use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{board_display::*, cell_display::*, session_display::*, stats_display::*};

mod board_display;
mod cell_display;
mod session_display;
mod stats_display;

mod color {
    use ratatui::style::Color;
    use stackfall_engine::ShapeColor;

    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const PURPLE: Color = Color::Rgb(128, 0, 128);
    pub const GREEN: Color = Color::Rgb(0, 255, 0);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const ORANGE: Color = Color::Rgb(255, 165, 0);
    pub const BLUE: Color = Color::Rgb(0, 0, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const DARK_GRAY: Color = Color::Rgb(169, 169, 169);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    pub const fn shape(color: ShapeColor) -> Color {
        match color {
            ShapeColor::Cyan => CYAN,
            ShapeColor::Yellow => YELLOW,
            ShapeColor::Purple => PURPLE,
            ShapeColor::Green => GREEN,
            ShapeColor::Red => RED,
            ShapeColor::Orange => ORANGE,
            ShapeColor::Blue => BLUE,
        }
    }
}

pub mod style {
    use ratatui::style::{Color, Style};
    use stackfall_engine::ShapeColor;

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    const fn bg_only(color: Color) -> Style {
        Style::new().fg(color).bg(color)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const EMPTY_DOT: Style = fg_bg(color::GRAY, color::BLACK);
    pub const LOCKED: Style = bg_only(color::DARK_GRAY);

    pub const fn piece(color: ShapeColor) -> Style {
        bg_only(color::shape(color))
    }
}

/// Columns and rows taken up by a surrounding block's borders and padding.
fn block_margins(block: Option<&BlockWidget>) -> (u16, u16) {
    let Some(block) = block else {
        return (0, 0);
    };
    let outer = Rect::new(0, 0, u16::MAX / 2, u16::MAX / 2);
    let inner = block.inner(outer);
    (outer.width - inner.width, outer.height - inner.height)
}

/// Converts a cell count to terminal units, saturating on overflow.
fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
