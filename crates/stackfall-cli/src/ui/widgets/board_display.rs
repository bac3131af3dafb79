use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block as BlockWidget, BlockExt, Widget},
};
use stackfall_engine::{Board, Piece};

use crate::ui::widgets::{CellDisplay, block_margins, to_u16};

/// The board's locked cells with the falling piece drawn on top.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    falling_piece: Option<&'a Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            falling_piece: None,
            block: None,
        }
    }

    pub fn falling_piece(self, piece: &'a Piece) -> Self {
        Self {
            falling_piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        let (margin, _) = block_margins(self.block.as_ref());
        to_u16(self.board.cols()) * CellDisplay::WIDTH + margin
    }

    pub fn height(&self) -> u16 {
        let (_, margin) = block_margins(self.block.as_ref());
        to_u16(self.board.rows()) * CellDisplay::HEIGHT + margin
    }

    /// Resolves one cell, giving the falling piece priority over the board.
    fn cell_at(&self, row: usize, col: usize) -> CellDisplay {
        let is_piece_cell = |piece: &&Piece| {
            piece.occupied_cells().any(|(piece_row, piece_col)| {
                usize::try_from(piece_row) == Ok(row) && usize::try_from(piece_col) == Ok(col)
            })
        };
        if let Some(piece) = self.falling_piece.filter(is_piece_cell) {
            CellDisplay::Falling(piece.color())
        } else if self.board.grid().is_filled(row, col) {
            CellDisplay::Locked
        } else {
            CellDisplay::Empty
        }
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let inner = self.block.inner_if_some(area);

        // Center the grid horizontally if the area is wider than the board.
        let grid_width = to_u16(self.board.cols()) * CellDisplay::WIDTH;
        let left = inner.x + inner.width.saturating_sub(grid_width) / 2;

        for row in 0..self.board.rows() {
            let y = inner.y + to_u16(row) * CellDisplay::HEIGHT;
            if y >= inner.bottom() {
                break;
            }
            for col in 0..self.board.cols() {
                let x = left + to_u16(col) * CellDisplay::WIDTH;
                let cell =
                    Rect::new(x, y, CellDisplay::WIDTH, CellDisplay::HEIGHT).intersection(inner);
                if !cell.is_empty() {
                    self.cell_at(row, col).render(cell, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use stackfall_engine::ShapeKind;

    use super::*;
    use crate::ui::widgets::style;

    #[test]
    fn test_cells_show_piece_over_board() {
        let board: Board = "....\n#...\n####".parse().unwrap();
        let mut piece = Piece::new(ShapeKind::O);
        piece.set_position(2, 0);
        let display = BoardDisplay::new(&board).falling_piece(&piece);

        assert_eq!(display.cell_at(0, 2), CellDisplay::Falling(piece.color()));
        assert_eq!(display.cell_at(1, 3), CellDisplay::Falling(piece.color()));
        assert_eq!(display.cell_at(1, 0), CellDisplay::Locked);
        assert_eq!(display.cell_at(0, 0), CellDisplay::Empty);
        assert_eq!((display.width(), display.height()), (8, 3));
    }

    #[test]
    fn test_render_fills_board_area() {
        let board = Board::standard();
        let display = BoardDisplay::new(&board).block(BlockWidget::bordered());
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        assert_eq!((area.width, area.height), (22, 22));
        assert_eq!(buf[(0, 0)].symbol(), "┌");
        assert_eq!(buf[(1, 1)].style().bg, style::EMPTY_DOT.bg);
        assert_eq!(buf[(2, 1)].symbol(), ".");
        assert_eq!(buf[(20, 20)].style().bg, style::EMPTY_DOT.bg);
    }

    #[test]
    fn test_locked_cells_are_gray() {
        let board: Board = "..\n#.".parse().unwrap();
        let display = BoardDisplay::new(&board);
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        assert_eq!(buf[(0, 1)].style().bg, style::LOCKED.bg);
        assert_eq!(buf[(1, 1)].style().bg, style::LOCKED.bg);
        assert_eq!(buf[(2, 1)].style().bg, style::EMPTY_DOT.bg);
    }
}
