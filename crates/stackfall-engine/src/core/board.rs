use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{piece::Piece, shape::ShapeMatrix};

/// Number of rows of the standard board.
pub const STANDARD_ROWS: usize = 20;
/// Number of columns of the standard board.
pub const STANDARD_COLS: usize = 10;

/// Single row of the board, one bit per column (bit N is column N).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitRow {
    bits: u64,
}

impl BitRow {
    const EMPTY: Self = Self { bits: 0 };
    const MAX_WIDTH: usize = u64::BITS as usize;

    #[inline]
    fn is_filled(self, col: usize) -> bool {
        self.bits & (1 << col) != 0
    }

    #[inline]
    fn fill(&mut self, col: usize) {
        self.bits |= 1 << col;
    }

    #[inline]
    fn is_full(self, cols: usize) -> bool {
        let mask = if cols == Self::MAX_WIDTH {
            u64::MAX
        } else {
            (1 << cols) - 1
        };
        self.bits & mask == mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid board size {rows}x{cols}: both must be non-zero and at most 64 columns")]
pub struct BoardSizeError {
    rows: usize,
    cols: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("board has no rows")]
    NoRows,
    #[display("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[display("invalid board cell {cell:?} at row {row}, expected '#' or '.'")]
    InvalidCell { row: usize, cell: char },
    #[display("{_0}")]
    Size(BoardSizeError),
}

/// Fixed-size occupancy grid of locked cells.
///
/// Rows are numbered top to bottom starting at 0, columns left to right.
/// Dimensions are fixed at construction. Cells only become filled through
/// [`Board::lock`] and only become empty again when
/// [`Board::clear_full_lines`] shifts rows down.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Board, Piece, ShapeKind};
///
/// let mut board = Board::standard();
/// let mut piece = Piece::new(ShapeKind::I);
/// piece.set_position(0, 19);
///
/// assert!(board.is_valid_placement(piece.shape(), 19, 0));
/// board.lock(&piece);
/// assert!(!board.is_valid_placement(piece.shape(), 19, 0));
/// assert_eq!(board.clear_full_lines(), 0);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: Vec<BitRow>,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Creates an empty board with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Result<Self, BoardSizeError> {
        if rows == 0 || cols == 0 || cols > BitRow::MAX_WIDTH {
            return Err(BoardSizeError { rows, cols });
        }
        Ok(Self {
            cols,
            rows: vec![BitRow::EMPTY; rows],
        })
    }

    /// Creates an empty 20×10 board.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            cols: STANDARD_COLS,
            rows: vec![BitRow::EMPTY; STANDARD_ROWS],
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns a read-only view of the occupancy grid.
    #[must_use]
    pub fn grid(&self) -> GridView<'_> {
        GridView { board: self }
    }

    /// Maps a signed board coordinate to an in-bounds cell index.
    fn cell_index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok().filter(|&row| row < self.rows())?;
        let col = usize::try_from(col).ok().filter(|&col| col < self.cols)?;
        Some((row, col))
    }

    /// Board cells covered by `shape` when its top-left corner sits at the given offset.
    ///
    /// `None` entries are cells that fall outside the board.
    fn covered_cells<'a>(
        &'a self,
        shape: &'a ShapeMatrix,
        row_offset: i32,
        col_offset: i32,
    ) -> impl Iterator<Item = Option<(usize, usize)>> + 'a {
        shape.filled_cells().map(move |(dy, dx)| {
            let row = row_offset.checked_add(i32::try_from(dy).ok()?)?;
            let col = col_offset.checked_add(i32::try_from(dx).ok()?)?;
            self.cell_index(row, col)
        })
    }

    /// Checks whether `shape` fits with its top-left corner at (`row_offset`, `col_offset`).
    ///
    /// Every filled cell of the shape must land inside the board on an empty
    /// cell. Stops at the first cell that is out of bounds or occupied.
    #[must_use]
    pub fn is_valid_placement(&self, shape: &ShapeMatrix, row_offset: i32, col_offset: i32) -> bool {
        self.covered_cells(shape, row_offset, col_offset)
            .all(|cell| cell.is_some_and(|(row, col)| !self.rows[row].is_filled(col)))
    }

    /// Locks a piece onto the board by filling its cells at its current position.
    ///
    /// The placement must already be valid; it is not re-checked here.
    /// Cells outside the board are dropped.
    pub fn lock(&mut self, piece: &Piece) {
        debug_assert!(
            self.is_valid_placement(piece.shape(), piece.y(), piece.x()),
            "locking piece at an invalid placement: {piece:?}"
        );
        let cells: Vec<_> = self
            .covered_cells(piece.shape(), piece.y(), piece.x())
            .flatten()
            .collect();
        for (row, col) in cells {
            self.rows[row].fill(col);
        }
    }

    /// Clears full rows and returns how many were cleared.
    ///
    /// Rows are scanned top to bottom. When a row is full, every row above it
    /// moves down by one and the top row becomes empty, so a run of `k` full
    /// rows collapses by exactly `k`.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut cleared = 0;
        for row in 0..self.rows.len() {
            if self.rows[row].is_full(self.cols) {
                self.rows[..=row].rotate_right(1);
                self.rows[0] = BitRow::EMPTY;
                cleared += 1;
            }
        }
        cleared
    }
}

/// Read-only view of a board's occupancy grid.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    board: &'a Board,
}

impl<'a> GridView<'a> {
    #[must_use]
    pub fn rows(self) -> usize {
        self.board.rows()
    }

    #[must_use]
    pub fn cols(self) -> usize {
        self.board.cols()
    }

    /// Returns whether the cell is filled. Out-of-range cells read as empty.
    #[must_use]
    pub fn is_filled(self, row: usize, col: usize) -> bool {
        col < self.board.cols
            && self
                .board
                .rows
                .get(row)
                .is_some_and(|bits| bits.is_filled(col))
    }

    /// Iterates over the cells of one row, left to right.
    pub fn row(self, row: usize) -> impl Iterator<Item = bool> + 'a {
        let bits = self.board.rows.get(row).copied().unwrap_or(BitRow::EMPTY);
        (0..self.board.cols).map(move |col| bits.is_filled(col))
    }

    /// Iterates over all rows, top row first.
    pub fn iter_rows(self) -> impl Iterator<Item = impl Iterator<Item = bool> + 'a> + 'a {
        (0..self.rows()).map(move |row| self.row(row))
    }

    #[cfg(test)]
    pub(crate) fn filled_count(self) -> usize {
        self.board
            .rows
            .iter()
            .map(|row| row.bits.count_ones() as usize)
            .sum()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.rows(), self.cols)?;
        fmt::Display::fmt(self, f)
    }
}

/// One line per row, `#` for filled cells and `.` for empty ones.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid().iter_rows() {
            for filled in row {
                f.write_str(if filled { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ascii(s)
    }
}

impl Board {
    /// Parses a board from ASCII art, `#` filled and `.` empty, one line per row.
    ///
    /// Blank lines and surrounding whitespace are ignored, so the art can be
    /// indented in a raw string literal.
    pub fn from_ascii(art: &str) -> Result<Self, BoardParseError> {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let expected = lines.first().ok_or(BoardParseError::NoRows)?.chars().count();
        let mut board = Self::new(lines.len(), expected).map_err(BoardParseError::Size)?;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(BoardParseError::RowWidth {
                    row,
                    found,
                    expected,
                });
            }
            for (col, cell) in line.chars().enumerate() {
                match cell {
                    '#' => board.rows[row].fill(col),
                    '.' => {}
                    cell => return Err(BoardParseError::InvalidCell { row, cell }),
                }
            }
        }
        Ok(board)
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: ["..........", "...##.....", ...] (one string per row)
        let rows: Vec<String> = self
            .grid()
            .iter_rows()
            .map(|row| row.map(|filled| if filled { '#' } else { '.' }).collect())
            .collect();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        rows.join("\n")
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid board ({e})")))
    }
}
