use std::{fmt, str::FromStr};

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest height or width a shape matrix can have.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ShapeKind {
    /// I-piece.
    I,
    /// O-piece.
    O,
    /// T-piece.
    T,
    /// S-piece.
    S,
    /// Z-piece.
    Z,
    /// L-piece.
    L,
    /// J-piece.
    J,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        match rng.random_range(0..ShapeKind::LEN) {
            0 => ShapeKind::I,
            1 => ShapeKind::O,
            2 => ShapeKind::T,
            3 => ShapeKind::S,
            4 => ShapeKind::Z,
            5 => ShapeKind::L,
            _ => ShapeKind::J,
        }
    }
}

impl ShapeKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [ShapeKind; Self::LEN] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::L,
        ShapeKind::J,
    ];

    /// Returns the orientation a freshly spawned piece of this kind starts with.
    #[must_use]
    pub const fn spawn_shape(self) -> ShapeMatrix {
        match self {
            ShapeKind::I => ShapeMatrix::I,
            ShapeKind::O => ShapeMatrix::O,
            ShapeKind::T => ShapeMatrix::T,
            ShapeKind::S => ShapeMatrix::S,
            ShapeKind::Z => ShapeMatrix::Z,
            ShapeKind::L => ShapeMatrix::L,
            ShapeKind::J => ShapeMatrix::J,
        }
    }

    /// Returns the display color of this kind.
    #[must_use]
    pub const fn color(self) -> ShapeColor {
        match self {
            ShapeKind::I => ShapeColor::Cyan,
            ShapeKind::O => ShapeColor::Yellow,
            ShapeKind::T => ShapeColor::Purple,
            ShapeKind::S => ShapeColor::Green,
            ShapeKind::Z => ShapeColor::Red,
            ShapeKind::L => ShapeColor::Orange,
            ShapeKind::J => ShapeColor::Blue,
        }
    }
}

/// Display attribute of a piece kind.
///
/// Renderers map these to whatever palette they draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ShapeColor {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Orange,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeMatrixError {
    #[display("shape has no filled cells")]
    Empty,
    #[display("shape row {row} has a different width than the first row")]
    Ragged { row: usize },
    #[display("shape is {height}x{width}, larger than 4x4")]
    TooLarge { height: usize, width: usize },
    #[display("invalid shape cell {cell:?}, expected '#' or '.'")]
    InvalidCell { cell: char },
}

/// Rectangular boolean matrix describing one orientation of a piece.
///
/// The matrix is a plain value: assigning it to a piece copies it, so later
/// changes to the source can never leak into the piece.
///
/// Text form lists rows top to bottom separated by `/`, with `#` for a filled
/// cell and `.` for an empty one (an L-piece is `#./#./##`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    height: u8,
    width: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    const I: Self = Self::from_art("####");
    const O: Self = Self::from_art("##/##");
    const T: Self = Self::from_art(".#./###");
    const S: Self = Self::from_art(".##/##.");
    const Z: Self = Self::from_art("##./.##");
    const L: Self = Self::from_art("#./#./##");
    const J: Self = Self::from_art(".#/.#/##");

    #[expect(clippy::cast_possible_truncation)]
    const fn from_art(art: &str) -> Self {
        let bytes = art.as_bytes();
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut row = 0;
        let mut col = 0;
        let mut width = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'/' => {
                    row += 1;
                    col = 0;
                }
                b'#' => {
                    cells[row][col] = true;
                    col += 1;
                }
                _ => col += 1,
            }
            if col > width {
                width = col;
            }
            i += 1;
        }
        Self {
            height: (row + 1) as u8,
            width: width as u8,
            cells,
        }
    }

    /// Builds a matrix from rows of cells, top row first.
    #[expect(clippy::cast_possible_truncation)]
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, ShapeMatrixError>
    where
        R: AsRef<[bool]>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height > MAX_SHAPE_SIZE || width > MAX_SHAPE_SIZE {
            return Err(ShapeMatrixError::TooLarge { height, width });
        }

        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ShapeMatrixError::Ragged { row: y });
            }
            cells[y][..width].copy_from_slice(row);
        }
        if !cells.iter().flatten().any(|&cell| cell) {
            return Err(ShapeMatrixError::Empty);
        }

        Ok(Self {
            height: height as u8,
            width: width as u8,
            cells,
        })
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Returns whether the cell at (`row`, `col`) is filled. Out-of-range cells are empty.
    #[must_use]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height() && col < self.width() && self.cells[row][col]
    }

    /// Iterates over the rows of the matrix, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells[..self.height()]
            .iter()
            .map(|row| &row[..self.width()])
    }

    /// Iterates over the `(row, col)` offsets of every filled cell.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, &filled)| filled.then_some((row, col)))
        })
    }

    /// Returns this matrix rotated 90° clockwise.
    ///
    /// An `R×C` matrix becomes `C×R` with `rotated[j][R-1-i] = original[i][j]`.
    #[must_use]
    pub const fn rotated(&self) -> Self {
        let rows = self.height as usize;
        let cols = self.width as usize;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut i = 0;
        while i < rows {
            let mut j = 0;
            while j < cols {
                cells[j][rows - 1 - i] = self.cells[i][j];
                j += 1;
            }
            i += 1;
        }
        Self {
            height: self.width,
            width: self.height,
            cells,
        }
    }

    /// Returns this matrix rotated clockwise `times` times.
    #[must_use]
    pub fn rotated_times(&self, times: usize) -> Self {
        (0..times % 4).fold(*self, |shape, _| shape.rotated())
    }
}

impl fmt::Debug for ShapeMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeMatrix({self})")
    }
}

impl fmt::Display for ShapeMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for &filled in row {
                f.write_str(if filled { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

impl FromStr for ShapeMatrix {
    type Err = ShapeMatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ascii(s)
    }
}

impl ShapeMatrix {
    /// Parses a matrix from ASCII art, `#` filled and `.` empty.
    ///
    /// Rows are separated by `/` or newlines. Blank rows are skipped.
    pub fn from_ascii(art: &str) -> Result<Self, ShapeMatrixError> {
        let rows = art
            .split(['/', '\n'])
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.chars()
                    .map(|cell| match cell {
                        '#' => Ok(true),
                        '.' => Ok(false),
                        cell => Err(ShapeMatrixError::InvalidCell { cell }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(&rows)
    }
}

impl Serialize for ShapeMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid shape {s:?} ({e})")))
    }
}
