use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use super::shape::{ShapeColor, ShapeKind, ShapeMatrix};

static NEXT_PIECE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a spawned piece.
///
/// Every call to [`Piece::new`] issues a fresh id, unique within the process.
/// Moving or rotating a piece keeps its id, so the id tells apart "the same
/// piece, moved" from "a new piece of the same kind".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(u64);

impl PieceId {
    fn next() -> Self {
        Self(NEXT_PIECE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Board coordinate of a piece's top-left matrix corner.
///
/// Signed so that positions just outside the board can be represented and
/// then rejected by placement validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    /// Where new pieces appear: column 4 of the top row.
    pub const SPAWN: Self = Self::new(4, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }
}

/// A tetromino with its current orientation and position.
///
/// Mutation methods do not consult the board. Callers check the result with
/// [`Board::is_valid_placement`](crate::Board::is_valid_placement) and undo or
/// discard invalid moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    kind: ShapeKind,
    shape: ShapeMatrix,
    position: PiecePosition,
}

impl Piece {
    /// Spawns a new piece of the given kind at [`PiecePosition::SPAWN`].
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: PieceId::next(),
            kind,
            shape: kind.spawn_shape(),
            position: PiecePosition::SPAWN,
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> ShapeColor {
        self.kind.color()
    }

    #[must_use]
    pub fn shape(&self) -> &ShapeMatrix {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    /// Column of the top-left corner.
    #[must_use]
    pub fn x(&self) -> i32 {
        self.position.x
    }

    /// Row of the top-left corner.
    #[must_use]
    pub fn y(&self) -> i32 {
        self.position.y
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.shape.height()
    }

    /// Rotates the shape 90° clockwise in place, keeping the top-left corner.
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated();
    }

    /// Replaces the shape, e.g. with an orientation computed elsewhere.
    pub fn set_shape(&mut self, shape: ShapeMatrix) {
        self.shape = shape;
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.position = PiecePosition::new(x, y);
    }

    pub fn move_left(&mut self) {
        self.position.x -= 1;
    }

    pub fn move_right(&mut self) {
        self.position.x += 1;
    }

    pub fn move_down(&mut self) {
        self.position.y += 1;
    }

    /// Board cells covered by this piece as `(row, col)`, possibly out of bounds.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.filled_cells().map(move |(dy, dx)| {
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let (dy, dx) = (dy as i32, dx as i32);
            (self.position.y + dy, self.position.x + dx)
        })
    }
}
