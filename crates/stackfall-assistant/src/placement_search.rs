use std::{cmp::Reverse, iter};

use arrayvec::ArrayVec;
use serde::Serialize;
use stackfall_engine::{Board, Piece, ShapeMatrix};

/// Unit move of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum Step {
    Left,
    Right,
    Down,
}

/// Where the search wants the falling piece to go.
///
/// `row` and `col` are the top-left corner of `shape` on the board. `shape`
/// is the piece's current shape rotated `rotations` times clockwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    row: usize,
    col: usize,
    rotations: u8,
    shape: ShapeMatrix,
    /// Unit steps from the piece's position: sideways first, then down.
    movement: Vec<Step>,
}

impl Placement {
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    #[must_use]
    pub fn rotations(&self) -> u8 {
        self.rotations
    }

    #[must_use]
    pub fn shape(&self) -> &ShapeMatrix {
        &self.shape
    }
}

/// Greedy single-piece placement search.
///
/// For each of the four rotations and each column the shape fits in, the
/// piece is dropped to the lowest row where it fits and then slid left as far
/// as it stays valid on that row. The destination whose bottom edge is lowest
/// wins; ties go to the one needing fewer sideways moves, then to the first
/// found (rotation order, then column order).
///
/// Only the board and the piece are looked at. There is no lookahead and no
/// scoring of holes or heights.
#[derive(Debug, Clone, Copy)]
pub struct PlacementSearch<'a> {
    board: &'a Board,
    piece: &'a Piece,
}

impl<'a> PlacementSearch<'a> {
    #[must_use]
    pub fn new(board: &'a Board, piece: &'a Piece) -> Self {
        Self { board, piece }
    }

    /// Returns the best placement, or `None` if the piece fits nowhere.
    #[must_use]
    pub fn best_placement(&self) -> Option<Placement> {
        let mut best: Option<(Landing, ShapeMatrix, u8)> = None;

        for (rotations, shape) in iter::zip(0.., self.candidate_shapes()) {
            for landing in self.landings(&shape) {
                if best
                    .as_ref()
                    .is_none_or(|(current, ..)| landing.key() > current.key())
                {
                    best = Some((landing, shape, rotations));
                }
            }
        }

        let (landing, shape, rotations) = best?;
        Some(Placement {
            row: landing.row,
            col: landing.col,
            rotations,
            shape,
            movement: self.movement(landing.row, landing.col),
        })
    }

    /// The current shape rotated 0 to 3 times, each derived from the current shape.
    fn candidate_shapes(&self) -> ArrayVec<ShapeMatrix, 4> {
        (0..4)
            .map(|times| self.piece.shape().rotated_times(times))
            .collect()
    }

    /// One landing per column the shape fits in, left to right.
    fn landings<'s>(&'s self, shape: &'s ShapeMatrix) -> impl Iterator<Item = Landing> + 's {
        let columns = match self.board.cols().checked_sub(shape.width()) {
            Some(max_col) => 0..max_col + 1,
            None => 0..0,
        };
        columns.filter_map(move |col| {
            let row = self.lowest_row(shape, col)?;
            let col = self.slide_left(shape, row, col);
            Some(Landing {
                row,
                col,
                bottom: row + shape.height() - 1,
                distance: horizontal_distance(self.piece.x(), col),
            })
        })
    }

    /// Last row in which the shape fits at `col`, scanning every row offset.
    fn lowest_row(&self, shape: &ShapeMatrix, col: usize) -> Option<usize> {
        let max_row = self.board.rows().checked_sub(shape.height())?;
        (0..=max_row).rev().find(|&row| self.fits(shape, row, col))
    }

    /// Moves left from `col` one column at a time while the shape still fits on `row`.
    fn slide_left(&self, shape: &ShapeMatrix, row: usize, col: usize) -> usize {
        iter::successors(Some(col), |&col| {
            col.checked_sub(1)
                .filter(|&left| self.fits(shape, row, left))
        })
        .last()
        .unwrap_or(col)
    }

    fn fits(&self, shape: &ShapeMatrix, row: usize, col: usize) -> bool {
        self.board
            .is_valid_placement(shape, to_offset(row), to_offset(col))
    }

    fn movement(&self, row: usize, col: usize) -> Vec<Step> {
        let (x, y) = (self.piece.x(), self.piece.y());
        let sideways = if to_offset(col) < x {
            Step::Left
        } else {
            Step::Right
        };
        let across = horizontal_distance(x, col);
        let down = usize::try_from(i64::from(to_offset(row)) - i64::from(y)).unwrap_or(0);
        iter::repeat_n(sideways, across)
            .chain(iter::repeat_n(Step::Down, down))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Landing {
    row: usize,
    col: usize,
    /// Board row of the shape's last line.
    bottom: usize,
    distance: usize,
}

impl Landing {
    /// Greater is better: bottom edge lower on the board, then fewer sideways moves.
    fn key(self) -> (usize, Reverse<usize>) {
        (self.bottom, Reverse(self.distance))
    }
}

/// Converts a board index to a signed offset. Indices past `i32::MAX` saturate,
/// which no board can hold, so they fail placement checks.
pub(crate) fn to_offset(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

fn horizontal_distance(from: i32, to: usize) -> usize {
    let distance = from.abs_diff(to_offset(to));
    usize::try_from(distance).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;
    use stackfall_engine::ShapeKind;

    use super::*;

    fn board(art: &str) -> Board {
        art.parse().unwrap()
    }

    fn horizontal_moves(placement: &Placement) -> usize {
        placement
            .movement
            .iter()
            .filter(|step| matches!(step, Step::Left | Step::Right))
            .count()
    }

    fn standard_board_with(bottom: &[&str]) -> Board {
        let mut rows = vec![".........."; 20 - bottom.len()];
        rows.extend_from_slice(bottom);
        board(&rows.join("\n"))
    }

    #[test]
    fn test_i_piece_on_empty_board() {
        let board = Board::standard();
        let piece = Piece::new(ShapeKind::I);
        let placement = PlacementSearch::new(&board, &piece)
            .best_placement()
            .unwrap();

        assert_eq!(placement.row(), 19);
        assert_eq!(placement.col(), 0);
        assert_eq!(placement.rotations(), 0);
        assert_eq!(placement.shape(), piece.shape());
        assert_eq!(horizontal_moves(&placement), 4);
        assert_eq!(placement.movement.len(), 4 + 19);
        assert!(placement.movement[..4].iter().all(|&s| s == Step::Left));
        assert!(placement.movement[4..].iter().all(|&s| s == Step::Down));
    }

    #[test]
    fn test_rotation_reaches_deeper_well() {
        let board = standard_board_with(&[
            "#########.",
            "#########.",
            "#########.",
            "#########.",
        ]);
        let piece = Piece::new(ShapeKind::I);
        let placement = PlacementSearch::new(&board, &piece)
            .best_placement()
            .unwrap();

        assert_eq!((placement.row(), placement.col()), (16, 9));
        assert_eq!(placement.rotations(), 1);
        assert_eq!(placement.shape(), &piece.shape().rotated());
        assert_eq!(horizontal_moves(&placement), 5);
        assert_eq!(placement.movement[0], Step::Right);
    }

    #[test]
    fn test_tie_prefers_fewer_horizontal_moves() {
        // Row 18 is reachable both at the far left and right of the bump.
        let board = standard_board_with(&[".....#...."]);
        let piece = Piece::new(ShapeKind::O);
        let placement = PlacementSearch::new(&board, &piece)
            .best_placement()
            .unwrap();

        assert_eq!((placement.row(), placement.col()), (18, 6));
        assert_eq!(placement.rotations(), 0);
        assert_eq!(horizontal_moves(&placement), 2);
    }

    #[test]
    fn test_full_tie_keeps_first_rotation() {
        let board = Board::standard();
        let piece = Piece::new(ShapeKind::O);
        let placement = PlacementSearch::new(&board, &piece)
            .best_placement()
            .unwrap();
        assert_eq!((placement.row(), placement.col()), (18, 0));
        assert_eq!(placement.rotations(), 0);
    }

    #[test]
    fn test_tall_and_flat_rotations_compare_by_bottom_edge() {
        let board = Board::standard();
        for kind in [ShapeKind::L, ShapeKind::J] {
            let piece = Piece::new(kind);
            let placement = PlacementSearch::new(&board, &piece)
                .best_placement()
                .unwrap();
            // Every rotation reaches row 19 with four moves left, so the upright one stays.
            assert_eq!(placement.rotations(), 0, "{kind:?}");
            assert_eq!((placement.row(), placement.col()), (17, 0), "{kind:?}");
        }
    }

    #[test]
    fn test_lands_below_overhang() {
        let board = board(
            r"
            ..........
            ..........
            ###.......
            ..........
            ",
        );
        let mut piece = Piece::new(ShapeKind::I);
        piece.set_position(0, 0);
        let placement = PlacementSearch::new(&board, &piece)
            .best_placement()
            .unwrap();
        // Row 1 is the first fit from the top at column 0, row 3 is the last.
        assert_eq!((placement.row(), placement.col()), (3, 0));
        assert_eq!(placement.rotations(), 0);
        assert_eq!(horizontal_moves(&placement), 0);
    }

    #[test]
    fn test_slides_left_on_landing_row() {
        let board = board(
            r"
            ......
            ......
            ##....
            ",
        );
        let mut piece = Piece::new(ShapeKind::O);
        piece.set_position(4, 0);
        let placement = PlacementSearch::new(&board, &piece)
            .best_placement()
            .unwrap();
        // Columns 2 to 4 all land on row 1 and slide to column 2.
        assert_eq!((placement.row(), placement.col()), (1, 2));
    }

    #[test]
    fn test_no_placement_when_piece_never_fits() {
        let board = Board::new(3, 3).unwrap();
        let piece = Piece::new(ShapeKind::I);
        assert_eq!(PlacementSearch::new(&board, &piece).best_placement(), None);

        let full = self::board("###\n###");
        let piece = Piece::new(ShapeKind::O);
        assert_eq!(PlacementSearch::new(&full, &piece).best_placement(), None);
    }

    #[test]
    fn test_never_proposes_invalid_placement() {
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let rows: Vec<String> = (0..20)
                .map(|row| {
                    (0..10)
                        .map(|_| if row >= 8 && rng.random_bool(0.5) { '#' } else { '.' })
                        .collect()
                })
                .collect();
            let board = board(&rows.join("\n"));
            let mut piece = Piece::new(rng.random());
            for _ in 0..rng.random_range(0..4) {
                piece.rotate();
            }

            let Some(placement) = PlacementSearch::new(&board, &piece).best_placement() else {
                continue;
            };
            assert!(board.is_valid_placement(
                placement.shape(),
                to_offset(placement.row()),
                to_offset(placement.col()),
            ));
            assert_eq!(
                placement.shape(),
                &piece
                    .shape()
                    .rotated_times(usize::from(placement.rotations()))
            );
        }
    }
}
