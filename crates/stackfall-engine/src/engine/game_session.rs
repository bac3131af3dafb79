use std::time::Duration;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{
    PieceCollisionError,
    core::{board::Board, piece::Piece, shape::ShapeKind},
};

use super::{GameStats, Intent, PieceGenerator, PieceSeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Running,
    Paused,
    GameOver,
}

/// Outcome of moving the falling piece down by one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum DropOutcome {
    /// The piece moved down.
    Moved,
    /// The piece could not move, so it was locked and a new piece spawned.
    Locked { cleared_lines: usize },
}

/// Why [`GameSession::set_falling_piece`] refused a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PieceUpdateError {
    #[display("session is not running")]
    NotRunning,
    #[display("{_0}")]
    Collision(PieceCollisionError),
}

/// Owned copy of the state the placement search needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    board: Board,
    piece: Piece,
}

impl SessionSnapshot {
    #[must_use]
    pub fn new(board: Board, piece: Piece) -> Self {
        Self { board, piece }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }
}

/// A single game: board, falling piece, statistics and session state.
///
/// All mutation goes through this type. The falling piece is kept at a valid
/// placement at all times, except after game over where it is the piece that
/// failed to spawn.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    falling_piece: Piece,
    generator: PieceGenerator,
    stats: GameStats,
    session_state: SessionState,
    elapsed_secs: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Kind of the first piece of every session.
    pub const FIRST_PIECE: ShapeKind = ShapeKind::T;

    /// Creates a session on a standard empty board with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for the piece sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_board(Board::standard(), seed)
    }

    /// Starts a session on a prepared board.
    ///
    /// The session is over right away if the first piece collides at spawn.
    #[must_use]
    pub fn with_board(board: Board, seed: PieceSeed) -> Self {
        let falling_piece = Piece::new(Self::FIRST_PIECE);
        let mut this = Self {
            board,
            falling_piece,
            generator: PieceGenerator::with_seed(seed),
            stats: GameStats::new(),
            session_state: SessionState::Running,
            elapsed_secs: 0,
        };
        if !this.is_valid(&this.falling_piece) {
            this.session_state = SessionState::GameOver;
        }
        this
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> &Piece {
        &self.falling_piece
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// Returns the time spent running, excluding pauses.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(self.elapsed_secs)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.board.clone(), self.falling_piece.clone())
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            SessionState::GameOver => SessionState::GameOver, // No change from game over
        };
    }

    /// Advances the elapsed-time clock by one second while running.
    pub fn tick_clock(&mut self) {
        if self.session_state.is_running() {
            self.elapsed_secs += 1;
        }
    }

    /// Applies gravity once. Does nothing unless running.
    pub fn gravity_tick(&mut self) -> Option<DropOutcome> {
        self.session_state
            .is_running()
            .then(|| self.soft_drop_or_lock())
    }

    /// Applies a player intent. Does nothing unless running.
    pub fn handle_intent(&mut self, intent: Intent) {
        if !self.session_state.is_running() {
            return;
        }
        // Rejected moves leave the piece where it is.
        let _ = match intent {
            Intent::MoveLeft => self.try_move_left(),
            Intent::MoveRight => self.try_move_right(),
            Intent::Rotate => self.try_rotate(),
            Intent::SoftDrop => {
                self.soft_drop_or_lock();
                Ok(())
            }
        };
    }

    fn is_valid(&self, piece: &Piece) -> bool {
        self.board
            .is_valid_placement(piece.shape(), piece.y(), piece.x())
    }

    /// Replaces the falling piece if the session is running and the piece fits.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceUpdateError> {
        if !self.session_state.is_running() {
            return Err(PieceUpdateError::NotRunning);
        }
        self.replace_piece(piece)
            .map_err(PieceUpdateError::Collision)
    }

    fn replace_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if !self.is_valid(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    // The moves below are only reached through `handle_intent` and
    // `gravity_tick`, which check the session state first.

    fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        let mut piece = self.falling_piece.clone();
        piece.move_left();
        self.replace_piece(piece)
    }

    fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        let mut piece = self.falling_piece.clone();
        piece.move_right();
        self.replace_piece(piece)
    }

    fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        let mut piece = self.falling_piece.clone();
        piece.move_down();
        self.replace_piece(piece)
    }

    /// Rotates clockwise in place, without wall kicks.
    ///
    /// A rotation that does not fit is undone by rotating three more times.
    fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        self.falling_piece.rotate();
        if self.is_valid(&self.falling_piece) {
            return Ok(());
        }
        for _ in 0..3 {
            self.falling_piece.rotate();
        }
        Err(PieceCollisionError)
    }

    /// Moves the piece down by one row, or locks it if it cannot move.
    fn soft_drop_or_lock(&mut self) -> DropOutcome {
        if self.try_soft_drop().is_ok() {
            return DropOutcome::Moved;
        }
        let cleared_lines = self.lock_and_spawn();
        DropOutcome::Locked { cleared_lines }
    }

    fn lock_and_spawn(&mut self) -> usize {
        self.board.lock(&self.falling_piece);
        let cleared_lines = self.board.clear_full_lines();
        self.stats.record_lock(cleared_lines);

        self.falling_piece = Piece::new(self.generator.next_kind());
        if !self.is_valid(&self.falling_piece) {
            self.session_state = SessionState::GameOver;
        }
        cleared_lines
    }
}

#[cfg(test)]
mod tests {
    use crate::PiecePosition;

    use super::*;

    fn seed() -> PieceSeed {
        "00000000000000000000000000c0ffee".parse().unwrap()
    }

    fn session_on(art: &str) -> GameSession {
        GameSession::with_board(art.parse().unwrap(), seed())
    }

    fn drop_until_locked(session: &mut GameSession) -> usize {
        loop {
            if let DropOutcome::Locked { cleared_lines } = session.soft_drop_or_lock() {
                return cleared_lines;
            }
        }
    }

    #[test]
    fn test_new_session_starts_with_t_at_spawn() {
        let session = GameSession::with_seed(seed());
        assert!(session.session_state().is_running());
        assert_eq!(session.falling_piece().kind(), ShapeKind::T);
        assert_eq!(session.falling_piece().position(), PiecePosition::SPAWN);
        assert_eq!(session.stats(), &GameStats::new());
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_spawn_collision_on_first_piece() {
        let mut art = vec![".........."; 20];
        art[1] = "....#.....";
        let session = session_on(&art.join("\n"));
        assert!(session.session_state().is_game_over());
    }

    #[test]
    fn test_move_stops_at_wall() {
        let mut session = GameSession::with_seed(seed());
        for _ in 0..4 {
            session.try_move_left().unwrap();
        }
        assert_eq!(session.falling_piece().x(), 0);
        assert_eq!(session.try_move_left(), Err(PieceCollisionError));
        assert_eq!(session.falling_piece().x(), 0);

        for _ in 0..7 {
            session.try_move_right().unwrap();
        }
        assert_eq!(session.try_move_right(), Err(PieceCollisionError));
        assert_eq!(session.falling_piece().x(), 7);
    }

    #[test]
    fn test_rotate_reverts_when_blocked() {
        let mut session = GameSession::with_seed(seed());
        let mut piece = Piece::new(ShapeKind::I);
        piece.set_position(0, 17);
        session.set_falling_piece(piece.clone()).unwrap();

        // Vertical I would need rows 17..=20.
        assert_eq!(session.try_rotate(), Err(PieceCollisionError));
        assert_eq!(session.falling_piece(), &piece);

        piece.set_position(0, 16);
        session.set_falling_piece(piece).unwrap();
        session.try_rotate().unwrap();
        assert_eq!((session.falling_piece().height(), session.falling_piece().width()), (4, 1));
    }

    #[test]
    fn test_set_falling_piece_rejects_collision() {
        let mut art = vec![".........."; 20];
        art[10] = "#.........";
        let mut session = session_on(&art.join("\n"));
        let before = session.falling_piece().clone();

        let mut piece = Piece::new(ShapeKind::O);
        piece.set_position(0, 9);
        assert_eq!(
            session.set_falling_piece(piece),
            Err(PieceUpdateError::Collision(PieceCollisionError))
        );
        assert_eq!(session.falling_piece(), &before);

        let mut piece = Piece::new(ShapeKind::O);
        piece.set_position(-1, 0);
        assert_eq!(
            session.set_falling_piece(piece),
            Err(PieceUpdateError::Collision(PieceCollisionError))
        );
    }

    #[test]
    fn test_soft_drop_on_blocked_piece_locks_and_spawns() {
        let mut session = GameSession::with_seed(seed());
        let first_id = session.falling_piece().id();

        for _ in 0..18 {
            assert_eq!(session.soft_drop_or_lock(), DropOutcome::Moved);
        }
        assert_eq!(session.falling_piece().y(), 18);
        assert_eq!(
            session.soft_drop_or_lock(),
            DropOutcome::Locked { cleared_lines: 0 }
        );

        assert_eq!(session.board().grid().filled_count(), 4);
        assert_eq!(session.stats().locked_pieces(), 1);
        assert_ne!(session.falling_piece().id(), first_id);
        assert_eq!(session.falling_piece().position(), PiecePosition::SPAWN);
        assert!(session.session_state().is_running());
    }

    #[test]
    fn test_line_clear_scores_per_line() {
        let mut art = vec![".........."; 20];
        art[18] = "####....##";
        art[19] = "####....##";
        let mut session = session_on(&art.join("\n"));

        let mut piece = Piece::new(ShapeKind::O);
        piece.set_position(4, 0);
        session.set_falling_piece(piece).unwrap();
        assert_eq!(drop_until_locked(&mut session), 0);

        let mut piece = Piece::new(ShapeKind::O);
        piece.set_position(6, 0);
        session.set_falling_piece(piece).unwrap();
        assert_eq!(drop_until_locked(&mut session), 2);

        assert_eq!(session.stats().score(), 200);
        assert_eq!(session.stats().cleared_lines(), 2);
        assert_eq!(session.board().grid().filled_count(), 0);
    }

    #[test]
    fn test_game_over_when_spawn_is_blocked() {
        let mut art = vec![".........."; 20];
        art[2] = ".#########";
        let mut session = session_on(&art.join("\n"));

        assert_eq!(
            session.soft_drop_or_lock(),
            DropOutcome::Locked { cleared_lines: 0 }
        );
        assert!(session.session_state().is_game_over());

        session.toggle_pause();
        assert!(session.session_state().is_game_over());
        assert_eq!(session.gravity_tick(), None);
        session.tick_clock();
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_game_over_freezes_piece() {
        let mut art = vec![".........."; 20];
        art[1] = "....#.....";
        let mut session = session_on(&art.join("\n"));
        assert!(session.session_state().is_game_over());
        let before = session.falling_piece().clone();

        assert_eq!(session.gravity_tick(), None);
        for intent in Intent::ALL {
            session.handle_intent(intent);
        }
        let mut moved = before.clone();
        moved.set_position(0, 5);
        assert_eq!(
            session.set_falling_piece(moved),
            Err(PieceUpdateError::NotRunning)
        );

        assert_eq!(session.falling_piece(), &before);
        assert_eq!(session.board().grid().filled_count(), 1);
        assert_eq!(session.stats().locked_pieces(), 0);
    }

    #[test]
    fn test_pause_stops_gravity_clock_and_input() {
        let mut session = GameSession::with_seed(seed());
        session.tick_clock();
        session.toggle_pause();
        assert!(session.session_state().is_paused());

        let before = session.falling_piece().clone();
        assert_eq!(session.gravity_tick(), None);
        for intent in Intent::ALL {
            session.handle_intent(intent);
        }
        session.tick_clock();
        assert_eq!(session.falling_piece(), &before);
        assert_eq!(session.elapsed(), Duration::from_secs(1));

        session.toggle_pause();
        assert_eq!(session.gravity_tick(), Some(DropOutcome::Moved));
        session.tick_clock();
        assert_eq!(session.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_intents_move_the_piece() {
        let mut session = GameSession::with_seed(seed());
        session.handle_intent(Intent::MoveLeft);
        session.handle_intent(Intent::SoftDrop);
        session.handle_intent(Intent::Rotate);
        let piece = session.falling_piece();
        assert_eq!((piece.x(), piece.y()), (3, 1));
        assert_eq!(piece.shape(), &ShapeKind::T.spawn_shape().rotated());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = GameSession::with_seed(seed());
        let snapshot = session.snapshot();
        session.try_move_left().unwrap();
        assert_eq!(snapshot.piece().x(), 4);
        assert_eq!(snapshot.piece().id(), session.falling_piece().id());
        assert_eq!(snapshot.board(), session.board());
    }
}
