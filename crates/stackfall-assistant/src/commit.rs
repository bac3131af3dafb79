use serde::Serialize;
use stackfall_engine::{Board, GameSession, Piece, PieceId, PieceUpdateError};

use crate::{PlacementProposal, placement_search::to_offset};

/// State captured when a proposal fails validation at commit time.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementDiagnostic {
    board: Board,
    piece: Piece,
    proposal: PlacementProposal,
}

impl PlacementDiagnostic {
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The falling piece at commit time, left unchanged.
    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn proposal(&self) -> &PlacementProposal {
        &self.proposal
    }
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum CommitError {
    #[display("session is not running")]
    NotRunning,
    #[display("proposal for piece {proposed} is stale, falling piece is {current}")]
    StalePiece { proposed: PieceId, current: PieceId },
    #[display(
        "proposed placement for piece {} does not fit the board",
        diagnostic.proposal.piece_id()
    )]
    InvalidPlacement { diagnostic: Box<PlacementDiagnostic> },
}

/// Moves the falling piece to a proposed placement after re-validating it.
///
/// The proposal was computed from a snapshot that may be out of date. It is
/// applied only if the session is running, the falling piece is still the one
/// the proposal was made for, and the target fits the current board. On any
/// failure the piece stays where it is.
pub fn commit_proposal(
    session: &mut GameSession,
    proposal: &PlacementProposal,
) -> Result<(), CommitError> {
    if !session.session_state().is_running() {
        return Err(CommitError::NotRunning);
    }
    let current = session.falling_piece().id();
    if current != proposal.piece_id() {
        return Err(CommitError::StalePiece {
            proposed: proposal.piece_id(),
            current,
        });
    }

    let placement = proposal.placement();
    let mut piece = session.falling_piece().clone();
    piece.set_shape(*placement.shape());
    piece.set_position(to_offset(placement.col()), to_offset(placement.row()));

    session.set_falling_piece(piece).map_err(|err| match err {
        PieceUpdateError::NotRunning => CommitError::NotRunning,
        PieceUpdateError::Collision(_) => CommitError::InvalidPlacement {
            diagnostic: Box::new(PlacementDiagnostic {
                board: session.board().clone(),
                piece: session.falling_piece().clone(),
                proposal: proposal.clone(),
            }),
        },
    })
}
