use serde::Serialize;
use stackfall_engine::{PieceId, SessionSnapshot};

use crate::{Placement, PlacementSearch};

/// A placement for one specific falling piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementProposal {
    piece_id: PieceId,
    placement: Placement,
}

impl PlacementProposal {
    /// Id of the piece the placement was computed for.
    #[must_use]
    pub fn piece_id(&self) -> PieceId {
        self.piece_id
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }
}

/// Decides where each new piece should go, once per piece.
///
/// The first snapshot showing a given piece triggers a search. Later
/// snapshots of the same piece are ignored, even if the search found nothing
/// or the player has moved the piece since.
#[derive(Debug, Default)]
pub struct Assistant {
    last_piece_id: Option<PieceId>,
}

impl Assistant {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a proposal for the snapshot's piece, unless that piece was already seen.
    pub fn propose(&mut self, snapshot: &SessionSnapshot) -> Option<PlacementProposal> {
        let piece_id = snapshot.piece().id();
        if self.last_piece_id == Some(piece_id) {
            return None;
        }
        self.last_piece_id = Some(piece_id);

        let placement = PlacementSearch::new(snapshot.board(), snapshot.piece()).best_placement()?;
        Some(PlacementProposal {
            piece_id,
            placement,
        })
    }
}
