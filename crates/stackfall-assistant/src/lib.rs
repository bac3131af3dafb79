//! Autoplay assistant for the falling-block game.
//!
//! The assistant looks at the current board and falling piece, picks the
//! rotation and column where the piece lands lowest, and proposes moving the
//! piece there. It never touches the game state itself:
//!
//! 1. [`PlacementSearch`] - Single-ply greedy search over rotations and columns
//! 2. [`Assistant`] - Proposes at most one placement per piece
//! 3. [`commit_proposal`] - Re-validates a proposal against the live session and applies it
//! 4. [`AssistantHandle`] - Runs the assistant on a background thread, exchanging
//!    snapshots and proposals over channels
//!
//! # Usage
//!
//! ```
//! use stackfall_assistant::{Assistant, commit_proposal};
//! use stackfall_engine::GameSession;
//!
//! let mut session = GameSession::new();
//! let mut assistant = Assistant::new();
//!
//! if let Some(proposal) = assistant.propose(&session.snapshot()) {
//!     commit_proposal(&mut session, &proposal).unwrap();
//! }
//!
//! // Only one proposal per piece.
//! assert!(assistant.propose(&session.snapshot()).is_none());
//! ```

pub use self::{assistant::*, commit::*, placement_search::*, worker::*};

mod assistant;
mod commit;
mod placement_search;
mod worker;
