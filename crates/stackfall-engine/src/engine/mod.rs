//! Game rules on top of the core data structures.
//!
//! - [`GameSession`] - Board, falling piece, session state and clocks
//! - [`GameStats`] - Score, cleared lines and locked pieces
//! - [`PieceGenerator`] - Seedable uniform piece generation
//! - [`Intent`] / [`IntentState`] - Player input independent of any key mapping
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`]; the first piece is always a `T`
//! 2. Input intents move and rotate the falling piece while the session runs
//! 3. Gravity moves the piece down, locking it once it cannot move further
//! 4. Full lines are cleared and a new piece spawns
//! 5. Repeat until a new piece collides at spawn
//!
//! # Example
//!
//! ```
//! use stackfall_engine::{GameSession, Intent};
//!
//! let mut session = GameSession::new();
//! session.handle_intent(Intent::MoveLeft);
//! session.handle_intent(Intent::Rotate);
//! session.gravity_tick();
//!
//! assert!(session.session_state().is_running());
//! ```

pub use self::{game_session::*, game_stats::*, input::*, piece_generator::*};

mod game_session;
mod game_stats;
mod input;
mod piece_generator;
