//! Pairs-matching memory game.

pub mod clock;
pub mod engine;
pub mod recollection;
pub mod state;

pub use clock::{Clock, GlibClock, ManualClock};
pub use engine::{GameEvent, Listener, MatchGame};
pub use recollection::Recollection;
pub use state::{Card, FaceId, FlipOutcome, FlipState, GameConfig};
