//! # Shared Netpong Core
//!
//! Everything both roles agree on: the data model, the physics step, the wire
//! records, the TCP link and the ingestion loops that move records between
//! the link and the "latest value" slots.
//!
//! Layering, leaves first: [`link`] moves bytes, [`protocol`] turns bytes into
//! records, [`ingest`] feeds records into slots, [`physics`] advances a
//! [`GameState`]. The `host` and `remote` crates wire these together.

pub mod console;
pub mod error;
pub mod ingest;
pub mod link;
pub mod physics;
pub mod protocol;
pub mod rules;
pub mod state;
pub mod vector;

pub use error::{ConnectError, DecodeError, LinkError, RulesError};
pub use ingest::{SnapshotSlot, MAX_CONSECUTIVE_DECODE_FAILURES};
pub use link::{Link, LinkListener, LinkReader, LinkWriter};
pub use physics::{step, PhysicsEvent, StepOutcome};
pub use protocol::{InputMessage, StateMessage, WireMessage};
pub use rules::{Rules, MAX_SCORE};
pub use state::{Direction, GameState, InputState, LocalInput, Side};
pub use vector::Vec2;

/// Why a role left the `Running` phase.
#[derive(Debug, Clone, PartialEq)]
pub enum FinishReason {
    MatchOver { winner: Side },
    LinkLost { reason: String },
    /// The local operator asked to stop.
    Shutdown,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::MatchOver { winner } => {
                write!(f, "match over, {} wins", console::side_name(*winner))
            }
            FinishReason::LinkLost { reason } => write!(f, "connection lost: {}", reason),
            FinishReason::Shutdown => write!(f, "shut down"),
        }
    }
}

impl From<LinkError> for FinishReason {
    fn from(err: LinkError) -> Self {
        FinishReason::LinkLost {
            reason: err.to_string(),
        }
    }
}
