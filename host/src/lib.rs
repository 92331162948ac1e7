//! # Netpong Host
//!
//! The authoritative side of a two-player pong match. The Host owns the only
//! mutable copy of the game state, accepts exactly one Remote over TCP and
//! publishes a snapshot after every tick.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Physics runs here and nowhere else. Each tick reads the latest input of
//! both players, advances the state by the measured elapsed time and bumps
//! the snapshot sequence by one.
//!
//! ### Input Ingestion
//! A dedicated task reads fixed-width input records from the Remote and
//! overwrites a single "latest value" slot. Stale inputs are never queued,
//! so the tick loop always sees the newest intent.
//!
//! ### Snapshot Publishing
//! A second task sends the newest published state to the Remote. If the link
//! is slower than the tick rate, intermediate states are skipped rather than
//! buffered.
//!
//! ## Module Organization
//!
//! - [`game`]: the match itself, stepping [`shared::GameState`] tick by tick
//! - [`scheduler`]: fixed-rate ticks with a capped delta time
//! - [`network`]: the role state machine tying link, tasks and ticks together
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use host::network::{Host, HostConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut host = Host::new(HostConfig::default())?;
//!     let addr = host.bind().await?;
//!     println!("waiting for a remote on {}", addr);
//!
//!     let reason = host.run().await?;
//!     println!("{}", reason);
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
pub mod scheduler;

pub use game::HostGame;
pub use network::{Host, HostConfig, HostHandle, HostPhase};
pub use scheduler::TickScheduler;
