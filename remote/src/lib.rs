//! # Netpong Remote
//!
//! The thin controller side of a two-player pong match. The Remote connects
//! to a Host, forwards where its player wants the paddle and keeps the latest
//! snapshot the Host sent for whatever presentation layer sits on top.
//!
//! It never simulates. Its only value of its own is a provisional paddle
//! position, replaced by the Host's as soon as a snapshot arrives.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! The latest paddle intent with change detection, and the task that sends
//! it to the Host whenever it changes.
//!
//! ### Network Module (`network`)
//! The role state machine: connect, ingest snapshots, forward input, and
//! decide how the match ended.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use remote::network::{Remote, RemoteConfig};
//! use shared::{Direction, LocalInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = Remote::new(RemoteConfig {
//!         server_addr: "127.0.0.1:7878".to_string(),
//!         ..RemoteConfig::default()
//!     })?;
//!     let handle = remote.handle();
//!     handle.submit(LocalInput::Direction(Direction::Up));
//!
//!     let reason = remote.run().await?;
//!     println!("{}", reason);
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;

pub use input::InputSlot;
pub use network::{Remote, RemoteConfig, RemoteHandle, RemotePhase};
