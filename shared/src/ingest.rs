//! Ingestion loops: one task per direction reading fixed-width records off the
//! link and overwriting a single "latest value" slot.
//!
//! Slots are `tokio::sync::watch` channels. They never queue, so a slow reader
//! only ever sees the newest value and stale intermediate ones are dropped.

use crate::error::LinkError;
use crate::link::LinkReader;
use crate::protocol::{InputMessage, StateMessage, WireMessage};
use crate::state::{GameState, InputState};
use log::{debug, warn};
use tokio::sync::watch;

/// Consecutive malformed records tolerated before the stream is assumed
/// desynchronized.
pub const MAX_CONSECUTIVE_DECODE_FAILURES: u32 = 3;

/// Reads records of type `M` until the link fails, handing each one to `sink`.
///
/// Returns the error that ended the loop. A single malformed record is
/// discarded; [`MAX_CONSECUTIVE_DECODE_FAILURES`] in a row end the loop with
/// [`LinkError::Desynchronized`].
pub async fn run_ingestion<M, F>(reader: &mut LinkReader, mut sink: F) -> LinkError
where
    M: WireMessage,
    F: FnMut(M),
{
    let mut failures = 0u32;

    loop {
        let bytes = match reader.receive_exactly(M::WIDTH).await {
            Ok(bytes) => bytes,
            Err(e) => return e,
        };

        match M::decode(&bytes) {
            Ok(message) => {
                failures = 0;
                sink(message);
            }
            Err(e) => {
                failures += 1;
                warn!(
                    "Discarding malformed record ({}/{}): {}",
                    failures, MAX_CONSECUTIVE_DECODE_FAILURES, e
                );
                if failures >= MAX_CONSECUTIVE_DECODE_FAILURES {
                    return LinkError::Desynchronized(failures);
                }
            }
        }
    }
}

/// Host side: every input overwrites the latest-input slot.
pub async fn ingest_inputs(reader: &mut LinkReader, slot: &watch::Sender<InputState>) -> LinkError {
    run_ingestion::<InputMessage, _>(reader, |message| {
        slot.send_replace(message.into());
    })
    .await
}

/// Remote side: snapshots overwrite the latest-state slot only when newer.
pub async fn ingest_snapshots(reader: &mut LinkReader, slot: &SnapshotSlot) -> LinkError {
    run_ingestion::<StateMessage, _>(reader, |message| {
        let sequence = message.sequence;
        if !slot.offer(message.into()) {
            debug!("Ignoring stale snapshot {}", sequence);
        }
    })
    .await
}

/// Latest snapshot seen by the Remote, `None` until the first one arrives.
///
/// Only strictly increasing sequences are applied, which keeps the slot
/// monotonic even if the transport ever reorders or repeats snapshots.
#[derive(Debug)]
pub struct SnapshotSlot {
    tx: watch::Sender<Option<GameState>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Applies `snapshot` if it is newer than the stored one. Readers are only
    /// woken when it is applied.
    pub fn offer(&self, snapshot: GameState) -> bool {
        self.tx.send_if_modified(|current| match current {
            Some(existing) if snapshot.sequence <= existing.sequence => false,
            _ => {
                *current = Some(snapshot);
                true
            }
        })
    }

    pub fn latest(&self) -> Option<GameState> {
        self.tx.borrow().clone()
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.tx.borrow().as_ref().map(|state| state.sequence)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GameState>> {
        self.tx.subscribe()
    }
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}
