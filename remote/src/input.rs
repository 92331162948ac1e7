//! Remote input tracking with change detection.

use log::debug;
use shared::{InputMessage, LinkError, LinkWriter, WireMessage};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The Remote player's latest paddle intent, `None` until the first input.
///
/// Setting the same value twice does not wake the sender, so only changes
/// reach the link.
#[derive(Debug)]
pub struct InputSlot {
    tx: watch::Sender<Option<InputMessage>>,
}

impl InputSlot {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Records a new desired paddle top. Returns whether it differed from the
    /// stored one.
    pub fn set(&self, desired_paddle_y: f64) -> bool {
        let message = InputMessage { desired_paddle_y };
        self.tx.send_if_modified(|current| {
            if *current == Some(message) {
                false
            } else {
                *current = Some(message);
                true
            }
        })
    }

    pub fn latest(&self) -> Option<InputMessage> {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<InputMessage>> {
        self.tx.subscribe()
    }
}

impl Default for InputSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends the slot's value whenever it changes. A value set before the link
/// existed goes out first.
///
/// Bursts collapse to the newest value: while a send is in flight, further
/// changes only overwrite the slot.
pub fn spawn_input_sender(
    mut writer: LinkWriter,
    mut inputs: watch::Receiver<Option<InputMessage>>,
) -> JoinHandle<Result<(), LinkError>> {
    tokio::spawn(async move {
        let mut pending = *inputs.borrow_and_update();

        loop {
            if let Some(message) = pending.take() {
                let bytes = message.encode().map_err(LinkError::Encode)?;
                writer.send(&bytes).await?;
                debug!("Sent input {:.1}", message.desired_paddle_y);
            }

            if inputs.changed().await.is_err() {
                break;
            }
            pending = *inputs.borrow_and_update();
        }

        writer.shutdown().await
    })
}
