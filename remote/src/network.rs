//! Remote role orchestration: connects to the Host, forwards local input and
//! keeps the latest snapshot for presentation.

use crate::input::{spawn_input_sender, InputSlot};
use log::{info, warn};
use shared::ingest::ingest_snapshots;
use shared::{
    ConnectError, FinishReason, GameState, Link, LinkError, LocalInput, Rules, RulesError, Side,
    SnapshotSlot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinError;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub server_addr: String,
    /// `None` waits for the OS connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Must match the Host's rules.
    pub rules: Rules,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:7878".to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
            rules: Rules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemotePhase {
    Idle,
    Connecting,
    Running,
    Finished(FinishReason),
}

struct Shared {
    rules: Rules,
    snapshots: SnapshotSlot,
    input: InputSlot,
    phase_tx: watch::Sender<RemotePhase>,
    shutdown: Notify,
}

impl Shared {
    fn set_phase(&self, phase: RemotePhase) {
        let previous = self.phase_tx.send_replace(phase.clone());
        info!("Remote phase: {:?} -> {:?}", previous, phase);
    }

    fn winner(&self) -> Option<Side> {
        self.snapshots
            .latest()
            .and_then(|state| state.winner(self.rules.max_score))
    }
}

/// Presentation-side view of a Remote.
#[derive(Clone)]
pub struct RemoteHandle {
    shared: Arc<Shared>,
}

impl RemoteHandle {
    /// Latest snapshot from the Host, `None` before the first one.
    pub fn state(&self) -> Option<GameState> {
        self.shared.snapshots.latest()
    }

    pub fn phase(&self) -> RemotePhase {
        self.shared.phase_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GameState>> {
        self.shared.snapshots.subscribe()
    }

    pub fn rules(&self) -> &Rules {
        &self.shared.rules
    }

    /// Provisional position of the Remote paddle: the Host's word once a
    /// snapshot has arrived, otherwise the last requested position.
    pub fn paddle_y(&self) -> f64 {
        match self.shared.snapshots.latest() {
            Some(state) => state.remote_paddle_y,
            None => self
                .shared
                .input
                .latest()
                .map(|message| message.desired_paddle_y)
                .unwrap_or_else(|| self.shared.rules.paddle_start_y()),
        }
    }

    /// Steers the Remote paddle. Sent to the Host only when the desired
    /// position actually changes.
    pub fn submit(&self, input: LocalInput) {
        let desired_paddle_y = input.desired_paddle_y(self.paddle_y(), &self.shared.rules);
        self.shared.input.set(desired_paddle_y);
    }

    /// Leaves the match; the Host observes a closed link.
    pub fn shutdown(&self) {
        self.shared.shutdown.notify_one();
    }
}

/// The thin controller role.
pub struct Remote {
    config: RemoteConfig,
    shared: Arc<Shared>,
}

impl Remote {
    /// Fails if `config.rules` cannot be simulated.
    pub fn new(config: RemoteConfig) -> Result<Self, RulesError> {
        config.rules.validate()?;
        let (phase_tx, _) = watch::channel(RemotePhase::Idle);
        let shared = Arc::new(Shared {
            rules: config.rules.clone(),
            snapshots: SnapshotSlot::new(),
            input: InputSlot::new(),
            phase_tx,
            shutdown: Notify::new(),
        });
        Ok(Self { config, shared })
    }

    pub fn handle(&self) -> RemoteHandle {
        RemoteHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Connects and follows the match until it ends.
    ///
    /// Only failing to connect is an error; everything after that ends in a
    /// [`FinishReason`].
    pub async fn run(self) -> Result<FinishReason, ConnectError> {
        let Remote { config, shared } = self;

        shared.set_phase(RemotePhase::Connecting);
        info!("Connecting to {}", config.server_addr);

        let link = tokio::select! {
            link = Link::connect(&config.server_addr, config.connect_timeout) => match link {
                Ok(link) => link,
                Err(e) => {
                    shared.set_phase(RemotePhase::Finished(FinishReason::LinkLost {
                        reason: e.to_string(),
                    }));
                    return Err(e);
                }
            },
            _ = shared.shutdown.notified() => {
                shared.set_phase(RemotePhase::Finished(FinishReason::Shutdown));
                return Ok(FinishReason::Shutdown);
            }
        };
        info!("Connected to {}", link.peer_addr());
        shared.set_phase(RemotePhase::Running);

        let (mut reader, writer) = link.into_split();
        let mut ingest = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move { ingest_snapshots(&mut reader, &shared.snapshots).await })
        };
        let mut sender = spawn_input_sender(writer, shared.input.subscribe());
        let mut snapshots = shared.snapshots.subscribe();

        let reason = tokio::select! {
            winner = wait_for_winner(&mut snapshots, config.rules.max_score) => match winner {
                Some(winner) => FinishReason::MatchOver { winner },
                None => FinishReason::LinkLost { reason: "snapshot slot closed".to_string() },
            },
            result = &mut ingest => after_link_loss(&shared, "snapshot ingestion", result),
            result = &mut sender => match result {
                Ok(Ok(())) => after_link_loss(&shared, "input sender", Ok(LinkError::Closed)),
                Ok(Err(e)) => after_link_loss(&shared, "input sender", Ok(e)),
                Err(e) => after_link_loss(&shared, "input sender", Err(e)),
            },
            _ = shared.shutdown.notified() => FinishReason::Shutdown,
        };

        ingest.abort();
        sender.abort();

        shared.set_phase(RemotePhase::Finished(reason.clone()));
        info!("Remote finished: {}", reason);
        Ok(reason)
    }
}

/// How long a decided snapshot must stand unchallenged before the Remote
/// calls the match over. The Host closes the link well within it.
const FINAL_SNAPSHOT_GRACE: Duration = Duration::from_millis(500);

/// Resolves once a snapshot with a winner is not followed by a newer one,
/// or `None` if the slot closes.
///
/// A newer snapshot after a decided one means the Host plays to a higher
/// `max_score`; the Remote then keeps following until the link closes.
async fn wait_for_winner(
    snapshots: &mut watch::Receiver<Option<GameState>>,
    max_score: u32,
) -> Option<Side> {
    let mut warned = false;
    loop {
        let winner = snapshots
            .borrow_and_update()
            .as_ref()
            .and_then(|state| state.winner(max_score));

        match winner {
            Some(winner) => {
                let next = tokio::time::timeout(FINAL_SNAPSHOT_GRACE, snapshots.changed()).await;
                match next {
                    Err(_) => return Some(winner),
                    Ok(Err(_)) => return None,
                    Ok(Ok(())) if !warned => {
                        warn!(
                            "Host kept playing past {} points; its max score differs from ours",
                            max_score
                        );
                        warned = true;
                    }
                    Ok(Ok(())) => {}
                }
            }
            None => {
                if snapshots.changed().await.is_err() {
                    return None;
                }
            }
        }
    }
}

/// The Host closes the link right after the final snapshot, so a closed link
/// with a decided match in the slot is a normal ending.
fn after_link_loss(
    shared: &Shared,
    task: &str,
    result: Result<LinkError, JoinError>,
) -> FinishReason {
    if let Some(winner) = shared.winner() {
        return FinishReason::MatchOver { winner };
    }
    match result {
        Ok(err) => {
            warn!("{} ended: {}", task, err);
            err.into()
        }
        Err(e) => FinishReason::LinkLost {
            reason: format!("{} task failed: {}", task, e),
        },
    }
}
