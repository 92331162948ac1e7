//! Host role orchestration: accepts the Remote, runs the tick loop and
//! publishes snapshots.
//!
//! Three tasks run while the match is live:
//! - **Input ingestion**: owns the read half, overwrites the latest remote input
//! - **Snapshot sender**: owns the write half, sends the newest published state
//! - **Tick loop**: reads both inputs, steps physics, publishes the new state
//!
//! They only meet at `watch` slots, so a stalled peer can never stall physics.

use crate::game::HostGame;
use crate::scheduler::TickScheduler;
use log::{debug, info, warn};
use shared::ingest::ingest_inputs;
use shared::{
    ConnectError, FinishReason, GameState, InputState, LinkError, LinkListener, LinkWriter,
    LocalInput, Rules, RulesError, StateMessage, WireMessage,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::{JoinError, JoinHandle};

/// How long a finished Host waits for the final snapshot to leave.
const FINAL_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub bind_addr: String,
    pub tick_rate: u32,
    pub rules: Rules,
    /// Fixed RNG seed for reproducible serves.
    pub seed: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7878".to_string(),
            tick_rate: 60,
            rules: Rules::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostPhase {
    Idle,
    AwaitingRemote,
    Running,
    Finished(FinishReason),
}

struct Shared {
    rules: Rules,
    state_tx: watch::Sender<GameState>,
    phase_tx: watch::Sender<HostPhase>,
    local_input_tx: watch::Sender<InputState>,
    shutdown: Notify,
}

impl Shared {
    fn set_phase(&self, phase: HostPhase) {
        let previous = self.phase_tx.send_replace(phase.clone());
        info!("Host phase: {:?} -> {:?}", previous, phase);
    }
}

/// Presentation-side view of a Host: read the authoritative state, steer the
/// Host paddle, ask to stop.
#[derive(Clone)]
pub struct HostHandle {
    shared: Arc<Shared>,
}

impl HostHandle {
    pub fn state(&self) -> GameState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn phase(&self) -> HostPhase {
        self.shared.phase_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.shared.state_tx.subscribe()
    }

    pub fn rules(&self) -> &Rules {
        &self.shared.rules
    }

    /// Steers the Host paddle. Only the latest input is kept.
    pub fn submit(&self, input: LocalInput) {
        let current_y = self.shared.state_tx.borrow().host_paddle_y;
        let desired_paddle_y = input.desired_paddle_y(current_y, &self.shared.rules);
        self.shared
            .local_input_tx
            .send_replace(InputState { desired_paddle_y });
    }

    /// Ends the match; the Remote observes a closed link.
    pub fn shutdown(&self) {
        self.shared.shutdown.notify_one();
    }
}

/// The authoritative simulator role.
pub struct Host {
    config: HostConfig,
    shared: Arc<Shared>,
    game: HostGame,
    listener: Option<LinkListener>,
}

impl Host {
    /// Fails if `config.rules` cannot be simulated.
    pub fn new(config: HostConfig) -> Result<Self, RulesError> {
        config.rules.validate()?;
        let game = HostGame::new(config.rules.clone(), config.seed);
        let (state_tx, _) = watch::channel(game.state().clone());
        let (phase_tx, _) = watch::channel(HostPhase::Idle);
        let (local_input_tx, _) = watch::channel(InputState::idle(&config.rules));

        let shared = Arc::new(Shared {
            rules: config.rules.clone(),
            state_tx,
            phase_tx,
            local_input_tx,
            shutdown: Notify::new(),
        });

        Ok(Self {
            config,
            shared,
            game,
            listener: None,
        })
    }

    pub fn handle(&self) -> HostHandle {
        HostHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Binds the listening endpoint. Returns the bound address, which differs
    /// from the configured one when port 0 was requested.
    pub async fn bind(&mut self) -> Result<SocketAddr, ConnectError> {
        let listener = self.open_listener().await?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    async fn open_listener(&self) -> Result<LinkListener, ConnectError> {
        let listener = LinkListener::bind(&self.config.bind_addr).await?;
        self.shared.set_phase(HostPhase::AwaitingRemote);
        Ok(listener)
    }

    /// Waits for the Remote and plays the match to the end.
    ///
    /// Only failing to establish the link is an error; everything after that
    /// ends in a [`FinishReason`].
    pub async fn run(mut self) -> Result<FinishReason, ConnectError> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => self.open_listener().await?,
        };
        let Host {
            config,
            shared,
            mut game,
            ..
        } = self;

        let link = tokio::select! {
            link = listener.accept() => match link {
                Ok(link) => link,
                Err(e) => {
                    shared.set_phase(HostPhase::Finished(FinishReason::LinkLost {
                        reason: e.to_string(),
                    }));
                    return Err(e);
                }
            },
            _ = shared.shutdown.notified() => {
                shared.set_phase(HostPhase::Finished(FinishReason::Shutdown));
                return Ok(FinishReason::Shutdown);
            }
        };
        shared.set_phase(HostPhase::Running);

        let (mut reader, writer) = link.into_split();
        let (remote_input_tx, remote_input_rx) = watch::channel(InputState::idle(&config.rules));

        let mut ingest =
            tokio::spawn(async move { ingest_inputs(&mut reader, &remote_input_tx).await });
        let mut sender = spawn_snapshot_sender(
            writer,
            shared.state_tx.subscribe(),
            config.rules.max_score,
        );

        let reason = tokio::select! {
            reason = tick_loop(&mut game, &shared, &remote_input_rx, config.tick_rate) => reason,
            result = &mut ingest => link_lost("input ingestion", result),
            result = &mut sender => match result {
                Ok(Ok(())) => {
                    let winner = shared.state_tx.borrow().winner(config.rules.max_score);
                    match winner {
                        Some(winner) => FinishReason::MatchOver { winner },
                        None => FinishReason::LinkLost {
                            reason: "snapshot sender stopped".to_string(),
                        },
                    }
                }
                Ok(Err(e)) => link_lost("snapshot sender", Ok(e)),
                Err(e) => link_lost("snapshot sender", Err(e)),
            },
            _ = shared.shutdown.notified() => FinishReason::Shutdown,
        };

        if matches!(reason, FinishReason::MatchOver { .. }) && !sender.is_finished() {
            match tokio::time::timeout(FINAL_FLUSH_TIMEOUT, &mut sender).await {
                Ok(Ok(Ok(()))) => debug!("Final snapshot delivered"),
                Ok(Ok(Err(e))) => warn!("Final snapshot not delivered: {}", e),
                Ok(Err(e)) => warn!("Snapshot sender failed: {}", e),
                Err(_) => warn!("Timed out delivering the final snapshot"),
            }
        }
        ingest.abort();
        sender.abort();

        shared.set_phase(HostPhase::Finished(reason.clone()));
        info!("Host finished: {}", reason);
        Ok(reason)
    }
}

/// Runs ticks until the match is decided.
async fn tick_loop(
    game: &mut HostGame,
    shared: &Shared,
    remote_input: &watch::Receiver<InputState>,
    tick_rate: u32,
) -> FinishReason {
    let mut scheduler = TickScheduler::new(tick_rate);

    loop {
        let dt = scheduler.next().await;

        let host_input = *shared.local_input_tx.borrow();
        let remote_input = *remote_input.borrow();
        game.tick(&host_input, &remote_input, dt);
        shared.state_tx.send_replace(game.state().clone());

        if game.state().sequence % 60 == 0 {
            debug!(
                "Tick {}: {:.1}Hz, remote paddle {:.1}, host paddle {:.1}",
                game.state().sequence,
                1.0 / dt.max(f64::EPSILON),
                game.state().remote_paddle_y,
                game.state().host_paddle_y
            );
        }

        if let Some(winner) = game.winner() {
            return FinishReason::MatchOver { winner };
        }
    }
}

/// Sends every newly published state, skipping any that were superseded
/// before the link could take them. Stops after the first finished state.
fn spawn_snapshot_sender(
    mut writer: LinkWriter,
    mut states: watch::Receiver<GameState>,
    max_score: u32,
) -> JoinHandle<Result<(), LinkError>> {
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let (message, finished) = {
                let state = states.borrow_and_update();
                (StateMessage::from(&*state), state.is_finished(max_score))
            };

            let bytes = message.encode().map_err(LinkError::Encode)?;
            writer.send(&bytes).await?;

            if finished {
                break;
            }
        }
        writer.shutdown().await
    })
}

fn link_lost(task: &str, result: Result<LinkError, JoinError>) -> FinishReason {
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
