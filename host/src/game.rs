use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::console::side_name;
use shared::{step, GameState, InputState, PhysicsEvent, Rules, Side};

/// The Host's authoritative match: the only place `GameState` is mutated.
#[derive(Debug)]
pub struct HostGame<R: Rng = StdRng> {
    state: GameState,
    rules: Rules,
    rng: R,
    steps: u64,
}

impl HostGame<StdRng> {
    /// Starts a match. A seed makes every serve reproducible.
    pub fn new(rules: Rules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rules, rng)
    }
}

impl<R: Rng> HostGame<R> {
    pub fn with_rng(rules: Rules, mut rng: R) -> Self {
        let state = GameState::new_match(&rules, &mut rng);
        Self::from_state(rules, state, rng)
    }

    /// Resumes from an arbitrary state, mainly for driving scenarios.
    pub fn from_state(rules: Rules, state: GameState, rng: R) -> Self {
        Self {
            state,
            rules,
            rng,
            steps: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of physics steps applied so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn winner(&self) -> Option<Side> {
        self.state.winner(self.rules.max_score)
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }

    /// Runs one tick. Returns `None` without stepping once the match is over.
    pub fn tick(
        &mut self,
        host_input: &InputState,
        remote_input: &InputState,
        dt: f64,
    ) -> Option<Vec<PhysicsEvent>> {
        if self.is_finished() {
            return None;
        }

        let outcome = step(
            &self.state,
            host_input,
            remote_input,
            &self.rules,
            dt,
            &mut self.rng,
        );
        self.state = outcome.state;
        self.steps += 1;

        for event in &outcome.events {
            match event {
                PhysicsEvent::Goal(side) => info!(
                    "{} scores: remote {} - {} host",
                    side_name(*side),
                    self.state.score_remote,
                    self.state.score_host
                ),
                PhysicsEvent::MatchOver(side) => {
                    info!("Match over after {} ticks, {} wins", self.state.sequence, side_name(*side))
                }
                PhysicsEvent::PaddleHit(side) => debug!("Ball hit the {} paddle", side_name(*side)),
                PhysicsEvent::WallBounce => {}
            }
        }

        Some(outcome.events)
    }
}
