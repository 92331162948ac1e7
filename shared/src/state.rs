use crate::physics::serve;
use crate::rules::Rules;
use crate::vector::Vec2;
use rand::Rng;

/// One of the two paddles, named after the role that controls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Guards the right goal.
    Host,
    /// Guards the left goal.
    Remote,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Host => Side::Remote,
            Side::Remote => Side::Host,
        }
    }
}

/// Authoritative match state. Only the Host's tick mutates it; the Remote
/// holds the latest copy it was sent.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub sequence: u64,
    /// Centre of the ball.
    pub ball_position: Vec2,
    pub ball_velocity: Vec2,
    /// Top edge of the Host paddle.
    pub host_paddle_y: f64,
    /// Top edge of the Remote paddle.
    pub remote_paddle_y: f64,
    pub score_host: u32,
    pub score_remote: u32,
}

impl GameState {
    /// Fresh match: centred paddles, zero scores, ball served toward a random side.
    pub fn new_match<R: Rng>(rules: &Rules, rng: &mut R) -> Self {
        let receiver = if rng.gen_bool(0.5) {
            Side::Host
        } else {
            Side::Remote
        };
        let (ball_position, ball_velocity) = serve(rules, receiver, rng);

        Self {
            sequence: 0,
            ball_position,
            ball_velocity,
            host_paddle_y: rules.paddle_start_y(),
            remote_paddle_y: rules.paddle_start_y(),
            score_host: 0,
            score_remote: 0,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Host => self.score_host,
            Side::Remote => self.score_remote,
        }
    }

    pub fn paddle_y(&self, side: Side) -> f64 {
        match side {
            Side::Host => self.host_paddle_y,
            Side::Remote => self.remote_paddle_y,
        }
    }

    /// The side that reached `max_score`, if any. A state with a winner is frozen.
    pub fn winner(&self, max_score: u32) -> Option<Side> {
        if self.score_host >= max_score {
            Some(Side::Host)
        } else if self.score_remote >= max_score {
            Some(Side::Remote)
        } else {
            None
        }
    }

    pub fn is_finished(&self, max_score: u32) -> bool {
        self.winner(max_score).is_some()
    }
}

/// What one role wants its paddle to do, as read by the Host's tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    pub desired_paddle_y: f64,
}

impl InputState {
    /// "No movement": hold the paddle where a new match places it.
    pub fn idle(rules: &Rules) -> Self {
        Self {
            desired_paddle_y: rules.paddle_start_y(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    None,
}

/// Input event accepted from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalInput {
    Direction(Direction),
    DesiredY(f64),
}

impl LocalInput {
    /// Converts the event into a desired paddle top, given where the paddle is now.
    pub fn desired_paddle_y(&self, current_y: f64, rules: &Rules) -> f64 {
        match *self {
            LocalInput::Direction(Direction::Up) => 0.0,
            LocalInput::Direction(Direction::Down) => rules.paddle_max_y(),
            LocalInput::Direction(Direction::None) => current_y,
            LocalInput::DesiredY(y) if y.is_finite() => rules.clamp_paddle_y(y),
            LocalInput::DesiredY(_) => current_y,
        }
    }
}
