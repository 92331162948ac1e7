//! Fixed-width wire records exchanged over the link.
//!
//! Records are bincode-encoded with its legacy configuration: every integer and
//! float is written little-endian at its natural width and nothing is
//! length-prefixed, so each record type has a constant size and the stream
//! needs no further framing.

use crate::error::DecodeError;
use crate::state::{GameState, InputState};
use crate::vector::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record with a constant encoded width.
pub trait WireMessage: Serialize + DeserializeOwned + Sized {
    const WIDTH: usize;

    fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != Self::WIDTH {
            return Err(DecodeError::WrongWidth {
                expected: Self::WIDTH,
                actual: bytes.len(),
            });
        }
        let message: Self = bincode::deserialize(bytes)?;
        message.validate()?;
        Ok(message)
    }

    /// Rejects values no honest peer would send.
    fn validate(&self) -> Result<(), DecodeError> {
        Ok(())
    }
}

/// Remote to Host: where the Remote wants its paddle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub desired_paddle_y: f64,
}

impl WireMessage for InputMessage {
    const WIDTH: usize = 8;

    fn validate(&self) -> Result<(), DecodeError> {
        if !self.desired_paddle_y.is_finite() {
            return Err(DecodeError::NonFinite("desired_paddle_y"));
        }
        Ok(())
    }
}

impl From<InputMessage> for InputState {
    fn from(message: InputMessage) -> Self {
        InputState {
            desired_paddle_y: message.desired_paddle_y,
        }
    }
}

impl From<&InputState> for InputMessage {
    fn from(input: &InputState) -> Self {
        InputMessage {
            desired_paddle_y: input.desired_paddle_y,
        }
    }
}

/// Host to Remote: one complete snapshot.
///
/// Field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub sequence: u64,
    pub ball_x: f64,
    pub ball_y: f64,
    pub ball_vx: f64,
    pub ball_vy: f64,
    pub host_paddle_y: f64,
    pub remote_paddle_y: f64,
    pub score_host: u32,
    pub score_remote: u32,
}

impl WireMessage for StateMessage {
    const WIDTH: usize = 8 + 6 * 8 + 2 * 4;

    fn validate(&self) -> Result<(), DecodeError> {
        let fields = [
            ("ball_x", self.ball_x),
            ("ball_y", self.ball_y),
            ("ball_vx", self.ball_vx),
            ("ball_vy", self.ball_vy),
            ("host_paddle_y", self.host_paddle_y),
            ("remote_paddle_y", self.remote_paddle_y),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(DecodeError::NonFinite(name));
            }
        }
        Ok(())
    }
}

impl From<&GameState> for StateMessage {
    fn from(state: &GameState) -> Self {
        StateMessage {
            sequence: state.sequence,
            ball_x: state.ball_position.x,
            ball_y: state.ball_position.y,
            ball_vx: state.ball_velocity.x,
            ball_vy: state.ball_velocity.y,
            host_paddle_y: state.host_paddle_y,
            remote_paddle_y: state.remote_paddle_y,
            score_host: state.score_host,
            score_remote: state.score_remote,
        }
    }
}

impl From<StateMessage> for GameState {
    fn from(message: StateMessage) -> Self {
        GameState {
            sequence: message.sequence,
            ball_position: Vec2::new(message.ball_x, message.ball_y),
            ball_velocity: Vec2::new(message.ball_vx, message.ball_vy),
            host_paddle_y: message.host_paddle_y,
            remote_paddle_y: message.remote_paddle_y,
            score_host: message.score_host,
            score_remote: message.score_remote,
        }
    }
}
