//! Physics and match constants.
//!
//! Both roles must run with identical [`Rules`]; nothing on the wire checks it.

use crate::error::RulesError;

pub const PLAYFIELD_WIDTH: f64 = 800.0;
pub const PLAYFIELD_HEIGHT: f64 = 600.0;
pub const PADDLE_WIDTH: f64 = 10.0;
pub const PADDLE_HEIGHT: f64 = 100.0;
/// Horizontal gap between a paddle and its goal line.
pub const PADDLE_INSET: f64 = 20.0;
pub const PADDLE_SPEED: f64 = 400.0;
pub const BALL_SIZE: f64 = 10.0;
pub const SERVE_SPEED_MIN: f64 = 240.0;
pub const SERVE_SPEED_MAX: f64 = 360.0;
pub const MAX_BALL_SPEED: f64 = 900.0;
/// Extra vertical speed given by a strike on the very edge of a paddle.
pub const SPIN: f64 = 240.0;
pub const MAX_SCORE: u32 = 10;

/// Tunable parameters of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub playfield_width: f64,
    pub playfield_height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    pub paddle_inset: f64,
    pub paddle_speed: f64,
    pub ball_size: f64,
    pub serve_speed_min: f64,
    pub serve_speed_max: f64,
    pub max_ball_speed: f64,
    pub spin: f64,
    pub max_score: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_inset: PADDLE_INSET,
            paddle_speed: PADDLE_SPEED,
            ball_size: BALL_SIZE,
            serve_speed_min: SERVE_SPEED_MIN,
            serve_speed_max: SERVE_SPEED_MAX,
            max_ball_speed: MAX_BALL_SPEED,
            spin: SPIN,
            max_score: MAX_SCORE,
        }
    }
}

impl Rules {
    /// Rejects rules that would make the paddle clamp or the serve draw
    /// panic, or that can never end a match.
    pub fn validate(&self) -> Result<(), RulesError> {
        let finite = [
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_inset", self.paddle_inset),
            ("paddle_speed", self.paddle_speed),
            ("ball_size", self.ball_size),
            ("serve_speed_min", self.serve_speed_min),
            ("serve_speed_max", self.serve_speed_max),
            ("max_ball_speed", self.max_ball_speed),
            ("spin", self.spin),
        ];
        if let Some(&(name, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(RulesError::NonFinite(name));
        }

        let positive = [
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("ball_size", self.ball_size),
            ("serve_speed_min", self.serve_speed_min),
            ("max_ball_speed", self.max_ball_speed),
        ];
        if let Some(&(name, _)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(RulesError::NotPositive(name));
        }

        if self.paddle_speed < 0.0 {
            return Err(RulesError::NotPositive("paddle_speed"));
        }
        if self.paddle_height > self.playfield_height {
            return Err(RulesError::PaddleTooTall {
                paddle_height: self.paddle_height,
                playfield_height: self.playfield_height,
            });
        }
        if self.serve_speed_min > self.serve_speed_max {
            return Err(RulesError::ServeSpeedRange {
                min: self.serve_speed_min,
                max: self.serve_speed_max,
            });
        }
        if self.max_score == 0 {
            return Err(RulesError::ZeroMaxScore);
        }
        Ok(())
    }

    /// Lowest legal paddle top.
    pub fn paddle_max_y(&self) -> f64 {
        self.playfield_height - self.paddle_height
    }

    /// Paddle top that centres the paddle vertically.
    pub fn paddle_start_y(&self) -> f64 {
        self.paddle_max_y() / 2.0
    }

    pub fn clamp_paddle_y(&self, y: f64) -> f64 {
        y.clamp(0.0, self.paddle_max_y())
    }

    pub fn center(&self) -> (f64, f64) {
        (self.playfield_width / 2.0, self.playfield_height / 2.0)
    }

    /// Left edge of the Remote paddle, which guards the left goal.
    pub fn remote_paddle_x(&self) -> f64 {
        self.paddle_inset
    }

    /// Left edge of the Host paddle, which guards the right goal.
    pub fn host_paddle_x(&self) -> f64 {
        self.playfield_width - self.paddle_inset - self.paddle_width
    }
}
