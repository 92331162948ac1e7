//! Error taxonomy shared by both roles.
//!
//! `ConnectError` is fatal at startup, `LinkError` is fatal to a running match,
//! and `DecodeError` only costs the single frame it was raised for.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// The link could not be established.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("failed to accept a remote: {0}")]
    Accept(#[source] io::Error),

    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    #[error("timed out connecting to {addr} after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },
}

/// An established link broke mid-match.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("peer closed the link")]
    Closed,

    #[error("link i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode outgoing record: {0}")]
    Encode(#[source] bincode::Error),

    #[error("stream desynchronized after {0} consecutive decode failures")]
    Desynchronized(u32),
}

/// A [`Rules`](crate::rules::Rules) value the simulation cannot run with.
#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("`{0}` must be a finite number")]
    NonFinite(&'static str),

    #[error("`{0}` must be positive")]
    NotPositive(&'static str),

    #[error("paddle height {paddle_height} exceeds playfield height {playfield_height}")]
    PaddleTooTall {
        paddle_height: f64,
        playfield_height: f64,
    },

    #[error("serve speed range {min}..={max} is empty")]
    ServeSpeedRange { min: f64, max: f64 },

    #[error("max_score must be at least 1")]
    ZeroMaxScore,
}

/// A single received record was malformed.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected {expected} bytes, got {actual}")]
    WrongWidth { expected: usize, actual: usize },

    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("bincode decode error: {0}")]
    Bincode(#[from] bincode::Error),
}
