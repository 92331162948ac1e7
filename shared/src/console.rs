//! Text-mode stand-in for the presentation layer used by the binaries:
//! paddle commands read from stdin and a one-line scoreboard.

use crate::rules::Rules;
use crate::state::{Direction, GameState, LocalInput, Side};
use log::{debug, info, warn};
use std::io::BufRead;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Parses one console line into a paddle command.
///
/// `w`/`up`, `s`/`down`, `x`/`stop`, or a number for an absolute paddle top.
pub fn parse_command(line: &str) -> Option<LocalInput> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "w" | "up" => Some(LocalInput::Direction(Direction::Up)),
        "s" | "down" => Some(LocalInput::Direction(Direction::Down)),
        "x" | "stop" => Some(LocalInput::Direction(Direction::None)),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|y| y.is_finite())
            .map(LocalInput::DesiredY),
    }
}

/// Reads stdin line by line until EOF, forwarding every recognised command.
///
/// Runs on a plain thread: a blocking stdin read cannot be cancelled and would
/// otherwise hold up runtime shutdown.
pub fn spawn_console_input<F>(mut submit: F) -> std::thread::JoinHandle<()>
where
    F: FnMut(LocalInput) + Send + 'static,
{
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => match parse_command(&line) {
                    Some(input) => submit(input),
                    None => warn!("Unknown command {:?} (use w/s/x or a number)", line.trim()),
                },
                Err(e) => {
                    warn!("Console input error: {}", e);
                    return;
                }
            }
        }
        debug!("Console input closed");
    })
}

pub fn scoreboard(state: &GameState) -> String {
    format!(
        "remote {} - {} host  (seq {})",
        state.score_remote, state.score_host, state.sequence
    )
}

pub fn side_name(side: Side) -> &'static str {
    match side {
        Side::Host => "host",
        Side::Remote => "remote",
    }
}

/// Logs the scoreboard every time the score in `states` changes.
pub fn spawn_scoreboard<T>(mut states: watch::Receiver<T>, rules: Rules) -> JoinHandle<()>
where
    T: AsScoreboard + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut last_score = None;
        while states.changed().await.is_ok() {
            let line = {
                let current = states.borrow_and_update();
                match current.game_state() {
                    Some(state) => {
                        let score = (state.score_host, state.score_remote);
                        if last_score == Some(score) {
                            continue;
                        }
                        last_score = Some(score);
                        match state.winner(rules.max_score) {
                            Some(side) => format!("{}  -- {} wins", scoreboard(state), side_name(side)),
                            None => scoreboard(state),
                        }
                    }
                    None => continue,
                }
            };
            info!("{}", line);
        }
    })
}

/// Anything the scoreboard can watch: the Host's authoritative state or the
/// Remote's optional latest snapshot.
pub trait AsScoreboard {
    fn game_state(&self) -> Option<&GameState>;
}

impl AsScoreboard for GameState {
    fn game_state(&self) -> Option<&GameState> {
        Some(self)
    }
}

impl AsScoreboard for Option<GameState> {
    fn game_state(&self) -> Option<&GameState> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec2;

    #[test]
    fn test_parse_direction_commands() {
        assert_eq!(
            parse_command("w"),
            Some(LocalInput::Direction(Direction::Up))
        );
        assert_eq!(
            parse_command(" UP \n"),
            Some(LocalInput::Direction(Direction::Up))
        );
        assert_eq!(
            parse_command("s"),
            Some(LocalInput::Direction(Direction::Down))
        );
        assert_eq!(
            parse_command("stop"),
            Some(LocalInput::Direction(Direction::None))
        );
    }

    #[test]
    fn test_parse_absolute_position() {
        assert_eq!(parse_command("120.5"), Some(LocalInput::DesiredY(120.5)));
        assert_eq!(parse_command("-3"), Some(LocalInput::DesiredY(-3.0)));
        assert_eq!(parse_command("nan"), None);
        assert_eq!(parse_command("inf"), None);
        assert_eq!(parse_command("jump"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_scoreboard_format() {
        let state = GameState {
            sequence: 12,
            ball_position: Vec2::new(400.0, 300.0),
            ball_velocity: Vec2::new(-300.0, 0.0),
            host_paddle_y: 250.0,
            remote_paddle_y: 250.0,
            score_host: 2,
            score_remote: 5,
        };
        assert_eq!(scoreboard(&state), "remote 5 - 2 host  (seq 12)");
        assert_eq!(side_name(Side::Remote), "remote");
    }

    #[test]
    fn test_scoreboard_sources() {
        let none: Option<GameState> = None;
        assert!(none.game_state().is_none());
    }
}
