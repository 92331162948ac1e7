//! Paddle, wall and goal physics.
//!
//! [`step`] is a pure function of the previous state, both inputs and `dt`;
//! the only outside influence is the RNG used for serves, which callers pass in.

use crate::rules::Rules;
use crate::state::{GameState, InputState, Side};
use crate::vector::Vec2;
use rand::Rng;
use std::f64::consts::FRAC_PI_4;

/// Upper bound on sub-steps per call, reached only for absurd `dt` values.
const MAX_SUBSTEPS: u32 = 1_000;

/// Something noteworthy that happened during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsEvent {
    WallBounce,
    PaddleHit(Side),
    /// The given side scored.
    Goal(Side),
    /// The given side reached the score limit.
    MatchOver(Side),
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: GameState,
    pub events: Vec<PhysicsEvent>,
}

impl StepOutcome {
    pub fn paddle_hits(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PhysicsEvent::PaddleHit(_)))
            .count()
    }
}

/// Advances the match by `dt` seconds.
///
/// Paddles move toward their desired position, the ball moves and bounces, and
/// a goal re-serves. A finished match is returned unchanged. Otherwise the
/// sequence advances by exactly one regardless of `dt`.
pub fn step<R: Rng>(
    state: &GameState,
    host_input: &InputState,
    remote_input: &InputState,
    rules: &Rules,
    dt: f64,
    rng: &mut R,
) -> StepOutcome {
    let mut next = state.clone();
    let mut events = Vec::new();

    if state.is_finished(rules.max_score) {
        return StepOutcome {
            state: next,
            events,
        };
    }

    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let ball_speed = next.ball_velocity.magnitude().max(rules.max_ball_speed);
    let substeps = required_substeps(rules, ball_speed, dt);
    let h = dt / substeps as f64;

    for _ in 0..substeps {
        let max_paddle_move = rules.paddle_speed * h;
        next.host_paddle_y = move_paddle(
            next.host_paddle_y,
            host_input.desired_paddle_y,
            max_paddle_move,
            rules,
        );
        next.remote_paddle_y = move_paddle(
            next.remote_paddle_y,
            remote_input.desired_paddle_y,
            max_paddle_move,
            rules,
        );

        next.ball_position = next.ball_position.add(&next.ball_velocity.scale(h));

        if bounce_off_walls(&mut next, rules) {
            events.push(PhysicsEvent::WallBounce);
        }
        for side in [Side::Remote, Side::Host] {
            if bounce_off_paddle(&mut next, side, rules) {
                events.push(PhysicsEvent::PaddleHit(side));
            }
        }

        if let Some(scorer) = goal_scored(&next, rules) {
            award_point(&mut next, scorer, rules, rng, &mut events);
            // A serve is a discrete transition; the rest of this tick is dropped.
            break;
        }
    }

    next.sequence += 1;
    StepOutcome {
        state: next,
        events,
    }
}

/// Number of sub-steps needed so the ball never moves more than half of the
/// thinner of paddle width and ball size at once.
pub fn required_substeps(rules: &Rules, ball_speed: f64, dt: f64) -> u32 {
    let max_movement_per_step = rules.paddle_width.min(rules.ball_size) * 0.5;
    let max_movement_this_tick = ball_speed * dt;

    if max_movement_per_step > 0.0 && max_movement_this_tick > max_movement_per_step {
        ((max_movement_this_tick / max_movement_per_step).ceil() as u32).clamp(1, MAX_SUBSTEPS)
    } else {
        1
    }
}

/// Centred ball heading toward `receiver` at a random legal serve speed and
/// an angle within 45 degrees of horizontal.
pub fn serve<R: Rng>(rules: &Rules, receiver: Side, rng: &mut R) -> (Vec2, Vec2) {
    let (cx, cy) = rules.center();
    let speed = rng.gen_range(rules.serve_speed_min..=rules.serve_speed_max);
    let angle = rng.gen_range(-FRAC_PI_4..=FRAC_PI_4);
    let direction = match receiver {
        Side::Remote => -1.0,
        Side::Host => 1.0,
    };

    let velocity = Vec2::new(direction * speed * angle.cos(), speed * angle.sin());
    (Vec2::new(cx, cy), velocity)
}

fn move_paddle(current: f64, desired: f64, max_move: f64, rules: &Rules) -> f64 {
    let target = rules.clamp_paddle_y(desired);
    let delta = (target - current).clamp(-max_move, max_move);
    rules.clamp_paddle_y(current + delta)
}

fn bounce_off_walls(state: &mut GameState, rules: &Rules) -> bool {
    let half = rules.ball_size / 2.0;
    let pos = &mut state.ball_position;
    let vel = &mut state.ball_velocity;

    if pos.y - half < 0.0 {
        pos.y = half;
        if vel.y < 0.0 {
            vel.y = -vel.y;
            return true;
        }
    } else if pos.y + half > rules.playfield_height {
        pos.y = rules.playfield_height - half;
        if vel.y > 0.0 {
            vel.y = -vel.y;
            return true;
        }
    }
    false
}

fn bounce_off_paddle(state: &mut GameState, side: Side, rules: &Rules) -> bool {
    let half = rules.ball_size / 2.0;
    let paddle_left = match side {
        Side::Remote => rules.remote_paddle_x(),
        Side::Host => rules.host_paddle_x(),
    };
    let paddle_right = paddle_left + rules.paddle_width;
    let paddle_top = state.paddle_y(side);
    let paddle_bottom = paddle_top + rules.paddle_height;
    let paddle_mid_x = paddle_left + rules.paddle_width / 2.0;

    let pos = state.ball_position;
    let vel = state.ball_velocity;

    // Only a ball still in front of the paddle's midline and heading at it counts.
    let approaching = match side {
        Side::Remote => vel.x < 0.0 && pos.x >= paddle_mid_x,
        Side::Host => vel.x > 0.0 && pos.x <= paddle_mid_x,
    };
    if !approaching {
        return false;
    }

    let overlap = !(pos.x + half <= paddle_left
        || paddle_right <= pos.x - half
        || pos.y + half <= paddle_top
        || paddle_bottom <= pos.y - half);
    if !overlap {
        return false;
    }

    let paddle_half_height = rules.paddle_height / 2.0;
    let offset = ((pos.y - (paddle_top + paddle_half_height)) / paddle_half_height).clamp(-1.0, 1.0);

    // vx is reflected exactly; only spin gives way to the speed cap.
    let max_vy = (rules.max_ball_speed.powi(2) - vel.x.powi(2)).max(0.0).sqrt();
    let vy = (vel.y + offset * rules.spin).clamp(-max_vy, max_vy);
    state.ball_velocity = Vec2::new(-vel.x, vy);

    state.ball_position.x = match side {
        Side::Remote => paddle_right + half,
        Side::Host => paddle_left - half,
    };
    true
}

fn goal_scored(state: &GameState, rules: &Rules) -> Option<Side> {
    let half = rules.ball_size / 2.0;
    if state.ball_position.x + half < 0.0 {
        Some(Side::Host)
    } else if state.ball_position.x - half > rules.playfield_width {
        Some(Side::Remote)
    } else {
        None
    }
}

fn award_point<R: Rng>(
    state: &mut GameState,
    scorer: Side,
    rules: &Rules,
    rng: &mut R,
    events: &mut Vec<PhysicsEvent>,
) {
    match scorer {
        Side::Host => state.score_host += 1,
        Side::Remote => state.score_remote += 1,
    }
    events.push(PhysicsEvent::Goal(scorer));

    let (position, velocity) = serve(rules, scorer.opponent(), rng);
    state.ball_position = position;
    state.ball_velocity = velocity;

    if state.score(scorer) >= rules.max_score {
        events.push(PhysicsEvent::MatchOver(scorer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f64 = 1.0 / 60.0;

    fn rally_state(rules: &Rules, position: Vec2, velocity: Vec2) -> GameState {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = GameState::new_match(rules, &mut rng);
        state.ball_position = position;
        state.ball_velocity = velocity;
        state
    }

    fn hold(y: f64) -> InputState {
        InputState {
            desired_paddle_y: y,
        }
    }

    #[test]
    fn test_sequence_advances_by_one_per_step() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GameState::new_match(&rules, &mut rng);
        let idle = InputState::idle(&rules);

        for expected in 1..=200 {
            state = step(&state, &idle, &idle, &rules, DT, &mut rng).state;
            assert_eq!(state.sequence, expected);
        }
    }

    #[test]
    fn test_paddles_clamped_for_out_of_range_inputs() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = GameState::new_match(&rules, &mut rng);
        let inputs = [-1e9, -1.0, 0.0, 250.0, 499.9, 500.0, 501.0, 1e9];

        for (i, host) in inputs.iter().enumerate() {
            let remote = inputs[inputs.len() - 1 - i];
            for _ in 0..90 {
                state = step(&state, &hold(*host), &hold(remote), &rules, DT, &mut rng).state;
                assert!((0.0..=rules.paddle_max_y()).contains(&state.host_paddle_y));
                assert!((0.0..=rules.paddle_max_y()).contains(&state.remote_paddle_y));
            }
        }
    }

    #[test]
    fn test_paddle_speed_is_limited() {
        let rules = Rules::default();
        let state = rally_state(&rules, Vec2::new(400.0, 300.0), Vec2::new(0.0, 10.0));
        let mut rng = StdRng::seed_from_u64(5);

        let next = step(&state, &hold(0.0), &hold(500.0), &rules, DT, &mut rng).state;
        let max_move = rules.paddle_speed * DT;
        assert_approx_eq!(state.host_paddle_y - next.host_paddle_y, max_move, 1e-9);
        assert_approx_eq!(next.remote_paddle_y - state.remote_paddle_y, max_move, 1e-9);
    }

    #[test]
    fn test_top_wall_bounce_flips_vertical_velocity() {
        let rules = Rules::default();
        let state = rally_state(&rules, Vec2::new(400.0, 8.0), Vec2::new(100.0, -200.0));
        let idle = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = step(&state, &idle, &idle, &rules, DT, &mut rng);
        assert_eq!(outcome.events, vec![PhysicsEvent::WallBounce]);
        assert_eq!(outcome.state.ball_velocity, Vec2::new(100.0, 200.0));
        assert_approx_eq!(
            outcome.state.ball_velocity.magnitude(),
            state.ball_velocity.magnitude()
        );
        assert!(outcome.state.ball_position.y >= rules.ball_size / 2.0);
    }

    #[test]
    fn test_bottom_wall_bounce_flips_vertical_velocity() {
        let rules = Rules::default();
        let state = rally_state(&rules, Vec2::new(300.0, 592.0), Vec2::new(-150.0, 240.0));
        let idle = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = step(&state, &idle, &idle, &rules, DT, &mut rng);
        assert!(outcome.events.contains(&PhysicsEvent::WallBounce));
        assert_eq!(outcome.state.ball_velocity, Vec2::new(-150.0, -240.0));
        assert!(outcome.state.ball_position.y <= rules.playfield_height - rules.ball_size / 2.0);
    }

    #[test]
    fn test_centre_hit_reflects_without_spin() {
        let rules = Rules::default();
        // Remote paddle spans y 250..350, front face at x = 30.
        let state = rally_state(&rules, Vec2::new(38.0, 300.0), Vec2::new(-300.0, 0.0));
        let hold_start = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(8);

        let outcome = step(&state, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(outcome.events, vec![PhysicsEvent::PaddleHit(Side::Remote)]);
        assert_eq!(outcome.state.ball_velocity, Vec2::new(300.0, 0.0));
        assert!(outcome.state.ball_position.x >= rules.remote_paddle_x() + rules.paddle_width);
    }

    #[test]
    fn test_off_centre_hit_adds_spin() {
        let rules = Rules::default();
        let hold_start = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(9);

        // Host paddle spans y 250..350 with its face at x = 770.
        let low = rally_state(&rules, Vec2::new(762.0, 340.0), Vec2::new(300.0, 0.0));
        let low = step(&low, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(low.paddle_hits(), 1);
        assert!(low.state.ball_velocity.x < 0.0);
        assert!(low.state.ball_velocity.y > 0.0);

        let high = rally_state(&rules, Vec2::new(762.0, 260.0), Vec2::new(300.0, 0.0));
        let high = step(&high, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(high.paddle_hits(), 1);
        assert!(high.state.ball_velocity.y < 0.0);

        // Further from the centre means more spin.
        let mid = rally_state(&rules, Vec2::new(762.0, 320.0), Vec2::new(300.0, 0.0));
        let mid = step(&mid, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert!(mid.state.ball_velocity.y > 0.0);
        assert!(mid.state.ball_velocity.y < low.state.ball_velocity.y);
    }

    #[test]
    fn test_spin_respects_max_ball_speed() {
        let rules = Rules::default();
        let state = rally_state(
            &rules,
            Vec2::new(38.0, 345.0),
            Vec2::new(-rules.max_ball_speed, 0.0),
        );
        let hold_start = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(10);

        let outcome = step(&state, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(outcome.paddle_hits(), 1);
        assert!(outcome.state.ball_velocity.magnitude() <= rules.max_ball_speed + 1e-9);
        assert_eq!(outcome.state.ball_velocity.x, rules.max_ball_speed);
    }

    #[test]
    fn test_capped_spin_keeps_horizontal_reflection() {
        let rules = Rules::default();
        // Low on the paddle, so spin pushes vy past the speed cap.
        let state = rally_state(&rules, Vec2::new(38.0, 345.0), Vec2::new(-800.0, 300.0));
        let hold_start = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(11);

        let outcome = step(&state, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(outcome.paddle_hits(), 1);

        let velocity = outcome.state.ball_velocity;
        assert_eq!(velocity.x, 800.0);
        assert!(velocity.y > 300.0);
        assert!(velocity.magnitude() <= rules.max_ball_speed + 1e-9);
    }

    #[test]
    fn test_no_tunneling_at_high_speed() {
        let rules = Rules::default();
        let hold_start = InputState::idle(&rules);
        let paddle_mid_x = rules.remote_paddle_x() + rules.paddle_width / 2.0;

        for speed in [60.0, 300.0, 600.0, rules.max_ball_speed] {
            for dt in [1.0 / 120.0, 1.0 / 60.0, 1.0 / 30.0, 0.05] {
                let mut rng = StdRng::seed_from_u64(11);
                let mut state =
                    rally_state(&rules, Vec2::new(200.0, 300.0), Vec2::new(-speed, 0.0));
                let mut hit = false;

                for _ in 0..10_000 {
                    let outcome = step(&state, &hold_start, &hold_start, &rules, dt, &mut rng);
                    assert!(
                        !outcome.events.contains(&PhysicsEvent::Goal(Side::Host)),
                        "ball tunneled at speed {} dt {}",
                        speed,
                        dt
                    );
                    state = outcome.state;
                    if outcome.events.contains(&PhysicsEvent::PaddleHit(Side::Remote)) {
                        hit = true;
                        break;
                    }
                    assert!(state.ball_position.x >= paddle_mid_x);
                }
                assert!(hit, "no collision at speed {} dt {}", speed, dt);
            }
        }
    }

    #[test]
    fn test_substep_calculation() {
        let rules = Rules::default();

        assert_eq!(required_substeps(&rules, 300.0, 1.0 / 60.0), 1);
        assert_eq!(required_substeps(&rules, rules.max_ball_speed, 1.0 / 60.0), 3);
        assert_eq!(required_substeps(&rules, rules.max_ball_speed, 0.05), 9);
        assert_eq!(required_substeps(&rules, rules.max_ball_speed, 0.0), 1);
        assert_eq!(required_substeps(&rules, rules.max_ball_speed, 1e9), MAX_SUBSTEPS);
    }

    #[test]
    fn test_goal_scores_and_serves() {
        let rules = Rules::default();
        // Ball below the Remote paddle, about to leave through the left goal.
        let state = rally_state(&rules, Vec2::new(2.0, 550.0), Vec2::new(-600.0, 0.0));
        let hold_start = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(12);

        let outcome = step(&state, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(outcome.events, vec![PhysicsEvent::Goal(Side::Host)]);
        assert_eq!(outcome.state.score_host, 1);
        assert_eq!(outcome.state.score_remote, 0);

        let (cx, cy) = rules.center();
        assert_eq!(outcome.state.ball_position, Vec2::new(cx, cy));
        let speed = outcome.state.ball_velocity.magnitude();
        assert!(speed >= rules.serve_speed_min - 1e-9);
        assert!(speed <= rules.serve_speed_max + 1e-9);
        // Served toward the side that conceded.
        assert!(outcome.state.ball_velocity.x < 0.0);
    }

    #[test]
    fn test_serve_bounds() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(13);

        for i in 0..1_000 {
            let receiver = if i % 2 == 0 { Side::Host } else { Side::Remote };
            let (position, velocity) = serve(&rules, receiver, &mut rng);
            let speed = velocity.magnitude();

            assert_eq!(position, Vec2::new(400.0, 300.0));
            assert!(speed >= rules.serve_speed_min - 1e-9);
            assert!(speed <= rules.serve_speed_max + 1e-9);
            assert!(velocity.x.abs() >= velocity.y.abs() - 1e-9);
            match receiver {
                Side::Host => assert!(velocity.x > 0.0),
                Side::Remote => assert!(velocity.x < 0.0),
            }
        }
    }

    #[test]
    fn test_match_over_freezes_state() {
        let rules = Rules::default();
        let mut state = rally_state(&rules, Vec2::new(798.0, 40.0), Vec2::new(600.0, 0.0));
        state.score_remote = rules.max_score - 1;
        let hold_start = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(14);

        let outcome = step(&state, &hold_start, &hold_start, &rules, DT, &mut rng);
        assert_eq!(
            outcome.events,
            vec![
                PhysicsEvent::Goal(Side::Remote),
                PhysicsEvent::MatchOver(Side::Remote)
            ]
        );
        assert_eq!(outcome.state.winner(rules.max_score), Some(Side::Remote));

        let frozen = step(&outcome.state, &hold(0.0), &hold(0.0), &rules, DT, &mut rng);
        assert!(frozen.events.is_empty());
        assert_eq!(frozen.state, outcome.state);
    }

    #[test]
    fn test_non_finite_dt_still_ticks() {
        let rules = Rules::default();
        let state = rally_state(&rules, Vec2::new(400.0, 300.0), Vec2::new(120.0, 0.0));
        let idle = InputState::idle(&rules);
        let mut rng = StdRng::seed_from_u64(15);

        let outcome = step(&state, &idle, &idle, &rules, f64::NAN, &mut rng);
        assert_eq!(outcome.state.sequence, state.sequence + 1);
        assert_eq!(outcome.state.ball_position, state.ball_position);
    }
}
