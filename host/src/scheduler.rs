//! Fixed-rate tick driver for the Host.

use log::warn;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// Longest `dt` ever handed to the physics step.
pub const MAX_DELTA_TIME: f64 = 1.0 / 20.0;

pub struct TickScheduler {
    interval: Interval,
    last_tick: Instant,
    tick_duration: Duration,
}

impl TickScheduler {
    /// Must be created inside a Tokio runtime. A rate of zero is treated as 1 Hz.
    pub fn new(tick_rate: u32) -> Self {
        let tick_duration = Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64);
        let now = Instant::now();

        // Start one period out so the first tick is not immediate.
        let mut interval = interval_at(now + tick_duration, tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            last_tick: now,
            tick_duration,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Waits for the next tick and returns the elapsed seconds since the
    /// previous one, capped at [`MAX_DELTA_TIME`].
    pub async fn next(&mut self) -> f64 {
        self.interval.tick().await;

        let now = Instant::now();
        let delta_time = (now - self.last_tick).as_secs_f64();
        self.last_tick = now;

        if delta_time > MAX_DELTA_TIME {
            warn!(
                "Large delta time detected ({:.3}s), capping to {:.3}s",
                delta_time, MAX_DELTA_TIME
            );
            MAX_DELTA_TIME
        } else {
            delta_time
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_configured_rate() {
        let mut scheduler = TickScheduler::new(60);
        let start = Instant::now();

        for _ in 0..60 {
            let dt = scheduler.next().await;
            assert_approx_eq!(dt, 1.0 / 60.0, 1e-3);
        }

        let elapsed = (Instant::now() - start).as_secs_f64();
        assert_approx_eq!(elapsed, 1.0, 1e-2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let mut scheduler = TickScheduler::new(10);
        let start = Instant::now();

        scheduler.next().await;
        assert!(Instant::now() - start >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_large_delta_is_capped() {
        let mut scheduler = TickScheduler::new(60);
        scheduler.next().await;

        // Stall well past several periods, as a blocked runtime would.
        tokio::time::advance(Duration::from_millis(500)).await;
        let dt = scheduler.next().await;
        assert_eq!(dt, MAX_DELTA_TIME);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_is_clamped() {
        let scheduler = TickScheduler::new(0);
        assert_eq!(scheduler.tick_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_tick_duration_validation() {
        for hz in [30u32, 60, 120] {
            let duration = Duration::from_secs_f64(1.0 / hz as f64);
            assert!(duration.as_secs_f64() <= MAX_DELTA_TIME);
        }
    }
}
