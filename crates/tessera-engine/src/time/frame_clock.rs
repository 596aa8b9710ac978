use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,

    /// Milliseconds since the clock was created; the timestamp handed to the
    /// simulation core.
    pub elapsed_ms: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a stall (debugger, minimized window) does not
/// show up as one enormous step. `elapsed_ms` is never clamped.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Milliseconds since the clock was created, for events between ticks.
    pub fn elapsed_ms(&self) -> f64 {
        Self::ms_between(self.start, Instant::now())
    }

    fn ms_between(start: Instant, now: Instant) -> f64 {
        now.saturating_duration_since(start).as_secs_f64() * 1000.0
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed_ms: Self::ms_between(self.start, now),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_unclamped_and_dt_is_clamped() {
        let mut clock = FrameClock::new();
        let start = clock.start;

        let first = clock.tick_at(start + Duration::from_secs(2));
        assert_eq!(first.frame_index, 0);
        assert_eq!(first.elapsed_ms, 2000.0);
        assert_eq!(first.dt, 0.25);

        let second = clock.tick_at(start + Duration::from_millis(2016));
        assert_eq!(second.frame_index, 1);
        assert!((second.elapsed_ms - 2016.0).abs() < 1e-6);
        assert!((second.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn tiny_steps_are_raised_to_minimum() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        clock.tick_at(start);
        let ft = clock.tick_at(start);
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn elapsed_is_monotonic() {
        let clock = FrameClock::new();
        let a = clock.elapsed_ms();
        let b = clock.elapsed_ms();
        assert!(b >= a);
    }
}
