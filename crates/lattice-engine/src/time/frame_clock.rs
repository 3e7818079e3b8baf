use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

impl FrameTime {
    /// Instantaneous frame rate derived from `dt`.
    pub fn fps(&self) -> f32 {
        if self.dt > 0.0 { 1.0 / self.dt } else { 0.0 }
    }
}

/// Wall-clock frame timer, one per window.
///
/// Only used for diagnostics; the animation advances by fixed steps per drawn
/// frame regardless of `dt`. Delta time is clamped so a stall (debugger,
/// minimized window) does not report absurd values.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        Self::starting_at(Instant::now(), dt_min, dt_max)
    }

    fn starting_at(start: Instant, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: start,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. after the window was occluded.
    pub fn reset(&mut self) {
        self.last = Instant::now();
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

    fn clock(start: Instant) -> FrameClock {
        FrameClock::starting_at(start, FrameClock::DEFAULT_DT_MIN, FrameClock::DEFAULT_DT_MAX)
    }

    #[test]
    fn frame_index_counts_from_zero() {
        let start = Instant::now();
        let mut c = clock(start);
        let a = c.tick_at(start + Duration::from_millis(16));
        let b = c.tick_at(start + Duration::from_millis(32));
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn regular_interval_is_reported_as_is() {
        let start = Instant::now();
        let mut c = clock(start);
        let ft = c.tick_at(start + Duration::from_millis(20));
        assert!((ft.dt - 0.020).abs() < 1e-6);
        assert!((ft.fps() - 50.0).abs() < 1e-2);
    }

    #[test]
    fn long_stall_is_clamped_to_max() {
        let start = Instant::now();
        let mut c = clock(start);
        let ft = c.tick_at(start + Duration::from_secs(5));
        assert_eq!(ft.dt, FrameClock::DEFAULT_DT_MAX.as_secs_f32());
    }

    #[test]
    fn zero_interval_is_clamped_to_min() {
        let start = Instant::now();
        let mut c = clock(start);
        let ft = c.tick_at(start);
        assert_eq!(ft.dt, FrameClock::DEFAULT_DT_MIN.as_secs_f32());
    }
}
