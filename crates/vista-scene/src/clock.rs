//! Variable-rate frame clock.
//!
//! Every subsystem is driven by the real time between frames in
//! milliseconds. The clock is the only writer of elapsed time; everything
//! else reads the [`FrameTime`] snapshot it hands out.

use std::time::Instant;

use tracing::warn;

/// Longest frame the simulation will accept. A stall (window drag, debugger,
/// startup) is clamped so the camera and sky do not jump.
pub const MAX_FRAME_MS: f64 = 250.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the previous frame, already clamped.
    pub delta_ms: f64,
    /// Sum of all deltas so far.
    pub elapsed_ms: f64,
    /// Number of frames ticked, including this one.
    pub frame: u64,
}

impl FrameTime {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms * 0.001
    }
}

pub struct FrameClock {
    previous: Instant,
    current: FrameTime,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
            current: FrameTime::default(),
        }
    }

    /// Measure the wall-clock time since the last tick and advance by it.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta_ms = now.duration_since(self.previous).as_secs_f64() * 1000.0;
        self.previous = now;
        self.advance(delta_ms)
    }

    /// Advance by an explicit delta. Negative or non-finite deltas count as
    /// zero.
    pub fn advance(&mut self, delta_ms: f64) -> FrameTime {
        let mut delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        if delta_ms > MAX_FRAME_MS {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                delta_ms, MAX_FRAME_MS
            );
            delta_ms = MAX_FRAME_MS;
        }

        self.current = FrameTime {
            delta_ms,
            elapsed_ms: self.current.elapsed_ms + delta_ms,
            frame: self.current.frame + 1,
        };
        self.current
    }

    /// Forget time spent before now, e.g. synchronous startup work.
    pub fn restart_measurement(&mut self) {
        self.previous = Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.current.elapsed_ms
    }

    pub fn delta_ms(&self) -> f64 {
        self.current.delta_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.current.frame
    }

    pub fn current(&self) -> FrameTime {
        self.current
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
