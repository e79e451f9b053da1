use crate::constants::MAX_FRAME_DT_SEC;
use instant::Instant;

/// Per-frame timing: elapsed seconds since start and a clamped delta.
///
/// The clamp keeps one long stall (hidden tab, dragged window) from turning
/// into a single huge smoothing step.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    max_dt: f32,
    frame: u64,
}

/// Timing for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub dt: f32,
    pub elapsed: f32,
    pub frame: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            max_dt: MAX_FRAME_DT_SEC,
            frame: 0,
        }
    }

    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt;
        self
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let raw = (now - self.last).as_secs_f32();
        self.last = now;
        self.frame += 1;
        FrameTime {
            dt: clamp_dt(raw, self.max_dt),
            elapsed: (now - self.start).as_secs_f32(),
            frame: self.frame,
        }
    }
}

/// Clamp a raw frame delta to `[0, max_dt]`; NaN becomes 0.
#[inline]
pub fn clamp_dt(raw: f32, max_dt: f32) -> f32 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, max_dt.max(0.0))
    }
}
