//! Video sources feeding the motion loop.
//!
//! A source is polled: the loop asks `frame_available()` and only then reads.
//! Real cameras live in the frontends; this module provides a scripted replay
//! source and a synthetic "waving hand" camera.

use crate::error::CaptureError;
use instant::Instant;
use std::collections::VecDeque;

/// A camera-like RGBA frame producer.
pub trait FrameSource {
    /// Native frame size in pixels. Frames are `w * h * 4` bytes.
    fn resolution(&self) -> (u32, u32);

    /// True when a frame newer than the last one read is ready.
    fn frame_available(&mut self) -> bool;

    /// Copy the newest frame into `dst`.
    fn read_frame(&mut self, dst: &mut [u8]) -> Result<(), CaptureError>;

    /// Release the underlying device. Called exactly once when the loop lets
    /// go of the source; sources should also release on drop.
    fn release(&mut self) {}
}

/// Holds a device handle acquired part-way through opening a source.
///
/// If setup bails out with `?` before the finished source takes ownership,
/// dropping the guard runs `release` on the handle. Call [`disarm`] once the
/// source owns the handle and its own release path.
///
/// [`disarm`]: ReleaseGuard::disarm
pub struct ReleaseGuard<T, F: FnMut(&T)> {
    value: T,
    release: F,
    armed: bool,
}

impl<T, F: FnMut(&T)> ReleaseGuard<T, F> {
    pub fn new(value: T, release: F) -> Self {
        Self {
            value,
            release,
            armed: true,
        }
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T, F: FnMut(&T)> Drop for ReleaseGuard<T, F> {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            (self.release)(&self.value);
        }
    }
}

/// Replays queued frames, then optionally fails like an unplugged camera.
#[derive(Debug, Default)]
pub struct ReplaySource {
    width: u32,
    height: u32,
    frames: VecDeque<Vec<u8>>,
    pending_error: Option<CaptureError>,
    released: bool,
}

impl ReplaySource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn push_frame(&mut self, frame: Vec<u8>) {
        self.frames.push_back(frame);
    }

    /// Queue a frame filled with one RGB value (alpha 255).
    pub fn push_solid(&mut self, rgb: [u8; 3]) {
        let n = self.width as usize * self.height as usize;
        let mut frame = Vec::with_capacity(n * 4);
        for _ in 0..n {
            frame.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        self.frames.push_back(frame);
    }

    /// Once the queued frames run out, the next read fails with `err`.
    pub fn fail_with(&mut self, err: CaptureError) {
        self.pending_error = Some(err);
    }

    pub fn queued(&self) -> usize {
        self.frames.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for ReplaySource {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_available(&mut self) -> bool {
        !self.released && (self.pending_error.is_some() || !self.frames.is_empty())
    }

    fn read_frame(&mut self, dst: &mut [u8]) -> Result<(), CaptureError> {
        let Some(frame) = self.frames.pop_front() else {
            return Err(self
                .pending_error
                .take()
                .unwrap_or(CaptureError::Disconnected));
        };
        if frame.len() != dst.len() {
            return Err(CaptureError::FrameSize {
                expected: dst.len(),
                actual: frame.len(),
            });
        }
        dst.copy_from_slice(&frame);
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.frames.clear();
    }
}

/// Synthetic camera: a bright blob on a dim gradient.
///
/// A slow oscillator decides whether the "hand" is open. While open the blob
/// waves quickly around a drifting anchor, which the estimator reads as large
/// motion; while closed the image is frozen.
#[derive(Debug)]
pub struct SimulatedSource {
    width: u32,
    height: u32,
    frame_interval: f32,
    started: Instant,
    last_frame_time: Option<f32>,
    frozen_center: (f32, f32),
    frame_index: u32,
    /// Peak per-channel sensor noise added to every pixel.
    pub noise_amplitude: u8,
}

impl SimulatedSource {
    pub const BLOB_RADIUS: f32 = 8.0;

    pub fn new(width: u32, height: u32, fps: f32) -> Self {
        Self {
            width,
            height,
            frame_interval: 1.0 / fps.max(1.0),
            started: Instant::now(),
            last_frame_time: None,
            frozen_center: (width as f32 * 0.5, height as f32 * 0.5),
            frame_index: 0,
            noise_amplitude: 8,
        }
    }

    /// Whether the simulated hand is open (motion) at time `t` seconds.
    #[inline]
    pub fn hand_open(t: f32) -> bool {
        (t * 0.7).sin() > 0.2
    }

    /// Render the frame for time `t` into `dst`. Deterministic in `t` and the
    /// internal frame counter (which only drives the noise pattern).
    pub fn render_at(&mut self, t: f32, dst: &mut [u8]) {
        let (w, h) = (self.width as f32, self.height as f32);
        if Self::hand_open(t) {
            let anchor_x = (0.5 + (t * 0.4).sin() * 0.4) * w;
            let anchor_y = (0.5 + (t * 0.6).cos() * 0.3) * h;
            let wave = (t * 9.0).sin() * w * 0.15;
            self.frozen_center = (anchor_x + wave, anchor_y);
        }
        let (cx, cy) = self.frozen_center;
        let r2 = Self::BLOB_RADIUS * Self::BLOB_RADIUS;
        let noise = self.noise_amplitude as u32;
        let frame = self.frame_index;
        self.frame_index = self.frame_index.wrapping_add(1);

        for (idx, px) in dst.chunks_exact_mut(4).enumerate() {
            let x = (idx % self.width as usize) as f32;
            let y = (idx / self.width as usize) as f32;
            let dx = x - cx;
            let dy = y - cy;
            let base = if dx * dx + dy * dy <= r2 {
                230u32
            } else {
                20 + (40.0 * y / h.max(1.0)) as u32
            };
            let jitter = if noise > 0 {
                hash_noise(idx as u32, frame) % (noise + 1)
            } else {
                0
            };
            let v = (base + jitter).min(255) as u8;
            px.copy_from_slice(&[v, v, v.saturating_sub(10), 255]);
        }
    }

    fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

impl FrameSource for SimulatedSource {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_available(&mut self) -> bool {
        match self.last_frame_time {
            None => true,
            Some(last) => self.elapsed() - last >= self.frame_interval,
        }
    }

    fn read_frame(&mut self, dst: &mut [u8]) -> Result<(), CaptureError> {
        let expected = self.width as usize * self.height as usize * 4;
        if dst.len() != expected {
            return Err(CaptureError::FrameSize {
                expected,
                actual: dst.len(),
            });
        }
        let t = self.elapsed();
        self.last_frame_time = Some(t);
        self.render_at(t, dst);
        Ok(())
    }
}

#[inline]
fn hash_noise(i: u32, frame: u32) -> u32 {
    let mut n = i.wrapping_mul(374_761_393) ^ frame.wrapping_mul(668_265_263);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^ (n >> 16)
}

