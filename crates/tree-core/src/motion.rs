//! Frame-differencing motion estimator.
//!
//! Consumes successive RGBA frames on a small fixed grid (64x48 by default)
//! and turns them into a binary chaos target plus a 2D steering offset taken
//! from the centroid of the pixels that changed.

use crate::config::MotionConfig;
use crate::error::CaptureError;
use glam::Vec2;

/// Measurement from one pair of consecutive frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSample {
    /// Sum of the mean channel difference over pixels above the noise threshold.
    pub diff_score: f32,
    /// Number of pixels above the noise threshold.
    pub motion_pixels: u32,
    /// Mean pixel coordinate of those pixels; `None` when nothing moved.
    pub centroid: Option<Vec2>,
    /// `diff_score / (w * h * divisor)` clamped to `[0, 1]`.
    pub normalized_diff: f32,
    /// 1.0 when `normalized_diff > activation_threshold`, else 0.0.
    pub target_chaos_level: f32,
    /// Camera offset after this frame. Retained from the previous frame when
    /// `motion_pixels == 0`.
    pub offset: Vec2,
}

impl MotionSample {
    #[inline]
    pub fn is_unleashed(&self) -> bool {
        self.target_chaos_level > 0.5
    }
}

/// Result of feeding one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionOutcome {
    /// First frame after (re)start: stored as the baseline, no signal emitted.
    Baseline,
    /// A difference against the previous frame was computed.
    Measured(MotionSample),
}

/// Owns the two alternating frame buffers and the retained offset.
pub struct MotionEstimator {
    config: MotionConfig,
    frames: [Vec<u8>; 2],
    // index of the buffer holding the most recent frame
    latest: usize,
    primed: bool,
    offset: Vec2,
}

impl MotionEstimator {
    pub fn new(config: MotionConfig) -> Self {
        let len = config.frame_len();
        Self {
            config,
            frames: [vec![0; len], vec![0; len]],
            latest: 0,
            primed: false,
            offset: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Last emitted camera offset.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Forget the baseline so the next frame is treated as the first one.
    /// The retained offset is kept.
    pub fn reset(&mut self) {
        self.primed = false;
    }

    /// Feed one RGBA frame of exactly `width * height * 4` bytes.
    pub fn process(&mut self, frame: &[u8]) -> Result<MotionOutcome, CaptureError> {
        let expected = self.config.frame_len();
        if frame.len() != expected {
            return Err(CaptureError::FrameSize {
                expected,
                actual: frame.len(),
            });
        }

        let next = 1 - self.latest;
        self.frames[next].copy_from_slice(frame);
        let previous = self.latest;
        self.latest = next;

        if !self.primed {
            self.primed = true;
            log::debug!("[motion] baseline frame stored");
            return Ok(MotionOutcome::Baseline);
        }

        let sample = self.measure(&self.frames[previous], &self.frames[next]);
        self.offset = sample.offset;
        Ok(MotionOutcome::Measured(sample))
    }

    fn measure(&self, prev: &[u8], curr: &[u8]) -> MotionSample {
        let cfg = &self.config;
        let width = cfg.width as usize;

        let mut diff_score = 0.0f32;
        let mut sum_x = 0.0f64;
        let mut sum_y = 0.0f64;
        let mut motion_pixels = 0u32;

        for (idx, (c, p)) in curr.chunks_exact(4).zip(prev.chunks_exact(4)).enumerate() {
            let dr = c[0].abs_diff(p[0]) as f32;
            let dg = c[1].abs_diff(p[1]) as f32;
            let db = c[2].abs_diff(p[2]) as f32;
            let pixel_diff = (dr + dg + db) / 3.0;
            if pixel_diff > cfg.noise_threshold {
                diff_score += pixel_diff;
                sum_x += (idx % width) as f64;
                sum_y += (idx / width) as f64;
                motion_pixels += 1;
            }
        }

        let normalized_diff = (diff_score
            / (cfg.pixel_count() as f32 * cfg.saturation_divisor))
            .clamp(0.0, 1.0);
        // strictly greater: landing exactly on the threshold keeps the tree formed
        let target_chaos_level = if normalized_diff > cfg.activation_threshold {
            1.0
        } else {
            0.0
        };

        let (centroid, offset) = if motion_pixels > 0 {
            let n = motion_pixels as f64;
            let c = Vec2::new((sum_x / n) as f32, (sum_y / n) as f32);
            let centered = Vec2::new(
                c.x / cfg.width as f32 - 0.5,
                c.y / cfg.height as f32 - 0.5,
            );
            (Some(c), centered * cfg.offset_scale)
        } else {
            (None, self.offset)
        };

        MotionSample {
            diff_score,
            motion_pixels,
            centroid,
            normalized_diff,
            target_chaos_level,
            offset,
        }
    }
}

/// Box-filter an RGBA image down to `dst_w x dst_h`.
///
/// Each destination pixel averages the source block it covers. Works for any
/// ratio; when the source is smaller than the destination blocks collapse to
/// nearest-neighbour.
pub fn downsample_rgba(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
) -> Result<(), CaptureError> {
    let src_len = src_w as usize * src_h as usize * 4;
    if src.len() != src_len {
        return Err(CaptureError::FrameSize {
            expected: src_len,
            actual: src.len(),
        });
    }
    let dst_len = dst_w as usize * dst_h as usize * 4;
    if dst.len() != dst_len {
        return Err(CaptureError::FrameSize {
            expected: dst_len,
            actual: dst.len(),
        });
    }
    if src_w == 0 || src_h == 0 {
        dst.fill(0);
        return Ok(());
    }

    let (sw, sh) = (src_w as usize, src_h as usize);
    let (dw, dh) = (dst_w as usize, dst_h as usize);
    for dy in 0..dh {
        let y0 = dy * sh / dh;
        let y1 = ((dy + 1) * sh / dh).max(y0 + 1).min(sh);
        for dx in 0..dw {
            let x0 = dx * sw / dw;
            let x1 = ((dx + 1) * sw / dw).max(x0 + 1).min(sw);
            let mut acc = [0u32; 4];
            for sy in y0..y1 {
                let row = sy * sw;
                for sx in x0..x1 {
                    let s = (row + sx) * 4;
                    for (a, v) in acc.iter_mut().zip(&src[s..s + 4]) {
                        *a += *v as u32;
                    }
                }
            }
            let count = ((y1 - y0) * (x1 - x0)) as u32;
            let d = (dy * dw + dx) * 4;
            for (out, a) in dst[d..d + 4].iter_mut().zip(acc) {
                *out = (a / count) as u8;
            }
        }
    }
    Ok(())
}
