//! Poll-driven glue between a [`FrameSource`], the [`MotionEstimator`] and the
//! [`ControlStore`].
//!
//! The loop owns the source for as long as it is attached. Detaching (or any
//! capture failure) releases the device immediately and marks the sensor
//! inactive; the control store keeps its last values so rendering carries on.

use crate::capture::FrameSource;
use crate::config::MotionConfig;
use crate::control::ControlStore;
use crate::error::CaptureError;
use crate::motion::{downsample_rgba, MotionEstimator, MotionOutcome};

/// What one call to [`MotionLoop::poll`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// No source attached.
    Idle,
    /// Source attached but no new frame yet.
    Waiting,
    /// Frame stored as baseline; nothing written to the store.
    Baseline,
    /// Frame measured and written to the store.
    Updated { target_chaos_level: f32, motion_pixels: u32 },
    /// The source failed and has been released.
    Failed(CaptureError),
}

pub struct MotionLoop {
    estimator: MotionEstimator,
    source: Option<Box<dyn FrameSource>>,
    raw: Vec<u8>,
    grid: Vec<u8>,
    frames_measured: u64,
}

impl MotionLoop {
    pub fn new(config: MotionConfig) -> Self {
        let grid = vec![0; config.frame_len()];
        Self {
            estimator: MotionEstimator::new(config),
            source: None,
            raw: Vec::new(),
            grid,
            frames_measured: 0,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    #[inline]
    pub fn estimator(&self) -> &MotionEstimator {
        &self.estimator
    }

    #[inline]
    pub fn frames_measured(&self) -> u64 {
        self.frames_measured
    }

    /// Take ownership of `source` and start measuring. Replaces (and releases)
    /// any previously attached source. The first frame after attaching only
    /// primes the baseline.
    pub fn attach(&mut self, source: Box<dyn FrameSource>, store: &mut ControlStore) {
        self.release_source();
        let (w, h) = source.resolution();
        self.raw.resize(w as usize * h as usize * 4, 0);
        self.estimator.reset();
        self.source = Some(source);
        log::info!("[capture] source attached ({}x{})", w, h);
        store.set_sensor_active(true);
    }

    /// Opening the camera failed: record it and keep running without a sensor.
    pub fn attach_failed(&mut self, err: &CaptureError, store: &mut ControlStore) {
        log::warn!("[capture] unavailable: {}", err);
        self.release_source();
        store.set_sensor_active(false);
    }

    /// Stop measuring and release the device.
    pub fn detach(&mut self, store: &mut ControlStore) {
        if self.release_source() {
            log::info!("[capture] source detached");
        }
        store.set_sensor_active(false);
    }

    /// Process at most one frame. Never blocks.
    pub fn poll(&mut self, store: &mut ControlStore) -> PollOutcome {
        let Some(source) = self.source.as_mut() else {
            return PollOutcome::Idle;
        };
        if !source.frame_available() {
            return PollOutcome::Waiting;
        }
        if let Err(err) = source.read_frame(&mut self.raw) {
            return self.fail(err, store);
        }

        let (w, h) = source.resolution();
        let cfg = self.estimator.config();
        let frame: &[u8] = if (w, h) == (cfg.width, cfg.height) {
            &self.raw
        } else {
            if let Err(err) =
                downsample_rgba(&self.raw, w, h, &mut self.grid, cfg.width, cfg.height)
            {
                return self.fail(err, store);
            }
            &self.grid
        };

        match self.estimator.process(frame) {
            Ok(MotionOutcome::Baseline) => PollOutcome::Baseline,
            Ok(MotionOutcome::Measured(sample)) => {
                self.frames_measured += 1;
                store.apply_motion(sample.target_chaos_level, sample.offset);
                PollOutcome::Updated {
                    target_chaos_level: sample.target_chaos_level,
                    motion_pixels: sample.motion_pixels,
                }
            }
            Err(err) => self.fail(err, store),
        }
    }

    fn fail(&mut self, err: CaptureError, store: &mut ControlStore) -> PollOutcome {
        log::warn!("[capture] source failed: {}", err);
        self.release_source();
        store.set_sensor_active(false);
        PollOutcome::Failed(err)
    }

    fn release_source(&mut self) -> bool {
        match self.source.take() {
            Some(mut source) => {
                source.release();
                true
            }
            None => false,
        }
    }
}

impl Drop for MotionLoop {
    fn drop(&mut self) {
        self.release_source();
    }
}
