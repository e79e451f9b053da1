//! Everything a frontend drives per frame, bundled.
//!
//! The motion side (`poll_motion`) and the render side (`frame`) are separate
//! entry points so a frontend can run them on different cadences; they only
//! meet in the [`ControlStore`].

use crate::camera::{Camera, CameraRig};
use crate::capture::FrameSource;
use crate::clock::FrameTime;
use crate::config::TreeConfig;
use crate::control::{ControlSignal, ControlStore};
use crate::error::{CaptureError, ConfigError};
use crate::morph::ParticleMorphEngine;
use crate::motion_loop::{MotionLoop, PollOutcome};

pub struct Session {
    store: ControlStore,
    motion: MotionLoop,
    engine: ParticleMorphEngine,
    rig: CameraRig,
}

impl Session {
    pub fn new(config: TreeConfig, seed: u64, aspect: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let TreeConfig {
            motion,
            rates,
            morph,
            scene,
            camera,
        } = config;
        let camera_rate = rates.camera;
        Ok(Self {
            store: ControlStore::new(),
            motion: MotionLoop::new(motion),
            engine: ParticleMorphEngine::new(scene, morph, rates, seed)?,
            rig: CameraRig::new(camera, camera_rate, aspect),
        })
    }

    #[inline]
    pub fn signal(&self) -> ControlSignal {
        self.store.signal()
    }

    #[inline]
    pub fn store(&self) -> &ControlStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut ControlStore {
        &mut self.store
    }

    #[inline]
    pub fn engine(&self) -> &ParticleMorphEngine {
        &self.engine
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        self.rig.camera()
    }

    #[inline]
    pub fn capture_running(&self) -> bool {
        self.motion.is_running()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.rig.set_aspect(aspect);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }

    pub fn attach_source(&mut self, source: Box<dyn FrameSource>) {
        self.motion.attach(source, &mut self.store);
    }

    /// Opening the camera failed; the session keeps running without a sensor.
    pub fn capture_failed(&mut self, err: &CaptureError) {
        self.motion.attach_failed(err, &mut self.store);
    }

    pub fn stop_capture(&mut self) {
        self.motion.detach(&mut self.store);
    }

    /// Motion side: consume at most one camera frame.
    pub fn poll_motion(&mut self) -> PollOutcome {
        self.motion.poll(&mut self.store)
    }

    /// Render side: smooth the level, rebuild instance buffers, ease the camera.
    pub fn frame(&mut self, time: FrameTime) {
        self.engine.advance(&mut self.store, time.dt, time.elapsed);
        let signal = self.store.signal();
        self.rig.update(&signal, time.dt, time.elapsed);
    }

    // manual override passthroughs for UI code

    pub fn set_target_chaos_level(&mut self, level: f32) {
        self.store.set_target_chaos_level(level);
    }

    pub fn toggle_override(&mut self) {
        self.store.toggle_override();
    }

    pub fn release_override(&mut self) {
        self.store.release_override();
    }
}
