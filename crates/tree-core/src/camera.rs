//! The motion-steered camera rig and the view it produces.
//!
//! Front-ends read [`Camera`] once per frame to fill their uniforms; nothing
//! here touches a window or canvas.

use crate::config::CameraRigConfig;
use crate::control::ControlSignal;
use crate::smoothing::damp_vec3;
use glam::{Mat4, Vec3};

/// The rig's current eye and lens. Right-handed, looking from `eye` at `target`.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// `aspect` follows the render surface through [`CameraRig::set_aspect`].
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// World to clip space, as uploaded to the shader.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Eases the camera toward a target derived from the control offset, with a
/// small shake that grows with the chaos level.
pub struct CameraRig {
    config: CameraRigConfig,
    rate: f32,
    camera: Camera,
}

impl CameraRig {
    pub fn new(config: CameraRigConfig, rate: f32, aspect: f32) -> Self {
        let camera = Camera {
            eye: config.base_eye,
            target: config.look_at,
            up: Vec3::Y,
            aspect,
            fovy_radians: config.fovy_degrees.to_radians(),
            znear: config.znear,
            zfar: config.zfar,
        };
        Self {
            config,
            rate,
            camera,
        }
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    /// Where the eye wants to be at time `t` for `signal`.
    pub fn target_eye(&self, signal: &ControlSignal, t: f32) -> Vec3 {
        let c = &self.config;
        let shake = signal.chaos_level * c.shake_amplitude;
        let phase = t * c.shake_frequency;
        Vec3::new(
            c.base_eye.x + signal.camera_offset.x * c.offset_gain.x + phase.sin() * shake,
            c.base_eye.y + signal.camera_offset.y * c.offset_gain.y + phase.cos() * shake,
            c.base_eye.z,
        )
    }

    pub fn update(&mut self, signal: &ControlSignal, dt: f32, t: f32) {
        let target = self.target_eye(signal, t);
        self.camera.eye = damp_vec3(self.camera.eye, target, self.rate, dt);
        self.camera.target = self.config.look_at;
    }
}
