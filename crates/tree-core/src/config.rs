//! Named tunables for every subsystem.
//!
//! Most of these values were picked by eye rather than derived, so they are
//! exposed as configuration instead of being baked into the algorithms. The
//! `Default` impls carry the tuned values.

use crate::constants::*;
use crate::error::ConfigError;
use crate::geometry::ConeShape;
use glam::{Vec2, Vec3};

/// Frame-differencing parameters for [`crate::MotionEstimator`].
#[derive(Clone, Debug, PartialEq)]
pub struct MotionConfig {
    /// Width of the downsampled motion grid in pixels.
    pub width: u32,
    /// Height of the downsampled motion grid in pixels.
    pub height: u32,
    /// Per-pixel mean channel difference (0..255) a pixel must exceed to count.
    pub noise_threshold: f32,
    /// Saturation divisor: `normalized = diff / (w * h * divisor)`.
    /// Empirical; larger values need more motion to saturate.
    pub saturation_divisor: f32,
    /// `normalized > activation` means "unleash". Equality stays tree-formed.
    pub activation_threshold: f32,
    /// Scales the centered centroid (-0.5..0.5) into camera offset units.
    pub offset_scale: Vec2,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            noise_threshold: 30.0,
            saturation_divisor: 10.0,
            activation_threshold: 0.15,
            offset_scale: Vec2::new(4.0, 2.0),
        }
    }
}

impl MotionConfig {
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte length of one RGBA frame on the motion grid.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.pixel_count() * 4
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyMotionGrid {
                width: self.width,
                height: self.height,
            });
        }
        non_negative("noise_threshold", self.noise_threshold)?;
        positive("saturation_divisor", self.saturation_divisor)?;
        non_negative("activation_threshold", self.activation_threshold)?;
        Ok(())
    }
}

/// Damping rates (1/s) for the exponential smoother. Higher converges faster;
/// within 1% of the target after roughly `5 / rate` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothingRates {
    pub chaos: f32,
    pub ornament: f32,
    pub star: f32,
    pub camera: f32,
}

impl Default for SmoothingRates {
    fn default() -> Self {
        Self {
            chaos: 2.0,
            ornament: 4.0,
            star: 4.0,
            camera: 1.5,
        }
    }
}

impl SmoothingRates {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("chaos rate", self.chaos)?;
        non_negative("ornament rate", self.ornament)?;
        non_negative("star rate", self.star)?;
        non_negative("camera rate", self.camera)?;
        Ok(())
    }
}

/// Per-frame modulation applied on top of the position blend.
#[derive(Clone, Debug, PartialEq)]
pub struct MorphConfig {
    /// Peak wind displacement at chaos 0; scaled by `1 - chaos`.
    pub wind_amplitude: f32,
    pub wind_frequency: f32,
    pub wind_speed: f32,
    pub twinkle_speed: f32,
    /// Spatial phase weights for x and y in the twinkle sinusoid.
    pub twinkle_spatial: Vec2,
    /// Size multiplier at the twinkle peak is `1 + gain`.
    pub twinkle_gain: f32,
    pub ornament_scale_tree: f32,
    pub ornament_scale_chaos: f32,
    pub star_scale_tree: f32,
    pub star_scale_chaos: f32,
    pub star_pulse_speed: f32,
    pub star_pulse_depth: f32,
    pub star_spin_speed: f32,
    pub star_wobble: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            wind_amplitude: 0.2,
            wind_frequency: 0.5,
            wind_speed: 0.5,
            twinkle_speed: 4.0,
            twinkle_spatial: Vec2::new(20.0, 10.0),
            twinkle_gain: 2.0,
            ornament_scale_tree: 0.4,
            ornament_scale_chaos: 0.1,
            star_scale_tree: 1.5,
            star_scale_chaos: 0.5,
            star_pulse_speed: 3.0,
            star_pulse_depth: 0.1,
            star_spin_speed: 1.0,
            star_wobble: 0.1,
        }
    }
}

/// Ensemble sizes and the target volumes particles are sampled from.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub foliage_count: usize,
    /// Lights occupy the last `light_count` indices of the point ensemble.
    pub light_count: usize,
    pub ornament_count: usize,
    pub tree_cone: ConeShape,
    pub ornament_cone: ConeShape,
    pub foliage_chaos_radius: f32,
    pub ornament_chaos_radius: f32,
    pub star_chaos_radius: f32,
    pub star_tree_position: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            foliage_count: FOLIAGE_COUNT,
            light_count: LIGHT_COUNT,
            ornament_count: ORNAMENT_COUNT,
            tree_cone: ConeShape {
                height: TREE_HEIGHT,
                base_radius: TREE_BASE_RADIUS,
                y_offset: TREE_Y_OFFSET,
                ..ConeShape::default()
            },
            ornament_cone: ConeShape {
                height: ORNAMENT_TREE_HEIGHT,
                base_radius: ORNAMENT_TREE_BASE_RADIUS,
                y_offset: ORNAMENT_TREE_Y_OFFSET,
                ..ConeShape::default()
            },
            foliage_chaos_radius: FOLIAGE_CHAOS_RADIUS,
            ornament_chaos_radius: ORNAMENT_CHAOS_RADIUS,
            star_chaos_radius: STAR_CHAOS_RADIUS,
            star_tree_position: STAR_TREE_POSITION,
        }
    }
}

impl SceneConfig {
    /// Foliage plus lights: the size of the blended point buffer.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.foliage_count + self.light_count
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_count() == 0 {
            return Err(ConfigError::EmptyEnsemble);
        }
        positive("tree cone height", self.tree_cone.height)?;
        non_negative("tree cone radius", self.tree_cone.base_radius)?;
        positive("ornament cone height", self.ornament_cone.height)?;
        non_negative("ornament cone radius", self.ornament_cone.base_radius)?;
        non_negative("foliage chaos radius", self.foliage_chaos_radius)?;
        non_negative("ornament chaos radius", self.ornament_chaos_radius)?;
        non_negative("star chaos radius", self.star_chaos_radius)?;
        Ok(())
    }
}

/// Camera framing and how strongly the motion offset steers it.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRigConfig {
    pub base_eye: Vec3,
    pub look_at: Vec3,
    /// Multiplies the control-store camera offset (x, y).
    pub offset_gain: Vec2,
    /// Shake amplitude at chaos 1.
    pub shake_amplitude: f32,
    pub shake_frequency: f32,
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            base_eye: Vec3::new(0.0, 4.0, 20.0),
            look_at: Vec3::new(0.0, 4.0, 0.0),
            offset_gain: Vec2::new(5.0, 3.0),
            shake_amplitude: 0.1,
            shake_frequency: 2.0,
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 200.0,
        }
    }
}

/// Everything a [`crate::Session`] needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeConfig {
    pub motion: MotionConfig,
    pub rates: SmoothingRates,
    pub morph: MorphConfig,
    pub scene: SceneConfig,
    pub camera: CameraRigConfig,
}

impl TreeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.rates.validate()?;
        self.scene.validate()?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
