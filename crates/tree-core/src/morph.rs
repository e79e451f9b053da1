//! Particle morph engine.
//!
//! Owns the static dual targets of every particle and recomputes the rendered
//! instance buffers each frame as `lerp(tree, chaos, level)` plus bounded,
//! time-based modulation. Buffers are flat `Pod` arrays sized once at
//! generation; the per-frame pass does not allocate.

use crate::config::{MorphConfig, SceneConfig, SmoothingRates};
use crate::control::ControlStore;
use crate::error::ConfigError;
use crate::geometry::Role;
use crate::noise::simplex3;
use crate::particles::{OrnamentSet, ParticleField, StarState};
use crate::smoothing::{damp, damp_vec3};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One blended foliage/light point, laid out for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    /// 1.0 for lights, 0.0 for foliage.
    pub light: f32,
}

/// One instanced body (ornament or star).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 3],
    /// 0 for ornaments, > 0 for self-lit bodies like the star.
    pub emissive: f32,
}

pub struct ParticleMorphEngine {
    scene: SceneConfig,
    morph: MorphConfig,
    rates: SmoothingRates,
    seed: u64,
    field: ParticleField,
    ornaments: OrnamentSet,
    star: StarState,
    star_color: Vec3,
    chaos_level: f32,
    points: Vec<PointInstance>,
    // ornaments followed by the star
    bodies: Vec<BodyInstance>,
}

impl ParticleMorphEngine {
    pub fn new(
        scene: SceneConfig,
        morph: MorphConfig,
        rates: SmoothingRates,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        scene.validate()?;
        rates.validate()?;
        let mut engine = Self {
            scene,
            morph,
            rates,
            seed,
            field: ParticleField::default(),
            ornaments: OrnamentSet::default(),
            star: StarState::default(),
            star_color: Vec3::from(crate::constants::STAR_COLOR),
            chaos_level: 0.0,
            points: Vec::new(),
            bodies: Vec::new(),
        };
        engine.reseed(seed);
        Ok(engine)
    }

    /// Regenerate every particle, ornament and the star from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.field = ParticleField::generate(&self.scene, seed);
        self.ornaments = OrnamentSet::generate(&self.scene, seed);
        self.star = StarState::generate(&self.scene, seed);
        self.points = vec![PointInstance::zeroed(); self.field.len()];
        self.bodies = vec![BodyInstance::zeroed(); self.ornaments.len() + 1];
        log::info!(
            "[morph] generated {} points ({} lights), {} ornaments, seed {:#x}",
            self.field.len(),
            self.field.light_count.min(self.field.len()),
            self.ornaments.len(),
            seed
        );
        self.update(self.chaos_level, 0.0, 0.0);
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn chaos_level(&self) -> f32 {
        self.chaos_level
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.field.len()
    }

    #[inline]
    pub fn ornament_count(&self) -> usize {
        self.ornaments.len()
    }

    #[inline]
    pub fn role(&self, index: usize) -> Option<Role> {
        self.field.roles.get(index).copied()
    }

    /// Copy of the `(tree, chaos)` targets of point `index`.
    pub fn target_pair(&self, index: usize) -> Option<(Vec3, Vec3)> {
        Some((
            *self.field.tree_positions.get(index)?,
            *self.field.chaos_positions.get(index)?,
        ))
    }

    /// Copy of the `(tree, chaos)` targets of ornament `index`.
    pub fn ornament_target_pair(&self, index: usize) -> Option<(Vec3, Vec3)> {
        Some((
            *self.ornaments.tree_positions.get(index)?,
            *self.ornaments.chaos_positions.get(index)?,
        ))
    }

    /// The pure blend for point `index`, without any modulation.
    #[inline]
    pub fn blend_position(&self, index: usize, chaos_level: f32) -> Option<Vec3> {
        let (tree, chaos) = self.target_pair(index)?;
        Some(blend(tree, chaos, chaos_level.clamp(0.0, 1.0)))
    }

    pub fn point_instances(&self) -> &[PointInstance] {
        &self.points
    }

    /// Ornaments followed by the star as the final entry.
    pub fn body_instances(&self) -> &[BodyInstance] {
        &self.bodies
    }

    pub fn ornament_instances(&self) -> &[BodyInstance] {
        &self.bodies[..self.ornaments.len()]
    }

    pub fn star(&self) -> &StarState {
        &self.star
    }

    /// Smooth the store's level toward its target, write it back, then
    /// recompute all buffers.
    pub fn advance(&mut self, store: &mut ControlStore, dt: f32, elapsed: f32) {
        let level = damp(
            store.chaos_level(),
            store.target_chaos_level(),
            self.rates.chaos,
            dt,
        );
        store.set_chaos_level(level);
        self.update(store.chaos_level(), dt, elapsed);
    }

    /// Recompute buffers for an explicit level; `dt` drives only the
    /// ornament/star easing.
    pub fn update(&mut self, chaos_level: f32, dt: f32, elapsed: f32) {
        let level = chaos_level.clamp(0.0, 1.0);
        self.chaos_level = level;
        self.update_points(level, elapsed);
        self.update_ornaments(level, dt);
        self.update_star(level, dt, elapsed);
    }

    fn update_points(&mut self, level: f32, t: f32) {
        let m = &self.morph;
        let wind = m.wind_amplitude * (1.0 - level);
        let wind_phase = Vec3::splat(t * m.wind_speed);
        let twinkle_phase = t * m.twinkle_speed;

        let field = &self.field;
        let targets = field.tree_positions.iter().zip(&field.chaos_positions);
        let attrs = field.colors.iter().zip(&field.base_sizes).zip(&field.roles);
        for (out, ((tree, chaos), ((color, size), role))) in
            self.points.iter_mut().zip(targets.zip(attrs))
        {
            let blended = blend(*tree, *chaos, level);
            let mut pos = blended;
            if wind > 0.0 {
                let n = simplex3(blended * m.wind_frequency + wind_phase);
                pos += Vec3::splat(n * wind);
            }
            let is_light = *role == Role::Light;
            let size = if is_light {
                let phase = twinkle_phase
                    + blended.x * m.twinkle_spatial.x
                    + blended.y * m.twinkle_spatial.y;
                let twinkle = phase.sin() * 0.5 + 0.5;
                *size * (1.0 + twinkle * m.twinkle_gain)
            } else {
                *size
            };
            *out = PointInstance {
                position: pos.to_array(),
                size,
                color: color.to_array(),
                light: if is_light { 1.0 } else { 0.0 },
            };
        }
    }

    fn update_ornaments(&mut self, level: f32, dt: f32) {
        let scale = lerp(
            self.morph.ornament_scale_tree,
            self.morph.ornament_scale_chaos,
            level,
        );
        let rate = self.rates.ornament;
        let set = &mut self.ornaments;
        for (i, out) in self.bodies.iter_mut().take(set.len()).enumerate() {
            let target = blend(set.tree_positions[i], set.chaos_positions[i], level);
            set.current[i] = damp_vec3(set.current[i], target, rate, dt);
            *out = BodyInstance {
                position: set.current[i].to_array(),
                scale,
                color: set.colors[i].to_array(),
                emissive: 0.0,
            };
        }
    }

    fn update_star(&mut self, level: f32, dt: f32, t: f32) {
        let m = &self.morph;
        let star = &mut self.star;
        let target = blend(star.tree_position, star.chaos_position, level);
        star.current = damp_vec3(star.current, target, self.rates.star, dt);
        star.rotation_y += dt * m.star_spin_speed;
        star.rotation_z = t.sin() * m.star_wobble;
        star.scale = lerp(m.star_scale_tree, m.star_scale_chaos, level)
            * (1.0 + (t * m.star_pulse_speed).sin() * m.star_pulse_depth);
        if let Some(out) = self.bodies.last_mut() {
            *out = BodyInstance {
                position: star.current.to_array(),
                scale: star.scale,
                color: self.star_color.to_array(),
                emissive: 4.0,
            };
        }
    }
}

/// `tree * (1 - level) + chaos * level`. Reproduces either target exactly at
/// level 0 and 1, which `a + (b - a) * t` does not guarantee.
#[inline]
pub fn blend(tree: Vec3, chaos: Vec3, level: f32) -> Vec3 {
    tree * (1.0 - level) + chaos * level
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
