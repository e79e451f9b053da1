//! Static per-particle data: dual targets, colors, sizes and roles.
//!
//! Stored as parallel flat arrays indexed by particle id. Nothing here changes
//! after generation; reseeding rebuilds the whole set.

use crate::config::SceneConfig;
use crate::constants::{
    FOLIAGE_PALETTE, FOLIAGE_SIZE_MIN, FOLIAGE_SIZE_SPAN, LIGHT_PALETTE, LIGHT_SIZE_MIN,
    LIGHT_SIZE_SPAN, ORNAMENT_PALETTE,
};
use crate::geometry::{role_for_index, sample_cone, sample_sphere, Role, WeightedPalette};
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Stream selectors mixed into the base seed so foliage, ornaments and the star
// draw from independent sequences.
const FIELD_STREAM: u64 = 1;
const ORNAMENT_STREAM: u64 = 2;
const STAR_STREAM: u64 = 3;

#[inline]
fn stream_rng(seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Foliage and light points. Lights are the trailing `light_count` entries.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    pub tree_positions: Vec<Vec3>,
    pub chaos_positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub base_sizes: Vec<f32>,
    pub roles: Vec<Role>,
    pub light_count: usize,
}

impl ParticleField {
    pub fn generate(scene: &SceneConfig, seed: u64) -> Self {
        let total = scene.point_count();
        let mut rng = stream_rng(seed, FIELD_STREAM);
        let foliage_palette = WeightedPalette::new(&FOLIAGE_PALETTE);
        let light_palette = WeightedPalette::new(&LIGHT_PALETTE);

        let mut field = Self {
            tree_positions: Vec::with_capacity(total),
            chaos_positions: Vec::with_capacity(total),
            colors: Vec::with_capacity(total),
            base_sizes: Vec::with_capacity(total),
            roles: Vec::with_capacity(total),
            light_count: scene.light_count,
        };

        for i in 0..total {
            field.tree_positions.push(sample_cone(&mut rng, &scene.tree_cone));
            field
                .chaos_positions
                .push(sample_sphere(&mut rng, scene.foliage_chaos_radius));

            let role = role_for_index(i, total, scene.light_count);
            let (palette, size_min, size_span) = match role {
                Role::Light => (&light_palette, LIGHT_SIZE_MIN, LIGHT_SIZE_SPAN),
                _ => (&foliage_palette, FOLIAGE_SIZE_MIN, FOLIAGE_SIZE_SPAN),
            };
            let color = palette
                .as_ref()
                .map(|p| p.pick(&mut rng))
                .unwrap_or(Vec3::ONE);
            field.colors.push(color);
            field.base_sizes.push(size_min + rng.gen::<f32>() * size_span);
            field.roles.push(role);
        }
        field
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree_positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree_positions.is_empty()
    }

    /// Index of the first light.
    #[inline]
    pub fn first_light(&self) -> usize {
        self.len().saturating_sub(self.light_count)
    }
}

/// Instanced ornament bodies: low cardinality, each eased independently.
#[derive(Clone, Debug, Default)]
pub struct OrnamentSet {
    pub tree_positions: Vec<Vec3>,
    pub chaos_positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    /// Eased positions carried between frames. Start at the origin so the
    /// tree assembles on the first frames.
    pub current: Vec<Vec3>,
}

impl OrnamentSet {
    pub fn generate(scene: &SceneConfig, seed: u64) -> Self {
        let n = scene.ornament_count;
        let mut rng = stream_rng(seed, ORNAMENT_STREAM);
        let palette = WeightedPalette::new(&ORNAMENT_PALETTE);
        let mut set = Self {
            tree_positions: Vec::with_capacity(n),
            chaos_positions: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
            current: vec![Vec3::ZERO; n],
        };
        for _ in 0..n {
            set.tree_positions
                .push(sample_cone(&mut rng, &scene.ornament_cone));
            set.chaos_positions
                .push(sample_sphere(&mut rng, scene.ornament_chaos_radius));
            set.colors.push(
                palette
                    .as_ref()
                    .map(|p| p.pick(&mut rng))
                    .unwrap_or(Vec3::ONE),
            );
        }
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree_positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree_positions.is_empty()
    }
}

/// Crown star: one body with its own target pair and eased state.
#[derive(Clone, Debug, Default)]
pub struct StarState {
    pub tree_position: Vec3,
    pub chaos_position: Vec3,
    pub current: Vec3,
    pub scale: f32,
    /// Spin about Y in radians, accumulated from `dt`.
    pub rotation_y: f32,
    /// Wobble about Z in radians.
    pub rotation_z: f32,
}

impl StarState {
    pub fn generate(scene: &SceneConfig, seed: u64) -> Self {
        let mut rng = stream_rng(seed, STAR_STREAM);
        Self {
            tree_position: scene.star_tree_position,
            chaos_position: sample_sphere(&mut rng, scene.star_chaos_radius),
            current: Vec3::ZERO,
            scale: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
        }
    }

    /// Object-to-world rotation: the Z wobble tilts the star, then the
    /// Y spin turns it about the world vertical.
    #[inline]
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_y) * Quat::from_rotation_z(self.rotation_z)
    }
}
