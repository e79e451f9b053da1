//! Random point distributions for the two target shapes plus role and color
//! assignment.
//!
//! Every sampler takes the random source explicitly so an ensemble can be
//! regenerated bit-for-bit from a seed.

use crate::constants::{CONE_INNER_FRACTION, CONE_TAPER_EXPONENT};
use glam::Vec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// Rendering treatment of a particle. Never affects the blend law.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Foliage,
    Light,
    Ornament,
}

/// Cone volume used for the "tree" targets.
///
/// - `height`: axis length; sampled `y` spans `[y_offset, y_offset + height]`
/// - `base_radius`: radius at the bottom of the cone
/// - `taper_exponent`: exponent applied to `(1 - h)`; below 1 gives a fuller
///   silhouette than a linear taper
/// - `inner_fraction`: minimum radial fraction so the axis is not overfilled
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeShape {
    pub height: f32,
    pub base_radius: f32,
    pub y_offset: f32,
    pub taper_exponent: f32,
    pub inner_fraction: f32,
}

impl Default for ConeShape {
    fn default() -> Self {
        Self {
            height: 1.0,
            base_radius: 1.0,
            y_offset: 0.0,
            taper_exponent: CONE_TAPER_EXPONENT,
            inner_fraction: CONE_INNER_FRACTION,
        }
    }
}

impl ConeShape {
    /// Silhouette radius at normalized height `h` in `[0, 1]`.
    #[inline]
    pub fn radius_at(&self, h: f32) -> f32 {
        self.base_radius * (1.0 - h).clamp(0.0, 1.0).powf(self.taper_exponent)
    }
}

/// Uniform-by-volume point inside a sphere of `radius` centered at the origin.
///
/// The radial coordinate is `cbrt(u) * radius`; scaling `u` linearly would
/// pile points up near the center.
pub fn sample_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Point inside `shape`, biased toward the lateral surface.
pub fn sample_cone<R: Rng + ?Sized>(rng: &mut R, shape: &ConeShape) -> Vec3 {
    let h = rng.gen::<f32>();
    let envelope = shape.radius_at(h);
    let theta = TAU * rng.gen::<f32>();
    let inner = shape.inner_fraction.clamp(0.0, 1.0);
    let r = envelope * (inner + (1.0 - inner) * rng.gen::<f32>().sqrt());
    Vec3::new(
        r * theta.cos(),
        h * shape.height + shape.y_offset,
        r * theta.sin(),
    )
}

/// Index-range role split: the last `light_count` of `total` are lights.
#[inline]
pub fn role_for_index(index: usize, total: usize, light_count: usize) -> Role {
    if index >= total.saturating_sub(light_count) {
        Role::Light
    } else {
        Role::Foliage
    }
}

/// Discrete color palette with relative weights.
#[derive(Clone, Debug)]
pub struct WeightedPalette {
    colors: SmallVec<[Vec3; 4]>,
    index: WeightedIndex<u32>,
}

impl WeightedPalette {
    /// Returns `None` for an empty palette or when all weights are zero.
    pub fn new(entries: &[([f32; 3], u32)]) -> Option<Self> {
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w)).ok()?;
        let colors = entries.iter().map(|(c, _)| Vec3::from(*c)).collect();
        Some(Self { colors, index })
    }

    #[inline]
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.colors[self.index.sample(rng)]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
