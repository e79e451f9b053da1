//! Frame-rate independent exponential damping.
//!
//! Stateless: the caller owns `current` and supplies `dt`, so the same helpers
//! drive the chaos level, ornament/star easing and the camera rig.

use glam::{Vec2, Vec3};

/// Fraction of the remaining distance covered in `dt` seconds at `rate` (1/s).
///
/// Always in `[0, 1]`. Zero for NaN or non-positive `rate * dt`, which holds
/// the value; one when the product is infinite, which snaps to the target.
#[inline]
pub fn damp_factor(rate: f32, dt: f32) -> f32 {
    let k = rate * dt;
    if k == f32::INFINITY {
        1.0
    } else if k > 0.0 {
        1.0 - (-k).exp()
    } else {
        0.0
    }
}

/// `current + (target - current) * (1 - exp(-rate * dt))`.
///
/// Converges monotonically with no overshoot; within 1% of `target` after
/// about `5 / rate` seconds regardless of how that time is sliced.
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let f = damp_factor(rate, dt);
    if current == target || f >= 1.0 {
        return target;
    }
    let next = current + (target - current) * f;
    // rounding must not carry the step past the target
    if target > current {
        next.min(target)
    } else {
        next.max(target)
    }
}

#[inline]
pub fn damp_vec2(current: Vec2, target: Vec2, rate: f32, dt: f32) -> Vec2 {
    let f = damp_factor(rate, dt);
    if f >= 1.0 {
        return target;
    }
    current.lerp(target, f)
}

#[inline]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let f = damp_factor(rate, dt);
    if f >= 1.0 {
        return target;
    }
    current.lerp(target, f)
}
