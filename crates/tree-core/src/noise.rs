//! 3D simplex noise (Ashima/Gustavson formulation) on the CPU.
//!
//! Same permutation polynomial and gradient construction as the usual GLSL
//! `snoise`, so CPU-side wind matches what a shader would produce. Output is
//! deterministic for a given input and stays within roughly `[-1, 1]`.

use glam::{Vec3, Vec4};

#[inline]
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + Vec4::ONE) * x)
}

#[inline]
fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_73
}

#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

pub fn simplex3(v: Vec3) -> f32 {
    const C_X: f32 = 1.0 / 6.0;
    const C_Y: f32 = 1.0 / 3.0;

    // first corner
    let mut i = (v + Vec3::splat(v.dot(Vec3::splat(C_Y)))).floor();
    let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(C_X)));

    // other corners
    let g = Vec3::new(step(x0.y, x0.x), step(x0.z, x0.y), step(x0.x, x0.z));
    let l = Vec3::ONE - g;
    let l_zxy = Vec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_zxy);
    let i2 = g.max(l_zxy);

    let x1 = x0 - i1 + Vec3::splat(C_X);
    let x2 = x0 - i2 + Vec3::splat(C_Y);
    let x3 = x0 - Vec3::splat(0.5);

    // permutations
    i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // gradients: 7x7 points over a square, mapped onto an octahedron
    const N: f32 = 1.0 / 7.0;
    let ns = Vec3::new(2.0 * N, 0.5 * N - 1.0, N);

    let j = p - (p * ns.z * ns.z).floor() * 49.0;
    let x_ = (j * ns.z).floor();
    let y_ = (j - x_ * 7.0).floor();

    let x = x_ * ns.x + Vec4::splat(ns.y);
    let y = y_ * ns.x + Vec4::splat(ns.y);
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + Vec4::ONE;
    let s1 = b1.floor() * 2.0 + Vec4::ONE;
    let sh = -Vec4::new(step(h.x, 0.0), step(h.y, 0.0), step(h.z, 0.0), step(h.w, 0.0));

    let a0 = Vec4::new(b0.x, b0.z, b0.y, b0.w)
        + Vec4::new(s0.x, s0.z, s0.y, s0.w) * Vec4::new(sh.x, sh.x, sh.y, sh.y);
    let a1 = Vec4::new(b1.x, b1.z, b1.y, b1.w)
        + Vec4::new(s1.x, s1.z, s1.y, s1.w) * Vec4::new(sh.z, sh.z, sh.w, sh.w);

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    // normalise gradients
    let norm = taylor_inv_sqrt(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // mix final noise value
    let mut m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    m *= m;
    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}
