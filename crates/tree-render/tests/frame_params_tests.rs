// Host-side tests for the per-frame renderer inputs taken from the engine.

use glam::{Quat, Vec3};
use tree_core::*;
use tree_render::FrameParams;

fn engine() -> ParticleMorphEngine {
    let scene = SceneConfig {
        foliage_count: 200,
        light_count: 50,
        ornament_count: 10,
        ..SceneConfig::default()
    };
    ParticleMorphEngine::new(scene, MorphConfig::default(), SmoothingRates::default(), 3).unwrap()
}

#[test]
fn star_orientation_reaches_the_frame_params() {
    let mut e = engine();
    let at_start = FrameParams::for_engine(&e, 0.0);
    assert_eq!(at_start.star_orientation, Quat::IDENTITY);

    let dt = 1.0 / 60.0;
    for frame in 1..=60 {
        e.update(0.3, dt, frame as f32 * dt);
    }
    let params = FrameParams::for_engine(&e, 1.0);
    assert_eq!(params.elapsed, 1.0);
    assert_eq!(params.chaos_level, e.chaos_level());
    assert_eq!(params.star_orientation, e.star().orientation());
    assert!(params.star_orientation.angle_between(Quat::IDENTITY) > 0.5);
    let x = params.star_orientation * Vec3::X;
    assert!((x.length() - 1.0).abs() < 1e-5);
}
