// Host-side tests for frame differencing, the simulated camera and the
// box-filter downsampler.

use glam::Vec2;
use tree_core::*;

fn solid(cfg: &MotionConfig, v: u8) -> Vec<u8> {
    let mut frame = Vec::with_capacity(cfg.frame_len());
    for _ in 0..cfg.pixel_count() {
        frame.extend_from_slice(&[v, v, v, 255]);
    }
    frame
}

fn paint(cfg: &MotionConfig, frame: &mut [u8], x0: u32, y0: u32, w: u32, h: u32, v: u8) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let i = ((y * cfg.width + x) * 4) as usize;
            frame[i..i + 3].copy_from_slice(&[v, v, v]);
        }
    }
}

fn measured(outcome: MotionOutcome) -> MotionSample {
    match outcome {
        MotionOutcome::Measured(sample) => sample,
        MotionOutcome::Baseline => panic!("expected a measurement, got baseline"),
    }
}

#[test]
fn first_frame_only_primes_the_baseline() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    assert_eq!(est.process(&solid(&cfg, 10)).unwrap(), MotionOutcome::Baseline);
    assert!(matches!(
        est.process(&solid(&cfg, 10)).unwrap(),
        MotionOutcome::Measured(_)
    ));
}

#[test]
fn identical_frames_produce_no_motion() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let frame = solid(&cfg, 128);
    est.process(&frame).unwrap();
    let s = measured(est.process(&frame).unwrap());
    assert_eq!(s.diff_score, 0.0);
    assert_eq!(s.motion_pixels, 0);
    assert_eq!(s.normalized_diff, 0.0);
    assert_eq!(s.target_chaos_level, 0.0);
    assert!(s.centroid.is_none());
    assert_eq!(s.offset, Vec2::ZERO);
}

#[test]
fn full_frame_flash_saturates_and_unleashes() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    est.process(&solid(&cfg, 0)).unwrap();
    let s = measured(est.process(&solid(&cfg, 255)).unwrap());
    assert_eq!(s.motion_pixels, 64 * 48);
    assert_eq!(s.normalized_diff, 1.0);
    assert_eq!(s.target_chaos_level, 1.0);
    assert!(s.is_unleashed());
    let c = s.centroid.expect("centroid");
    assert!((c.x - 31.5).abs() < 1e-4 && (c.y - 23.5).abs() < 1e-4);
}

#[test]
fn small_change_stays_tree_formed() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let before = solid(&cfg, 0);
    let mut after = before.clone();
    paint(&cfg, &mut after, 0, 0, 4, 4, 200);
    est.process(&before).unwrap();
    let s = measured(est.process(&after).unwrap());
    assert_eq!(s.motion_pixels, 16);
    assert!(s.normalized_diff > 0.0 && s.normalized_diff < cfg.activation_threshold);
    assert_eq!(s.target_chaos_level, 0.0);
}

#[test]
fn centroid_steers_the_offset() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let before = solid(&cfg, 0);
    let mut after = before.clone();
    // bottom-right corner block
    paint(&cfg, &mut after, 56, 40, 8, 8, 255);
    est.process(&before).unwrap();
    let s = measured(est.process(&after).unwrap());
    let c = s.centroid.expect("centroid");
    assert!((c.x - 59.5).abs() < 1e-4);
    assert!((c.y - 43.5).abs() < 1e-4);
    let expected = Vec2::new((59.5 / 64.0 - 0.5) * 4.0, (43.5 / 48.0 - 0.5) * 2.0);
    assert!((s.offset - expected).length() < 1e-5);
    assert!(s.offset.x > 0.0 && s.offset.y > 0.0);
    assert_eq!(est.offset(), s.offset);
}

#[test]
fn still_frame_retains_previous_offset() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let before = solid(&cfg, 0);
    let mut after = before.clone();
    paint(&cfg, &mut after, 0, 0, 8, 8, 255);
    est.process(&before).unwrap();
    let moved = measured(est.process(&after).unwrap());
    let still = measured(est.process(&after).unwrap());
    assert_eq!(still.motion_pixels, 0);
    assert_ne!(moved.offset, Vec2::ZERO);
    assert_eq!(still.offset, moved.offset);
}

#[test]
fn pixels_at_the_noise_threshold_do_not_count() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    est.process(&solid(&cfg, 100)).unwrap();
    let s = measured(est.process(&solid(&cfg, 130)).unwrap());
    assert_eq!(s.motion_pixels, 0);
    let s = measured(est.process(&solid(&cfg, 161)).unwrap());
    assert_eq!(s.motion_pixels, 64 * 48);
}

#[test]
fn activation_tie_stays_tree_formed() {
    // 10x1 grid with divisor 10: one pixel changing by 50 normalizes to 0.5.
    let base = MotionConfig {
        width: 10,
        height: 1,
        activation_threshold: 0.5,
        ..MotionConfig::default()
    };
    let before = solid(&base, 0);
    let mut after = before.clone();
    paint(&base, &mut after, 3, 0, 1, 1, 50);

    let mut est = MotionEstimator::new(base.clone());
    est.process(&before).unwrap();
    let s = measured(est.process(&after).unwrap());
    assert_eq!(s.normalized_diff, 0.5);
    assert_eq!(s.target_chaos_level, 0.0);

    let lower = MotionConfig {
        activation_threshold: 0.49,
        ..base
    };
    let mut est = MotionEstimator::new(lower);
    est.process(&before).unwrap();
    let s = measured(est.process(&after).unwrap());
    assert_eq!(s.target_chaos_level, 1.0);
}

#[test]
fn alpha_channel_is_ignored() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let before = solid(&cfg, 50);
    let mut after = before.clone();
    for px in after.chunks_exact_mut(4) {
        px[3] = 0;
    }
    est.process(&before).unwrap();
    assert_eq!(measured(est.process(&after).unwrap()).motion_pixels, 0);
}

#[test]
fn wrong_frame_size_is_rejected_without_consuming_baseline() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let err = est.process(&[0u8; 16]).unwrap_err();
    assert_eq!(
        err,
        CaptureError::FrameSize {
            expected: cfg.frame_len(),
            actual: 16
        }
    );
    assert_eq!(est.process(&solid(&cfg, 0)).unwrap(), MotionOutcome::Baseline);
}

#[test]
fn reset_requires_a_new_baseline_but_keeps_offset() {
    let cfg = MotionConfig::default();
    let mut est = MotionEstimator::new(cfg.clone());
    let before = solid(&cfg, 0);
    let mut after = before.clone();
    paint(&cfg, &mut after, 0, 0, 8, 8, 255);
    est.process(&before).unwrap();
    let s = measured(est.process(&after).unwrap());
    est.reset();
    assert_eq!(est.process(&before).unwrap(), MotionOutcome::Baseline);
    assert_eq!(est.offset(), s.offset);
}

#[test]
fn config_validation_rejects_degenerate_grids() {
    assert!(MotionConfig::default().validate().is_ok());
    let empty = MotionConfig {
        width: 0,
        ..MotionConfig::default()
    };
    assert_eq!(
        empty.validate(),
        Err(ConfigError::EmptyMotionGrid {
            width: 0,
            height: 48
        })
    );
    let bad_divisor = MotionConfig {
        saturation_divisor: 0.0,
        ..MotionConfig::default()
    };
    assert!(matches!(
        bad_divisor.validate(),
        Err(ConfigError::NonPositive { .. })
    ));
}

#[test]
fn downsample_averages_blocks() {
    // 4x2 source -> 2x1: left block two black + two white pixels, right all 200
    let mut src = Vec::new();
    for y in 0..2 {
        for x in 0..4 {
            let v = match (x, y) {
                (0, 0) | (1, 1) => 0u8,
                (0, 1) | (1, 0) => 255,
                _ => 200,
            };
            src.extend_from_slice(&[v, v, v, 255]);
        }
    }
    let mut dst = vec![0u8; 2 * 4];
    downsample_rgba(&src, 4, 2, &mut dst, 2, 1).unwrap();
    assert_eq!(&dst[0..4], &[127, 127, 127, 255]);
    assert_eq!(&dst[4..8], &[200, 200, 200, 255]);
}

#[test]
fn downsample_handles_upscaling_and_size_errors() {
    let src = vec![9u8, 8, 7, 255];
    let mut dst = vec![0u8; 3 * 2 * 4];
    downsample_rgba(&src, 1, 1, &mut dst, 3, 2).unwrap();
    for px in dst.chunks_exact(4) {
        assert_eq!(px, &[9, 8, 7, 255]);
    }
    let err = downsample_rgba(&src, 2, 2, &mut dst, 3, 2).unwrap_err();
    assert!(matches!(err, CaptureError::FrameSize { expected: 16, actual: 4 }));
}

#[test]
fn simulated_hand_follows_its_oscillator() {
    assert!(!SimulatedSource::hand_open(0.0));
    assert!(SimulatedSource::hand_open(std::f32::consts::FRAC_PI_2 / 0.7));
    assert!(!SimulatedSource::hand_open(3.0 * std::f32::consts::FRAC_PI_2 / 0.7));
}

#[test]
fn simulated_closed_hand_reads_as_still() {
    let cfg = MotionConfig::default();
    let mut cam = SimulatedSource::new(cfg.width, cfg.height, 30.0);
    let mut a = vec![0u8; cfg.frame_len()];
    let mut b = vec![0u8; cfg.frame_len()];
    cam.render_at(0.0, &mut a);
    cam.render_at(0.1, &mut b);
    let mut est = MotionEstimator::new(cfg);
    est.process(&a).unwrap();
    let s = measured(est.process(&b).unwrap());
    assert_eq!(s.motion_pixels, 0);
    assert_eq!(s.target_chaos_level, 0.0);
}

#[test]
fn simulated_open_hand_reads_as_motion() {
    let cfg = MotionConfig::default();
    let mut cam = SimulatedSource::new(cfg.width, cfg.height, 30.0);
    // 9t = 6pi puts the fast wave at its steepest
    let t = 6.0 * std::f32::consts::PI / 9.0;
    assert!(SimulatedSource::hand_open(t));
    let mut a = vec![0u8; cfg.frame_len()];
    let mut b = vec![0u8; cfg.frame_len()];
    cam.render_at(t, &mut a);
    cam.render_at(t + 1.0 / 30.0, &mut b);
    let mut est = MotionEstimator::new(cfg);
    est.process(&a).unwrap();
    let s = measured(est.process(&b).unwrap());
    assert!(s.motion_pixels > 0);
    assert!(s.is_unleashed(), "normalized {}", s.normalized_diff);
}
