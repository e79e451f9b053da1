// Host-side tests for the end-to-end loop: capture -> motion -> store ->
// morph -> camera, including sensor loss and manual override.

use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;
use tree_core::*;

const DT: f32 = 1.0 / 60.0;

fn config() -> TreeConfig {
    TreeConfig {
        scene: SceneConfig {
            foliage_count: 300,
            light_count: 50,
            ornament_count: 20,
            ..SceneConfig::default()
        },
        ..TreeConfig::default()
    }
}

fn session() -> Session {
    Session::new(config(), 42, 16.0 / 9.0).unwrap()
}

fn run(session: &mut Session, frames: u32, start: &mut f32) {
    for _ in 0..frames {
        *start += DT;
        session.frame(FrameTime {
            dt: DT,
            elapsed: *start,
            frame: 0,
        });
    }
}

/// Replay source that reports when it is released.
struct Tracked {
    inner: ReplaySource,
    released: Rc<Cell<bool>>,
}

impl FrameSource for Tracked {
    fn resolution(&self) -> (u32, u32) {
        self.inner.resolution()
    }
    fn frame_available(&mut self) -> bool {
        self.inner.frame_available()
    }
    fn read_frame(&mut self, dst: &mut [u8]) -> Result<(), CaptureError> {
        self.inner.read_frame(dst)
    }
    fn release(&mut self) {
        self.inner.release();
        self.released.set(true);
    }
}

fn tracked(replay: ReplaySource) -> (Box<dyn FrameSource>, Rc<Cell<bool>>) {
    let flag = Rc::new(Cell::new(false));
    let source = Tracked {
        inner: replay,
        released: flag.clone(),
    };
    (Box::new(source), flag)
}

#[test]
fn manual_target_converges_in_five_time_constants() {
    let mut s = session();
    let mut t = 0.0;
    s.set_target_chaos_level(1.0);
    // chaos rate 2 -> 2.5 s
    run(&mut s, 150, &mut t);
    assert!(s.signal().chaos_level >= 0.99);
    s.set_target_chaos_level(0.0);
    run(&mut s, 150, &mut t);
    assert!(s.signal().chaos_level <= 0.01);
}

#[test]
fn still_camera_keeps_the_tree_formed() {
    let mut s = session();
    let mut replay = ReplaySource::new(64, 48);
    for _ in 0..10 {
        replay.push_solid([40, 40, 40]);
    }
    s.attach_source(Box::new(replay));
    assert!(s.signal().sensor_active);
    assert_eq!(s.poll_motion(), PollOutcome::Baseline);
    let mut t = 0.0;
    for _ in 0..9 {
        assert_eq!(
            s.poll_motion(),
            PollOutcome::Updated {
                target_chaos_level: 0.0,
                motion_pixels: 0
            }
        );
        run(&mut s, 1, &mut t);
    }
    assert_eq!(s.poll_motion(), PollOutcome::Waiting);
    assert_eq!(s.signal().chaos_level, 0.0);
    assert_eq!(s.signal().status_label(), "TREE FORMED");
}

#[test]
fn motion_unleashes_then_settles() {
    let mut s = session();
    let mut replay = ReplaySource::new(64, 48);
    replay.push_solid([0, 0, 0]);
    replay.push_solid([255, 255, 255]);
    replay.push_solid([255, 255, 255]);
    s.attach_source(Box::new(replay));

    assert_eq!(s.poll_motion(), PollOutcome::Baseline);
    assert!(matches!(
        s.poll_motion(),
        PollOutcome::Updated {
            target_chaos_level: t,
            ..
        } if t == 1.0
    ));
    assert_eq!(s.signal().status_label(), "CHAOS UNLEASHED");
    let mut t = 0.0;
    run(&mut s, 30, &mut t);
    let risen = s.signal().chaos_level;
    assert!(risen > 0.5);

    assert!(matches!(
        s.poll_motion(),
        PollOutcome::Updated {
            target_chaos_level: t,
            ..
        } if t == 0.0
    ));
    run(&mut s, 30, &mut t);
    assert!(s.signal().chaos_level < risen);
}

#[test]
fn oversized_frames_are_downsampled_to_the_grid() {
    let mut s = session();
    let mut replay = ReplaySource::new(128, 96);
    replay.push_solid([0, 0, 0]);
    replay.push_solid([255, 255, 255]);
    s.attach_source(Box::new(replay));
    assert_eq!(s.poll_motion(), PollOutcome::Baseline);
    assert_eq!(
        s.poll_motion(),
        PollOutcome::Updated {
            target_chaos_level: 1.0,
            motion_pixels: 64 * 48
        }
    );
}

#[test]
fn disconnect_mid_session_keeps_rendering() {
    let mut s = session();
    let mut replay = ReplaySource::new(64, 48);
    replay.push_solid([0, 0, 0]);
    replay.push_solid([255, 255, 255]);
    replay.fail_with(CaptureError::Disconnected);
    let (source, released) = tracked(replay);
    s.attach_source(source);

    assert_eq!(s.poll_motion(), PollOutcome::Baseline);
    assert!(matches!(s.poll_motion(), PollOutcome::Updated { .. }));
    let mut t = 0.0;
    run(&mut s, 20, &mut t);
    let before = s.signal().chaos_level;
    assert!(before > 0.0);

    assert_eq!(
        s.poll_motion(),
        PollOutcome::Failed(CaptureError::Disconnected)
    );
    assert!(released.get());
    assert!(!s.capture_running());
    assert!(!s.signal().sensor_active);
    assert_eq!(s.poll_motion(), PollOutcome::Idle);

    // the level is not reset by the failure
    assert_eq!(s.signal().chaos_level, before);
    run(&mut s, 20, &mut t);
    assert!(s.signal().chaos_level >= before);

    // manual override still drives the morph
    s.set_target_chaos_level(0.0);
    run(&mut s, 200, &mut t);
    assert!(s.signal().chaos_level < 0.01);
}

#[test]
fn permission_denied_falls_back_to_manual_control() {
    let mut s = session();
    s.capture_failed(&CaptureError::PermissionDenied);
    assert!(!s.signal().sensor_active);
    assert!(!s.capture_running());
    assert_eq!(s.poll_motion(), PollOutcome::Idle);

    let mut t = 0.0;
    run(&mut s, 10, &mut t);
    assert_eq!(s.signal().chaos_level, 0.0);

    s.toggle_override();
    run(&mut s, 150, &mut t);
    assert!(s.signal().chaos_level >= 0.99);
}

#[test]
fn override_wins_until_released() {
    let mut s = session();
    let mut replay = ReplaySource::new(64, 48);
    replay.push_solid([0, 0, 0]);
    replay.push_solid([255, 255, 255]);
    replay.push_solid([0, 0, 0]);
    s.attach_source(Box::new(replay));

    s.set_target_chaos_level(0.0);
    s.poll_motion();
    s.poll_motion();
    assert_eq!(s.signal().target_chaos_level, 0.0);
    assert!(s.signal().manual_override);

    s.release_override();
    s.poll_motion();
    assert_eq!(s.signal().target_chaos_level, 1.0);
}

#[test]
fn stop_capture_releases_the_device() {
    let mut s = session();
    let mut replay = ReplaySource::new(64, 48);
    replay.push_solid([1, 2, 3]);
    let (source, released) = tracked(replay);
    s.attach_source(source);
    assert!(s.capture_running());
    s.stop_capture();
    assert!(released.get());
    assert!(!s.signal().sensor_active);
}

#[test]
fn dropping_the_session_releases_the_device() {
    let (source, released) = tracked(ReplaySource::new(64, 48));
    {
        let mut s = session();
        s.attach_source(source);
    }
    assert!(released.get());
}

#[test]
fn reattaching_replaces_the_previous_source() {
    let mut s = session();
    let (first, first_released) = tracked(ReplaySource::new(64, 48));
    s.attach_source(first);
    let mut replay = ReplaySource::new(64, 48);
    replay.push_solid([0, 0, 0]);
    s.attach_source(Box::new(replay));
    assert!(first_released.get());
    assert!(s.capture_running());
    // fresh baseline for the new device
    assert_eq!(s.poll_motion(), PollOutcome::Baseline);
}

#[test]
fn camera_follows_the_motion_offset() {
    let mut s = session();
    let rig = CameraRigConfig::default();
    let base = s.camera().eye;
    assert_eq!(base, rig.base_eye);

    s.store_mut().set_camera_offset(Vec2::new(1.0, 0.0));
    let mut t = 0.0;
    // camera rate 1.5 -> about 3.3 s
    run(&mut s, 240, &mut t);
    let eye = s.camera().eye;
    assert!((eye.x - rig.offset_gain.x).abs() < 0.05, "eye {eye:?}");
    assert!((eye.y - rig.base_eye.y).abs() < 0.05);
    assert_eq!(eye.z, rig.base_eye.z);
    assert_eq!(s.camera().target, rig.look_at);
}

#[test]
fn camera_shake_scales_with_chaos() {
    let rig = CameraRig::new(CameraRigConfig::default(), 1.5, 1.0);
    let calm = ControlSignal::default();
    let wild = ControlSignal {
        chaos_level: 1.0,
        ..ControlSignal::default()
    };
    let t = 0.3;
    let base = CameraRigConfig::default().base_eye;
    assert_eq!(rig.target_eye(&calm, t), base);
    let shaken = rig.target_eye(&wild, t) - base;
    assert!(shaken.length() > 0.0 && shaken.length() <= 0.1 * 2f32.sqrt() + 1e-6);
}

#[test]
fn aspect_updates_ignore_degenerate_sizes() {
    let mut s = session();
    s.set_aspect(2.0);
    assert_eq!(s.camera().aspect, 2.0);
    s.set_aspect(0.0);
    s.set_aspect(f32::NAN);
    assert_eq!(s.camera().aspect, 2.0);
    assert!(s.camera().view_proj().is_finite());
}

#[test]
fn look_at_point_lands_in_the_middle_of_the_screen() {
    let rig = CameraRig::new(CameraRigConfig::default(), 1.5, 16.0 / 9.0);
    let cam = rig.camera();
    let clip = cam.view_proj() * cam.target.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);

    // the star sits above the look-at point, so it projects upward
    let crown = cam.view_proj() * STAR_TREE_POSITION.extend(1.0);
    assert!(crown.y / crown.w > 0.0);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut cfg = config();
    cfg.motion.height = 0;
    assert!(matches!(
        Session::new(cfg, 1, 1.0),
        Err(ConfigError::EmptyMotionGrid { .. })
    ));
}
