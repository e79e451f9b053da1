// Host-side tests for the shared control store and manual override.

use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use tree_core::*;

#[test]
fn store_starts_tree_formed_without_sensor() {
    let store = ControlStore::new();
    let s = store.signal();
    assert_eq!(s.chaos_level, 0.0);
    assert_eq!(s.target_chaos_level, 0.0);
    assert_eq!(s.camera_offset, Vec2::ZERO);
    assert!(!s.sensor_active);
    assert!(!s.manual_override);
    assert_eq!(s.status_label(), "TREE FORMED");
}

#[test]
fn levels_are_clamped_to_unit_range() {
    let mut store = ControlStore::new();
    store.set_chaos_level(3.0);
    assert_eq!(store.chaos_level(), 1.0);
    store.set_chaos_level(-1.0);
    assert_eq!(store.chaos_level(), 0.0);
    store.set_chaos_level(f32::NAN);
    assert_eq!(store.chaos_level(), 0.0);
    store.set_target_chaos_level(7.5);
    assert_eq!(store.target_chaos_level(), 1.0);
}

#[test]
fn motion_writes_target_and_offset() {
    let mut store = ControlStore::new();
    store.apply_motion(1.0, Vec2::new(0.5, -0.25));
    assert_eq!(store.target_chaos_level(), 1.0);
    assert_eq!(store.camera_offset(), Vec2::new(0.5, -0.25));
    assert_eq!(store.signal().status_label(), "CHAOS UNLEASHED");
    // the smoothed level is not touched by the motion side
    assert_eq!(store.chaos_level(), 0.0);
}

#[test]
fn manual_override_holds_against_motion() {
    let mut store = ControlStore::new();
    store.set_target_chaos_level(0.0);
    assert!(store.manual_override());
    store.apply_motion(1.0, Vec2::new(0.3, 0.1));
    assert_eq!(store.target_chaos_level(), 0.0);
    // steering still follows the estimator
    assert_eq!(store.camera_offset(), Vec2::new(0.3, 0.1));

    store.release_override();
    assert!(!store.manual_override());
    store.apply_motion(1.0, Vec2::ZERO);
    assert_eq!(store.target_chaos_level(), 1.0);
}

#[test]
fn toggle_flips_between_tree_and_chaos() {
    let mut store = ControlStore::new();
    store.toggle_override();
    assert_eq!(store.target_chaos_level(), 1.0);
    assert!(store.manual_override());
    store.toggle_override();
    assert_eq!(store.target_chaos_level(), 0.0);
    assert!(store.manual_override());
}

#[test]
fn repeated_manual_target_is_idempotent() {
    let mut store = ControlStore::new();
    store.set_target_chaos_level(1.0);
    let first = store.signal();
    store.set_target_chaos_level(1.0);
    assert_eq!(store.signal(), first);
}

#[test]
fn listeners_see_every_write_until_unsubscribed() {
    let mut store = ControlStore::new();
    let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let id = store.subscribe(move |s| sink.borrow_mut().push(s.target_chaos_level));

    store.set_target_chaos_level(1.0);
    store.apply_motion(0.0, Vec2::ZERO);
    assert_eq!(*seen.borrow(), vec![1.0, 1.0]);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.release_override();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn sensor_flag_round_trips() {
    let mut store = ControlStore::new();
    store.set_sensor_active(true);
    assert!(store.sensor_active());
    store.set_chaos_level(0.4);
    store.set_sensor_active(false);
    assert!(!store.sensor_active());
    assert_eq!(store.chaos_level(), 0.4);
}

#[test]
fn frame_clock_clamps_stalls() {
    assert_eq!(clamp_dt(0.016, MAX_FRAME_DT_SEC), 0.016);
    assert_eq!(clamp_dt(3.0, MAX_FRAME_DT_SEC), MAX_FRAME_DT_SEC);
    assert_eq!(clamp_dt(-0.5, MAX_FRAME_DT_SEC), 0.0);
    assert_eq!(clamp_dt(f32::NAN, MAX_FRAME_DT_SEC), 0.0);

    let mut clock = FrameClock::new();
    let a = clock.tick();
    let b = clock.tick();
    assert_eq!((a.frame, b.frame), (1, 2));
    assert!(b.dt >= 0.0 && b.dt <= MAX_FRAME_DT_SEC);
    assert!(b.elapsed >= a.elapsed);
}
