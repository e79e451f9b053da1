//! The shared control record.
//!
//! One `ControlStore` is created by the frontend and handed to each component
//! as an explicit context (`&mut ControlStore`, or `Rc<RefCell<_>>` on the web).
//! There is one writer per field per frame: the motion loop writes the target
//! and camera offset, the morph engine writes the smoothed level, and the
//! manual override writes the target while it holds. Reads always see the last
//! write; there is no cached copy anywhere.

use fnv::FnvHashMap;
use glam::Vec2;

/// Snapshot of the control state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlSignal {
    /// Smoothed level in `[0, 1]`; 0 = tree formed, 1 = fully dispersed.
    pub chaos_level: f32,
    /// Instantaneous target in `[0, 1]`.
    pub target_chaos_level: f32,
    /// Steering offset, roughly `[-1, 1]` per axis before the motion scale.
    pub camera_offset: Vec2,
    pub sensor_active: bool,
    /// True while a manual target is pinned over the estimator's output.
    pub manual_override: bool,
}

impl ControlSignal {
    /// Status line for HUDs.
    pub fn status_label(&self) -> &'static str {
        if self.target_chaos_level >= 0.5 {
            "CHAOS UNLEASHED"
        } else {
            "TREE FORMED"
        }
    }
}

/// Handle returned by [`ControlStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ControlSignal)>;

#[derive(Default)]
pub struct ControlStore {
    signal: ControlSignal,
    listeners: FnvHashMap<SubscriptionId, Listener>,
    next_id: u64,
}

impl ControlStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn signal(&self) -> ControlSignal {
        self.signal
    }

    #[inline]
    pub fn chaos_level(&self) -> f32 {
        self.signal.chaos_level
    }

    #[inline]
    pub fn target_chaos_level(&self) -> f32 {
        self.signal.target_chaos_level
    }

    #[inline]
    pub fn camera_offset(&self) -> Vec2 {
        self.signal.camera_offset
    }

    #[inline]
    pub fn sensor_active(&self) -> bool {
        self.signal.sensor_active
    }

    #[inline]
    pub fn manual_override(&self) -> bool {
        self.signal.manual_override
    }

    /// Register a listener called after every write. Listeners run in no
    /// particular order and must not hold on to the reference.
    pub fn subscribe(&mut self, listener: impl FnMut(&ControlSignal) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Written by the morph engine once per frame.
    pub fn set_chaos_level(&mut self, level: f32) {
        self.signal.chaos_level = clamp_unit(level);
        self.notify();
    }

    /// Manual override entry point. Pins `level` as the target until
    /// [`Self::release_override`]; calling it twice with the same level is a
    /// no-op apart from notification.
    pub fn set_target_chaos_level(&mut self, level: f32) {
        let level = clamp_unit(level);
        if !self.signal.manual_override || self.signal.target_chaos_level != level {
            log::info!("[control] manual target {:.2}", level);
        }
        self.signal.target_chaos_level = level;
        self.signal.manual_override = true;
        self.notify();
    }

    /// Flip the pinned target between tree (0) and chaos (1).
    pub fn toggle_override(&mut self) {
        let next = if self.signal.target_chaos_level >= 0.5 {
            0.0
        } else {
            1.0
        };
        self.set_target_chaos_level(next);
    }

    /// Hand the target back to the motion estimator.
    pub fn release_override(&mut self) {
        if self.signal.manual_override {
            log::info!("[control] manual override released");
            self.signal.manual_override = false;
            self.notify();
        }
    }

    /// Written by the motion loop for every measured frame. The target is
    /// ignored while a manual override holds; the offset always lands.
    pub fn apply_motion(&mut self, target_chaos_level: f32, camera_offset: Vec2) {
        if !self.signal.manual_override {
            let target = clamp_unit(target_chaos_level);
            if (target >= 0.5) != (self.signal.target_chaos_level >= 0.5) {
                log::info!(
                    "[control] motion target -> {}",
                    if target >= 0.5 { "chaos" } else { "tree" }
                );
            }
            self.signal.target_chaos_level = target;
        }
        self.signal.camera_offset = camera_offset;
        self.notify();
    }

    pub fn set_camera_offset(&mut self, offset: Vec2) {
        self.signal.camera_offset = offset;
        self.notify();
    }

    pub fn set_sensor_active(&mut self, active: bool) {
        if self.signal.sensor_active != active {
            log::info!("[control] sensor active = {}", active);
        }
        self.signal.sensor_active = active;
        self.notify();
    }

    fn notify(&mut self) {
        let signal = self.signal;
        for listener in self.listeners.values_mut() {
            listener(&signal);
        }
    }
}

#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
