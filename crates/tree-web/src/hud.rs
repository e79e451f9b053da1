//! Status overlay: `#status` label, `#camera-status`, the `#chaos-meter` bar
//! and visibility of the `#motion-btn` release button.

use crate::dom;
use tree_core::ControlSignal;
use web_sys as web;

#[derive(Default)]
pub struct Hud {
    label: &'static str,
    camera: Option<bool>,
    manual: Option<bool>,
    meter_percent: i32,
}

impl Hud {
    /// Touch the DOM only when something visible changed.
    pub fn update(&mut self, document: &web::Document, signal: &ControlSignal) {
        let label = signal.status_label();
        if label != self.label {
            dom::set_text(document, "status", label);
            self.label = label;
        }
        if self.camera != Some(signal.sensor_active) {
            let text = if signal.sensor_active {
                "camera: on"
            } else {
                "camera: off (use the button or space)"
            };
            dom::set_text(document, "camera-status", text);
            self.camera = Some(signal.sensor_active);
        }
        if self.manual != Some(signal.manual_override) {
            // "back to motion" only makes sense while a manual target is pinned
            let style = if signal.manual_override {
                ""
            } else {
                "display:none"
            };
            dom::set_style(document, "motion-btn", style);
            self.manual = Some(signal.manual_override);
        }
        let percent = (signal.chaos_level * 100.0).round() as i32;
        if percent != self.meter_percent {
            dom::set_style(document, "chaos-meter", &format!("width:{}%", percent));
            self.meter_percent = percent;
        }
    }
}
