//! Error types for the core crate.
//!
//! Capture errors are never fatal: the motion loop absorbs them, flips the
//! sensor flag off and the morph engine keeps rendering with whatever control
//! signal is already in the store. Config errors are construction-time
//! precondition failures.

use thiserror::Error;

/// Failures of a camera/video source. All of these surface to consumers only
/// as `sensor_active == false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no capture device available")]
    NoDevice,
    #[error("capture device disconnected")]
    Disconnected,
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },
    #[error("capture backend error: {0}")]
    Backend(String),
}

/// Invalid construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle ensemble must not be empty")]
    EmptyEnsemble,
    #[error("motion grid must be at least 1x1, got {width}x{height}")]
    EmptyMotionGrid { width: u32, height: u32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
}
