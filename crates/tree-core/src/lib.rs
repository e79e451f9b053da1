pub mod camera;
pub mod capture;
pub mod clock;
pub mod config;
pub mod constants;
pub mod control;
pub mod error;
pub mod geometry;
pub mod morph;
pub mod motion;
pub mod motion_loop;
pub mod noise;
pub mod particles;
pub mod session;
pub mod smoothing;

pub use camera::*;
pub use capture::*;
pub use clock::*;
pub use config::*;
pub use constants::*;
pub use control::*;
pub use error::*;
pub use geometry::*;
pub use morph::*;
pub use motion::*;
pub use motion_loop::*;
pub use noise::*;
pub use particles::*;
pub use session::*;
pub use smoothing::*;
