pub mod gpu;
pub mod renderer;
pub static TREE_WGSL: &str = include_str!("../shaders/tree.wgsl");

pub use gpu::*;
pub use renderer::*;
