use clap::Parser;
use tree_core::{TreeConfig, DEFAULT_SEED};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "chaos-tree",
    version,
    about = "Particle tree that bursts into a chaos cloud when the (simulated) camera sees motion"
)]
pub struct Args {
    /// Seed for particle placement and colors.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    #[arg(long)]
    pub foliage: Option<usize>,

    #[arg(long)]
    pub lights: Option<usize>,

    #[arg(long)]
    pub ornaments: Option<usize>,

    /// Run without the simulated camera; only the keyboard drives the tree.
    #[arg(long, default_value_t = false)]
    pub no_sensor: bool,

    /// Frame rate of the simulated camera.
    #[arg(long, default_value_t = 30.0)]
    pub camera_fps: f32,

    #[arg(long)]
    pub activation_threshold: Option<f32>,

    #[arg(long)]
    pub noise_threshold: Option<f32>,
}

impl Args {
    /// Defaults with the command-line overrides applied.
    pub fn tree_config(&self) -> TreeConfig {
        let mut config = TreeConfig::default();
        if let Some(n) = self.foliage {
            config.scene.foliage_count = n;
        }
        if let Some(n) = self.lights {
            config.scene.light_count = n;
        }
        if let Some(n) = self.ornaments {
            config.scene.ornament_count = n;
        }
        if let Some(v) = self.activation_threshold {
            config.motion.activation_threshold = v;
        }
        if let Some(v) = self.noise_threshold {
            config.motion.noise_threshold = v;
        }
        config
    }
}
