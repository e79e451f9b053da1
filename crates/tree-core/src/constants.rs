use glam::Vec3;

// Shared scene/tuning constants used by both web and native frontends.

// Ensemble sizes
pub const FOLIAGE_COUNT: usize = 22_000;
pub const LIGHT_COUNT: usize = 1_500;
pub const ORNAMENT_COUNT: usize = 550;

// Tree cone (foliage + lights)
pub const TREE_HEIGHT: f32 = 15.0;
pub const TREE_BASE_RADIUS: f32 = 6.0;
pub const TREE_Y_OFFSET: f32 = -7.5; // centers the tree on the origin
pub const CONE_TAPER_EXPONENT: f32 = 0.85; // < 1 bulges the silhouette outward
pub const CONE_INNER_FRACTION: f32 = 0.2; // keeps some points off the axis

// Ornament cone sits just inside the foliage
pub const ORNAMENT_TREE_HEIGHT: f32 = 14.5;
pub const ORNAMENT_TREE_BASE_RADIUS: f32 = 5.8;
pub const ORNAMENT_TREE_Y_OFFSET: f32 = -7.2;

// Chaos volumes
pub const FOLIAGE_CHAOS_RADIUS: f32 = 20.0;
pub const ORNAMENT_CHAOS_RADIUS: f32 = 24.0;
pub const STAR_CHAOS_RADIUS: f32 = 28.0;

// Crown star
pub const STAR_TREE_POSITION: Vec3 = Vec3::new(0.0, 8.2, 0.0);

// Base point sizes (world units before perspective attenuation)
pub const FOLIAGE_SIZE_MIN: f32 = 0.1;
pub const FOLIAGE_SIZE_SPAN: f32 = 0.2;
pub const LIGHT_SIZE_MIN: f32 = 0.3;
pub const LIGHT_SIZE_SPAN: f32 = 0.4;

// Palettes: (rgb, weight). Weights are relative, not percentages.
pub const EMERALD: [f32; 3] = [0.0, 0.420, 0.235]; // #006b3c
pub const DARK_GREEN: [f32; 3] = [0.0, 0.200, 0.098]; // #003319
pub const WARM_WHITE: [f32; 3] = [1.0, 0.980, 0.941]; // #fffaf0
pub const BRIGHT_GOLD: [f32; 3] = [1.0, 0.843, 0.0]; // #ffd700
pub const STARLIGHT: [f32; 3] = [0.690, 0.878, 0.902]; // #b0e0e6
pub const ORNAMENT_GOLD: [f32; 3] = [1.0, 0.757, 0.145]; // #ffc125
pub const DEEP_RED: [f32; 3] = [0.776, 0.047, 0.188]; // #c60c30
pub const SILVER: [f32; 3] = [0.941, 0.941, 0.941]; // #f0f0f0
pub const STAR_COLOR: [f32; 3] = [1.0, 0.992, 0.816]; // #fffdd0

pub const FOLIAGE_PALETTE: [([f32; 3], u32); 2] = [(EMERALD, 40), (DARK_GREEN, 60)];
pub const LIGHT_PALETTE: [([f32; 3], u32); 3] =
    [(WARM_WHITE, 60), (BRIGHT_GOLD, 30), (STARLIGHT, 10)];
pub const ORNAMENT_PALETTE: [([f32; 3], u32); 3] =
    [(ORNAMENT_GOLD, 40), (DEEP_RED, 40), (SILVER, 20)];

// Frame pacing
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // clamp after stalls (tab switch, window drag)

// Seed used when a frontend does not ask for a specific one
pub const DEFAULT_SEED: u64 = 0x7EE5_C4A0_5EED_0001;
