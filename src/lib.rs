//! Stack Tower - a browser stacking arcade game
//!
//! Core modules:
//! - `sim`: Game state machine, overlap geometry, autopilot, frame driver
//! - `proxy`: Scene/physics collaborator contracts the simulation drives
//! - `platform`: Headless and browser implementations of those collaborators
//! - `leaderboard`: Best-score service client (local and remote)
//! - `persistence`: LocalStorage helpers

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod player;
pub mod proxy;
pub mod settings;
pub mod sim;

pub use player::{NameError, PlayerName};
pub use settings::{PrecisionMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Height of every slab (world units)
    pub const BOX_HEIGHT: f32 = 0.5;
    /// Footprint of the foundation and first layer
    pub const ORIGINAL_WIDTH: f32 = 2.0;
    pub const ORIGINAL_DEPTH: f32 = 3.0;

    /// Moving block speed (world units per millisecond)
    pub const SPEED: f32 = 0.008;
    /// A moving block past this coordinate on its axis has missed
    pub const TRAVEL_BOUND: f32 = 10.0;
    /// Coordinate a new layer starts from on its motion axis
    pub const SPAWN_OFFSET: f32 = -10.0;

    /// Mass of a falling overhang with the original footprint
    pub const OVERHANG_BASE_MASS: f32 = 5.0;
    /// Gravity applied to falling bodies (units/s²)
    pub const GRAVITY: f32 = -10.0;

    /// Camera starts here, looking at the origin
    pub const CAMERA_HOME: [f32; 3] = [4.0, 4.0, 4.0];
    /// How far the camera stays above the top placed layer
    pub const CAMERA_LEAD: f32 = 4.0;

    /// Autopilot stop offset is drawn from [-ROBOT_PRECISION_RANGE, ROBOT_PRECISION_RANGE)
    pub const ROBOT_PRECISION_RANGE: f32 = 0.5;
    /// |delta| below this counts as a perfect placement
    pub const PERFECT_EPSILON: f32 = 1e-4;
}
