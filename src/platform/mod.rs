//! Implementations of the scene and physics collaborators
//!
//! - `headless`: records visuals in memory (native runs and tests)
//! - `ballistic`: gravity-only rigid bodies for falling debris
//! - `web`: the page's renderer, reached through a small JS host object

pub mod ballistic;
pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use ballistic::BallisticWorld;
pub use headless::{HeadlessScene, SurfaceRemap, VisualRecord};
