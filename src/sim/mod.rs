//! Game simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Rendering and physics only through the `proxy` traits
//! - Seeded RNG only
//! - Time comes in from the host as frame timestamps

pub mod autopilot;
pub mod block;
pub mod frame;
pub mod overlap;
pub mod session;
pub mod stack;

pub use autopilot::Autopilot;
pub use block::{Axis, Block, Slab, body_mass};
pub use overlap::{CutPlan, Overlap, cut, plan_cut, remap_texture_coordinate};
pub use session::{GameEvent, GameMode, GamePhase, Session};
pub use stack::Stack;
