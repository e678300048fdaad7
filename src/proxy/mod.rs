//! Collaborator contracts for rendering and physics
//!
//! The simulation never looks inside a visual or a body. It only creates,
//! moves, rescales and removes them through these traits, so the same
//! session runs against the browser host, the headless recorder, or a test.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::sim::Axis;

/// Opaque handle to a visual owned by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// Opaque handle to a rigid body owned by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Box dimensions (full extents, not half extents)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxShape {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth) * 0.5
    }
}

/// Placement of a visual in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_translation(Vec3::ZERO)
    }
}

/// Rendering collaborator
pub trait Scene {
    /// Create a box visual at `position`; geometry is sized by `shape`.
    fn add_visual(&mut self, shape: BoxShape, position: Vec3) -> VisualHandle;

    fn remove_visual(&mut self, handle: VisualHandle);

    fn set_transform(&mut self, handle: VisualHandle, transform: Transform);

    /// Re-map surface texture coordinates along `axis` after a cut so the
    /// texture keeps its physical scale: `u' = (u * original_size - delta) / new_size`.
    fn remap_surface_coordinates(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        original_size: f32,
        new_size: f32,
        delta: f32,
    );

    /// Ask for one frame to be drawn
    fn request_redraw(&mut self);
}

/// Rigid-body collaborator
///
/// Bodies with zero mass are static. Shapes are immutable: a cut replaces
/// the shape rather than resizing it.
pub trait Physics {
    fn add_body(&mut self, mass: f32, shape: BoxShape, position: Vec3) -> BodyHandle;

    fn remove_body(&mut self, handle: BodyHandle);

    fn replace_shape(&mut self, handle: BodyHandle, shape: BoxShape);

    fn set_position(&mut self, handle: BodyHandle, axis: Axis, value: f32);

    /// Advance the simulation by `elapsed_seconds`
    fn step(&mut self, elapsed_seconds: f32);

    /// Current position and orientation, `None` for an unknown handle
    fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)>;
}

/// The two collaborators a session drives, owned together
#[derive(Debug, Default)]
pub struct World<S, P> {
    pub scene: S,
    pub physics: P,
}

impl<S: Scene, P: Physics> World<S, P> {
    pub fn new(scene: S, physics: P) -> Self {
        Self { scene, physics }
    }
}
