//! Blocks: the slabs that make up the tower and the debris that falls off it

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::proxy::{BodyHandle, BoxShape, Physics, Scene, Transform, VisualHandle, World};

/// Horizontal direction a layer slides along (and can overhang on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    /// Layers alternate X, Z, X, ...
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    #[inline]
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Z => v.z,
        }
    }

    #[inline]
    pub fn set_component(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Position and footprint of a slab, without any proxies attached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub position: Vec3,
    pub width: f32,
    pub depth: f32,
}

impl Slab {
    pub fn new(position: Vec3, width: f32, depth: f32) -> Self {
        Self {
            position,
            width,
            depth,
        }
    }

    /// Extent along `axis` (width for X, depth for Z)
    #[inline]
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Z => self.depth,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.depth
    }

    pub fn shape(&self) -> BoxShape {
        BoxShape::new(self.width, BOX_HEIGHT, self.depth)
    }
}

/// Mass of a body with the given footprint.
///
/// Placed layers are static (zero mass); falling bodies scale with their
/// area relative to the original footprint.
pub fn body_mass(width: f32, depth: f32, falls: bool) -> f32 {
    if !falls {
        return 0.0;
    }
    OVERHANG_BASE_MASS * (width / ORIGINAL_WIDTH) * (depth / ORIGINAL_DEPTH)
}

/// A slab with its visual and its rigid body.
///
/// Both proxies are created in [`Block::spawn`] and destroyed together in
/// [`Block::despawn`]; nothing else hands them out for removal.
#[derive(Debug)]
pub struct Block {
    /// `None` only for the foundation
    pub axis: Option<Axis>,
    slab: Slab,
    /// Footprint the visual geometry was built with (scale is relative to it)
    spawn_width: f32,
    spawn_depth: f32,
    falling: bool,
    visual: VisualHandle,
    body: BodyHandle,
}

impl Block {
    pub fn spawn<S: Scene, P: Physics>(
        world: &mut World<S, P>,
        slab: Slab,
        axis: Option<Axis>,
        falls: bool,
    ) -> Self {
        debug_assert!(slab.width > 0.0 && slab.depth > 0.0, "degenerate block {slab:?}");

        let visual = world.scene.add_visual(slab.shape(), slab.position);
        let mass = body_mass(slab.width, slab.depth, falls);
        let body = world.physics.add_body(mass, slab.shape(), slab.position);

        Self {
            axis,
            slab,
            spawn_width: slab.width,
            spawn_depth: slab.depth,
            falling: falls,
            visual,
            body,
        }
    }

    /// Remove both proxies from their collaborators
    pub fn despawn<S: Scene, P: Physics>(self, world: &mut World<S, P>) {
        world.scene.remove_visual(self.visual);
        world.physics.remove_body(self.body);
    }

    pub fn slab(&self) -> &Slab {
        &self.slab
    }

    pub fn position(&self) -> Vec3 {
        self.slab.position
    }

    pub fn width(&self) -> f32 {
        self.slab.width
    }

    pub fn depth(&self) -> f32 {
        self.slab.depth
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn visual(&self) -> VisualHandle {
        self.visual
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Coordinate on this block's motion axis (0 for the foundation)
    pub fn coordinate(&self) -> f32 {
        self.axis
            .map(|axis| axis.component(self.slab.position))
            .unwrap_or(0.0)
    }

    /// Visual scale relative to the geometry the block was spawned with
    pub fn scale(&self) -> Vec3 {
        Vec3::new(
            self.slab.width / self.spawn_width,
            1.0,
            self.slab.depth / self.spawn_depth,
        )
    }

    pub fn transform(&self) -> Transform {
        Transform {
            scale: self.scale(),
            ..Transform::from_translation(self.slab.position)
        }
    }

    /// Move along the motion axis, keeping visual and body in lock-step
    pub fn slide<S: Scene, P: Physics>(&mut self, world: &mut World<S, P>, distance: f32) {
        let Some(axis) = self.axis else { return };
        let value = axis.component(self.slab.position) + distance;
        self.set_coordinate(world, axis, value);
    }

    pub(crate) fn set_coordinate<S: Scene, P: Physics>(
        &mut self,
        world: &mut World<S, P>,
        axis: Axis,
        value: f32,
    ) {
        axis.set_component(&mut self.slab.position, value);
        world.scene.set_transform(self.visual, self.transform());
        world.physics.set_position(self.body, axis, value);
    }

    /// Shrink the extent on `axis`; the body shape is replaced, not resized
    pub(crate) fn resize<S: Scene, P: Physics>(
        &mut self,
        world: &mut World<S, P>,
        axis: Axis,
        extent: f32,
    ) {
        debug_assert!(extent > 0.0);
        match axis {
            Axis::X => self.slab.width = extent,
            Axis::Z => self.slab.depth = extent,
        }
        world.physics.replace_shape(self.body, self.slab.shape());
        world.scene.set_transform(self.visual, self.transform());
    }

    /// Copy the body's transform onto the visual (falling blocks only)
    pub fn sync_from_body<S: Scene, P: Physics>(&mut self, world: &mut World<S, P>) {
        let Some((position, rotation)) = world.physics.transform(self.body) else {
            return;
        };
        self.slab.position = position;
        world.scene.set_transform(
            self.visual,
            Transform {
                translation: position,
                rotation,
                scale: self.scale(),
            },
        );
    }
}
