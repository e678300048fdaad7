//! Minimal physics world for falling debris
//!
//! Static bodies (zero mass) never move unless repositioned. Dynamic bodies
//! fall under gravity and tip away from the tower's center line. There are
//! no contacts: debris passes through the tower and falls until culled.
//! The browser build runs on this world too, so falling debris drops
//! straight through the tower on the page as well.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::consts::GRAVITY;
use crate::proxy::{BodyHandle, BoxShape, Physics};
use crate::sim::Axis;

/// Angular speed a new falling body tips over with (rad/s)
const TIP_RATE: f32 = 1.5;

#[derive(Debug, Clone)]
struct Body {
    mass: f32,
    shape: BoxShape,
    position: Vec3,
    velocity: Vec3,
    rotation: Quat,
    /// Axis scaled by rate (rad/s)
    spin: Vec3,
}

impl Body {
    fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }
}

#[derive(Debug, Default)]
pub struct BallisticWorld {
    bodies: BTreeMap<u32, Body>,
    next_id: u32,
}

impl BallisticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(&handle.0).map(|b| b.mass)
    }

    pub fn shape(&self, handle: BodyHandle) -> Option<BoxShape> {
        self.bodies.get(&handle.0).map(|b| b.shape)
    }
}

impl Physics for BallisticWorld {
    fn add_body(&mut self, mass: f32, shape: BoxShape, position: Vec3) -> BodyHandle {
        let id = self.next_id;
        self.next_id += 1;

        // Tip outward: rotate about the horizontal axis perpendicular to the
        // offset from the tower's center line
        let outward = Vec3::new(position.x, 0.0, position.z);
        let spin = if mass > 0.0 {
            outward.cross(Vec3::Y).normalize_or_zero() * -TIP_RATE
        } else {
            Vec3::ZERO
        };

        self.bodies.insert(
            id,
            Body {
                mass,
                shape,
                position,
                velocity: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                spin,
            },
        );
        BodyHandle(id)
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if self.bodies.remove(&handle.0).is_none() {
            log::warn!("Removing unknown body {}", handle.0);
        }
    }

    fn replace_shape(&mut self, handle: BodyHandle, shape: BoxShape) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.shape = shape;
        }
    }

    fn set_position(&mut self, handle: BodyHandle, axis: Axis, value: f32) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            axis.set_component(&mut body.position, value);
        }
    }

    fn step(&mut self, elapsed_seconds: f32) {
        if elapsed_seconds <= 0.0 {
            return;
        }
        for body in self.bodies.values_mut().filter(|b| b.is_dynamic()) {
            body.velocity.y += GRAVITY * elapsed_seconds;
            body.position += body.velocity * elapsed_seconds;
            body.rotation = (Quat::from_scaled_axis(body.spin * elapsed_seconds) * body.rotation)
                .normalize();
        }
    }

    fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(&handle.0)
            .map(|body| (body.position, body.rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> BoxShape {
        BoxShape::new(1.0, 0.5, 3.0)
    }

    #[test]
    fn test_static_bodies_stay_put() {
        let mut world = BallisticWorld::new();
        let body = world.add_body(0.0, shape(), Vec3::new(0.0, 1.0, 0.0));
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let (position, rotation) = world.transform(body).unwrap();
        assert_eq!(position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_dynamic_bodies_fall_and_tip() {
        let mut world = BallisticWorld::new();
        let body = world.add_body(2.5, shape(), Vec3::new(1.5, 1.0, 0.0));
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let (position, rotation) = world.transform(body).unwrap();
        // Roughly half of g * t² after one second
        assert!(position.y < 1.0 - 4.0 && position.y > 1.0 - 6.0, "y = {}", position.y);
        assert_eq!(position.x, 1.5);
        assert!(rotation.angle_between(Quat::IDENTITY) > 1.0);
    }

    #[test]
    fn test_set_position_and_replace_shape() {
        let mut world = BallisticWorld::new();
        let body = world.add_body(0.0, shape(), Vec3::ZERO);
        world.set_position(body, Axis::Z, -4.0);
        world.replace_shape(body, BoxShape::new(0.5, 0.5, 3.0));
        assert_eq!(world.transform(body).unwrap().0, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(world.shape(body).unwrap().width, 0.5);
    }

    #[test]
    fn test_unknown_handle() {
        let mut world = BallisticWorld::new();
        let body = world.add_body(1.0, shape(), Vec3::ZERO);
        world.remove_body(body);
        assert!(world.transform(body).is_none());
        assert!(world.is_empty());
    }
}
