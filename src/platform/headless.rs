//! Scene that draws nothing and remembers everything
//!
//! Backs the native soak run and the tests: every visual's current
//! transform and surface re-mappings can be inspected afterwards.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::proxy::{BoxShape, Scene, Transform, VisualHandle};
use crate::sim::Axis;

/// A surface re-mapping applied after a cut
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRemap {
    pub axis: Axis,
    pub original_size: f32,
    pub new_size: f32,
    pub delta: f32,
}

#[derive(Debug, Clone)]
pub struct VisualRecord {
    pub shape: BoxShape,
    pub transform: Transform,
    pub remaps: Vec<SurfaceRemap>,
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    visuals: BTreeMap<u32, VisualRecord>,
    next_id: u32,
    redraws: u64,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&VisualRecord> {
        self.visuals.get(&handle.0)
    }

    /// Live visuals
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    /// Frames requested so far
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl Scene for HeadlessScene {
    fn add_visual(&mut self, shape: BoxShape, position: Vec3) -> VisualHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.visuals.insert(
            id,
            VisualRecord {
                shape,
                transform: Transform::from_translation(position),
                remaps: Vec::new(),
            },
        );
        VisualHandle(id)
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        if self.visuals.remove(&handle.0).is_none() {
            log::warn!("Removing unknown visual {}", handle.0);
        }
    }

    fn set_transform(&mut self, handle: VisualHandle, transform: Transform) {
        if let Some(visual) = self.visuals.get_mut(&handle.0) {
            visual.transform = transform;
        }
    }

    fn remap_surface_coordinates(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        original_size: f32,
        new_size: f32,
        delta: f32,
    ) {
        if let Some(visual) = self.visuals.get_mut(&handle.0) {
            visual.remaps.push(SurfaceRemap {
                axis,
                original_size,
                new_size,
                delta,
            });
        }
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_removable() {
        let mut scene = HeadlessScene::new();
        let shape = BoxShape::new(2.0, 0.5, 3.0);
        let a = scene.add_visual(shape, Vec3::ZERO);
        let b = scene.add_visual(shape, Vec3::Y);
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        scene.remove_visual(a);
        assert!(scene.visual(a).is_none());
        assert_eq!(scene.visual(b).unwrap().transform.translation, Vec3::Y);

        // Handles are never reused
        let c = scene.add_visual(shape, Vec3::ZERO);
        assert_ne!(c, a);
    }

    #[test]
    fn test_records_remaps() {
        let mut scene = HeadlessScene::new();
        let handle = scene.add_visual(BoxShape::new(2.0, 0.5, 3.0), Vec3::ZERO);
        scene.remap_surface_coordinates(handle, Axis::Z, 3.0, 2.5, 0.5);
        assert_eq!(
            scene.visual(handle).unwrap().remaps,
            vec![SurfaceRemap {
                axis: Axis::Z,
                original_size: 3.0,
                new_size: 2.5,
                delta: 0.5
            }]
        );
    }
}
