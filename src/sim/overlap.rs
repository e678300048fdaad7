//! Overlap geometry between the moving block and the block beneath it
//!
//! The heart of the game: how much of the moving slab is still supported,
//! and where the unsupported part goes when it is sliced off.

use glam::Vec3;

use super::block::{Axis, Block, Slab};
use crate::consts::PERFECT_EPSILON;
use crate::proxy::{Physics, Scene, World};

/// Result of measuring the moving slab against its support
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub axis: Axis,
    /// Moving coordinate minus support coordinate on `axis`
    pub delta: f32,
    /// Moving slab's extent on `axis`
    pub size: f32,
    /// `|delta|`
    pub overhang_size: f32,
    /// `size - overhang_size`; zero or negative is a miss
    pub overlap: f32,
}

impl Overlap {
    pub fn measure(axis: Axis, moving: &Slab, support: &Slab) -> Self {
        let delta = axis.component(moving.position) - axis.component(support.position);
        let overhang_size = delta.abs();
        let size = moving.extent(axis);
        Self {
            axis,
            delta,
            size,
            overhang_size,
            overlap: size - overhang_size,
        }
    }

    /// Nothing of the moving slab rests on the support
    pub fn is_miss(&self) -> bool {
        self.overlap <= 0.0
    }

    pub fn is_perfect(&self) -> bool {
        self.overhang_size < PERFECT_EPSILON
    }
}

/// Geometry after slicing: the retained slab and the severed overhang
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPlan {
    pub retained: Slab,
    /// `None` when the overhang would have (near) zero extent
    pub overhang: Option<Slab>,
}

/// Compute the cut without touching any proxies.
///
/// Returns `None` on a miss; the caller takes the missed path instead.
pub fn plan_cut(moving: &Slab, overlap: &Overlap) -> Option<CutPlan> {
    if overlap.is_miss() {
        return None;
    }
    let axis = overlap.axis;

    let mut retained = *moving;
    match axis {
        Axis::X => retained.width = overlap.overlap,
        Axis::Z => retained.depth = overlap.overlap,
    }
    let center = axis.component(moving.position) - overlap.delta / 2.0;
    axis.set_component(&mut retained.position, center);

    let overhang = (overlap.overhang_size >= PERFECT_EPSILON).then(|| {
        let shift = overlap.delta.signum() * (overlap.overlap / 2.0 + overlap.overhang_size / 2.0);
        let mut position: Vec3 = retained.position;
        axis.set_component(&mut position, center + shift);
        let (width, depth) = match axis {
            Axis::X => (overlap.overhang_size, retained.depth),
            Axis::Z => (retained.width, overlap.overhang_size),
        };
        Slab::new(position, width, depth)
    });

    Some(CutPlan { retained, overhang })
}

/// Texture coordinate after a cut, keeping the texture's physical scale
#[inline]
pub fn remap_texture_coordinate(u: f32, original_size: f32, new_size: f32, delta: f32) -> f32 {
    (u * original_size - delta) / new_size
}

/// Slice `block` to the supported footprint and update its proxies.
///
/// Returns the overhang slab for the caller to spawn as a falling block.
/// A zero delta leaves the block untouched.
pub fn cut<S: Scene, P: Physics>(
    block: &mut Block,
    overlap: &Overlap,
    world: &mut World<S, P>,
) -> Option<Option<Slab>> {
    let plan = plan_cut(block.slab(), overlap)?;
    if overlap.delta == 0.0 {
        return Some(None);
    }
    let axis = overlap.axis;

    block.resize(world, axis, overlap.overlap);
    block.set_coordinate(world, axis, axis.component(plan.retained.position));
    world.scene.remap_surface_coordinates(
        block.visual(),
        axis,
        overlap.size,
        overlap.overlap,
        overlap.delta,
    );

    log::debug!(
        "cut on {:?}: delta {:.3}, kept {:.3}, severed {:.3}",
        axis,
        overlap.delta,
        overlap.overlap,
        overlap.overhang_size
    );

    Some(plan.overhang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{BallisticWorld, HeadlessScene};
    use proptest::prelude::*;

    fn slab_x(x: f32, width: f32) -> Slab {
        Slab::new(Vec3::new(x, 0.5, 0.0), width, 3.0)
    }

    #[test]
    fn test_measure_partial_overlap() {
        let support = slab_x(0.0, 2.0);
        let moving = slab_x(1.0, 2.0);
        let overlap = Overlap::measure(Axis::X, &moving, &support);

        assert_eq!(overlap.delta, 1.0);
        assert_eq!(overlap.overhang_size, 1.0);
        assert_eq!(overlap.size, 2.0);
        assert_eq!(overlap.overlap, 1.0);
        assert!(!overlap.is_miss());
    }

    #[test]
    fn test_plan_cut_scenario() {
        let support = slab_x(0.0, 2.0);
        let moving = slab_x(1.0, 2.0);
        let overlap = Overlap::measure(Axis::X, &moving, &support);
        let plan = plan_cut(&moving, &overlap).unwrap();

        assert_eq!(plan.retained.width, 1.0);
        assert_eq!(plan.retained.depth, 3.0);
        assert_eq!(plan.retained.position.x, 0.5);

        let overhang = plan.overhang.unwrap();
        assert_eq!(overhang.width, 1.0);
        assert_eq!(overhang.depth, 3.0);
        // One unit beyond the retained block's shifted center
        assert_eq!(overhang.position.x, 1.5);
        assert_eq!(overhang.position.y, 0.5);
    }

    #[test]
    fn test_plan_cut_negative_delta_on_z() {
        let support = Slab::new(Vec3::new(0.0, 0.0, 0.0), 2.0, 3.0);
        let moving = Slab::new(Vec3::new(0.0, 0.5, -1.0), 2.0, 3.0);
        let overlap = Overlap::measure(Axis::Z, &moving, &support);
        let plan = plan_cut(&moving, &overlap).unwrap();

        assert_eq!(plan.retained.depth, 2.0);
        assert_eq!(plan.retained.width, 2.0);
        assert_eq!(plan.retained.position.z, -0.5);

        let overhang = plan.overhang.unwrap();
        assert_eq!(overhang.depth, 1.0);
        assert_eq!(overhang.width, 2.0);
        assert_eq!(overhang.position.z, -2.0);
    }

    #[test]
    fn test_miss_has_no_cut() {
        let support = slab_x(0.0, 2.0);
        let moving = slab_x(3.0, 2.0);
        let overlap = Overlap::measure(Axis::X, &moving, &support);

        assert_eq!(overlap.overlap, -1.0);
        assert!(overlap.is_miss());
        assert!(plan_cut(&moving, &overlap).is_none());
    }

    #[test]
    fn test_touching_edges_is_a_miss() {
        let support = slab_x(0.0, 2.0);
        let moving = slab_x(2.0, 2.0);
        assert!(Overlap::measure(Axis::X, &moving, &support).is_miss());
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let support = slab_x(0.0, 2.0);
        let moving = slab_x(0.0, 2.0);
        let overlap = Overlap::measure(Axis::X, &moving, &support);
        let plan = plan_cut(&moving, &overlap).unwrap();

        assert!(overlap.is_perfect());
        assert_eq!(overlap.overlap, overlap.size);
        assert_eq!(plan.retained, moving);
        assert!(plan.overhang.is_none());
    }

    #[test]
    fn test_remap_texture_coordinate() {
        // Block cut from 2 to 1 after sliding +1: the kept half's texture
        // still spans physical coordinates 1..2 of the original
        assert_eq!(remap_texture_coordinate(1.0, 2.0, 1.0, 1.0), 1.0);
        assert_eq!(remap_texture_coordinate(0.5, 2.0, 1.0, 1.0), 0.0);
        assert_eq!(remap_texture_coordinate(0.5, 2.0, 2.0, 0.0), 0.5);
    }

    #[test]
    fn test_cut_updates_proxies() {
        let mut world = World::new(HeadlessScene::new(), BallisticWorld::new());
        let mut block = Block::spawn(&mut world, slab_x(1.0, 2.0), Some(Axis::X), false);
        let support = slab_x(0.0, 2.0);
        let overlap = Overlap::measure(Axis::X, block.slab(), &support);

        let overhang = cut(&mut block, &overlap, &mut world).unwrap().unwrap();
        assert_eq!(overhang.width, 1.0);
        assert_eq!(block.width(), 1.0);

        let visual = world.scene.visual(block.visual()).unwrap();
        assert_eq!(visual.transform.scale.x, 0.5);
        assert_eq!(visual.transform.translation.x, 0.5);
        assert_eq!(visual.remaps.len(), 1);
        assert_eq!(visual.remaps[0].new_size, 1.0);

        assert_eq!(world.physics.shape(block.body()).unwrap().width, 1.0);
        let (body_pos, _) = world.physics.transform(block.body()).unwrap();
        assert_eq!(body_pos.x, 0.5);
    }

    #[test]
    fn test_cut_with_zero_delta_touches_nothing() {
        let mut world = World::new(HeadlessScene::new(), BallisticWorld::new());
        let mut block = Block::spawn(&mut world, slab_x(0.0, 2.0), Some(Axis::X), false);
        let support = slab_x(0.0, 2.0);
        let overlap = Overlap::measure(Axis::X, block.slab(), &support);

        assert_eq!(cut(&mut block, &overlap, &mut world), Some(None));
        assert!(world.scene.visual(block.visual()).unwrap().remaps.is_empty());
        assert_eq!(block.width(), 2.0);
    }

    proptest! {
        #[test]
        fn prop_cut_never_grows_and_stays_positive(
            width in 0.1f32..4.0,
            depth in 0.1f32..4.0,
            delta in -5.0f32..5.0,
            on_x in any::<bool>(),
        ) {
            let axis = if on_x { Axis::X } else { Axis::Z };
            let support = Slab::new(Vec3::ZERO, width, depth);
            let mut position = Vec3::new(0.0, 0.5, 0.0);
            axis.set_component(&mut position, delta);
            let moving = Slab::new(position, width, depth);

            let overlap = Overlap::measure(axis, &moving, &support);
            prop_assert!((overlap.overlap - (overlap.size - delta.abs())).abs() < 1e-5);

            match plan_cut(&moving, &overlap) {
                Some(plan) => {
                    prop_assert!(overlap.overlap > 0.0);
                    prop_assert!(plan.retained.width > 0.0);
                    prop_assert!(plan.retained.depth > 0.0);
                    prop_assert!(plan.retained.area() <= moving.area() + 1e-5);
                    if let Some(overhang) = plan.overhang {
                        let total = plan.retained.area() + overhang.area();
                        prop_assert!((total - moving.area()).abs() < 1e-3);
                    }
                }
                None => prop_assert!(overlap.is_miss()),
            }
        }
    }
}
