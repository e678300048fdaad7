//! The tower of placed layers plus the loose overhangs falling off it

use glam::Vec3;

use super::block::{Axis, Block, Slab};
use crate::consts::*;
use crate::proxy::{Physics, Scene, World};

/// Placed layers in layer order, and detached falling blocks.
///
/// `layers[i]` always sits at `y = BOX_HEIGHT * i`.
#[derive(Debug, Default)]
pub struct Stack {
    layers: Vec<Block>,
    overhangs: Vec<Block>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Block] {
        &self.layers
    }

    pub fn overhangs(&self) -> &[Block] {
        &self.overhangs
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The moving block (or the last placed one between rounds)
    pub fn top(&self) -> Option<&Block> {
        self.layers.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Block> {
        self.layers.last_mut()
    }

    /// Top block and the block directly beneath it
    pub fn top_and_support(&self) -> Option<(&Block, &Block)> {
        match self.layers.as_slice() {
            [.., support, top] => Some((top, support)),
            _ => None,
        }
    }

    pub fn top_and_support_mut(&mut self) -> Option<(&mut Block, &Block)> {
        let (top, rest) = self.layers.split_last_mut()?;
        let support = rest.last()?;
        Some((top, support))
    }

    /// Height of the next layer to be added
    pub fn next_layer_y(&self) -> f32 {
        BOX_HEIGHT * self.layers.len() as f32
    }

    /// Append a static layer on top. The foundation has no axis.
    pub fn add_layer<S: Scene, P: Physics>(
        &mut self,
        world: &mut World<S, P>,
        x: f32,
        z: f32,
        width: f32,
        depth: f32,
        axis: Option<Axis>,
    ) -> &Block {
        let position = Vec3::new(x, self.next_layer_y(), z);
        let block = Block::spawn(world, Slab::new(position, width, depth), axis, false);
        self.layers.push(block);
        &self.layers[self.layers.len() - 1]
    }

    /// Spawn a falling block level with the current top layer
    pub fn add_overhang<S: Scene, P: Physics>(
        &mut self,
        world: &mut World<S, P>,
        x: f32,
        z: f32,
        width: f32,
        depth: f32,
    ) {
        let y = BOX_HEIGHT * self.layers.len().saturating_sub(1) as f32;
        let position = Vec3::new(x, y, z);
        let block = Block::spawn(world, Slab::new(position, width, depth), None, true);
        self.overhangs.push(block);
    }

    /// Detach the top layer. The caller owns its proxies from here on.
    pub fn pop_layer(&mut self) -> Option<Block> {
        self.layers.pop()
    }

    /// Remove every block and its proxies
    pub fn clear<S: Scene, P: Physics>(&mut self, world: &mut World<S, P>) {
        for block in self.layers.drain(..).chain(self.overhangs.drain(..)) {
            block.despawn(world);
        }
    }

    /// Clear, then lay the foundation and the first moving layer
    pub fn reset<S: Scene, P: Physics>(&mut self, world: &mut World<S, P>) {
        self.clear(world);
        self.add_layer(world, 0.0, 0.0, ORIGINAL_WIDTH, ORIGINAL_DEPTH, None);
        self.add_layer(
            world,
            SPAWN_OFFSET,
            0.0,
            ORIGINAL_WIDTH,
            ORIGINAL_DEPTH,
            Some(Axis::X),
        );
    }

    /// Copy physics transforms onto overhang visuals
    pub fn sync_overhangs<S: Scene, P: Physics>(&mut self, world: &mut World<S, P>) {
        for overhang in &mut self.overhangs {
            overhang.sync_from_body(world);
        }
    }

    /// Despawn overhangs that have fallen below `floor_y`; returns how many
    pub fn cull_overhangs<S: Scene, P: Physics>(
        &mut self,
        world: &mut World<S, P>,
        floor_y: f32,
    ) -> usize {
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.overhangs)
            .into_iter()
            .partition(|block| block.position().y < floor_y);
        self.overhangs = kept;

        let count = gone.len();
        for block in gone {
            block.despawn(world);
        }
        count
    }
}
