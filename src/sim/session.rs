//! Game session lifecycle
//!
//! One `Session` lives for the whole page. It owns the stack, the autopilot
//! and the scene/physics collaborators, and records what happened in an
//! event outbox that the host drains after every input and frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::autopilot::Autopilot;
use super::block::Axis;
use super::overlap::{self, Overlap};
use super::stack::Stack;
use crate::consts::*;
use crate::proxy::{Physics, Scene, World};
use crate::settings::Settings;

/// Who is stopping the blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Demo play behind the title screen; loops forever
    Autopilot,
    /// A human presses to place each block
    Manual,
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing seeded yet (loading / name entry)
    NotStarted,
    /// A block is moving
    Running,
    /// The last block missed; waiting for the player
    Ended,
}

/// Things the host reacts to: HUD updates, audio, leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { mode: GameMode },
    /// A block landed; `score` is the new total
    Placed { score: u32, perfect: bool },
    Missed { score: u32, mode: GameMode },
    /// Stop background music
    StopAudio,
    /// Record a finished game on the leaderboard (best effort)
    SubmitScore { score: u32 },
    /// Back to autopilot with a fresh tower; `from` is the mode that ended
    Restarted { from: GameMode },
}

/// A running game and everything it drives
#[derive(Debug)]
pub struct Session<S, P> {
    pub(super) world: World<S, P>,
    pub(super) stack: Stack,
    pub(super) autopilot: Autopilot,
    pub(super) mode: GameMode,
    pub(super) phase: GamePhase,
    pub(super) score: u32,
    /// Timestamp (ms) of the previous frame; `None` until the first tick
    pub(super) last_timestamp: Option<f64>,
    pub(super) camera: Vec3,
    pub(super) overhang_cull_depth: Option<f32>,
    events: Vec<GameEvent>,
}

impl<S: Scene, P: Physics> Session<S, P> {
    pub fn new(world: World<S, P>, settings: &Settings, seed: u64) -> Self {
        Self {
            world,
            stack: Stack::new(),
            autopilot: Autopilot::new(seed, settings.autopilot_precision),
            mode: GameMode::Autopilot,
            phase: GamePhase::NotStarted,
            score: 0,
            last_timestamp: None,
            camera: Vec3::from(CAMERA_HOME),
            overhang_cull_depth: settings.overhang_cull_depth,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    pub fn autopilot_mut(&mut self) -> &mut Autopilot {
        &mut self.autopilot
    }

    pub fn world(&self) -> &World<S, P> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<S, P> {
        &mut self.world
    }

    pub fn camera(&self) -> Vec3 {
        self.camera
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        if self.autopilot.mode() != settings.autopilot_precision {
            self.autopilot.set_mode(settings.autopilot_precision);
        }
        self.overhang_cull_depth = settings.overhang_cull_depth;
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fresh tower, zero score, camera home
    fn reset_round(&mut self, mode: GameMode) {
        self.mode = mode;
        self.phase = GamePhase::Running;
        self.score = 0;
        self.last_timestamp = None;
        self.stack.reset(&mut self.world);
        self.camera = Vec3::from(CAMERA_HOME);
    }

    /// Begin a game in `mode` from any phase
    pub fn start(&mut self, mode: GameMode) {
        self.reset_round(mode);
        log::info!("Game started ({:?})", mode);
        self.events.push(GameEvent::Started { mode });
    }

    /// Return to unattended demo play
    pub fn restart(&mut self) {
        let from = self.mode;
        self.reset_round(GameMode::Autopilot);
        self.autopilot.redraw();
        log::info!("Restarted in autopilot (was {:?})", from);
        self.events.push(GameEvent::Restarted { from });
    }

    /// Single entry point for tap / click / keypress
    pub fn on_primary_action(&mut self) {
        match (self.phase, self.mode) {
            (GamePhase::NotStarted, _) => log::debug!("Input ignored before start"),
            (_, GameMode::Autopilot) => self.start(GameMode::Manual),
            (GamePhase::Ended, GameMode::Manual) => self.restart(),
            (GamePhase::Running, GameMode::Manual) => self.place_or_advance(),
        }
    }

    /// Stop the moving block: cut it against its support and add the next
    /// layer, or take the missed path if nothing overlaps.
    pub fn place_or_advance(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }

        let Some((top, support)) = self.stack.top_and_support_mut() else {
            debug_assert!(false, "placement with fewer than two layers");
            log::error!("Placement attempted without a support block");
            return;
        };
        let Some(axis) = top.axis else {
            debug_assert!(false, "moving block has no axis");
            log::error!("Placement attempted on the foundation");
            return;
        };

        let measured = Overlap::measure(axis, top.slab(), support.slab());
        let Some(overhang) = overlap::cut(top, &measured, &mut self.world) else {
            self.missed();
            return;
        };

        let retained = *top.slab();
        if let Some(slab) = overhang {
            self.stack.add_overhang(
                &mut self.world,
                slab.position.x,
                slab.position.z,
                slab.width,
                slab.depth,
            );
        }

        self.score += 1;

        let (next_x, next_z) = match axis {
            Axis::X => (retained.position.x, SPAWN_OFFSET),
            Axis::Z => (SPAWN_OFFSET, retained.position.z),
        };
        self.stack.add_layer(
            &mut self.world,
            next_x,
            next_z,
            retained.width,
            retained.depth,
            Some(axis.other()),
        );

        let perfect = measured.is_perfect();
        log::debug!(
            "Placed layer {} (delta {:.3}{})",
            self.score,
            measured.delta,
            if perfect { ", perfect" } else { "" }
        );
        self.events.push(GameEvent::Placed {
            score: self.score,
            perfect,
        });
    }

    /// The moving block fell off entirely: it becomes debris and the game ends
    pub fn missed(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }

        if let Some(top) = self.stack.top() {
            let slab = *top.slab();
            self.stack.add_overhang(
                &mut self.world,
                slab.position.x,
                slab.position.z,
                slab.width,
                slab.depth,
            );
        }
        if let Some(top) = self.stack.pop_layer() {
            top.despawn(&mut self.world);
        }

        self.phase = GamePhase::Ended;
        log::info!("Missed with score {} ({:?})", self.score, self.mode);
        self.events.push(GameEvent::Missed {
            score: self.score,
            mode: self.mode,
        });

        match self.mode {
            GameMode::Manual => {
                self.events.push(GameEvent::StopAudio);
                self.events.push(GameEvent::SubmitScore { score: self.score });
            }
            GameMode::Autopilot => self.restart(),
        }
    }
}
