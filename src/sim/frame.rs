//! Per-frame driver
//!
//! Advances the moving block, lets the autopilot decide, eases the camera
//! up the tower, steps physics for the falling debris and asks for a redraw.

use super::session::{GameMode, GamePhase, Session};
use crate::consts::*;
use crate::proxy::{Physics, Scene};

impl<S: Scene, P: Physics> Session<S, P> {
    /// Advance one frame. `timestamp` is in milliseconds and must not decrease.
    ///
    /// The first tick after a (re)start only records the timestamp.
    pub fn on_tick(&mut self, timestamp: f64) {
        if let Some(last) = self.last_timestamp {
            let elapsed = (timestamp - last).max(0.0) as f32;
            self.advance(elapsed);
        }
        // A restart during `advance` clears the timestamp; the next frame
        // still measures from this one
        self.last_timestamp = Some(timestamp);

        self.world.scene.request_redraw();
    }

    fn advance(&mut self, elapsed_ms: f32) {
        let travel = SPEED * elapsed_ms;

        if self.phase == GamePhase::Running {
            self.drive_moving_block(travel);
        }

        let camera_target = BOX_HEIGHT * self.stack.len().saturating_sub(2) as f32 + CAMERA_LEAD;
        if self.camera.y < camera_target {
            self.camera.y += travel;
        }

        self.world.physics.step(elapsed_ms / 1000.0);
        self.stack.sync_overhangs(&mut self.world);

        if let Some(depth) = self.overhang_cull_depth {
            let floor = self.stack.next_layer_y() - depth;
            let culled = self.stack.cull_overhangs(&mut self.world, floor);
            if culled > 0 {
                log::debug!("Culled {} overhangs below y={:.1}", culled, floor);
            }
        }
    }

    fn drive_moving_block(&mut self, travel: f32) {
        let Some((top, support)) = self.stack.top_and_support_mut() else {
            return;
        };
        let Some(axis) = top.axis else { return };

        let should_move = match self.mode {
            GameMode::Manual => true,
            GameMode::Autopilot => self
                .autopilot
                .should_move(top.coordinate(), axis.component(support.position())),
        };

        if should_move {
            top.slide(&mut self.world, travel);
            if top.coordinate() > TRAVEL_BOUND {
                self.missed();
            }
        } else if self.mode == GameMode::Autopilot {
            self.place_or_advance();
            self.autopilot.redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{BallisticWorld, HeadlessScene};
    use crate::proxy::World;
    use crate::settings::{PrecisionMode, Settings};
    use crate::sim::GameEvent;

    type TestSession = Session<HeadlessScene, BallisticWorld>;

    fn session(precision: PrecisionMode) -> TestSession {
        let settings = Settings {
            autopilot_precision: precision,
            ..Settings::default()
        };
        Session::new(
            World::new(HeadlessScene::new(), BallisticWorld::new()),
            &settings,
            2024,
        )
    }

    /// Run `frames` ticks of `step_ms`, starting at `t`; returns the end time
    fn run(session: &mut TestSession, t: f64, frames: usize, step_ms: f64) -> f64 {
        let mut t = t;
        for _ in 0..frames {
            session.on_tick(t);
            t += step_ms;
        }
        t
    }

    #[test]
    fn test_first_tick_only_seeds_timestamp() {
        let mut session = session(PrecisionMode::Random);
        session.start(GameMode::Manual);
        let before = session.stack().top().unwrap().coordinate();

        session.on_tick(1000.0);
        assert_eq!(session.stack().top().unwrap().coordinate(), before);
        assert_eq!(session.world().scene.redraws(), 1);

        session.on_tick(1100.0);
        let after = session.stack().top().unwrap().coordinate();
        assert!((after - (before + SPEED * 100.0)).abs() < 1e-4);
        assert_eq!(session.world().scene.redraws(), 2);
    }

    #[test]
    fn test_manual_block_past_travel_bound_misses() {
        let mut session = session(PrecisionMode::Random);
        session.start(GameMode::Manual);
        session.drain_events();

        // 20 units at 0.008/ms takes 2500 ms
        run(&mut session, 0.0, 200, 16.0);

        assert_eq!(session.phase(), GamePhase::Ended);
        assert_eq!(session.score(), 0);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::SubmitScore { score: 0 }));
    }

    #[test]
    fn test_ended_phase_freezes_blocks() {
        let mut session = session(PrecisionMode::Random);
        session.start(GameMode::Manual);
        let t = run(&mut session, 0.0, 200, 16.0);
        assert_eq!(session.phase(), GamePhase::Ended);

        let layers: Vec<_> = session.stack().layers().iter().map(|b| b.position()).collect();
        run(&mut session, t, 30, 16.0);
        let after: Vec<_> = session.stack().layers().iter().map(|b| b.position()).collect();
        assert_eq!(layers, after);
    }

    #[test]
    fn test_autopilot_zero_precision_stacks_near_perfectly() {
        let mut session = session(PrecisionMode::Fixed(0.0));
        session.start(GameMode::Autopilot);
        session.drain_events();

        // Each layer needs 1250 ms to slide from the spawn point to the support
        run(&mut session, 0.0, 10_000, 1.0);

        assert!(session.score() > 5, "score {}", session.score());
        let events = session.drain_events();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Restarted { .. })));
        // Each stop overshoots by at most one frame of travel
        for block in session.stack().layers() {
            assert!(block.width() > ORIGINAL_WIDTH - 0.1);
            assert!(block.depth() > ORIGINAL_DEPTH - 0.1);
        }
    }

    #[test]
    fn test_autopilot_stops_at_threshold() {
        let mut session = session(PrecisionMode::Fixed(0.0));
        session.start(GameMode::Autopilot);
        run(&mut session, 0.0, 10_000, 1.0);
        // Every placed layer stopped within one 1 ms step of its support
        let layers = session.stack().layers();
        for pair in layers[..layers.len() - 1].windows(2) {
            let axis = pair[1].axis.unwrap();
            let delta = axis.component(pair[1].position()) - axis.component(pair[0].position());
            assert!(delta.abs() <= SPEED + 1e-4, "delta {delta}");
        }
    }

    #[test]
    fn test_autopilot_loops_forever() {
        let mut session = session(PrecisionMode::Random);
        session.start(GameMode::Autopilot);
        run(&mut session, 0.0, 20_000, 16.0);
        assert_eq!(session.phase(), GamePhase::Running);
        assert_eq!(session.mode(), GameMode::Autopilot);
        assert!(session.stack().len() >= 2);
    }

    #[test]
    fn test_camera_rises_with_tower() {
        let mut session = session(PrecisionMode::Fixed(0.0));
        session.start(GameMode::Autopilot);
        let start_y = session.camera().y;
        run(&mut session, 0.0, 5_000, 1.0);

        let target = BOX_HEIGHT * (session.stack().len() - 2) as f32 + CAMERA_LEAD;
        assert!(session.camera().y > start_y);
        assert!(session.camera().y < target + SPEED * 2.0);

        session.restart();
        assert_eq!(session.camera().y, CAMERA_HOME[1]);
    }

    #[test]
    fn test_overhangs_fall_and_get_culled() {
        let mut session = session(PrecisionMode::Random);
        session.start(GameMode::Manual);
        // Stop immediately at the spawn point: a miss, the block becomes debris
        session.on_tick(0.0);
        session.place_or_advance();
        assert_eq!(session.stack().overhangs().len(), 1);
        let y0 = session.stack().overhangs()[0].position().y;

        run(&mut session, 0.0, 60, 16.0);
        let y1 = session.stack().overhangs().first().map(|o| o.position().y);
        assert!(y1.is_none_or(|y| y < y0));

        // Long enough to fall past the default cull depth
        run(&mut session, 1000.0, 300, 16.0);
        assert!(session.stack().overhangs().is_empty());
    }

    #[test]
    fn test_overhangs_kept_when_culling_disabled() {
        let settings = Settings {
            overhang_cull_depth: None,
            ..Settings::default()
        };
        let mut session = Session::new(
            World::new(HeadlessScene::new(), BallisticWorld::new()),
            &settings,
            3,
        );
        session.start(GameMode::Manual);
        session.place_or_advance();
        run(&mut session, 0.0, 600, 16.0);
        assert_eq!(session.stack().overhangs().len(), 1);
    }
}
