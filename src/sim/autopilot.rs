//! Autopilot: a simulated player that stops blocks with deliberate error

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::ROBOT_PRECISION_RANGE;
use crate::settings::PrecisionMode;

/// Decides each tick whether the moving block keeps sliding.
///
/// The block stops once it reaches `support + precision`, where
/// `precision` is redrawn every round. The spread is what makes the demo
/// loop end on its own now and then.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    mode: PrecisionMode,
    precision: f32,
}

impl Autopilot {
    pub fn new(seed: u64, mode: PrecisionMode) -> Self {
        let mut autopilot = Self {
            rng: Pcg32::seed_from_u64(seed),
            mode,
            precision: 0.0,
        };
        autopilot.redraw();
        autopilot
    }

    pub fn precision(&self) -> f32 {
        self.precision
    }

    pub fn mode(&self) -> PrecisionMode {
        self.mode
    }

    /// Switch precision mode; takes effect immediately
    pub fn set_mode(&mut self, mode: PrecisionMode) {
        self.mode = mode;
        self.redraw();
    }

    /// Draw the stop offset for the next round
    pub fn redraw(&mut self) -> f32 {
        self.precision = match self.mode {
            PrecisionMode::Random => self
                .rng
                .random_range(-ROBOT_PRECISION_RANGE..ROBOT_PRECISION_RANGE),
            PrecisionMode::Fixed(precision) => precision,
        };
        self.precision
    }

    /// True while the moving block has not yet reached its stop point
    pub fn should_move(&self, moving: f32, support: f32) -> bool {
        moving < support + self.precision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_precision_in_range() {
        let mut autopilot = Autopilot::new(7, PrecisionMode::Random);
        for _ in 0..10_000 {
            let p = autopilot.redraw();
            assert!((-0.5..0.5).contains(&p), "precision {p} out of range");
        }
    }

    #[test]
    fn test_random_precision_varies() {
        let mut autopilot = Autopilot::new(42, PrecisionMode::Random);
        let first = autopilot.precision();
        let differs = (0..100).any(|_| autopilot.redraw() != first);
        assert!(differs);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = Autopilot::new(99, PrecisionMode::Random);
        let mut b = Autopilot::new(99, PrecisionMode::Random);
        for _ in 0..50 {
            assert_eq!(a.redraw(), b.redraw());
        }
    }

    #[test]
    fn test_fixed_precision() {
        let mut autopilot = Autopilot::new(1, PrecisionMode::Fixed(0.0001));
        assert_eq!(autopilot.precision(), 0.0001);
        assert_eq!(autopilot.redraw(), 0.0001);
    }

    #[test]
    fn test_should_move_threshold() {
        let autopilot = Autopilot::new(1, PrecisionMode::Fixed(0.25));
        assert!(autopilot.should_move(0.0, 0.0));
        assert!(autopilot.should_move(0.24, 0.0));
        assert!(!autopilot.should_move(0.25, 0.0));
        assert!(!autopilot.should_move(3.0, 0.0));
        assert!(autopilot.should_move(1.0, 1.0));
    }

    #[test]
    fn test_set_mode_redraws() {
        let mut autopilot = Autopilot::new(5, PrecisionMode::Random);
        autopilot.set_mode(PrecisionMode::Fixed(0.0));
        assert_eq!(autopilot.precision(), 0.0);
        assert_eq!(autopilot.mode(), PrecisionMode::Fixed(0.0));
    }
}
