//! Exponential smoothing for the cursor follower
//!
//! Each step moves the follower a fixed fraction of the remaining distance
//! toward its target, so the distance shrinks geometrically by `1 - blend`
//! per frame regardless of how often the target changes.

use crate::capture::input::Point;

/// 1D follower tracking a position
#[derive(Debug, Clone)]
pub struct FollowerState {
    pub position: f64,
}

impl FollowerState {
    pub fn new(initial: f64) -> Self {
        Self { position: initial }
    }

    /// Advance one frame toward the target: `position += (target - position) × blend`
    pub fn step(&mut self, target: f64, blend: f64) {
        self.position += (target - self.position) * blend;
    }
}

/// 2D follower for the cursor ring (X and Y axes)
#[derive(Debug, Clone)]
pub struct Follower2D {
    pub x: FollowerState,
    pub y: FollowerState,
}

impl Follower2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: FollowerState::new(x),
            y: FollowerState::new(y),
        }
    }

    pub fn step(&mut self, target: Point, blend: f64) {
        self.x.step(target.x, blend);
        self.y.step(target.y, blend);
    }

    pub fn position(&self) -> Point {
        Point::new(self.x.position, self.y.position)
    }

    pub fn reset(&mut self, to: Point) {
        self.x = FollowerState::new(to.x);
        self.y = FollowerState::new(to.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLEND: f64 = 0.15;

    #[test]
    fn test_follower_approaches_target() {
        let mut state = FollowerState::new(0.0);
        for _ in 0..60 {
            state.step(100.0, BLEND);
        }
        assert!(
            (state.position - 100.0).abs() < 0.1,
            "Position {} should be close to 100",
            state.position
        );
    }

    #[test]
    fn test_distance_decays_by_constant_factor() {
        let target = Point::new(400.0, -300.0);
        let mut follower = Follower2D::new(0.0, 0.0);
        let mut previous = follower.position().distance_to(target);

        for frame in 0..40 {
            follower.step(target, BLEND);
            let distance = follower.position().distance_to(target);
            assert!(distance < previous, "frame {} did not get closer", frame);
            assert!(
                (distance / previous - 0.85).abs() < 1e-9,
                "frame {} ratio {}",
                frame,
                distance / previous
            );
            previous = distance;
        }
    }

    #[test]
    fn test_never_overshoots() {
        let mut state = FollowerState::new(0.0);
        for _ in 0..200 {
            state.step(50.0, BLEND);
            assert!(state.position <= 50.0);
        }
    }

    #[test]
    fn test_reset_jumps_to_position() {
        let mut follower = Follower2D::new(0.0, 0.0);
        follower.step(Point::new(100.0, 100.0), BLEND);
        follower.reset(Point::new(500.0, 250.0));
        assert_eq!(follower.position(), Point::new(500.0, 250.0));
    }
}
