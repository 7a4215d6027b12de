//! Target entities and spawning

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Lifecycle of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    /// Alive and hittable
    Flying,
    /// Hit, falling out of the sky
    Shot,
    /// Left the play area unharmed (terminal)
    Escaped,
}

/// Cosmetic sprite tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    Green,
    Red,
    Blue,
}

/// Which way the sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// Edge of the screen a target enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A target entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: TargetState,
    pub kind: TargetKind,
    /// Frames spent flying (drives the wing cycle)
    pub anim_ticks: u32,
    /// Current sprite frame (0..WING_FRAMES)
    pub sprite_frame: u8,
}

impl Target {
    /// Launch a flying target from `side` at height `y`
    ///
    /// `climb` is the upward speed before the multiplier is applied.
    pub fn launch(id: u32, side: Side, y: f32, climb: f32, round: u32, speed_multiplier: f32) -> Self {
        let base_speed = BASE_SPEED + round as f32 * SPEED_PER_ROUND;
        let (x, dir) = match side {
            Side::Left => (SPAWN_LEFT_X, 1.0),
            Side::Right => (SPAWN_RIGHT_X, -1.0),
        };
        Self {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::new(dir * base_speed * speed_multiplier, -climb * speed_multiplier),
            state: TargetState::Flying,
            kind: TargetKind::Green,
            anim_ticks: 0,
            sprite_frame: 0,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.state == TargetState::Flying
    }

    /// Sprites are drawn facing right and mirrored when moving left
    pub fn facing(&self) -> Facing {
        if self.vel.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    /// Switch into the falling state
    pub fn mark_shot(&mut self) {
        self.state = TargetState::Shot;
        self.vel = Vec2::new(0.0, FALL_START_SPEED);
    }
}

/// Create one flying target with randomized entry side, height and climb
pub fn spawn<R: Rng + ?Sized>(rng: &mut R, id: u32, round: u32, speed_multiplier: f32) -> Target {
    let side = if rng.random_bool(0.5) {
        Side::Left
    } else {
        Side::Right
    };
    let y = SPAWN_Y_MIN + rng.random::<f32>() * SPAWN_Y_SPREAD;
    let climb = CLIMB_SPEED_MIN + rng.random::<f32>() * CLIMB_SPEED_SPREAD;
    let target = Target::launch(id, side, y, climb, round, speed_multiplier);
    log::debug!(
        "Spawned target {} from {:?} at y={:.3} vel=({:.5}, {:.5})",
        id,
        side,
        y,
        target.vel.x,
        target.vel.y
    );
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_launch_points_inward() {
        let left = Target::launch(1, Side::Left, 0.7, 0.004, 1, 1.0);
        assert_eq!(left.pos.x, SPAWN_LEFT_X);
        assert!(left.vel.x > 0.0);
        assert_eq!(left.facing(), Facing::Right);

        let right = Target::launch(2, Side::Right, 0.7, 0.004, 1, 1.0);
        assert_eq!(right.pos.x, SPAWN_RIGHT_X);
        assert!(right.vel.x < 0.0);
        assert_eq!(right.facing(), Facing::Left);
    }

    #[test]
    fn test_launch_speed_scales_with_round_and_multiplier() {
        let t = Target::launch(1, Side::Left, 0.7, 0.004, 4, 2.0);
        let expected_vx = (0.002 + 4.0 * 0.0003) * 2.0;
        assert!((t.vel.x - expected_vx).abs() < 1e-7);
        assert!((t.vel.y + 0.008).abs() < 1e-7);
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut saw_left = false;
        let mut saw_right = false;

        for id in 0..500 {
            let t = spawn(&mut rng, id, 1, 1.0);
            assert!(t.is_flying());
            assert!((0.60..=0.80).contains(&t.pos.y));
            assert!(t.vel.y <= -0.003 && t.vel.y >= -0.006);
            match t.pos.x {
                x if x == SPAWN_LEFT_X => saw_left = true,
                x if x == SPAWN_RIGHT_X => saw_right = true,
                x => panic!("unexpected spawn x {x}"),
            }
        }
        assert!(saw_left && saw_right);
    }

    #[test]
    fn test_mark_shot() {
        let mut t = Target::launch(1, Side::Right, 0.7, 0.004, 1, 1.0);
        t.mark_shot();
        assert_eq!(t.state, TargetState::Shot);
        assert_eq!(t.vel, Vec2::new(0.0, FALL_START_SPEED));
    }
}
