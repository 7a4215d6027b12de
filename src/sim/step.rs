//! Per-frame physics and animation for a single target
//!
//! One explicit Euler step per rendered frame. The stepper never removes
//! anything itself; it reports what happened and the world compacts afterwards.

use super::target::{Target, TargetState};
use crate::consts::*;

/// What a step did to a target's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still on screen
    Alive,
    /// Flying target dropped out of the bottom
    Escaped,
    /// Shot target finished falling
    FellOut,
}

impl StepOutcome {
    /// Whether the target should be removed after this frame
    pub fn removes(self) -> bool {
        self != StepOutcome::Alive
    }
}

/// Advance one target by one frame
pub fn step_target(target: &mut Target) -> StepOutcome {
    match target.state {
        TargetState::Flying => step_flying(target),
        TargetState::Shot => step_falling(target),
        TargetState::Escaped => StepOutcome::Escaped,
    }
}

fn step_flying(target: &mut Target) -> StepOutcome {
    target.pos += target.vel;

    // Wall and ceiling bounce
    if target.pos.x <= WALL_LEFT || target.pos.x >= WALL_RIGHT {
        target.vel.x = -target.vel.x;
    }
    if target.pos.y <= CEILING {
        target.vel.y = -target.vel.y;
    }

    target.vel.y += FLIGHT_GRAVITY;

    target.anim_ticks += 1;
    if target.anim_ticks.is_multiple_of(TICKS_PER_WING_FRAME) {
        target.sprite_frame = (target.sprite_frame + 1) % WING_FRAMES;
    }

    if target.pos.y > ESCAPE_Y {
        target.state = TargetState::Escaped;
        return StepOutcome::Escaped;
    }
    StepOutcome::Alive
}

fn step_falling(target: &mut Target) -> StepOutcome {
    target.pos += target.vel;
    target.vel.y += FALL_GRAVITY;
    target.sprite_frame = FALLING_FRAME;

    if target.pos.y > FALL_OUT_Y {
        StepOutcome::FellOut
    } else {
        StepOutcome::Alive
    }
}
