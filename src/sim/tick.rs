//! Per-frame simulation tick
//!
//! Sequence: smooth the cursor, step every target, remove the ones that left
//! the screen and respawn, then resolve a pending shot against what is left.
//! Callers that track rounds outside the world can skip the respawn and
//! refill once they know the round the outcome led to.

use glam::Vec2;

use super::hit::resolve_shot;
use super::state::{BURST_FRAMES, Burst, FLASH_DECAY, GameEvent, World};
use super::step::{StepOutcome, step_target};

/// Inputs for a single frame
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Latest raw aim point (already mirrored and clamped)
    pub aim: Vec2,
    /// A shoot edge arrived since the previous frame
    pub shoot: bool,
    /// Current round, scales spawn speed
    pub round: u32,
    /// Difficulty speed multiplier
    pub speed_multiplier: f32,
    /// Top the arena back up after removals
    pub refill: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            aim: Vec2::new(crate::consts::CURSOR_START.0, crate::consts::CURSOR_START.1),
            shoot: false,
            round: 1,
            speed_multiplier: 1.0,
            refill: true,
        }
    }
}

/// Advance the world by one frame, appending what happened to `events`
pub fn tick(world: &mut World, input: &TickInput, events: &mut Vec<GameEvent>) {
    world.frame += 1;

    let cursor = world.cursor.update(input.aim);

    // Physics: only mark outcomes here
    let mut dead = Vec::new();
    for target in &mut world.targets {
        let outcome = step_target(target);
        if outcome == StepOutcome::Escaped {
            events.push(GameEvent::TargetEscaped {
                id: target.id,
                pos: target.pos,
            });
        }
        if outcome.removes() {
            dead.push(target.id);
        }
    }

    world.compact(&dead);
    if input.refill {
        world.refill(input.round, input.speed_multiplier, events);
    }

    if input.shoot {
        events.push(GameEvent::ShotFired { pos: cursor });
        world.flash = 1.0;
        match resolve_shot(&mut world.targets, cursor) {
            Some(hit) => {
                log::debug!(
                    "Hit target {} at ({:.3}, {:.3}), distance {:.3}{}",
                    hit.target_id,
                    hit.pos.x,
                    hit.pos.y,
                    hit.distance,
                    if hit.headshot { " (headshot)" } else { "" }
                );
                world.bursts.push(Burst {
                    pos: hit.pos,
                    life: 1.0,
                });
                events.push(GameEvent::TargetHit(hit));
            }
            None => log::trace!("Shot at ({:.3}, {:.3}) hit nothing", cursor.x, cursor.y),
        }
    }

    // Cosmetics
    world.flash *= FLASH_DECAY;
    if world.flash < 0.01 {
        world.flash = 0.0;
    }
    for burst in &mut world.bursts {
        burst.life -= 1.0 / BURST_FRAMES;
    }
    world.bursts.retain(|b| b.life > 0.0);

    world.normalize_order();
}
