//! Draw list construction
//!
//! Everything the canvas needs for one frame, in paint order. Building the
//! list touches no browser APIs, so what gets drawn is testable natively.

use glam::Vec2;

use crate::sim::{Facing, TargetKind, TargetState, World};

/// Side of one square frame in the sprite sheet, in source pixels
pub const SPRITE_FRAME_PX: f64 = 256.0;
/// Frames per row in the sprite sheet (2x2 layout)
pub const SPRITE_COLUMNS: u8 = 2;
/// Drawn target size as a fraction of canvas height
pub const TARGET_DRAW_SIZE: f32 = 0.12;
/// Crosshair radius as a fraction of canvas height
pub const CURSOR_RADIUS: f32 = 0.03;
/// Largest radius a hit burst reaches, as a fraction of canvas height
pub const BURST_MAX_RADIUS: f32 = 0.08;

/// One drawing primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCmd {
    /// Sky and ground
    Background,
    /// A target sprite
    Target {
        pos: Vec2,
        sprite_frame: u8,
        facing: Facing,
        state: TargetState,
        kind: TargetKind,
    },
    /// Expanding ring where a target was hit
    Burst { pos: Vec2, life: f32 },
    /// Full-screen muzzle flash
    Flash { intensity: f32 },
    /// Crosshair at the smoothed cursor
    Cursor { pos: Vec2 },
}

/// Primitives for one frame, in the order they are painted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub cmds: Vec<DrawCmd>,
}

impl DrawList {
    /// Background, targets, effects, cursor
    pub fn build(world: &World, effects: bool) -> Self {
        let mut cmds = Vec::with_capacity(world.targets.len() + world.bursts.len() + 3);
        cmds.push(DrawCmd::Background);

        for target in &world.targets {
            if target.state == TargetState::Escaped {
                continue;
            }
            cmds.push(DrawCmd::Target {
                pos: target.pos,
                sprite_frame: target.sprite_frame,
                facing: target.facing(),
                state: target.state,
                kind: target.kind,
            });
        }

        if effects {
            for burst in &world.bursts {
                cmds.push(DrawCmd::Burst {
                    pos: burst.pos,
                    life: burst.life,
                });
            }
            if world.flash > 0.0 {
                cmds.push(DrawCmd::Flash {
                    intensity: world.flash,
                });
            }
        }

        cmds.push(DrawCmd::Cursor {
            pos: world.cursor.pos(),
        });
        Self { cmds }
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

/// Source rectangle origin of a frame in the 2x2 sprite sheet
pub fn sprite_source(frame: u8) -> (f64, f64) {
    let col = frame % SPRITE_COLUMNS;
    let row = (frame / SPRITE_COLUMNS) % SPRITE_COLUMNS;
    (f64::from(col) * SPRITE_FRAME_PX, f64::from(row) * SPRITE_FRAME_PX)
}

/// Fallback fill for a target when the sprite sheet is unavailable
pub fn kind_color(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Green => "#3a7d44",
        TargetKind::Red => "#b23a48",
        TargetKind::Blue => "#2f5d8a",
    }
}

/// Burst radius grows as its life runs out
pub fn burst_radius(life: f32) -> f32 {
    BURST_MAX_RADIUS * (1.0 - life.clamp(0.0, 1.0))
}
