//! Cursor smoothing
//!
//! First-order low-pass over the raw aim point. Runs once per rendered frame
//! against the latest sample only, so the cursor moves the same amount no
//! matter how many tracking results arrived in between.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CURSOR_SMOOTHING, CURSOR_START};

/// Smoothed on-screen cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSmoother {
    pos: Vec2,
    alpha: f32,
}

impl Default for PointerSmoother {
    fn default() -> Self {
        Self::new(Vec2::new(CURSOR_START.0, CURSOR_START.1))
    }
}

impl PointerSmoother {
    pub fn new(start: Vec2) -> Self {
        Self {
            pos: start,
            alpha: CURSOR_SMOOTHING,
        }
    }

    /// Current smoothed position
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Move a fraction of the way toward `raw` and return the new position
    pub fn update(&mut self, raw: Vec2) -> Vec2 {
        self.pos += (raw - self.pos) * self.alpha;
        self.pos
    }
}
