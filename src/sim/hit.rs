//! Shot-to-target hit resolution
//!
//! First match wins: targets are scanned in id order and the first flying
//! target inside the hit radius is taken, even if a later one is closer.

use glam::Vec2;

use super::target::Target;
use crate::consts::{HEADSHOT_RADIUS, HIT_RADIUS};

/// A resolved hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target_id: u32,
    /// Where the target was when it was hit
    pub pos: Vec2,
    /// Cursor-to-target distance
    pub distance: f32,
    pub headshot: bool,
}

/// Resolve one shoot event against the live targets
///
/// At most one target transitions to `Shot`. Returns `None` on a clean miss,
/// in which case nothing was modified.
pub fn resolve_shot(targets: &mut [Target], cursor: Vec2) -> Option<Hit> {
    let target = targets
        .iter_mut()
        .filter(|t| t.is_flying())
        .find(|t| t.pos.distance(cursor) < HIT_RADIUS)?;

    let distance = target.pos.distance(cursor);
    let hit = Hit {
        target_id: target.id,
        pos: target.pos,
        distance,
        headshot: distance < HEADSHOT_RADIUS,
    };
    target.mark_shot();
    Some(hit)
}
