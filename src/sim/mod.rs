//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - One step per rendered frame
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Never fails; collaborator errors are handled before input reaches it

pub mod hit;
pub mod pointer;
pub mod state;
pub mod step;
pub mod target;
pub mod tick;

pub use hit::{Hit, resolve_shot};
pub use pointer::PointerSmoother;
pub use state::{Burst, GameEvent, World};
pub use step::{StepOutcome, step_target};
pub use target::{Facing, Side, Target, TargetKind, TargetState, spawn};
pub use tick::{TickInput, tick};
