//! Rendering
//!
//! `scene` turns the world into a draw list; `canvas` paints it with the
//! browser's 2D context.

pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use scene::{DrawCmd, DrawList};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
