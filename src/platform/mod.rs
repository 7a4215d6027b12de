//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (rate limiting, shot debounce)
//! - Timers (commentary timeouts)
//! - Speech playback (browser only)

pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod speech;

use futures::future::LocalBoxFuture;

pub use time::SystemClock;
#[cfg(not(target_arch = "wasm32"))]
pub use time::ThreadTimer;
#[cfg(target_arch = "wasm32")]
pub use time::BrowserTimer;

/// Source of wall-clock milliseconds
///
/// Injected wherever time matters so tests can drive it by hand.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Something that can wait without blocking the frame loop
pub trait Timer {
    /// Resolves after roughly `ms` milliseconds
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}
