//! Roast commentary
//!
//! Everything between the game and the remote text generator. Nothing in
//! here can fail the game: every error ends in a local fallback line.

pub mod client;
pub mod fallback;
pub mod http;
pub mod prompt;
pub mod rate_limit;
pub mod request;
pub mod sanitize;

pub use client::{
    COMMENTARY_TIMEOUT_MS, Commentary, CommentaryBackend, CommentaryClient, CommentaryError,
    CommentarySource, CommentaryTask,
};
pub use http::extract_text;
#[cfg(target_arch = "wasm32")]
pub use http::FetchBackend;
pub use prompt::build_prompt;
pub use rate_limit::RateLimiter;
pub use request::{CommentaryRequest, Lang, ValidationError};
pub use sanitize::sanitize;
