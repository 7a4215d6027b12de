//! Game settings
//!
//! Supplied by the host page as a JSON blob when the game starts. Missing
//! fields take their defaults; nothing is written back.

use serde::{Deserialize, Serialize};

use crate::commentary::COMMENTARY_TIMEOUT_MS;
use crate::commentary::rate_limit::{MAX_REQUESTS_PER_WINDOW, RATE_LIMIT_WINDOW_MS};
use crate::session::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty for the next session
    pub difficulty: Difficulty,

    // === Commentary ===
    /// Endpoint that generates roasts (fallback lines only when unset)
    pub commentary_endpoint: Option<String>,
    /// Give up on the endpoint after this long
    pub commentary_timeout_ms: u32,
    /// Rate limit window length
    pub rate_limit_window_ms: f64,
    /// Requests allowed per window and round
    pub rate_limit_max_requests: u32,
    /// Read commentary aloud
    pub speech: bool,

    // === Visual ===
    /// Muzzle flash and hit bursts
    pub effects: bool,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,

            commentary_endpoint: None,
            commentary_timeout_ms: COMMENTARY_TIMEOUT_MS,
            rate_limit_window_ms: RATE_LIMIT_WINDOW_MS,
            rate_limit_max_requests: MAX_REQUESTS_PER_WINDOW,
            speech: true,

            effects: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Settings with a given difficulty and everything else default
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse host-supplied settings, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => {
                log::info!("Loaded settings (difficulty: {})", settings.difficulty.as_str());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Invalid settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Clamp values that would break the commentary boundary
    fn sanitized(mut self) -> Self {
        if self.commentary_timeout_ms == 0 {
            self.commentary_timeout_ms = COMMENTARY_TIMEOUT_MS;
        }
        if !(self.rate_limit_window_ms.is_finite() && self.rate_limit_window_ms > 0.0) {
            self.rate_limit_window_ms = RATE_LIMIT_WINDOW_MS;
        }
        if let Some(endpoint) = &self.commentary_endpoint
            && endpoint.trim().is_empty()
        {
            self.commentary_endpoint = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"difficulty":"hard","speech":false}"#);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(!settings.speech);
        assert_eq!(settings.commentary_timeout_ms, 5000);
        assert_eq!(settings.rate_limit_max_requests, 10);
    }

    #[test]
    fn test_garbage_uses_defaults() {
        assert_eq!(Settings::from_json("{not json"), Settings::default());
        assert_eq!(Settings::from_json(""), Settings::default());
    }

    #[test]
    fn test_bad_values_are_clamped() {
        let settings = Settings::from_json(
            r#"{"commentary_timeout_ms":0,"rate_limit_window_ms":-5,"commentary_endpoint":"  "}"#,
        );
        assert_eq!(settings.commentary_timeout_ms, COMMENTARY_TIMEOUT_MS);
        assert_eq!(settings.rate_limit_window_ms, RATE_LIMIT_WINDOW_MS);
        assert_eq!(settings.commentary_endpoint, None);
    }
}
