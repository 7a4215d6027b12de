//! Hand-tracking input boundary
//!
//! The vision model hands us 21 normalized landmarks per frame. Only two
//! things cross into the game: the aim point (index fingertip, mirrored and
//! clamped) and the thumb-to-index pinch distance. Frames that fail
//! validation are dropped and the previous input stays in effect.

use glam::Vec2;
use thiserror::Error;

/// Landmark index of the thumb tip
pub const THUMB_TIP: usize = 4;
/// Landmark index of the index fingertip
pub const INDEX_TIP: usize = 8;
/// Landmarks per hand
pub const HAND_LANDMARKS: usize = 21;

/// Pinch distance that counts as pulling the trigger
pub const PINCH_THRESHOLD: f32 = 0.05;
/// Minimum time between two shots from the same hand
pub const SHOT_DEBOUNCE_MS: f64 = 300.0;

/// A single landmark as reported by the vision model
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum VisionError {
    #[error("expected {HAND_LANDMARKS} landmarks, got {0}")]
    MissingLandmarks(usize),
    #[error("non-finite coordinate in landmark {0}")]
    NonFinite(usize),
    #[error("flat landmark buffer length {0} is not a multiple of 3")]
    BadBufferLength(usize),
}

/// The only part of a tracking result the game consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionSample {
    /// Mirrored, clamped aim point in screen space
    pub aim: Vec2,
    /// Thumb-to-index distance in camera space
    pub pinch_distance: f32,
}

impl VisionSample {
    /// Validate raw values from the host
    ///
    /// `raw_x` is in camera space and gets mirrored so moving the hand right
    /// moves the cursor right.
    pub fn new(raw_x: f32, raw_y: f32, pinch_distance: f32) -> Result<Self, VisionError> {
        if !raw_x.is_finite() || !raw_y.is_finite() {
            return Err(VisionError::NonFinite(INDEX_TIP));
        }
        if !pinch_distance.is_finite() {
            return Err(VisionError::NonFinite(THUMB_TIP));
        }
        Ok(Self {
            aim: mirror_and_clamp(raw_x, raw_y),
            pinch_distance: pinch_distance.max(0.0),
        })
    }

    /// Extract aim and pinch from a full hand
    pub fn from_landmarks(landmarks: &[HandLandmark]) -> Result<Self, VisionError> {
        if landmarks.len() < HAND_LANDMARKS {
            return Err(VisionError::MissingLandmarks(landmarks.len()));
        }
        for idx in [THUMB_TIP, INDEX_TIP] {
            let lm = landmarks[idx];
            if !lm.x.is_finite() || !lm.y.is_finite() {
                return Err(VisionError::NonFinite(idx));
            }
        }

        let index = landmarks[INDEX_TIP];
        let thumb = landmarks[THUMB_TIP];
        let pinch = Vec2::new(thumb.x, thumb.y).distance(Vec2::new(index.x, index.y));
        Self::new(index.x, index.y, pinch)
    }

    /// Extract from a flat `[x, y, z, x, y, z, ...]` buffer (the JS interop shape)
    pub fn from_flat(data: &[f32]) -> Result<Self, VisionError> {
        if !data.len().is_multiple_of(3) {
            return Err(VisionError::BadBufferLength(data.len()));
        }
        let landmarks: Vec<HandLandmark> = data
            .chunks_exact(3)
            .map(|c| HandLandmark {
                x: c[0],
                y: c[1],
                z: c[2],
            })
            .collect();
        Self::from_landmarks(&landmarks)
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_distance < PINCH_THRESHOLD
    }
}

/// Mirror horizontally (camera faces the player) and clamp to the screen
pub fn mirror_and_clamp(x: f32, y: f32) -> Vec2 {
    Vec2::new((1.0 - x).clamp(0.0, 1.0), y.clamp(0.0, 1.0))
}

/// Turns pinch samples into debounced shoot edges
///
/// Every accepted pinch bumps `sequence`; the frame loop fires once per
/// change it observes, so a held pinch or a burst of repeats can't
/// double-fire.
#[derive(Debug, Clone, Default)]
pub struct ShotTrigger {
    last_shot_ms: Option<f64>,
    sequence: u64,
}

impl ShotTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample taken at `now_ms`; returns true if it fired
    pub fn observe(&mut self, sample: &VisionSample, now_ms: f64) -> bool {
        if !sample.is_pinching() {
            return false;
        }
        self.pull(now_ms)
    }

    /// Fire directly (e.g. host-side gesture detection), still debounced
    pub fn pull(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_shot_ms
            && now_ms - last <= SHOT_DEBOUNCE_MS
        {
            return false;
        }
        self.last_shot_ms = Some(now_ms);
        self.sequence += 1;
        log::debug!("Shot #{} at {:.0}ms", self.sequence, now_ms);
        true
    }

    /// Number of shots fired so far
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Latest input waiting for the next frame
///
/// Written by input callbacks, read once per frame by the loop.
#[derive(Debug, Clone)]
pub struct PendingInput {
    /// Latest aim sample; older ones are simply overwritten
    pub aim: Vec2,
    pub trigger: ShotTrigger,
    consumed_sequence: u64,
}

impl Default for PendingInput {
    fn default() -> Self {
        Self {
            aim: Vec2::new(crate::consts::CURSOR_START.0, crate::consts::CURSOR_START.1),
            trigger: ShotTrigger::new(),
            consumed_sequence: 0,
        }
    }
}

impl PendingInput {
    /// Accept a validated sample
    pub fn push_sample(&mut self, sample: VisionSample, now_ms: f64) {
        self.aim = sample.aim;
        self.trigger.observe(&sample, now_ms);
    }

    /// Accept a tracking result, keeping the last good input on failure
    pub fn push_landmarks(&mut self, landmarks: &[HandLandmark], now_ms: f64) -> Result<(), VisionError> {
        let sample = VisionSample::from_landmarks(landmarks).inspect_err(|e| {
            log::debug!("Dropped vision frame: {}", e);
        })?;
        self.push_sample(sample, now_ms);
        Ok(())
    }

    /// Whether a shot arrived since the last call; consumes it
    pub fn take_shot(&mut self) -> bool {
        let seq = self.trigger.sequence();
        if seq != self.consumed_sequence {
            self.consumed_sequence = seq;
            true
        } else {
            false
        }
    }
}
