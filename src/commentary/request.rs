//! Commentary request and its local validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest score the service will accept
pub const MAX_SCORE: u64 = 1_000_000;
/// Largest miss count the service will accept
pub const MAX_MISSES: u32 = 1000;
/// Largest round the service will accept
pub const MAX_ROUND: u32 = 100;

/// Commentary language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English
    En,
    /// Hindi
    Hi,
    /// Haryanvi
    Hr,
    /// Rajasthani
    Rj,
}

impl Lang {
    pub const ALL: [Lang; 4] = [Lang::En, Lang::Hi, Lang::Hr, Lang::Rj];

    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Hi => "hi",
            Lang::Hr => "hr",
            Lang::Rj => "rj",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Hi => "Hindi",
            Lang::Hr => "Haryanvi",
            Lang::Rj => "Rajasthani",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        match code.to_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "hi" => Ok(Lang::Hi),
            "hr" => Ok(Lang::Hr),
            "rj" => Ok(Lang::Rj),
            _ => Err(ValidationError::Language(code.to_string())),
        }
    }

    /// BCP 47 tag for the speech voice
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Lang::Hi => "hi-IN",
            _ => "en-US",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid score value {0}")]
    Score(u64),
    #[error("invalid misses value {0}")]
    Misses(u32),
    #[error("invalid round value {0}")]
    Round(u32),
    #[error("invalid language {0:?}")]
    Language(String),
}

/// What the commentary service is told about the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryRequest {
    pub score: u64,
    pub misses: u32,
    pub round: u32,
    pub lang: Lang,
}

impl CommentaryRequest {
    pub fn new(score: u64, misses: u32, round: u32, lang: Lang) -> Self {
        Self {
            score,
            misses,
            round,
            lang,
        }
    }

    /// Range checks; anything out of range is rejected before a call is made
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.score > MAX_SCORE {
            return Err(ValidationError::Score(self.score));
        }
        if self.misses > MAX_MISSES {
            return Err(ValidationError::Misses(self.misses));
        }
        if self.round > MAX_ROUND {
            return Err(ValidationError::Round(self.round));
        }
        Ok(())
    }

    /// Key used for rate limiting
    pub fn rate_limit_key(&self) -> String {
        format!("roast-{}", self.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        assert!(CommentaryRequest::new(1200, 3, 4, Lang::Hi).validate().is_ok());
        assert!(CommentaryRequest::new(MAX_SCORE, MAX_MISSES, MAX_ROUND, Lang::En)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            CommentaryRequest::new(MAX_SCORE + 1, 0, 1, Lang::En).validate(),
            Err(ValidationError::Score(MAX_SCORE + 1))
        );
        assert_eq!(
            CommentaryRequest::new(0, 1001, 1, Lang::En).validate(),
            Err(ValidationError::Misses(1001))
        );
        assert_eq!(
            CommentaryRequest::new(0, 0, 101, Lang::En).validate(),
            Err(ValidationError::Round(101))
        );
    }

    #[test]
    fn test_language_codes() {
        for lang in Lang::ALL {
            assert_eq!(Lang::from_code(lang.code()), Ok(lang));
        }
        assert_eq!(Lang::from_code("RJ"), Ok(Lang::Rj));
        assert_eq!(
            Lang::from_code("fr"),
            Err(ValidationError::Language("fr".to_string()))
        );
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&CommentaryRequest::new(300, 2, 4, Lang::Hr)).unwrap();
        assert_eq!(json, r#"{"score":300,"misses":2,"round":4,"lang":"hr"}"#);
    }
}
