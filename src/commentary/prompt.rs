//! Prompt text for text-generation backends

use super::request::CommentaryRequest;
use crate::session::{TauntLevel, taunt_level};

/// Build the roast prompt for a request
///
/// The taunt level comes from the miss count so the tone escalates as the
/// player keeps missing.
pub fn build_prompt(request: &CommentaryRequest) -> String {
    let tone = match taunt_level(request.misses) {
        TauntLevel::Mild => "Keep it playful and light.",
        TauntLevel::Medium => "Be snarky, they are starting to embarrass themselves.",
        TauntLevel::Savage => "Be savage but funny, they cannot hit anything.",
    };
    format!(
        "You are the Dog from Duck Hunt. It's 2026, and you are a snarky, Gen-Z influenced critic.\n\
         The player just finished a round or missed a shot.\n\
         \n\
         Context:\n\
         - Score: {score}\n\
         - Misses: {misses}\n\
         - Round: {round}\n\
         - Language: {code} ({name})\n\
         \n\
         Task:\n\
         Generate a short, biting, funny roast in the specified language.\n\
         Keep it under 15 words. Use modern slang. {tone}\n\
         Output ONLY the roast text, nothing else.",
        score = request.score,
        misses = request.misses,
        round = request.round,
        code = request.lang.code(),
        name = request.lang.name(),
        tone = tone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::Lang;

    #[test]
    fn test_prompt_carries_context() {
        let prompt = build_prompt(&CommentaryRequest::new(420, 1, 3, Lang::Hi));
        assert!(prompt.contains("Score: 420"));
        assert!(prompt.contains("Misses: 1"));
        assert!(prompt.contains("Round: 3"));
        assert!(prompt.contains("hi (Hindi)"));
        assert!(prompt.contains("playful"));
    }

    #[test]
    fn test_tone_escalates() {
        let prompt = build_prompt(&CommentaryRequest::new(0, 9, 10, Lang::En));
        assert!(prompt.contains("savage"));
    }
}
