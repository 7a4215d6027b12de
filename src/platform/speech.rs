//! Speech synthesis for commentary lines

use web_sys::SpeechSynthesisUtterance;

use crate::commentary::Lang;

/// Speak `text` with a voice matching `lang`
///
/// Failures are logged and otherwise ignored; speech is decoration.
pub fn speak(text: &str, lang: Lang) {
    let Some(synth) = web_sys::window().and_then(|w| w.speech_synthesis().ok()) else {
        log::debug!("Speech synthesis unavailable");
        return;
    };
    match SpeechSynthesisUtterance::new_with_text(text) {
        Ok(utterance) => {
            utterance.set_lang(lang.speech_locale());
            synth.speak(&utterance);
        }
        Err(e) => log::warn!("Failed to create utterance: {:?}", e),
    }
}

/// Stop anything still being spoken (session teardown)
pub fn cancel() {
    if let Some(synth) = web_sys::window().and_then(|w| w.speech_synthesis().ok()) {
        synth.cancel();
    }
}
