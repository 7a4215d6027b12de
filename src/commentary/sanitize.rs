//! Cleanup for generated text before it is shown or spoken

use std::sync::LazyLock;

use regex::Regex;

/// Longest line we display
pub const MAX_COMMENTARY_CHARS: usize = 200;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Strip markup, trim and cap the length; `None` if nothing is left
pub fn sanitize(text: &str) -> Option<String> {
    let without_scripts = SCRIPT_BLOCK.replace_all(text, "");
    let without_tags = TAG.replace_all(&without_scripts, "");
    let cleaned: String = without_tags
        .trim()
        .chars()
        .take(MAX_COMMENTARY_CHARS)
        .collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}
