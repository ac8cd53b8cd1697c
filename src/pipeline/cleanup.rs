//! Cleanup of extracted text before layout.
//!
//! Extractors hand back whatever the source format contains, which for
//! real-world documents includes CRLF endings, stray control characters
//! (PDF text extraction is notorious for these) and trailing whitespace
//! that would wrap as an invisible word. Three cheap, deterministic
//! passes run in a defined order: line endings first so the per-line
//! passes see clean boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup passes to a list of extracted paragraphs.
///
/// A paragraph that becomes empty stays in the list: an empty source line
/// is a deliberate paragraph break, not noise.
pub fn clean_paragraphs(paragraphs: Vec<String>) -> Vec<String> {
    paragraphs
        .iter()
        .flat_map(|p| {
            let s = normalise_line_endings(p);
            // A paragraph that still contains newlines (PDF extraction can
            // emit them mid-string) splits into several.
            s.split('\n')
                .map(|line| trim_trailing(&remove_control_chars(line)))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// C0 controls except tab, plus DEL and the C1 range.
static RE_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F\u{80}-\u{9F}]").unwrap());

fn remove_control_chars(input: &str) -> String {
    RE_CONTROL.replace_all(input, "").into_owned()
}

fn trim_trailing(input: &str) -> String {
    input.trim_end().to_string()
}
