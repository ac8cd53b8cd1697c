//! Greedy word-wrap.
//!
//! One paragraph in, lines out. Packing is greedy with no lookahead or
//! backtracking: a word goes on the current line if the line plus a single
//! separating space plus the word still measures within the usable width,
//! otherwise the line is finished and the word starts the next one. A word
//! that is wider than the usable width on its own is still placed alone on
//! its own line — no hyphenation, no error.

/// Truncate `text` to at most `max` characters (not bytes).
pub(crate) fn clip_chars(text: &str, max: Option<usize>) -> &str {
    match max {
        Some(n) => match text.char_indices().nth(n) {
            Some((idx, _)) => &text[..idx],
            None => text,
        },
        None => text,
    }
}

/// Break one paragraph into greedily packed lines.
///
/// `measure` returns the rendered width of a string in the same length unit
/// as `usable_width`. `max_chars`, when set, caps each word before it is
/// measured (the raster backend's defence against unwrappable tokens).
///
/// An empty paragraph (or one containing only whitespace) yields zero lines.
pub fn wrap_paragraph<M: Fn(&str) -> f32>(
    paragraph: &str,
    usable_width: f32,
    max_chars: Option<usize>,
    measure: &M,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        let word = clip_chars(word, max_chars);

        if current.is_empty() {
            // First word always starts the line, even if it overflows on its own.
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if measure(&candidate) <= usable_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
