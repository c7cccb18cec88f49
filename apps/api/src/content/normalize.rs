//! Text normalization: turns rendered page text into clean, bounded lines.

/// Upper bound on normalized content, in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Two consecutive spaces inside a line separate independent phrases
/// (headline fragments, menu items flattened by text extraction).
const PHRASE_SEPARATOR: &str = "  ";

/// Normalizes raw page text:
/// trim every line, split lines on double spaces, drop blanks,
/// rejoin with `\n`, cap at [`MAX_CONTENT_CHARS`].
///
/// Never fails. Applying it to its own output returns the same string.
pub fn normalize_text(raw: &str) -> String {
    let joined = raw
        .split(is_line_boundary)
        .map(str::trim)
        .flat_map(|line| line.split(PHRASE_SEPARATOR))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    // A cut can land just after a space or newline; trim so the result is stable.
    truncate_chars(&joined, MAX_CONTENT_CHARS)
        .trim_end()
        .to_string()
}

/// Returns at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

// Same boundary set as Unicode-aware `splitlines`; `\r\n` yields an empty
// fragment between the two characters, which the blank filter drops.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}
