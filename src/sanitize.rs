//! Normalizes raw cell values into spreadsheet-safe, comparable strings.
//!
//! Bank exports and PHC extracts both arrive with stray control bytes,
//! characters that spreadsheet cells reject, and document references that
//! have been mangled with interior whitespace. Everything written to a
//! report cell, and every document reference that gets validated, passes
//! through [`sanitize`] first.

/// Characters that are not allowed in a spreadsheet cell.
const ILLEGAL_CELL_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']', '\t', '\n', '\r'];

/// The maximum length, in characters, of a document reference.
const DOCUMENT_MAX_CHARS: usize = 11;

/// Cleans a raw cell value for comparison and for writing to a report cell.
///
/// - Leading and trailing whitespace is trimmed.
/// - Control characters in the 0x00-0x1F range and the characters
///   `: \ / ? * [ ]` (plus tab, newline and carriage return) are removed.
/// - Any remaining non-printable character, including zero-width and
///   bidi format characters such as U+200B, is replaced with a single
///   space.
/// - If the result starts with `B` and contains a digit it is assumed to be
///   a document reference: interior whitespace is collapsed and the value is
///   truncated to 11 characters.
///
/// Total function: any input degrades to a cleaned string, never an error.
/// Applying it twice yields the same result as applying it once, which is
/// why the document-reference collapse runs after the character stripping.
pub fn sanitize(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if (c as u32) < 0x20 || ILLEGAL_CELL_CHARS.contains(&c) {
            continue;
        }
        if is_unprintable(c) {
            cleaned.push(' ');
        } else {
            cleaned.push(c);
        }
    }

    if looks_like_document(&cleaned) {
        cleaned = cleaned
            .split_whitespace()
            .collect::<String>()
            .chars()
            .take(DOCUMENT_MAX_CHARS)
            .collect();
    }

    cleaned.trim().to_string()
}

/// A value that starts with `B` and contains at least one digit is treated
/// as a document reference.
fn looks_like_document(value: &str) -> bool {
    value.starts_with('B') && value.chars().any(|c| c.is_ascii_digit())
}

/// Non-printable characters: controls (category Cc) plus the invisible
/// format characters bank exports occasionally smuggle in, such as
/// zero-width spaces, bidi marks, the word joiner and the BOM.
fn is_unprintable(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{200b}'..='\u{200f}'
                | '\u{2028}'..='\u{202e}'
                | '\u{2060}'..='\u{206f}'
                | '\u{feff}'
        )
}
