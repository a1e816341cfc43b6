//! Address completion for mail header lines.
//!
//! The host drives completion in two phases, the same way Vim calls a
//! `completefunc`: first with `findstart` to learn where the partial address
//! begins, then with the extracted partial text to get candidates.

use serde::Serialize;

/// Header prefixes that carry addresses. Matched case-sensitively at column 0.
pub const ADDRESS_FIELDS: [&str; 4] = ["From: ", "To: ", "Cc: ", "Bcc: "];

/// Separator between the header name and its value.
const FIELD_DELIMITER: &str = ": ";

/// Host return code for "no completion here, leave completion mode quietly".
pub const NOT_APPLICABLE_CODE: i64 = -3;

/// Result of the first completion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStart {
    /// Zero-based byte column where the partial address begins.
    Start(usize),
    /// The cursor line is not an address field.
    NotApplicable,
}

impl FindStart {
    /// The integer the host's completion function expects.
    pub fn to_host_code(self) -> i64 {
        match self {
            FindStart::Start(col) => col as i64,
            FindStart::NotApplicable => NOT_APPLICABLE_CODE,
        }
    }
}

/// One call of the two-phase completion protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteRequest<'a> {
    FindStart { line: &'a str, col: usize },
    Matches { base: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteResponse {
    Start(usize),
    NotApplicable,
    Matches(Vec<String>),
}

impl From<FindStart> for CompleteResponse {
    fn from(value: FindStart) -> Self {
        match value {
            FindStart::Start(col) => CompleteResponse::Start(col),
            FindStart::NotApplicable => CompleteResponse::NotApplicable,
        }
    }
}

/// Both phases in one answer: the span to replace and what to offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Zero-based byte column where replacement begins. Replacement ends at
    /// the cursor.
    pub start: usize,
    pub candidates: Vec<String>,
}

/// True if `line` begins with one of [`ADDRESS_FIELDS`].
pub fn is_address_field(line: &str) -> bool {
    ADDRESS_FIELDS.iter().any(|field| line.starts_with(field))
}

/// Locate the start of the address under the cursor.
///
/// `col` is the zero-based byte column of the cursor; text before it is what
/// the user has typed. The scan walks back toward the header delimiter and
/// stops after the nearest `,` (skipping one following space), so both
/// `"a, b"` and `"a,b"` separate addresses.
pub fn find_start(line: &str, col: usize) -> FindStart {
    if !is_address_field(line) {
        return FindStart::NotApplicable;
    }
    let field_start = match line.find(FIELD_DELIMITER) {
        Some(idx) => idx + FIELD_DELIMITER.len(),
        None => return FindStart::NotApplicable,
    };

    let col = cursor_boundary(line, col);
    if col < field_start {
        return FindStart::NotApplicable;
    }

    let typed = &line[field_start..col];
    let start = match typed.rfind(',') {
        Some(comma) => {
            let after = field_start + comma + 1;
            if after < col && line.as_bytes()[after] == b' ' {
                after + 1
            } else {
                after
            }
        }
        None => field_start,
    };
    FindStart::Start(start)
}

/// Clamp a cursor column to the line and back it off to a char boundary.
pub(crate) fn cursor_boundary(line: &str, col: usize) -> usize {
    let mut col = col.min(line.len());
    while !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

/// Expand each ASCII letter of `base` into a two-case class (`a` becomes
/// `[aA]`). All other characters are copied as-is and keep their regex
/// meaning.
pub fn case_insensitive_pattern(base: &str) -> String {
    let mut pattern = String::with_capacity(base.len() * 4);
    for ch in base.chars() {
        if ch.is_ascii_alphabetic() {
            pattern.push('[');
            pattern.push(ch.to_ascii_lowercase());
            pattern.push(ch.to_ascii_uppercase());
            pattern.push(']');
        } else {
            pattern.push(ch);
        }
    }
    pattern
}
