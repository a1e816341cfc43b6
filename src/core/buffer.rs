use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use ropey::Rope;

/// Every character ropey treats as a line break (`\r\n` is handled as a pair).
const LINE_BREAKS: [char; 7] = [
    '\n', '\r', '\u{000B}', '\u{000C}', '\u{0085}', '\u{2028}', '\u{2029}',
];

/// Unique identifier for a buffer, as assigned by the host editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// Cursor position as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line.
    pub line: usize,
    /// Zero-based byte column within the line.
    pub col: usize,
}

impl Cursor {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Mirror of a mail message being composed in the host.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub id: BufferId,
    pub content: Rope,
}

impl Buffer {
    pub fn new(id: BufferId) -> Self {
        Self {
            id,
            content: Rope::new(),
        }
    }

    pub fn from_text(id: BufferId, text: &str) -> Self {
        Self {
            id,
            content: Rope::from_str(text),
        }
    }

    /// Load buffer contents from a file. Returns an io::Error if reading fails.
    pub fn from_file(id: BufferId, path: &Path) -> Result<Self, io::Error> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(id, &text))
    }

    /// Replace the whole text, e.g. after the host reports a change.
    pub fn set_text(&mut self, text: &str) {
        self.content = Rope::from_str(text);
    }

    /// Returns the number of visible lines in the buffer.
    ///
    /// Ropey's `len_lines()` counts a trailing line break as starting a new
    /// (empty) line; that phantom line is not counted here.
    pub fn len_lines(&self) -> usize {
        let n = self.content.len_lines();
        if n > 1 && self.content.line(n - 1).len_chars() == 0 {
            n - 1
        } else {
            n
        }
    }

    /// Text of `line_idx` without its line terminator.
    pub fn line_text(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.len_lines() {
            return None;
        }
        let mut text = self.content.line(line_idx).to_string();
        if text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        } else if text.ends_with(LINE_BREAKS) {
            text.pop();
        }
        Some(text)
    }

    /// First line of the message body: the line after the blank line that
    /// ends the header block. `0` if the buffer does not open with headers.
    pub fn body_start(&self) -> usize {
        let looks_like_header = self
            .line_text(0)
            .map(|l| is_header_line(&l))
            .unwrap_or(false);
        if !looks_like_header {
            return 0;
        }
        (0..self.len_lines())
            .find(|&idx| self.line_text(idx).is_some_and(|l| l.trim().is_empty()))
            .map(|blank| blank + 1)
            .unwrap_or_else(|| self.len_lines())
    }
}

/// `Name: value` with an RFC 5322 field name (printable ASCII, no colon or space).
fn is_header_line(line: &str) -> bool {
    match line.split_once(':') {
        Some((name, _)) => {
            !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':')
        }
        None => false,
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content)
    }
}
