//! Mail alias file parsing and candidate lookup.
//!
//! The alias file is shared with the mail client, one definition per line:
//!
//! ```text
//! alias johnno John Citizen <john@isp.com> # personal email
//! ```
//!
//! Nothing here is cached: every lookup re-reads the file from disk.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::completion::case_insensitive_pattern;

/// Failure to produce candidates from the alias file.
///
/// The `Display` text is the warning shown to the user and always names the
/// resolved path.
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("Alias file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Cannot read alias file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No addresses found in {}", .path.display())]
    NoAddresses { path: PathBuf },
}

/// One well-formed line of the alias file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    /// The alias key (`johnno`). Not used for matching.
    pub key: String,
    /// Display phrase, trimmed. May be empty.
    pub phrase: String,
    /// Bare `local@domain` address, without angle brackets.
    pub address: String,
}

impl AliasRecord {
    /// Parse one alias line. Returns `None` for anything that does not follow
    /// `alias <key> <phrase><local@domain>`; trailing text after `>` is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = alias_line_regex().captures(line)?;
        Some(Self {
            key: caps[1].to_string(),
            phrase: caps[2].trim().to_string(),
            address: caps[3].to_string(),
        })
    }

    /// The text offered as a completion candidate.
    pub fn candidate(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AliasRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phrase.is_empty() {
            write!(f, "<{}>", self.address)
        } else {
            write!(f, "{} <{}>", self.phrase, self.address)
        }
    }
}

fn alias_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^alias\s+(\S+)\s+([^<]*)<([^<>@\s]+@[^<>@\s]+)>")
            .expect("alias line regex is valid")
    })
}

/// Parse every well-formed line of `text`, in file order.
pub fn parse_aliases(text: &str) -> Vec<AliasRecord> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_numbered(idx, line))
        .collect()
}

/// Like [`parse_aliases`], but for raw file contents. Each line is decoded on
/// its own, so a Latin-1 phrase on one line does not spoil the others.
pub fn parse_alias_bytes(bytes: &[u8]) -> Vec<AliasRecord> {
    bytes
        .split(|&b| b == b'\n')
        .enumerate()
        .filter_map(|(idx, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(raw);
            if matches!(line, Cow::Owned(_)) {
                tracing::debug!(line = idx + 1, "alias line is not valid UTF-8");
            }
            parse_numbered(idx, &line)
        })
        .collect()
}

fn parse_numbered(idx: usize, line: &str) -> Option<AliasRecord> {
    let record = AliasRecord::parse(line);
    if record.is_none() && !line.trim().is_empty() {
        tracing::debug!(line = idx + 1, "skipping malformed alias line");
    }
    record
}

/// Reads the alias file at a fixed path and filters it against partial text.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    path: PathBuf,
}

impl AddressResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the alias file from scratch.
    pub fn load(&self) -> Result<Vec<AliasRecord>, AliasError> {
        if !self.path.exists() {
            return Err(AliasError::NotFound {
                path: self.path.clone(),
            });
        }
        let bytes = fs::read(&self.path).map_err(|source| AliasError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        let records = parse_alias_bytes(&bytes);
        if records.is_empty() {
            return Err(AliasError::NoAddresses {
                path: self.path.clone(),
            });
        }
        Ok(records)
    }

    /// Candidates whose text contains `base`, ASCII letters matched without
    /// regard to case. Other characters keep their regex meaning, so a `.`
    /// matches any character. A `base` that does not compile as a pattern
    /// yields no candidates.
    pub fn candidates(&self, base: &str) -> Result<Vec<String>, AliasError> {
        let records = self.load()?;
        let pattern = case_insensitive_pattern(base);
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::debug!(%pattern, error = %e, "completion pattern does not compile");
                return Ok(Vec::new());
            }
        };
        Ok(records
            .iter()
            .map(AliasRecord::candidate)
            .filter(|c| re.is_match(c))
            .collect())
    }
}
