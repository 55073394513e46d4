//! Java `.properties` file reader
//!
//! Android signing credentials live in a `key.properties` file that Gradle
//! loads with `java.util.Properties`. This reader accepts the same syntax:
//!
//! - `key=value`, `key: value` and `key value` separators
//! - `#` and `!` comment lines
//! - backslash line continuations
//! - `\t`, `\n`, `\r`, `\\`, escaped separator characters and `\uXXXX`
//!
//! Files are decoded as ISO-8859-1, like `Properties.load(InputStream)`;
//! characters outside Latin-1 must be written as `\uXXXX`. A malformed
//! `\u` escape is an error rather than a silently altered value.
//!
//! Later occurrences of a key replace earlier ones.

use crate::error::{Error, ErrorCode, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Parse properties from a string
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for line in logical_lines(content) {
            let (key, value) = split_entry(&line);
            entries.insert(unescape(key)?, unescape(value)?);
        }

        Ok(Self { entries })
    }

    /// Parse ISO-8859-1 encoded bytes
    pub fn parse_latin1(bytes: &[u8]) -> Result<Self> {
        let content: String = bytes.iter().map(|&b| char::from(b)).collect();
        Self::parse(&content)
    }

    /// Load a properties file, returning `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::from(e).with_context(format!("Reading {}", path.display())));
            }
        };

        Self::parse_latin1(&bytes)
            .map(Some)
            .map_err(|e| e.with_context(format!("Parsing {}", path.display())))
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were parsed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Join continuation lines and drop blanks and comments
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in content.lines() {
        let trimmed = raw.trim_start();

        let mut piece = match current.take() {
            Some(pending) => pending + trimmed,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if ends_with_continuation(&piece) {
            piece.pop();
            current = Some(piece);
        } else {
            lines.push(piece);
        }
    }

    if let Some(pending) = current {
        lines.push(pending);
    }

    lines
}

/// An odd number of trailing backslashes marks a continuation
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped separator
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                return (line[..idx].trim_end(), line[idx + 1..].trim_start());
            }
            c if c.is_whitespace() => {
                let key = &line[..idx];
                let rest = line[idx..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .map(str::trim_start)
                    .unwrap_or(rest);
                return (key, rest);
            }
            _ => {}
        }
    }

    (line, "")
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    // High surrogate waiting for its low half
    let mut pending: Option<u32> = None;

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            flush_surrogate(&mut out, &mut pending);
            out.push(ch);
            continue;
        }
        let escaped = match chars.next() {
            Some('u') => {
                let unit = read_code_unit(&mut chars, raw)?;
                match (pending.take(), unit) {
                    (Some(high), 0xDC00..=0xDFFF) => {
                        let combined = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                        out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    (high, 0xD800..=0xDBFF) => {
                        if high.is_some() {
                            out.push(char::REPLACEMENT_CHARACTER);
                        }
                        pending = Some(unit);
                    }
                    (high, _) => {
                        if high.is_some() {
                            out.push(char::REPLACEMENT_CHARACTER);
                        }
                        out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                }
                continue;
            }
            Some('t') => Some('\t'),
            Some('n') => Some('\n'),
            Some('r') => Some('\r'),
            Some('f') => Some('\u{000C}'),
            other => other,
        };
        flush_surrogate(&mut out, &mut pending);
        if let Some(c) = escaped {
            out.push(c);
        }
    }
    flush_surrogate(&mut out, &mut pending);

    Ok(out)
}

/// Read the four hex digits of a `\u` escape
fn read_code_unit(chars: &mut std::str::Chars<'_>, raw: &str) -> Result<u32> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 {
        return Err(malformed_escape(raw));
    }
    u32::from_str_radix(&digits, 16).map_err(|_| malformed_escape(raw))
}

/// A lone high surrogate has no scalar value
fn flush_surrogate(out: &mut String, pending: &mut Option<u32>) {
    if pending.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}

fn malformed_escape(raw: &str) -> Error {
    Error::new(ErrorCode::InvalidFormat, "Malformed \\uXXXX escape in properties")
        .with_context(format!("In entry text: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_key_properties() {
        let props = Properties::parse(
            "storePassword=hunter2\nkeyPassword=hunter3\nkeyAlias=upload\nstoreFile=/home/ci/upload.jks\n",
        ).unwrap();

        assert_eq!(props.len(), 4);
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("storeFile"), Some("/home/ci/upload.jks"));
    }

    #[test]
    fn test_separators_and_whitespace() {
        let props = Properties::parse("a = 1\nb: 2\nc 3\n  d=  spaced value\n").unwrap();

        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("spaced value"));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = Properties::parse("# comment\n! also a comment\n\nkey=value\n").unwrap();

        assert_eq!(props.len(), 1);
        assert_eq!(props.get("key"), Some("value"));
    }

    #[test]
    fn test_line_continuation() {
        let props = Properties::parse("path=/very/long/\\\n    path/to/key.jks\n").unwrap();
        assert_eq!(props.get("path"), Some("/very/long/path/to/key.jks"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = Properties::parse("dir=C:\\\\keys\\\\\nnext=1\n").unwrap();

        assert_eq!(props.get("dir"), Some("C:\\keys\\"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_escapes_in_keys_and_values() {
        let props = Properties::parse("my\\=key=a\\tb\nempty=\n").unwrap();

        assert_eq!(props.get("my=key"), Some("a\tb"));
        assert_eq!(props.get("empty"), Some(""));
    }

    #[test]
    fn test_later_key_wins() {
        let props = Properties::parse("keyAlias=first\nkeyAlias=second\n").unwrap();
        assert_eq!(props.get("keyAlias"), Some("second"));
    }

    #[test]
    fn test_unicode_escapes() {
        let props = Properties::parse("keyPassword=g\\u00fcvenli\\u015fifre\nemoji=\\ud83d\\ude00\n")
            .unwrap();

        assert_eq!(props.get("keyPassword"), Some("güvenlişifre"));
        assert_eq!(props.get("emoji"), Some("😀"));
    }

    #[test]
    fn test_malformed_unicode_escape_is_rejected() {
        let err = Properties::parse("keyPassword=g\\u00zzvenli\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);

        assert!(Properties::parse("keyPassword=g\\u00\n").is_err());
    }

    #[test]
    fn test_load_decodes_latin1() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, b"keyPassword=g\xfcvenli\nkeyAlias=upload\n").unwrap();

        let loaded = Properties::load(&path).unwrap().unwrap();
        assert_eq!(loaded.get("keyPassword"), Some("güvenli"));
        assert_eq!(loaded.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded = Properties::load(&dir.path().join("key.properties")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, "keyAlias=release\n").unwrap();

        let loaded = Properties::load(&path).unwrap().unwrap();
        assert_eq!(loaded.get("keyAlias"), Some("release"));
    }
}
