//! Build identity resolution
//!
//! A build identity is the pair of values a packaging step stamps into a
//! release artifact: a numeric build code that orders releases on
//! distribution platforms, and a human-readable build name.
//!
//! Both values may be supplied from outside (typically by CI through
//! `BUILD_NUMBER` / `BUILD_NAME`). When they are missing or unusable the
//! resolver falls back to the current time in seconds for the code and to a
//! configured default for the name. Resolution never fails: a malformed
//! optional input must not abort a build pipeline.
//!
//! # Example
//!
//! ```rust
//! use buildstamp_core::identity::{resolve, VersionName};
//!
//! let fallback = VersionName::new("0.0.1").unwrap();
//! let identity = resolve(Some("42"), Some("1.2.0"), &fallback, 1_700_000_000);
//!
//! assert_eq!(identity.code(), 42);
//! assert_eq!(identity.name(), "1.2.0");
//! ```

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use tracing::debug;

/// A non-empty version label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionName(String);

impl VersionName {
    /// Create a version name, rejecting the empty string
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    /// Borrow the label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The resolved identity of a single build
///
/// Immutable once computed. `code` is always positive and `name` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuildIdentity {
    code: u64,
    name: VersionName,
}

impl BuildIdentity {
    /// Numeric build code
    pub fn code(&self) -> u64 {
        self.code
    }

    /// Human-readable build name
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for BuildIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Externally supplied override values, both optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Raw build code, expected to be a base-10 integer
    pub code: Option<String>,
    /// Build name
    pub name: Option<String>,
}

impl Overrides {
    /// Read overrides through a lookup function
    ///
    /// `lookup` is called once for each key; `None` means the value is absent.
    pub fn from_lookup<F>(code_key: &str, name_key: &str, mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            code: lookup(code_key),
            name: lookup(name_key),
        }
    }

    /// Read overrides from the process environment
    ///
    /// Variables that are unset or not valid UTF-8 count as absent.
    pub fn from_env(code_key: &str, name_key: &str) -> Self {
        Self::from_lookup(code_key, name_key, |key| utf8_value(std::env::var_os(key)))
    }

    /// Layer `self` over `other`, keeping each of `self`'s values when present
    pub fn or(self, other: Overrides) -> Overrides {
        Overrides {
            code: self.code.or(other.code),
            name: self.name.or(other.name),
        }
    }

    /// Resolve these overrides into a build identity
    pub fn resolve(&self, fallback_name: &VersionName, now_seconds: u64) -> BuildIdentity {
        resolve(
            self.code.as_deref(),
            self.name.as_deref(),
            fallback_name,
            now_seconds,
        )
    }
}

/// Keep an OS string only when it is valid UTF-8
fn utf8_value(value: Option<OsString>) -> Option<String> {
    value.and_then(|v| v.into_string().ok())
}

/// Parse a build code override
///
/// Accepts a positive base-10 integer that fits a signed 32-bit value, the
/// width of Android's `versionCode`. The value is taken verbatim: surrounding
/// whitespace, fractions and anything above `i32::MAX` are rejected.
pub fn parse_code(raw: &str) -> Option<u64> {
    raw.parse::<i32>()
        .ok()
        .filter(|code| *code > 0)
        .map(|code| code.unsigned_abs().into())
}

/// Resolve a build identity
///
/// - `code_override` is used when it parses as a positive integer, otherwise
///   the code is `now_seconds` (clamped to at least 1).
/// - `name_override` is used when present and non-empty, otherwise the name
///   is `fallback_name`.
pub fn resolve(
    code_override: Option<&str>,
    name_override: Option<&str>,
    fallback_name: &VersionName,
    now_seconds: u64,
) -> BuildIdentity {
    let code = match code_override.map(|raw| (raw, parse_code(raw))) {
        Some((_, Some(code))) => code,
        Some((raw, None)) => {
            debug!(value = raw, "code override is not a positive integer, using current time");
            now_seconds.max(1)
        }
        None => now_seconds.max(1),
    };

    let name = name_override
        .and_then(VersionName::new)
        .unwrap_or_else(|| fallback_name.clone());

    debug!(code, name = name.as_str(), "resolved build identity");

    BuildIdentity { code, name }
}
