//! Flutter `pubspec.yaml` version lookup
//!
//! A Flutter version string has the form `<name>+<build number>`, e.g.
//! `1.2.3+45`. The name part is the default build name when no fallback is
//! configured explicitly. The build number part is ignored: a missing build
//! code always falls back to the clock.

use buildstamp_core::config::{IdentityConfig, DEFAULT_VERSION_NAME};
use buildstamp_core::error::{Error, Result};
use buildstamp_core::identity::VersionName;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Pubspec {
    #[serde(default)]
    version: Option<serde_yaml::Value>,
}

/// Take the version name of a Flutter version string, the part before `+`
pub fn parse_version(raw: &str) -> Option<VersionName> {
    let raw = raw.trim();
    let name = raw.split_once('+').map_or(raw, |(name, _)| name.trim());
    VersionName::new(name)
}

/// Read the version name of a pubspec, `Ok(None)` when the file or key is missing
pub fn read_version(path: &Path) -> Result<Option<VersionName>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::from(e).with_context(format!("Reading {}", path.display())));
        }
    };

    let pubspec: Pubspec = serde_yaml::from_str(&content)
        .map_err(|e| Error::from(e).with_context(format!("Parsing {}", path.display())))?;

    let raw = match pubspec.version {
        Some(serde_yaml::Value::String(s)) => s,
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };

    Ok(parse_version(&raw))
}

/// Pick the fallback build name
///
/// In order: the configured `identity.fallback_name`, the pubspec version
/// name under `root`, then [`DEFAULT_VERSION_NAME`].
pub fn fallback_name(config: &IdentityConfig, root: &Path) -> Result<VersionName> {
    if let Some(name) = config.fallback_name.as_deref().and_then(VersionName::new) {
        return Ok(name);
    }

    let path = root.join(&config.pubspec);
    if let Some(name) = read_version(&path)? {
        debug!(path = %path.display(), name = %name, "using pubspec version name");
        return Ok(name);
    }

    debug!(name = DEFAULT_VERSION_NAME, "no fallback name configured");
    VersionName::new(DEFAULT_VERSION_NAME)
        .ok_or_else(|| Error::config_invalid("default version name is empty"))
}
