//! Release signing credentials
//!
//! Gradle release builds read their upload key from a `key.properties` file
//! at the Android project root. Each of the four keys falls back to a
//! configured default when missing. A missing file is not fatal unless
//! `signing.require_properties` is set: one warning is logged and every
//! field takes its default.

use buildstamp_core::config::SigningSettings;
use buildstamp_core::error::{Error, Result};
use buildstamp_core::properties::Properties;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Property key for the key alias
pub const KEY_ALIAS: &str = "keyAlias";
/// Property key for the key password
pub const KEY_PASSWORD: &str = "keyPassword";
/// Property key for the keystore path
pub const STORE_FILE: &str = "storeFile";
/// Property key for the keystore password
pub const STORE_PASSWORD: &str = "storePassword";

const REDACTED: &str = "********";

/// A credential that never prints its value
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// Where the signing values came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Read from a properties file (individual keys may still be defaulted)
    Properties(PathBuf),
    /// No properties file; every value is a configured default
    Defaults,
}

/// Effective release signing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningConfig {
    /// Alias of the upload key inside the keystore
    pub key_alias: String,
    /// Password of the upload key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_password: Option<Secret>,
    /// Keystore location, resolved against the app module directory
    pub store_file: PathBuf,
    /// Password of the keystore
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_password: Option<Secret>,
    /// Origin of the values
    pub source: CredentialSource,
}

impl SigningConfig {
    /// Load signing configuration for the project rooted at `root`
    pub fn load(settings: &SigningSettings, root: &Path) -> Result<Self> {
        let path = root.join(&settings.properties_file);
        let module_dir = root.join(&settings.module_dir);

        match Properties::load(&path)? {
            Some(props) => {
                debug!(path = %path.display(), entries = props.len(), "loaded signing properties");
                Self::from_properties(Some((&props, path.as_path())), settings, &module_dir)
            }
            None if settings.require_properties => Err(Error::signing_properties_missing(&path)),
            None => {
                warn!(
                    path = %path.display(),
                    "key.properties not found, using default signing configuration"
                );
                Self::from_properties(None, settings, &module_dir)
            }
        }
    }

    /// Build a configuration from already loaded properties
    ///
    /// Each key missing from `props` (or given an empty value) takes the
    /// corresponding default from `settings`.
    pub fn from_properties(
        props: Option<(&Properties, &Path)>,
        settings: &SigningSettings,
        module_dir: &Path,
    ) -> Result<Self> {
        let lookup = |key: &str| {
            props
                .and_then(|(p, _)| p.get(key))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let store_file = lookup(STORE_FILE).unwrap_or_else(|| settings.default_store_file.clone());

        Ok(Self {
            key_alias: lookup(KEY_ALIAS).unwrap_or_else(|| settings.default_key_alias.clone()),
            key_password: lookup(KEY_PASSWORD)
                .or_else(|| settings.default_key_password.clone())
                .map(Secret::new),
            store_file: resolve_store_file(&store_file, module_dir)?,
            store_password: lookup(STORE_PASSWORD)
                .or_else(|| settings.default_store_password.clone())
                .map(Secret::new),
            source: match props {
                Some((_, path)) => CredentialSource::Properties(path.to_path_buf()),
                None => CredentialSource::Defaults,
            },
        })
    }

    /// Whether every value needed to sign is present and the keystore exists
    pub fn is_complete(&self) -> bool {
        self.key_password.is_some() && self.store_password.is_some() && self.store_file.is_file()
    }
}

/// Expand `~` and environment variables, then resolve relative paths
/// against the app module directory
fn resolve_store_file(raw: &str, module_dir: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        Error::signing(format!("Cannot expand keystore path {}", raw)).with_source(e)
    })?;

    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(module_dir.join(path))
    }
}
