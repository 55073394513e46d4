//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub signing: SigningSettings,
}

/// Build identity configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Statically configured version name used when no name override is given.
    /// When unset the `version:` of the Flutter pubspec is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_name: Option<String>,

    /// Environment variable carrying the build code override
    #[serde(default = "default_code_env")]
    pub code_env: String,

    /// Environment variable carrying the build name override
    #[serde(default = "default_name_env")]
    pub name_env: String,

    /// Path to the Flutter pubspec, relative to the project root (`-C`)
    #[serde(default = "default_pubspec")]
    pub pubspec: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            fallback_name: None,
            code_env: default_code_env(),
            name_env: default_name_env(),
            pubspec: default_pubspec(),
        }
    }
}

fn default_code_env() -> String {
    "BUILD_NUMBER".to_string()
}

fn default_name_env() -> String {
    "BUILD_NAME".to_string()
}

fn default_pubspec() -> String {
    "pubspec.yaml".to_string()
}

/// Last-resort version name when neither configuration nor pubspec supply one
pub const DEFAULT_VERSION_NAME: &str = "1.0.0";

/// Signing credential lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningSettings {
    /// Path to the `key.properties` file
    #[serde(default = "default_properties_file")]
    pub properties_file: String,

    /// App module directory that relative `storeFile` paths resolve against
    #[serde(default = "default_module_dir")]
    pub module_dir: String,

    /// Treat a missing properties file as an error instead of a warning
    #[serde(default)]
    pub require_properties: bool,

    /// Key alias used when the properties file does not supply one
    #[serde(default = "default_key_alias")]
    pub default_key_alias: String,

    /// Keystore path used when the properties file does not supply one
    #[serde(default = "default_store_file")]
    pub default_store_file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_key_password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_store_password: Option<String>,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            properties_file: default_properties_file(),
            module_dir: default_module_dir(),
            require_properties: false,
            default_key_alias: default_key_alias(),
            default_store_file: default_store_file(),
            default_key_password: None,
            default_store_password: None,
        }
    }
}

fn default_properties_file() -> String {
    "android/key.properties".to_string()
}

fn default_module_dir() -> String {
    "android/app".to_string()
}

fn default_key_alias() -> String {
    "upload".to_string()
}

fn default_store_file() -> String {
    "upload-keystore.jks".to_string()
}
