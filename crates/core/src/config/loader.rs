//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations under
    /// `root` are searched, then the user config directory, and defaults are
    /// used when none is found.
    pub fn load(path: Option<&Path>, root: &Path) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(root, dirs::config_dir()),
        };

        let schema = if let Some(ref p) = config_path {
            debug!(path = %p.display(), "loading configuration");
            load_config_file(p)?
        } else {
            debug!("no configuration file found, using defaults");
            ConfigSchema::default()
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot reject
    pub fn validate(&self) -> Result<()> {
        let identity = &self.schema.identity;

        if identity.fallback_name.as_deref() == Some("") {
            return Err(Error::config_invalid("identity.fallback_name must not be empty")
                .with_suggestion("Remove the key to fall back to the pubspec version"));
        }
        if identity.code_env.is_empty() {
            return Err(Error::config_invalid("identity.code_env must not be empty"));
        }
        if identity.name_env.is_empty() {
            return Err(Error::config_invalid("identity.name_env must not be empty"));
        }
        if self.schema.signing.properties_file.is_empty() {
            return Err(Error::config_invalid("signing.properties_file must not be empty"));
        }

        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path, user_config_dir: Option<PathBuf>) -> Option<PathBuf> {
    let candidates = [
        ".buildstamp.toml",
        "buildstamp.toml",
        ".config/buildstamp.toml",
    ];

    candidates
        .iter()
        .map(|name| root.join(name))
        .chain(user_config_dir.map(|dir| dir.join("buildstamp").join("config.toml")))
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}", path.display())).with_source(e)
    })?;

    toml::from_str(&content)
        .map_err(|e| Error::from(e).with_context(format!("Parsing {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("buildstamp.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.identity.code_env, "BUILD_NUMBER");
        assert_eq!(config.schema.identity.name_env, "BUILD_NAME");
        assert_eq!(config.schema.signing.properties_file, "android/key.properties");
        assert!(!config.schema.signing.require_properties);
    }

    #[test]
    fn test_config_load_explicit_file() {
        let (_dir, path) = write_config(
            r#"
[identity]
fallback_name = "2.4.0"
code_env = "CI_PIPELINE_IID"

[signing]
require_properties = true
default_key_alias = "release"
"#,
        );

        let config = Config::load(Some(&path), Path::new(".")).unwrap();
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert_eq!(config.schema.identity.fallback_name.as_deref(), Some("2.4.0"));
        assert_eq!(config.schema.identity.code_env, "CI_PIPELINE_IID");
        assert_eq!(config.schema.identity.name_env, "BUILD_NAME");
        assert!(config.schema.signing.require_properties);
        assert_eq!(config.schema.signing.default_key_alias, "release");
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_parse_error() {
        let (_dir, path) = write_config("[identity\nfallback_name = ");
        let err = Config::load(Some(&path), Path::new(".")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_config_rejects_empty_fallback_name() {
        let (_dir, path) = write_config("[identity]\nfallback_name = \"\"\n");
        let err = Config::load(Some(&path), Path::new(".")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }

    #[test]
    fn test_config_rejects_empty_env_name() {
        let (_dir, path) = write_config("[identity]\nname_env = \"\"\n");
        let err = Config::load(Some(&path), Path::new(".")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }

    #[test]
    fn test_config_found_under_project_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".buildstamp.toml"),
            "[identity]\nfallback_name = \"3.0.0\"\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.path, Some(dir.path().join(".buildstamp.toml")));
        assert_eq!(config.schema.identity.fallback_name.as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_find_config_file_order() {
        let root = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let user_file = user.path().join("buildstamp").join("config.toml");
        std::fs::create_dir_all(user_file.parent().unwrap()).unwrap();
        std::fs::write(&user_file, "").unwrap();

        let found = find_config_file(root.path(), Some(user.path().to_path_buf()));
        assert_eq!(found, Some(user_file));

        std::fs::create_dir_all(root.path().join(".config")).unwrap();
        std::fs::write(root.path().join(".config/buildstamp.toml"), "").unwrap();
        let found = find_config_file(root.path(), Some(user.path().to_path_buf()));
        assert_eq!(found, Some(root.path().join(".config/buildstamp.toml")));

        std::fs::write(root.path().join("buildstamp.toml"), "").unwrap();
        std::fs::write(root.path().join(".buildstamp.toml"), "").unwrap();
        let found = find_config_file(root.path(), None);
        assert_eq!(found, Some(root.path().join(".buildstamp.toml")));
    }

    #[test]
    fn test_find_config_file_none() {
        let root = TempDir::new().unwrap();
        assert_eq!(find_config_file(root.path(), None), None);
    }

    #[test]
    fn test_schema_round_trips_through_toml() {
        let schema = ConfigSchema::default();
        let rendered = toml::to_string(&schema).unwrap();
        let parsed: ConfigSchema = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, schema);
    }
}
