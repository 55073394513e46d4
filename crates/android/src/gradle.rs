//! Rendering a build identity for packaging tools
//!
//! Gradle reads `versionCode`/`versionName` from a properties file, shells
//! read `KEY=value` lines, and `flutter build` takes `--build-number` and
//! `--build-name` flags.

use buildstamp_core::config::IdentityConfig;
use buildstamp_core::error::{Error, Result};
use buildstamp_core::identity::BuildIdentity;
use std::fmt;
use std::str::FromStr;

/// Output format for a resolved identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `1.2.0 (42)`
    #[default]
    Text,
    /// `{"code":42,"name":"1.2.0"}`
    Json,
    /// Shell assignments using the configured variable names
    Env,
    /// Gradle `versionCode` / `versionName` properties
    Properties,
    /// `flutter build` flags
    FlutterArgs,
}

impl OutputFormat {
    /// All accepted format names
    pub const NAMES: [&'static str; 5] = ["text", "json", "env", "properties", "flutter-args"];
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "env" => Ok(Self::Env),
            "properties" => Ok(Self::Properties),
            "flutter-args" => Ok(Self::FlutterArgs),
            other => Err(Error::validation(format!("Unknown output format: {}", other))
                .with_suggestion(format!("Use one of: {}", Self::NAMES.join(", ")))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Env => "env",
            Self::Properties => "properties",
            Self::FlutterArgs => "flutter-args",
        };
        f.write_str(name)
    }
}

/// `flutter build` flags carrying an identity
pub fn flutter_flags(identity: &BuildIdentity) -> [String; 2] {
    [
        format!("--build-number={}", identity.code()),
        format!("--build-name={}", identity.name()),
    ]
}

/// Render an identity, without a trailing newline
pub fn render(identity: &BuildIdentity, format: OutputFormat, config: &IdentityConfig) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => identity.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(identity)?,
        OutputFormat::Env => format!(
            "{}={}\n{}={}",
            config.code_env,
            identity.code(),
            config.name_env,
            shell_quote(identity.name())
        ),
        OutputFormat::Properties => format!(
            "versionCode={}\nversionName={}",
            identity.code(),
            escape_property(identity.name())
        ),
        OutputFormat::FlutterArgs => flutter_flags(identity)
            .iter()
            .map(|flag| shell_quote(flag))
            .collect::<Vec<_>>()
            .join(" "),
    };

    Ok(rendered)
}

/// Single-quote a value unless it is made only of shell-safe characters
fn shell_quote(value: &str) -> String {
    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.+=/:,@".contains(c));
    if safe && !value.is_empty() {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

fn escape_property(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str(r"\\"),
            '\n' => out.push_str(r"\n"),
            '\t' => out.push_str(r"\t"),
            '\r' => out.push_str(r"\r"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            // Gradle reads the file as ISO-8859-1
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildstamp_core::identity::{resolve, VersionName};
    use buildstamp_core::properties::Properties;

    fn identity(code: &str, name: &str) -> BuildIdentity {
        resolve(Some(code), Some(name), &VersionName::new("0.0.1").unwrap(), 1)
    }

    #[test]
    fn test_format_names_round_trip() {
        for name in OutputFormat::NAMES {
            let format: OutputFormat = name.parse().unwrap();
            assert_eq!(format.to_string(), name);
        }
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_text() {
        let out = render(&identity("42", "1.2.0"), OutputFormat::Text, &IdentityConfig::default());
        assert_eq!(out.unwrap(), "1.2.0 (42)");
    }

    #[test]
    fn test_render_json() {
        let out = render(&identity("42", "1.2.0"), OutputFormat::Json, &IdentityConfig::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["code"], 42);
        assert_eq!(value["name"], "1.2.0");
    }

    #[test]
    fn test_render_env_uses_configured_names() {
        let config = IdentityConfig {
            code_env: "VERSION_CODE".to_string(),
            ..IdentityConfig::default()
        };
        let out = render(&identity("42", "1.2.0 beta"), OutputFormat::Env, &config).unwrap();
        assert_eq!(out, "VERSION_CODE=42\nBUILD_NAME='1.2.0 beta'");
    }

    #[test]
    fn test_render_properties_is_readable_back() {
        let out = render(
            &identity("7", "2.0.0:rc=1"),
            OutputFormat::Properties,
            &IdentityConfig::default(),
        )
        .unwrap();

        let props = Properties::parse(&out).unwrap();
        assert_eq!(props.get("versionCode"), Some("7"));
        assert_eq!(props.get("versionName"), Some("2.0.0:rc=1"));
    }

    #[test]
    fn test_render_properties_escapes_non_ascii() {
        let out = render(
            &identity("7", "2.0.0-güz"),
            OutputFormat::Properties,
            &IdentityConfig::default(),
        )
        .unwrap();

        assert!(out.is_ascii());
        assert!(out.contains(r"versionName=2.0.0-g\u00fcz"));
        let props = Properties::parse(&out).unwrap();
        assert_eq!(props.get("versionName"), Some("2.0.0-güz"));
    }

    #[test]
    fn test_render_flutter_args() {
        let out = render(
            &identity("42", "1.2.0"),
            OutputFormat::FlutterArgs,
            &IdentityConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "--build-number=42 --build-name=1.2.0");
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
