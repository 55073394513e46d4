//! `flutter build` integration
//!
//! Runs the Flutter packaging step with the build code and name passed as
//! flags, so the identity lands in the artifact without editing pubspec.yaml.

use crate::gradle::flutter_flags;
use buildstamp_core::error::{Error, ErrorCode, Result};
use buildstamp_core::identity::BuildIdentity;
use buildstamp_core::process::{command_exists, run_command_streaming_in_dir};
use std::path::Path;
use tracing::info;

/// Name of the Flutter executable
pub const FLUTTER: &str = "flutter";

/// `flutter build` targets that accept build number and name flags
pub const BUILD_TARGETS: [&str; 9] = [
    "apk",
    "appbundle",
    "aar",
    "ios",
    "ipa",
    "macos",
    "linux",
    "windows",
    "web",
];

/// Assemble the argument list for `flutter build`
pub fn build_args(target: &str, identity: &BuildIdentity, extra: &[String]) -> Result<Vec<String>> {
    if !BUILD_TARGETS.contains(&target) {
        return Err(Error::validation(format!("Unsupported flutter build target: {}", target))
            .with_suggestion(format!("Use one of: {}", BUILD_TARGETS.join(", "))));
    }

    let mut args = vec!["build".to_string(), target.to_string()];
    args.extend(flutter_flags(identity));
    args.extend(extra.iter().cloned());
    Ok(args)
}

/// Run `flutter build <target>` in `project_dir` with the given identity
pub fn build(
    project_dir: &Path,
    target: &str,
    identity: &BuildIdentity,
    extra: &[String],
) -> Result<()> {
    let args = build_args(target, identity, extra)?;

    if !command_exists(FLUTTER) {
        return Err(Error::command_not_found(FLUTTER));
    }

    info!(target, code = identity.code(), name = identity.name(), "running flutter build");

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let exit_code = run_command_streaming_in_dir(FLUTTER, &arg_refs, project_dir)?;

    if exit_code == 0 {
        Ok(())
    } else {
        Err(Error::new(
            ErrorCode::FlutterError,
            format!("flutter build {} exited with status {}", target, exit_code),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildstamp_core::identity::{resolve, VersionName};

    fn identity() -> BuildIdentity {
        resolve(Some("42"), Some("1.2.0"), &VersionName::new("0.0.1").unwrap(), 1)
    }

    #[test]
    fn test_build_args() {
        let args = build_args("appbundle", &identity(), &["--release".to_string()]).unwrap();
        assert_eq!(
            args,
            vec![
                "build",
                "appbundle",
                "--build-number=42",
                "--build-name=1.2.0",
                "--release"
            ]
        );
    }

    #[test]
    fn test_build_args_web() {
        let args = build_args("web", &identity(), &[]).unwrap();
        assert_eq!(
            args,
            vec!["build", "web", "--build-number=42", "--build-name=1.2.0"]
        );
    }

    #[test]
    fn test_build_args_rejects_unknown_target() {
        let err = build_args("web-server", &identity(), &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
