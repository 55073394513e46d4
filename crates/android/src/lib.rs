//! Android and Flutter integration for buildstamp
//!
//! This crate provides the platform-specific pieces:
//! - Signing credential lookup from `key.properties`
//! - Flutter `pubspec.yaml` version lookup
//! - Rendering a build identity for Gradle, shells and JSON consumers
//! - Running `flutter build` with a resolved identity

#![warn(missing_docs)]

pub mod flutter;
pub mod gradle;
pub mod pubspec;
pub mod signing;
