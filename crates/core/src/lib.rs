//! Core of the buildstamp build identity tool
//!
//! This crate provides the platform-independent pieces:
//!
//! - **Identity**: resolve a build code and build name from optional overrides
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Properties**: reader for Java `.properties` files
//! - **Process execution**: run packaging tools with a resolved identity
//!
//! # Example
//!
//! ```rust
//! use buildstamp_core::identity::{Overrides, VersionName};
//!
//! let overrides = Overrides::from_lookup("BUILD_NUMBER", "BUILD_NAME", |_| None);
//! let fallback = VersionName::new("0.0.1").unwrap();
//! let identity = overrides.resolve(&fallback, 1_700_000_000);
//!
//! assert_eq!(identity.code(), 1_700_000_000);
//! assert_eq!(identity.name(), "0.0.1");
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod identity;
pub mod process;
pub mod properties;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, IdentityConfig, SigningSettings};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::identity::{resolve, BuildIdentity, Overrides, VersionName};
    pub use crate::properties::Properties;
}
