//! Configuration loading and schema definitions
//!
//! Settings for identity resolution and signing lookup, read from
//! `.buildstamp.toml` when present.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
