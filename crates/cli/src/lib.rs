//! CLI utilities for buildstamp
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Error reporting in human and JSON form

#![warn(missing_docs)]

pub mod output;
