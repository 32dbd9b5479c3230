//! Configuration module for the attendance collector.
//!
//! Handles loading and validating collector configuration from TOML files.

mod settings;

pub use settings::*;
