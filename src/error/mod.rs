//! Error types for the attendance collector.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
