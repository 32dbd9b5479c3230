//! Attendance Collector Library
//!
//! This crate provides the core functionality for the attendance collector,
//! which authenticates reports from remote IoT attendance devices using
//! per-device HMAC-SHA256 signatures.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
