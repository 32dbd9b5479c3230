//! Device credential registry.
//!
//! Authoritative in-memory store of device id to shared secret, loaded once
//! at startup and shared read-only across connections.

mod secret;
mod store;

pub use secret::DeviceSecret;
pub use store::CredentialRegistry;
