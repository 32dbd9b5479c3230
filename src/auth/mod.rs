//! Authentication module.
//!
//! Decides whether an attendance claim was really produced by the device it
//! names, using the device's registered shared secret.

mod verifier;

pub use verifier::{VerificationOutcome, Verifier};
