//! Audit logging module.
//!
//! Records every verification decision as a JSON line for log analysis
//! tools. Entries carry the device id, the peer address, and the decision;
//! they never include the claimed signature, the attendance payload, or any
//! secret material.

mod entry;
mod logger;

pub use entry::{AuditDecision, AuditEntry};
pub use logger::AuditLogger;
