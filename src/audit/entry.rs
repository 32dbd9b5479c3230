//! Audit entry types.

use serde::Serialize;
use uuid::Uuid;

/// A single audit log entry for one attendance claim.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// ISO 8601 timestamp when the claim was processed.
    pub timestamp: String,
    /// Unique identifier for the request.
    pub request_id: Uuid,
    /// Device id the claim named. Recorded verbatim even when unknown.
    pub device_id: String,
    /// Remote address the claim arrived from.
    pub peer_addr: String,
    /// Verification decision.
    pub decision: AuditDecision,
    /// Processing duration in milliseconds.
    pub duration_ms: u64,
}

/// Verification decision for audit purposes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    Accepted,
    Rejected,
}

impl AuditEntry {
    pub fn new(
        timestamp: String,
        request_id: Uuid,
        device_id: String,
        peer_addr: String,
        decision: AuditDecision,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp,
            request_id,
            device_id,
            peer_addr,
            decision,
            duration_ms,
        }
    }
}
