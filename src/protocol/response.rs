//! Response types for the collector protocol.

use serde::{Deserialize, Serialize};

/// Response sent back to a reporting device.
///
/// Exactly two shapes exist: acceptance, which echoes the device id, and a
/// single generic rejection. A rejection never says why it failed, so an
/// unknown device id and a bad signature are indistinguishable to the
/// sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    /// `"success"` or `"failed"`.
    pub status: String,

    /// Human-readable summary.
    pub message: String,

    /// Echoed device id, present on success only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl ReportResponse {
    /// The claim verified; attendance is accepted.
    pub fn accepted(device_id: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: "Valid signature".to_string(),
            device_id: Some(device_id.into()),
        }
    }

    /// The one rejection shape. Every failure maps here, including
    /// malformed requests.
    pub fn rejected() -> Self {
        Self {
            status: "failed".to_string(),
            message: "Verification failed".to_string(),
            device_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
