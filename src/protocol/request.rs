//! Request types for the collector protocol.

use serde::{Deserialize, Serialize};

/// An attendance report claimed by a device.
///
/// The device authenticates the report by signing its id and the payload
/// with the pre-shared secret; nothing about the transport is trusted.
/// Constructed per request and discarded after verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceClaim {
    /// Claimed sender.
    pub device_id: String,

    /// The attendance payload, e.g. a card identifier. Opaque to the
    /// collector beyond its UTF-8 bytes.
    pub message: String,

    /// HMAC-SHA256 over the signed payload, lowercase hex (64 chars).
    pub signature: String,
}

impl AttendanceClaim {
    /// The byte string the device signs.
    ///
    /// Exactly the UTF-8 bytes of `device_id` followed by the UTF-8 bytes of
    /// `message`, no separator and no length prefix. Deployed device
    /// firmware produces this format; it must be reproduced byte for byte.
    pub fn signed_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.device_id.len() + self.message.len());
        payload.extend_from_slice(self.device_id.as_bytes());
        payload.extend_from_slice(self.message.as_bytes());
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_payload_is_bare_concatenation() {
        let claim = AttendanceClaim {
            device_id: "Rabby_pukpuk".to_string(),
            message: "card123".to_string(),
            signature: String::new(),
        };

        assert_eq!(claim.signed_payload(), b"Rabby_pukpukcard123");
    }

    #[test]
    fn test_signed_payload_empty_fields() {
        let claim = AttendanceClaim {
            device_id: String::new(),
            message: String::new(),
            signature: String::new(),
        };

        assert!(claim.signed_payload().is_empty());
    }

    #[test]
    fn test_claim_deserialization() {
        let json = r#"{"device_id":"door-1","message":"card42","signature":"ab12"}"#;
        let claim: AttendanceClaim = serde_json::from_str(json).unwrap();

        assert_eq!(claim.device_id, "door-1");
        assert_eq!(claim.message, "card42");
        assert_eq!(claim.signature, "ab12");
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let json = r#"{"device_id":"door-1","message":"card42"}"#;
        assert!(serde_json::from_str::<AttendanceClaim>(json).is_err());
    }
}
