//! Shared secret key material.

use std::fmt;

/// A device's pre-shared secret.
///
/// A distinct byte-sequence type rather than ordinary text, so key material
/// cannot end up in a log line by accident: `Debug` prints a redaction
/// marker and the type implements neither `Display` nor `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceSecret(Vec<u8>);

impl DeviceSecret {
    /// Create a secret from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw key bytes. Only the verifier reads these.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for DeviceSecret {
    /// Provisioned secrets are configured as text; the key is its UTF-8 bytes.
    fn from(secret: &str) -> Self {
        Self(secret.as_bytes().to_vec())
    }
}

impl fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key_material() {
        let secret = DeviceSecret::from("khulja sim sim");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("khulja"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_from_str_uses_utf8_bytes() {
        let secret = DeviceSecret::from("abc");
        assert_eq!(secret.as_bytes(), b"abc");
    }
}
