//! HMAC-SHA256 verification of attendance claims.

use std::sync::Arc;

use ring::hmac;
use subtle::ConstantTimeEq;

use crate::protocol::AttendanceClaim;
use crate::registry::CredentialRegistry;

/// Outcome of verifying a single claim.
///
/// Deliberately two-valued: an unknown device and a signature mismatch both
/// collapse to `Invalid`, so the result cannot be used to enumerate
/// registered device ids. Carries no secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Valid,
    Invalid,
}

impl VerificationOutcome {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Verifies claimed signatures against the credential registry.
///
/// Stateless over its inputs plus a read of the registry; calls may run
/// fully in parallel with no coordination.
pub struct Verifier {
    registry: Arc<CredentialRegistry>,
}

impl Verifier {
    /// Create a verifier over the given registry.
    pub fn new(registry: Arc<CredentialRegistry>) -> Self {
        Self { registry }
    }

    /// Verify an attendance claim.
    ///
    /// Computes `HMAC-SHA256(secret, device_id ++ message)` as lowercase hex
    /// and compares it to the claimed signature in constant time. A missing
    /// registry entry returns `Invalid` without computing a MAC.
    ///
    /// Never fails: empty fields and signatures of unexpected length or
    /// non-hex content are ordinary mismatches, not errors.
    pub fn verify(&self, claim: &AttendanceClaim) -> VerificationOutcome {
        let secret = match self.registry.lookup(&claim.device_id) {
            Some(secret) => secret,
            None => return VerificationOutcome::Invalid,
        };

        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let tag = hmac::sign(&key, &claim.signed_payload());
        let expected = hex::encode(tag.as_ref());

        if constant_time_str_eq(&expected, &claim.signature) {
            VerificationOutcome::Valid
        } else {
            VerificationOutcome::Invalid
        }
    }
}

/// Constant-time equality over the hex text of the signature.
///
/// The claimed value is never hex-decoded, so malformed input needs no
/// special casing. When the lengths differ the answer is already known, but
/// a full-width comparison still runs so the reply time does not depend on
/// where the inputs diverge.
fn constant_time_str_eq(expected: &str, claimed: &str) -> bool {
    let expected = expected.as_bytes();
    let claimed = claimed.as_bytes();

    if expected.len() == claimed.len() {
        expected.ct_eq(claimed).into()
    } else {
        let _: bool = expected.ct_eq(expected).into();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AttendanceClaim;

    /// Compute the signature a device would send, per the wire contract.
    fn device_sign(secret: &str, device_id: &str, message: &str) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let payload = format!("{}{}", device_id, message);
        hex::encode(hmac::sign(&key, payload.as_bytes()).as_ref())
    }

    fn test_verifier() -> Verifier {
        let registry = CredentialRegistry::from_entries([
            ("Rabby_pukpuk", "khulja sim sim"),
            ("turnstile-7", "another secret"),
        ])
        .unwrap();
        Verifier::new(Arc::new(registry))
    }

    fn claim(device_id: &str, message: &str, signature: String) -> AttendanceClaim {
        AttendanceClaim {
            device_id: device_id.to_string(),
            message: message.to_string(),
            signature,
        }
    }

    #[test]
    fn test_valid_signature_accepted() {
        let verifier = test_verifier();
        let signature = device_sign("khulja sim sim", "Rabby_pukpuk", "card123");

        let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", signature));
        assert_eq!(outcome, VerificationOutcome::Valid);
    }

    #[test]
    fn test_flipping_any_character_invalidates() {
        let verifier = test_verifier();
        let signature = device_sign("khulja sim sim", "Rabby_pukpuk", "card123");

        for pos in 0..signature.len() {
            let mut tampered: Vec<u8> = signature.bytes().collect();
            tampered[pos] = if tampered[pos] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(tampered).unwrap();

            let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", tampered));
            assert_eq!(outcome, VerificationOutcome::Invalid, "position {}", pos);
        }
    }

    #[test]
    fn test_unknown_device_rejected() {
        let verifier = test_verifier();

        let outcome = verifier.verify(&claim("no-such-device", "anything", "00ff".repeat(16)));
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[test]
    fn test_unknown_device_indistinguishable_from_bad_signature() {
        let verifier = test_verifier();
        let signature = device_sign("khulja sim sim", "Rabby_pukpuk", "card123");

        let unknown = verifier.verify(&claim("unknown_device", "card123", signature.clone()));
        let mut wrong = signature;
        let replacement = if wrong.ends_with('f') { "e" } else { "f" };
        wrong.replace_range(63..64, replacement);
        let mismatch = verifier.verify(&claim("Rabby_pukpuk", "card123", wrong));

        assert_eq!(unknown, mismatch);
    }

    #[test]
    fn test_cross_device_rejected() {
        let verifier = test_verifier();

        // Signed with turnstile-7's secret, claimed as Rabby_pukpuk.
        let signature = device_sign("another secret", "turnstile-7", "card123");
        let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", signature));
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[test]
    fn test_signature_over_wrong_device_id_rejected() {
        let verifier = test_verifier();

        // Right secret, but the payload binds the device id.
        let signature = device_sign("khulja sim sim", "turnstile-7", "card123");
        let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", signature));
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let verifier = test_verifier();
        let signature = device_sign("khulja sim sim", "Rabby_pukpuk", "card123");

        let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", signature.to_uppercase()));
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[test]
    fn test_odd_signatures_do_not_panic() {
        let verifier = test_verifier();

        for signature in ["", "abc", "zz", &"f".repeat(1000)] {
            let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", signature.to_string()));
            assert_eq!(outcome, VerificationOutcome::Invalid);
        }
    }

    #[test]
    fn test_empty_fields_do_not_panic() {
        let verifier = test_verifier();

        let signature = device_sign("khulja sim sim", "Rabby_pukpuk", "");
        let outcome = verifier.verify(&claim("Rabby_pukpuk", "", signature));
        assert_eq!(outcome, VerificationOutcome::Valid);

        let outcome = verifier.verify(&claim("", "", String::new()));
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[test]
    fn test_payload_concatenation_has_no_separator() {
        let verifier = test_verifier();

        // "Rabby_pukpuk" ++ "card123" must hash identically to the single
        // string "Rabby_pukpukcard123".
        let key = hmac::Key::new(hmac::HMAC_SHA256, b"khulja sim sim");
        let signature = hex::encode(hmac::sign(&key, b"Rabby_pukpukcard123").as_ref());

        let outcome = verifier.verify(&claim("Rabby_pukpuk", "card123", signature));
        assert_eq!(outcome, VerificationOutcome::Valid);
    }

    #[test]
    fn test_constant_time_str_eq() {
        assert!(constant_time_str_eq("abcd", "abcd"));
        assert!(!constant_time_str_eq("abcd", "abce"));
        assert!(!constant_time_str_eq("abcd", "abc"));
        assert!(!constant_time_str_eq("abcd", ""));
        assert!(constant_time_str_eq("", ""));
    }
}
