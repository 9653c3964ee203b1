//! HMAC-SHA256 webhook signatures.
//!
//! Sellauth signs each webhook with a lowercase hex HMAC-SHA256 digest of the
//! JSON body and sends it in `X-Signature`. The same scheme is used when the
//! payload is forwarded to the key generation service.

use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature, both inbound and outbound.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Compute the hex HMAC-SHA256 of `message` keyed with `secret`.
pub fn compute_signature(secret: &str, message: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a claimed signature against `message`.
///
/// The claimed signature is taken as raw bytes, so a header that is not
/// valid UTF-8 simply fails to match. Returns `false` on any mismatch,
/// including a length mismatch, without leaking where the first differing
/// byte is.
pub fn verify_signature(secret: &str, message: &[u8], signature: impl AsRef<[u8]>) -> bool {
    let signature = signature.as_ref();

    let expected = match compute_signature(secret, message) {
        Ok(sig) => sig,
        Err(_) => {
            warn!("signature_invalid_key");
            return false;
        }
    };

    let valid: bool = expected.as_bytes().ct_eq(signature).into();

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "signature_mismatch"
        );
    }

    valid
}

/// Check whether a secret is configured and non-blank.
pub fn is_signing_enabled(secret: &Option<String>) -> bool {
    secret
        .as_ref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";
    const BODY: &[u8] = br#"{"event":"order.paid","id":1}"#;

    #[test]
    fn test_compute_signature_known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            compute_signature("Jefe", b"what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_signature_valid() {
        let signature = compute_signature(SECRET, BODY).unwrap();
        assert!(verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_single_byte_mutation() {
        let signature = compute_signature(SECRET, BODY).unwrap();

        for i in 0..signature.len() {
            let mut bytes = signature.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verify_signature(SECRET, BODY, &mutated), "position {}", i);
        }
    }

    #[test]
    fn test_verify_signature_length_mismatch() {
        let signature = compute_signature(SECRET, BODY).unwrap();

        assert!(!verify_signature(SECRET, BODY, ""));
        assert!(!verify_signature(SECRET, BODY, "abc"));
        assert!(!verify_signature(SECRET, BODY, &signature[..10]));
        assert!(!verify_signature(SECRET, BODY, &format!("{}00", signature)));
    }

    #[test]
    fn test_verify_signature_non_utf8_bytes() {
        let mut forged = compute_signature(SECRET, BODY).unwrap().into_bytes();
        forged[0] = 0xe9;
        assert!(!verify_signature(SECRET, BODY, &forged));
        assert!(!verify_signature(SECRET, BODY, b"forged\xe9sig"));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = compute_signature("other-secret", BODY).unwrap();
        assert!(!verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_is_case_sensitive() {
        let signature = compute_signature(SECRET, BODY).unwrap().to_uppercase();
        assert!(!verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_is_signing_enabled() {
        assert!(!is_signing_enabled(&None));
        assert!(!is_signing_enabled(&Some("".to_string())));
        assert!(!is_signing_enabled(&Some("   ".to_string())));
        assert!(is_signing_enabled(&Some("key123".to_string())));
    }
}
