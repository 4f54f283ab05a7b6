//! Webhook signature verification
//!
//! LINE signs every delivery with HMAC-SHA256 over the raw request body,
//! keyed by the channel secret, and sends the base64 digest in the
//! `X-Line-Signature` header.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::utils::errors::{LogbookError, Result};

pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(channel_secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC key length is unrestricted"),
    }
}

/// Base64 signature LINE would send for `body`
pub fn compute_signature(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = mac_for(channel_secret);
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check a delivery's signature header against its body
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: Option<&str>) -> Result<()> {
    let signature = signature.map(str::trim).filter(|s| !s.is_empty()).ok_or(LogbookError::InvalidSignature)?;
    let expected = STANDARD.decode(signature).map_err(|_| LogbookError::InvalidSignature)?;

    let mut mac = mac_for(channel_secret);
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| LogbookError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "channel-secret";
    const BODY: &[u8] = br#"{"destination":"U","events":[]}"#;

    #[test]
    fn test_signature_roundtrip() {
        let signature = compute_signature(SECRET, BODY);
        assert!(verify_signature(SECRET, BODY, Some(&signature)).is_ok());
    }

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let signature = compute_signature("key", b"The quick brown fox jumps over the lazy dog");
        assert_eq!(signature, "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=");
    }

    #[test]
    fn test_rejects_bad_signatures() {
        let signature = compute_signature(SECRET, BODY);

        assert_matches!(verify_signature(SECRET, BODY, None), Err(LogbookError::InvalidSignature));
        assert_matches!(verify_signature(SECRET, BODY, Some("")), Err(LogbookError::InvalidSignature));
        assert_matches!(verify_signature(SECRET, BODY, Some("not base64!")), Err(LogbookError::InvalidSignature));
        assert_matches!(verify_signature("other-secret", BODY, Some(&signature)), Err(LogbookError::InvalidSignature));
        assert_matches!(verify_signature(SECRET, b"{}", Some(&signature)), Err(LogbookError::InvalidSignature));
    }
}
