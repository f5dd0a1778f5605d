//! Inbound event signature verification (`X-Hub-Signature`, HMAC-SHA1).

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Prefix the source host puts in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Compute `sha1=<hex HMAC-SHA1(secret, body)>`.
pub fn compute_signature(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Check a presented signature against the body and the hook secret.
///
/// The comparison is constant-time over the expected value; a length
/// mismatch fails without comparing content.
pub fn verify(body: &[u8], secret: &[u8], presented: &str) -> bool {
    let expected = compute_signature(secret, body);
    let expected = expected.as_bytes();
    let presented = presented.as_bytes();

    if expected.len() != presented.len() {
        return false;
    }

    expected.ct_eq(presented).into()
}

/// Constant-time equality for shared secrets presented by callers.
pub fn secrets_match(stored: &str, presented: &str) -> bool {
    let stored = stored.as_bytes();
    let presented = presented.as_bytes();
    stored.len() == presented.len() && bool::from(stored.ct_eq(presented))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
