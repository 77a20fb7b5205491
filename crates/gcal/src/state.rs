//! Signed OAuth `state` parameter.
//!
//! The state round-trips through Google untouched and comes back on the
//! public callback, so it carries the professional id together with an
//! HMAC-SHA256 signature: `<professional_id>.<issued_at>.<hex signature>`.

use assist_core::types::{DbId, Timestamp};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// How long a signed state stays valid.
pub const STATE_MAX_AGE_SECS: i64 = 15 * 60;

fn mac_for(secret: &str, payload: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(mac)
}

/// Sign `professional_id` at `issued_at`.
pub fn sign(professional_id: DbId, issued_at: Timestamp, secret: &str) -> String {
    let payload = format!("{professional_id}.{}", issued_at.timestamp());
    let signature = mac_for(secret, &payload)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("{payload}.{signature}")
}

/// Verify a state produced by [`sign`] and return the professional id.
///
/// Returns `None` on a malformed value, a bad signature, or a state older
/// than [`STATE_MAX_AGE_SECS`].
pub fn verify(state: &str, now: Timestamp, secret: &str) -> Option<DbId> {
    let (payload, signature) = state.rsplit_once('.')?;
    let (id, issued) = payload.split_once('.')?;
    let professional_id: DbId = id.parse().ok()?;
    let issued_at: i64 = issued.parse().ok()?;

    let expected = hex::decode(signature)?;
    mac_for(secret, payload)?.verify_slice(&expected).ok()?;

    let age = now.timestamp() - issued_at;
    if !(0..=STATE_MAX_AGE_SECS).contains(&age) {
        return None;
    }
    Some(professional_id)
}

// ---------------------------------------------------------------------------
// hex encoding helper (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
            .collect()
    }
}
