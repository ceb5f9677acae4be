//! HMAC-SHA256 timestamped webhook signature verification.
//!
//! Message format is `"<raw timestamp header>.<raw body>"`. The timestamp
//! must fall within [`WINDOW`] of `now` in either direction, which bounds
//! how long a captured request can be replayed.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::VerifyError;

type HmacSha256 = Hmac<Sha256>;

pub const WINDOW_SECS: i64 = 5 * 60;

pub struct Input<'a> {
    pub secret: &'a [u8],
    pub timestamp_header: &'a str,
    pub signature_header: &'a str,
    pub body: &'a [u8],
    pub now: DateTime<Utc>,
}

pub fn verify(input: Input<'_>) -> Result<(), VerifyError> {
    let ts_header = input.timestamp_header.trim();
    let sig_header = input.signature_header.trim();

    if ts_header.is_empty() {
        return Err(VerifyError::MissingTimestamp);
    }
    if sig_header.is_empty() {
        return Err(VerifyError::MissingSignature);
    }

    let ts_secs: i64 = ts_header
        .parse()
        .map_err(|_| VerifyError::MalformedTimestamp)?;
    let ts = DateTime::<Utc>::from_timestamp(ts_secs, 0)
        .ok_or(VerifyError::MalformedTimestamp)?;

    let delta = (input.now - ts).num_seconds();
    if delta.abs() > WINDOW_SECS {
        return Err(VerifyError::StaleTimestamp);
    }

    let provided_sig = hex::decode(sig_header).map_err(|_| VerifyError::MalformedSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(input.secret).expect("HMAC accepts keys of any length");
    mac.update(ts_header.as_bytes());
    mac.update(b".");
    mac.update(input.body);

    mac.verify_slice(&provided_sig)
        .map_err(|_| VerifyError::SignatureMismatch)
}

/// Computes the hex signature for `"<timestamp_header>.<body>"`. Used by
/// tests and by any tooling that needs to sign outbound fixtures.
pub fn sign_hex(secret: &[u8], timestamp_header: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(timestamp_header.as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
