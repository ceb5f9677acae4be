//! Opaque task identifiers: 8 random bytes, hex-encoded.
//!
//! Not UUIDs — this is a toy service the original never upgraded past
//! `crypto/rand` + `hex.EncodeToString`, so neither does this port.

use rand::RngCore;

pub fn new_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
