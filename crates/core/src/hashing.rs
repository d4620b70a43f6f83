//! SHA-256 helpers shared by secret comparison and page snapshots.

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compare a caller-supplied secret against the configured one.
///
/// Both sides are hashed first so the comparison runs over equal-length
/// digests and does not leak the configured secret's length.
pub fn secret_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    constant_time_eq(provided.as_slice(), expected.as_slice())
}
