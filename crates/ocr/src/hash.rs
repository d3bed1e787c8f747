use sha2::{Digest, Sha256};

/// Compute SHA-256 of an in-memory byte slice. The digest of an upload is
/// its trace id in pipeline logs.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode a raw 32-byte hash as a lowercase hex string (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
