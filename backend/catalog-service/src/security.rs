use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256, the format admin credentials are stored and compared in
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
