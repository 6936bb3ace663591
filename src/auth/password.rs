use bcrypt::{hash, verify, DEFAULT_COST};

/// One-way hash for credential storage.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Verify a password against a stored digest. An undecodable digest counts
/// as a mismatch rather than an error; login treats both the same way.
pub fn verify_password(password: &str, digest: &str) -> bool {
    verify(password, digest).unwrap_or(false)
}
