use std::sync::OnceLock;

use argon2::{
    Argon2, ParamsBuilder, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// PasswordError
///
/// Failure modes of the hashing primitive. A wrong password is *not* an error
/// (it is `Ok(false)` from `verify_password`); these cover genuine operational
/// failures such as a corrupted stored digest.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("failed to verify password: {0}")]
    Verify(String),

    #[error("invalid password hash format: {0}")]
    InvalidHash(String),
}

/// hash_password
///
/// Produces a self-contained Argon2id digest in PHC string format: the
/// algorithm, parameters, and a fresh random 16-byte salt are all embedded in
/// the output, so verification needs nothing beyond the digest itself.
///
/// Parameters: 64 MB memory, 3 iterations, 4 lanes, 32-byte output.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::Hash(format!("invalid parameters: {e}")))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(format!("hash generation failed: {e}")))?;

    Ok(digest.to_string())
}

/// verify_password
///
/// Recomputes the digest with the parameters embedded in `hash` and compares
/// in constant time. Returns `Ok(false)` for a wrong password and `Err` only
/// when the stored digest itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("failed to parse hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(format!("verification failed: {e}"))),
    }
}

static FALLBACK_DIGEST: OnceLock<String> = OnceLock::new();

/// fallback_digest
///
/// A process-wide placeholder digest. Login handlers verify against this when
/// the requested username does not exist, so the response time of a failed
/// login does not reveal whether the account exists.
pub fn fallback_digest() -> &'static str {
    FALLBACK_DIGEST.get_or_init(|| hash_password("fallback-placeholder").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_produces_phc_argon2id() {
        let hash = hash_password("test_password_123").expect("hash should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let hash1 = hash_password("same_password").expect("hash 1 should succeed");
        let hash2 = hash_password("same_password").expect("hash 2 should succeed");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn verify_accepts_correct_password() {
        let hash = hash_password("correct_password").expect("hash should succeed");
        assert!(verify_password("correct_password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct_password").expect("hash should succeed");
        assert!(!verify_password("wrong_password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_empty_password() {
        let hash = hash_password("password").expect("hash should succeed");
        assert!(!verify_password("", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_errors_on_malformed_digest() {
        assert!(verify_password("password", "not-a-digest").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn roundtrip_covers_awkward_plaintexts() {
        let passwords = [
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
        ];

        for password in passwords {
            let hash = hash_password(password).expect("hash should succeed");
            assert!(
                verify_password(password, &hash).expect("verify should succeed"),
                "password '{password}' should verify"
            );
        }
    }

    #[test]
    fn fallback_digest_is_stable_and_never_matches() {
        let digest = fallback_digest();
        assert_eq!(digest, fallback_digest());
        assert!(!verify_password("pw1", digest).unwrap());
    }
}
