use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};
use password_hash::Error as PasswordHashError;
use rand::{rngs::OsRng, TryRngCore};
use thiserror::Error;

/// Credential hasher for rescuer passwords.
///
/// Argon2id with fixed parameter choices so every registration and login
/// path hashes the same way. Verification goes through the PHC string
/// stored at registration time.
#[derive(Debug)]
pub struct AuthCrypto {
    argon2: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl From<PasswordHashError> for AuthCryptoError {
    fn from(err: PasswordHashError) -> Self {
        AuthCryptoError::PasswordHash(err.to_string())
    }
}

impl AuthCrypto {
    /// ~19 MiB / 2 iterations, the argon2 crate's RFC 9106 low-memory
    /// baseline. Registration latency stays acceptable on small hosts.
    const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
    const DEFAULT_ITERATIONS: u32 = 2;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    pub fn new() -> Result<Self, AuthCryptoError> {
        Self::with_params(
            ParamsBuilder::new()
                .m_cost(Self::DEFAULT_MEMORY_KIB)
                .t_cost(Self::DEFAULT_ITERATIONS)
                .p_cost(Self::DEFAULT_PARALLELISM)
                .output_len(32)
                .build()
                .map_err(|err| AuthCryptoError::InvalidParams(err.to_string()))?,
        )
    }

    /// Caller-specified parameters, used by tests to keep hashing cheap.
    pub fn with_params(params: Params) -> Result<Self, AuthCryptoError> {
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
        })
    }

    /// Hash a password with a fresh random salt. The resulting PHC string
    /// is what goes into the store.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthCryptoError> {
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| AuthCryptoError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;

        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Constant-time-equivalent verification against a stored PHC string.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
