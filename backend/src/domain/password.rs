//! One-way password hashing for stored credentials.
//!
//! Hashes are Argon2id PHC strings. Verification against a missing account
//! still runs a full Argon2 verification against a throwaway hash so that an
//! unknown username costs the same as a wrong password.

use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use tracing::error;

use super::ports::CredentialHasher;
use super::{Error, PasswordHash};

const DUMMY_PASSWORD: &str = "not-a-real-password";

/// Argon2id password hasher and verifier.
#[derive(Clone)]
pub struct Argon2Passwords {
    hasher: Argon2<'static>,
    dummy: PasswordHash,
}

impl Argon2Passwords {
    /// Hasher using the library's recommended Argon2id parameters.
    pub fn new() -> Result<Self, Error> {
        Self::with_params(Params::default())
    }

    /// Hasher with explicit cost parameters.
    ///
    /// Tests use tiny parameters; production should stay on [`Self::new`].
    pub fn with_params(params: Params) -> Result<Self, Error> {
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy = hash_with(&hasher, DUMMY_PASSWORD)?;
        Ok(Self { hasher, dummy })
    }

    fn verify_encoded(&self, password: &str, stored: &PasswordHash) -> Result<bool, Error> {
        let parsed = password_hash::PasswordHash::new(stored.as_str()).map_err(|err| {
            error!(error = %err, "stored password hash is not a valid PHC string");
            Error::internal("stored credential is unreadable")
        })?;
        match self.hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => {
                error!(error = %err, "password verification failed");
                Err(Error::internal("password verification failed"))
            }
        }
    }
}

impl CredentialHasher for Argon2Passwords {
    fn hash(&self, password: &str) -> Result<PasswordHash, Error> {
        hash_with(&self.hasher, password)
    }

    fn verify(&self, password: &str, stored: Option<&PasswordHash>) -> Result<bool, Error> {
        let matched = self.verify_encoded(password, stored.unwrap_or(&self.dummy))?;
        Ok(matched && stored.is_some())
    }
}

impl std::fmt::Debug for Argon2Passwords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Passwords").finish_non_exhaustive()
    }
}

fn hash_with(hasher: &Argon2<'static>, password: &str) -> Result<PasswordHash, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let encoded = hasher
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| {
            error!(error = %err, "password hashing failed");
            Error::internal("password hashing failed")
        })?;
    Ok(PasswordHash::new(encoded.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn passwords() -> Argon2Passwords {
        let params = Params::new(8, 1, 1, None).expect("valid argon2 params");
        Argon2Passwords::with_params(params).expect("hasher")
    }

    #[rstest]
    fn hash_then_verify_accepts_same_password(passwords: Argon2Passwords) {
        let stored = passwords.hash("hunter2hunter2").expect("hash");
        assert!(stored.as_str().starts_with("$argon2id$"));
        assert!(passwords.verify("hunter2hunter2", Some(&stored)).expect("verify"));
    }

    #[rstest]
    fn verify_rejects_wrong_password(passwords: Argon2Passwords) {
        let stored = passwords.hash("hunter2hunter2").expect("hash");
        assert!(!passwords.verify("hunter3hunter3", Some(&stored)).expect("verify"));
    }

    #[rstest]
    fn verify_without_record_is_false_even_for_dummy_password(passwords: Argon2Passwords) {
        assert!(!passwords.verify(DUMMY_PASSWORD, None).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes(passwords: Argon2Passwords) {
        let first = passwords.hash("same").expect("hash");
        let second = passwords.hash("same").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn unreadable_stored_hash_is_internal(passwords: Argon2Passwords) {
        let err = passwords
            .verify("pw", Some(&PasswordHash::new("plaintext")))
            .expect_err("garbage hash");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
