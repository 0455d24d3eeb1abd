//! Signed, time-limited access tokens.
//!
//! Tokens use the compact `header.payload.signature` layout with each part
//! base64url-encoded without padding. The header is fixed to
//! `{"alg":"HS256","typ":"JWT"}` and the signature is HMAC-SHA256 over
//! `header.payload`. Tokens never carry anything beyond the subject and the
//! two timestamps, and there is no server-side session table.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;
use zeroize::{Zeroize, Zeroizing};

use super::Error;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted secret length in bytes.
pub const TOKEN_SECRET_MIN_LEN: usize = 32;

const GENERATED_SECRET_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const ALGORITHM: &str = "HS256";
const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Errors raised when constructing a [`TokenSecret`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenSecretError {
    #[error("token secret too short: need >= {min_len} bytes, got {length}")]
    TooShort { length: usize, min_len: usize },
}

/// HMAC key shared by every token the server issues.
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    /// Wrap raw key material, rejecting keys shorter than
    /// [`TOKEN_SECRET_MIN_LEN`]. Rejected bytes are wiped.
    pub fn new(mut bytes: Vec<u8>) -> Result<Self, TokenSecretError> {
        let length = bytes.len();
        if length < TOKEN_SECRET_MIN_LEN {
            bytes.zeroize();
            return Err(TokenSecretError::TooShort {
                length,
                min_len: TOKEN_SECRET_MIN_LEN,
            });
        }
        Ok(Self(Zeroizing::new(bytes)))
    }

    /// Random secret for development runs. Tokens signed with it do not
    /// survive a restart.
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Zeroizing::new(bytes))
    }

    /// Truncated SHA-256 fingerprint, safe to log.
    ///
    /// # Examples
    /// ```
    /// use qa_backend::domain::TokenSecret;
    ///
    /// let secret = TokenSecret::new(vec![b'k'; 32]).expect("long enough");
    /// let fp = secret.fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret({})", self.fingerprint())
    }
}

/// Token payload: subject plus issue and expiry instants in Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued, encoded token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// Encoded `header.payload.signature` string.
    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Reasons a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a well-formed header.payload.signature triple")]
    Malformed,
    #[error("token header names an unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Signs and verifies access tokens with a single HMAC secret.
#[derive(Clone, Debug)]
pub struct TokenCodec {
    secret: Arc<TokenSecret>,
}

impl TokenCodec {
    pub fn new(secret: TokenSecret) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }

    /// Encode and sign `claims`.
    pub fn sign(&self, claims: &Claims) -> Result<String, Error> {
        let payload = serde_json::to_vec(claims).map_err(|err| {
            error!(error = %err, "failed to serialise token claims");
            Error::internal("failed to encode access token")
        })?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER_JSON),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let mut mac = self.mac().ok_or_else(|| Error::internal("token key rejected"))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Check the envelope, signature, and expiry of `token` at `now`.
    ///
    /// A token is dead once `exp <= now`; there is no grace window.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_segment), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_json(header_segment)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac().ok_or(TokenError::BadSignature)?;
        mac.update(header_segment.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_json(payload)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.as_bytes()).ok()
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
