//! Password hashing and signed identity tokens.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const HASH_SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
    #[error("Malformed password hash")]
    MalformedHash,
    #[error("Invalid signing key")]
    InvalidKey,
}

/// Hash `password` with PBKDF2-HMAC-SHA256 and a fresh random salt.
///
/// Returns `pbkdf2-sha256$<rounds>$<salt>$<hash>` with standard base64.
#[must_use]
pub fn hash_password(password: &str, rounds: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, rounds);
    format!(
        "{HASH_SCHEME}${rounds}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(hash)
    )
}

/// Check `password` against a hash produced by [`hash_password`].
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, AuthError> {
    let mut fields = encoded.split('$');
    let (Some(HASH_SCHEME), Some(rounds), Some(salt), Some(hash), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(AuthError::MalformedHash);
    };

    let rounds: u32 = rounds.parse().map_err(|_| AuthError::MalformedHash)?;
    let salt = STANDARD.decode(salt).map_err(|_| AuthError::MalformedHash)?;
    let expected = STANDARD.decode(hash).map_err(|_| AuthError::MalformedHash)?;

    let actual = derive(password, &salt, rounds);
    Ok(actual.as_slice().ct_eq(&expected).into())
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

/// Identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: u64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies compact HS256 JWTs.
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, id: u64, email: &str) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        self.sign(&Claims {
            id,
            email: email.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        let payload = serde_json::to_vec(claims).map_err(|_| AuthError::Malformed)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.mac(&signing_input)?.finalize().into_bytes();
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify the signature and expiry of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(AuthError::Malformed)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(AuthError::Malformed)?;

        let header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| AuthError::Malformed)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header).map_err(|_| AuthError::Malformed)?;
        if header.get("alg").and_then(serde_json::Value::as_str) != Some("HS256") {
            return Err(AuthError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed)?;
        self.mac(signing_input)?
            .verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, AuthError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidKey)?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}
