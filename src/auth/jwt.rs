//! Session token codec shared by the user and todo services.
//!
//! Tokens are HS256 JWTs. Both services must agree on the claim layout below
//! and on the secret; nothing else is shared between them.

use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey,
    EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AccountId;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier (the account id). Optional on the wire so a token
    /// without it can be reported as [`TokenError::MissingSubject`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<AccountId>,
    /// Human readable subject name (the username)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

impl Claims {
    pub fn new(user_id: AccountId, username: Option<String>, exp: u64) -> Self {
        Self { user_id: Some(user_id), sub: username, exp }
    }
}

/// Claims that passed verification; the subject is guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub user_id: AccountId,
    pub username: Option<String>,
    pub exp: u64,
}

/// Reasons a token fails verification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    MalformedToken,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token carries no subject")]
    MissingSubject,
}

/// Issues and verifies session tokens with a shared secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` that expires `ttl` from now.
    pub fn issue(
        &self,
        user_id: AccountId,
        username: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = get_current_timestamp().saturating_add(self.ttl.as_secs());
        self.encode_claims(&Claims::new(user_id, username.map(str::to_string), exp))
    }

    /// Sign arbitrary claims as-is.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
    }

    /// Check signature and expiry, then require a subject.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| classify(err.kind()))?;

        let claims = data.claims;
        let user_id = claims.user_id.ok_or(TokenError::MissingSubject)?;
        Ok(VerifiedClaims { user_id, username: claims.sub, exp: claims.exp })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::MalformedToken,
    }
}
