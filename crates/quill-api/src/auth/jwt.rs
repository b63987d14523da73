// JWT token service for authentication
// Decision: HS256 with a symmetric secret; the issuer value doubles as the
//           audience. Verification is pinned to HS256 so a token carrying a
//           different `alg` header is rejected outright.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Any verification failure: malformed string, bad signature, wrong
/// algorithm, wrong issuer/audience, expired, or not yet valid.
#[derive(Debug, Error)]
#[error("invalid token: {0}")]
pub struct InvalidToken(#[from] jsonwebtoken::errors::Error);

/// Claim set carried by an identity token. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a string per JWT convention.
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience (same value as the issuer)
    pub aud: String,
}

impl Claims {
    /// Build the claim set for a freshly authenticated user.
    pub fn for_subject(user_id: i64, issuer: &str, ttl: std::time::Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.as_secs() as i64,
            iss: issuer.to_string(),
            aud: issuer.to_string(),
        }
    }
}

/// Issues and verifies signed identity tokens. Stateless: verification needs
/// nothing but the secret and the configured issuer.
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    ttl: std::time::Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.issuer]);
        validation.validate_nbf = true;
        // No clock slack: an expired token is expired.
        validation.leeway = 0;

        Self {
            issuer: config.issuer.clone(),
            ttl: config.token_ttl,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for a user id with the configured issuer and lifetime.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.generate(&Claims::for_subject(user_id, &self.issuer, self.ttl))
    }

    /// Sign an explicit claim set.
    pub fn generate(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).context("failed to encode token")
    }

    /// Verify signature, issuer, audience, and the exp/nbf window.
    pub fn validate(&self, token: &str) -> Result<Claims, InvalidToken> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
