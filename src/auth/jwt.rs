//! JWT Token Handler
//! Mission: Mint, validate and refresh bearer tokens

use crate::auth::models::{Claims, User, UserRole};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

/// Default lifetime of a freshly minted token
pub const TOKEN_TTL_DAYS: i64 = 7;
/// Tokens with less validity than this left are re-minted on verification
pub const REFRESH_THRESHOLD_DAYS: i64 = 1;

/// Why a token failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired { expired_at: DateTime<Utc> },
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    refresh_threshold: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(TOKEN_TTL_DAYS),
            refresh_threshold: Duration::days(REFRESH_THRESHOLD_DAYS),
        }
    }

    /// Override the token lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &User) -> Result<(String, i64)> {
        self.issue(&user.id.to_string(), &user.email, user.role)
    }

    /// Sign a token for an identity. Returns the token and its lifetime in seconds.
    pub fn issue(&self, sub: &str, email: &str, role: UserRole) -> Result<(String, i64)> {
        let (token, _) = self.sign(sub, email, role)?;
        Ok((token, self.ttl.num_seconds()))
    }

    /// Mint a full-lifetime replacement from the stored account, so the new
    /// token carries the account's current role rather than the old claim.
    pub fn reissue(&self, user: &User) -> Result<(String, Claims)> {
        self.sign(&user.id.to_string(), &user.email, user.role)
    }

    fn sign(&self, sub: &str, email: &str, role: UserRole) -> Result<(String, Claims)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        debug!(
            "Generating JWT for {} ({}), expires {}",
            sub,
            role.as_str(),
            expiration.to_rfc3339()
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")?;

        Ok((token, claims))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        match decode::<Claims>(token, &self.decoding_key, &Self::validation(true)) {
            Ok(decoded) => {
                debug!("Validated JWT for user {}", decoded.claims.sub);
                Ok(decoded.claims)
            }
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                // Signature was fine; read the claims again only to report when it lapsed
                let expired_at = decode::<Claims>(token, &self.decoding_key, &Self::validation(false))
                    .map(|decoded| decoded.claims.expires_at())
                    .map_err(|_| TokenError::Invalid)?;
                Err(TokenError::Expired { expired_at })
            }
            Err(_) => Err(TokenError::Invalid),
        }
    }

    /// True when the token has less than the refresh threshold left
    pub fn needs_refresh(&self, claims: &Claims) -> bool {
        claims.expires_at() - Utc::now() < self.refresh_threshold
    }

    fn validation(validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        validation
    }
}
