/**
 * Session Tokens
 *
 * Access and refresh JWTs for signed-in users.
 *
 * # Tokens
 *
 * - Access token: HS256, claims `{userId, role, iss, iat, exp}`, one hour
 * - Refresh token: HS256 with its own secret, claims `{userId, iss, iat, exp}`,
 *   seven days
 *
 * Only a bcrypt hash of the refresh token is stored. The token is reduced to
 * its SHA-256 hex digest first so it fits bcrypt's 72-byte input.
 */

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::passwords::{hash_password, verify_password};
use crate::shared::config::TokenSettings;
use crate::shared::planner::{Role, TokenRecord, User};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("{0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("failed to hash token: {0}")]
    Hashing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Tokens handed to a client after sign-in
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    /// Refresh-token lifetime in seconds
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

/// Issues and verifies session tokens
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    bcrypt_cost: u32,
}

impl TokenService {
    pub fn new(settings: &TokenSettings, bcrypt_cost: u32) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            issuer: settings.issuer.clone(),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
            bcrypt_cost,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);
        validation
    }

    pub fn create_access_token(&self, user_id: Uuid, role: Role, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat + self.access_ttl_secs,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn create_refresh_token(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = RefreshClaims {
            user_id: user_id.to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat + self.refresh_ttl_secs,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.access_decoding, &self.validation())?;
        Ok(data.claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let data = jsonwebtoken::decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation())?;
        Ok(data.claims)
    }

    /// bcrypt of the token's SHA-256 hex digest
    pub async fn hash_refresh_token(&self, token: &str) -> Result<String, TokenError> {
        hash_password(&refresh_digest(token), self.bcrypt_cost)
            .await
            .map_err(|e| TokenError::Hashing(e.to_string()))
    }

    pub async fn verify_refresh_token_hash(&self, token: &str, stored_hash: &str) -> Result<bool, TokenError> {
        verify_password(&refresh_digest(token), stored_hash)
            .await
            .map_err(|e| TokenError::Hashing(e.to_string()))
    }

    /// Sign a fresh pair for `user` and the record that replaces their stored refresh token
    pub async fn issue_pair(&self, user: &User) -> Result<(TokenPair, TokenRecord), TokenError> {
        let now = Utc::now();
        let access_token = self.create_access_token(user.id, user.role, now)?;
        let refresh_token = self.create_refresh_token(user.id, now)?;
        let token_hash = self.hash_refresh_token(&refresh_token).await?;

        let record = TokenRecord {
            user_id: user.id,
            token_hash,
            issued_at: now,
            expires_in_secs: self.refresh_ttl_secs,
            revoked: false,
        };
        let pair = TokenPair {
            access_token,
            refresh_token,
            expires_in: self.refresh_ttl_secs,
        };
        Ok((pair, record))
    }
}

fn refresh_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
