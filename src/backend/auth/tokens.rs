/**
 * Token Service
 *
 * Issues and verifies the two JWT classes used by the API:
 *
 * - access tokens: `{sub, role, iat, exp, typ: "access"}`, short-lived,
 *   signed with the access secret
 * - refresh tokens: `{sub, iat, exp, typ: "refresh"}`, longer-lived, signed
 *   with a distinct refresh secret
 *
 * Verification is CPU-only: signature, `typ` and expiry. No store lookup.
 */

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::error::BackendError;
use crate::backend::server::config::ServerConfig;
use crate::shared::{Identity, Role, UserId};

/// Token verification and issuing failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    /// Signing failed; only possible with a broken key setup
    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token service misconfigured: {0}")]
    Misconfigured(String),
}

impl From<TokenError> for BackendError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => BackendError::unauthenticated("Invalid token"),
            TokenError::ExpiredToken => BackendError::unauthenticated("Token expired"),
            TokenError::Signing(_) | TokenError::Misconfigured(_) => {
                BackendError::internal(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: u64,
    /// Expiration (Unix seconds)
    pub exp: u64,
    pub typ: TokenKind,
}

/// Refresh token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub typ: TokenKind,
}

/// Access/refresh pair returned by login, register and refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Stateless issuer/verifier for access and refresh tokens
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a service from two secrets and TTLs
    ///
    /// Fails when a secret is empty or both secrets are equal: a shared
    /// secret would let one token class pass as the other.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenError> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(TokenError::Misconfigured("empty signing secret".into()));
        }
        if access_secret == refresh_secret {
            return Err(TokenError::Misconfigured(
                "access and refresh secrets must differ".into(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            access: KeyPair::from_secret(access_secret),
            refresh: KeyPair::from_secret(refresh_secret),
            access_ttl,
            refresh_ttl,
            validation,
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, TokenError> {
        Self::new(
            &config.jwt_secret,
            &config.refresh_token_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue an access token for an identity
    pub fn issue_access(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: identity.user_id.to_string(),
            role: identity.role,
            iat: unix(now),
            exp: unix(now + self.access_ttl.num_seconds()),
            typ: TokenKind::Access,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.access.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a refresh token for a subject
    pub fn issue_refresh(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: unix(now),
            exp: unix(now + self.refresh_ttl.num_seconds()),
            typ: TokenKind::Refresh,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(identity)?,
            refresh_token: self.issue_refresh(identity.user_id)?,
        })
    }

    /// Verify an access token and return the identity it carries
    pub fn verify_access(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<AccessClaims>(token, &self.access.decoding, &self.validation)
            .map_err(classify)?;
        let claims = data.claims;
        if claims.typ != TokenKind::Access {
            return Err(TokenError::InvalidToken);
        }
        Ok(Identity {
            user_id: parse_subject(&claims.sub)?,
            role: claims.role,
            issued_at: claims.iat as i64,
        })
    }

    /// Verify a refresh token and return its subject
    pub fn verify_refresh(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<RefreshClaims>(token, &self.refresh.decoding, &self.validation)
            .map_err(classify)?;
        if data.claims.typ != TokenKind::Refresh {
            return Err(TokenError::InvalidToken);
        }
        parse_subject(&data.claims.sub)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        _ => TokenError::InvalidToken,
    }
}

fn parse_subject(sub: &str) -> Result<UserId, TokenError> {
    sub.parse().map_err(|_| TokenError::InvalidToken)
}

fn unix(seconds: i64) -> u64 {
    seconds.max(0) as u64
}
