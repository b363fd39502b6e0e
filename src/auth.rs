//! Bearer-token authentication.
//!
//! The identity provider signs HS256 JWTs carrying the user id (`sub`),
//! email and role. [`TokenVerifier`] turns a token into a verified
//! [`Identity`]; the [`Authenticated`] extractor does so for every request
//! that carries `Authorization: Bearer <token>`.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::domain::{Identity, Role, UserId};
use crate::error::DepotError;

/// JWT claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user id.
    pub sub: String,
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Role claim; absent means customer.
    #[serde(default)]
    pub role: Role,
    /// Expiry as a Unix timestamp.
    pub exp: u64,
}

/// Verifies bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier for HS256 tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
        }
    }

    /// Verifies the signature and expiry of `token` and returns the caller.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Unauthenticated`] for a malformed, forged or
    /// expired token, or one without a subject.
    pub fn verify(&self, token: &str) -> Result<Identity, DepotError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            DepotError::Unauthenticated(e.to_string())
        })?;
        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(DepotError::Unauthenticated(
                "token has no subject".to_string(),
            ));
        }
        Ok(Identity {
            user_id: UserId::new(claims.sub),
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Signs tokens the way the identity provider does. Used by local tooling
/// and tests.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer whose tokens expire after `ttl`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Signs a token for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Internal`] if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<String, DepotError> {
        let exp = (Utc::now() + self.ttl).timestamp().max(0).unsigned_abs();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            exp,
        };
        encode(&Header::default(), &claims, &self.key)
            .map_err(|e| DepotError::Internal(format!("token signing failed: {e}")))
    }
}

/// Extractor yielding the verified caller of a request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = DepotError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| DepotError::Unauthenticated("missing bearer token".to_string()))?
            .to_str()
            .map_err(|_| DepotError::Unauthenticated("malformed authorization header".to_string()))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| DepotError::Unauthenticated("expected a bearer token".to_string()))?;
        state.auth.verify(token.trim()).map(Self)
    }
}
