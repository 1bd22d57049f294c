//! Session authentication and the ownership gate.
//!
//! Sessions are stateless signed tokens (HS256) carried in an http-only
//! cookie named `token`. There is no server-side session table: issuance
//! stamps an expiry, verification checks signature and expiry, and logout
//! is purely a client-side cookie removal.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity. Ownership checks compare this exact string.
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Signing and verification keys for session tokens.
///
/// Built once from the injected `SECRET_KEY` configuration and shared via
/// application state.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    /// Create keys from an HMAC secret and a token lifetime in days.
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a signed token for an identity claim.
    ///
    /// The only validation is that the identity is non-empty; anything
    /// further is the caller's concern.
    pub fn issue(&self, email: &str) -> ApiResult<String> {
        if email.is_empty() {
            return Err(ApiError::Validation("email must not be empty".to_string()));
        }
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("failed to sign session token: {e}")))
    }

    /// Verify a token and return its claims. Bad signatures and expired
    /// tokens both surface as 401.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::unauthorized("invalid or expired session"))
    }
}

/// Build the session cookie carrying a freshly issued token.
pub fn session_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .build()
}

/// Build the expired cookie that clears the session client-side.
///
/// Added to the response jar directly so the clearing header is sent
/// whether or not the request carried a session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Verified caller identity, extracted from the session cookie.
///
/// Extraction fails with 401 before the handler body runs, so handlers
/// taking an `AuthUser` never see unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl AuthUser {
    /// The ownership gate: proceed only when the verified session
    /// identity equals the requested resource owner (case-sensitive).
    ///
    /// Call this before touching the store so a mismatch never executes
    /// the downstream query.
    pub fn require_owner(&self, owner_email: &str) -> ApiResult<()> {
        if self.email == owner_email {
            Ok(())
        } else {
            Err(ApiError::forbidden("resource belongs to another user"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("missing session cookie"))?;
        let claims = state.keys.verify(cookie.value())?;
        Ok(Self {
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret", 365)
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let keys = keys();
        let token = keys.issue("a@x.com").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn empty_identity_is_rejected() {
        let err = keys().issue("").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn token_signed_with_other_key_fails() {
        let token = SessionKeys::new("other-secret", 365).issue("a@x.com").unwrap();
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_fails() {
        let keys = keys();
        let now = Utc::now();
        let claims = Claims {
            email: "a@x.com".to_string(),
            iat: (now - Duration::days(2)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn garbage_token_fails() {
        let err = keys().verify("not-a-jwt").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn ownership_gate_is_case_sensitive_exact_match() {
        let user = AuthUser {
            email: "a@x.com".to_string(),
        };
        assert!(user.require_owner("a@x.com").is_ok());
        assert!(matches!(
            user.require_owner("b@x.com").unwrap_err(),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            user.require_owner("A@x.com").unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }

    #[test]
    fn session_cookie_flags() {
        let cookie = session_cookie("tok".to_string(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.secure(), Some(false));

        let prod = session_cookie("tok".to_string(), true);
        assert_eq!(prod.same_site(), Some(SameSite::None));
        assert_eq!(prod.secure(), Some(true));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().unwrap().is_zero());
    }
}
