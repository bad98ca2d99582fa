// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Session token verification.
//!
//! Sessions are HS256 JWTs minted by the identity provider and presented
//! either as an `Authorization: Bearer` header or a `notice_session` cookie.
//! The verifier translates a token into a domain [`Session`].

use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::session::{Session, SessionError};

const SESSION_COOKIE: &str = "notice_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub exp: i64,
}

pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e.to_string()),
            },
        )?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(SessionError::Invalid("empty subject".to_string()));
        }
        Ok(Session::new(claims.sub, claims.email, claims.email_verified))
    }

    /// Extracts the session token from a request, preferring the
    /// `Authorization` header over the session cookie.
    pub fn token_from_headers(headers: &HeaderMap) -> Result<&str, SessionError> {
        if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
            let value = value
                .to_str()
                .map_err(|_| SessionError::Invalid("non-ASCII authorization header".into()))?;
            return value
                .strip_prefix("Bearer ")
                .ok_or_else(|| SessionError::Invalid("malformed authorization header".into()));
        }

        if let Some(cookies) = headers.get(axum::http::header::COOKIE) {
            let cookies = cookies
                .to_str()
                .map_err(|_| SessionError::Invalid("non-ASCII cookie header".into()))?;
            for pair in cookies.split(';') {
                let pair = pair.trim();
                if let Some(token) = pair
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    return Ok(token);
                }
            }
        }

        Err(SessionError::Missing)
    }

    pub fn session_from_headers(&self, headers: &HeaderMap) -> Result<Session, SessionError> {
        let token = Self::token_from_headers(headers)?;
        self.verify(token)
    }
}

/// Mints a session token. Used by tests and local tooling; production
/// tokens come from the identity provider with the same shared secret.
pub fn issue_session_token(
    secret: &str,
    session: &Session,
    ttl: Duration,
) -> Result<String, SessionError> {
    let claims = SessionClaims {
        sub: session.user_id.as_str().to_string(),
        email: session.email.clone(),
        email_verified: session.email_verified,
        exp: chrono::Utc::now().timestamp() + ttl.as_secs() as i64,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    fn session() -> Session {
        Session::new("u-1", "alex@example.com", true)
    }

    #[test]
    fn test_round_trip() {
        let token = issue_session_token("secret", &session(), Duration::from_secs(3600)).unwrap();
        let verifier = SessionVerifier::new("secret");
        let verified = verifier.verify(&token).unwrap();
        assert_eq!(verified.user_id.as_str(), "u-1");
        assert_eq!(verified.email, "alex@example.com");
        assert!(verified.email_verified);
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let token = issue_session_token("secret", &session(), Duration::from_secs(3600)).unwrap();
        let verifier = SessionVerifier::new("other-secret");
        assert!(matches!(verifier.verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let claims = SessionClaims {
            sub: "u-1".to_string(),
            email: "alex@example.com".to_string(),
            email_verified: true,
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let verifier = SessionVerifier::new("secret");
        assert!(matches!(verifier.verify(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(
            SessionVerifier::token_from_headers(&headers).unwrap(),
            "abc.def.ghi"
        );
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "theme=dark; notice_session=abc.def.ghi".parse().unwrap(),
        );
        assert_eq!(
            SessionVerifier::token_from_headers(&headers).unwrap(),
            "abc.def.ghi"
        );
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();
        assert!(matches!(
            SessionVerifier::token_from_headers(&headers),
            Err(SessionError::Missing)
        ));
    }
}
