use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError, repository::RepositoryState};

/// Claims
///
/// The payload structure carried inside every bearer token. Claims are signed
/// with the server's secret and validated on every admin-gated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the database id of the principal the token was issued for.
    pub sub: i64,
    /// Expiration Time (exp): timestamp after which the token must not be accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the token was issued.
    pub iat: usize,
}

/// issue_token
///
/// Mints a stateless bearer token bound to `principal_id`, expiring
/// `token_ttl_secs` from now. There is no server-side revocation list; logout
/// is a client-side token-discard convention.
pub fn issue_token(principal_id: i64, config: &AppConfig) -> Result<String, ApiError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: principal_id,
        iat: now,
        exp: now + config.token_ttl_secs as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// decode_token
///
/// Validates the signature and expiry of a bearer token and returns its
/// claims. Both failure modes map to 401; expiry gets its own message so a
/// client knows to log in again.
pub fn decode_token(token: &str, config: &AppConfig) -> Result<Claims, ApiError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid bearer token".to_string()),
        })
}

/// AuthAdmin
///
/// The resolved identity of an authenticated administrator. Handlers take this
/// as an argument; its presence alone proves the request carried a valid token
/// whose subject is an existing row in the *admin* credential space. Tokens
/// issued to ordinary users never resolve here, because the lookup goes
/// against the admins table specifically.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: i64,
    pub username: String,
}

/// AuthAdmin Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthAdmin usable as a
/// function argument in any admin-gated handler. The process:
/// 1. Dependency resolution: pull the Repository and AppConfig from the state.
/// 2. Token extraction: standard Bearer token from the Authorization header.
/// 3. Signature and expiry validation.
/// 4. DB lookup: the token subject must still exist in the admins table.
///
/// Rejection: 401 for a missing/invalid/expired token, 404 when the token is
/// valid but its subject is not an existing admin.
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Malformed Authorization header".to_string()))?;

        let claims = decode_token(token, &config)?;

        // The token may outlive the account it was issued for; re-resolving the
        // subject here closes that window.
        let admin = repo
            .get_admin(claims.sub)
            .await?
            .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

        Ok(AuthAdmin {
            id: admin.id,
            username: admin.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_decodes_to_the_same_subject() {
        let config = AppConfig::default();
        let token = issue_token(42, &config).expect("issue should succeed");

        let claims = decode_token(&token, &config).expect("decode should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.exp, claims.iat + config.token_ttl_secs as usize);
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let config = AppConfig::default();
        let other = AppConfig {
            jwt_secret: "a-completely-different-secret".to_string(),
            ..AppConfig::default()
        };

        let token = issue_token(7, &other).expect("issue should succeed");
        assert!(decode_token(&token, &config).is_err());
    }

    #[test]
    fn expired_token_is_rejected_with_expiry_message() {
        let config = AppConfig {
            token_ttl_secs: 0,
            ..AppConfig::default()
        };

        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: 1,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        match decode_token(&token, &config) {
            Err(ApiError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }
}
