use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const ADMIN_ROLE: &str = "admin";
pub const TOKEN_TTL_HOURS: i64 = 12;

/// Claims carried by an admin session token. Stateless: the token is the
/// whole session, nothing is stored server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Exchanges the shared admin password for a signed session token.
pub fn login(password: &str, admin_password: &str, jwt_secret: &str) -> Result<String, AppError> {
    if password.trim().is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    if password != admin_password {
        return Err(AppError::Unauthorized("invalid password".to_string()));
    }
    issue_token(jwt_secret)
}

pub fn issue_token(jwt_secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Config(format!("failed to sign session token: {e}")))
}

/// Guard for admin-only handlers. Expired, malformed and missing tokens are
/// all reported the same way; a valid signature with the wrong role is the
/// one case that gets a 403 instead.
pub fn authorize(headers: &HeaderMap, jwt_secret: &str) -> Result<Claims, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Unauthorized("missing bearer token".to_string()));
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))?;

    if data.claims.role != ADMIN_ROLE {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn issued_token_authorizes() {
        let token = issue_token("secret").unwrap();
        let claims = authorize(&headers_with_token(&token), "secret").unwrap();
        assert_eq!(claims.role, ADMIN_ROLE);

        let ttl = claims.exp - claims.iat;
        assert_eq!(ttl, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token("secret").unwrap();
        let err = authorize(&headers_with_token(&token), "other-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn missing_header_rejected() {
        let err = authorize(&HeaderMap::new(), "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn login_requires_password() {
        let err = login("", "pw", "secret").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = login("wrong", "pw", "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        assert!(login("pw", "pw", "secret").is_ok());
    }
}
