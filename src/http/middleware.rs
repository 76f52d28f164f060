//! Connection identity and JWT verification

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::util::time::unix_millis;

type HmacSha256 = Hmac<Sha256>;

/// Who is on the other end of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
    pub is_guest: bool,
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
}

/// Verify an HS256 token and extract claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::InvalidToken);
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::InvalidToken)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(payload_b64.as_bytes());

    let provided_signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::InvalidToken)?;
    mac.verify_slice(&provided_signature)
        .map_err(|_| AuthError::InvalidToken)?;

    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AuthError::InvalidToken)?;
    let claims: JwtClaims =
        serde_json::from_slice(&payload_json).map_err(|_| AuthError::InvalidToken)?;

    if claims.exp < unix_millis() / 1000 {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Resolve a connection's identity. A token wins over a client id; with
/// neither the connection is refused.
pub fn resolve_identity(
    token: Option<&str>,
    client_id: Option<&str>,
    secret: Option<&str>,
) -> Result<Identity, AuthError> {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let secret = secret.ok_or(AuthError::AuthDisabled)?;
        let claims = verify_jwt(token, secret)?;
        let display_name = claims.nick_name.unwrap_or_else(|| claims.sub.clone());
        return Ok(Identity {
            user_id: claims.sub,
            display_name,
            is_guest: claims.is_guest,
        });
    }

    let client_id = client_id
        .filter(|id| !id.is_empty())
        .ok_or(AuthError::MissingIdentity)?;
    Ok(Identity {
        user_id: client_id.to_string(),
        display_name: client_id.to_string(),
        is_guest: true,
    })
}

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("clientId or token required")]
    MissingIdentity,

    #[error("Token authentication is not configured")]
    AuthDisabled,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingIdentity => StatusCode::BAD_REQUEST,
            AuthError::AuthDisabled => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}
