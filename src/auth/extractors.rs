use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{error::AuthError, jwt::{Claims, JwtKeys}, services::verify_session_token};

/// Verified claims of the bearer session token.
pub struct SessionClaims(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for SessionClaims
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        // Expect "Bearer <token>"
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
            })
            .ok_or(AuthError::InvalidSession)?;

        verify_session_token(&keys, token.trim()).map(SessionClaims)
    }
}
