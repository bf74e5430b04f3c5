use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::{auth::jwt::JwtKeys, error::ApiError};

/// Legacy identity carrier, kept for clients predating the Bearer scheme.
const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Extracts and validates the identity token, yielding the acting user's id.
/// Protected handlers take this as an argument; rejection short-circuits the
/// chain with the JSON error body before any handler code runs.
pub struct AuthUser(pub Uuid);

/// Locate a token in the request headers: `Authorization: Bearer <t>`
/// (preferred) or the legacy `x-auth-token: <t>`.
fn find_token(parts: &Parts) -> Option<&str> {
    if let Some(auth) = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        // Strip the scheme prefix if present; a bare token is accepted too.
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .unwrap_or(auth);
        return Some(token.trim());
    }
    parts
        .headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = find_token(parts)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::AuthRequired)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::AuthDenied
        })?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/posts");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).expect("request").into_parts().0
    }

    async fn extract(headers: &[(&str, &str)]) -> Result<Uuid, ApiError> {
        let state = AppState::fake();
        let mut parts = parts_with(headers);
        AuthUser::from_request_parts(&mut parts, &state)
            .await
            .map(|AuthUser(id)| id)
    }

    fn signed_token(state: &AppState, user_id: Uuid) -> String {
        JwtKeys::from_ref(state).sign(user_id).expect("sign")
    }

    #[tokio::test]
    async fn missing_both_headers_is_authorization_required() {
        let err = extract(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));
        assert_eq!(err.to_string(), "No token, authorization denied");
    }

    #[tokio::test]
    async fn garbage_token_is_authorization_denied() {
        let err = extract(&[("authorization", "Bearer junk.junk.junk")])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthDenied));
        assert_eq!(err.to_string(), "Token is not valid");
    }

    #[tokio::test]
    async fn bearer_header_carries_identity() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = signed_token(&state, user_id);
        let mut parts = parts_with(&[("authorization", &format!("Bearer {token}"))]);
        let AuthUser(got) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(got, user_id);
    }

    #[tokio::test]
    async fn legacy_header_carries_identity() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = signed_token(&state, user_id);
        let mut parts = parts_with(&[("x-auth-token", token.as_str())]);
        let AuthUser(got) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(got, user_id);
    }

    #[tokio::test]
    async fn empty_authorization_header_is_authorization_required() {
        let err = extract(&[("authorization", "")]).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));
    }
}
