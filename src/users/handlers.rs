use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::{
    auth::{jwt::JwtKeys, password::hash_password},
    error::ApiError,
    state::AppState,
    users::dto::{RegisterRequest, RegisterResponse},
    users::repo::User,
    validation::{validated, Rule},
};

const REGISTER_RULES: &[Rule] = &[
    Rule::required("name", "Name is required"),
    Rule::required("email", "Email is required"),
    Rule::email("email", "Please enter a valid email"),
    Rule::min_len("password", 6, "Please add a password with 6 or more characters"),
];

pub fn router() -> Router<AppState> {
    Router::new().route("/users/register", post(register))
}

/// Gravatar-style avatar URL derived from the normalized email.
fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s=200&d=mm", digest)
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let mut payload: RegisterRequest = validated(body, REGISTER_RULES)?;
    payload.email = payload.email.trim().to_lowercase();

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::BadRequest("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let avatar = gravatar_url(&payload.email);
    let user = User::create(&state.db, &payload.name, &payload.email, &hash, &avatar).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(RegisterResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravatar_url_normalizes_email() {
        let a = gravatar_url("Dev@Example.com ");
        let b = gravatar_url("dev@example.com");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&d=mm"));
    }

    #[test]
    fn gravatar_url_differs_per_email() {
        assert_ne!(gravatar_url("a@example.com"), gravatar_url("b@example.com"));
    }

    #[test]
    fn register_token_resolves_to_signed_user() {
        use crate::auth::jwt::JwtKeys;
        use std::time::Duration;

        // The token issued at registration must verify back to the new user id.
        let keys = JwtKeys::from_secret("test-secret", Duration::from_secs(300));
        let user_id = uuid::Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
    }
}
