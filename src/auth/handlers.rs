use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::verify_password,
    },
    error::ApiError,
    state::AppState,
    users::repo::User,
    validation::{validated, Rule},
};

const LOGIN_RULES: &[Rule] = &[
    Rule::required("email", "Email is required"),
    Rule::email("email", "Please enter a valid email"),
    Rule::required("password", "Password is required"),
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth", get(current_user))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut payload: LoginRequest = validated(body, LOGIN_RULES)?;
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and bad password get the same message so the response
    // does not reveal which accounts exist.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::BadRequest("Invalid Credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::BadRequest("Invalid Credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user.into()))
}
