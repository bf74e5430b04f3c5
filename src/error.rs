use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Every error a handler can surface, mapped to the wire contract:
/// a status code plus a `{ "errors": [{ "msg": ... }] }` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400, carries the complete list of failing field messages.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// 400 with a single message (bad credentials, duplicate email, not-liked).
    #[error("{0}")]
    BadRequest(String),

    /// 401, no token was supplied on a protected route.
    #[error("No token, authorization denied")]
    AuthRequired,

    /// 401, a token was supplied but failed verification.
    #[error("Token is not valid")]
    AuthDenied,

    /// 401, the acting user is not the resource owner.
    #[error("User not authorized")]
    OwnershipDenied,

    /// 404, names the missing resource ("Post", "Profile", ...).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// 500, details are logged and never leak to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired | ApiError::AuthDenied | ApiError::OwnershipDenied => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(msgs) => msgs.clone(),
            ApiError::Internal(_) => vec!["Server error".to_string()],
            other => vec![other.to_string()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "unhandled internal error");
        }
        let errors: Vec<_> = self
            .messages()
            .into_iter()
            .map(|msg| json!({ "msg": msg }))
            .collect();
        (self.status(), Json(json!({ "errors": errors }))).into_response()
    }
}
