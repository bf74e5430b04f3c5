use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response returned after registration: the freshly issued token.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
}
