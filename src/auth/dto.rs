use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of a user, everything except the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

impl From<crate::users::repo::User> for PublicUser {
    fn from(u: crate::users::repo::User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar_url: u.avatar_url,
        }
    }
}
