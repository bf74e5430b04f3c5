use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity assertion embedded in a signed token. The server never stores
/// this; it only issues and verifies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user ID
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
