use serde::Deserialize;

/// Request body for creating a post.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: String,
}

/// Request body for commenting on a post.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}
