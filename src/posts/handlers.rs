use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    pagination::Pagination,
    posts::dto::{CreateCommentRequest, CreatePostRequest},
    posts::repo::{add_like, prepend_comment, remove_like, Comment, Post},
    state::AppState,
    users::repo::User,
    validation::{validated, Rule},
};

const POST_RULES: &[Rule] = &[Rule::required("text", "Text is required")];
const COMMENT_RULES: &[Rule] = &[Rule::required("text", "Text is required")];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
        .route("/posts/:id", delete(delete_post))
        .route("/posts/like/:id", put(like_post))
        .route("/posts/unlike/:id", put(unlike_post))
        .route("/posts/comment/:id", post(add_comment))
        .route("/posts/comment/:id/:comment_id", delete(delete_comment))
}

fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Post"))
}

async fn load_post(state: &AppState, id: Uuid) -> Result<Post, ApiError> {
    Post::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post"))
}

#[instrument(skip(state, body))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<Post>, ApiError> {
    let payload: CreatePostRequest = validated(body, POST_RULES)?;

    // Author name and avatar are denormalized onto the post document.
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let post = Post::create(
        &state.db,
        user_id,
        &user.name,
        user.avatar_url.as_deref(),
        &payload.text,
    )
    .await?;
    info!(post_id = %post.id, user_id = %user_id, "post created");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let p = p.clamp();
    let posts = Post::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_post_id(&id)?;
    let post = load_post(&state, id).await?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_post_id(&id)?;
    let post = load_post(&state, id).await?;

    if post.user_id != user_id {
        warn!(post_id = %id, user_id = %user_id, "delete of post by non-author");
        return Err(ApiError::OwnershipDenied);
    }

    Post::delete(&state.db, id).await?;
    info!(post_id = %id, "post removed");
    Ok(Json(json!({ "msg": "Post removed" })))
}

/// Set-insert of the acting user. Liking twice is a no-op: the unchanged
/// likes array comes back with a 200.
#[instrument(skip(state))]
pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let id = parse_post_id(&id)?;
    let mut post = load_post(&state, id).await?;

    if add_like(&mut post.likes.0, user_id) {
        Post::update_likes(&state.db, id, &post.likes.0).await?;
    }
    Ok(Json(post.likes.0))
}

#[instrument(skip(state))]
pub async fn unlike_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let id = parse_post_id(&id)?;
    let mut post = load_post(&state, id).await?;

    if !remove_like(&mut post.likes.0, user_id) {
        return Err(ApiError::BadRequest("Post has not yet been liked".into()));
    }
    Post::update_likes(&state.db, id, &post.likes.0).await?;
    Ok(Json(post.likes.0))
}

#[instrument(skip(state, body))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let payload: CreateCommentRequest = validated(body, COMMENT_RULES)?;
    let id = parse_post_id(&id)?;
    let mut post = load_post(&state, id).await?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let comment = Comment {
        id: Uuid::new_v4(),
        user_id,
        author_name: user.name,
        avatar_url: user.avatar_url,
        text: payload.text,
        created_at: OffsetDateTime::now_utc(),
    };
    prepend_comment(&mut post.comments.0, comment);
    Post::update_comments(&state.db, id, &post.comments.0).await?;
    Ok(Json(post.comments.0))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let id = parse_post_id(&id)?;
    let comment_id =
        Uuid::parse_str(&comment_id).map_err(|_| ApiError::NotFound("Comment"))?;
    let mut post = load_post(&state, id).await?;

    let comment = post
        .comments
        .0
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or(ApiError::NotFound("Comment"))?;
    if comment.user_id != user_id {
        warn!(post_id = %id, comment_id = %comment_id, user_id = %user_id,
            "delete of comment by non-author");
        return Err(ApiError::OwnershipDenied);
    }

    post.comments.0.retain(|c| c.id != comment_id);
    Post::update_comments(&state.db, id, &post.comments.0).await?;
    Ok(Json(post.comments.0))
}
