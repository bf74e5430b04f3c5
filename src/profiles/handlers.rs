use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    pagination::Pagination,
    posts::repo::Post,
    profiles::dto::{EducationRequest, ExperienceRequest, UpsertProfileRequest},
    profiles::repo::{Education, Experience, Profile},
    state::AppState,
    users::repo::User,
    validation::{validated, Rule},
};

const PROFILE_RULES: &[Rule] = &[
    Rule::required("status", "Status is required"),
    Rule::required("skills", "Skills is required"),
];

const EXPERIENCE_RULES: &[Rule] = &[
    Rule::required("title", "Title is required"),
    Rule::required("company", "Company is required"),
];

const EDUCATION_RULES: &[Rule] = &[
    Rule::required("school", "School is required"),
    Rule::required("degree", "Degree is required"),
    Rule::required("field_of_study", "Field of study is required"),
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/me", get(my_profile))
        .route("/profile", post(upsert_profile))
        .route("/profile", get(list_profiles))
        .route("/profile", delete(delete_account))
        .route("/profile/user/:user_id", get(profile_by_user))
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:id", delete(delete_experience))
        .route("/profile/education", put(add_education))
        .route("/profile/education/:id", delete(delete_education))
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, body))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<Profile>, ApiError> {
    let payload: UpsertProfileRequest = validated(body, PROFILE_RULES)?;
    let profile = Profile::upsert(&state.db, user_id, payload.into_fields()).await?;
    info!(user_id = %user_id, "profile upserted");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let p = p.clamp();
    let profiles = Profile::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(profiles))
}

#[instrument(skip(state))]
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    // A malformed id is indistinguishable from an unknown one to the caller.
    let user_id = Uuid::parse_str(&user_id).map_err(|_| ApiError::NotFound("Profile"))?;
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(profile))
}

/// Removes the user's posts, profile, and finally the account itself. The
/// three deletes are not transactional; a failure partway leaves the earlier
/// ones applied.
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    Post::delete_by_author(&state.db, user_id).await?;
    Profile::delete(&state.db, user_id).await?;
    User::delete(&state.db, user_id).await?;
    info!(user_id = %user_id, "account deleted");
    Ok(Json(json!({ "msg": "User deleted" })))
}

#[instrument(skip(state, body))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<Profile>, ApiError> {
    let payload: ExperienceRequest = validated(body, EXPERIENCE_RULES)?;
    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;

    let entry = Experience {
        id: Uuid::new_v4(),
        title: payload.title,
        company: payload.company,
        location: payload.location,
        from: payload.from,
        to: payload.to,
        current: payload.current,
        description: payload.description,
    };
    profile.experiences.0.insert(0, entry);
    Profile::update_experiences(&state.db, user_id, &profile.experiences.0).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn delete_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("Experience"))?;
    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;

    let before = profile.experiences.0.len();
    profile.experiences.0.retain(|e| e.id != id);
    if profile.experiences.0.len() == before {
        return Err(ApiError::NotFound("Experience"));
    }
    Profile::update_experiences(&state.db, user_id, &profile.experiences.0).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, body))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<Profile>, ApiError> {
    let payload: EducationRequest = validated(body, EDUCATION_RULES)?;
    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;

    let entry = Education {
        id: Uuid::new_v4(),
        school: payload.school,
        degree: payload.degree,
        field_of_study: payload.field_of_study,
        from: payload.from,
        to: payload.to,
        current: payload.current,
        description: payload.description,
    };
    profile.education.0.insert(0, entry);
    Profile::update_education(&state.db, user_id, &profile.education.0).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn delete_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("Education"))?;
    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;

    let before = profile.education.0.len();
    profile.education.0.retain(|e| e.id != id);
    if profile.education.0.len() == before {
        return Err(ApiError::NotFound("Education"));
    }
    Profile::update_education(&state.db, user_id, &profile.education.0).await?;
    Ok(Json(profile))
}
