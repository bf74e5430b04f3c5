use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A dated position entry on a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Profile document, one per user. Nested entries live in jsonb columns and
/// are rewritten whole on mutation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub status: String,
    pub skills: Json<Vec<String>>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub experiences: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub social: Option<Json<SocialLinks>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const PROFILE_COLUMNS: &str =
    "user_id, status, skills, company, website, location, bio, experiences, education, social, created_at";

pub struct ProfileFields {
    pub status: String,
    pub skills: Vec<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub social: Option<SocialLinks>,
}

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Create-if-absent-else-update keyed on user_id. Experience and education
    /// entries are managed by their own endpoints and survive the upsert.
    pub async fn upsert(db: &PgPool, user_id: Uuid, f: ProfileFields) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, status, skills, company, website, location, bio, social)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                status = EXCLUDED.status,
                skills = EXCLUDED.skills,
                company = EXCLUDED.company,
                website = EXCLUDED.website,
                location = EXCLUDED.location,
                bio = EXCLUDED.bio,
                social = EXCLUDED.social
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&f.status)
        .bind(Json(&f.skills))
        .bind(&f.company)
        .bind(&f.website)
        .bind(&f.location)
        .bind(&f.bio)
        .bind(f.social.map(Json))
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    pub async fn update_experiences(
        db: &PgPool,
        user_id: Uuid,
        experiences: &[Experience],
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE profiles SET experiences = $1 WHERE user_id = $2")
            .bind(Json(experiences))
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_education(
        db: &PgPool,
        user_id: Uuid,
        education: &[Education],
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE profiles SET education = $1 WHERE user_id = $2")
            .bind(Json(education))
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
