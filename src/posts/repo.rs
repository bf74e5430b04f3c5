use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Post document. Likes and comments live in jsonb columns, read-modify-
/// written without a transaction; concurrent edits are last-write-wins.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub avatar_url: Option<String>,
    pub text: String,
    pub likes: Json<Vec<Uuid>>,
    pub comments: Json<Vec<Comment>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const POST_COLUMNS: &str =
    "id, user_id, author_name, avatar_url, text, likes, comments, created_at";

/// Set-insert: true if the user was added, false if already present.
pub fn add_like(likes: &mut Vec<Uuid>, user_id: Uuid) -> bool {
    if likes.contains(&user_id) {
        return false;
    }
    likes.push(user_id);
    true
}

/// Set-remove: true if the user's like was removed, false if it never existed.
pub fn remove_like(likes: &mut Vec<Uuid>, user_id: Uuid) -> bool {
    let before = likes.len();
    likes.retain(|id| *id != user_id);
    likes.len() < before
}

/// Comments are kept newest-first; new entries go to the front.
pub fn prepend_comment(comments: &mut Vec<Comment>, comment: Comment) {
    comments.insert(0, comment);
}

impl Post {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        author_name: &str,
        avatar_url: Option<&str>,
        text: &str,
    ) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (user_id, author_name, avatar_url, text)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(author_name)
        .bind(avatar_url)
        .bind(text)
        .fetch_one(db)
        .await?;
        Ok(post)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
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

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(post)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete_by_author(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM posts WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_likes(db: &PgPool, id: Uuid, likes: &[Uuid]) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET likes = $1 WHERE id = $2")
            .bind(Json(likes))
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_comments(db: &PgPool, id: Uuid, comments: &[Comment]) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET comments = $1 WHERE id = $2")
            .bind(Json(comments))
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_like_is_idempotent() {
        let user = Uuid::new_v4();
        let mut likes = Vec::new();
        assert!(add_like(&mut likes, user));
        assert_eq!(likes.len(), 1);
        // Second like by the same user changes nothing.
        assert!(!add_like(&mut likes, user));
        assert_eq!(likes.len(), 1);
    }

    #[test]
    fn remove_like_reports_never_liked() {
        let liker = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mut likes = vec![liker];
        assert!(!remove_like(&mut likes, stranger));
        assert_eq!(likes.len(), 1);
        assert!(remove_like(&mut likes, liker));
        assert!(likes.is_empty());
    }

    fn make_comment(text: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            author_name: "Ada".into(),
            avatar_url: None,
            text: text.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn comments_come_back_newest_first() {
        let mut comments = Vec::new();
        prepend_comment(&mut comments, make_comment("first"));
        prepend_comment(&mut comments, make_comment("second"));
        prepend_comment(&mut comments, make_comment("third"));
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[test]
    fn likes_keep_distinct_users() {
        let mut likes = Vec::new();
        let users: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for u in &users {
            assert!(add_like(&mut likes, *u));
        }
        assert_eq!(likes.len(), 3);
    }
}
