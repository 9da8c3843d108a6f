// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{PostStore, duplicate_title};
use crate::{
    error::AppError,
    models::post::{Post, PostFilter, PostInput, PostStatus},
};

const POST_COLUMNS: &str = r#"
    id, title, content, image_url, author, category, status,
    published_at, created_at, updated_at
"#;

/// Row shape of the 'posts' table. `status` is stored as text.
#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    image_url: Option<String>,
    author: String,
    category: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<PostStatus>()
            .map_err(AppError::InternalServerError)?;

        Ok(Post {
            id: row.id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            author: row.author,
            category: row.category,
            status,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ILIKE` pattern matching `query` literally anywhere in a column, the way
/// the in-memory store's substring search does.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Maps a unique violation on the title index to a conflict.
fn write_error(err: sqlx::Error, title: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return duplicate_title(title);
        }
    }
    tracing::error!("Failed to write post: {:?}", err);
    AppError::from(err)
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, input: &PostInput) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, image_url, author, category, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 = 'published' THEN NOW() ELSE NULL END)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(&input.author)
        .bind(&input.category)
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &input.title))?;

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn update(&self, id: i64, input: &PostInput) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, image_url = $3, author = $4, category = $5,
                status = $6,
                published_at = CASE WHEN $6 = 'published' THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(&input.author)
        .bind(&input.category)
        .bind(input.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &input.title))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, id: i64, status: PostStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET status = $1,
                published_at = CASE WHEN $1 = 'published' THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let search_pattern = filter.query().map(contains_pattern);

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {}
            FROM posts
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::TEXT IS NULL
                   OR title ILIKE $3 ESCAPE '\'
                   OR content ILIKE $3 ESCAPE '\'
                   OR author ILIKE $3 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            "#,
            POST_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(&filter.category)
        .bind(search_pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::from(e)
        })?;

        rows.into_iter().map(Post::try_from).collect()
    }
}
