use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::sanitizer::{Sanitizer, url_policy::is_safe_url};

pub const DEFAULT_CATEGORY: &str = "General";

/// Publication state of a post. Drafts are never rendered to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status '{}'", other)),
        }
    }
}

/// A stored post. `content` is the raw editor HTML and must be sanitized
/// before it reaches a reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author: String,
    pub category: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post as served to readers: same fields, sanitized content.
#[derive(Debug, Serialize)]
pub struct RenderedPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author: String,
    pub category: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn render(self, sanitizer: &Sanitizer) -> RenderedPost {
        RenderedPost {
            content: sanitizer.sanitize(&self.content),
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            author: self.author,
            category: self.category,
            status: self.status,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DTO for creating or replacing a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title length must be between 1 and 255 chars"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 200000,
        message = "Content length must be between 1 and 200000 chars"
    ))]
    pub content: String,

    /// Cover image, rendered as an `<img src>`.
    #[serde(default)]
    #[validate(length(max = 500), custom(function = validate_image_url))]
    pub image_url: Option<String>,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Author length must be between 1 and 255 chars"
    ))]
    pub author: String,

    #[serde(default = "default_category")]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Category length must be between 1 and 100 chars"
    ))]
    pub category: String,

    #[serde(default)]
    pub status: PostStatus,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Cover images obey the same URL rules as images inside post content.
fn validate_image_url(url: &str) -> Result<(), validator::ValidationError> {
    if !is_safe_url(url.trim(), "img") {
        return Err(validator::ValidationError::new("invalid_image_url"));
    }
    Ok(())
}

/// Body of a status change request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: PostStatus,
}

/// Query parameters for listing posts. Every filter is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    /// Case-insensitive match against title, content and author.
    pub q: Option<String>,
}

impl PostFilter {
    /// The search term, ignoring blank input.
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.status.is_some_and(|status| status != post.status) {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| category != post.category)
        {
            return false;
        }
        match self.query() {
            Some(q) => {
                let q = q.to_lowercase();
                [&post.title, &post.content, &post.author]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            }
            None => true,
        }
    }
}
