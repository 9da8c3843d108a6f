// src/store/mod.rs

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::post::{Post, PostFilter, PostInput, PostStatus},
};

pub use memory::MemoryPostStore;
pub use postgres::PgPostStore;

pub type DynPostStore = Arc<dyn PostStore>;

/// Persistence for posts, keyed by id.
///
/// Mutations return `false` when no post has the given id.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Inserts a post and returns its id. Titles are unique.
    async fn create(&self, input: &PostInput) -> Result<i64, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Replaces every editable field of the post.
    async fn update(&self, id: i64, input: &PostInput) -> Result<bool, AppError>;

    async fn set_status(&self, id: i64, status: PostStatus) -> Result<bool, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Posts matching `filter`, newest first.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError>;
}

fn duplicate_title(title: &str) -> AppError {
    AppError::Conflict(format!("A post titled '{}' already exists", title))
}
