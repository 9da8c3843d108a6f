// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PostStore, duplicate_title};
use crate::{
    error::AppError,
    models::post::{Post, PostFilter, PostInput, PostStatus},
};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    posts: BTreeMap<i64, Post>,
}

/// Process-local store, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    inner: RwLock<Inner>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_taken(inner: &Inner, title: &str, except: Option<i64>) -> bool {
    inner
        .posts
        .values()
        .any(|post| post.title == title && Some(post.id) != except)
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create(&self, input: &PostInput) -> Result<i64, AppError> {
        let mut inner = self.inner.write().await;
        if title_taken(&inner, &input.title, None) {
            return Err(duplicate_title(&input.title));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        inner.posts.insert(
            id,
            Post {
                id,
                title: input.title.clone(),
                content: input.content.clone(),
                image_url: input.image_url.clone(),
                author: input.author.clone(),
                category: input.category.clone(),
                status: input.status,
                published_at: (input.status == PostStatus::Published).then_some(now),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn update(&self, id: i64, input: &PostInput) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&id) {
            return Ok(false);
        }
        if title_taken(&inner, &input.title, Some(id)) {
            return Err(duplicate_title(&input.title));
        }

        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(false);
        };
        let now = Utc::now();
        post.title = input.title.clone();
        post.content = input.content.clone();
        post.image_url = input.image_url.clone();
        post.author = input.author.clone();
        post.category = input.category.clone();
        post.status = input.status;
        post.published_at = (input.status == PostStatus::Published).then_some(now);
        post.updated_at = now;
        Ok(true)
    }

    async fn set_status(&self, id: i64, status: PostStatus) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(false);
        };
        let now = Utc::now();
        post.status = status;
        post.published_at = (status == PostStatus::Published).then_some(now);
        post.updated_at = now;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.posts.remove(&id).is_some())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        // Ids break ties between posts created within the same instant.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::DEFAULT_CATEGORY;

    fn input(title: &str) -> PostInput {
        PostInput {
            title: title.to_string(),
            content: format!("<p>{}</p>", title),
            image_url: None,
            author: "ada".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            status: PostStatus::Draft,
        }
    }

    #[tokio::test]
    async fn crud_round() {
        let store = MemoryPostStore::new();
        let id = store.create(&input("first")).await.unwrap();

        let post = store.get(id).await.unwrap().unwrap();
        assert_eq!(post.title, "first");
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.published_at.is_none());

        let mut changed = input("renamed");
        changed.status = PostStatus::Published;
        assert!(store.update(id, &changed).await.unwrap());
        let post = store.get(id).await.unwrap().unwrap();
        assert_eq!(post.title, "renamed");
        assert!(post.published_at.is_some());

        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_ids() {
        let store = MemoryPostStore::new();
        assert!(store.get(7).await.unwrap().is_none());
        assert!(!store.update(7, &input("x")).await.unwrap());
        assert!(!store.set_status(7, PostStatus::Published).await.unwrap());
    }

    #[tokio::test]
    async fn titles_are_unique() {
        let store = MemoryPostStore::new();
        let first = store.create(&input("same")).await.unwrap();
        let second = store.create(&input("other")).await.unwrap();

        assert!(matches!(
            store.create(&input("same")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            store.update(second, &input("same")).await,
            Err(AppError::Conflict(_))
        ));
        // Keeping its own title is fine.
        assert!(store.update(first, &input("same")).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_newest_first() {
        let store = MemoryPostStore::new();
        let a = store.create(&input("alpha")).await.unwrap();
        let b = store.create(&input("beta")).await.unwrap();
        store.set_status(b, PostStatus::Published).await.unwrap();

        let all = store.list(&PostFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b, a]);

        let published = store
            .list(&PostFilter {
                status: Some(PostStatus::Published),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, b);

        let searched = store
            .list(&PostFilter {
                q: Some("ALPHA".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].id, a);
    }

    #[tokio::test]
    async fn search_wildcards_are_literal() {
        let store = MemoryPostStore::new();
        store.create(&input("plain")).await.unwrap();
        let snake = store.create(&input("snake_case")).await.unwrap();

        let found = store
            .list(&PostFilter {
                q: Some("_".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![snake]);

        let found = store
            .list(&PostFilter {
                q: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
