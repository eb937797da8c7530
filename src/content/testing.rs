//! In-memory store and fixtures for unit tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::store::{ContentStore, StoreError, StoreResult};
use super::{Author, CategorySummary, ContentBlock, ImageRef, Post, PostSummary, Slug};

/// Serves a fixed set of posts; `failing` makes every call error out
#[derive(Default)]
pub struct MemoryStore {
    pub posts: Vec<Post>,
    pub related: Vec<PostSummary>,
    pub categories: Vec<CategorySummary>,
    pub failing: bool,
}

impl MemoryStore {
    pub fn with_post(post: Post) -> Self {
        Self {
            posts: vec![post],
            ..Default::default()
        }
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing {
            Err(StoreError::Status {
                status: 503,
                message: "unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_post(&self, slug: &str) -> StoreResult<Option<Post>> {
        self.check()?;
        Ok(self.posts.iter().find(|p| p.slug() == slug).cloned())
    }

    async fn fetch_related(&self, slug: &str, limit: usize) -> StoreResult<Vec<PostSummary>> {
        self.check()?;
        Ok(self
            .related
            .iter()
            .filter(|p| p.slug.current != slug)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_categories(&self) -> StoreResult<Vec<CategorySummary>> {
        self.check()?;
        Ok(self.categories.clone())
    }

    async fn fetch_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>> {
        self.check()?;
        Ok(self.posts.iter().take(limit).map(PostSummary::from).collect())
    }
}

/// A fully populated post
pub fn sample_post() -> Post {
    let mut post = Post::new("post-1", "Building a Line Follower", "line-follower");
    post.excerpt = Some("Notes from our robotics workshop.".to_string());
    post.main_image = Some(ImageRef::from_ref("image-abc123-2000x1125-jpg"));
    post.published_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap());
    post.estimated_reading_time = Some(6);
    post.authors = vec![
        Author {
            name: "Asha Verma".to_string(),
            bio: vec![ContentBlock::paragraph("Robotics lead.")],
            ..Default::default()
        },
        Author {
            name: "Rohan Mehta".to_string(),
            ..Default::default()
        },
    ];
    post.content = vec![ContentBlock::paragraph("Sensors first.")];
    post
}

pub fn summary(slug: &str, title: &str) -> PostSummary {
    PostSummary {
        id: format!("post-{}", slug),
        title: title.to_string(),
        slug: Slug::new(slug),
        excerpt: None,
        main_image: None,
        published_at: None,
        estimated_reading_time: None,
    }
}
