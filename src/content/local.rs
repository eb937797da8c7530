//! Local content store - loads posts and categories from the content directory
//!
//! Layout:
//! ```text
//! content/
//!   categories.json      [{"_id": "...", "title": "...", "slug": {"current": "..."}}]
//!   posts/*.json         one post document per file
//! ```

use async_trait::async_trait;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::block::to_plain_text;
use super::store::{ContentStore, StoreError, StoreResult};
use super::{CategorySummary, Post, PostSummary};

/// Words per minute used when a post carries no reading time
const WORDS_PER_MINUTE: usize = 200;

/// Reads JSON documents from disk on every request
#[derive(Debug, Clone)]
pub struct LocalStore {
    posts_dir: PathBuf,
    categories_path: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at a content directory
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        let content_dir = content_dir.as_ref();
        Self {
            posts_dir: content_dir.join("posts"),
            categories_path: content_dir.join("categories.json"),
        }
    }

    /// Load every post, newest first; undated posts sort last
    pub fn load_posts(&self) -> StoreResult<Vec<Post>> {
        if !self.posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_json_file(path) {
                match self.load_post(path) {
                    Ok(post) => posts.push(post),
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(posts)
    }

    /// Load a single post document
    fn load_post(&self, path: &Path) -> StoreResult<Post> {
        let content = fs::read_to_string(path)?;
        let mut post: Post = serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            what: path.display().to_string(),
            source,
        })?;

        if post.slug.current.is_empty() {
            post.slug.current = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("untitled")
                .to_string();
        }

        if post.estimated_reading_time.is_none() {
            post.estimated_reading_time = Some(reading_time(&post));
        }

        Ok(post)
    }

    /// Load the category list; a missing file means no categories
    pub fn load_categories(&self) -> StoreResult<Vec<CategorySummary>> {
        if !self.categories_path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.categories_path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            what: self.categories_path.display().to_string(),
            source,
        })
    }

    async fn blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(LocalStore) -> StoreResult<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store)).await?
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch_post(&self, slug: &str) -> StoreResult<Option<Post>> {
        let slug = slug.to_string();
        self.blocking(move |store| {
            Ok(store
                .load_posts()?
                .into_iter()
                .find(|p| p.slug() == slug))
        })
        .await
    }

    async fn fetch_related(&self, slug: &str, limit: usize) -> StoreResult<Vec<PostSummary>> {
        let slug = slug.to_string();
        self.blocking(move |store| Ok(related_posts(&store.load_posts()?, &slug, limit)))
            .await
    }

    async fn fetch_categories(&self) -> StoreResult<Vec<CategorySummary>> {
        self.blocking(|store| store.load_categories()).await
    }

    async fn fetch_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>> {
        self.blocking(move |store| {
            Ok(store
                .load_posts()?
                .iter()
                .take(limit)
                .map(PostSummary::from)
                .collect())
        })
        .await
    }
}

/// Posts sharing a category with `slug`, or the latest posts when it has none
fn related_posts(posts: &[Post], slug: &str, limit: usize) -> Vec<PostSummary> {
    let categories: HashSet<&str> = posts
        .iter()
        .find(|p| p.slug() == slug)
        .map(|p| p.categories.iter().map(|c| c.id.as_str()).collect())
        .unwrap_or_default();

    posts
        .iter()
        .filter(|p| p.slug() != slug)
        .filter(|p| categories.is_empty() || categories.iter().any(|c| p.in_category(c)))
        .take(limit)
        .map(PostSummary::from)
        .collect()
}

fn reading_time(post: &Post) -> u32 {
    let words = to_plain_text(&post.content).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Check if a file is a JSON document
fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "json")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Reference;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn write_post(dir: &Path, slug: &str, day: u32, categories: &[&str]) {
        let refs: Vec<_> = categories.iter().map(|c| json!({"_ref": c})).collect();
        let doc = json!({
            "_id": format!("post-{}", slug),
            "title": format!("Post {}", slug),
            "slug": {"current": slug},
            "publishedAt": format!("2024-01-{:02}T09:00:00Z", day),
            "categories": refs,
            "content": [{"_type": "block", "children": [{"_type": "span", "text": "a few words here"}]}]
        });
        fs::write(dir.join(format!("{}.json", slug)), doc.to_string()).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        write_post(&posts, "robotics-101", 10, &["cat-robotics"]);
        write_post(&posts, "line-follower", 12, &["cat-robotics"]);
        write_post(&posts, "drone-build", 14, &["cat-robotics", "cat-events"]);
        write_post(&posts, "hackathon", 16, &["cat-events"]);
        write_post(&posts, "ai-reading-group", 18, &["cat-ai"]);
        fs::write(
            dir.path().join("categories.json"),
            json!([{"_id": "cat-ai", "title": "AI"}, {"_id": "cat-events", "title": "Events"}])
                .to_string(),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_load_posts_sorted_newest_first() {
        let dir = fixture();
        let store = LocalStore::new(dir.path());
        let posts = store.load_posts().unwrap();
        assert_eq!(posts.len(), 5);
        assert_eq!(posts[0].slug(), "ai-reading-group");
        assert_eq!(
            posts[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 18, 9, 0, 0).unwrap())
        );
        assert_eq!(posts[4].slug(), "robotics-101");
        assert_eq!(posts[0].estimated_reading_time, Some(1));
    }

    #[test]
    fn test_invalid_document_is_skipped() {
        let dir = fixture();
        fs::write(dir.path().join("posts/broken.json"), "{ not json").unwrap();
        let posts = LocalStore::new(dir.path()).load_posts().unwrap();
        assert_eq!(posts.len(), 5);
    }

    #[test]
    fn test_related_shares_category_and_excludes_self() {
        let dir = fixture();
        let posts = LocalStore::new(dir.path()).load_posts().unwrap();
        let related = related_posts(&posts, "robotics-101", 3);
        let slugs: Vec<_> = related.iter().map(|p| p.slug.current.as_str()).collect();
        assert_eq!(slugs, vec!["drone-build", "line-follower"]);
    }

    #[test]
    fn test_related_respects_limit() {
        let mut posts = Vec::new();
        for i in 0..6 {
            let mut post = Post::new(&format!("p{}", i), "T", &format!("p{}", i));
            post.categories.push(Reference {
                id: "shared".to_string(),
            });
            posts.push(post);
        }
        assert_eq!(related_posts(&posts, "p0", 3).len(), 3);
    }

    #[test]
    fn test_related_without_categories_uses_latest() {
        let mut posts = vec![Post::new("a", "A", "a"), Post::new("b", "B", "b")];
        posts[1].categories.push(Reference {
            id: "x".to_string(),
        });
        let related = related_posts(&posts, "a", 3);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].slug.current, "b");
    }

    #[tokio::test]
    async fn test_store_operations() {
        let dir = fixture();
        let store = LocalStore::new(dir.path());

        let post = store.fetch_post("hackathon").await.unwrap();
        assert_eq!(post.map(|p| p.title), Some("Post hackathon".to_string()));
        assert!(store.fetch_post("unknown-post").await.unwrap().is_none());

        let categories = store.fetch_categories().await.unwrap();
        assert_eq!(categories.len(), 2);

        let recent = store.fetch_posts(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].slug.current, "ai-reading-group");
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("nowhere"));
        assert!(store.fetch_posts(10).await.unwrap().is_empty());
        assert!(store.fetch_categories().await.unwrap().is_empty());
    }
}
