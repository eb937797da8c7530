//! Post, author and category models
//!
//! Field names follow the CMS documents (`_id`, `mainImage`, `publishedAt`)
//! so the same JSON works for the local store and for API query results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::{lenient_blocks, null_as_empty, string_or_none, text_or_blocks, ContentBlock};

/// URL slug wrapper (`{"current": "my-post"}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(current: &str) -> Self {
        Self {
            current: current.to_string(),
        }
    }
}

/// Reference to another document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref", alias = "_id")]
    pub id: String,
}

/// An image asset plus its presentation fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub alt: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub caption: Option<String>,
}

impl ImageRef {
    /// Image pointing at a CMS asset id (`image-<id>-<W>x<H>-<ext>`)
    pub fn from_ref(reference: &str) -> Self {
        Self {
            asset: Some(ImageAsset {
                reference: Some(reference.to_string()),
                url: None,
            }),
            ..Default::default()
        }
    }

    /// Image pointing at an absolute URL
    pub fn from_url(url: &str) -> Self {
        Self {
            asset: Some(ImageAsset {
                reference: None,
                url: Some(url.to_string()),
            }),
            ..Default::default()
        }
    }
}

/// Asset pointer: a reference when unexpanded, or an id + url when dereferenced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(rename = "_ref", alias = "_id", default)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A post author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default, deserialize_with = "text_or_blocks")]
    pub bio: Vec<ContentBlock>,
}

/// A blog post with its full body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_reading_time: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<Author>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<Reference>,
    #[serde(default, alias = "body", deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
}

impl Post {
    /// Create a post with minimal required fields
    pub fn new(id: &str, title: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            slug: Slug::new(slug),
            excerpt: None,
            main_image: None,
            published_at: None,
            estimated_reading_time: None,
            authors: Vec::new(),
            categories: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug.current
    }

    /// Only the first author gets a byline and author card
    pub fn first_author(&self) -> Option<&Author> {
        self.authors.first()
    }

    /// Excerpt, treating an empty string as missing
    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref().filter(|e| !e.is_empty())
    }

    pub fn in_category(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }
}

/// Listing projection of a post, used for related posts and blog cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_reading_time: Option<u32>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            main_image: post.main_image.clone(),
            published_at: post.published_at,
            estimated_reading_time: post.estimated_reading_time,
        }
    }
}

/// A blog category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_result() {
        let post: Post = serde_json::from_value(json!({
            "_id": "post-1",
            "title": "Hello",
            "slug": {"current": "hello"},
            "excerpt": null,
            "mainImage": {"asset": {"_ref": "image-abc-1200x800-jpg"}, "alt": "Stage"},
            "publishedAt": "2024-03-05T10:00:00Z",
            "estimatedReadingTime": 4,
            "authors": [{"name": "Asha", "bio": "Chapter chair"}],
            "categories": [{"_type": "reference", "_ref": "cat-events", "_key": "k"}],
            "content": []
        }))
        .unwrap();

        assert_eq!(post.slug(), "hello");
        assert_eq!(post.excerpt(), None);
        assert_eq!(post.first_author().map(|a| a.name.as_str()), Some("Asha"));
        assert_eq!(post.first_author().unwrap().bio.len(), 1);
        assert!(post.in_category("cat-events"));
        assert_eq!(post.estimated_reading_time, Some(4));
    }

    #[test]
    fn test_null_arrays_are_empty() {
        let post: Post = serde_json::from_value(json!({
            "_id": "post-2",
            "title": "Bare",
            "slug": {"current": "bare"},
            "authors": null,
            "categories": null,
            "content": null
        }))
        .unwrap();
        assert!(post.authors.is_empty());
        assert!(post.categories.is_empty());
        assert!(post.content.is_empty());
        assert!(post.main_image.is_none());
    }

    #[test]
    fn test_empty_excerpt_is_missing() {
        let mut post = Post::new("p", "T", "t");
        post.excerpt = Some(String::new());
        assert_eq!(post.excerpt(), None);
    }
}
