//! Initialize a new site

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: IEEE GU Chapter
description: IEEE Galgotias University Student Chapter
language: en
timezone: Asia/Kolkata
default_author: IEEE GU

# URL
url: http://localhost:3000
root: /

# Directory
content_dir: content
static_dir: static
public_dir: public

# Content source: local JSON documents, or a Sanity dataset
# (the read token comes from SANITY_TOKEN)
content:
  source: local
  sanity:
    project_id: ''
    dataset: production
    api_version: '2023-05-03'
    use_cdn: true

# Rendering
revalidate: 60
related_posts: 3
blog_per_page: 12
date_format: MMMM DD, YYYY
highlight:
  enable: false
  theme: base16-ocean.dark

# Chrome
theme:
  default: system
  enable_system: true
carousel:
  images: []
  autoplay: true
  direction: up
  overlay: true
  preload_timeout: 10
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Site already initialized: {:?}", config_path);
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;
    fs::create_dir_all(target_dir.join("static/js"))?;
    fs::create_dir_all(target_dir.join("static/images"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let categories = json!([
        {
            "_id": "category-events",
            "title": "Events",
            "slug": {"current": "events"},
            "description": "Workshops, talks and hackathons"
        }
    ]);
    fs::write(
        target_dir.join("content/categories.json"),
        serde_json::to_string_pretty(&categories)?,
    )?;

    // Create a sample post
    let now = chrono::Utc::now();
    let sample_post = json!({
        "_id": "post-hello-world",
        "title": "Hello World",
        "slug": {"current": "hello-world"},
        "excerpt": "The first post on the chapter blog.",
        "publishedAt": now.to_rfc3339(),
        "authors": [{"name": "IEEE GU", "bio": "IEEE Galgotias University Student Chapter."}],
        "categories": [{"_ref": "category-events"}],
        "content": [
            {
                "_type": "block",
                "style": "h2",
                "children": [{"_type": "span", "text": "Welcome"}]
            },
            {
                "_type": "block",
                "style": "normal",
                "markDefs": [{"_key": "docs", "_type": "link", "href": "/blog"}],
                "children": [
                    {"_type": "span", "text": "Edit this file in content/posts or browse the "},
                    {"_type": "span", "text": "blog", "marks": ["docs"]},
                    {"_type": "span", "text": "."}
                ]
            },
            {
                "_type": "callout",
                "type": "info",
                "content": [
                    {"_type": "block", "children": [{"_type": "span", "text": "Run `chapter-site new \"My Post\"` to add a post."}]}
                ]
            }
        ]
    });
    fs::write(
        target_dir.join("content/posts/hello-world.json"),
        serde_json::to_string_pretty(&sample_post)?,
    )?;

    fs::write(target_dir.join("static/css/site.css"), "")?;
    fs::write(target_dir.join("static/js/site.js"), "")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentStore, LocalStore};
    use crate::Site;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "IEEE GU Chapter");
        assert_eq!(site.config.timezone(), chrono_tz::Asia::Kolkata);

        let store = LocalStore::new(&site.content_dir);
        let post = store.fetch_post("hello-world").await.unwrap().unwrap();
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.content.len(), 3);
        assert_eq!(store.fetch_categories().await.unwrap().len(), 1);

        assert!(init_site(dir.path()).is_err());
    }
}
