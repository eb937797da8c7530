//! Create a new post

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Create a post document under `content/posts/<slug>.json`
pub fn create_post(site: &Site, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}", title);
    }

    let target_dir = site.content_dir.join("posts");
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.json", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Utc::now();
    let post = json!({
        "_id": format!("post-{}", slug),
        "title": title,
        "slug": {"current": slug},
        "excerpt": "",
        "publishedAt": now.to_rfc3339(),
        "authors": [{"name": site.config.default_author}],
        "categories": [],
        "content": [
            {
                "_type": "block",
                "style": "normal",
                "children": [{"_type": "span", "text": ""}]
            }
        ]
    });

    fs::write(&file_path, serde_json::to_string_pretty(&post)?)?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{ContentStore, LocalStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_post() {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path().to_path_buf(), SiteConfig::default());

        let path = create_post(&site, "Robotics Workshop: Day 1", None).unwrap();
        assert!(path.ends_with("content/posts/robotics-workshop-day-1.json"));

        let store = LocalStore::new(&site.content_dir);
        let post = store
            .fetch_post("robotics-workshop-day-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "Robotics Workshop: Day 1");
        assert_eq!(post.first_author().unwrap().name, "IEEE GU");
        assert!(post.excerpt().is_none());

        assert!(create_post(&site, "Robotics Workshop: Day 1", None).is_err());
        assert!(create_post(&site, "Anything", Some("custom slug")).unwrap().ends_with("custom-slug.json"));
    }
}
