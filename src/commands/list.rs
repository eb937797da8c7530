//! List site content

use anyhow::Result;

use crate::content::ContentStore;

/// Largest number of posts listed
const LIST_LIMIT: usize = 1000;

/// List site content by type
pub async fn run(store: &dyn ContentStore, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let posts = store.fetch_posts(LIST_LIMIT).await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let date = post
                    .published_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("  {} - {} [{}]", date, post.title, post.slug.current);
            }
        }
        "category" | "categories" => {
            let categories = store.fetch_categories().await?;
            println!("Categories ({}):", categories.len());
            for category in categories {
                match category.description {
                    Some(description) => println!("  {} - {}", category.title, description),
                    None => println!("  {}", category.title),
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }

    Ok(())
}
