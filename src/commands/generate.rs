//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Site;

/// Export every page into the public directory
pub async fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site)?;
    let stats = generator.generate().await?;

    tracing::info!(
        "Generated {} pages, {} posts and {} assets in {:.2}s",
        stats.pages,
        stats.posts,
        stats.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
