//! Site templates using the Tera template engine
//!
//! All templates are embedded in the binary. Autoescaping is on; fragments
//! already rendered to HTML (portable text bodies, the document head and the
//! context menu) are passed through with `| safe`.

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::truncate;

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all site templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("blog_layout.html", include_str!("site/blog_layout.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("blog_index.html", include_str!("site/blog_index.html")),
            ("home.html", include_str!("site/home.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            (
                "partials/navbar.html",
                include_str!("site/partials/navbar.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/banner.html",
                include_str!("site/partials/banner.html"),
            ),
            (
                "partials/blog_card.html",
                include_str!("site/partials/blog_card.html"),
            ),
            (
                "partials/author_card.html",
                include_str!("site/partials/author_card.html"),
            ),
            (
                "partials/carousel.html",
                include_str!("site/partials/carousel.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => Some(tera::try_get_value!("truncate_chars", "omission", String, val)),
        None => None,
    };

    Ok(tera::Value::String(truncate(&s, length, omission.as_deref())))
}
