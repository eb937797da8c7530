//! URL and link helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use super::html::html_escape;
use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/blog/") // -> "/chapter/blog/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Absolute URL for a path that already carries the root (see [`url_for`]),
/// or None when no site `url` is configured
pub fn full_url_for(config: &SiteConfig, rooted_path: &str) -> Option<String> {
    let base = config.url.trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    Some(format!("{}/{}", base, rooted_path.trim_start_matches('/')))
}

/// Path of a post page
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    url_for(
        config,
        &format!("blog/{}", utf8_percent_encode(slug, SEGMENT)),
    )
}

/// Anything not rooted at `/` leaves the site
pub fn is_external(href: &str) -> bool {
    !href.starts_with('/')
}

/// Generate an anchor tag around already-rendered inner HTML
///
/// External targets open in a new tab with `rel="noreferrer noopener"`;
/// internal targets get neither attribute.
pub fn link_to(href: &str, inner_html: &str, class: &str) -> String {
    let class_attr = if class.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, class)
    };

    if is_external(href) {
        format!(
            r#"<a href="{}" rel="noreferrer noopener" target="_blank"{}>{}</a>"#,
            html_escape(href),
            class_attr,
            inner_html
        )
    } else {
        format!(
            r#"<a href="{}"{}>{}</a>"#,
            html_escape(href),
            class_attr,
            inner_html
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://ieee.example.edu".to_string(),
            root: "/chapter/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, &post_path(&config, "pcb")).as_deref(),
            Some("https://ieee.example.edu/chapter/blog/pcb")
        );

        let config = SiteConfig {
            url: String::new(),
            ..Default::default()
        };
        assert_eq!(full_url_for(&config, "/blog/pcb"), None);
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/blog/"), "/chapter/blog/");
        assert_eq!(url_for(&config, ""), "/chapter/");
        assert_eq!(url_for(&SiteConfig::default(), "/blog"), "/blog");
    }

    #[test]
    fn test_post_path_encodes_slug() {
        let config = SiteConfig::default();
        assert_eq!(post_path(&config, "hello-world"), "/blog/hello-world");
        assert_eq!(post_path(&config, "a b/c"), "/blog/a%20b%2Fc");
    }

    #[test]
    fn test_external_link() {
        let html = link_to("https://ieee.org", "IEEE", "");
        assert_eq!(
            html,
            r#"<a href="https://ieee.org" rel="noreferrer noopener" target="_blank">IEEE</a>"#
        );
    }

    #[test]
    fn test_internal_link() {
        let html = link_to("/events", "Events", "text-blue-600");
        assert_eq!(html, r#"<a href="/events" class="text-blue-600">Events</a>"#);
        assert!(!html.contains("rel="));
        assert!(!html.contains("target="));
    }

    #[test]
    fn test_non_rooted_hrefs_are_external() {
        assert!(is_external("mailto:ieee@example.edu"));
        assert!(is_external("#section"));
        assert!(is_external("events"));
        assert!(!is_external("/"));
    }
}
