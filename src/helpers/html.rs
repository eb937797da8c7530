//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Join non-empty class names with single spaces
///
/// # Examples
/// ```ignore
/// class_names(&["border-l-4", "", "p-4"]) // -> "border-l-4 p-4"
/// ```
pub fn class_names(classes: &[&str]) -> String {
    classes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate an image tag
pub fn image_tag(src: &str, alt: &str, class: &str, extra_attrs: &str) -> String {
    let extra = if extra_attrs.is_empty() {
        String::new()
    } else {
        format!(" {}", extra_attrs)
    };
    format!(
        r#"<img src="{}" alt="{}" class="{}"{}>"#,
        html_escape(src),
        html_escape(alt),
        class,
        extra
    )
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_class_names() {
        assert_eq!(class_names(&["a", "", " b ", "c"]), "a b c");
        assert_eq!(class_names(&[]), "");
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(
            image_tag("/a.jpg", "A \"quote\"", "w-full", ""),
            r#"<img src="/a.jpg" alt="A &quot;quote&quot;" class="w-full">"#
        );
        assert!(image_tag("/a.jpg", "", "", r#"loading="lazy""#).ends_with(r#" loading="lazy">"#));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }
}
