//! Root layout: document head, navigation chrome and the context menu

use chrono::Datelike;
use serde::Serialize;
use tera::Context;

use super::{PageMetadata, RenderContext};
use crate::config::MenuEntry;
use crate::helpers::{class_names, html_escape, url_for};

const MENU_CLASS: &str =
    "w-64 bg-gradient-to-br from-[#f0f8ff] to-[#e6f3ff] text-[#005580] rounded-lg shadow-lg";
const SUBMENU_CLASS: &str =
    "w-48 bg-gradient-to-br from-[#f0f8ff] to-[#e6f3ff] text-[#005580] rounded-md shadow-lg";
const ITEM_CLASS: &str = "hover:bg-[#d9ecff] transition-colors";

#[derive(Debug, Serialize)]
struct NavLink {
    name: String,
    href: String,
}

#[derive(Debug, Serialize)]
struct ThemeView {
    default: &'static str,
    enable_system: bool,
}

/// Template context shared by every page that uses the root layout
///
/// A page with an empty title gets the site-wide title and description.
pub fn base_context(ctx: &RenderContext, metadata: &PageMetadata) -> Context {
    let config = &ctx.config;
    let head = if metadata.title.is_empty() {
        PageMetadata::site(config).to_head_html()
    } else {
        metadata.to_head_html()
    };

    let menu: Vec<NavLink> = config
        .menu
        .iter()
        .map(|item| NavLink {
            name: item.name.clone(),
            href: url_for(config, &item.path),
        })
        .collect();

    let mut context = Context::new();
    context.insert("site_title", &config.title);
    context.insert("language", &config.language);
    context.insert("root", &url_for(config, ""));
    context.insert("head", &head);
    context.insert(
        "theme",
        &ThemeView {
            default: config.theme.default.as_str(),
            enable_system: config.theme.enable_system,
        },
    );
    context.insert("menu", &menu);
    context.insert("banner", &config.banner);
    context.insert("context_menu", &render_context_menu(&config.context_menu));
    context.insert("blog_path", &url_for(config, "blog"));
    context.insert("year", &chrono::Utc::now().with_timezone(&ctx.timezone).year());
    context
}

/// Context menu markup; submenus nest, separators become rules
pub fn render_context_menu(entries: &[MenuEntry]) -> String {
    let mut out = String::new();
    push_menu(entries, MENU_CLASS, &mut out);
    out
}

fn push_menu(entries: &[MenuEntry], class: &str, out: &mut String) {
    out.push_str(&format!(r#"<ul class="{}" role="menu">"#, class));
    for entry in entries {
        push_entry(entry, out);
    }
    out.push_str("</ul>");
}

fn push_entry(entry: &MenuEntry, out: &mut String) {
    if entry.separator {
        out.push_str(r#"<li class="h-px my-1 bg-[#b3d9ff]" role="separator"></li>"#);
        return;
    }

    let icon = entry
        .icon
        .as_deref()
        .map(|name| {
            format!(
                r#"<i class="icon icon-{} mr-2 h-4 w-4" aria-hidden="true"></i>"#,
                html_escape(name)
            )
        })
        .unwrap_or_default();
    let label = html_escape(&entry.label);

    if !entry.items.is_empty() {
        out.push_str(r#"<li class="context-menu-sub" role="none">"#);
        out.push_str(&format!(
            r#"<button type="button" class="{}" aria-haspopup="menu">{}{}</button>"#,
            class_names(&[ITEM_CLASS, "flex items-center"]),
            icon,
            label
        ));
        push_menu(&entry.items, SUBMENU_CLASS, out);
        out.push_str("</li>");
        return;
    }

    let class = if icon.is_empty() {
        ITEM_CLASS.to_string()
    } else {
        class_names(&[ITEM_CLASS, "flex items-center"])
    };
    let body = match entry.href.as_deref() {
        Some(href) => format!(r#"{}<a href="{}">{}</a>"#, icon, html_escape(href), label),
        None => format!("{}{}", icon, label),
    };
    out.push_str(&format!(r#"<li class="{}" role="menuitem">{}</li>"#, class, body));
}
