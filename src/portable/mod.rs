//! Portable text to HTML
//!
//! Every block kind maps to one arm of [`PortableTextRenderer::render_block`].
//! Unknown block kinds, styles, marks and callout tones degrade to a default
//! presentation instead of failing the page.

mod highlight;

pub use highlight::CodeHighlighter;

use crate::content::block::{
    BlockStyle, CalloutBlock, CodeBlock, Inline, ListKind, Span, TextBlock,
};
use crate::content::{CalloutTone, ContentBlock, ImageRef};
use crate::helpers::{class_names, html_escape, image_tag, link_to, sizes, ImageUrlBuilder};

const LINK_CLASS: &str = "text-blue-600 hover:underline";

/// Callout container classes for each tone
pub fn callout_classes(tone: CalloutTone) -> &'static str {
    match tone {
        CalloutTone::Info => "bg-blue-50 border-blue-500 text-blue-700",
        CalloutTone::Warning => "bg-yellow-50 border-yellow-500 text-yellow-700",
        CalloutTone::Success => "bg-green-50 border-green-500 text-green-700",
        CalloutTone::Error => "bg-red-50 border-red-500 text-red-700",
    }
}

/// Stateless renderer; the same blocks always produce the same HTML
pub struct PortableTextRenderer<'a> {
    images: &'a ImageUrlBuilder,
    highlighter: Option<&'a CodeHighlighter>,
}

impl<'a> PortableTextRenderer<'a> {
    pub fn new(images: &'a ImageUrlBuilder) -> Self {
        Self {
            images,
            highlighter: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: Option<&'a CodeHighlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Render a block sequence, grouping consecutive list items into lists
    pub fn render(&self, blocks: &[ContentBlock]) -> String {
        let mut out = String::new();
        let mut i = 0;

        while i < blocks.len() {
            let items = list_run(&blocks[i..]);
            if items.is_empty() {
                self.render_block(&blocks[i], &mut out);
                i += 1;
            } else {
                i += items.len();
                self.render_list(&items, &mut out);
            }
        }

        out
    }

    fn render_block(&self, block: &ContentBlock, out: &mut String) {
        match block {
            ContentBlock::Block(text) => self.render_text_block(text, out),
            ContentBlock::Image(image) => self.render_image(image, out),
            ContentBlock::Code(code) => self.render_code(code, out),
            ContentBlock::Callout(callout) => self.render_callout(callout, out),
            ContentBlock::Unknown => {
                tracing::debug!("Skipping unknown content block");
            }
        }
    }

    fn render_text_block(&self, block: &TextBlock, out: &mut String) {
        let children = self.render_children(block);
        let html = match &block.style {
            BlockStyle::H1 => format!(r#"<h1 class="text-3xl font-bold mt-8 mb-4">{}</h1>"#, children),
            BlockStyle::H2 => format!(r#"<h2 class="text-2xl font-bold mt-8 mb-4">{}</h2>"#, children),
            BlockStyle::H3 => format!(r#"<h3 class="text-xl font-bold mt-6 mb-3">{}</h3>"#, children),
            BlockStyle::H4 => format!(r#"<h4 class="text-lg font-bold mt-6 mb-3">{}</h4>"#, children),
            BlockStyle::Blockquote => format!(
                r#"<blockquote class="border-l-4 border-blue-500 pl-4 italic my-6 text-gray-700">{}</blockquote>"#,
                children
            ),
            BlockStyle::Normal | BlockStyle::Other(_) => format!("<p>{}</p>", children),
        };
        out.push_str(&html);
    }

    fn render_image(&self, image: &ImageRef, out: &mut String) {
        let src = self.images.sized(image, sizes::CONTENT);
        let alt = image.alt.as_deref().unwrap_or("");

        out.push_str(r#"<div class="my-8">"#);
        out.push_str(r#"<div class="relative w-full aspect-[16/9] rounded-lg overflow-hidden">"#);
        out.push_str(&image_tag(
            &src,
            alt,
            "absolute inset-0 w-full h-full object-cover",
            r#"sizes="(max-width: 768px) 100vw, 800px" loading="lazy""#,
        ));
        out.push_str("</div>");
        if let Some(caption) = image.caption.as_deref().filter(|c| !c.is_empty()) {
            out.push_str(&format!(
                r#"<div class="text-sm text-gray-500 mt-2 text-center">{}</div>"#,
                html_escape(caption)
            ));
        }
        out.push_str("</div>");
    }

    fn render_code(&self, code: &CodeBlock, out: &mut String) {
        let highlighted = match (self.highlighter, code.language.as_deref()) {
            (Some(highlighter), Some(lang)) => highlighter.highlight(&code.code, lang),
            _ => None,
        };
        let body = highlighted.unwrap_or_else(|| html_escape(&code.code));

        out.push_str(&format!(
            r#"<pre class="bg-gray-900 text-gray-100 p-4 rounded-lg overflow-x-auto my-6"><code class="text-sm font-mono">{}</code></pre>"#,
            body
        ));
    }

    fn render_callout(&self, callout: &CalloutBlock, out: &mut String) {
        let classes = class_names(&["border-l-4 p-4 my-6", callout_classes(callout.tone())]);
        out.push_str(&format!(
            r#"<div class="{}">{}</div>"#,
            classes,
            self.render(&callout.content)
        ));
    }

    fn render_list(&self, items: &[&TextBlock], out: &mut String) {
        let level = items[0].level();
        let mut kind = items[0].list_item.unwrap_or(ListKind::Bullet);
        out.push_str(list_open(kind));

        let mut i = 0;
        while i < items.len() {
            let item = items[i];
            let item_kind = item.list_item.unwrap_or(ListKind::Bullet);
            if item_kind != kind {
                out.push_str(list_close(kind));
                kind = item_kind;
                out.push_str(list_open(kind));
            }

            // deeper items directly after this one nest inside it
            let mut end = i + 1;
            while end < items.len() && items[end].level() > level {
                end += 1;
            }

            out.push_str("<li>");
            out.push_str(&self.render_children(item));
            if end > i + 1 {
                self.render_list(&items[i + 1..end], out);
            }
            out.push_str("</li>");

            i = end;
        }

        out.push_str(list_close(kind));
    }

    fn render_children(&self, block: &TextBlock) -> String {
        block
            .children
            .iter()
            .map(|child| match child {
                Inline::Span(span) => self.render_span(block, span),
                Inline::Unknown => String::new(),
            })
            .collect()
    }

    /// Apply marks inside-out so the first mark is the outermost element
    fn render_span(&self, block: &TextBlock, span: &Span) -> String {
        let mut html = html_escape(&span.text).replace('\n', "<br/>");

        for mark in span.marks.iter().rev() {
            html = match mark.as_str() {
                "strong" => format!("<strong>{}</strong>", html),
                "em" => format!("<em>{}</em>", html),
                "code" => format!("<code>{}</code>", html),
                "underline" => format!(r#"<span style="text-decoration:underline">{}</span>"#, html),
                "strike-through" => format!("<del>{}</del>", html),
                key => match block.mark_def(key).and_then(|d| d.link_href()) {
                    Some(href) => link_to(href, &html, LINK_CLASS),
                    None => html,
                },
            };
        }

        html
    }
}

/// Leading run of list-item text blocks
fn list_run(blocks: &[ContentBlock]) -> Vec<&TextBlock> {
    blocks
        .iter()
        .map_while(|block| match block {
            ContentBlock::Block(text) if text.list_item.is_some() => Some(text),
            _ => None,
        })
        .collect()
}

fn list_open(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "<ul>",
        ListKind::Number => "<ol>",
    }
}

fn list_close(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "</ul>",
        ListKind::Number => "</ol>",
    }
}
