//! Portable text content blocks
//!
//! Blog bodies arrive as an ordered array of typed blocks keyed by `_type`.
//! Block kinds we do not know about deserialize to [`ContentBlock::Unknown`]
//! so that schema drift in the CMS never fails a whole post.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ImageRef;

/// One node of a post body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum ContentBlock {
    /// Paragraphs, headings, blockquotes and list items
    Block(TextBlock),
    Image(ImageRef),
    Code(CodeBlock),
    Callout(CalloutBlock),
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// A plain paragraph holding a single unmarked span
    pub fn paragraph(text: &str) -> Self {
        ContentBlock::Block(TextBlock {
            children: vec![Inline::Span(Span {
                text: text.to_string(),
                marks: Vec::new(),
            })],
            ..Default::default()
        })
    }
}

/// A block of inline text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default)]
    pub style: BlockStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<ListKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default)]
    pub children: Vec<Inline>,
    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    /// List nesting depth, 1-based
    pub fn level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }

    /// Look up an annotation referenced from a span's marks
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }

    /// Concatenated span text
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Inline::Span(span) => Some(span.text.as_str()),
                Inline::Unknown => None,
            })
            .collect()
    }
}

/// Text block style
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockStyle {
    #[default]
    Normal,
    H1,
    H2,
    H3,
    H4,
    Blockquote,
    /// Styles outside the table above render as paragraphs
    Other(String),
}

impl From<String> for BlockStyle {
    fn from(style: String) -> Self {
        match style.as_str() {
            "normal" => BlockStyle::Normal,
            "h1" => BlockStyle::H1,
            "h2" => BlockStyle::H2,
            "h3" => BlockStyle::H3,
            "h4" => BlockStyle::H4,
            "blockquote" => BlockStyle::Blockquote,
            _ => BlockStyle::Other(style),
        }
    }
}

impl From<BlockStyle> for String {
    fn from(style: BlockStyle) -> Self {
        match style {
            BlockStyle::Normal => "normal".to_string(),
            BlockStyle::H1 => "h1".to_string(),
            BlockStyle::H2 => "h2".to_string(),
            BlockStyle::H3 => "h3".to_string(),
            BlockStyle::H4 => "h4".to_string(),
            BlockStyle::Blockquote => "blockquote".to_string(),
            BlockStyle::Other(s) => s,
        }
    }
}

/// List flavour of a list-item block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListKind {
    Bullet,
    Number,
}

impl From<String> for ListKind {
    fn from(kind: String) -> Self {
        if kind == "number" {
            ListKind::Number
        } else {
            ListKind::Bullet
        }
    }
}

impl From<ListKind> for String {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Bullet => "bullet".to_string(),
            ListKind::Number => "number".to_string(),
        }
    }
}

/// Inline child of a text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum Inline {
    Span(Span),
    #[serde(other)]
    Unknown,
}

/// A run of text with decorator names and annotation keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation definition, referenced from spans by `_key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl MarkDef {
    /// Target of a link annotation
    pub fn link_href(&self) -> Option<&str> {
        if self.kind == "link" {
            self.href.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalloutBlock {
    /// Severity tag, kept raw so unknown values can fall back
    #[serde(rename = "type", default, deserialize_with = "string_or_empty")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
}

impl CalloutBlock {
    pub fn tone(&self) -> CalloutTone {
        CalloutTone::from_tag(&self.kind)
    }
}

/// Callout severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutTone {
    Info,
    Warning,
    Success,
    Error,
}

impl CalloutTone {
    /// Unrecognized tags render as info
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "warning" => CalloutTone::Warning,
            "success" => CalloutTone::Success,
            "error" => CalloutTone::Error,
            _ => CalloutTone::Info,
        }
    }
}

/// Plain text of a block tree, paragraphs separated by blank lines
pub fn to_plain_text(blocks: &[ContentBlock]) -> String {
    let mut parts = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Block(text) => parts.push(text.text()),
            ContentBlock::Callout(callout) => parts.push(to_plain_text(&callout.content)),
            ContentBlock::Code(code) => parts.push(code.code.clone()),
            ContentBlock::Image(_) | ContentBlock::Unknown => {}
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join("\n\n")
}

/// Deserialize a field that may be portable text, a plain string or null
pub fn text_or_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct TextOrBlocks;

    impl<'de> Visitor<'de> for TextOrBlocks {
        type Value = Vec<ContentBlock>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of portable text blocks")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if value.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![ContentBlock::paragraph(value)])
            }
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut blocks = Vec::new();
            while let Some(value) = seq.next_element::<Value>()? {
                blocks.push(block_from_value(value));
            }
            Ok(blocks)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(TextOrBlocks)
}

/// Decode one block, degrading a malformed block to [`ContentBlock::Unknown`]
fn block_from_value(value: Value) -> ContentBlock {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Skipping malformed content block: {}", e);
        ContentBlock::Unknown
    })
}

/// A block list where each element decodes on its own; null means empty
pub fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().map(block_from_value).collect())
}

/// Any non-string value (null, number, object) reads as an empty string
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Any non-string value reads as absent
pub fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Treat an explicit `null` list as empty; projections return null for missing arrays
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
