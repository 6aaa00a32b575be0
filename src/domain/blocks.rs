//! Content blocks: the typed units a page body is assembled from.
//!
//! Blocks arrive from editor state that may be half filled in or written by an
//! older editor, so every field is optional on the wire. [`Block::from_value`]
//! is the single place where wire data is normalised into typed variants; the
//! renderer only ever sees normalised values.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const UNKNOWN_TYPE: &str = "unknown";

/// One block of page content. `id` is stable across edits when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: Option<String>,
    pub kind: BlockKind,
}

/// Closed set of block variants understood by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Text(TextBlock),
    Heading(HeadingBlock),
    Image(ImageBlock),
    /// Author-supplied markup.
    Html(RawBlock),
    /// Markup produced by the writing assistant.
    Ai(RawBlock),
    List(ListBlock),
    Quote(QuoteBlock),
    Divider,
    Callout(CalloutBlock),
    /// Any `type` this version does not know. The wire value is kept verbatim.
    Unsupported(UnsupportedBlock),
}

impl BlockKind {
    /// Wire name of the variant (`"text"`, `"heading"`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Text(_) => "text",
            BlockKind::Heading(_) => "heading",
            BlockKind::Image(_) => "image",
            BlockKind::Html(_) => "html",
            BlockKind::Ai(_) => "ai",
            BlockKind::List(_) => "list",
            BlockKind::Quote(_) => "quote",
            BlockKind::Divider => "divider",
            BlockKind::Callout(_) => "callout",
            BlockKind::Unsupported(block) => block.type_name.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingBlock {
    pub text: String,
    pub level: HeadingLevel,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBlock {
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBlock {
    pub items: Vec<String>,
    pub list_type: ListType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteBlock {
    pub text: String,
    pub citation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalloutBlock {
    pub title: String,
    pub content: String,
    pub style: CalloutStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedBlock {
    pub type_name: String,
    pub raw: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    /// Unknown values fall back to [`Alignment::Left`].
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

/// Heading level clamped to `1..=6`.
///
/// Levels one to five keep their value; anything else collapses to six, the
/// smallest size on the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const DEFAULT: HeadingLevel = HeadingLevel(2);
    pub const SMALLEST: HeadingLevel = HeadingLevel(6);

    pub fn new(level: u64) -> Self {
        match level {
            1..=5 => HeadingLevel(level as u8),
            _ => Self::SMALLEST,
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListType {
    Ordered,
    #[default]
    Unordered,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Ordered => "ordered",
            ListType::Unordered => "unordered",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "ordered" => ListType::Ordered,
            _ => ListType::Unordered,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalloutStyle {
    Info,
    Warning,
    Success,
    Error,
    #[default]
    Default,
}

impl CalloutStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            CalloutStyle::Info => "info",
            CalloutStyle::Warning => "warning",
            CalloutStyle::Success => "success",
            CalloutStyle::Error => "error",
            CalloutStyle::Default => "default",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "info" => CalloutStyle::Info,
            "warning" => CalloutStyle::Warning,
            "success" => CalloutStyle::Success,
            "error" => CalloutStyle::Error,
            _ => CalloutStyle::Default,
        }
    }
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: Some(id.into()),
            kind,
        }
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            id,
            BlockKind::Text(TextBlock {
                text: text.into(),
                alignment: Alignment::Left,
            }),
        )
    }

    pub fn heading(id: impl Into<String>, level: u64, text: impl Into<String>) -> Self {
        Self::new(
            id,
            BlockKind::Heading(HeadingBlock {
                text: text.into(),
                level: HeadingLevel::new(level),
                alignment: Alignment::Left,
            }),
        )
    }

    pub fn html(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            BlockKind::Html(RawBlock {
                content: content.into(),
            }),
        )
    }

    pub fn ai(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            BlockKind::Ai(RawBlock {
                content: content.into(),
            }),
        )
    }

    pub fn list<I, S>(id: impl Into<String>, list_type: ListType, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            id,
            BlockKind::List(ListBlock {
                items: items.into_iter().map(Into::into).collect(),
                list_type,
            }),
        )
    }

    pub fn divider(id: impl Into<String>) -> Self {
        Self::new(id, BlockKind::Divider)
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Normalise a wire value into a block. Never fails: missing or mistyped
    /// fields take their defaults and unknown types become
    /// [`BlockKind::Unsupported`].
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self {
                id: None,
                kind: BlockKind::Unsupported(UnsupportedBlock {
                    type_name: UNKNOWN_TYPE.to_string(),
                    raw: value.clone(),
                }),
            };
        };

        let id = object.get("id").and_then(scalar_string).filter(|id| !id.is_empty());

        // Type names match exactly; anything else is echoed back as written.
        let type_name = object
            .get("type")
            .and_then(scalar_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string());

        let kind = match type_name.as_str() {
            "text" => BlockKind::Text(TextBlock {
                text: string_field(object, "text"),
                alignment: alignment_field(object),
            }),
            "heading" => BlockKind::Heading(HeadingBlock {
                text: string_field(object, "text"),
                level: heading_level_field(object),
                alignment: alignment_field(object),
            }),
            "image" => BlockKind::Image(ImageBlock {
                src: string_field(object, "src"),
                alt: string_field(object, "alt"),
                caption: string_field(object, "caption"),
                alignment: alignment_field(object),
            }),
            "html" => BlockKind::Html(RawBlock {
                content: string_field(object, "content"),
            }),
            "ai" => BlockKind::Ai(RawBlock {
                content: string_field(object, "content"),
            }),
            "list" => BlockKind::List(ListBlock {
                items: list_items_field(object),
                list_type: ListType::parse(&string_field(object, "listType")),
            }),
            "quote" => BlockKind::Quote(QuoteBlock {
                text: string_field(object, "text"),
                citation: string_field(object, "citation"),
            }),
            "divider" => BlockKind::Divider,
            "callout" => BlockKind::Callout(CalloutBlock {
                title: string_field(object, "title"),
                content: string_field(object, "content"),
                style: CalloutStyle::parse(&string_field(object, "style")),
            }),
            other => BlockKind::Unsupported(UnsupportedBlock {
                type_name: other.to_string(),
                raw: value.clone(),
            }),
        };

        Self { id, kind }
    }

    /// Wire form of the block, using the editor's camelCase field names.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        if let Some(id) = self.id.as_ref() {
            object.insert("id".into(), Value::String(id.clone()));
        }
        object.insert("type".into(), Value::String(self.type_name().to_string()));

        match &self.kind {
            BlockKind::Text(block) => {
                object.insert("text".into(), block.text.clone().into());
                object.insert("alignment".into(), block.alignment.as_str().into());
            }
            BlockKind::Heading(block) => {
                object.insert("text".into(), block.text.clone().into());
                object.insert("level".into(), block.level.get().into());
                object.insert("alignment".into(), block.alignment.as_str().into());
            }
            BlockKind::Image(block) => {
                object.insert("src".into(), block.src.clone().into());
                object.insert("alt".into(), block.alt.clone().into());
                object.insert("caption".into(), block.caption.clone().into());
                object.insert("alignment".into(), block.alignment.as_str().into());
            }
            BlockKind::Html(block) | BlockKind::Ai(block) => {
                object.insert("content".into(), block.content.clone().into());
            }
            BlockKind::List(block) => {
                object.insert("items".into(), block.items.clone().into());
                object.insert("listType".into(), block.list_type.as_str().into());
            }
            BlockKind::Quote(block) => {
                object.insert("text".into(), block.text.clone().into());
                object.insert("citation".into(), block.citation.clone().into());
            }
            BlockKind::Divider => {}
            BlockKind::Callout(block) => {
                object.insert("title".into(), block.title.clone().into());
                object.insert("content".into(), block.content.clone().into());
                object.insert("style".into(), block.style.as_str().into());
            }
            BlockKind::Unsupported(block) => return block.raw.clone(),
        }

        Value::Object(object)
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Block::from_value(&value))
    }
}

/// Keys identifying each block in rendered output. Blocks keep their id;
/// blocks without one are keyed by position, skipping any key an explicit id
/// in the same sequence already uses.
pub fn render_keys(blocks: &[Block]) -> Vec<String> {
    let taken: HashSet<&str> = blocks.iter().filter_map(|block| block.id.as_deref()).collect();

    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| match block.id.as_deref() {
            Some(id) => id.to_string(),
            None => {
                let mut key = format!("block-{index}");
                let mut suffix = 1;
                while taken.contains(key.as_str()) {
                    key = format!("block-{index}-{suffix}");
                    suffix += 1;
                }
                key
            }
        })
        .collect()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object.get(key).and_then(scalar_string).unwrap_or_default()
}

fn alignment_field(object: &Map<String, Value>) -> Alignment {
    object
        .get("alignment")
        .and_then(Value::as_str)
        .map(Alignment::parse)
        .unwrap_or_default()
}

fn heading_level_field(object: &Map<String, Value>) -> HeadingLevel {
    match object.get("level") {
        None | Some(Value::Null) => HeadingLevel::DEFAULT,
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0 && *value >= 0.0)
                    .map(|value| value as u64)
            })
            .map(HeadingLevel::new)
            .unwrap_or(HeadingLevel::SMALLEST),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<u64>()
            .map(HeadingLevel::new)
            .unwrap_or(HeadingLevel::SMALLEST),
        Some(_) => HeadingLevel::SMALLEST,
    }
}

fn list_items_field(object: &Map<String, Value>) -> Vec<String> {
    object
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_heading_takes_defaults() {
        let block = Block::from_value(&json!({ "id": "h", "type": "heading" }));
        assert_eq!(block.id.as_deref(), Some("h"));
        assert_eq!(
            block.kind,
            BlockKind::Heading(HeadingBlock {
                text: String::new(),
                level: HeadingLevel::DEFAULT,
                alignment: Alignment::Left,
            })
        );
    }

    #[test]
    fn heading_level_accepts_numeric_strings() {
        let block = Block::from_value(&json!({ "type": "heading", "level": "3" }));
        match block.kind {
            BlockKind::Heading(heading) => assert_eq!(heading.level.get(), 3),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_or_garbage_levels_collapse_to_smallest() {
        for level in [json!(0), json!(6), json!(42), json!("big"), json!([1])] {
            let block = Block::from_value(&json!({ "type": "heading", "level": level.clone() }));
            match block.kind {
                BlockKind::Heading(heading) => {
                    assert_eq!(heading.level, HeadingLevel::SMALLEST, "level {level}")
                }
                other => panic!("unexpected kind: {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_alignment_falls_back_to_left() {
        let block = Block::from_value(&json!({ "type": "text", "alignment": "justify" }));
        match block.kind {
            BlockKind::Text(text) => assert_eq!(text.alignment, Alignment::Left),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn list_items_keep_scalars_and_skip_structures() {
        let block = Block::from_value(&json!({
            "type": "list",
            "listType": "ordered",
            "items": ["a", 2, true, null, {"x": 1}]
        }));
        match block.kind {
            BlockKind::List(list) => {
                assert_eq!(list.list_type, ListType::Ordered);
                assert_eq!(list.items, vec!["a", "2", "true"]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_keeps_raw_value() {
        let raw = json!({ "id": "v1", "type": "video", "url": "https://example.com/v.mp4" });
        let block = Block::from_value(&raw);
        assert_eq!(block.type_name(), "video");
        assert_eq!(block.to_value(), raw);
    }

    #[test]
    fn missing_type_and_non_objects_are_unsupported() {
        assert_eq!(Block::from_value(&json!({ "id": "x" })).type_name(), "unknown");
        let scalar = Block::from_value(&json!("stray"));
        assert_eq!(scalar.type_name(), "unknown");
        assert_eq!(scalar.id, None);
    }

    #[test]
    fn type_names_are_matched_exactly() {
        let padded = Block::from_value(&json!({ "type": " text ", "text": "hi" }));
        assert_eq!(padded.type_name(), " text ");
        assert!(matches!(padded.kind, BlockKind::Unsupported(_)));

        let numeric = Block::from_value(&json!({ "type": 5 }));
        assert_eq!(numeric.type_name(), "5");

        let nested = Block::from_value(&json!({ "type": ["text"] }));
        assert_eq!(nested.type_name(), "unknown");
    }

    #[test]
    fn empty_ids_are_treated_as_missing() {
        let block = Block::from_value(&json!({ "id": "", "type": "divider" }));
        assert_eq!(block.id, None);
        assert_eq!(render_keys(&[Block::divider("a"), block]), ["a", "block-1"]);
    }

    #[test]
    fn positional_keys_step_around_explicit_ids() {
        let blocks = [
            Block::text("block-1", "named like a position"),
            Block::from_value(&json!({ "type": "divider" })),
            Block::from_value(&json!({ "type": "divider" })),
        ];
        assert_eq!(render_keys(&blocks), ["block-1", "block-1-1", "block-2"]);
    }

    #[test]
    fn wire_form_uses_camel_case_list_type() {
        let block = Block::list("l1", ListType::Ordered, ["A", "B"]);
        assert_eq!(
            serde_json::to_value(&block).expect("serialize"),
            json!({ "id": "l1", "type": "list", "items": ["A", "B"], "listType": "ordered" })
        );
    }
}
