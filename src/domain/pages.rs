//! Page metadata and the stored page document.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::blocks::Block;
use super::content::{blocks_from_values, parse_content};
use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Draft,
    Published,
    Archived,
}

impl PageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Archived => "archived",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageStatus::Draft => "Draft",
            PageStatus::Published => "Published",
            PageStatus::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Page,
    BlogPost,
    CoursePage,
    LandingPage,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Page => "page",
            PageType::BlogPost => "blog_post",
            PageType::CoursePage => "course_page",
            PageType::LandingPage => "landing_page",
        }
    }
}

/// Descriptive fields of a page, independent of its blocks. Nothing here is
/// required; the page renderer supplies defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub slug: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<PageStatus>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_type: Option<PageType>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,
}

/// A page as stored by the content API: metadata plus its `content` field.
///
/// `content` is normally a JSON string holding the block array, but a bare
/// array is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(flatten)]
    pub metadata: PageMetadata,
    #[serde(default)]
    pub content: Value,
}

impl PageDocument {
    pub fn new(metadata: PageMetadata, blocks: &[Block]) -> Self {
        Self {
            metadata,
            content: Value::Array(blocks.iter().map(Block::to_value).collect()),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|err| DomainError::invalid_document(err.to_string()))
    }

    /// Decode the block sequence, applying the legacy-markup fallback.
    pub fn blocks(&self) -> Vec<Block> {
        match &self.content {
            Value::Null => Vec::new(),
            Value::String(content) => parse_content(content),
            Value::Array(items) => blocks_from_values(items),
            other => parse_content(&other.to_string()),
        }
    }
}

/// Accept unknown enum strings as `None` instead of rejecting the document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// Stringify scalar values; objects and arrays read as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}
