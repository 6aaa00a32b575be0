use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::blocks::Block;

/// How `html` and `ai` block markup is treated before it reaches the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawHtmlPolicy {
    /// Run markup through the block sanitiser.
    #[default]
    Sanitize,
    /// Emit markup verbatim. Only for content from trusted authors.
    Trusted,
}

impl RawHtmlPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RawHtmlPolicy::Sanitize => "sanitize",
            RawHtmlPolicy::Trusted => "trusted",
        }
    }
}

impl FromStr for RawHtmlPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sanitize" | "sanitized" => Ok(RawHtmlPolicy::Sanitize),
            "trusted" | "raw" => Ok(RawHtmlPolicy::Trusted),
            other => Err(format!(
                "unknown raw html policy `{other}` (expected sanitize|trusted)"
            )),
        }
    }
}

/// Structured errors surfaced by page composition. Block rendering itself
/// never fails; only the surrounding document template can.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("template rendering failed: {template}: {message}")]
    Template {
        template: &'static str,
        message: String,
    },
}

impl RenderError {
    pub fn template(template: &'static str, message: impl Into<String>) -> Self {
        Self::Template {
            template,
            message: message.into(),
        }
    }
}

/// Maps one block to markup. Implementations must be pure and must not fail:
/// malformed or unknown blocks render a visible fallback instead.
pub trait BlockRenderer: Send + Sync {
    fn render_block(&self, block: &Block) -> String;
}
