//! Stored page content: a JSON array of blocks, or legacy raw markup.

use serde_json::Value;
use tracing::debug;

use super::blocks::Block;
use super::error::DomainError;

/// Id given to the block that wraps pre-block-editor content.
pub const LEGACY_BLOCK_ID: &str = "legacy-content";

/// Parse a stored `content` string into blocks.
///
/// Strings that are not a JSON array predate the block editor and are wrapped
/// in a single `html` block so they still render.
pub fn parse_content(content: &str) -> Vec<Block> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => blocks_from_values(&items),
        Ok(_) | Err(_) => {
            debug!(
                target = "domain::content",
                length = content.len(),
                "content is not a block array; wrapping as legacy html"
            );
            vec![legacy_block(content)]
        }
    }
}

/// Normalise each element of a decoded JSON array, preserving order.
pub fn blocks_from_values(items: &[Value]) -> Vec<Block> {
    items.iter().map(Block::from_value).collect()
}

pub fn legacy_block(content: &str) -> Block {
    Block::html(LEGACY_BLOCK_ID, content)
}

/// Serialise blocks back into the stored `content` string.
pub fn serialize_content(blocks: &[Block]) -> Result<String, DomainError> {
    serde_json::to_string(blocks).map_err(|err| DomainError::serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blocks::BlockKind;

    #[test]
    fn blank_content_is_empty_sequence() {
        assert!(parse_content("").is_empty());
        assert!(parse_content("  \n").is_empty());
    }

    #[test]
    fn legacy_markup_is_wrapped() {
        let blocks = parse_content("<p>Hi</p>");
        assert_eq!(blocks, vec![Block::html("legacy-content", "<p>Hi</p>")]);
    }

    #[test]
    fn json_that_is_not_an_array_is_legacy_too() {
        let blocks = parse_content(r#"{"type":"text"}"#);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id.as_deref(), Some(LEGACY_BLOCK_ID));
        assert!(matches!(blocks[0].kind, BlockKind::Html(_)));
    }

    #[test]
    fn array_content_keeps_order() {
        let blocks = parse_content(
            r#"[{"id":"a","type":"text"},{"id":"b","type":"divider"},{"id":"c","type":"quote"}]"#,
        );
        let ids: Vec<_> = blocks.iter().filter_map(|b| b.id.as_deref()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn serialised_content_parses_back_to_same_blocks() {
        let blocks = vec![
            Block::heading("h1", 1, "Welcome"),
            Block::text("t1", "Body"),
            Block::divider("d1"),
        ];
        let stored = serialize_content(&blocks).expect("serialise");
        assert_eq!(parse_content(&stored), blocks);
    }
}
