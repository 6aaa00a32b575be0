//! Page composition: metadata header, rendered block body, publishing footer.

use std::sync::Arc;

use slug::slugify;
use time::{
    Date, OffsetDateTime,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};
use tracing::debug;

use crate::application::render::{BlockRenderer, RawHtmlPolicy, RenderError, block_renderer};
use crate::domain::blocks::{Block, render_keys};
use crate::domain::pages::{PageDocument, PageMetadata, PageStatus};
use crate::presentation::views::{
    BlockView, PageTemplate, PageView, PublishedView, render_template,
};

const SOURCE: &str = "application::page";
const UNTITLED: &str = "Untitled page";

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const DATE_ONLY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Renders page metadata plus its block sequence into one preview document.
#[derive(Clone)]
pub struct PageRenderer {
    blocks: Arc<dyn BlockRenderer>,
}

impl PageRenderer {
    pub fn new(blocks: Arc<dyn BlockRenderer>) -> Self {
        Self { blocks }
    }

    pub fn with_policy(policy: RawHtmlPolicy) -> Self {
        Self::new(block_renderer(policy))
    }

    /// Render the full document. Blocks appear exactly in the order given.
    pub fn render(&self, metadata: &PageMetadata, blocks: &[Block]) -> Result<String, RenderError> {
        debug!(
            target = SOURCE,
            blocks = blocks.len(),
            slug = metadata.slug.as_deref().unwrap_or(""),
            "rendering page"
        );
        render_template(
            PageTemplate {
                view: self.page_view(metadata, blocks),
            },
            SOURCE,
        )
    }

    pub fn render_document(&self, document: &PageDocument) -> Result<String, RenderError> {
        self.render(&document.metadata, &document.blocks())
    }

    pub fn page_view(&self, metadata: &PageMetadata, blocks: &[Block]) -> PageView {
        let status = metadata.status.unwrap_or(PageStatus::Draft);
        let blocks = blocks
            .iter()
            .zip(render_keys(blocks))
            .map(|(block, key)| BlockView {
                key,
                type_name: block.type_name().to_string(),
                html: self.blocks.render_block(block),
            })
            .collect();

        PageView {
            title: non_blank(metadata.title.as_deref())
                .unwrap_or(UNTITLED)
                .to_string(),
            description: non_blank(metadata.description.as_deref()).map(str::to_string),
            status_key: status.as_str(),
            status_label: status.label(),
            author: non_blank(metadata.author.as_deref()).map(str::to_string),
            published: non_blank(metadata.published_at.as_deref()).map(published_view),
            blocks,
            path: page_path(metadata),
        }
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::with_policy(RawHtmlPolicy::default())
    }
}

/// Public path shown in the footer. Falls back to a slug derived from the title.
pub fn page_path(metadata: &PageMetadata) -> String {
    let explicit = non_blank(metadata.slug.as_deref())
        .map(|slug| slug.trim_matches('/').to_string())
        .filter(|slug| !slug.is_empty());

    let slug = explicit.or_else(|| {
        non_blank(metadata.title.as_deref())
            .map(slugify)
            .filter(|slug| !slug.is_empty())
    });

    match slug {
        Some(slug) => format!("/{slug}"),
        None => "/".to_string(),
    }
}

/// Human date for the header; unparsable values are shown as given.
pub fn format_published(raw: &str) -> String {
    published_view(raw).label
}

fn published_view(raw: &str) -> PublishedView {
    let raw = raw.trim();
    let date = OffsetDateTime::parse(raw, &Rfc3339)
        .map(OffsetDateTime::date)
        .or_else(|_| Date::parse(raw, DATE_ONLY_FORMAT));

    match date.ok().and_then(|date| date.format(HUMAN_DATE_FORMAT).ok()) {
        Some(label) => PublishedView {
            label,
            iso: Some(raw.to_string()),
        },
        None => PublishedView {
            label: raw.to_string(),
            iso: None,
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
