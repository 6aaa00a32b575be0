mod config;
mod markup;

use std::{borrow::Cow, sync::Arc};

use metrics::counter;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::application::render::types::{BlockRenderer, RawHtmlPolicy};
use crate::domain::blocks::{Block, BlockKind};

use config::build_raw_block_sanitizer;

/// Default block renderer producing HTML fragments.
pub struct HtmlBlockRenderer {
    policy: RawHtmlPolicy,
    sanitizer: ammonia::Builder<'static>,
}

impl HtmlBlockRenderer {
    pub fn new(policy: RawHtmlPolicy) -> Self {
        Self {
            policy,
            sanitizer: build_raw_block_sanitizer(),
        }
    }

    pub fn policy(&self) -> RawHtmlPolicy {
        self.policy
    }

    fn raw_markup<'a>(&self, content: &'a str) -> Cow<'a, str> {
        match self.policy {
            RawHtmlPolicy::Trusted => Cow::Borrowed(content),
            RawHtmlPolicy::Sanitize => Cow::Owned(self.sanitizer.clean(content).to_string()),
        }
    }
}

impl Default for HtmlBlockRenderer {
    fn default() -> Self {
        Self::new(RawHtmlPolicy::default())
    }
}

static SANITIZING_RENDERER: Lazy<Arc<HtmlBlockRenderer>> =
    Lazy::new(|| Arc::new(HtmlBlockRenderer::new(RawHtmlPolicy::Sanitize)));

static TRUSTED_RENDERER: Lazy<Arc<HtmlBlockRenderer>> =
    Lazy::new(|| Arc::new(HtmlBlockRenderer::new(RawHtmlPolicy::Trusted)));

/// Shared renderer for the given policy, built on first use.
pub fn block_renderer(policy: RawHtmlPolicy) -> Arc<HtmlBlockRenderer> {
    match policy {
        RawHtmlPolicy::Sanitize => Arc::clone(&SANITIZING_RENDERER),
        RawHtmlPolicy::Trusted => Arc::clone(&TRUSTED_RENDERER),
    }
}

impl BlockRenderer for HtmlBlockRenderer {
    fn render_block(&self, block: &Block) -> String {
        record_render(block);

        match &block.kind {
            BlockKind::Text(text) => markup::text(text),
            BlockKind::Heading(heading) => markup::heading(heading),
            BlockKind::Image(image) => markup::image(image),
            BlockKind::Html(raw) => markup::raw("block-html", &self.raw_markup(&raw.content)),
            BlockKind::Ai(raw) => markup::raw("block-ai", &self.raw_markup(&raw.content)),
            BlockKind::List(list) => markup::list(list),
            BlockKind::Quote(quote) => markup::quote(quote),
            BlockKind::Divider => markup::divider(),
            BlockKind::Callout(callout) => markup::callout(callout),
            BlockKind::Unsupported(unsupported) => {
                warn!(
                    target = "application::render",
                    block_id = block.id.as_deref().unwrap_or(""),
                    block_type = %unsupported.type_name,
                    "unsupported block type rendered as placeholder"
                );
                markup::unsupported(&unsupported.type_name)
            }
        }
    }
}

fn record_render(block: &Block) {
    let label = match &block.kind {
        BlockKind::Unsupported(_) => {
            counter!("tessera_blocks_unsupported_total").increment(1);
            "unsupported"
        }
        kind => kind.type_name(),
    };
    counter!("tessera_blocks_rendered_total", "type" => label.to_string()).increment(1);
}
