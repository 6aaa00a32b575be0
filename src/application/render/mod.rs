//! Block rendering.
//!
//! The renderer is pure: it reads normalised blocks and produces markup. It
//! never mutates blocks and never fails; anything it cannot make sense of is
//! rendered as a visible placeholder.

mod service;
mod types;

pub use service::{HtmlBlockRenderer, block_renderer};
pub use types::{BlockRenderer, RawHtmlPolicy, RenderError};
