//! Markup for each block variant.

use crate::domain::blocks::{
    Alignment, CalloutBlock, HeadingBlock, HeadingLevel, ImageBlock, ListBlock, ListType,
    QuoteBlock, TextBlock,
};

use askama::filters::{Escaper, Html};

use super::config::is_safe_image_src;

pub(crate) const IMAGE_PLACEHOLDER: &str = "No image selected";
pub(crate) const UNSUPPORTED_PREFIX: &str = "Unsupported block type: ";

pub(crate) fn alignment_class(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "text-left",
        Alignment::Center => "text-center",
        Alignment::Right => "text-right",
    }
}

/// Size on the heading scale; level six and anything that collapsed to it get
/// the smallest size.
pub(crate) fn heading_size_class(level: HeadingLevel) -> &'static str {
    match level.get() {
        1 => "text-4xl",
        2 => "text-3xl",
        3 => "text-2xl",
        4 => "text-xl",
        5 => "text-lg",
        _ => "text-base",
    }
}

pub(crate) fn text(block: &TextBlock) -> String {
    format!(
        "<p class=\"block-text {}\">{}</p>",
        alignment_class(block.alignment),
        escape_text(&block.text)
    )
}

pub(crate) fn heading(block: &HeadingBlock) -> String {
    let level = block.level.get();
    format!(
        "<h{level} class=\"block-heading {} {}\">{}</h{level}>",
        heading_size_class(block.level),
        alignment_class(block.alignment),
        escape_text(&block.text)
    )
}

pub(crate) fn image(block: &ImageBlock) -> String {
    let mut html = String::new();
    html.push_str("<figure class=\"block-image ");
    html.push_str(alignment_class(block.alignment));
    html.push_str("\">");

    if is_safe_image_src(&block.src) {
        html.push_str("<img src=\"");
        html.push_str(&escape_attribute(block.src.trim()));
        html.push_str("\" alt=\"");
        html.push_str(&escape_attribute(&block.alt));
        html.push_str("\" loading=\"lazy\">");
    } else {
        html.push_str("<div class=\"image-placeholder\">");
        html.push_str(IMAGE_PLACEHOLDER);
        html.push_str("</div>");
    }

    if !block.caption.is_empty() {
        html.push_str("<figcaption>");
        html.push_str(&escape_text(&block.caption));
        html.push_str("</figcaption>");
    }

    html.push_str("</figure>");
    html
}

pub(crate) fn raw(class: &str, markup: &str) -> String {
    format!("<div class=\"{class}\">{markup}</div>")
}

pub(crate) fn list(block: &ListBlock) -> String {
    let tag = match block.list_type {
        ListType::Ordered => "ol",
        ListType::Unordered => "ul",
    };

    let mut html = format!("<{tag} class=\"block-list\">");
    for item in &block.items {
        html.push_str("<li>");
        html.push_str(&escape_text(item));
        html.push_str("</li>");
    }
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
    html
}

pub(crate) fn quote(block: &QuoteBlock) -> String {
    let mut html = String::from("<blockquote class=\"block-quote\"><p>");
    html.push_str(&escape_text(&block.text));
    html.push_str("</p>");
    if !block.citation.is_empty() {
        html.push_str("<cite>");
        html.push_str(&escape_text(&block.citation));
        html.push_str("</cite>");
    }
    html.push_str("</blockquote>");
    html
}

pub(crate) fn divider() -> String {
    "<hr class=\"block-divider\">".to_string()
}

pub(crate) fn callout(block: &CalloutBlock) -> String {
    let mut html = format!(
        "<aside class=\"block-callout callout-{}\">",
        block.style.as_str()
    );
    if !block.title.is_empty() {
        html.push_str("<p class=\"callout-title\">");
        html.push_str(&escape_text(&block.title));
        html.push_str("</p>");
    }
    html.push_str("<p class=\"callout-content\">");
    html.push_str(&escape_text(&block.content));
    html.push_str("</p></aside>");
    html
}

pub(crate) fn unsupported(type_name: &str) -> String {
    format!(
        "<div class=\"block-unsupported\" data-block-type=\"{}\">{UNSUPPORTED_PREFIX}{}</div>",
        escape_attribute(type_name),
        escape_text(type_name)
    )
}

/// Escape with askama's HTML escaper so block markup matches the entities the
/// page template emits around it.
pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    // Writing into a `String` cannot fail.
    let _ = Html.write_escaped_str(&mut escaped, value);
    escaped
}

/// Like [`escape_text`], with line breaks and tabs folded to spaces.
pub(crate) fn escape_attribute(value: &str) -> String {
    let folded: String = value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect();
    escape_text(&folded)
}
