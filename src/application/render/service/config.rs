use std::{borrow::Cow, collections::HashSet};

use ammonia::Builder as AmmoniaBuilder;
use url::Url;

/// Sanitiser applied to `html` and `ai` blocks under [`RawHtmlPolicy::Sanitize`].
///
/// Ordinary content markup survives together with inline `style` and `data-*`
/// attributes; scripts, event handlers and script URLs do not.
///
/// [`RawHtmlPolicy::Sanitize`]: crate::application::render::RawHtmlPolicy::Sanitize
pub(crate) fn build_raw_block_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "article",
        "aside",
        "b",
        "blockquote",
        "br",
        "caption",
        "cite",
        "code",
        "dd",
        "del",
        "details",
        "div",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "footer",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "header",
        "hr",
        "i",
        "img",
        "ins",
        "kbd",
        "li",
        "mark",
        "ol",
        "p",
        "picture",
        "pre",
        "s",
        "section",
        "small",
        "source",
        "span",
        "strong",
        "style",
        "sub",
        "summary",
        "sup",
        "table",
        "tbody",
        "td",
        "tfoot",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
        "video",
        "audio",
        "track",
    ]);
    builder.tags(tags);
    builder.rm_clean_content_tags(&["style"]);

    let generic: HashSet<&'static str> = HashSet::from([
        "class", "id", "title", "lang", "dir", "style", "role", "aria-hidden", "aria-label",
    ]);
    builder.generic_attributes(generic);
    builder.add_generic_attribute_prefixes(&["data-"]);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes(
        "img",
        &["title", "width", "height", "alt", "loading", "decoding"],
    );
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("ol", &["start", "type"]);
    builder.add_tag_attributes("video", &["controls", "poster", "width", "height"]);
    builder.add_tag_attributes("audio", &["controls"]);
    builder.add_tag_attributes("source", &["src", "srcset", "type", "media"]);
    builder.add_tag_attributes("track", &["src", "kind", "srclang", "label"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder.attribute_filter(|_element, attribute, value| {
        if attribute.eq_ignore_ascii_case("style") {
            filter_inline_style(value).map(Cow::Owned)
        } else {
            Some(Cow::Borrowed(value))
        }
    });

    builder
}

/// Whether an image block `src` may be emitted. Relative paths, http(s) and
/// inline `data:image/` URLs pass; every other scheme is refused.
pub(crate) fn is_safe_image_src(src: &str) -> bool {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return false;
    }

    match Url::parse(trimmed) {
        Ok(url) => match url.scheme() {
            "http" | "https" => true,
            "data" => trimmed[5..].trim_start().to_ascii_lowercase().starts_with("image/"),
            _ => false,
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => !trimmed.contains(':')
            || trimmed.starts_with('/')
            || trimmed.starts_with("./"),
        Err(_) => false,
    }
}

const STYLE_DENYLIST: [&str; 7] = [
    "expression(",
    "javascript:",
    "vbscript:",
    "-moz-binding",
    "behavior:",
    "behaviour:",
    "@import",
];

/// Keep only the inline style declarations that cannot run script or load
/// non-image data. `None` drops the attribute entirely.
fn filter_inline_style(value: &str) -> Option<String> {
    let kept: Vec<&str> = value
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| style_declaration_allowed(declaration))
        .collect();

    (!kept.is_empty()).then(|| kept.join("; "))
}

fn style_declaration_allowed(declaration: &str) -> bool {
    let lower = declaration.to_ascii_lowercase();
    !STYLE_DENYLIST.iter().any(|needle| lower.contains(needle)) && !has_forbidden_url(&lower)
}

fn has_forbidden_url(declaration: &str) -> bool {
    let mut rest = declaration;
    while let Some(start) = rest.find("url(") {
        let after = &rest[start + 4..];
        let Some(end) = after.find(')') else {
            return true;
        };
        let target = after[..end].trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"');
        if forbidden_url_target(target) {
            return true;
        }
        rest = &after[end + 1..];
    }
    false
}

fn forbidden_url_target(target: &str) -> bool {
    if target.starts_with("data:image/") {
        return false;
    }
    ["data:", "file:"].iter().any(|scheme| target.starts_with(scheme))
        || ["javascript:", "vbscript:"].iter().any(|scheme| target.contains(scheme))
}
