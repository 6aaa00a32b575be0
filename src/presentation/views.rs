use askama::{Error as AskamaError, Template};
use thiserror::Error;

use crate::application::render::RenderError;

/// Askama failure tagged with the component that asked for the render.
#[derive(Debug, Error)]
#[error("failed to render `{template}` for {origin}")]
pub struct TemplateRenderError {
    origin: &'static str,
    template: &'static str,
    #[source]
    error: AskamaError,
}

impl From<TemplateRenderError> for RenderError {
    fn from(err: TemplateRenderError) -> Self {
        RenderError::template(err.template, format!("{}: {}", err.origin, err.error))
    }
}

/// Render `template`; `origin` names the caller in the resulting error.
pub fn render_template<T: Template>(template: T, origin: &'static str) -> Result<String, RenderError> {
    template.render().map_err(|error| {
        TemplateRenderError {
            origin,
            template: std::any::type_name::<T>(),
            error,
        }
        .into()
    })
}

/// One rendered block inside the page body.
#[derive(Clone, Debug)]
pub struct BlockView {
    pub key: String,
    pub type_name: String,
    pub html: String,
}

#[derive(Clone, Debug)]
pub struct PublishedView {
    pub label: String,
    pub iso: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PageView {
    pub title: String,
    pub description: Option<String>,
    pub status_key: &'static str,
    pub status_label: &'static str,
    pub author: Option<String>,
    pub published: Option<PublishedView>,
    pub blocks: Vec<BlockView>,
    pub path: String,
}

#[derive(Template)]
#[template(path = "preview/page.html")]
pub struct PageTemplate {
    pub view: PageView,
}

#[derive(Clone, Debug)]
pub struct ViewportOptionView {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Clone, Debug)]
pub struct PreviewFrameView {
    pub viewport: &'static str,
    pub frame_style: String,
    pub options: Vec<ViewportOptionView>,
    pub page_html: String,
}

#[derive(Template)]
#[template(path = "preview/frame.html")]
pub struct PreviewFrameTemplate {
    pub view: PreviewFrameView,
}
