//! Live preview host.
//!
//! Preview state is a plain value owned by the editing screen and advanced by
//! [`PreviewState::reduce`]. Rendering re-runs the page renderer on every call;
//! there is no caching between edits.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::page::PageRenderer;
use crate::application::render::RenderError;
use crate::domain::blocks::Block;
use crate::domain::pages::PageMetadata;
use crate::presentation::views::{
    PreviewFrameTemplate, PreviewFrameView, ViewportOptionView, render_template,
};

const SOURCE: &str = "application::preview";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewport {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Viewport {
    pub const ALL: [Viewport; 3] = [Viewport::Mobile, Viewport::Tablet, Viewport::Desktop];

    pub fn as_str(self) -> &'static str {
        match self {
            Viewport::Mobile => "mobile",
            Viewport::Tablet => "tablet",
            Viewport::Desktop => "desktop",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Viewport::Mobile => "Mobile",
            Viewport::Tablet => "Tablet",
            Viewport::Desktop => "Desktop",
        }
    }

    /// Frame width in CSS pixels; desktop is unconstrained.
    pub fn max_width_px(self) -> Option<u32> {
        match self {
            Viewport::Mobile => Some(375),
            Viewport::Tablet => Some(768),
            Viewport::Desktop => None,
        }
    }

    fn frame_style(self) -> String {
        match self.max_width_px() {
            Some(width) => format!("max-width: {width}px; margin: 0 auto;"),
            None => "width: 100%;".to_string(),
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Viewport::Mobile),
            "tablet" => Ok(Viewport::Tablet),
            "desktop" => Ok(Viewport::Desktop),
            other => Err(format!(
                "unknown viewport `{other}` (expected mobile|tablet|desktop)"
            )),
        }
    }
}

/// User-triggered preview transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEvent {
    Open,
    Close,
    Toggle,
    SelectViewport(Viewport),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub visibility: Visibility,
    pub viewport: Viewport,
}

impl PreviewState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            visibility: Visibility::Closed,
            viewport,
        }
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    /// Apply one event. Viewport selection is remembered while closed.
    pub fn reduce(self, event: PreviewEvent) -> Self {
        match event {
            PreviewEvent::Open => Self {
                visibility: Visibility::Open,
                ..self
            },
            PreviewEvent::Close => Self {
                visibility: Visibility::Closed,
                ..self
            },
            PreviewEvent::Toggle => Self {
                visibility: match self.visibility {
                    Visibility::Open => Visibility::Closed,
                    Visibility::Closed => Visibility::Open,
                },
                ..self
            },
            PreviewEvent::SelectViewport(viewport) => Self { viewport, ..self },
        }
    }
}

/// Wraps page renders in a viewport-constrained frame.
#[derive(Clone)]
pub struct PreviewHost {
    renderer: PageRenderer,
    state: PreviewState,
}

impl PreviewHost {
    pub fn new(renderer: PageRenderer) -> Self {
        Self {
            renderer,
            state: PreviewState::default(),
        }
    }

    pub fn with_state(renderer: PageRenderer, state: PreviewState) -> Self {
        Self { renderer, state }
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn dispatch(&mut self, event: PreviewEvent) -> PreviewState {
        let next = self.state.reduce(event);
        debug!(
            target = SOURCE,
            ?event,
            open = next.is_open(),
            viewport = next.viewport.as_str(),
            "preview state changed"
        );
        self.state = next;
        next
    }

    /// Current preview markup, or `None` while the preview is closed.
    pub fn render(
        &self,
        metadata: &PageMetadata,
        blocks: &[Block],
    ) -> Result<Option<String>, RenderError> {
        if !self.state.is_open() {
            return Ok(None);
        }
        self.render_frame(metadata, blocks).map(Some)
    }

    /// Render the frame for the current viewport regardless of visibility.
    pub fn render_frame(
        &self,
        metadata: &PageMetadata,
        blocks: &[Block],
    ) -> Result<String, RenderError> {
        let page_html = self.renderer.render(metadata, blocks)?;
        let viewport = self.state.viewport;
        let options = Viewport::ALL
            .iter()
            .map(|option| ViewportOptionView {
                key: option.as_str(),
                label: option.label(),
                active: *option == viewport,
            })
            .collect();

        render_template(
            PreviewFrameTemplate {
                view: PreviewFrameView {
                    viewport: viewport.as_str(),
                    frame_style: viewport.frame_style(),
                    options,
                    page_html,
                },
            },
            SOURCE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_visibility_and_keeps_viewport() {
        let state = PreviewState::new(Viewport::Tablet).reduce(PreviewEvent::Toggle);
        assert!(state.is_open());
        assert_eq!(state.viewport, Viewport::Tablet);

        let state = state.reduce(PreviewEvent::Toggle);
        assert_eq!(state.visibility, Visibility::Closed);
    }

    #[test]
    fn viewport_selection_survives_close_and_reopen() {
        let state = PreviewState::default()
            .reduce(PreviewEvent::Open)
            .reduce(PreviewEvent::SelectViewport(Viewport::Mobile))
            .reduce(PreviewEvent::Close)
            .reduce(PreviewEvent::Open);
        assert_eq!(state.viewport, Viewport::Mobile);
        assert!(state.is_open());
    }

    #[test]
    fn open_and_close_are_idempotent() {
        let open = PreviewState::default().reduce(PreviewEvent::Open);
        assert_eq!(open.reduce(PreviewEvent::Open), open);
        let closed = open.reduce(PreviewEvent::Close);
        assert_eq!(closed.reduce(PreviewEvent::Close), closed);
    }

    #[test]
    fn viewport_widths() {
        assert_eq!(Viewport::Mobile.max_width_px(), Some(375));
        assert_eq!(Viewport::Tablet.max_width_px(), Some(768));
        assert_eq!(Viewport::Desktop.max_width_px(), None);
        assert_eq!("TABLET".parse::<Viewport>(), Ok(Viewport::Tablet));
        assert!("watch".parse::<Viewport>().is_err());
    }
}
