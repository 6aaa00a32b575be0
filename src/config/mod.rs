//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::str::FromStr;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::preview::Viewport;
use crate::application::render::RawHtmlPolicy;

pub use cli::{
    AssistArgs, CliArgs, Command, LoggingOverrides, PreviewArgs, RenderArgs, RenderOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "tessera";
const ENV_PREFIX: &str = "TESSERA";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderSettings,
    pub preview: PreviewSettings,
    pub assistant: AssistantSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub raw_html: RawHtmlPolicy,
}

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub default_viewport: Viewport,
}

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub endpoint: Option<Url>,
    pub api_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_cli(cli);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    render: RawRenderSettings,
    preview: RawPreviewSettings,
    assistant: RawAssistantSettings,
}

impl RawSettings {
    fn apply_cli(&mut self, cli: &CliArgs) {
        self.apply_logging_overrides(&cli.logging);

        match &cli.command {
            Command::Render(args) => self.apply_render_overrides(&args.render),
            Command::Preview(args) => {
                self.apply_render_overrides(&args.render);
                if let Some(viewport) = args.viewport {
                    self.preview.default_viewport = Some(viewport.as_str().to_string());
                }
            }
            Command::Assist(args) => {
                if let Some(endpoint) = args.endpoint.as_ref() {
                    self.assistant.endpoint = Some(endpoint.clone());
                }
            }
        }
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(policy) = overrides.raw_html {
            self.render.raw_html = Some(policy.as_str().to_string());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            render,
            preview,
            assistant,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            render: build_render_settings(render)?,
            preview: build_preview_settings(preview)?,
            assistant: build_assistant_settings(assistant)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let raw_html = match render.raw_html {
        Some(value) => RawHtmlPolicy::from_str(&value)
            .map_err(|reason| LoadError::invalid("render.raw_html", reason))?,
        None => RawHtmlPolicy::default(),
    };

    Ok(RenderSettings { raw_html })
}

fn build_preview_settings(preview: RawPreviewSettings) -> Result<PreviewSettings, LoadError> {
    let default_viewport = match preview.default_viewport {
        Some(value) => Viewport::from_str(&value)
            .map_err(|reason| LoadError::invalid("preview.default_viewport", reason))?,
        None => Viewport::default(),
    };

    Ok(PreviewSettings { default_viewport })
}

fn build_assistant_settings(
    assistant: RawAssistantSettings,
) -> Result<AssistantSettings, LoadError> {
    let endpoint = match non_empty(assistant.endpoint) {
        Some(value) => {
            let url = Url::parse(&value).map_err(|err| {
                LoadError::invalid("assistant.endpoint", format!("invalid url `{value}`: {err}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "assistant.endpoint",
                    "scheme must be http or https",
                ));
            }
            Some(url)
        }
        None => None,
    };

    Ok(AssistantSettings {
        endpoint,
        api_key: non_empty(assistant.api_key),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    raw_html: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPreviewSettings {
    default_viewport: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAssistantSettings {
    endpoint: Option<String>,
    api_key: Option<String>,
}
