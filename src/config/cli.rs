use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::application::preview::Viewport;
use crate::application::render::RawHtmlPolicy;

/// Command-line arguments for the Tessera binary.
#[derive(Debug, Parser)]
#[command(
    name = "tessera",
    version,
    about = "Render content-block pages to HTML previews"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TESSERA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a page document to a standalone HTML fragment.
    Render(RenderArgs),
    /// Render a page document inside the live-preview frame.
    Preview(PreviewArgs),
    /// Ask the writing assistant for content.
    Assist(AssistArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// How html/ai block markup is treated (sanitize|trusted).
    #[arg(long = "raw-html", value_name = "POLICY")]
    pub raw_html: Option<RawHtmlPolicy>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub render: RenderOverrides,

    /// Page document (JSON); `-` reads standard input.
    #[arg(value_name = "PAGE", value_hint = ValueHint::FilePath)]
    pub page: PathBuf,

    /// Write the output here instead of standard output.
    #[arg(long, short, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub render: RenderOverrides,

    /// Page document (JSON); `-` reads standard input.
    #[arg(value_name = "PAGE", value_hint = ValueHint::FilePath)]
    pub page: PathBuf,

    /// Preview viewport (mobile|tablet|desktop).
    #[arg(long, value_name = "VIEWPORT")]
    pub viewport: Option<Viewport>,

    /// Write the output here instead of standard output.
    #[arg(long, short, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct AssistArgs {
    /// Prompt sent to the assistant.
    #[arg(long, value_name = "TEXT")]
    pub prompt: String,

    /// Override the assistant endpoint URL.
    #[arg(long = "assistant-endpoint", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Print the reply as an `ai` block (JSON) instead of plain text.
    #[arg(long = "as-block", action = clap::ArgAction::SetTrue)]
    pub as_block: bool,
}
