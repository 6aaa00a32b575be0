use std::{
    io::{self, Read, Write},
    path::Path,
    process,
};

use tessera::{
    application::{
        assistant::{AssistantError, AssistantPanel},
        error::AppError,
        page::PageRenderer,
        preview::{PreviewEvent, PreviewHost, PreviewState},
    },
    config::{self, AssistArgs, Command, PreviewArgs, RenderArgs, Settings},
    domain::pages::PageDocument,
    infra::{assistant::HttpTextGenerator, error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.chain().join(": ");
    if dispatcher::has_been_set() {
        error!(error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        Command::Render(args) => run_render(&settings, args).await,
        Command::Preview(args) => run_preview(&settings, args).await,
        Command::Assist(args) => run_assist(&settings, args).await,
    }
}

async fn run_render(settings: &Settings, args: RenderArgs) -> Result<(), AppError> {
    let document = read_document(&args.page).await?;
    let renderer = PageRenderer::with_policy(settings.render.raw_html);
    let html = renderer.render_document(&document)?;

    info!(
        page = %args.page.display(),
        raw_html = settings.render.raw_html.as_str(),
        "rendered page"
    );
    write_output(args.output.as_deref(), &html).await
}

async fn run_preview(settings: &Settings, args: PreviewArgs) -> Result<(), AppError> {
    let document = read_document(&args.page).await?;
    let renderer = PageRenderer::with_policy(settings.render.raw_html);
    let mut host = PreviewHost::with_state(
        renderer,
        PreviewState::new(settings.preview.default_viewport),
    );
    host.dispatch(PreviewEvent::Open);

    let html = host
        .render(&document.metadata, &document.blocks())?
        .ok_or_else(|| AppError::unexpected("preview did not open"))?;

    info!(
        page = %args.page.display(),
        viewport = host.state().viewport.as_str(),
        "rendered preview"
    );
    write_output(args.output.as_deref(), &html).await
}

async fn run_assist(settings: &Settings, args: AssistArgs) -> Result<(), AppError> {
    let endpoint = settings
        .assistant
        .endpoint
        .clone()
        .ok_or(AssistantError::NotConfigured)?;
    let generator = HttpTextGenerator::new(endpoint, settings.assistant.api_key.clone())?;
    let mut panel = AssistantPanel::new(generator);

    let reply = panel.send(&args.prompt).await?;

    let output = if args.as_block {
        let block = panel
            .conversation()
            .latest_reply_block()
            .ok_or_else(|| AppError::unexpected("assistant reply missing from conversation"))?;
        serde_json::to_string_pretty(&block)
            .map_err(|err| AppError::unexpected(format!("failed to encode block: {err}")))?
    } else {
        reply
    };

    write_output(None, &output).await
}

async fn read_document(path: &Path) -> Result<PageDocument, AppError> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(InfraError::from)?;
        buffer
    } else {
        tokio::fs::read_to_string(path)
            .await
            .map_err(InfraError::from)?
    };

    PageDocument::from_json(&raw).map_err(AppError::from)
}

async fn write_output(path: Option<&Path>, contents: &str) -> Result<(), AppError> {
    match path {
        Some(path) => tokio::fs::write(path, contents)
            .await
            .map_err(InfraError::from)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(InfraError::from)?;
        }
    }
    Ok(())
}
