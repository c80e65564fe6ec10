//! Brandgen - logo concept studio CLI.

mod adapters;
mod brand;
mod cassette;
mod cli;
mod concepts;
mod config;
mod context;
mod error;
mod logo_image;
mod model;
mod output;
mod ports;
mod render;
mod studio;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;
use crate::context::{RecordingSession, ServiceContext};
use crate::error::StudioError;
use crate::model::{resolve_model, validate_aspect_ratio, validate_model};
use crate::output::download_concept;
use crate::render::Presenter;
use crate::studio::{Studio, StudioSettings, Submission};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "brandgen=debug" } else { "brandgen=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Run one session. Returns `Ok(false)` if concept generation failed; the
/// user-facing message has already been shown.
async fn run(cli: Cli) -> Result<bool, StudioError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(StudioError::Config)?;
    let settings = resolve_settings(&cli, &config)?;
    debug!(?settings, config = %config_path.display(), "resolved settings");

    // Rejected input must not reach a remote service.
    let brand = cli.resolve_brand()?;
    brand.validate().map_err(StudioError::InvalidArgument)?;

    let (ctx, recording) = service_context(&config)?;
    let (studio, mut events) = Studio::new(ctx.text, ctx.images, settings);

    let succeeded = match studio.submit(brand).await {
        Submission::Rejected(reason) => return Err(StudioError::InvalidArgument(reason)),
        Submission::Failed(e) => {
            debug!(error = %e, "session failed");
            false
        }
        Submission::Superseded(session) => {
            debug!(%session, "session superseded before concepts arrived");
            finish_recording(recording.as_ref());
            return Ok(true);
        }
        Submission::Ready { session, concepts } => {
            debug!(%session, concepts, "waiting for logo images");
            true
        }
    };

    let mut out: Box<dyn Write> =
        if cli.json { Box::new(io::stderr()) } else { Box::new(io::stdout()) };
    let color = !cli.json && io::stdout().is_terminal();
    let mut presenter = Presenter::new(color);
    while let Some(event) = events.recv().await {
        presenter.apply(&event, &mut out)?;
        if presenter.is_settled() {
            break;
        }
    }

    if succeeded {
        let (ready, unavailable) = presenter.counts();
        writeln!(out, "Images: {ready} ready, {unavailable} unavailable")?;
    }
    out.flush()?;

    let state = studio.snapshot();
    debug!(phase = ?state.phase(), concepts = state.concepts.len(), "session settled");
    if let Some(dir) = cli.download.as_deref() {
        for concept in &state.concepts {
            if let Some(path) = download_concept(concept, Path::new(dir))? {
                eprintln!("Saved: {}", path.display());
            }
        }
    }
    if cli.json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &state).map_err(io::Error::from)?;
        writeln!(stdout)?;
    }

    finish_recording(recording.as_ref());
    Ok(succeeded)
}

/// Resolve models and aspect ratio from flags over config defaults.
fn resolve_settings(cli: &Cli, config: &Config) -> Result<StudioSettings, StudioError> {
    let defaults = &config.defaults;
    let text_model = resolve_model(cli.text_model.as_deref().unwrap_or(&defaults.text_model));
    let image_model = resolve_model(cli.image_model.as_deref().unwrap_or(&defaults.image_model));
    validate_model(&text_model).map_err(StudioError::InvalidArgument)?;
    validate_model(&image_model).map_err(StudioError::InvalidArgument)?;

    let aspect_ratio = cli.aspect_ratio.clone().unwrap_or_else(|| defaults.aspect_ratio.clone());
    validate_aspect_ratio(&aspect_ratio).map_err(StudioError::InvalidArgument)?;

    Ok(StudioSettings {
        text_model,
        image_model,
        aspect_ratio,
        concept_count: defaults.concept_count,
    })
}

/// Pick live, recording or replaying services from the environment.
fn service_context(
    config: &Config,
) -> Result<(ServiceContext, Option<RecordingSession>), StudioError> {
    if let Ok(cassette_path) = std::env::var("BRANDGEN_REPLAY") {
        debug!(cassette = %cassette_path, "replaying");
        return Ok((ServiceContext::replaying(Path::new(&cassette_path))?, None));
    }
    let recording = std::env::var("BRANDGEN_REC").is_ok_and(|v| v == "true" || v == "1");
    if recording {
        debug!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(config)?;
        return Ok((ctx, Some(session)));
    }
    Ok((ServiceContext::live(config)?, None))
}

fn finish_recording(recording: Option<&RecordingSession>) {
    if let Some(session) = recording {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }
}
