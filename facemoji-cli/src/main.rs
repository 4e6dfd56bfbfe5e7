use std::fs::{self, File};

use anyhow::{Context, Result};
use clap::Parser;
use facemoji_core::{AccessGate, EditorSession, FaceDetector, FontGlyphPainter, ImageSource, YuNetDetector};
use facemoji_utils::{OutputOptions, configure_telemetry, init_logging, normalize_path};
use log::info;

mod args;
mod config;
mod input;
mod pipeline;
mod types;

use crate::{
    args::FacemojiArgs,
    config::{apply_cli_overrides, load_settings},
    input::collect_targets,
    pipeline::{ExportTarget, export_session, parse_placement, prepare_session},
};

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = FacemojiArgs::parse();

    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    let gate = AccessGate::from_settings(&settings.access);
    if !gate.is_open() {
        let attempt = args
            .secret
            .as_deref()
            .context("a secret is configured; pass it with --secret")?;
        gate.unlock(attempt)?;
    }

    let input_path = normalize_path(&args.input)?;
    let placements = args
        .place
        .iter()
        .map(|raw| parse_placement(raw))
        .collect::<Result<Vec<_>>>()?;
    let target = match (&args.archive, &args.output_dir) {
        (Some(archive), _) => ExportTarget::Archive(archive.clone()),
        (None, Some(dir)) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
            ExportTarget::Directory(normalize_path(dir)?)
        }
        (None, None) => anyhow::bail!("pass --output-dir or --archive"),
    };

    let painter = FontGlyphPainter::from_settings(&settings.render)
        .context("a glyph font is required for export (set render.font_path or pass --font)")?;
    let options = OutputOptions::from_export_settings(&settings.export);

    let detector = if args.no_detect {
        None
    } else {
        info!(
            "Loading YuNet model from {} at resolution {}x{}",
            settings.model_path.as_deref().unwrap_or_default(),
            settings.input.width,
            settings.input.height
        );
        Some(YuNetDetector::from_settings(&settings)?)
    };

    let images = collect_targets(&input_path, settings.upload.max_images)?;
    info!("Processing {} image(s)...", images.len());

    let mut session = EditorSession::new(&settings);
    session.open_images(images.into_iter().map(ImageSource::from_path).collect());
    let statuses = prepare_session(
        &mut session,
        detector.as_ref().map(|d| d as &dyn FaceDetector),
        &placements,
    );
    let summary = export_session(&session, &statuses, &painter, &options, &target)?;
    info!(
        "Exported {} image(s), {} failed",
        summary.exported, summary.failed
    );

    if let Some(json_path) = args.json.as_ref() {
        let file = File::create(json_path)
            .with_context(|| format!("failed to create JSON output {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &summary)?;
        info!("Wrote summary to {}", json_path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
