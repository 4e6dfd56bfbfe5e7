//! Single-image and zip exports.
//!
//! Snapshots are taken on the GUI thread; encoding and writing happen on a named worker
//! thread so the editor stays responsive. Only one export runs at a time.

use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use facemoji_core::{
    ExportItem, ExportReport, FontGlyphPainter, GlyphPainter, export_archive_to_path,
};
use facemoji_utils::{OutputOptions, write_bytes};
use log::{error, info, warn};

use crate::{FacemojiApp, JobMessage};

/// Returns the export painter, loading the configured font on first use.
pub fn ensure_painter(app: &mut FacemojiApp) -> Result<Arc<dyn GlyphPainter>, String> {
    if let Some(painter) = &app.painter {
        return Ok(painter.clone());
    }
    let painter: Arc<dyn GlyphPainter> = Arc::new(
        FontGlyphPainter::from_settings(&app.settings.render).map_err(|err| format!("{err:#}"))?,
    );
    app.painter = Some(painter.clone());
    Ok(painter)
}

/// Ask for a destination and export the active image.
pub fn export_current_dialog(app: &mut FacemojiApp) {
    use rfd::FileDialog;

    let options = OutputOptions::from_export_settings(&app.settings.export);
    let Some(item) = app.session.current_export_item() else {
        app.show_error("Nothing to save", "Open an image first.");
        return;
    };
    if let Some(path) = FileDialog::new()
        .set_file_name(item.file_name(&options))
        .add_filter("Image", &[options.format.extension()])
        .save_file()
    {
        start_single_export(app, path);
    }
}

/// Ask for a destination and export every opened image into one zip.
pub fn export_all_dialog(app: &mut FacemojiApp) {
    use rfd::FileDialog;

    if app.session.images().is_empty() {
        app.show_error("Nothing to save", "Open some images first.");
        return;
    }
    if let Some(path) = FileDialog::new()
        .set_file_name(app.settings.export.archive_name.as_str())
        .add_filter("Zip archive", &["zip"])
        .save_file()
    {
        start_archive_export(app, path);
    }
}

/// Export the active image to `target`. Returns `false` when nothing was started.
pub fn start_single_export(app: &mut FacemojiApp, target: PathBuf) -> bool {
    let Some(item) = app.session.current_export_item() else {
        return false;
    };
    let Some((painter, options)) = prepare(app) else {
        return false;
    };
    app.status_line = format!("Saving {}...", target.display());
    spawn_export(target, app.job_tx.clone(), move |target| {
        encode_single(&item, painter.as_ref(), &options, target)
    });
    true
}

/// Export every opened image into a zip at `target`. Returns `false` when nothing was started.
pub fn start_archive_export(app: &mut FacemojiApp, target: PathBuf) -> bool {
    let items = app.session.export_items();
    if items.is_empty() {
        return false;
    }
    let Some((painter, options)) = prepare(app) else {
        return false;
    };
    app.status_line = format!("Packing {} image(s)...", items.len());
    spawn_export(target, app.job_tx.clone(), move |target| {
        export_archive_to_path(&items, painter.as_ref(), &options, target)
            .map_err(|err| format!("{err:#}"))
    });
    true
}

fn prepare(app: &mut FacemojiApp) -> Option<(Arc<dyn GlyphPainter>, OutputOptions)> {
    if app.session.is_saving() {
        app.show_error("Export busy", "Wait for the current export to finish.");
        return None;
    }
    let painter = match ensure_painter(app) {
        Ok(painter) => painter,
        Err(err) => {
            app.show_error("Export failed", format!("Unable to load glyph font: {err}"));
            return None;
        }
    };
    app.session.begin_saving();
    Some((
        painter,
        OutputOptions::from_export_settings(&app.settings.export),
    ))
}

fn encode_single(
    item: &ExportItem,
    painter: &dyn GlyphPainter,
    options: &OutputOptions,
    target: &std::path::Path,
) -> Result<ExportReport, String> {
    let bytes = item
        .encode(painter, options)
        .map_err(|err| format!("{err:#}"))?;
    write_bytes(target, &bytes).map_err(|err| format!("{err:#}"))?;
    info!("Saved {}", target.display());
    Ok(ExportReport {
        written: vec![item.file_name(options)],
        failures: Vec::new(),
    })
}

fn spawn_export<F>(target: PathBuf, job_tx: mpsc::Sender<JobMessage>, job: F)
where
    F: FnOnce(&std::path::Path) -> Result<ExportReport, String> + Send + 'static,
{
    let fallback_tx = job_tx.clone();
    let fallback_target = target.clone();
    let spawned = std::thread::Builder::new()
        .name("facemoji-export".into())
        .spawn(move || {
            let result = job(&target);
            if job_tx
                .send(JobMessage::ExportFinished { target, result })
                .is_err()
            {
                error!("GUI dropped export result");
            }
        });
    if let Err(err) = spawned {
        warn!("Failed to start export worker: {err}");
        let _ = fallback_tx.send(JobMessage::ExportFinished {
            target: fallback_target,
            result: Err(format!("failed to start export worker: {err}")),
        });
    }
}
