//! Batch editing: load, detect, place and export every image of a run.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use facemoji_core::{
    DetectionOutcome, EditorSession, ExportItem, FaceDetector, GlyphPainter, Point,
    export_archive_to_path, export_single,
};
use facemoji_utils::{OutputOptions, load_image};
use log::{info, warn};

use crate::types::{ImageRecord, OverlayRecord, RunSummary};

/// Where edited images go.
#[derive(Debug, Clone)]
pub enum ExportTarget {
    Directory(PathBuf),
    Archive(PathBuf),
}

/// Per-image outcome of [`prepare_session`].
#[derive(Debug, Default, Clone)]
pub struct ImageStatus {
    pub faces: Option<usize>,
    pub error: Option<String>,
}

/// Parse an `X,Y` placement into a point.
pub fn parse_placement(raw: &str) -> Result<Point> {
    let (x, y) = raw
        .split_once(',')
        .with_context(|| format!("invalid placement '{raw}', expected X,Y"))?;
    let x: f32 = x
        .trim()
        .parse()
        .with_context(|| format!("invalid x coordinate in '{raw}'"))?;
    let y: f32 = y
        .trim()
        .parse()
        .with_context(|| format!("invalid y coordinate in '{raw}'"))?;
    anyhow::ensure!(
        x.is_finite() && y.is_finite(),
        "placement '{raw}' is not finite"
    );
    Ok(Point::new(x, y))
}

/// Walk every opened image in order: decode it, run detection when a detector is given,
/// then add the requested manual overlays.
///
/// Images that fail to decode are reported and left without overlays.
pub fn prepare_session(
    session: &mut EditorSession,
    detector: Option<&dyn FaceDetector>,
    placements: &[Point],
) -> Vec<ImageStatus> {
    session.set_detector_ready(detector.is_some());
    let count = session.images().len();
    let mut statuses = Vec::with_capacity(count);

    for index in 0..count {
        session.select_image(index);
        let Some(entry) = session.images().get(index) else {
            break;
        };
        let id = entry.id;
        let path = entry.path().to_path_buf();
        let mut status = ImageStatus::default();

        let pixels = match load_image(&path) {
            Ok(pixels) => Arc::new(pixels),
            Err(err) => {
                warn!("{err:#}");
                status.error = Some(format!("{err:#}"));
                statuses.push(status);
                continue;
            }
        };

        if let Some(request) = session.on_image_loaded(id, pixels)
            && let Some(detector) = detector
        {
            let result = detector.detect(&request.image);
            match session.apply_detection(request.ticket, result) {
                DetectionOutcome::Applied(faces) => {
                    info!("{} -> {faces} face(s)", path.display());
                    status.faces = Some(faces);
                }
                DetectionOutcome::Failed(err) => status.error = Some(err),
                DetectionOutcome::Stale => {}
            }
        }

        for point in placements {
            if let Err(err) = session.add_overlay(Some(*point)) {
                warn!("Could not place overlay on {}: {err}", path.display());
            }
        }
        statuses.push(status);
    }
    statuses
}

/// Export every image of `session` to `target` and describe the run.
pub fn export_session(
    session: &EditorSession,
    statuses: &[ImageStatus],
    painter: &dyn GlyphPainter,
    options: &OutputOptions,
    target: &ExportTarget,
) -> Result<RunSummary> {
    let items = session.export_items();
    let mut records: Vec<ImageRecord> = items
        .iter()
        .zip(session.images())
        .map(|(item, entry)| {
            let status = statuses
                .get(item.position - 1)
                .cloned()
                .unwrap_or_default();
            ImageRecord {
                position: item.position,
                image: entry.path().display().to_string(),
                faces: status.faces,
                overlays: item.overlays.iter().map(OverlayRecord::from).collect(),
                output: None,
                error: status.error,
            }
        })
        .collect();

    let archive = match target {
        ExportTarget::Directory(dir) => {
            export_to_directory(&items, &mut records, painter, options, dir);
            None
        }
        ExportTarget::Archive(path) => {
            let report = export_archive_to_path(&items, painter, options, path)?;
            for (item, record) in items.iter().zip(records.iter_mut()) {
                let name = item.file_name(options);
                if report.written.contains(&name) {
                    record.output = Some(name);
                }
            }
            for failure in report.failures {
                if let Some(record) = records.get_mut(failure.position - 1) {
                    record.error = Some(failure.error);
                }
            }
            Some(path.display().to_string())
        }
    };

    let exported = records.iter().filter(|r| r.output.is_some()).count();
    Ok(RunSummary {
        archive,
        exported,
        failed: records.len() - exported,
        images: records,
    })
}

fn export_to_directory(
    items: &[ExportItem],
    records: &mut [ImageRecord],
    painter: &dyn GlyphPainter,
    options: &OutputOptions,
    dir: &Path,
) {
    for (item, record) in items.iter().zip(records.iter_mut()) {
        match export_single(item, painter, options, dir) {
            Ok(path) => record.output = Some(path.display().to_string()),
            Err(err) => {
                warn!("Failed to export {}: {err:#}", record.image);
                record.error = Some(format!("{err:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facemoji_core::{DetectionOutput, Extent, FaceBox, Glyph, ImageSource};
    use facemoji_utils::config::AppSettings;
    use image::{DynamicImage, RgbaImage};

    struct OneFace;

    impl FaceDetector for OneFace {
        fn detect(&self, _image: &DynamicImage) -> Result<DetectionOutput> {
            Ok(DetectionOutput {
                boxes: vec![FaceBox::new(4.0, 4.0, 20.0, 20.0)],
                space: Extent::default(),
            })
        }
    }

    struct NoopPainter;

    impl GlyphPainter for NoopPainter {
        fn paint(&self, _: &mut RgbaImage, _: &Glyph, _: f32, _: f32, _: f32) {}
    }

    fn write_inputs(dir: &Path, names: &[&str]) -> Vec<ImageSource> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                DynamicImage::new_rgb8(48, 32).save(&path).expect("save input");
                ImageSource::from_path(path)
            })
            .collect()
    }

    #[test]
    fn placements_parse_and_reject_garbage() {
        assert_eq!(
            parse_placement(" 12.5, 40 ").expect("point"),
            Point::new(12.5, 40.0)
        );
        assert!(parse_placement("12").is_err());
        assert!(parse_placement("a,b").is_err());
        assert!(parse_placement("inf,0").is_err());
    }

    #[test]
    fn detection_and_placements_fill_every_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = EditorSession::new(&AppSettings::default());
        session.open_images(write_inputs(dir.path(), &["a.png", "b.png"]));

        let statuses = prepare_session(&mut session, Some(&OneFace), &[Point::new(30.0, 16.0)]);
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.faces == Some(1) && s.error.is_none()));
        for entry in session.images() {
            assert_eq!(session.store().overlays(entry.id).expect("list").len(), 2);
        }
    }

    #[test]
    fn unreadable_images_are_reported_and_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"not a png").expect("write");
        let mut sources = write_inputs(dir.path(), &["ok.png"]);
        sources.push(ImageSource::from_path(&broken));

        let mut session = EditorSession::new(&AppSettings::default());
        session.open_images(sources);
        let statuses = prepare_session(&mut session, None, &[]);
        assert!(statuses[0].error.is_none());
        assert!(statuses[1].error.is_some());

        let out = dir.path().join("out");
        let summary = export_session(
            &session,
            &statuses,
            &NoopPainter,
            &OutputOptions::default(),
            &ExportTarget::Directory(out.clone()),
        )
        .expect("export");
        assert_eq!(summary.exported, 1);
        assert_eq!(summary.failed, 1);
        assert!(out.join("image-1.png").exists());
        assert!(!out.join("image-2.png").exists());
    }

    #[test]
    fn archive_records_entry_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = EditorSession::new(&AppSettings::default());
        session.open_images(write_inputs(dir.path(), &["x.png", "y.png"]));
        let statuses = prepare_session(&mut session, None, &[Point::new(10.0, 10.0)]);

        let archive = dir.path().join("nested/out.zip");
        let summary = export_session(
            &session,
            &statuses,
            &NoopPainter,
            &OutputOptions::default(),
            &ExportTarget::Archive(archive.clone()),
        )
        .expect("export");
        assert!(archive.exists());
        assert_eq!(summary.exported, 2);
        assert_eq!(summary.images[1].output.as_deref(), Some("image-2.png"));
        assert_eq!(summary.images[0].overlays.len(), 1);
        assert_eq!(summary.images[0].overlays[0].size, 64.0);
    }
}
