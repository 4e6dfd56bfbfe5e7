//! Rendering and encoding edited images, one at a time or as a zip archive.

use std::{
    fs::File,
    io::{BufWriter, Seek, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use facemoji_utils::{ImageFormatHint, OutputOptions, encode_image, load_image, write_bytes};
use image::DynamicImage;
use log::{info, warn};
use rayon::prelude::*;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::overlay::Overlay;
use crate::render::{GlyphPainter, render_overlays};

/// File name for the image at 1-based upload `position`.
pub fn export_name(position: usize, format: ImageFormatHint) -> String {
    format!("image-{position}.{}", format.extension())
}

/// Pixels for an export, either already decoded or still on disk.
#[derive(Debug, Clone)]
pub enum ExportSource {
    Decoded(Arc<DynamicImage>),
    Path(PathBuf),
}

impl ExportSource {
    fn load(&self) -> Result<Arc<DynamicImage>> {
        match self {
            ExportSource::Decoded(image) => Ok(image.clone()),
            ExportSource::Path(path) => load_image(path).map(Arc::new),
        }
    }
}

/// One image to export with its overlays already converted to natural space.
#[derive(Debug, Clone)]
pub struct ExportItem {
    /// 1-based upload position, used for the output name.
    pub position: usize,
    pub source: ExportSource,
    pub overlays: Arc<[Overlay]>,
}

impl ExportItem {
    pub fn file_name(&self, options: &OutputOptions) -> String {
        export_name(self.position, options.format)
    }

    /// Render overlays and encode the result.
    pub fn encode(&self, painter: &dyn GlyphPainter, options: &OutputOptions) -> Result<Vec<u8>> {
        let image = self.source.load()?;
        let rendered = render_overlays(&image, &self.overlays, painter);
        encode_image(&DynamicImage::ImageRgba8(rendered), options)
            .with_context(|| format!("failed to encode {}", self.file_name(options)))
    }
}

/// An image that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub position: usize,
    pub error: String,
}

/// Outcome of a batch export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Entry names written, in upload order.
    pub written: Vec<String>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render, encode and write one image into `directory`. Returns the written path.
pub fn export_single(
    item: &ExportItem,
    painter: &dyn GlyphPainter,
    options: &OutputOptions,
    directory: &Path,
) -> Result<PathBuf> {
    let bytes = item.encode(painter, options)?;
    let target = directory.join(item.file_name(options));
    write_bytes(&target, &bytes)?;
    info!("Exported {}", target.display());
    Ok(target)
}

/// Render every item in parallel and write one zip entry per success, in upload order.
///
/// Failing images are recorded in the report and skipped; the archive still contains
/// every other entry.
pub fn export_archive<W>(
    items: &[ExportItem],
    painter: &dyn GlyphPainter,
    options: &OutputOptions,
    writer: W,
) -> Result<ExportReport>
where
    W: Write + Seek,
{
    let _guard = facemoji_utils::timing_guard("facemoji_core::export_archive", log::Level::Debug);
    let mut ordered: Vec<(usize, String, Result<Vec<u8>>)> = items
        .par_iter()
        .map(|item| {
            (
                item.position,
                item.file_name(options),
                item.encode(painter, options),
            )
        })
        .collect();
    ordered.sort_by_key(|(position, _, _)| *position);

    // Entries are already compressed image formats.
    let entry_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut zip = ZipWriter::new(writer);
    let mut report = ExportReport::default();
    for (position, name, result) in ordered {
        match result {
            Ok(bytes) => {
                zip.start_file(name.as_str(), entry_options)
                    .with_context(|| format!("failed to start archive entry {name}"))?;
                zip.write_all(&bytes)
                    .with_context(|| format!("failed to write archive entry {name}"))?;
                report.written.push(name);
            }
            Err(err) => {
                warn!("Skipping {name} in archive: {err:#}");
                report.failures.push(ExportFailure {
                    position,
                    error: format!("{err:#}"),
                });
            }
        }
    }
    zip.finish().context("failed to finalize archive")?;
    Ok(report)
}

/// [`export_archive`] into a file at `path`, creating parent directories.
pub fn export_archive_to_path(
    items: &[ExportItem],
    painter: &dyn GlyphPainter,
    options: &OutputOptions,
    path: &Path,
) -> Result<ExportReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create archive {}", path.display()))?;
    let report = export_archive(items, painter, options, BufWriter::new(file))?;
    info!(
        "Wrote {} image(s) to {} ({} failed)",
        report.written.len(),
        path.display(),
        report.failures.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Glyph, OverlayId};
    use image::{Rgba, RgbaImage};
    use std::io::{Cursor, Read};

    struct DotPainter;

    impl GlyphPainter for DotPainter {
        fn paint(&self, canvas: &mut RgbaImage, _glyph: &Glyph, x: f32, baseline: f32, _size: f32) {
            if let Some(pixel) = canvas.get_pixel_mut_checked(x as u32, (baseline - 1.0) as u32) {
                *pixel = Rgba([0, 255, 0, 255]);
            }
        }
    }

    fn decoded(width: u32, height: u32) -> ExportSource {
        ExportSource::Decoded(Arc::new(DynamicImage::new_rgba8(width, height)))
    }

    fn overlay(x: f32, y: f32, size: f32) -> Overlay {
        Overlay {
            id: OverlayId::from_raw(1),
            x,
            y,
            size,
            glyph: Glyph::new("😎").expect("glyph"),
        }
    }

    #[test]
    fn names_follow_upload_position_and_format() {
        assert_eq!(export_name(1, ImageFormatHint::Png), "image-1.png");
        assert_eq!(export_name(12, ImageFormatHint::Jpeg), "image-12.jpg");
    }

    #[test]
    fn archive_keeps_upload_order_and_reports_failures() {
        let items = vec![
            ExportItem {
                position: 3,
                source: decoded(8, 8),
                overlays: Arc::from(vec![overlay(2.0, 2.0, 4.0)]),
            },
            ExportItem {
                position: 1,
                source: decoded(4, 4),
                overlays: Arc::from(Vec::new()),
            },
            ExportItem {
                position: 2,
                source: ExportSource::Path(PathBuf::from("definitely/missing.png")),
                overlays: Arc::from(Vec::new()),
            },
        ];

        let mut buffer = Cursor::new(Vec::new());
        let report =
            export_archive(&items, &DotPainter, &OutputOptions::default(), &mut buffer)
                .expect("archive");
        assert_eq!(report.written, vec!["image-1.png", "image-3.png"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].position, 2);
        assert!(!report.is_complete());

        let mut archive = zip::ZipArchive::new(Cursor::new(buffer.into_inner())).expect("zip");
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).expect("entry").name(), "image-1.png");

        let mut bytes = Vec::new();
        archive
            .by_name("image-3.png")
            .expect("entry")
            .read_to_end(&mut bytes)
            .expect("read");
        let image = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(image.get_pixel(2, 5), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn single_export_writes_named_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let item = ExportItem {
            position: 4,
            source: decoded(5, 5),
            overlays: Arc::from(Vec::new()),
        };
        let path = export_single(&item, &DotPainter, &OutputOptions::default(), dir.path())
            .expect("export");
        assert_eq!(path, dir.path().join("image-4.png"));
        assert!(path.exists());
    }
}
