//! Export pipeline.
//!
//! Captures a [`Surface`] under a shared [`ExportPolicy`] and serialises the
//! capture into one of four formats:
//!
//! | Format | Produced by | Background |
//! |---|---|---|
//! | PNG | `image` PNG encoder | transparent |
//! | JPEG | `image` JPEG encoder at the policy quality | flattened onto white |
//! | SVG | [`vector::wrap_png`] (one embedded bitmap) | transparent |
//! | PDF | a [`DocumentWriter`], [`PdfWriter`] by default | forced white |
//!
//! Every export returns an [`ExportArtifact`]. [`Exporter::export_all`] runs
//! the PNG, SVG and PDF exports in parallel and reports each outcome on its
//! own, so one failing format never hides the others.

pub mod clipboard;
pub mod document;
pub mod surface;
pub mod vector;

pub use clipboard::{ClipboardError, ClipboardSink};
pub use document::{DocumentWriter, Orientation, PageSpec, PdfWriter};
pub use surface::{CaptureError, CaptureRequest, ImageSurface, Surface};

use crate::imaging::backend::{Dimensions, ImagingError};
use crate::imaging::codec;
use crate::imaging::params::{Encoding, Quality};
use crate::imaging::raster::{RasterImage, data_url};
use crate::settings::Settings;
use image::{DynamicImage, Rgba, RgbaImage};
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("Export encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("Invalid export size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Unsupported export format '{0}'. Please use png, jpeg, svg, or pdf")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

pub type Result<T> = std::result::Result<T, ExportError>;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Scale and quality shared by every export.
///
/// Only changed through the clamping setters; out-of-range input is pulled
/// into range rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportPolicy {
    scale: f32,
    quality: Quality,
}

impl ExportPolicy {
    pub const MIN_SCALE: f32 = 1.0;
    pub const MAX_SCALE: f32 = 4.0;
    pub const DEFAULT_SCALE: f32 = 2.0;

    pub fn new(scale: f32, quality: f32) -> Self {
        let mut policy = Self::default();
        policy.set_export_scale(scale);
        policy.set_export_quality(quality);
        policy
    }

    /// Apply persisted settings through the clamping setters.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.export_scale, settings.export_quality)
    }

    /// Set the magnification, clamped to `1..=4`. NaN is ignored.
    pub fn set_export_scale(&mut self, scale: f32) {
        if scale.is_nan() {
            return;
        }
        self.scale = scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE);
    }

    /// Set the lossy quality, clamped to `0.1..=1.0`.
    pub fn set_export_quality(&mut self, quality: f32) {
        self.quality = Quality::new(quality);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            quality: Quality::default(),
        }
    }
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Documents are captured over an opaque white background.
    fn background(self) -> Option<Rgba<u8>> {
        match self {
            ExportFormat::Pdf => Some(WHITE),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Svg => "SVG",
            ExportFormat::Pdf => "PDF",
        })
    }
}

/// The result of one export: bytes plus how to present them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    /// `mockup-<unix millis>.<ext>`
    pub suggested_filename: String,
    pub mime_type: &'static str,
}

impl ExportArtifact {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            suggested_filename: format!(
                "mockup-{}.{}",
                chrono::Utc::now().timestamp_millis(),
                format.extension()
            ),
            mime_type: format.mime_type(),
        }
    }

    pub fn to_data_url(&self) -> String {
        data_url(self.mime_type, &self.bytes)
    }

    /// Write the artifact into `dir` under its suggested filename.
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.suggested_filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Independent outcomes of [`Exporter::export_all`].
#[derive(Debug)]
pub struct ExportAllReport {
    pub raster: Result<ExportArtifact>,
    pub vector: Result<ExportArtifact>,
    pub document: Result<ExportArtifact>,
}

impl ExportAllReport {
    pub fn outcomes(&self) -> [(ExportFormat, &Result<ExportArtifact>); 3] {
        [
            (ExportFormat::Png, &self.raster),
            (ExportFormat::Svg, &self.vector),
            (ExportFormat::Pdf, &self.document),
        ]
    }

    pub fn failures(&self) -> Vec<(ExportFormat, &ExportError)> {
        self.outcomes()
            .into_iter()
            .filter_map(|(format, outcome)| outcome.as_ref().err().map(|e| (format, e)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Runs exports of one surface.
pub struct Exporter<S: Surface> {
    surface: S,
    policy: ExportPolicy,
    writer: Option<Box<dyn DocumentWriter>>,
    clipboard: Option<Box<dyn ClipboardSink>>,
}

impl<S: Surface> Exporter<S> {
    /// An exporter writing documents with [`PdfWriter`] and no clipboard.
    pub fn new(surface: S, policy: ExportPolicy) -> Self {
        Self {
            surface,
            policy,
            writer: Some(Box::new(PdfWriter::new())),
            clipboard: None,
        }
    }

    /// Replace the document writer; `None` makes document export fail.
    pub fn with_document_writer(mut self, writer: Option<Box<dyn DocumentWriter>>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn policy(&self) -> &ExportPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ExportPolicy {
        &mut self.policy
    }

    fn capture(&self, background: Option<Rgba<u8>>) -> Result<RgbaImage> {
        let size = self.surface.size();
        let request = CaptureRequest {
            scale: self.policy.scale,
            width: size.width,
            height: size.height,
            background,
        };
        Ok(self.surface.rasterize(&request)?)
    }

    /// Render the surface at the policy scale with a transparent background.
    pub fn capture_surface(&self) -> Result<RasterImage> {
        let pixels = DynamicImage::ImageRgba8(self.capture(None)?);
        Ok(codec::encode_raster(&pixels, Encoding::Png)?)
    }

    fn encode(&self, pixels: RgbaImage, format: ExportFormat) -> Result<Vec<u8>> {
        let (width, height) = pixels.dimensions();
        let pixels = DynamicImage::ImageRgba8(pixels);
        match format {
            ExportFormat::Png => Ok(codec::encode(&pixels, Encoding::Png)?),
            ExportFormat::Jpeg => Ok(codec::encode(&pixels, Encoding::Jpeg(self.policy.quality))?),
            ExportFormat::Svg => {
                let png = codec::encode(&pixels, Encoding::Png)?;
                Ok(vector::wrap_png(&png, width, height).into_bytes())
            }
            ExportFormat::Pdf => {
                let writer = self.document_writer()?;
                let page = PageSpec::from_pixels(width, height);
                writer.write(&codec::flatten(&pixels, WHITE), &page)
            }
        }
    }

    fn document_writer(&self) -> Result<&dyn DocumentWriter> {
        self.writer
            .as_deref()
            .ok_or_else(|| ExportError::Encode("Document writer unavailable".into()))
    }

    /// Capture and serialise in `format`.
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
        if format == ExportFormat::Pdf {
            self.document_writer()?;
        }
        let pixels = self.capture(format.background())?;
        let (width, height) = pixels.dimensions();
        let artifact = ExportArtifact::new(format, self.encode(pixels, format)?);
        log::info!(
            "Exported {format} {width}x{height} ({} bytes) as {}",
            artifact.bytes.len(),
            artifact.suggested_filename
        );
        Ok(artifact)
    }

    pub fn export_raster(&self) -> Result<ExportArtifact> {
        self.export(ExportFormat::Png)
    }

    pub fn export_vector_wrapped(&self) -> Result<ExportArtifact> {
        self.export(ExportFormat::Svg)
    }

    pub fn export_document(&self) -> Result<ExportArtifact> {
        self.export(ExportFormat::Pdf)
    }

    /// Run the raster, vector-wrapped and document exports concurrently.
    ///
    /// Each sub-export completes regardless of the others.
    pub fn export_all(&self) -> ExportAllReport {
        let (raster, (vector, document)) = rayon::join(
            || self.export_raster(),
            || rayon::join(|| self.export_vector_wrapped(), || self.export_document()),
        );
        ExportAllReport {
            raster,
            vector,
            document,
        }
    }

    /// Export at a temporary logical size.
    ///
    /// The format is checked before the surface is touched; the original size
    /// is restored whether or not the export succeeds.
    pub fn export_custom_size(
        &mut self,
        width: u32,
        height: u32,
        format: &str,
    ) -> Result<ExportArtifact> {
        let format: ExportFormat = format.parse()?;
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidSize { width, height });
        }

        let resized = SizeOverride::apply(self, Dimensions::new(width, height));
        resized.export(format)
    }

    /// Capture, encode as PNG, then hand the image to the clipboard.
    ///
    /// The clipboard is only written once encoding has succeeded.
    pub fn export_to_clipboard_image(&self) -> Result<ExportArtifact> {
        let clipboard = self.clipboard.as_deref().ok_or_else(|| {
            ClipboardError::Unavailable("no clipboard integration configured".into())
        })?;

        let pixels = self.capture(None)?;
        let bytes = self.encode(pixels.clone(), ExportFormat::Png)?;
        clipboard.write_image(&pixels)?;
        Ok(ExportArtifact::new(ExportFormat::Png, bytes))
    }

    /// Capture and encode as a `data:` URI instead of a file.
    pub fn export_as_inline_data(&self, format: ExportFormat) -> Result<String> {
        Ok(self.export(format)?.to_data_url())
    }
}

/// Holds a surface at an overridden size; restores the original on drop.
struct SizeOverride<'a, S: Surface> {
    exporter: &'a mut Exporter<S>,
    original: Dimensions,
}

impl<'a, S: Surface> SizeOverride<'a, S> {
    fn apply(exporter: &'a mut Exporter<S>, size: Dimensions) -> Self {
        let original = exporter.surface.size();
        log::debug!(
            "Resizing surface {}x{} → {}x{} for export",
            original.width,
            original.height,
            size.width,
            size.height
        );
        exporter.surface.set_size(size);
        Self { exporter, original }
    }
}

impl<S: Surface> Deref for SizeOverride<'_, S> {
    type Target = Exporter<S>;

    fn deref(&self) -> &Exporter<S> {
        self.exporter
    }
}

impl<S: Surface> Drop for SizeOverride<'_, S> {
    fn drop(&mut self) {
        self.exporter.surface.set_size(self.original);
    }
}
