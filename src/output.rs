//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! photo.jpg
//!     Format: image/jpeg
//!     Size: 4000x3000 (aspect 1.333)
//!     Bytes: 2.1 MB
//!     Downscale: 1440x1080
//!     Mockup: 1067x800
//! ```
//!
//! ## Transform
//!
//! ```text
//! fit 800x800 → out/fit.png
//!     Format: image/png, 12.3 KB
//! ```
//!
//! ## Export
//!
//! ```text
//! PNG → mockup-1729350000000.png (48.0 KB)
//! SVG → mockup-1729350000000.svg (64.1 KB)
//! PDF failed: Export encoding failed: Document writer unavailable
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Notifications go to stderr
//! through [`ConsoleNotifier`].

use crate::export::{ExportArtifact, ExportError, ExportFormat};
use crate::feedback::{Notifier, ToastLevel};
use crate::imaging::{MockupSize, RasterImage};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_bytes(n: u64) -> String {
    const KB: f64 = 1024.0;
    let n = n as f64;
    if n < KB {
        format!("{} B", n as u64)
    } else if n < KB * KB {
        format!("{:.1} KB", n / KB)
    } else {
        format!("{:.1} MB", n / (KB * KB))
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// What `inspect` learned about an upload.
pub struct InspectSummary<'a> {
    pub name: &'a str,
    pub image: &'a RasterImage,
    pub size_bytes: u64,
    /// Re-encode size, when the upload would be downscaled.
    pub downscale: Option<(u32, u32)>,
    pub mockup: MockupSize,
}

pub fn format_inspect(summary: &InspectSummary<'_>) -> Vec<String> {
    let img = summary.image;
    let mut lines = vec![
        summary.name.to_string(),
        format!("{}Format: {}", indent(1), img.mime_type()),
        format!(
            "{}Size: {}x{} (aspect {:.3})",
            indent(1),
            img.width(),
            img.height(),
            img.aspect_ratio()
        ),
        format!("{}Bytes: {}", indent(1), format_bytes(summary.size_bytes)),
    ];
    if let Some((w, h)) = summary.downscale {
        lines.push(format!("{}Downscale: {}x{}", indent(1), w, h));
    }
    lines.push(format!(
        "{}Mockup: {}x{}",
        indent(1),
        summary.mockup.width,
        summary.mockup.height
    ));
    lines
}

pub fn print_inspect(summary: &InspectSummary<'_>) {
    for line in format_inspect(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Format the result of a geometry operation written to `path`.
pub fn format_transform(label: &str, image: &RasterImage, path: &Path) -> Vec<String> {
    vec![
        format!(
            "{} {}x{} → {}",
            label,
            image.width(),
            image.height(),
            path.display()
        ),
        format!(
            "{}Format: {}, {}",
            indent(1),
            image.mime_type(),
            format_bytes(image.bytes().len() as u64)
        ),
    ]
}

pub fn print_transform(label: &str, image: &RasterImage, path: &Path) {
    for line in format_transform(label, image, path) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format one export outcome. `saved` is where the artifact was written.
pub fn format_export(
    format: ExportFormat,
    outcome: Result<&ExportArtifact, &ExportError>,
    saved: Option<&Path>,
) -> String {
    match outcome {
        Ok(artifact) => {
            let target = saved
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| artifact.suggested_filename.clone());
            format!(
                "{} → {} ({})",
                format,
                target,
                format_bytes(artifact.bytes.len() as u64)
            )
        }
        Err(e) => format!("{} failed: {}", format, e),
    }
}

pub fn print_export(
    format: ExportFormat,
    outcome: Result<&ExportArtifact, &ExportError>,
    saved: Option<&Path>,
) {
    println!("{}", format_export(format, outcome, saved));
}

// ============================================================================
// Notifications
// ============================================================================

/// Writes loading messages and toasts to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    /// Suppress loading and success messages.
    pub quiet: bool,
}

pub fn format_toast(level: ToastLevel, message: &str) -> String {
    let tag = match level {
        ToastLevel::Success => "ok",
        ToastLevel::Error => "error",
    };
    format!("[{}] {}", tag, message)
}

impl Notifier for ConsoleNotifier {
    fn show_loading(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }

    fn hide_loading(&self) {}

    fn toast(&self, level: ToastLevel, message: &str) {
        if self.quiet && level != ToastLevel::Error {
            return;
        }
        eprintln!("{}", format_toast(level, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::SourceFormat;
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // Inspect / transform
    // =========================================================================

    #[test]
    fn inspect_lists_downscale_when_present() {
        let image = RasterImage::new(4000, 3000, SourceFormat::Jpeg, vec![0; 10]);
        let summary = InspectSummary {
            name: "photo.jpg",
            image: &image,
            size_bytes: 2048,
            downscale: Some((1440, 1080)),
            mockup: MockupSize {
                width: 1067,
                height: 800,
            },
        };

        assert_eq!(
            format_inspect(&summary),
            vec![
                "photo.jpg",
                "    Format: image/jpeg",
                "    Size: 4000x3000 (aspect 1.333)",
                "    Bytes: 2.0 KB",
                "    Downscale: 1440x1080",
                "    Mockup: 1067x800",
            ]
        );
    }

    #[test]
    fn inspect_omits_downscale_for_small_images() {
        let image = RasterImage::new(800, 600, SourceFormat::Png, Vec::new());
        let summary = InspectSummary {
            name: "small.png",
            image: &image,
            size_bytes: 10,
            downscale: None,
            mockup: MockupSize {
                width: 800,
                height: 600,
            },
        };
        assert!(!format_inspect(&summary).iter().any(|l| l.contains("Downscale")));
    }

    #[test]
    fn transform_line_names_output() {
        let image = RasterImage::new(200, 100, SourceFormat::Jpeg, vec![0; 2048]);
        let lines = format_transform("thumbnail", &image, &PathBuf::from("out/thumb.jpg"));
        assert_eq!(lines[0], "thumbnail 200x100 → out/thumb.jpg");
        assert_eq!(lines[1], "    Format: image/jpeg, 2.0 KB");
    }

    // =========================================================================
    // Export
    // =========================================================================

    #[test]
    fn export_success_shows_saved_path() {
        let artifact = ExportArtifact {
            bytes: vec![0; 100],
            suggested_filename: "mockup-1.png".into(),
            mime_type: "image/png",
        };
        assert_eq!(
            format_export(ExportFormat::Png, Ok(&artifact), Some(Path::new("out/mockup-1.png"))),
            "PNG → out/mockup-1.png (100 B)"
        );
        assert_eq!(
            format_export(ExportFormat::Png, Ok(&artifact), None),
            "PNG → mockup-1.png (100 B)"
        );
    }

    #[test]
    fn export_failure_shows_error() {
        let err = ExportError::Encode("Document writer unavailable".into());
        assert_eq!(
            format_export(ExportFormat::Pdf, Err(&err), None),
            "PDF failed: Export encoding failed: Document writer unavailable"
        );
    }

    #[test]
    fn toast_tags() {
        assert_eq!(format_toast(ToastLevel::Error, "nope"), "[error] nope");
        assert_eq!(format_toast(ToastLevel::Success, "done"), "[ok] done");
    }
}
