//! The [`RasterImage`] value and the supported upload formats.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::sync::Arc;

/// Upload formats the geometry engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Svg,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Jpeg,
        SourceFormat::Png,
        SourceFormat::Gif,
        SourceFormat::WebP,
        SourceFormat::Svg,
    ];

    /// Match a declared MIME type. Parameters (`;charset=…`) and case are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.mime_type() == essence)
    }

    /// Guess from a file extension, for callers without a declared MIME type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "gif" => Some(SourceFormat::Gif),
            "webp" => Some(SourceFormat::WebP),
            "svg" => Some(SourceFormat::Svg),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::Gif => "image/gif",
            SourceFormat::WebP => "image/webp",
            SourceFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpg",
            SourceFormat::Png => "png",
            SourceFormat::Gif => "gif",
            SourceFormat::WebP => "webp",
            SourceFormat::Svg => "svg",
        }
    }

    /// Matching `image` crate format; `None` for SVG.
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            SourceFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            SourceFormat::Png => Some(image::ImageFormat::Png),
            SourceFormat::Gif => Some(image::ImageFormat::Gif),
            SourceFormat::WebP => Some(image::ImageFormat::WebP),
            SourceFormat::Svg => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// An encoded raster plus its pixel metadata.
///
/// Immutable once produced: every transform returns a new value. The aspect
/// ratio is computed once, at construction. Cloning is cheap (shared bytes).
#[derive(Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    aspect_ratio: f64,
    format: SourceFormat,
    bytes: Arc<[u8]>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, format: SourceFormat, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            aspect_ratio: width as f64 / height as f64,
            format,
            bytes: bytes.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:<mime>;base64,<payload>` for embedding.
    pub fn to_data_url(&self) -> String {
        data_url(self.mime_type(), &self.bytes)
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Render bytes as a base64 data URI.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mime_accepts_supported_set() {
        assert_eq!(SourceFormat::from_mime("image/jpeg"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_mime("image/png"), Some(SourceFormat::Png));
        assert_eq!(SourceFormat::from_mime("image/gif"), Some(SourceFormat::Gif));
        assert_eq!(SourceFormat::from_mime("image/webp"), Some(SourceFormat::WebP));
        assert_eq!(SourceFormat::from_mime("image/svg+xml"), Some(SourceFormat::Svg));
    }

    #[test]
    fn from_mime_ignores_case_and_parameters() {
        assert_eq!(
            SourceFormat::from_mime("Image/SVG+XML; charset=utf-8"),
            Some(SourceFormat::Svg)
        );
    }

    #[test]
    fn from_mime_rejects_others() {
        assert_eq!(SourceFormat::from_mime("image/tiff"), None);
        assert_eq!(SourceFormat::from_mime("text/html"), None);
        assert_eq!(SourceFormat::from_mime(""), None);
    }

    #[test]
    fn from_extension_guesses() {
        assert_eq!(SourceFormat::from_extension("JPG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("svg"), Some(SourceFormat::Svg));
        assert_eq!(SourceFormat::from_extension("bmp"), None);
        for format in SourceFormat::ALL {
            assert_eq!(SourceFormat::from_extension(format.extension()), Some(format));
        }
    }

    #[test]
    fn aspect_ratio_fixed_at_creation() {
        let img = RasterImage::new(1600, 900, SourceFormat::Png, vec![1, 2, 3]);
        assert_eq!(img.aspect_ratio(), 1600.0 / 900.0);
        assert_eq!(img.dimensions(), (1600, 900));
        assert_eq!(img.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn data_url_is_base64() {
        let img = RasterImage::new(1, 1, SourceFormat::Png, b"abc".to_vec());
        assert_eq!(img.to_data_url(), "data:image/png;base64,YWJj");
    }
}
