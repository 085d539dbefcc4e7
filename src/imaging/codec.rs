//! Raster decode/encode primitives shared by the backend and the exporter.
//!
//! | Format | Decode | Encode |
//! |---|---|---|
//! | JPEG, PNG, GIF, WebP | `image::ImageReader` with decode limits | |
//! | SVG | `resvg` at the intrinsic size | |
//! | PNG | | `image` PNG encoder (lossless) |
//! | JPEG | | `JpegEncoder::new_with_quality`, alpha flattened onto white |
//!
//! Decoding checks the declared canvas against [`PixelLimits`] before any
//! pixel buffer is allocated.

use super::backend::{ImagingError, PixelLimits};
use super::params::Encoding;
use super::raster::{RasterImage, SourceFormat};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, Limits, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;

/// Decode upload bytes into pixels under the default [`PixelLimits`].
pub fn decode(bytes: &[u8], format: SourceFormat) -> Result<DynamicImage, ImagingError> {
    decode_limited(bytes, format, &PixelLimits::default())
}

/// Decode upload bytes, refusing canvases over `limits` before allocating them.
pub fn decode_limited(
    bytes: &[u8],
    format: SourceFormat,
    limits: &PixelLimits,
) -> Result<DynamicImage, ImagingError> {
    let img = match format.image_format() {
        Some(image_format) => decode_bitmap(bytes, image_format, limits)
            .map_err(|e| ImagingError::Decode(format!("{format}: {e}")))?,
        None => render_svg(bytes, limits)?,
    };

    if img.width() == 0 || img.height() == 0 {
        return Err(ImagingError::Decode(format!("{format}: image has no pixels")));
    }
    Ok(img)
}

/// Decode a [`RasterImage`] back into pixels.
pub fn decode_raster(raster: &RasterImage) -> Result<DynamicImage, ImagingError> {
    decode(raster.bytes(), raster.format())
}

fn decode_bitmap(
    bytes: &[u8],
    image_format: ImageFormat,
    limits: &PixelLimits,
) -> Result<DynamicImage, String> {
    // Header only; no pixel buffer yet.
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), image_format)
        .into_dimensions()
        .map_err(|e| e.to_string())?;
    limits.check(width, height)?;

    let mut decode_limits = Limits::default();
    if limits.max_dimension > 0 {
        decode_limits.max_image_width = Some(limits.max_dimension);
        decode_limits.max_image_height = Some(limits.max_dimension);
    }
    let mut reader = ImageReader::with_format(Cursor::new(bytes), image_format);
    reader.limits(decode_limits);
    reader.decode().map_err(|e| e.to_string())
}

/// Rasterise an SVG document at its intrinsic size.
fn render_svg(bytes: &[u8], limits: &PixelLimits) -> Result<DynamicImage, ImagingError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| ImagingError::Decode(format!("Failed to parse SVG: {e}")))?;

    let size = tree.size().to_int_size();
    limits
        .check(size.width(), size.height())
        .map_err(|e| ImagingError::Decode(format!("SVG canvas {e}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        ImagingError::Decode(format!(
            "SVG canvas {}x{} is not drawable",
            size.width(),
            size.height()
        ))
    })?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut rgba = RgbaImage::new(size.width(), size.height());
    for (dst, src) in rgba.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(DynamicImage::ImageRgba8(rgba))
}

/// Encode pixels with the given codec.
pub fn encode(img: &DynamicImage, encoding: Encoding) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    match encoding {
        Encoding::Png => img
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| ImagingError::Encode(format!("PNG encode failed: {e}")))?,
        Encoding::Jpeg(quality) => {
            let flat = DynamicImage::ImageRgb8(flatten(img, Rgba([255, 255, 255, 255])));
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.percent());
            flat.write_with_encoder(encoder)
                .map_err(|e| ImagingError::Encode(format!("JPEG encode failed: {e}")))?
        }
    }
    Ok(buf)
}

/// Encode pixels into a new [`RasterImage`].
pub fn encode_raster(img: &DynamicImage, encoding: Encoding) -> Result<RasterImage, ImagingError> {
    let bytes = encode(img, encoding)?;
    let format = match encoding {
        Encoding::Png => SourceFormat::Png,
        Encoding::Jpeg(_) => SourceFormat::Jpeg,
    };
    Ok(RasterImage::new(img.width(), img.height(), format, bytes))
}

/// Composite an image over an opaque background, dropping alpha.
pub fn flatten(img: &DynamicImage, background: Rgba<u8>) -> image::RgbImage {
    let rgba = img.to_rgba8();
    let mut out = image::RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let a = src[3] as f32 / 255.0;
        let mix = |c: usize| (src[c] as f32 * a + background[c] as f32 * (1.0 - a)).round() as u8;
        *dst = image::Rgb([mix(0), mix(1), mix(2)]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;

    fn checker(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 128])
            }
        }))
    }

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let bytes = encode(&checker(37, 21), Encoding::Png).unwrap();
        let back = decode(&bytes, SourceFormat::Png).unwrap();
        assert_eq!((back.width(), back.height()), (37, 21));
    }

    #[test]
    fn jpeg_round_trip_keeps_dimensions() {
        let bytes = encode(&checker(64, 48), Encoding::Jpeg(Quality::new(0.85))).unwrap();
        let back = decode(&bytes, SourceFormat::Jpeg).unwrap();
        assert_eq!((back.width(), back.height()), (64, 48));
    }

    #[test]
    fn encode_raster_records_format() {
        let raster = encode_raster(&checker(4, 4), Encoding::Jpeg(Quality::new(0.8))).unwrap();
        assert_eq!(raster.format(), SourceFormat::Jpeg);
        assert_eq!(raster.dimensions(), (4, 4));
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let err = decode(b"definitely not a png", SourceFormat::Png).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[test]
    fn svg_decodes_at_intrinsic_size() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80">
            <rect width="120" height="80" fill="#ff0000"/>
        </svg>"##;
        let img = decode(svg, SourceFormat::Svg).unwrap();
        assert_eq!((img.width(), img.height()), (120, 80));
        assert_eq!(img.to_rgba8().get_pixel(60, 40), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn malformed_svg_fails_to_decode() {
        let err = decode(b"<svg", SourceFormat::Svg).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[test]
    fn svg_with_huge_declared_canvas_is_a_decode_error() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="40000" height="40000"><rect width="1" height="1"/></svg>"#;
        let err = decode(svg, SourceFormat::Svg).unwrap_err();
        match err {
            ImagingError::Decode(msg) => assert!(msg.contains("40000x40000"), "{msg}"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn bitmap_over_limits_is_refused_from_its_header() {
        let bytes = encode(&checker(300, 200), Encoding::Png).unwrap();
        let limits = PixelLimits {
            max_pixels: 10_000,
            max_dimension: 0,
        };
        let err = decode_limited(&bytes, SourceFormat::Png, &limits).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(msg) if msg.contains("budget")));

        let decoded = decode_limited(&bytes, SourceFormat::Png, &PixelLimits::default()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn flatten_blends_transparent_pixels_onto_background() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])));
        let flat = flatten(&img, Rgba([255, 255, 255, 255]));
        assert_eq!(flat.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
    }
}
