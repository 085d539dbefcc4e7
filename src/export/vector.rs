//! Vector-wrapped output: an SVG document embedding the capture as one bitmap.

use crate::imaging::raster::data_url;

/// Wrap PNG bytes in an SVG whose canvas equals the pixel size.
pub fn wrap_png(png: &[u8], width: u32, height: u32) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" "#,
            r#"width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<image width="{w}" height="{h}" xlink:href="{href}"/>"#,
            "</svg>"
        ),
        w = width,
        h = height,
        href = data_url("image/png", png),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::{decode, encode};
    use crate::imaging::params::Encoding;
    use crate::imaging::raster::SourceFormat;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn declares_pixel_canvas() {
        let svg = wrap_png(b"png", 640, 480);
        assert!(svg.contains(r#"width="640" height="480" viewBox="0 0 640 480""#));
        assert!(svg.contains("xlink:href=\"data:image/png;base64,cG5n\""));
    }

    #[test]
    fn wrapped_svg_renders_at_declared_size() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 8, Rgba([0, 0, 255, 255])));
        let png = encode(&img, Encoding::Png).unwrap();

        let svg = wrap_png(&png, 12, 8);
        let rendered = decode(svg.as_bytes(), SourceFormat::Svg).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (12, 8));
    }
}
