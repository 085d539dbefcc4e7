//! Paginated document output.
//!
//! The exporter hands a [`DocumentWriter`] the captured pixels and a
//! [`PageSpec`] derived from them; the writer decides how to serialise.

use super::ExportError;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Physical length of one CSS pixel.
pub const MM_PER_PX: f64 = 0.264583;

const PT_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Single page sized exactly to an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub orientation: Orientation,
}

impl PageSpec {
    /// Page for a `width`×`height` pixel image: landscape if wider, else portrait.
    ///
    /// # Examples
    /// ```
    /// # use mockcraft::export::document::{Orientation, PageSpec};
    /// let page = PageSpec::from_pixels(1000, 500);
    /// assert_eq!(page.orientation, Orientation::Landscape);
    /// assert!((page.width_mm - 264.583).abs() < 1e-9);
    /// ```
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self {
            width_mm: width as f64 * MM_PER_PX,
            height_mm: height as f64 * MM_PER_PX,
            orientation: if width > height {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
        }
    }

    /// Page size in PDF points.
    pub fn size_pt(&self) -> (f32, f32) {
        (
            (self.width_mm * PT_PER_MM) as f32,
            (self.height_mm * PT_PER_MM) as f32,
        )
    }
}

/// Turns an opaque raster into document bytes.
pub trait DocumentWriter: Send + Sync {
    /// Place `image` at the origin of one page filling it.
    fn write(&self, image: &RgbImage, page: &PageSpec) -> Result<Vec<u8>, ExportError>;
}

/// Single-page PDF writer on `lopdf`.
///
/// The image is embedded as a Flate-compressed DeviceRGB XObject and scaled
/// by the content stream to cover the MediaBox.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }
}

fn pdf_err(e: lopdf::Error) -> ExportError {
    ExportError::Encode(format!("PDF: {e}"))
}

impl DocumentWriter for PdfWriter {
    fn write(&self, image: &RgbImage, page: &PageSpec) -> Result<Vec<u8>, ExportError> {
        let (width_pt, height_pt) = page.size_pt();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut xobject = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width() as i64,
                "Height" => image.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.as_raw().clone(),
        );
        xobject.compress().map_err(pdf_err)?;
        let image_id = doc.add_object(xobject);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(width_pt),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(height_pt),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(pdf_err)?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width_pt),
                Object::Real(height_pt),
            ],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| ExportError::Encode(format!("PDF: {e}")))?;
        log::debug!(
            "Wrote {}x{}px PDF page ({:.1}x{:.1}pt, {} bytes)",
            image.width(),
            image.height(),
            width_pt,
            height_pt,
            buf.len()
        );
        Ok(buf)
    }
}
