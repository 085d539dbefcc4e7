//! Host clipboard integration.

use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard rejected the image: {0}")]
    Rejected(String),
}

/// Somewhere to put a captured image.
pub trait ClipboardSink: Send + Sync {
    fn write_image(&self, image: &RgbaImage) -> Result<(), ClipboardError>;
}

/// The system clipboard, via `arboard`.
#[cfg(feature = "clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn write_image(&self, image: &RgbaImage) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: std::borrow::Cow::Borrowed(image.as_raw()),
        };
        clipboard
            .set_image(data)
            .map_err(|e| ClipboardError::Rejected(e.to_string()))
    }
}
