//! # Mockcraft
//!
//! The image geometry and export core of a mockup generator: uploads are
//! validated, normalised and transformed; a mockup stage is captured and
//! written out as PNG, JPEG, SVG or PDF.
//!
//! # Architecture: Two Cooperating Components
//!
//! ```text
//! upload bytes ─▶ imaging (validate → downscale → fit/crop/thumbnail/effects) ─▶ RasterImage
//!                                                                                  │
//! Surface ◀──────────────────────────────── ImageSurface::from_raster ◀────────────┘
//!    │
//!    └─▶ export (capture at scale → PNG | JPEG | SVG | PDF) ─▶ ExportArtifact
//! ```
//!
//! - **Geometry engine** ([`imaging`]): deterministic raster transforms. Pure
//!   dimension math lives in [`imaging::calculations`]; pixel work goes
//!   through the [`imaging::ImageBackend`] trait so operations can be tested
//!   against a recording mock.
//! - **Export pipeline** ([`export`]): captures a [`export::Surface`] under a
//!   shared [`export::ExportPolicy`] and serialises the result. Document and
//!   clipboard output sit behind traits of their own.
//!
//! ## Bounded Pixel Buffers
//!
//! Declared canvas sizes are checked against [`imaging::PixelLimits`] before
//! anything is allocated: upload headers and SVG canvases on decode, output
//! canvases in the backend, and capture sizes in [`export::CaptureRequest`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Upload validation, downscale, fit, crop, thumbnail, effects |
//! | [`export`] | Surface capture, format encoders, `export_all`, custom-size export |
//! | [`feedback`] | Loading indicator + toast reporting around operations |
//! | [`settings`] | Persisted settings snapshot with best-effort restore |
//! | [`config`] | `mockcraft.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fit Fills the Frame
//!
//! [`imaging::resize_to_fit`] always produces exactly the requested size and
//! never stretches. A source wider than the target matches the target height
//! and is centered horizontally, a taller one matches the width and is
//! centered vertically; whatever overflows is cut evenly from both sides.
//! Captures of an [`export::ImageSurface`] instead letterbox the whole image.
//!
//! ## Independent Results From `export_all`
//!
//! [`export::Exporter::export_all`] runs its three exports with `rayon::join`
//! and returns one `Result` per format. A missing document writer fails the
//! PDF and nothing else.
//!
//! ## Scoped Resize
//!
//! [`export::Exporter::export_custom_size`] overrides the surface size through
//! a guard that restores the original size when dropped, on success, error or
//! unwind alike.

pub mod config;
pub mod export;
pub mod feedback;
pub mod imaging;
pub mod output;
pub mod settings;
