//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Fractional results are rounded to the nearest whole pixel and never
//! collapse below one pixel.

/// Where a scaled image lands on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// A source-space rectangle to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Suggested mockup dimensions for an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockupSize {
    pub width: u32,
    pub height: u32,
}

fn px(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

fn aspect(dims: (u32, u32)) -> f64 {
    dims.0 as f64 / dims.1 as f64
}

/// Calculate the re-encode dimensions for an oversized upload.
///
/// Returns `None` when neither edge exceeds `threshold` (pass-through).
/// Otherwise the image is scaled uniformly by `min(max_w / w, max_h / h)` if
/// it overflows `bounds`, and kept at its size if it already fits.
///
/// # Examples
/// ```
/// # use mockcraft::imaging::calculations::calculate_downscale_dimensions;
/// assert_eq!(
///     calculate_downscale_dimensions((4000, 3000), 2000, (1920, 1080)),
///     Some((1440, 1080))
/// );
/// assert_eq!(calculate_downscale_dimensions((1600, 900), 2000, (1920, 1080)), None);
/// ```
pub fn calculate_downscale_dimensions(
    source: (u32, u32),
    threshold: u32,
    bounds: (u32, u32),
) -> Option<(u32, u32)> {
    let (w, h) = source;
    let (max_w, max_h) = bounds;

    if w <= threshold && h <= threshold {
        return None;
    }

    if w > max_w || h > max_h {
        let ratio = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
        Some((px(w as f64 * ratio), px(h as f64 * ratio)))
    } else {
        Some((w, h))
    }
}

/// Calculate where `resize_to_fit` draws `source` on a `target` canvas.
///
/// A source wider than the target matches the target height, its width
/// follows from the aspect ratio and it is centered horizontally. Otherwise
/// it matches the target width and is centered vertically. The drawn image
/// always covers the canvas, so the offset on the overflowing axis is zero or
/// negative and the canvas clips the excess equally on both sides.
///
/// # Examples
/// ```
/// # use mockcraft::imaging::calculations::{Placement, calculate_fit_placement};
/// assert_eq!(
///     calculate_fit_placement((1600, 900), (800, 800)),
///     Placement { x: -311, y: 0, width: 1422, height: 800 }
/// );
/// ```
pub fn calculate_fit_placement(source: (u32, u32), target: (u32, u32)) -> Placement {
    let (tgt_w, tgt_h) = target;
    let src_aspect = aspect(source);

    if src_aspect > aspect(target) {
        let width = px(tgt_h as f64 * src_aspect).max(tgt_w);
        Placement {
            x: (tgt_w as i64 - width as i64) / 2,
            y: 0,
            width,
            height: tgt_h,
        }
    } else {
        let height = px(tgt_w as f64 / src_aspect).max(tgt_h);
        Placement {
            x: 0,
            y: (tgt_h as i64 - height as i64) / 2,
            width: tgt_w,
            height,
        }
    }
}

/// Calculate the letterbox placement of `source` inside `target`.
///
/// The whole image stays visible: it touches the target on one axis and is
/// centered on the other, leaving equal margins (to within one pixel).
pub fn calculate_letterbox_placement(source: (u32, u32), target: (u32, u32)) -> Placement {
    let (tgt_w, tgt_h) = target;
    let src_aspect = aspect(source);

    if src_aspect > aspect(target) {
        let height = px(tgt_w as f64 / src_aspect).min(tgt_h);
        Placement {
            x: 0,
            y: ((tgt_h - height) / 2) as i64,
            width: tgt_w,
            height,
        }
    } else {
        let width = px(tgt_h as f64 * src_aspect).min(tgt_w);
        Placement {
            x: ((tgt_w - width) / 2) as i64,
            y: 0,
            width,
            height: tgt_h,
        }
    }
}

/// Calculate the centered crop rectangle matching `aspect_ratio` (width / height).
///
/// A source wider than the ratio keeps its full height and loses width;
/// otherwise it keeps its full width and loses height.
pub fn calculate_crop_rect(source: (u32, u32), aspect_ratio: f64) -> CropRect {
    let (src_w, src_h) = source;

    if aspect(source) > aspect_ratio {
        let width = px(src_h as f64 * aspect_ratio).min(src_w);
        CropRect {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        let height = px(src_w as f64 / aspect_ratio).min(src_h);
        CropRect {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Calculate thumbnail dimensions constrained on the longer side.
///
/// # Examples
/// ```
/// # use mockcraft::imaging::calculations::calculate_thumbnail_size;
/// assert_eq!(calculate_thumbnail_size((4000, 2000), 200), (200, 100));
/// assert_eq!(calculate_thumbnail_size((1000, 2000), 200), (100, 200));
/// ```
pub fn calculate_thumbnail_size(source: (u32, u32), max_size: u32) -> (u32, u32) {
    let ratio = aspect(source);

    if ratio > 1.0 {
        (max_size, px(max_size as f64 / ratio))
    } else {
        (px(max_size as f64 * ratio), max_size)
    }
}

/// Calculate the mockup size an uploaded image should resize the stage to.
///
/// Three clamps run in a fixed order, each re-deriving the other edge from
/// the aspect ratio:
///
/// 1. width starts at `min(image width, max_width)`
/// 2. height above `max_height` is clamped, width re-derived
/// 3. width below `min_width` is raised, height re-derived
///
/// Step 3 may push the height back above `max_height`; the width floor wins.
pub fn calculate_auto_fit_size(
    source: (u32, u32),
    max_width: u32,
    max_height: u32,
    min_width: u32,
) -> MockupSize {
    let ratio = aspect(source);

    let mut width = source.0.min(max_width) as f64;
    let mut height = width / ratio;

    if height > max_height as f64 {
        height = max_height as f64;
        width = height * ratio;
    }

    if width < min_width as f64 {
        width = min_width as f64;
        height = width / ratio;
    }

    MockupSize {
        width: px(width),
        height: px(height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // calculate_downscale_dimensions tests
    // =========================================================================

    #[test]
    fn downscale_passes_through_small_images() {
        assert_eq!(calculate_downscale_dimensions((2000, 2000), 2000, (1920, 1080)), None);
        assert_eq!(calculate_downscale_dimensions((800, 600), 2000, (1920, 1080)), None);
    }

    #[test]
    fn downscale_landscape_limited_by_height() {
        // min(1920/4000, 1080/3000) = 0.36
        assert_eq!(
            calculate_downscale_dimensions((4000, 3000), 2000, (1920, 1080)),
            Some((1440, 1080))
        );
    }

    #[test]
    fn downscale_wide_limited_by_width() {
        // min(1920/6000, 1080/2000) = 0.32
        assert_eq!(
            calculate_downscale_dimensions((6000, 2000), 2000, (1920, 1080)),
            Some((1920, 640))
        );
    }

    #[test]
    fn downscale_portrait() {
        // min(1920/1500, 1080/2500) = 0.432
        assert_eq!(
            calculate_downscale_dimensions((1500, 2500), 2000, (1920, 1080)),
            Some((648, 1080))
        );
    }

    #[test]
    fn downscale_over_threshold_but_within_bounds_keeps_size() {
        assert_eq!(
            calculate_downscale_dimensions((2100, 900), 2000, (2400, 1200)),
            Some((2100, 900))
        );
    }

    // =========================================================================
    // calculate_fit_placement tests
    // =========================================================================

    #[test]
    fn fit_wide_source_matches_height_and_overflows_sideways() {
        // 1600x900 into 800x800 → 1422x800, 311px cut from each side
        assert_eq!(
            calculate_fit_placement((1600, 900), (800, 800)),
            Placement {
                x: -311,
                y: 0,
                width: 1422,
                height: 800
            }
        );
    }

    #[test]
    fn fit_tall_source_matches_width_and_overflows_vertically() {
        // 600x1200 into 800x600 → 800x1600, 500px cut from top and bottom
        assert_eq!(
            calculate_fit_placement((600, 1200), (800, 600)),
            Placement {
                x: 0,
                y: -500,
                width: 800,
                height: 1600
            }
        );
    }

    #[test]
    fn fit_same_aspect_fills_canvas() {
        assert_eq!(
            calculate_fit_placement((400, 300), (800, 600)),
            Placement {
                x: 0,
                y: 0,
                width: 800,
                height: 600
            }
        );
    }

    // =========================================================================
    // calculate_letterbox_placement tests
    // =========================================================================

    #[test]
    fn letterbox_wide_source_gets_bars_top_and_bottom() {
        // 1600x900 into 800x800 → 800x450, 175px bars
        assert_eq!(
            calculate_letterbox_placement((1600, 900), (800, 800)),
            Placement {
                x: 0,
                y: 175,
                width: 800,
                height: 450
            }
        );
    }

    #[test]
    fn letterbox_tall_source_gets_bars_left_and_right() {
        // 600x1200 into 800x600 → 300x600, 250px bars
        assert_eq!(
            calculate_letterbox_placement((600, 1200), (800, 600)),
            Placement {
                x: 250,
                y: 0,
                width: 300,
                height: 600
            }
        );
    }

    // =========================================================================
    // calculate_crop_rect tests
    // =========================================================================

    #[test]
    fn crop_wide_source_loses_width() {
        // 1000x500 to 1:1 → 500x500 at x=250
        assert_eq!(
            calculate_crop_rect((1000, 500), 1.0),
            CropRect {
                x: 250,
                y: 0,
                width: 500,
                height: 500
            }
        );
    }

    #[test]
    fn crop_tall_source_loses_height() {
        // 600x1000 to 3:2 → 600x400 at y=300
        assert_eq!(
            calculate_crop_rect((600, 1000), 1.5),
            CropRect {
                x: 0,
                y: 300,
                width: 600,
                height: 400
            }
        );
    }

    #[test]
    fn crop_to_sixteen_nine_is_within_epsilon() {
        let rect = calculate_crop_rect((4000, 3000), 16.0 / 9.0);
        let ratio = rect.width as f64 / rect.height as f64;
        assert!((ratio - 16.0 / 9.0).abs() < 0.01, "ratio {ratio}");
        assert_eq!(rect.width, 4000);
        assert_eq!(rect.height, 2250);
    }

    // =========================================================================
    // calculate_thumbnail_size tests
    // =========================================================================

    #[test]
    fn thumbnail_landscape() {
        assert_eq!(calculate_thumbnail_size((4000, 2000), 200), (200, 100));
    }

    #[test]
    fn thumbnail_portrait() {
        assert_eq!(calculate_thumbnail_size((1000, 2000), 200), (100, 200));
    }

    #[test]
    fn thumbnail_square_uses_height_branch() {
        assert_eq!(calculate_thumbnail_size((512, 512), 200), (200, 200));
    }

    #[test]
    fn thumbnail_never_collapses_to_zero() {
        assert_eq!(calculate_thumbnail_size((10000, 10), 200), (200, 1));
    }

    // =========================================================================
    // calculate_auto_fit_size tests
    // =========================================================================

    #[test]
    fn auto_fit_wide_image_caps_width_only() {
        assert_eq!(
            calculate_auto_fit_size((3000, 1000), 1200, 800, 300),
            MockupSize {
                width: 1200,
                height: 400
            }
        );
    }

    #[test]
    fn auto_fit_small_image_keeps_its_width() {
        assert_eq!(
            calculate_auto_fit_size((640, 480), 1200, 800, 300),
            MockupSize {
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn auto_fit_near_square_hits_height_cap() {
        // step 1: 1200x1260, step 2: height 800 → width 761.9
        assert_eq!(
            calculate_auto_fit_size((2000, 2100), 1200, 800, 300),
            MockupSize {
                width: 762,
                height: 800
            }
        );
    }

    #[test]
    fn auto_fit_width_floor_overrides_height_cap() {
        // step 1: 400x3000, step 2: 800 tall → 106.7 wide, step 3: 300 wide → 2250 tall
        let size = calculate_auto_fit_size((400, 3000), 1200, 800, 300);
        assert_eq!(
            size,
            MockupSize {
                width: 300,
                height: 2250
            }
        );

        // A single independent clamp of each edge would give 400x800 and stretch the image.
        let naive = (400u32.clamp(300, 1200), 3000u32.min(800));
        assert_ne!((size.width, size.height), naive);
    }

    #[test]
    fn auto_fit_narrow_small_image_raised_to_floor() {
        // 200x100 never hits the caps; floor raises it to 300x150
        assert_eq!(
            calculate_auto_fit_size((200, 100), 1200, 800, 300),
            MockupSize {
                width: 300,
                height: 150
            }
        );
    }

    // =========================================================================
    // Properties
    // =========================================================================

    proptest! {
        #[test]
        fn fit_placement_covers_canvas(
            sw in 1u32..5000, sh in 1u32..5000, tw in 1u32..3000, th in 1u32..3000
        ) {
            let p = calculate_fit_placement((sw, sh), (tw, th));
            prop_assert!(p.x <= 0 && p.y <= 0);
            prop_assert!(p.x + p.width as i64 >= tw as i64);
            prop_assert!(p.y + p.height as i64 >= th as i64);
            // One edge always matches the canvas exactly.
            prop_assert!(p.width == tw || p.height == th);
        }

        #[test]
        fn fit_placement_preserves_aspect_within_a_pixel(
            sw in 1u32..5000, sh in 1u32..5000, tw in 1u32..3000, th in 1u32..3000
        ) {
            let p = calculate_fit_placement((sw, sh), (tw, th));
            let src_aspect = sw as f64 / sh as f64;
            let exact_w = th as f64 * src_aspect;
            let exact_h = tw as f64 / src_aspect;
            prop_assert!(
                (p.height == th && (p.width as f64 - exact_w).abs() <= 0.5 + 1e-9)
                    || (p.width == tw && (p.height as f64 - exact_h).abs() <= 0.5 + 1e-9)
            );
        }

        #[test]
        fn letterbox_placement_stays_inside_canvas(
            sw in 1u32..5000, sh in 1u32..5000, tw in 1u32..3000, th in 1u32..3000
        ) {
            let p = calculate_letterbox_placement((sw, sh), (tw, th));
            prop_assert!(p.x >= 0 && p.y >= 0);
            prop_assert!(p.x as u32 + p.width <= tw);
            prop_assert!(p.y as u32 + p.height <= th);
            prop_assert!(p.width == tw || p.height == th);
        }

        #[test]
        fn crop_rect_matches_ratio_within_a_pixel(
            sw in 1u32..5000, sh in 1u32..5000, ratio in 0.2f64..5.0
        ) {
            let r = calculate_crop_rect((sw, sh), ratio);
            prop_assert!(r.x + r.width <= sw);
            prop_assert!(r.y + r.height <= sh);
            if r.height == sh && r.width > 1 && r.width < sw {
                prop_assert!((r.width as f64 - sh as f64 * ratio).abs() <= 0.5);
            }
            if r.width == sw && r.height > 1 && r.height < sh {
                prop_assert!((r.height as f64 - sw as f64 / ratio).abs() <= 0.5);
            }
        }
    }
}
