//! Shared test utilities for the printbooth test suite.
//!
//! Synthetic captures and geometry assertions used by the imaging tests.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let captures = vec![solid_capture(300, 400, [255, 0, 0]); 3];
//! let layout = LayoutSpec::new(Dimensions::new(240, 360), 3, 10, 0);
//! assert_disjoint(&layout.captures);
//! ```

use crate::imaging::calculations::Rect;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

// =========================================================================
// Synthetic captures
// =========================================================================

/// Opaque single-color capture, like a camera frame of a uniform wall.
pub fn solid_capture(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

// =========================================================================
// Pixel sampling
// =========================================================================

/// Pixel at the center of `rect`.
pub fn color_at_center(image: &RgbaImage, rect: &Rect) -> Rgba<u8> {
    let (x, y) = rect.center();
    *image.get_pixel(x, y)
}

// =========================================================================
// Geometry assertions
// =========================================================================

/// Panic if any two rectangles overlap.
pub fn assert_disjoint(rects: &[Rect]) {
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

/// Panic unless `inner` lies entirely inside `outer`.
pub fn assert_inside(outer: &Rect, inner: &Rect) {
    assert!(
        outer.contains_rect(inner),
        "{inner:?} is not inside {outer:?}"
    );
}
