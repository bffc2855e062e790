//! Pure calculation functions for composite geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Inputs are expected to have positive dimensions; zero-sized sources or
//! targets are a caller precondition violation and produce degenerate
//! (but non-panicking) results.

use super::backend::Dimensions;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Largest size with the source aspect ratio that fits inside `target`.
///
/// Both returned dimensions are `<=` the target's and at least 1.
///
/// ```
/// # use printbooth::imaging::{Dimensions, scaled_size};
/// // 4000x3000 into a 1000x1000 box → 1000x750
/// let s = scaled_size(Dimensions { width: 4000, height: 3000 }, Dimensions { width: 1000, height: 1000 });
/// assert_eq!((s.width, s.height), (1000, 750));
/// ```
pub fn scaled_size(source: Dimensions, target: Dimensions) -> Dimensions {
    let ratio_w = source.width as f64 / target.width as f64;
    let ratio_h = source.height as f64 / target.height as f64;
    let ratio = ratio_w.max(ratio_h);

    let width = (source.width as f64 / ratio).round() as u32;
    let height = (source.height as f64 / ratio).round() as u32;

    Dimensions {
        width: width.clamp(1, target.width.max(1)),
        height: height.clamp(1, target.height.max(1)),
    }
}

/// Centered crop of `source` matching the aspect ratio of `target`, maximal area.
///
/// The rectangle is always fully contained in the source bounds.
pub fn crop_rect_for_ratio(source: Dimensions, target: Dimensions) -> Rect {
    let ratio_w = source.width as f64 / target.width as f64;
    let ratio_h = source.height as f64 / target.height as f64;
    let ratio = ratio_w.min(ratio_h);

    let width = ((target.width as f64 * ratio).round() as u32).clamp(1, source.width.max(1));
    let height = ((target.height as f64 * ratio).round() as u32).clamp(1, source.height.max(1));

    Rect {
        x: (source.width - width) / 2,
        y: (source.height - height) / 2,
        width,
        height,
    }
}

/// Top-left position that centers `inner` inside `outer`.
pub fn centered_position(outer: &Rect, inner: Dimensions) -> (u32, u32) {
    (
        outer.x + outer.width.saturating_sub(inner.width) / 2,
        outer.y + outer.height.saturating_sub(inner.height) / 2,
    )
}

/// Physical page size, in inches. Components may be supplied in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperFormat {
    pub width: f64,
    pub height: f64,
}

impl PaperFormat {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Return the format in portrait convention (`width <= height`).
    pub fn normalized(self) -> Self {
        if self.width > self.height {
            Self {
                width: self.height,
                height: self.width,
            }
        } else {
            self
        }
    }
}

impl Default for PaperFormat {
    fn default() -> Self {
        Self::new(4.0, 6.0)
    }
}

/// Pixel size of the composite for a paper format at `dpi`.
///
/// The paper is normalized to portrait first; `landscape` then swaps the axes.
pub fn canvas_size(paper: PaperFormat, dpi: u32, landscape: bool) -> Dimensions {
    let paper = paper.normalized();
    let width = (paper.width * dpi as f64).round() as u32;
    let height = (paper.height * dpi as f64).round() as u32;

    if landscape {
        Dimensions {
            width: height,
            height: width,
        }
    } else {
        Dimensions { width, height }
    }
}
