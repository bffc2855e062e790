//! Placement rectangles for the captures and footer texts of a composite.
//!
//! A [`LayoutSpec`] is fully determined by the canvas size, the resolved
//! orientation (portrait when `width < height`), the capture count, the
//! margin thickness, and how many footer texts are drawn:
//!
//! ```text
//!  1 capture        2-3 portrait      2-3 landscape        4 captures
//! ┌──────────┐     ┌──────────┐     ┌───┬───┬───┐       ┌─────┬─────┐
//! │          │     │    1     │     │   │   │   │       │  1  │  2  │
//! │    1     │     ├──────────┤     │ 1 │ 2 │ 3 │       ├─────┼─────┤
//! │          │     │    2     │     │   │   │   │       │  3  │  4  │
//! ├──────────┤     ├──────────┤     ├───┴───┴───┤       ├─────┴─────┤
//! │  footer  │     │  footer  │     │  footer   │       │  footer   │
//! └──────────┘     └──────────┘     └───────────┘       └───────────┘
//! ```
//!
//! Every gap (border, between captures, above the footer) is `margin` pixels.
//! A margin too thick for the page is reduced until every slot keeps at least
//! one pixel, so rectangles always stay on the canvas.

use super::backend::Dimensions;
use super::calculations::Rect;
use serde::Serialize;

/// Fraction of the canvas height reserved for footer texts, as a divisor.
const FOOTER_DIVISOR_PORTRAIT: u32 = 6;
const FOOTER_DIVISOR_LANDSCAPE: u32 = 8;

/// Fixed arrangement of a composite page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSpec {
    pub canvas: Dimensions,
    /// Margin actually applied, at most the requested one.
    pub margin: u32,
    /// Height of the footer band at the bottom of the canvas (0 without texts).
    pub footer_height: u32,
    /// One rectangle per capture, in capture order.
    pub captures: Vec<Rect>,
    /// One rectangle per drawn footer text, in text order.
    pub texts: Vec<Rect>,
    /// Overlays always cover the whole canvas.
    pub overlay: Rect,
}

impl LayoutSpec {
    /// Compute the layout. `capture_count` must be 1 to 4 (callers validate).
    pub fn new(canvas: Dimensions, capture_count: usize, margin: u32, text_count: usize) -> Self {
        let footer_height = footer_height(canvas, text_count);
        let margin = fit_margin(canvas, capture_count, margin, footer_height);
        Self {
            canvas,
            margin,
            footer_height,
            captures: capture_rects(canvas, capture_count, margin, footer_height),
            texts: text_rects(canvas, text_count, margin, footer_height),
            overlay: Rect::new(0, 0, canvas.width, canvas.height),
        }
    }

    pub fn is_portrait(&self) -> bool {
        self.canvas.width < self.canvas.height
    }

    /// Canvas area excluding the outer border and the footer band.
    pub fn content_area(&self) -> Rect {
        Rect::new(
            self.margin,
            self.margin,
            self.canvas
                .width
                .saturating_sub(self.margin.saturating_mul(2)),
            self.canvas.height.saturating_sub(
                self.footer_height
                    .saturating_add(self.margin.saturating_mul(2)),
            ),
        )
    }
}

fn footer_height(canvas: Dimensions, text_count: usize) -> u32 {
    if text_count == 0 {
        0
    } else if canvas.width < canvas.height {
        canvas.height / FOOTER_DIVISOR_PORTRAIT
    } else {
        canvas.height / FOOTER_DIVISOR_LANDSCAPE
    }
}

/// Capture grid as (columns, rows).
fn grid(canvas: Dimensions, count: usize) -> (u32, u32) {
    let n = count as u32;
    match count {
        1 => (1, 1),
        2 | 3 if canvas.width < canvas.height => (1, n),
        2 | 3 => (n, 1),
        _ => (2, 2),
    }
}

/// Largest margin, up to `requested`, that leaves every capture slot at least
/// one pixel wide and tall.
fn fit_margin(canvas: Dimensions, count: usize, requested: u32, footer: u32) -> u32 {
    let (cols, rows) = grid(canvas, count);
    let max_x = canvas.width.saturating_sub(cols) / (cols + 1);
    let max_y = canvas.height.saturating_sub(footer).saturating_sub(rows) / (rows + 1);
    requested.min(max_x).min(max_y)
}

fn capture_rects(canvas: Dimensions, count: usize, margin: u32, footer: u32) -> Vec<Rect> {
    let portrait = canvas.width < canvas.height;
    let n = count as u32;
    let total_w = canvas.width.saturating_sub(margin);
    let total_h = canvas.height.saturating_sub(footer.saturating_add(margin));

    let (width, height) = match count {
        1 => (total_w.saturating_sub(margin), total_h.saturating_sub(margin)),
        2 | 3 if portrait => (
            total_w.saturating_sub(margin),
            total_h.saturating_sub(n * margin) / n,
        ),
        2 | 3 => (
            total_w.saturating_sub(n * margin) / n,
            total_h.saturating_sub(margin),
        ),
        _ => (
            total_w.saturating_sub(2 * margin) / 2,
            total_h.saturating_sub(2 * margin) / 2,
        ),
    };
    let step_x = width + margin;
    let step_y = height + margin;

    match count {
        1 => vec![Rect::new(margin, margin, width, height)],
        2 | 3 => (0..n)
            .map(|i| {
                if portrait {
                    Rect::new(margin, margin + i * step_y, width, height)
                } else {
                    Rect::new(margin + i * step_x, margin, width, height)
                }
            })
            .collect(),
        _ => (0..4)
            .map(|i| {
                Rect::new(
                    margin + (i % 2) * step_x,
                    margin + (i / 2) * step_y,
                    width,
                    height,
                )
            })
            .collect(),
    }
}

/// Footer text rectangles inside the footer band.
///
/// Portrait stacks the texts, the first one twice as tall as the others.
/// Landscape puts them side by side, the first at full band height and the
/// others at half height, vertically centered.
fn text_rects(canvas: Dimensions, count: usize, margin: u32, footer: u32) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as u32;
    let x = margin;
    let y = canvas.height.saturating_sub(footer);
    let total_w = canvas.width.saturating_sub(margin.saturating_mul(2));

    if canvas.width < canvas.height {
        let interline = margin.min(footer / (n + 1));
        let total_h = footer.saturating_sub(interline);
        let line_h = total_h.saturating_sub(interline * (n - 1)) / (n + 1);
        let mut rects = vec![Rect::new(x, y, total_w, 2 * line_h)];
        let mut line_y = y + 2 * line_h;
        for _ in 1..n {
            line_y += interline;
            rects.push(Rect::new(x, line_y, total_w, line_h));
            line_y += line_h;
        }
        rects
    } else {
        let interline = margin.min(total_w / n);
        let total_h = footer.saturating_sub(margin);
        let column_w = total_w.saturating_sub(interline * (n - 1)) / n;
        let half_h = total_h / 2;
        let mut rects = vec![Rect::new(x, y, column_w, 2 * half_h)];
        let mut column_x = x + column_w;
        for _ in 1..n {
            column_x += interline;
            rects.push(Rect::new(
                column_x,
                y + (total_h - half_h) / 2,
                column_w,
                half_h,
            ));
            column_x += column_w;
        }
        rects
    }
}
