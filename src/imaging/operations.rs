//! Pixel operations shared by both backends.
//!
//! Backends differ in scheduling and resampling filter, not in what they draw,
//! so each step of the render contract lives here once:
//!
//! 1. [`build_background`]: solid fill, or image center-cropped to the canvas ratio and resized
//! 2. [`prepare_capture`]: optional crop to the slot ratio, fit-resize, effect
//! 3. [`paste_centered`]: center the prepared capture in its slot
//! 4. [`apply_overlay`]: alpha-composite the overlay over the whole canvas
//! 5. [`draw_texts`]: footer texts fitted to their rectangles

use super::backend::Dimensions;
use super::calculations::{Rect, centered_position, crop_rect_for_ratio, scaled_size};
use super::effects::EffectRegistry;
use super::params::{ResolvedBackground, ResolvedText, Rgb};
use super::text::draw_text_in_rect;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Stroke color of debug outlines.
pub const OUTLINE_COLOR: Rgb = Rgb([255, 0, 0]);

/// Canvas filled with the job background.
pub fn build_background(
    background: &ResolvedBackground,
    canvas: Dimensions,
    filter: FilterType,
) -> RgbaImage {
    match background {
        ResolvedBackground::Color(color) => {
            RgbaImage::from_pixel(canvas.width, canvas.height, color.to_rgba())
        }
        ResolvedBackground::Image(image) => {
            let crop = crop_rect_for_ratio(Dimensions::of(image), canvas);
            image
                .crop_imm(crop.x, crop.y, crop.width, crop.height)
                .resize_exact(canvas.width, canvas.height, filter)
                .to_rgba8()
        }
    }
}

/// Fit one capture into `slot`: crop to the slot ratio when `crop` is set,
/// resize keeping the aspect ratio, then apply the named effect.
///
/// The capture itself is never modified.
pub fn prepare_capture(
    capture: &DynamicImage,
    slot: &Rect,
    crop: bool,
    filter: FilterType,
    effects: &EffectRegistry,
    effect: &str,
) -> RgbaImage {
    let source = if crop {
        let window = crop_rect_for_ratio(Dimensions::of(capture), slot.size());
        capture.crop_imm(window.x, window.y, window.width, window.height)
    } else {
        capture.clone()
    };

    let size = scaled_size(Dimensions::of(&source), slot.size());
    let resized = source.resize_exact(size.width, size.height, filter);
    effects.apply(effect, resized).to_rgba8()
}

/// Paste `image` centered in `slot`.
pub fn paste_centered(canvas: &mut RgbaImage, image: &RgbaImage, slot: &Rect) {
    let (x, y) = centered_position(
        slot,
        Dimensions {
            width: image.width(),
            height: image.height(),
        },
    );
    debug!(x, y, width = image.width(), height = image.height(), "placing capture");
    imageops::overlay(canvas, image, x as i64, y as i64);
}

/// Composite `overlay` over the full canvas, stretching it if its size differs.
pub fn apply_overlay(canvas: &mut RgbaImage, overlay: &RgbaImage, filter: FilterType) {
    if overlay.dimensions() == canvas.dimensions() {
        imageops::overlay(canvas, overlay, 0, 0);
    } else {
        let resized = imageops::resize(overlay, canvas.width(), canvas.height(), filter);
        imageops::overlay(canvas, &resized, 0, 0);
    }
}

/// Draw every footer text that has a font.
pub fn draw_texts(canvas: &mut RgbaImage, texts: &[ResolvedText]) {
    for text in texts {
        if let Some(font) = &text.font {
            draw_text_in_rect(canvas, font, &text.text, &text.rect, text.color, text.align);
        }
    }
}

/// Rectangles drawn when debug outlines are enabled. Empty rectangles are
/// skipped.
pub fn outline_rects<'a>(
    captures: &'a [Rect],
    texts: &'a [ResolvedText],
) -> impl Iterator<Item = &'a Rect> {
    captures
        .iter()
        .chain(texts.iter().map(|t| &t.rect))
        .filter(|rect| rect.width > 0 && rect.height > 0)
}
