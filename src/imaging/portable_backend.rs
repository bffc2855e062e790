//! Portable composite backend, always compiled in.
//!
//! Single-threaded and built only on the `image` crate.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Background | `image::RgbaImage::from_pixel` or `DynamicImage::resize_exact` |
//! | Capture resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Paste / overlay | `image::imageops::overlay` |
//! | Text | `rusttype` glyph rasterization, fitted per rectangle |
//! | Outlines | manual one-pixel stroke |

use super::backend::{BackendError, BackendKind, CompositeBackend};
use super::calculations::Rect;
use super::operations::{
    OUTLINE_COLOR, apply_overlay, build_background, draw_texts, outline_rects, paste_centered,
    prepare_capture,
};
use super::params::RenderJob;
use image::RgbaImage;
use image::imageops::FilterType;

const FILTER: FilterType = FilterType::Lanczos3;

/// Sequential backend using the `image` crate only.
pub struct PortableBackend;

impl PortableBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PortableBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeBackend for PortableBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Portable
    }

    fn render(&self, job: &RenderJob<'_>) -> Result<RgbaImage, BackendError> {
        check_job(job)?;
        let layout = job.layout;
        let mut canvas = build_background(&job.background, layout.canvas, FILTER);

        for (index, (capture, slot)) in job.captures.iter().zip(&layout.captures).enumerate() {
            let effect = job.effect_names.get(index).map(String::as_str).unwrap_or("none");
            let prepared = prepare_capture(capture, slot, job.crop, FILTER, job.effects, effect);
            paste_centered(&mut canvas, &prepared, slot);
        }

        if let Some(overlay) = &job.overlay {
            apply_overlay(&mut canvas, overlay, FILTER);
        }

        draw_texts(&mut canvas, &job.texts);

        if job.outlines {
            for rect in outline_rects(&layout.captures, &job.texts) {
                stroke_rect(&mut canvas, rect);
            }
        }

        Ok(canvas)
    }
}

/// Captures and layout slots must pair up one to one.
pub(crate) fn check_job(job: &RenderJob<'_>) -> Result<(), BackendError> {
    if job.captures.len() != job.layout.captures.len() {
        return Err(BackendError::ProcessingFailed(format!(
            "{} captures for {} layout slots",
            job.captures.len(),
            job.layout.captures.len()
        )));
    }
    Ok(())
}

fn stroke_rect(canvas: &mut RgbaImage, rect: &Rect) {
    let color = OUTLINE_COLOR.to_rgba();
    let (w, h) = canvas.dimensions();
    let right = rect.right().saturating_sub(1).min(w.saturating_sub(1));
    let bottom = rect.bottom().saturating_sub(1).min(h.saturating_sub(1));
    if rect.x >= w || rect.y >= h {
        return;
    }
    for x in rect.x..=right {
        canvas.put_pixel(x, rect.y, color);
        canvas.put_pixel(x, bottom, color);
    }
    for y in rect.y..=bottom {
        canvas.put_pixel(rect.x, y, color);
        canvas.put_pixel(right, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::Dimensions;
    use crate::imaging::effects::EffectRegistry;
    use crate::imaging::layout::LayoutSpec;
    use crate::imaging::params::{ResolvedBackground, Rgb};
    use crate::test_helpers::{color_at_center, solid_capture};
    use image::{DynamicImage, Rgba};

    fn job<'a>(
        captures: &'a [DynamicImage],
        layout: &'a LayoutSpec,
        effects: &'a EffectRegistry,
    ) -> RenderJob<'a> {
        RenderJob {
            captures,
            layout,
            background: ResolvedBackground::Color(Rgb::WHITE),
            overlay: None,
            texts: Vec::new(),
            effects,
            effect_names: vec!["none".into(); captures.len()],
            crop: false,
            outlines: false,
        }
    }

    // =========================================================================
    // Canvas and placement
    // =========================================================================

    #[test]
    fn output_matches_canvas_size() {
        let captures = vec![solid_capture(60, 40, [0, 0, 255]); 2];
        let layout = LayoutSpec::new(Dimensions::new(240, 360), 2, 10, 0);
        let effects = EffectRegistry::default();
        let out = PortableBackend::new()
            .render(&job(&captures, &layout, &effects))
            .unwrap();
        assert_eq!(out.dimensions(), (240, 360));
    }

    #[test]
    fn captures_land_in_their_slots() {
        let captures = vec![
            solid_capture(60, 40, [255, 0, 0]),
            solid_capture(60, 40, [0, 255, 0]),
        ];
        let layout = LayoutSpec::new(Dimensions::new(240, 360), 2, 10, 0);
        let effects = EffectRegistry::default();
        let out = PortableBackend::new()
            .render(&job(&captures, &layout, &effects))
            .unwrap();
        assert_eq!(color_at_center(&out, &layout.captures[0]), Rgba([255, 0, 0, 255]));
        assert_eq!(color_at_center(&out, &layout.captures[1]), Rgba([0, 255, 0, 255]));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn effect_is_applied_per_capture() {
        let captures = vec![solid_capture(60, 40, [200, 0, 0])];
        let layout = LayoutSpec::new(Dimensions::new(240, 360), 1, 10, 0);
        let effects = EffectRegistry::default();
        let mut render = job(&captures, &layout, &effects);
        render.effect_names = vec!["grayscale".into()];
        let out = PortableBackend::new().render(&render).unwrap();
        let Rgba([r, g, b, _]) = color_at_center(&out, &layout.captures[0]);
        assert!(r == g && g == b);
    }

    #[test]
    fn overlay_covers_captures() {
        let captures = vec![solid_capture(60, 40, [255, 0, 0])];
        let layout = LayoutSpec::new(Dimensions::new(120, 180), 1, 10, 0);
        let effects = EffectRegistry::default();
        let mut render = job(&captures, &layout, &effects);
        render.overlay = Some(RgbaImage::from_pixel(12, 18, Rgba([0, 0, 0, 255])));
        let out = PortableBackend::new().render(&render).unwrap();
        assert_eq!(color_at_center(&out, &layout.captures[0]), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn outlines_are_red() {
        let captures = vec![solid_capture(60, 40, [0, 0, 255])];
        let layout = LayoutSpec::new(Dimensions::new(120, 180), 1, 10, 0);
        let effects = EffectRegistry::default();
        let mut render = job(&captures, &layout, &effects);
        render.outlines = true;
        let out = PortableBackend::new().render(&render).unwrap();
        let slot = layout.captures[0];
        assert_eq!(*out.get_pixel(slot.x, slot.y), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn empty_slot_gets_no_outline() {
        let captures = vec![solid_capture(60, 40, [0, 0, 255])];
        let mut layout = LayoutSpec::new(Dimensions::new(120, 180), 1, 10, 0);
        layout.captures[0] = Rect::new(50, 50, 0, 40);
        let effects = EffectRegistry::default();
        let mut render = job(&captures, &layout, &effects);
        render.outlines = true;
        let out = PortableBackend::new().render(&render).unwrap();
        assert_eq!(*out.get_pixel(50, 50), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn mismatched_capture_count_fails() {
        let captures = vec![solid_capture(60, 40, [0, 0, 255])];
        let layout = LayoutSpec::new(Dimensions::new(120, 180), 2, 10, 0);
        let effects = EffectRegistry::default();
        let result = PortableBackend::new().render(&job(&captures, &layout, &effects));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
