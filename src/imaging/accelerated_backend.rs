//! Accelerated composite backend (`accelerated` feature).
//!
//! Captures are cropped, resized and run through their effect in parallel on
//! the rayon pool; compositing onto the canvas stays sequential so placement
//! order is deterministic.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Capture preparation | `rayon::par_iter` over captures, `CatmullRom` resampling |
//! | Paste / overlay | `image::imageops::overlay` |
//! | Text | `rusttype` glyph rasterization, fitted per rectangle |
//! | Outlines | `imageproc::drawing::draw_hollow_rect_mut` |

use super::backend::{BackendError, BackendKind, CompositeBackend};
use super::operations::{
    OUTLINE_COLOR, apply_overlay, build_background, draw_texts, outline_rects, paste_centered,
    prepare_capture,
};
use super::params::RenderJob;
use super::portable_backend::check_job;
use image::RgbaImage;
use image::imageops::FilterType;
use imageproc::drawing::draw_hollow_rect_mut;
use rayon::prelude::*;

const FILTER: FilterType = FilterType::CatmullRom;

/// Rayon-parallel backend with imageproc drawing.
pub struct AcceleratedBackend;

impl AcceleratedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AcceleratedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeBackend for AcceleratedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Accelerated
    }

    fn render(&self, job: &RenderJob<'_>) -> Result<RgbaImage, BackendError> {
        check_job(job)?;
        let layout = job.layout;

        let (mut canvas, prepared) = rayon::join(
            || build_background(&job.background, layout.canvas, FILTER),
            || {
                job.captures
                    .par_iter()
                    .zip(layout.captures.par_iter())
                    .enumerate()
                    .map(|(index, (capture, slot))| {
                        let effect = job
                            .effect_names
                            .get(index)
                            .map(String::as_str)
                            .unwrap_or("none");
                        prepare_capture(capture, slot, job.crop, FILTER, job.effects, effect)
                    })
                    .collect::<Vec<_>>()
            },
        );

        for (image, slot) in prepared.iter().zip(&layout.captures) {
            paste_centered(&mut canvas, image, slot);
        }

        if let Some(overlay) = &job.overlay {
            apply_overlay(&mut canvas, overlay, FILTER);
        }

        draw_texts(&mut canvas, &job.texts);

        if job.outlines {
            for rect in outline_rects(&layout.captures, &job.texts) {
                let shape = imageproc::rect::Rect::at(rect.x as i32, rect.y as i32)
                    .of_size(rect.width, rect.height);
                draw_hollow_rect_mut(&mut canvas, shape, OUTLINE_COLOR.to_rgba());
            }
        }

        Ok(canvas)
    }
}
