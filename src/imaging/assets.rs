//! Decorative bitmaps for the booth screen: pictos, arrows and the layout
//! choice thumbnails.
//!
//! Assets are white-on-transparent PNGs recolored on load. A missing or
//! unreadable asset never fails: it is replaced by a transparent bitmap of the
//! requested size and a warning is logged.

use super::backend::Dimensions;
use super::calculations::{Rect, crop_rect_for_ratio, scaled_size};
use super::factory::ComposeError;
use super::layout::LayoutSpec;
use super::params::{Alignment, Rgb};
use super::text::{FontCatalog, draw_text_in_rect};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How to transform an asset after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetOptions {
    /// Fit inside this size, keeping the aspect ratio.
    pub size: Option<Dimensions>,
    /// Lanczos3 resampling when set, nearest neighbour otherwise.
    pub antialias: bool,
    pub hflip: bool,
    pub vflip: bool,
    /// Crop to the aspect ratio of `size` before resizing.
    pub crop: bool,
    /// Counter-clockwise rotation in degrees, rounded to a multiple of 90.
    pub angle: i32,
    /// Recolor white to this color. `None` keeps the original pixels.
    pub color: Option<Rgb>,
    /// Recolor black to this color; defaults to the inverse of `color`.
    pub bg_color: Option<Rgb>,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            size: None,
            antialias: true,
            hflip: false,
            vflip: false,
            crop: false,
            angle: 0,
            color: Some(Rgb::WHITE),
            bg_color: None,
        }
    }
}

/// Map luminance onto a `bg_color` → `color` gradient, keeping alpha.
pub fn colorize(image: &DynamicImage, color: Rgb, bg_color: Option<Rgb>) -> RgbaImage {
    let bg = bg_color.unwrap_or_else(|| color.inverse());
    let gray = image.to_luma8();
    let mut out = image.to_rgba8();
    for (pixel, luma) in out.pixels_mut().zip(gray.pixels()) {
        let t = luma[0] as f32 / 255.0;
        for c in 0..3 {
            let from = bg.0[c] as f32;
            let to = color.0[c] as f32;
            pixel[c] = (from + (to - from) * t).round() as u8;
        }
    }
    out
}

/// Loads assets from one directory.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    /// Load `name` and apply `options`.
    pub fn load(&self, name: &str, options: &AssetOptions) -> RgbaImage {
        let path = self.root.join(name);
        let image = match image::open(&path) {
            Ok(image) => {
                debug!(path = %path.display(), "loaded asset");
                image
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "asset unavailable, using a blank image");
                let size = options.size.unwrap_or(Dimensions::new(1, 1));
                DynamicImage::ImageRgba8(RgbaImage::new(size.width.max(1), size.height.max(1)))
            }
        };
        transform(image, options)
    }
}

fn transform(image: DynamicImage, options: &AssetOptions) -> RgbaImage {
    let mut image = match options.color {
        Some(color) => DynamicImage::ImageRgba8(colorize(&image, color, options.bg_color)),
        None => image,
    };

    if let Some(size) = options.size {
        if options.crop {
            let window = crop_rect_for_ratio(Dimensions::of(&image), size);
            image = image.crop_imm(window.x, window.y, window.width, window.height);
        }
        let fitted = scaled_size(Dimensions::of(&image), size);
        let filter = if options.antialias {
            FilterType::Lanczos3
        } else {
            FilterType::Nearest
        };
        image = image.resize_exact(fitted.width, fitted.height, filter);
    }

    if options.hflip {
        image = image.fliph();
    }
    if options.vflip {
        image = image.flipv();
    }

    let quarter_turns = ((options.angle as f32 / 90.0).round() as i32).rem_euclid(4);
    if options.angle % 90 != 0 {
        warn!(angle = options.angle, "asset rotation rounded to a quarter turn");
    }
    image = match quarter_turns {
        1 => image.rotate270(),
        2 => image.rotate180(),
        3 => image.rotate90(),
        _ => image,
    };

    image.to_rgba8()
}

/// Caption area of a layout thumbnail, relative to the thumbnail size.
pub fn caption_rect(size: Dimensions) -> Rect {
    let w = size.width as f64;
    let h = size.height as f64;
    Rect::new(
        (w * 0.15).round() as u32,
        (h * 0.76).round() as u32,
        (w * 0.70).round() as u32,
        (h * 0.20).round() as u32,
    )
}

/// Thumbnail of the layout for `count` captures, fitted inside `size`.
///
/// Uses `layout{count}.png` from the asset directory when present and draws a
/// silhouette from [`LayoutSpec`] otherwise. `label` is drawn in `bg_color`
/// over the caption area.
pub fn layout_preview(
    loader: &AssetLoader,
    fonts: &FontCatalog,
    text_color: Rgb,
    bg_color: Rgb,
    count: usize,
    size: Dimensions,
    label: Option<&str>,
) -> Result<RgbaImage, ComposeError> {
    if !(1..=4).contains(&count) {
        return Err(ComposeError::InvalidCaptureCount(count));
    }

    let name = format!("layout{count}.png");
    let mut image = if loader.exists(&name) {
        loader.load(
            &name,
            &AssetOptions {
                size: Some(size),
                color: Some(text_color),
                bg_color: Some(bg_color),
                ..AssetOptions::default()
            },
        )
    } else {
        debug!(asset = %name, "drawing layout silhouette");
        silhouette(count, size, text_color, bg_color)
    };

    if let Some(text) = label.filter(|t| !t.is_empty()) {
        let size = Dimensions::new(image.width(), image.height());
        match fonts.default_font() {
            Some(font) => draw_text_in_rect(
                &mut image,
                &font,
                text,
                &caption_rect(size),
                bg_color,
                Alignment::Center,
            ),
            None => warn!(label = text, "no font available, layout caption skipped"),
        }
    }
    Ok(image)
}

fn silhouette(count: usize, size: Dimensions, color: Rgb, bg_color: Rgb) -> RgbaImage {
    let size = Dimensions::new(size.width.max(1), size.height.max(1));
    let margin = (size.width.min(size.height) / 20).max(1);
    let layout = LayoutSpec::new(size, count, margin, 1);

    let mut image = RgbaImage::from_pixel(size.width, size.height, color.to_rgba());
    let fill = bg_color.to_rgba();
    for rect in &layout.captures {
        let block = RgbaImage::from_pixel(rect.width.max(1), rect.height.max(1), fill);
        imageops::replace(&mut image, &block, rect.x as i64, rect.y as i64);
    }
    image
}
