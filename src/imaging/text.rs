//! Font lookup and fit-to-rectangle text drawing.
//!
//! [`FontCatalog`] is a process-scoped cache created once by the caller and
//! passed by reference to whatever needs fonts. A font is named either by a
//! file path or by its file stem (`"Amatic-Bold"` matches
//! `Amatic-Bold.ttf` anywhere below the configured font directories).
//! Lookups are cached, including misses.

use super::calculations::Rect;
use super::params::{Alignment, Rgb};
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use walkdir::WalkDir;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Families tried, in order, when a requested font cannot be found.
const FALLBACK_FONTS: &[&str] = &[
    "DejaVuSans",
    "LiberationSans-Regular",
    "FreeSans",
    "Arial",
    "Helvetica",
];

pub type SharedFont = Arc<Font<'static>>;

/// Cached font resolution over a set of directories.
pub struct FontCatalog {
    dirs: Vec<PathBuf>,
    cache: Mutex<HashMap<String, Option<SharedFont>>>,
}

impl FontCatalog {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Catalog over the usual system font directories.
    pub fn system() -> Self {
        Self::new(default_font_dirs())
    }

    /// Resolve `name`, falling back to any default font when it is missing.
    pub fn resolve(&self, name: &str) -> Option<SharedFont> {
        if let Some(font) = self.lookup(name) {
            return Some(font);
        }
        warn!(font = name, "font not found, using a default font");
        self.default_font()
    }

    /// First available font from the fallback list, else any font at all.
    pub fn default_font(&self) -> Option<SharedFont> {
        FALLBACK_FONTS
            .iter()
            .find_map(|name| self.lookup(name))
            .or_else(|| self.lookup("*"))
    }

    /// Resolve `name` exactly (path or file stem), without fallback.
    pub fn lookup(&self, name: &str) -> Option<SharedFont> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(name) {
            return cached.clone();
        }
        let font = self.find_file(name).and_then(|path| load_font(&path));
        cache.insert(name.to_string(), font.clone());
        font
    }

    fn find_file(&self, name: &str) -> Option<PathBuf> {
        let as_path = Path::new(name);
        if as_path.is_file() {
            return Some(as_path.to_path_buf());
        }
        let wanted = name.to_ascii_lowercase();
        self.dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| WalkDir::new(dir).follow_links(true).into_iter())
            .filter_map(Result::ok)
            .map(|entry| entry.into_path())
            .filter(|path| has_font_extension(path))
            .find(|path| {
                wanted == "*"
                    || path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .is_some_and(|stem| stem.eq_ignore_ascii_case(&wanted))
            })
    }
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
}

fn load_font(path: &Path) -> Option<SharedFont> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read font file");
            return None;
        }
    };
    match Font::try_from_vec(bytes) {
        Some(font) => {
            debug!(path = %path.display(), "loaded font");
            Some(Arc::new(font))
        }
        None => {
            warn!(path = %path.display(), "not a usable TrueType/OpenType font");
            None
        }
    }
}

/// Standard font directories for this platform, user directory included.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(&home).join(".fonts"));
        dirs.push(PathBuf::from(home).join(".local/share/fonts"));
    }
    dirs
}

/// Rendered extent of `text` at `scale`: (advance width, line height).
pub fn text_extent(font: &Font<'_>, scale: Scale, text: &str) -> (f32, f32) {
    let v_metrics = font.v_metrics(scale);
    let width = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0);
    (width, v_metrics.ascent - v_metrics.descent)
}

/// Largest uniform scale at which `text` fits in `max_width` x `max_height`.
pub fn fit_scale(font: &Font<'_>, text: &str, max_width: u32, max_height: u32) -> Scale {
    let fits = |px: u32| {
        let (w, h) = text_extent(font, Scale::uniform(px as f32), text);
        w <= max_width as f32 && h <= max_height as f32
    };

    // Text height grows linearly with px, so the answer is below max_height
    let (mut lo, mut hi) = (1u32, max_height.max(1));
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Scale::uniform(lo as f32)
}

/// Draw `text` as large as possible inside `rect`, aligned horizontally and
/// centered vertically.
pub fn draw_text_in_rect(
    canvas: &mut RgbaImage,
    font: &Font<'_>,
    text: &str,
    rect: &Rect,
    color: Rgb,
    align: Alignment,
) {
    if text.is_empty() || rect.width == 0 || rect.height == 0 {
        return;
    }
    let scale = fit_scale(font, text, rect.width, rect.height);
    let (width, height) = text_extent(font, scale, text);

    let x = rect.x as f32
        + match align {
            Alignment::Left => 0.0,
            Alignment::Center => (rect.width as f32 - width) / 2.0,
            Alignment::Right => rect.width as f32 - width,
        };
    let y = rect.y as f32 + (rect.height as f32 - height) / 2.0;

    draw_text(canvas, font, scale, x, y, color, text);
}

/// Draw `text` with its top-left line box corner at `(x, y)`.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &Font<'_>,
    scale: Scale,
    x: f32,
    y: f32,
    color: Rgb,
    text: &str,
) {
    let v_metrics = font.v_metrics(scale);
    let [cr, cg, cb] = color.0;

    for glyph in font.layout(text, scale, point(x, y + v_metrics.ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px >= canvas.width() as i32 || py >= canvas.height() as i32 {
                return;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            blend_pixel(pixel, Rgba([cr, cg, cb, (coverage * 255.0).round() as u8]));
        });
    }
}

/// Source-over blend of `top` onto `dst`.
pub fn blend_pixel(dst: &mut Rgba<u8>, top: Rgba<u8>) {
    let alpha = top[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for c in 0..3 {
        dst[c] = (top[c] as f32 * alpha + dst[c] as f32 * inv).round() as u8;
    }
    dst[3] = (top[3] as f32 + dst[3] as f32 * inv).round().min(255.0) as u8;
}
