//! Parameter types for composite rendering.
//!
//! These structs describe *what* to draw, not *how* to draw it. They are the
//! interface between the [`factory`](super::factory) (which decides the page
//! layout and resolves assets) and the [`backend`](super::backend) (which does
//! the actual pixel work). This separation allows swapping backends (or a
//! mock in tests) without changing orchestration logic.
//!
//! ## Types
//!
//! - [`Rgb`]: 8-bit color, written `[r, g, b]` in config files.
//! - [`Alignment`]: horizontal alignment of a footer text in its rectangle.
//! - [`Background`]: solid color or image path.
//! - [`FooterText`]: one footer text with its font, color and alignment.
//! - [`StyleSpec`]: everything decorative about one composite, one entry per slot.
//! - [`RenderJob`]: a fully resolved job handed to a backend.

use super::calculations::Rect;
use super::effects::EffectRegistry;
use super::layout::LayoutSpec;
use image::{DynamicImage, Rgba, RgbaImage};
use rusttype::Font;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn to_rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }

    /// Channel-wise complement, used as the default recolor background.
    pub fn inverse(self) -> Rgb {
        let [r, g, b] = self.0;
        Rgb([255 - r, 255 - g, 255 - b])
    }
}

/// Horizontal alignment of a text inside its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(format!("unknown alignment '{other}'")),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        })
    }
}

/// Canvas background: a solid color or an image file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Background {
    Color(Rgb),
    Image(PathBuf),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Rgb::WHITE)
    }
}

/// One footer text.
#[derive(Debug, Clone, PartialEq)]
pub struct FooterText {
    pub text: String,
    /// Font name (looked up in the font directories) or font file path.
    pub font: String,
    pub color: Rgb,
    pub align: Alignment,
}

/// Decoration of one composite, already normalized to explicit slots.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    /// Footer texts in display order. Empty texts are ignored.
    pub texts: Vec<FooterText>,
    pub background: Background,
    pub overlay: Option<PathBuf>,
    /// Effect name per capture; missing entries reuse the last one.
    pub effects: Vec<String>,
    pub crop: bool,
    pub margin: u32,
    pub outlines: bool,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            background: Background::default(),
            overlay: None,
            effects: Vec::new(),
            crop: false,
            margin: 100,
            outlines: false,
        }
    }
}

impl StyleSpec {
    /// Effect for the capture at `index` (`"none"` when nothing is configured).
    pub fn effect_for(&self, index: usize) -> &str {
        effect_at(&self.effects, index)
    }
}

/// Entry `index` of a per-capture effect list; a short list repeats its last
/// entry and an empty one means `"none"`.
pub fn effect_at(effects: &[String], index: usize) -> &str {
    effects
        .get(index)
        .or(effects.last())
        .map(String::as_str)
        .unwrap_or("none")
}

/// Background after asset resolution.
#[derive(Debug, Clone)]
pub enum ResolvedBackground {
    Color(Rgb),
    Image(DynamicImage),
}

/// Footer text after font resolution, bound to its layout rectangle.
#[derive(Clone)]
pub struct ResolvedText {
    pub text: String,
    /// `None` when no font could be loaded; the text is then skipped.
    pub font: Option<Arc<Font<'static>>>,
    pub color: Rgb,
    pub align: Alignment,
    pub rect: Rect,
}

impl fmt::Debug for ResolvedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedText")
            .field("text", &self.text)
            .field("font", &self.font.is_some())
            .field("color", &self.color)
            .field("align", &self.align)
            .field("rect", &self.rect)
            .finish()
    }
}

/// Everything a backend needs to render one composite.
pub struct RenderJob<'a> {
    pub captures: &'a [DynamicImage],
    pub layout: &'a LayoutSpec,
    pub background: ResolvedBackground,
    pub overlay: Option<RgbaImage>,
    pub texts: Vec<ResolvedText>,
    pub effects: &'a EffectRegistry,
    /// One effect name per capture.
    pub effect_names: Vec<String>,
    pub crop: bool,
    pub outlines: bool,
}
