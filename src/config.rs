//! Booth configuration module.
//!
//! Handles loading, validating, and normalizing `printbooth.toml`. Stock
//! defaults are serialized to a TOML table and the user file is merged on top,
//! so a config file only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [picture]
//! orientation = "auto"              # auto | portrait | landscape
//! captures = [4, 1]                 # capture count choices, 1 to 4, at most two
//! captures_effects = "none"         # effect name, or one per capture
//! captures_cropping = false
//! margin_thick = 100                # pixels
//! footer_text1 = "Footer 1"
//! footer_text2 = "Footer 2"
//! text_colors = [0, 0, 0]           # one RGB, or one per footer text
//! text_fonts = ["Amatic-Bold", "AmaticSC-Regular"]
//! text_alignments = "center"        # left | center | right, or one per footer text
//! overlays = ""                     # PNG path, or one per captures choice
//! backgrounds = [255, 255, 255]     # RGB or image path, or one per captures choice
//! paper_format = [4.0, 6.0]         # inches
//! dpi = 600
//! outlines = false
//!
//! [rendering]
//! force_portable = false
//! font_dirs = []
//! assets_dir = "assets"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! ## Scalar or list
//!
//! Every style key accepts a single value or a list. A single value applies
//! to every slot; a short list repeats its last entry. Text keys are indexed by
//! footer text, `overlays` and `backgrounds` by the position of the chosen
//! capture count in `captures`, `captures_effects` by capture.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::calculations::canvas_size;
use crate::imaging::params::{Alignment, Background, FooterText, Rgb, StyleSpec};
use crate::imaging::text::{FontCatalog, default_font_dirs};
use crate::imaging::{FactoryOptions, Orientation, PaperFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// A config value given once for every slot, or once per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Value for slot `index`: the single value, the indexed entry, or the
    /// last entry of a short list. `None` only for an empty list.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.get(index).or(values.last()),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// Booth configuration loaded from `printbooth.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintboothConfig {
    /// Composite geometry and decoration.
    pub picture: PictureConfig,
    /// Backend and asset locations.
    pub rendering: RenderingConfig,
    /// Log level and format.
    pub logging: LoggingConfig,
}

impl PrintboothConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.picture.validate()?;
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "logging.level '{}' must be one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// The `[picture]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictureConfig {
    pub orientation: Orientation,
    /// Capture count choices offered to the guest.
    pub captures: OneOrMany<usize>,
    pub captures_effects: OneOrMany<String>,
    pub captures_cropping: bool,
    /// Gap in pixels between captures, texts and the page border.
    pub margin_thick: u32,
    pub footer_text1: String,
    pub footer_text2: String,
    pub text_colors: OneOrMany<Rgb>,
    /// Font names or font file paths.
    pub text_fonts: OneOrMany<String>,
    pub text_alignments: OneOrMany<String>,
    /// Overlay PNG paths; an empty string means no overlay.
    pub overlays: OneOrMany<String>,
    pub backgrounds: OneOrMany<Background>,
    /// Paper size in inches, in any order.
    pub paper_format: [f64; 2],
    pub dpi: u32,
    /// Draw placement rectangles, for layout debugging.
    pub outlines: bool,
}

impl Default for PictureConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Auto,
            captures: OneOrMany::Many(vec![4, 1]),
            captures_effects: OneOrMany::One("none".to_string()),
            captures_cropping: false,
            margin_thick: 100,
            footer_text1: "Footer 1".to_string(),
            footer_text2: "Footer 2".to_string(),
            text_colors: OneOrMany::One(Rgb::BLACK),
            text_fonts: OneOrMany::Many(vec![
                "Amatic-Bold".to_string(),
                "AmaticSC-Regular".to_string(),
            ]),
            text_alignments: OneOrMany::One("center".to_string()),
            overlays: OneOrMany::One(String::new()),
            backgrounds: OneOrMany::One(Background::Color(Rgb::WHITE)),
            paper_format: [4.0, 6.0],
            dpi: 600,
            outlines: false,
        }
    }
}

impl PictureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let choices = self.captures.to_vec();
        if choices.is_empty() || choices.len() > 2 {
            return Err(ConfigError::Validation(
                "picture.captures must hold one or two choices".into(),
            ));
        }
        if let Some(bad) = choices.iter().find(|n| !(1..=4).contains(*n)) {
            return Err(ConfigError::Validation(format!(
                "picture.captures values must be 1 to 4, got {bad}"
            )));
        }
        if self.dpi == 0 {
            return Err(ConfigError::Validation("picture.dpi must be non-zero".into()));
        }
        if self
            .paper_format
            .iter()
            .any(|d| !d.is_finite() || *d <= 0.0)
        {
            return Err(ConfigError::Validation(
                "picture.paper_format dimensions must be positive".into(),
            ));
        }
        let short_side = canvas_size(self.paper(), self.dpi, false).width;
        if u64::from(self.margin_thick) * 4 >= u64::from(short_side) {
            return Err(ConfigError::Validation(format!(
                "picture.margin_thick must be less than a quarter of the page's short side \
                 ({short_side} px at {} dpi), got {}",
                self.dpi, self.margin_thick
            )));
        }
        for align in self.text_alignments.to_vec() {
            align
                .parse::<Alignment>()
                .map_err(|e| ConfigError::Validation(format!("picture.text_alignments: {e}")))?;
        }
        Ok(())
    }

    /// Capture count choices, in configured order.
    pub fn capture_choices(&self) -> Vec<usize> {
        self.captures.to_vec()
    }

    pub fn paper(&self) -> PaperFormat {
        PaperFormat::new(self.paper_format[0], self.paper_format[1])
    }

    /// Page options for the factory.
    pub fn factory_options(&self, force_portable: bool) -> FactoryOptions {
        FactoryOptions {
            orientation: self.orientation,
            paper_format: self.paper(),
            force_portable,
            backend: None,
            dpi: self.dpi,
        }
    }

    /// Normalize the scalar-or-list keys into the style of a composite with
    /// `count` captures.
    pub fn style_for(&self, count: usize) -> StyleSpec {
        let choice = self
            .capture_choices()
            .iter()
            .position(|&n| n == count)
            .unwrap_or(0);

        let texts = [&self.footer_text1, &self.footer_text2]
            .into_iter()
            .enumerate()
            .map(|(i, text)| FooterText {
                text: text.clone(),
                font: self.text_fonts.get(i).cloned().unwrap_or_default(),
                color: self.text_colors.get(i).copied().unwrap_or(Rgb::BLACK),
                align: self
                    .text_alignments
                    .get(i)
                    .and_then(|a| a.parse().ok())
                    .unwrap_or_default(),
            })
            .collect();

        StyleSpec {
            texts,
            background: self.backgrounds.get(choice).cloned().unwrap_or_default(),
            overlay: self
                .overlays
                .get(choice)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            effects: self.captures_effects.to_vec(),
            crop: self.captures_cropping,
            margin: self.margin_thick,
            outlines: self.outlines,
        }
    }
}

/// The `[rendering]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderingConfig {
    /// Never use the accelerated backend.
    pub force_portable: bool,
    /// Font directories searched before the system ones. `~/` is expanded.
    pub font_dirs: Vec<String>,
    /// Directory holding `layout{n}.png` and other screen assets.
    pub assets_dir: String,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            force_portable: false,
            font_dirs: Vec::new(),
            assets_dir: "assets".to_string(),
        }
    }
}

impl RenderingConfig {
    /// Configured font directories followed by the platform defaults.
    pub fn font_search_dirs(&self) -> Vec<PathBuf> {
        self.font_dirs
            .iter()
            .map(|d| expand_home(d))
            .chain(default_font_dirs())
            .collect()
    }

    pub fn font_catalog(&self) -> FontCatalog {
        FontCatalog::new(self.font_search_dirs())
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrintboothConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PrintboothConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrintboothConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `path` over the stock defaults. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PrintboothConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Returns a fully-commented stock `printbooth.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Printbooth Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Style keys accept one value or a list. A single value applies to every
# slot, a short list repeats its last entry.

# ---------------------------------------------------------------------------
# Final picture
# ---------------------------------------------------------------------------
[picture]
# Orientation of the final picture: "auto", "portrait" or "landscape".
# auto follows the first capture: 1 or 4 captures keep its orientation,
# 2 or 3 captures use the opposite one.
orientation = "auto"

# Possible choice(s) of captures numbers (1 to 4, at most two choices).
captures = [4, 1]

# Effect applied to the captures, or one per capture.
# Known: none, grayscale, sepia, invert, blur, brighten, contrast.
captures_effects = "none"

# Crop each capture to the shape of its slot instead of letterboxing it.
captures_cropping = false

# Thickness in pixels between captures and picture borders/texts.
# Must be less than a quarter of the page's short side in pixels.
margin_thick = 100

# Main and secondary footer texts. Leave both empty for no footer band.
footer_text1 = "Footer 1"
footer_text2 = "Footer 2"

# RGB colors used for footer texts.
text_colors = [0, 0, 0]

# Font names or file paths used for footer texts.
text_fonts = ["Amatic-Bold", "AmaticSC-Regular"]

# Alignments used for footer texts: "left", "center" or "right".
text_alignments = "center"

# Overlay PNG with the same aspect ratio as the final picture, per captures
# choice. Empty for none.
overlays = ""

# Background RGB color or image path, per captures choice.
backgrounds = [255, 255, 255]

# Paper size in inches, in any order.
paper_format = [4.0, 6.0]

# Print resolution.
dpi = 600

# Draw capture and text rectangles in red (layout debugging).
outlines = false

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[rendering]
# Never use the accelerated backend.
force_portable = false

# Extra font directories, searched before the system ones.
font_dirs = []

# Directory holding layout1.png .. layout4.png for layout previews.
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# trace, debug, info, warn or error. RUST_LOG overrides it.
level = "info"

# JSON lines instead of human-readable output.
json = false
"##
}
