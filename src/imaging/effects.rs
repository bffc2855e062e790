//! Named capture effects.
//!
//! The registry maps an effect name to a pure image transform. Names are
//! matched case-insensitively. Unknown names never fail a composite: they
//! fall back to grayscale, which every backend supports.
//!
//! | Name | Transform |
//! |---|---|
//! | `none` | identity |
//! | `grayscale` | luma conversion |
//! | `sepia` | warm brown tone |
//! | `invert` | color negative |
//! | `blur` | gaussian blur, sigma 2 |
//! | `brighten` | +30 brightness |
//! | `contrast` | +25% contrast |

use image::{DynamicImage, Rgba};
use std::collections::HashMap;
use tracing::warn;

/// A pure image transform.
pub type EffectFn = fn(DynamicImage) -> DynamicImage;

/// Effect name → transform.
pub struct EffectRegistry {
    effects: HashMap<String, EffectFn>,
}

impl EffectRegistry {
    /// Registry with no effects (not even `none`).
    pub fn empty() -> Self {
        Self {
            effects: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, effect: EffectFn) {
        self.effects.insert(name.to_ascii_lowercase(), effect);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(&name.to_ascii_lowercase())
    }

    /// Sorted effect names, for help output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply the effect called `name`, or grayscale if it is not registered.
    pub fn apply(&self, name: &str, image: DynamicImage) -> DynamicImage {
        match self.effects.get(&name.to_ascii_lowercase()) {
            Some(effect) => effect(image),
            None => {
                warn!(effect = name, "unknown capture effect, using grayscale");
                grayscale(image)
            }
        }
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("none", identity);
        registry.register("grayscale", grayscale);
        registry.register("sepia", sepia);
        registry.register("invert", invert);
        registry.register("blur", blur);
        registry.register("brighten", brighten);
        registry.register("contrast", contrast);
        registry
    }
}

fn identity(image: DynamicImage) -> DynamicImage {
    image
}

fn grayscale(image: DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgba8(image.grayscale().to_rgba8())
}

fn sepia(image: DynamicImage) -> DynamicImage {
    let mut rgba = image.to_rgba8();
    for Rgba([r, g, b, _]) in rgba.pixels_mut() {
        let (fr, fg, fb) = (*r as f32, *g as f32, *b as f32);
        *r = (0.393 * fr + 0.769 * fg + 0.189 * fb).min(255.0) as u8;
        *g = (0.349 * fr + 0.686 * fg + 0.168 * fb).min(255.0) as u8;
        *b = (0.272 * fr + 0.534 * fg + 0.131 * fb).min(255.0) as u8;
    }
    DynamicImage::ImageRgba8(rgba)
}

fn invert(mut image: DynamicImage) -> DynamicImage {
    image.invert();
    image
}

fn blur(image: DynamicImage) -> DynamicImage {
    image.blur(2.0)
}

fn brighten(image: DynamicImage) -> DynamicImage {
    image.brighten(30)
}

fn contrast(image: DynamicImage) -> DynamicImage {
    image.adjust_contrast(25.0)
}
