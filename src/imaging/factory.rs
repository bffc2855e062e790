//! Composite orchestration.
//!
//! [`build_factory`] turns a capture set and page options into a
//! [`PictureFactory`]: orientation resolved, canvas sized, backend chosen.
//! Nothing is drawn until [`PictureFactory::build`] is called.
//!
//! ```text
//! captures ──► plan_canvas ──► PictureFactory ──► set_* / apply_style ──► build ──► save
//!               │                   │
//!               │                   └─ create_backend(select_backend_kind)
//!               └─ select_orientation (auto), paper normalization, dpi
//! ```
//!
//! Asset problems (missing background image, overlay or font) are logged and
//! substituted at build time. Only contract violations surface as
//! [`ComposeError`].

use super::backend::{
    BackendError, BackendKind, CompositeBackend, Dimensions, create_backend, select_backend_kind,
};
use super::calculations::{PaperFormat, canvas_size};
use super::effects::EffectRegistry;
use super::layout::LayoutSpec;
use super::orientation::{Orientation, select_orientation};
use super::params::{
    Alignment, Background, FooterText, RenderJob, ResolvedBackground, ResolvedText, Rgb, StyleSpec,
    effect_at,
};
use super::text::FontCatalog;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("expected 1 to 4 captures, got {0}")]
    InvalidCaptureCount(usize),
    #[error("no captures to compose")]
    EmptyCaptureSet,
    #[error("unknown orientation '{0}' (expected auto, portrait or landscape)")]
    InvalidOrientation(String),
    #[error("{0} backend is not available in this build")]
    BackendUnavailable(BackendKind),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Page options of one composition job.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryOptions {
    pub orientation: Orientation,
    /// Physical size in inches, in any order.
    pub paper_format: PaperFormat,
    /// Always use the portable backend.
    pub force_portable: bool,
    /// Explicit backend request; `None` picks automatically.
    pub backend: Option<BackendKind>,
    pub dpi: u32,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Auto,
            paper_format: PaperFormat::default(),
            force_portable: false,
            backend: None,
            dpi: 600,
        }
    }
}

/// Resolve orientation and canvas size for captures of the given sizes.
///
/// Pure: no image data, no backend. `paper_format` must have positive
/// dimensions.
pub fn plan_canvas(
    captures: &[Dimensions],
    options: &FactoryOptions,
) -> Result<(Orientation, Dimensions), ComposeError> {
    if captures.is_empty() {
        return Err(ComposeError::EmptyCaptureSet);
    }
    if captures.len() > 4 {
        return Err(ComposeError::InvalidCaptureCount(captures.len()));
    }

    let orientation = match options.orientation {
        Orientation::Auto => select_orientation(captures)?,
        fixed => fixed,
    };
    let canvas = canvas_size(options.paper_format, options.dpi, orientation.is_landscape());
    Ok((orientation, canvas))
}

/// Backend kind a job with these options runs on.
fn backend_kind_for(options: &FactoryOptions) -> BackendKind {
    if options.force_portable {
        return BackendKind::Portable;
    }
    options
        .backend
        .unwrap_or_else(|| select_backend_kind(false))
}

/// Prepare a composite of `captures`. No pixel work happens here.
pub fn build_factory<'a>(
    captures: &'a [DynamicImage],
    options: &FactoryOptions,
) -> Result<PictureFactory<'a>, ComposeError> {
    let sizes: Vec<Dimensions> = captures.iter().map(Dimensions::of).collect();
    let (orientation, canvas) = plan_canvas(&sizes, options)?;

    let kind = backend_kind_for(options);
    let backend = create_backend(kind).ok_or(ComposeError::BackendUnavailable(kind))?;
    debug!(%orientation, %canvas, backend = %kind, "factory ready");

    Ok(PictureFactory::new(captures, orientation, canvas, backend))
}

/// Declarative builder of one composite.
///
/// Setters only record configuration and drop any cached composite;
/// [`build`](Self::build) renders once and caches the result.
pub struct PictureFactory<'a> {
    captures: &'a [DynamicImage],
    orientation: Orientation,
    canvas: Dimensions,
    backend: Box<dyn CompositeBackend + 'a>,
    effects: EffectRegistry,
    fonts: Option<&'a FontCatalog>,
    texts: Vec<FooterText>,
    background: Background,
    overlay: Option<PathBuf>,
    effect_names: Vec<String>,
    margin: u32,
    crop: bool,
    outlines: bool,
    composite: Option<RgbaImage>,
}

impl<'a> PictureFactory<'a> {
    fn new(
        captures: &'a [DynamicImage],
        orientation: Orientation,
        canvas: Dimensions,
        backend: Box<dyn CompositeBackend + 'a>,
    ) -> Self {
        let style = StyleSpec::default();
        Self {
            captures,
            orientation,
            canvas,
            backend,
            effects: EffectRegistry::default(),
            fonts: None,
            texts: style.texts,
            background: style.background,
            overlay: style.overlay,
            effect_names: style.effects,
            margin: style.margin,
            crop: style.crop,
            outlines: style.outlines,
            composite: None,
        }
    }

    /// Replace the backend chosen by [`build_factory`].
    pub fn with_backend(mut self, backend: Box<dyn CompositeBackend + 'a>) -> Self {
        self.backend = backend;
        self.composite = None;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn canvas(&self) -> Dimensions {
        self.canvas
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    /// Placement of captures and footer texts with the current settings.
    pub fn layout(&self) -> LayoutSpec {
        LayoutSpec::new(self.canvas, self.captures.len(), self.margin, self.texts.len())
    }

    pub fn set_fonts(&mut self, fonts: &'a FontCatalog) {
        self.fonts = Some(fonts);
        self.composite = None;
    }

    pub fn set_effect_registry(&mut self, effects: EffectRegistry) {
        self.effects = effects;
        self.composite = None;
    }

    /// Append a footer text. Blank texts are ignored.
    pub fn add_text(&mut self, text: &str, font: &str, color: Rgb, align: Alignment) {
        if text.trim().is_empty() {
            return;
        }
        self.texts.push(FooterText {
            text: text.to_string(),
            font: font.to_string(),
            color,
            align,
        });
        self.composite = None;
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        self.composite = None;
    }

    pub fn set_overlay(&mut self, overlay: Option<PathBuf>) {
        self.overlay = overlay;
        self.composite = None;
    }

    pub fn set_margin(&mut self, margin: u32) {
        self.margin = margin;
        self.composite = None;
    }

    pub fn set_cropping(&mut self, crop: bool) {
        self.crop = crop;
        self.composite = None;
    }

    pub fn set_outlines(&mut self, outlines: bool) {
        self.outlines = outlines;
        self.composite = None;
    }

    /// Effect names per capture; a short list repeats its last entry.
    pub fn set_effects(&mut self, effects: Vec<String>) {
        self.effect_names = effects;
        self.composite = None;
    }

    /// Apply every field of `style`, replacing previously added texts.
    pub fn apply_style(&mut self, style: &StyleSpec) {
        self.texts.clear();
        for text in &style.texts {
            self.add_text(&text.text, &text.font, text.color, text.align);
        }
        self.set_background(style.background.clone());
        self.set_overlay(style.overlay.clone());
        self.set_effects(style.effects.clone());
        self.set_margin(style.margin);
        self.set_cropping(style.crop);
        self.set_outlines(style.outlines);
    }

    /// The composite, rendered on first call and cached afterwards.
    pub fn build(&mut self) -> Result<&RgbaImage, ComposeError> {
        let composite = match self.composite.take() {
            Some(composite) => composite,
            None => self.render()?,
        };
        Ok(self.composite.insert(composite))
    }

    /// Render again even if a composite is cached.
    pub fn rebuild(&mut self) -> Result<&RgbaImage, ComposeError> {
        self.composite = None;
        self.build()
    }

    /// Build if needed and write the composite to `path`.
    ///
    /// The format follows the extension; JPEG output drops the alpha channel.
    pub fn save(&mut self, path: &Path) -> Result<(), ComposeError> {
        let composite = self.build()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        match ImageFormat::from_path(path) {
            Ok(ImageFormat::Jpeg) => {
                DynamicImage::ImageRgba8(composite.clone())
                    .to_rgb8()
                    .save_with_format(path, ImageFormat::Jpeg)?;
            }
            _ => composite.save(path)?,
        }
        info!(path = %path.display(), "composite saved");
        Ok(())
    }

    fn render(&self) -> Result<RgbaImage, ComposeError> {
        let layout = self.layout();
        info!(
            backend = %self.backend.kind(),
            canvas = %self.canvas,
            orientation = %self.orientation,
            captures = self.captures.len(),
            "building composite"
        );

        let job = RenderJob {
            captures: self.captures,
            layout: &layout,
            background: self.resolve_background(),
            overlay: self.resolve_overlay(),
            texts: self.resolve_texts(&layout),
            effects: &self.effects,
            effect_names: (0..self.captures.len())
                .map(|i| effect_at(&self.effect_names, i).to_string())
                .collect(),
            crop: self.crop,
            outlines: self.outlines,
        };
        Ok(self.backend.render(&job)?)
    }

    fn resolve_background(&self) -> ResolvedBackground {
        match &self.background {
            Background::Color(color) => ResolvedBackground::Color(*color),
            Background::Image(path) => match image::open(path) {
                Ok(image) => ResolvedBackground::Image(image),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "background image unavailable, using white");
                    ResolvedBackground::Color(Rgb::WHITE)
                }
            },
        }
    }

    fn resolve_overlay(&self) -> Option<RgbaImage> {
        let path = self.overlay.as_ref()?;
        match image::open(path) {
            Ok(image) => Some(image.to_rgba8()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "overlay unavailable, skipping it");
                None
            }
        }
    }

    fn resolve_texts(&self, layout: &LayoutSpec) -> Vec<ResolvedText> {
        self.texts
            .iter()
            .zip(&layout.texts)
            .map(|(text, rect)| {
                let font = self.fonts.and_then(|fonts| fonts.resolve(&text.font));
                if font.is_none() {
                    warn!(text = %text.text, "no font available, footer text skipped");
                }
                ResolvedText {
                    text: text.text.clone(),
                    font,
                    color: text.color,
                    align: text.align,
                    rect: *rect,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::calculations::Rect;
    use crate::test_helpers::{assert_disjoint, color_at_center, solid_capture};
    use image::Rgba;
    use tempfile::TempDir;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height)
    }

    fn low_dpi() -> FactoryOptions {
        FactoryOptions {
            dpi: 50,
            ..FactoryOptions::default()
        }
    }

    // =========================================================================
    // plan_canvas
    // =========================================================================

    #[test]
    fn single_portrait_capture_is_portrait_2400x3600() {
        let (orientation, canvas) =
            plan_canvas(&[dims(3000, 4000)], &FactoryOptions::default()).unwrap();
        assert_eq!(orientation, Orientation::Portrait);
        assert_eq!(canvas, dims(2400, 3600));
    }

    #[test]
    fn three_landscape_captures_are_portrait() {
        let (orientation, canvas) =
            plan_canvas(&[dims(4000, 3000); 3], &FactoryOptions::default()).unwrap();
        assert_eq!(orientation, Orientation::Portrait);
        assert_eq!(canvas, dims(2400, 3600));
    }

    #[test]
    fn landscape_swaps_canvas() {
        let options = FactoryOptions {
            orientation: Orientation::Landscape,
            ..FactoryOptions::default()
        };
        let (_, canvas) = plan_canvas(&[dims(3000, 4000)], &options).unwrap();
        assert_eq!(canvas, dims(3600, 2400));
    }

    #[test]
    fn paper_format_order_is_irrelevant() {
        for orientation in [Orientation::Portrait, Orientation::Landscape] {
            let a = FactoryOptions {
                orientation,
                paper_format: PaperFormat::new(4.0, 6.0),
                ..FactoryOptions::default()
            };
            let b = FactoryOptions {
                paper_format: PaperFormat::new(6.0, 4.0),
                ..a.clone()
            };
            let sizes = [dims(100, 100)];
            assert_eq!(plan_canvas(&sizes, &a).unwrap(), plan_canvas(&sizes, &b).unwrap());
        }
    }

    #[test]
    fn fixed_orientation_ignores_captures() {
        let options = FactoryOptions {
            orientation: Orientation::Portrait,
            ..FactoryOptions::default()
        };
        let (orientation, _) = plan_canvas(&[dims(4000, 3000)], &options).unwrap();
        assert_eq!(orientation, Orientation::Portrait);
    }

    #[test]
    fn empty_capture_set_fails() {
        let result = plan_canvas(&[], &FactoryOptions::default());
        assert!(matches!(result, Err(ComposeError::EmptyCaptureSet)));
    }

    #[test]
    fn five_captures_fail_even_with_fixed_orientation() {
        let options = FactoryOptions {
            orientation: Orientation::Landscape,
            ..FactoryOptions::default()
        };
        let result = plan_canvas(&[dims(10, 10); 5], &options);
        assert!(matches!(result, Err(ComposeError::InvalidCaptureCount(5))));
    }

    // =========================================================================
    // build_factory and backend selection
    // =========================================================================

    #[test]
    fn force_portable_selects_portable() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0])];
        let options = FactoryOptions {
            force_portable: true,
            backend: Some(BackendKind::Accelerated),
            ..low_dpi()
        };
        let factory = build_factory(&captures, &options).unwrap();
        assert_eq!(factory.backend_kind(), BackendKind::Portable);
    }

    #[cfg(not(feature = "accelerated"))]
    #[test]
    fn explicit_accelerated_without_feature_is_unavailable() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0])];
        let options = FactoryOptions {
            backend: Some(BackendKind::Accelerated),
            ..low_dpi()
        };
        let result = build_factory(&captures, &options);
        assert!(matches!(
            result,
            Err(ComposeError::BackendUnavailable(BackendKind::Accelerated))
        ));
    }

    #[test]
    fn construction_does_not_render() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0])];
        let mock = MockBackend::new();
        let factory = build_factory(&captures, &low_dpi())
            .unwrap()
            .with_backend(Box::new(&mock));
        assert_eq!(factory.capture_count(), 1);
        assert_eq!(mock.render_count(), 0);
    }

    // =========================================================================
    // Builder and cache
    // =========================================================================

    #[test]
    fn build_is_cached_until_a_setter_runs() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0]); 2];
        let mock = MockBackend::new();
        let mut factory = build_factory(&captures, &low_dpi())
            .unwrap()
            .with_backend(Box::new(&mock));

        factory.build().unwrap();
        factory.build().unwrap();
        assert_eq!(mock.render_count(), 1);

        factory.set_margin(5);
        factory.build().unwrap();
        assert_eq!(mock.render_count(), 2);

        factory.rebuild().unwrap();
        assert_eq!(mock.render_count(), 3);
    }

    #[test]
    fn style_reaches_the_backend() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0]); 3];
        let mock = MockBackend::new();
        let mut factory = build_factory(&captures, &low_dpi())
            .unwrap()
            .with_backend(Box::new(&mock));
        factory.apply_style(&StyleSpec {
            texts: vec![
                FooterText {
                    text: "Footer 1".into(),
                    font: "Amatic-Bold".into(),
                    color: Rgb::BLACK,
                    align: Alignment::Center,
                },
                FooterText {
                    text: "   ".into(),
                    font: "Amatic-Bold".into(),
                    color: Rgb::BLACK,
                    align: Alignment::Center,
                },
            ],
            effects: vec!["sepia".into()],
            crop: true,
            margin: 10,
            ..StyleSpec::default()
        });
        factory.build().unwrap();

        let render = mock.last_render().unwrap();
        assert_eq!(render.texts, vec!["Footer 1".to_string()]);
        assert_eq!(render.effects, vec!["sepia"; 3]);
        assert!(render.crop);
        assert!(!render.has_overlay);
        assert_eq!(render.captures.len(), 3);
        assert_disjoint(&render.captures);
    }

    #[test]
    fn texts_shrink_capture_area() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0])];
        let mut factory = build_factory(&captures, &FactoryOptions::default()).unwrap();
        let without = factory.layout();
        factory.add_text("Hello", "Amatic-Bold", Rgb::BLACK, Alignment::Left);
        let with = factory.layout();
        assert_eq!(with.texts.len(), 1);
        assert_eq!(with.footer_height, 600);
        assert!(with.captures[0].height < without.captures[0].height);
    }

    #[test]
    fn missing_assets_are_substituted() {
        let captures = vec![solid_capture(30, 40, [0, 0, 255])];
        let mock = MockBackend::new();
        let mut factory = build_factory(&captures, &low_dpi())
            .unwrap()
            .with_backend(Box::new(&mock));
        factory.set_overlay(Some(PathBuf::from("/nonexistent/overlay.png")));
        factory.set_background(Background::Image(PathBuf::from("/nonexistent/bg.jpg")));
        factory.build().unwrap();
        assert!(!mock.last_render().unwrap().has_overlay);
    }

    // =========================================================================
    // Real rendering
    // =========================================================================

    #[test]
    fn portable_render_places_capture() {
        let captures = vec![solid_capture(30, 40, [0, 0, 255])];
        let options = FactoryOptions {
            force_portable: true,
            ..low_dpi()
        };
        let mut factory = build_factory(&captures, &options).unwrap();
        factory.set_margin(10);
        let layout = factory.layout();
        let composite = factory.build().unwrap();
        assert_eq!(composite.dimensions(), (200, 300));
        assert_eq!(color_at_center(composite, &layout.captures[0]), Rgba([0, 0, 255, 255]));
    }

    fn paint_green(image: DynamicImage) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            image.width(),
            image.height(),
            Rgba([0, 255, 0, 255]),
        ))
    }

    fn portable_factory(captures: &[DynamicImage]) -> PictureFactory<'_> {
        let options = FactoryOptions {
            force_portable: true,
            ..low_dpi()
        };
        let mut factory = build_factory(captures, &options).unwrap();
        factory.set_margin(10);
        factory
    }

    #[test]
    fn custom_effect_registry_reaches_pixels() {
        let captures = vec![solid_capture(30, 40, [255, 0, 0])];
        let mut registry = EffectRegistry::empty();
        registry.register("green-screen", paint_green);

        let mut factory = portable_factory(&captures);
        factory.set_effect_registry(registry);
        factory.set_effects(vec!["Green-Screen".into()]);
        let layout = factory.layout();
        let composite = factory.build().unwrap();
        assert_eq!(color_at_center(composite, &layout.captures[0]), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn unknown_effect_in_custom_registry_is_grayscale() {
        let captures = vec![solid_capture(30, 40, [255, 0, 0])];
        let mut registry = EffectRegistry::empty();
        registry.register("green-screen", paint_green);

        let mut factory = portable_factory(&captures);
        factory.set_effect_registry(registry);
        factory.set_effects(vec!["none".into()]);
        let layout = factory.layout();
        let composite = factory.build().unwrap();
        let Rgba([r, g, b, a]) = color_at_center(composite, &layout.captures[0]);
        assert_eq!((r, a), (g, 255));
        assert_eq!(g, b);
        assert!(r < 255);
    }

    #[test]
    fn setting_registry_drops_cached_composite() {
        let captures = vec![solid_capture(30, 40, [0, 0, 0])];
        let mock = MockBackend::new();
        let mut factory = build_factory(&captures, &low_dpi())
            .unwrap()
            .with_backend(Box::new(&mock));
        factory.build().unwrap();
        factory.set_effect_registry(EffectRegistry::empty());
        factory.build().unwrap();
        assert_eq!(mock.render_count(), 2);
    }

    #[test]
    fn oversized_margin_keeps_captures_on_canvas() {
        let captures = vec![solid_capture(40, 30, [0, 0, 255]); 4];
        let mock = MockBackend::new();
        let mut factory = build_factory(&captures, &low_dpi())
            .unwrap()
            .with_backend(Box::new(&mock));
        factory.set_margin(1000);
        factory.build().unwrap();

        let render = mock.last_render().unwrap();
        assert_eq!(render.canvas, dims(300, 200));
        let page = Rect::new(0, 0, 300, 200);
        for slot in &render.captures {
            assert!(slot.width > 0 && slot.height > 0, "{slot:?}");
            assert!(page.contains_rect(slot), "{slot:?}");
        }
        assert_disjoint(&render.captures);
    }

    #[test]
    fn oversized_margin_still_draws_the_capture() {
        let captures = vec![solid_capture(30, 40, [0, 0, 255])];
        let mut factory = portable_factory(&captures);
        factory.set_margin(u32::MAX);
        let layout = factory.layout();
        assert!(layout.margin < 200);
        let composite = factory.build().unwrap();
        assert_eq!(color_at_center(composite, &layout.captures[0]), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn save_writes_jpeg_without_alpha() {
        let tmp = TempDir::new().unwrap();
        let captures = vec![solid_capture(30, 40, [0, 0, 255])];
        let mut factory = build_factory(&captures, &low_dpi()).unwrap();
        factory.set_margin(10);
        let out = tmp.path().join("nested/out.jpg");
        factory.save(&out).unwrap();

        let written = image::open(&out).unwrap();
        assert_eq!((written.width(), written.height()), (200, 300));
        assert!(!written.color().has_alpha());
    }

    #[test]
    fn save_png_keeps_size() {
        let tmp = TempDir::new().unwrap();
        let captures = vec![solid_capture(40, 30, [0, 0, 255]); 2];
        let mut factory = build_factory(&captures, &low_dpi()).unwrap();
        factory.set_margin(10);
        assert_eq!(factory.orientation(), Orientation::Portrait);
        let out = tmp.path().join("out.png");
        factory.save(&out).unwrap();
        let written = image::open(&out).unwrap();
        assert_eq!((written.width(), written.height()), (200, 300));
    }
}
