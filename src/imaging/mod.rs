//! Picture composition: geometry, layout, backends and the factory.
//!
//! | Step | Where |
//! |---|---|
//! | **Orientation** | [`select_orientation`] (first capture + count rule) |
//! | **Canvas** | [`calculations::canvas_size`] (paper normalized to portrait, × dpi) |
//! | **Placement** | [`LayoutSpec`] (capture and footer rectangles) |
//! | **Pixels** | [`CompositeBackend`]: accelerated (rayon + imageproc) or portable |
//! | **Decoration** | [`effects`], [`text`], [`assets`] |
//!
//! The module is split into:
//! - **Calculations / layout / orientation**: pure functions, no pixels
//! - **Parameters**: data structures describing what to render
//! - **Backends**: the [`CompositeBackend`] trait and its two implementations
//! - **Factory**: [`build_factory`] and the [`PictureFactory`] builder

#[cfg(feature = "accelerated")]
pub mod accelerated_backend;
pub mod assets;
pub mod backend;
pub mod calculations;
pub mod effects;
pub mod factory;
pub mod layout;
pub mod operations;
pub mod orientation;
pub mod params;
pub mod portable_backend;
pub mod text;

pub use backend::{
    BackendError, BackendKind, CompositeBackend, Dimensions, accelerated_available,
    create_backend, select_backend_kind,
};
pub use calculations::{PaperFormat, Rect, crop_rect_for_ratio, scaled_size};
pub use effects::EffectRegistry;
pub use factory::{ComposeError, FactoryOptions, PictureFactory, build_factory, plan_canvas};
pub use layout::LayoutSpec;
pub use orientation::{Orientation, select_orientation};
pub use params::{Alignment, Background, FooterText, Rgb, StyleSpec};
pub use portable_backend::PortableBackend;
pub use text::FontCatalog;
