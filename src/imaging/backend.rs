//! Composite rendering backend trait and shared types.
//!
//! The [`CompositeBackend`] trait defines the single operation every backend
//! must support: turn a resolved [`RenderJob`] into a composite image of
//! exactly the layout's canvas size.
//!
//! Two implementations exist:
//!
//! | Kind | Type | Availability |
//! |---|---|---|
//! | [`BackendKind::Accelerated`] | `AcceleratedBackend` | `accelerated` cargo feature and more than one worker thread |
//! | [`BackendKind::Portable`] | [`PortableBackend`](super::portable_backend::PortableBackend) | always |
//!
//! Both produce the same canvas size and placement topology; only the
//! resampling filter and scheduling differ. Which one a job gets is decided
//! by [`select_backend_kind`], whose capability probe runs once per process.

use super::params::RenderJob;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a capture or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &image::DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The two interchangeable renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Accelerated,
    Portable,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Accelerated => "accelerated",
            BackendKind::Portable => "portable",
        })
    }
}

/// Trait for composite rendering backends.
///
/// Implementations must not mutate the captures and must return an image of
/// exactly `job.layout.canvas` pixels.
pub trait CompositeBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Render background, captures, overlay, texts and outlines, in that order.
    fn render(&self, job: &RenderJob<'_>) -> Result<RgbaImage, BackendError>;
}

impl<T: CompositeBackend + ?Sized> CompositeBackend for &T {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn render(&self, job: &RenderJob<'_>) -> Result<RgbaImage, BackendError> {
        (**self).render(job)
    }
}

static ACCELERATED_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Whether the accelerated backend can run in this process.
///
/// Probed on first call and cached for the process lifetime.
pub fn accelerated_available() -> bool {
    *ACCELERATED_AVAILABLE.get_or_init(probe_accelerated)
}

#[cfg(feature = "accelerated")]
fn probe_accelerated() -> bool {
    let threads = rayon::current_num_threads();
    debug!(threads, "probed accelerated backend");
    threads > 1
}

#[cfg(not(feature = "accelerated"))]
fn probe_accelerated() -> bool {
    debug!("accelerated backend not compiled in");
    false
}

/// Backend a job should use: accelerated when available and not forced off.
pub fn select_backend_kind(force_portable: bool) -> BackendKind {
    if !force_portable && accelerated_available() {
        BackendKind::Accelerated
    } else {
        BackendKind::Portable
    }
}

/// Instantiate a backend of the given kind.
///
/// Returns `None` when `kind` is not compiled into this build.
pub fn create_backend(kind: BackendKind) -> Option<Box<dyn CompositeBackend>> {
    match kind {
        #[cfg(feature = "accelerated")]
        BackendKind::Accelerated => Some(Box::new(
            super::accelerated_backend::AcceleratedBackend::new(),
        )),
        #[cfg(not(feature = "accelerated"))]
        BackendKind::Accelerated => None,
        BackendKind::Portable => Some(Box::new(super::portable_backend::PortableBackend::new())),
    }
}
