//! # Printbooth
//!
//! Print-ready picture composition for kiosk photobooths. One to four camera
//! captures go in; one composite sized for a physical paper format at a given
//! DPI comes out, with margins, footer texts, background and overlay.
//!
//! # Pipeline
//!
//! ```text
//! captures ─► orientation ─► canvas ─► layout ─► backend render ─► composite
//!             (auto rule)    (paper×dpi) (slots)  (accelerated | portable)
//! ```
//!
//! Everything up to the layout is pure geometry and can be inspected without
//! touching a pixel (`printbooth plan`). Rendering is a separate, explicit step
//! on the [`imaging::PictureFactory`] builder.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, orientation, layout, backends, effects, fonts, assets and the factory |
//! | [`config`] | `printbooth.toml` loading, stock defaults, merging, validation and style normalization |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting for plans, results and config checks |
//!
//! # Design Decisions
//!
//! ## Two Backends, One Contract
//!
//! The accelerated backend prepares captures in parallel on the rayon pool and
//! draws with `imageproc`; the portable backend is sequential and depends only
//! on the `image` crate. Both implement [`imaging::CompositeBackend`] and share
//! the pixel steps in [`imaging::operations`], so they agree on canvas size and
//! placement and differ only in resampling. The choice is made by a capability
//! probe that runs once per process.
//!
//! ## Missing Decorations Never Block a Print
//!
//! A missing overlay, background image or font logs a warning and is replaced
//! by a neutral default. Only contract violations (capture count, orientation,
//! backend availability) fail a composite.
//!
//! ## Scalar-or-List Config at the Edge
//!
//! Style keys in `printbooth.toml` accept one value or a list. The
//! [`config`] module normalizes them into an explicit
//! [`imaging::StyleSpec`]; the imaging code only ever sees per-slot values.

pub mod config;
pub mod imaging;
pub mod logging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
