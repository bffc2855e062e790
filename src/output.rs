//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Composite
//!     Orientation: portrait
//!     Canvas: 2400x3600 (4x6 in at 600 dpi)
//!     Backend: accelerated
//! Captures
//! 001 IMG_0001.jpg (3000x4000)
//!     Slot: 2200x2700 at (100, 100)
//! Texts
//! 001 "Footer 1"
//!     Slot: 2200x266 at (100, 3000)
//! ```
//!
//! ## Compose
//!
//! ```text
//! Saved out.jpg
//!     2400x3600 portrait, 4 captures, accelerated backend
//! ```

use crate::config::PrintboothConfig;
use crate::imaging::{BackendKind, Dimensions, Orientation, PaperFormat, Rect};
use serde::Serialize;
use std::path::Path;

/// One capture and where it lands.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCapture {
    pub source: String,
    pub size: Dimensions,
    pub slot: Rect,
}

/// One footer text and where it lands.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedText {
    pub text: String,
    pub slot: Rect,
}

/// Everything decided before rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CompositionPlan {
    pub orientation: Orientation,
    pub canvas: Dimensions,
    pub paper: PaperFormat,
    pub dpi: u32,
    pub backend: BackendKind,
    pub captures: Vec<PlannedCapture>,
    pub texts: Vec<PlannedText>,
}

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn slot_line(rect: &Rect) -> String {
    format!(
        "{}Slot: {}x{} at ({}, {})",
        indent(1),
        rect.width,
        rect.height,
        rect.x,
        rect.y
    )
}

/// Inches without a trailing `.0` for whole values.
fn format_inches(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ============================================================================
// Plan
// ============================================================================

pub fn format_plan(plan: &CompositionPlan) -> Vec<String> {
    let paper = plan.paper.normalized();
    let mut lines = vec![
        "Composite".to_string(),
        format!("{}Orientation: {}", indent(1), plan.orientation),
        format!(
            "{}Canvas: {} ({}x{} in at {} dpi)",
            indent(1),
            plan.canvas,
            format_inches(paper.width),
            format_inches(paper.height),
            plan.dpi
        ),
        format!("{}Backend: {}", indent(1), plan.backend),
        "Captures".to_string(),
    ];

    for (i, capture) in plan.captures.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            capture.source,
            capture.size
        ));
        lines.push(slot_line(&capture.slot));
    }

    if !plan.texts.is_empty() {
        lines.push("Texts".to_string());
        for (i, text) in plan.texts.iter().enumerate() {
            lines.push(format!("{} \"{}\"", format_index(i + 1), text.text));
            lines.push(slot_line(&text.slot));
        }
    }
    lines
}

pub fn print_plan(plan: &CompositionPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Compose
// ============================================================================

pub fn format_compose_result(
    path: &Path,
    canvas: Dimensions,
    orientation: Orientation,
    captures: usize,
    backend: BackendKind,
) -> Vec<String> {
    let noun = if captures == 1 { "capture" } else { "captures" };
    vec![
        format!("Saved {}", path.display()),
        format!(
            "{}{} {}, {} {}, {} backend",
            indent(1),
            canvas,
            orientation,
            captures,
            noun,
            backend
        ),
    ]
}

pub fn print_compose_result(
    path: &Path,
    canvas: Dimensions,
    orientation: Orientation,
    captures: usize,
    backend: BackendKind,
) {
    for line in format_compose_result(path, canvas, orientation, captures, backend) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check(config_path: &Path, found: bool, config: &PrintboothConfig) -> Vec<String> {
    let picture = &config.picture;
    let source = if found { "" } else { " (not found, defaults)" };
    let choices: Vec<String> = picture
        .capture_choices()
        .iter()
        .map(|n| n.to_string())
        .collect();
    vec![
        format!("Config {}{}", config_path.display(), source),
        format!("{}Orientation: {}", indent(1), picture.orientation),
        format!("{}Captures: {}", indent(1), choices.join(", ")),
        format!(
            "{}Paper: {}x{} in at {} dpi",
            indent(1),
            format_inches(picture.paper_format[0]),
            format_inches(picture.paper_format[1]),
            picture.dpi
        ),
        format!("{}Margin: {} px", indent(1), picture.margin_thick),
        "Config OK".to_string(),
    ]
}

pub fn print_check(config_path: &Path, found: bool, config: &PrintboothConfig) {
    for line in format_check(config_path, found, config) {
        println!("{}", line);
    }
}
