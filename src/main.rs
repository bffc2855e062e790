use clap::{Args, Parser, Subcommand};
use printbooth::config::{self, PrintboothConfig};
use printbooth::imaging::assets::{AssetLoader, layout_preview};
use printbooth::imaging::{
    Background, BackendKind, Dimensions, LayoutSpec, Orientation, Rgb, build_factory, plan_canvas,
    select_backend_kind,
};
use printbooth::logging;
use printbooth::output::{self, CompositionPlan, PlannedCapture, PlannedText};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(name = "printbooth")]
#[command(about = "Compose photobooth captures into a print-ready picture")]
#[command(long_about = "\
Compose photobooth captures into a print-ready picture

One to four captures are laid out on a page sized from the paper format and
DPI, with margins, footer texts, a background and an optional overlay.

Orientation (auto):
  1 or 4 captures   page follows the first capture's orientation
  2 or 3 captures   page uses the opposite orientation (strip layout)

Run 'printbooth gen-config' to generate a documented printbooth.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file (missing file = stock defaults)
    #[arg(long, default_value = "printbooth.toml", global = true)]
    config: PathBuf,

    /// Never use the accelerated backend
    #[arg(long, global = true)]
    force_portable: bool,

    #[command(subcommand)]
    command: Command,
}

/// Capture files and page orientation shared by compose and plan.
#[derive(Args, Clone)]
struct CaptureArgs {
    /// Capture image files, in placement order (1 to 4)
    #[arg(required = true, num_args = 1..=4)]
    captures: Vec<PathBuf>,

    /// Override the configured orientation (auto, portrait, landscape)
    #[arg(long)]
    orientation: Option<Orientation>,
}

#[derive(Subcommand)]
enum Command {
    /// Render and save the composite
    Compose {
        #[command(flatten)]
        input: CaptureArgs,

        /// Output file; the extension picks the format
        #[arg(short, long, default_value = "composite.jpg")]
        output: PathBuf,
    },
    /// Show orientation, canvas and placement without rendering
    Plan {
        #[command(flatten)]
        input: CaptureArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the thumbnail used to choose a capture count
    LayoutPreview {
        /// Number of captures of the layout (1 to 4)
        #[arg(long)]
        count: usize,

        /// Maximum thumbnail size, as WIDTHxHEIGHT
        #[arg(long, default_value = "400x600", value_parser = parse_size)]
        size: Dimensions,

        /// Caption drawn over the thumbnail (defaults to the count)
        #[arg(long)]
        label: Option<String>,

        /// Output PNG file
        #[arg(short, long, default_value = "layout.png")]
        output: PathBuf,
    },
    /// Validate the configuration file
    Check,
    /// Print a stock printbooth.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    logging::init_logging(&config.logging);
    let force_portable = cli.force_portable || config.rendering.force_portable;

    match cli.command {
        Command::Compose { input, output: out } => {
            let captures = input
                .captures
                .iter()
                .map(image::open)
                .collect::<Result<Vec<_>, _>>()?;
            warn_unconfigured_count(&config, captures.len());

            let mut options = config.picture.factory_options(force_portable);
            if let Some(orientation) = input.orientation {
                options.orientation = orientation;
            }

            let fonts = config.rendering.font_catalog();
            let mut factory = build_factory(&captures, &options)?;
            factory.set_fonts(&fonts);
            factory.apply_style(&config.picture.style_for(captures.len()));
            factory.save(&out)?;

            output::print_compose_result(
                &out,
                factory.canvas(),
                factory.orientation(),
                factory.capture_count(),
                factory.backend_kind(),
            );
        }
        Command::Plan { input, json } => {
            let plan = build_plan(&config, &input, force_portable)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan);
            }
        }
        Command::LayoutPreview {
            count,
            size,
            label,
            output: out,
        } => {
            let loader = AssetLoader::new(&config.rendering.assets_dir);
            let fonts = config.rendering.font_catalog();
            let text_color = config.picture.text_colors.get(0).copied().unwrap_or(Rgb::BLACK);
            let bg_color = match config.picture.backgrounds.get(0) {
                Some(Background::Color(color)) => *color,
                _ => Rgb::WHITE,
            };
            let label = label.unwrap_or_else(|| count.to_string());
            let preview = layout_preview(
                &loader,
                &fonts,
                text_color,
                bg_color,
                count,
                size,
                Some(label.as_str()),
            )?;
            create_parent_dir(&out)?;
            preview.save(&out)?;
            println!("Saved {} ({}x{})", out.display(), preview.width(), preview.height());
        }
        Command::Check => {
            output::print_check(&cli.config, cli.config.exists(), &config);
        }
        // Printed before the config is loaded
        Command::GenConfig => {}
    }

    Ok(())
}

/// Resolve everything `compose` would do, from image headers only.
fn build_plan(
    config: &PrintboothConfig,
    input: &CaptureArgs,
    force_portable: bool,
) -> Result<CompositionPlan, Box<dyn std::error::Error>> {
    let sizes = input
        .captures
        .iter()
        .map(|path| image::image_dimensions(path).map(|(w, h)| Dimensions::new(w, h)))
        .collect::<Result<Vec<_>, _>>()?;
    warn_unconfigured_count(config, sizes.len());

    let mut options = config.picture.factory_options(force_portable);
    if let Some(orientation) = input.orientation {
        options.orientation = orientation;
    }
    let (orientation, canvas) = plan_canvas(&sizes, &options)?;

    let style = config.picture.style_for(sizes.len());
    let texts: Vec<_> = style
        .texts
        .iter()
        .filter(|t| !t.text.trim().is_empty())
        .collect();
    let layout = LayoutSpec::new(canvas, sizes.len(), style.margin, texts.len());

    let backend = if force_portable {
        BackendKind::Portable
    } else {
        select_backend_kind(false)
    };

    Ok(CompositionPlan {
        orientation,
        canvas,
        paper: options.paper_format,
        dpi: options.dpi,
        backend,
        captures: input
            .captures
            .iter()
            .zip(&sizes)
            .zip(&layout.captures)
            .map(|((path, size), slot)| PlannedCapture {
                source: display_name(path),
                size: *size,
                slot: *slot,
            })
            .collect(),
        texts: texts
            .iter()
            .zip(&layout.texts)
            .map(|(text, slot)| PlannedText {
                text: text.text.clone(),
                slot: *slot,
            })
            .collect(),
    })
}

fn warn_unconfigured_count(config: &PrintboothConfig, count: usize) {
    if !config.picture.capture_choices().contains(&count) {
        warn!(count, "capture count is not one of the configured choices");
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn create_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok(Dimensions::new(width, height))
}
