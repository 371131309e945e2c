//! Sheet rendering (`playcards generate ...`).

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use playcards::{PdfCanvas, RasterCanvas, render_sheet};

use crate::cli::common::SheetArgs;
use crate::cli::utils::{load_csv, title_for};

/// Output backends.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single PDF with QR and caption pages interleaved.
    Pdf,
    /// One PNG proof image per page.
    Png,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "pdf"),
            OutputFormat::Png => write!(f, "png"),
        }
    }
}

/// Args for `playcards generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// CSV file with URL, Artist, Title, Year and optional Color columns.
    pub csv: PathBuf,
    /// Output file (PNG pages are numbered next to it).
    pub output: PathBuf,
    /// Output format.
    #[arg(long, default_value_t = OutputFormat::Pdf, value_enum)]
    pub format: OutputFormat,
    /// Dots per inch for PNG proofs.
    #[arg(long, default_value_t = 150)]
    pub dpi: u32,
    /// Write a JSON run summary to this file.
    #[arg(long)]
    pub summary: Option<PathBuf>,
    #[command(flatten)]
    pub sheet: SheetArgs,
}

/// Execute `playcards generate`.
pub fn handle(args: GenerateArgs) -> Result<()> {
    let config = args.sheet.resolve()?;
    // Fail on a bad grid before reading any input.
    let geometry = config.geometry().context("invalid page layout")?;
    let records = load_csv(&args.csv)?;

    let report = match args.format {
        OutputFormat::Pdf => {
            let mut canvas = PdfCanvas::new(
                &args.output,
                &title_for(&args.csv),
                geometry.page_width(),
                geometry.page_height(),
            );
            render_sheet(&records, &config, &mut canvas)
        }
        OutputFormat::Png => {
            let mut canvas = RasterCanvas::new(
                &args.output,
                geometry.page_width(),
                geometry.page_height(),
                args.dpi,
            );
            render_sheet(&records, &config, &mut canvas)
        }
    }
    .with_context(|| format!("failed to render {}", args.output.display()))?;

    if let Some(path) = &args.summary {
        report
            .summary()
            .write(path)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
    }

    println!(
        "Rendered {} cards on {} pages ({} per page) to {} as {}",
        report.stats.records,
        report.stats.pages,
        report.geometry.tiles_per_page(),
        args.output.display(),
        args.format
    );
    if let Some(icon) = &report.icon {
        println!("Icon: {}", icon);
    }
    Ok(())
}
