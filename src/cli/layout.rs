//! Grid inspection (`playcards layout ...`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use playcards::{CM, Orientation, Passes};

use crate::cli::common::SheetArgs;
use crate::cli::utils::load_csv;

/// Args for `playcards layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// CSV file to paginate; omit to only show the grid.
    pub csv: Option<PathBuf>,
    #[command(flatten)]
    pub sheet: SheetArgs,
}

/// Execute `playcards layout`.
pub fn handle(args: LayoutArgs) -> Result<()> {
    let config = args.sheet.resolve()?;
    let geometry = config.geometry().context("invalid page layout")?;

    println!(
        "Page: {:.1} x {:.1} cm",
        geometry.page_width() / CM,
        geometry.page_height() / CM
    );
    println!(
        "Tile: {:.2} cm, margins {:.2} cm (side) / {:.2} cm (top)",
        geometry.tile_size() / CM,
        geometry.horizontal_margin() / CM,
        geometry.vertical_margin() / CM
    );
    println!(
        "Grid: {} x {} = {} cards per page",
        geometry.tiles_per_row(),
        geometry.tiles_per_column(),
        geometry.tiles_per_page()
    );

    let Some(csv) = args.csv else {
        return Ok(());
    };
    let records = load_csv(&csv)?;
    println!(
        "Records: {} in {} page-full(s)",
        records.len(),
        geometry.page_fulls(records.len())
    );
    for (page, pass) in Passes::new(records.len(), &geometry).enumerate() {
        let side = match pass.side {
            Orientation::Front => "qr",
            Orientation::Back => "captions",
        };
        println!(
            "  page {:>3}: {:<8} records {}..{} ({} tiles, {} blank)",
            page + 1,
            side,
            pass.records.start + 1,
            pass.records.end,
            pass.records.len(),
            geometry.tiles_per_page() - pass.records.len()
        );
    }
    Ok(())
}
