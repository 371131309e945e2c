//! Duplex-printable card sheets: a page of QR codes followed by a page of
//! matching captions, mirrored so each caption lands behind its code.

pub mod canvas;
mod config;
mod error;
mod fonts;
mod geometry;
mod qr;
mod records;
mod render;
mod report;
mod sequencer;
mod text;

pub use canvas::{Canvas, PdfCanvas, RasterCanvas, Rect};
pub use config::{CaptionStyle, IconPolicy, SheetConfig};
pub use error::{SheetError, SheetResult};
pub use fonts::StandardFont;
pub use geometry::{CM, GridCell, Orientation, PageGeometry, PageSize, TilePosition};
pub use qr::{AssetCache, ErrorCorrection, IconSource, QrBitmap, QrEncoder};
pub use records::{CardRecord, Rgb, load_records, read_records};
pub use render::{CardRenderer, PlacedText, layout_caption};
pub use report::{SheetReport, SheetSummary};
pub use sequencer::{PagePass, Passes, SequenceStats, run};
pub use text::{AfmMeasure, RenderedLine, TextMeasure, wrap};

/// Render `records` onto `canvas` and finish the document.
///
/// The grid and the icon are resolved before anything is drawn, so
/// configuration and icon errors never leave a half-written sheet behind.
pub fn render_sheet<C: Canvas + ?Sized>(
    records: &[CardRecord],
    config: &SheetConfig,
    canvas: &mut C,
) -> SheetResult<SheetReport> {
    let geometry = config.geometry()?;
    let mut cache = AssetCache::new();

    let mut icon_id = None;
    let icon = match config.icon_source() {
        None => None,
        Some(source) => match cache.icon(&source) {
            Ok(image) => {
                icon_id = Some(source.id());
                Some(image)
            }
            Err(err) if config.icon_policy == IconPolicy::Skip => {
                tracing::warn!(error = %err, "continuing without icon");
                None
            }
            Err(err) => return Err(err),
        },
    };

    let encoder = QrEncoder {
        error_correction: config.error_correction,
        ..QrEncoder::default()
    };
    let mut renderer = CardRenderer::new(
        &mut cache,
        encoder,
        &config.style,
        geometry.tile_size(),
        config.border,
        icon,
    );
    let stats = sequencer::run(records, &geometry, &mut renderer, canvas)?;

    tracing::info!(
        records = stats.records,
        pages = stats.pages,
        bitmaps = cache.bitmap_count(),
        "sheet rendered"
    );
    Ok(SheetReport {
        geometry,
        stats,
        icon: icon_id,
        digests: cache.digests(),
    })
}
