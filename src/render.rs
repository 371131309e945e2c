//! Per-tile drawing: the QR face and the caption face of one card.

use std::rc::Rc;

use image::RgbaImage;

use crate::canvas::{Canvas, Rect};
use crate::config::CaptionStyle;
use crate::error::SheetResult;
use crate::fonts::StandardFont;
use crate::geometry::TilePosition;
use crate::qr::{AssetCache, QrEncoder};
use crate::records::CardRecord;
use crate::text::{TextMeasure, wrap};

/// One positioned line of caption text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font: StandardFont,
    pub size: f32,
}

/// Lay out artist, title and year for a caption tile.
///
/// Artist lines hang from the tile top, title lines stack so that the last
/// one sits one line height above the tile bottom, and the year is centred
/// on its own. Absent fields produce no lines.
pub fn layout_caption<M: TextMeasure + ?Sized>(
    record: &CardRecord,
    position: TilePosition,
    tile_size: f32,
    style: &CaptionStyle,
    measure: &M,
) -> Vec<PlacedText> {
    let TilePosition { x, y } = position;
    let wrap_width = tile_size - style.margin;
    let mut placed = Vec::new();

    if let Some(artist) = record.artist() {
        let line_height = style.artist_line_height();
        let mut baseline = y + tile_size - style.indent;
        for line in wrap(artist, style.artist_font, style.artist_size, wrap_width, measure) {
            placed.push(PlacedText {
                x: line.centered_x(x, tile_size),
                y: baseline,
                text: line.text,
                font: style.artist_font,
                size: style.artist_size,
            });
            baseline -= line_height;
        }
    }

    if let Some(title) = record.title() {
        let line_height = style.title_line_height();
        let lines = wrap(title, style.title_font, style.title_size, wrap_width, measure);
        let mut baseline = y + lines.len() as f32 * line_height;
        for line in lines {
            placed.push(PlacedText {
                x: line.centered_x(x, tile_size),
                y: baseline,
                text: line.text,
                font: style.title_font,
                size: style.title_size,
            });
            baseline -= line_height;
        }
    }

    if let Some(year) = record.year() {
        let width = measure.text_width(year, style.year_font, style.year_size);
        placed.push(PlacedText {
            text: year.to_string(),
            x: x + (tile_size - width) / 2.0,
            y: y + tile_size / 2.0 - style.indent / 2.0,
            font: style.year_font,
            size: style.year_size,
        });
    }

    placed
}

/// Draws card faces onto a canvas using assets from the run's cache.
pub struct CardRenderer<'a> {
    cache: &'a mut AssetCache,
    encoder: QrEncoder,
    style: &'a CaptionStyle,
    tile_size: f32,
    border: bool,
    icon: Option<Rc<RgbaImage>>,
}

impl<'a> CardRenderer<'a> {
    pub fn new(
        cache: &'a mut AssetCache,
        encoder: QrEncoder,
        style: &'a CaptionStyle,
        tile_size: f32,
        border: bool,
        icon: Option<Rc<RgbaImage>>,
    ) -> Self {
        Self {
            cache,
            encoder,
            style,
            tile_size,
            border,
            icon,
        }
    }

    /// Background (if any), QR bitmap across the whole tile, then the border
    /// when enabled and no background colour is set.
    ///
    /// `row` is the 1-based data row, reported if the URL cannot be encoded.
    pub fn draw_qr_tile<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        row: usize,
        record: &CardRecord,
        position: TilePosition,
    ) -> SheetResult<()> {
        let rect = Rect::square(position.x, position.y, self.tile_size);
        if let Some(color) = record.background() {
            canvas.fill_rect(rect, color)?;
        }
        let bitmap = self
            .cache
            .bitmap(&self.encoder, record.url(), self.icon.as_deref(), row)?;
        canvas.draw_image(bitmap.image(), rect)?;
        if self.border && record.background().is_none() {
            canvas.stroke_rect(rect)?;
        }
        Ok(())
    }

    /// Background or border, then artist, title and year where present.
    pub fn draw_caption_tile<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        record: &CardRecord,
        position: TilePosition,
    ) -> SheetResult<()> {
        let rect = Rect::square(position.x, position.y, self.tile_size);
        match record.background() {
            Some(color) => canvas.fill_rect(rect, color)?,
            None if self.border => canvas.stroke_rect(rect)?,
            None => {}
        }
        for text in layout_caption(record, position, self.tile_size, self.style, &*canvas) {
            canvas.draw_text(&text.text, text.x, text.y, text.font, text.size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::AfmMeasure;
    use pretty_assertions::assert_eq;

    const TILE: f32 = 130.4;

    fn record(artist: Option<&str>, title: Option<&str>, year: Option<&str>) -> CardRecord {
        CardRecord::new(1, "https://example.com/t/1", artist, title, year, None).unwrap()
    }

    fn at_origin() -> TilePosition {
        TilePosition { x: 0.0, y: 0.0 }
    }

    #[test]
    fn blank_record_places_no_text() {
        let placed = layout_caption(
            &record(Some("  "), None, Some("")),
            at_origin(),
            TILE,
            &CaptionStyle::default(),
            &AfmMeasure,
        );
        assert!(placed.is_empty());
    }

    #[test]
    fn artist_hangs_from_top_and_year_is_centred() {
        let style = CaptionStyle::default();
        let placed = layout_caption(
            &record(Some("ABBA"), None, Some("1976")),
            TilePosition { x: 10.0, y: 20.0 },
            TILE,
            &style,
            &AfmMeasure,
        );
        assert_eq!(placed.len(), 2);
        let artist = &placed[0];
        assert_eq!(artist.text, "ABBA");
        assert!((artist.y - (20.0 + TILE - 15.0)).abs() < 1e-4);
        assert!((artist.x - (10.0 + (TILE - 26.68) / 2.0)).abs() < 1e-3);

        let year = &placed[1];
        assert_eq!(year.font, StandardFont::HelveticaBold);
        assert_eq!(year.size, 30.0);
        assert!((year.y - (20.0 + TILE / 2.0 - 7.5)).abs() < 1e-4);
        // "1976" in Helvetica-Bold 30: 4 * 556 units
        let width = 4.0 * 556.0 * 30.0 / 1000.0;
        assert!((year.x - (10.0 + (TILE - width) / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn title_block_stacks_down_to_bottom_line() {
        let style = CaptionStyle::default();
        let title = "The Winner Takes It All And Then Some More Words To Wrap";
        let placed = layout_caption(
            &record(None, Some(title), None),
            at_origin(),
            TILE,
            &style,
            &AfmMeasure,
        );
        assert!(placed.len() >= 2);
        let n = placed.len() as f32;
        assert!((placed[0].y - n * 12.0).abs() < 1e-4);
        assert!((placed.last().unwrap().y - 12.0).abs() < 1e-4);
        for pair in placed.windows(2) {
            assert!((pair[0].y - pair[1].y - 12.0).abs() < 1e-4);
        }
        let rejoined: Vec<&str> = placed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(rejoined.join(" "), title);
    }
}
