//! Output surfaces the sheet is drawn onto.
//!
//! Coordinates are points with the origin at the bottom-left of the page.
//! Drawing is append-only; `new_page` closes the current page and `finish`
//! flushes the whole document.

mod pdf;
mod raster;

pub use pdf::PdfCanvas;
pub use raster::RasterCanvas;

use image::RgbImage;

use crate::error::SheetResult;
use crate::fonts::StandardFont;
use crate::records::Rgb;
use crate::text::TextMeasure;

/// Axis-aligned rectangle given by its bottom-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn square(x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            width: size,
            height: size,
        }
    }
}

/// Drawing primitives required by the card renderer.
pub trait Canvas: TextMeasure {
    /// Place a bitmap stretched to fill `rect`.
    fn draw_image(&mut self, bitmap: &RgbImage, rect: Rect) -> SheetResult<()>;
    /// Draw a single line of black text with its baseline starting at `(x, y)`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font: StandardFont,
        size: f32,
    ) -> SheetResult<()>;
    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> SheetResult<()>;
    fn stroke_rect(&mut self, rect: Rect) -> SheetResult<()>;
    /// Close the current page; the next drawing call starts a fresh one.
    fn new_page(&mut self) -> SheetResult<()>;
    /// Write the finished document.
    fn finish(&mut self) -> SheetResult<()>;
}
