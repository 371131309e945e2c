//! PNG proof sheets: one image per page, text drawn with a block glyph font.
//!
//! Glyph advances use the same AFM widths as the PDF backend, so line breaks
//! and centring match the real output even though the letter shapes do not.

use std::path::{Path, PathBuf};

use image::imageops::{FilterType, overlay, resize};
use image::{ImageBuffer, Rgb as Pixel, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PxRect;

use super::{Canvas, Rect};
use crate::error::{SheetError, SheetResult};
use crate::fonts::StandardFont;
use crate::records::Rgb;
use crate::text::TextMeasure;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
const INK: Pixel<u8> = Pixel([0x1f, 0x1b, 0x14]);
const PAPER: Pixel<u8> = Pixel([0xff, 0xff, 0xff]);

/// Renders pages to PNG files named `<stem>-NNN.png` next to `path`.
pub struct RasterCanvas {
    path: PathBuf,
    width: f32,
    height: f32,
    scale: f32,
    current: Option<RgbImage>,
    pages: Vec<RgbImage>,
    written: Vec<PathBuf>,
}

impl RasterCanvas {
    /// `width` and `height` are in points; `dpi` is clamped to 36..=600.
    pub fn new<P: AsRef<Path>>(path: P, width: f32, height: f32, dpi: u32) -> Self {
        let dpi = dpi.clamp(36, 600);
        Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            scale: dpi as f32 / 72.0,
            current: None,
            pages: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Files produced by [`Canvas::finish`].
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn px(&self, value: f32) -> i32 {
        (value * self.scale).round() as i32
    }

    fn extent(&self, value: f32) -> u32 {
        ((value * self.scale).round() as u32).max(1)
    }

    /// Pixel rectangle for a rect in page points (origin flipped to the top).
    fn to_pixels(&self, rect: Rect) -> PxRect {
        PxRect::at(self.px(rect.x), self.px(self.height - rect.y - rect.height))
            .of_size(self.extent(rect.width), self.extent(rect.height))
    }

    fn blank_page(&self) -> RgbImage {
        ImageBuffer::from_pixel(self.extent(self.width), self.extent(self.height), PAPER)
    }

    fn page(&mut self) -> &mut RgbImage {
        let (w, h) = (self.extent(self.width), self.extent(self.height));
        self.current
            .get_or_insert_with(|| ImageBuffer::from_pixel(w, h, PAPER))
    }

    fn page_path(&self, number: usize) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sheet".to_string());
        let name = format!("{}-{:03}.png", stem, number);
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
            _ => PathBuf::from(name),
        }
    }
}

fn pixel(color: Rgb) -> Pixel<u8> {
    Pixel(color.to_bytes())
}

impl TextMeasure for RasterCanvas {
    fn text_width(&self, text: &str, font: StandardFont, size: f32) -> f32 {
        font.text_width(text, size)
    }
}

impl Canvas for RasterCanvas {
    fn draw_image(&mut self, bitmap: &RgbImage, rect: Rect) -> SheetResult<()> {
        let target = self.to_pixels(rect);
        let scaled = resize(bitmap, target.width(), target.height(), FilterType::Nearest);
        let page = self.page();
        overlay(page, &scaled, target.left() as i64, target.top() as i64);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font: StandardFont,
        size: f32,
    ) -> SheetResult<()> {
        // Cap height is roughly 0.7em; spread it over the 7 glyph rows.
        let dot = ((0.1 * size * self.scale).round() as u32).max(1);
        let top = self.px(self.height - y) - (GLYPH_HEIGHT as u32 * dot) as i32;
        let glyph_span = (GLYPH_WIDTH as u32 * dot) as f32;
        let mut pen = x * self.scale;
        let advances: Vec<(char, f32)> = text
            .chars()
            .map(|ch| (ch, font.char_width(ch, size) * self.scale))
            .collect();
        let page = self.page();
        for (ch, advance) in advances {
            let left = (pen + (advance - glyph_span) / 2.0).round() as i32;
            draw_glyph(page, left, top, ch, dot);
            pen += advance;
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> SheetResult<()> {
        let target = self.to_pixels(rect);
        draw_filled_rect_mut(self.page(), target, pixel(color));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect) -> SheetResult<()> {
        let target = self.to_pixels(rect);
        draw_hollow_rect_mut(self.page(), target, INK);
        Ok(())
    }

    /// Every call closes exactly one page, blank if nothing was drawn on it.
    fn new_page(&mut self) -> SheetResult<()> {
        let done = match self.current.take() {
            Some(page) => page,
            None => self.blank_page(),
        };
        self.pages.push(done);
        Ok(())
    }

    fn finish(&mut self) -> SheetResult<()> {
        // Only a page with drawing on it is still open here.
        if let Some(open) = self.current.take() {
            self.pages.push(open);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SheetError::canvas(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let pages = std::mem::take(&mut self.pages);
        for (idx, page) in pages.iter().enumerate() {
            let target = self.page_path(idx + 1);
            page.save(&target).map_err(|e| {
                SheetError::canvas(format!("cannot write {}: {}", target.display(), e))
            })?;
            self.written.push(target);
        }
        tracing::debug!(pages = self.written.len(), "proof pages written");
        Ok(())
    }
}

fn draw_glyph(image: &mut RgbImage, x: i32, y: i32, ch: char, dot: u32) {
    let pattern = glyph_pattern(ch);
    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                let px = x + (col as i32 * dot as i32);
                let py = y + (row as i32 * dot as i32);
                draw_filled_rect_mut(image, PxRect::at(px, py).of_size(dot, dot), INK);
            }
        }
    }
}

#[rustfmt::skip]
fn glyph_pattern(ch: char) -> [u8; GLYPH_HEIGHT] {
    match ch.to_ascii_uppercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '/' => [0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000, 0b00000],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '\'' => [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => [0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00010, 0b00100, 0b00100, 0b00000, 0b00100],
        ' ' => [0; GLYPH_HEIGHT],
        // Anything else prints as a hollow box so gaps stay visible.
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}
