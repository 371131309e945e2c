use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::RgbImage;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
    Polygon, Px,
};

use super::{Canvas, Rect};
use crate::error::{SheetError, SheetResult};
use crate::fonts::StandardFont;
use crate::records::Rgb;
use crate::text::TextMeasure;

const LAYER_NAME: &str = "Cards";
const BORDER_WIDTH_PT: f32 = 1.0;

fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(color.r, color.g, color.b, None))
}

fn builtin(font: StandardFont) -> BuiltinFont {
    match font {
        StandardFont::Helvetica => BuiltinFont::Helvetica,
        StandardFont::HelveticaBold => BuiltinFont::HelveticaBold,
        StandardFont::HelveticaOblique => BuiltinFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique => BuiltinFont::HelveticaBoldOblique,
        StandardFont::Courier => BuiltinFont::Courier,
        StandardFont::CourierBold => BuiltinFont::CourierBold,
    }
}

/// PDF document backed by `printpdf`, written to `path` on [`Canvas::finish`].
pub struct PdfCanvas {
    path: PathBuf,
    width: f32,
    height: f32,
    doc: Option<PdfDocumentReference>,
    layer: PdfLayerReference,
    fonts: HashMap<StandardFont, IndirectFontRef>,
    page_pending: bool,
    pages: usize,
}

impl PdfCanvas {
    /// Start a document whose pages are `width` x `height` points.
    pub fn new<P: AsRef<Path>>(path: P, title: &str, width: f32, height: f32) -> Self {
        let (doc, page, layer) = PdfDocument::new(title, pt(width), pt(height), LAYER_NAME);
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            doc: Some(doc),
            layer,
            fonts: HashMap::new(),
            page_pending: false,
            pages: 1,
        }
    }

    /// Pages created so far, including the one currently open.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn doc(&self) -> SheetResult<&PdfDocumentReference> {
        self.doc
            .as_ref()
            .ok_or_else(|| SheetError::canvas("document already written"))
    }

    fn open_page(&mut self) -> SheetResult<()> {
        let doc = self.doc()?;
        let (page, layer) = doc.add_page(pt(self.width), pt(self.height), LAYER_NAME);
        self.layer = doc.get_page(page).get_layer(layer);
        self.pages += 1;
        Ok(())
    }

    /// Layer of the page being drawn, opening a new page after a break.
    fn layer(&mut self) -> SheetResult<PdfLayerReference> {
        if self.page_pending {
            self.open_page()?;
            self.page_pending = false;
        }
        Ok(self.layer.clone())
    }

    fn font(&mut self, font: StandardFont) -> SheetResult<IndirectFontRef> {
        if let Some(found) = self.fonts.get(&font) {
            return Ok(found.clone());
        }
        let handle = self
            .doc()?
            .add_builtin_font(builtin(font))
            .map_err(|e| SheetError::canvas(format!("cannot register {}: {}", font, e)))?;
        self.fonts.insert(font, handle.clone());
        Ok(handle)
    }
}

fn corners(rect: Rect) -> Vec<(Point, bool)> {
    vec![
        (Point::new(pt(rect.x), pt(rect.y)), false),
        (Point::new(pt(rect.x + rect.width), pt(rect.y)), false),
        (
            Point::new(pt(rect.x + rect.width), pt(rect.y + rect.height)),
            false,
        ),
        (Point::new(pt(rect.x), pt(rect.y + rect.height)), false),
    ]
}

impl TextMeasure for PdfCanvas {
    fn text_width(&self, text: &str, font: StandardFont, size: f32) -> f32 {
        font.text_width(text, size)
    }
}

impl Canvas for PdfCanvas {
    fn draw_image(&mut self, bitmap: &RgbImage, rect: Rect) -> SheetResult<()> {
        let layer = self.layer()?;
        let (width_px, height_px) = bitmap.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(SheetError::canvas("cannot place an empty bitmap"));
        }

        // The pixel buffer is moved into the document; nothing outlives this call.
        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: bitmap.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // At `dpi` the image is `px / dpi` inches wide, i.e. `px * 72 / dpi` points.
        let dpi = width_px as f32 * 72.0 / rect.width;
        let natural_height = height_px as f32 * 72.0 / dpi;
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(pt(rect.x)),
                translate_y: Some(pt(rect.y)),
                dpi: Some(dpi),
                scale_y: Some(rect.height / natural_height),
                ..Default::default()
            },
        );
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
        let handle = self.font(font)?;
        let layer = self.layer()?;
        layer.set_fill_color(pdf_color(Rgb::BLACK));
        layer.use_text(text, size, pt(x), pt(y), &handle);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> SheetResult<()> {
        let layer = self.layer()?;
        layer.set_fill_color(pdf_color(color));
        layer.add_polygon(Polygon {
            rings: vec![corners(rect)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect) -> SheetResult<()> {
        let layer = self.layer()?;
        layer.set_outline_color(pdf_color(Rgb::BLACK));
        layer.set_outline_thickness(BORDER_WIDTH_PT);
        layer.add_line(Line {
            points: corners(rect),
            is_closed: true,
        });
        Ok(())
    }

    /// The following page is opened on the next draw. A second break with
    /// nothing drawn in between emits the skipped page blank, so every break
    /// accounts for exactly one page.
    fn new_page(&mut self) -> SheetResult<()> {
        if self.page_pending {
            self.open_page()?;
        } else {
            self.doc()?;
        }
        self.page_pending = true;
        Ok(())
    }

    fn finish(&mut self) -> SheetResult<()> {
        let doc = self
            .doc
            .take()
            .ok_or_else(|| SheetError::canvas("document already written"))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SheetError::canvas(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let file = File::create(&self.path).map_err(|e| {
            SheetError::canvas(format!("cannot create {}: {}", self.path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        doc.save(&mut writer).map_err(|e| {
            SheetError::canvas(format!("cannot write {}: {}", self.path.display(), e))
        })?;
        tracing::debug!(path = %self.path.display(), pages = self.pages, "pdf written");
        Ok(())
    }
}
