//! QR bitmaps, the optional centre icon, and the per-run asset cache.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::rc::Rc;

use image::imageops::{FilterType, overlay, resize};
use image::{DynamicImage, ImageBuffer, RgbImage, RgbaImage};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{SheetError, SheetResult};

/// Error-correction level of generated symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(value: ErrorCorrection) -> EcLevel {
        match value {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

impl Default for ErrorCorrection {
    fn default() -> Self {
        ErrorCorrection::Quartile
    }
}

/// Where the centre icon comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IconSource {
    File(PathBuf),
    Url(String),
}

impl IconSource {
    /// `http://` and `https://` strings are URLs, anything else a file path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            IconSource::Url(raw.to_string())
        } else {
            IconSource::File(PathBuf::from(raw))
        }
    }

    /// Stable identifier used as the cache key and in error messages.
    pub fn id(&self) -> String {
        match self {
            IconSource::File(path) => path.display().to_string(),
            IconSource::Url(url) => url.clone(),
        }
    }

    fn fetch(&self) -> SheetResult<Vec<u8>> {
        match self {
            IconSource::File(path) => std::fs::read(path)
                .map_err(|e| SheetError::asset(self.id(), e.to_string())),
            IconSource::Url(url) => {
                let response = ureq::get(url)
                    .call()
                    .map_err(|e| SheetError::asset(self.id(), format!("fetch failed: {}", e)))?;
                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut bytes)
                    .map_err(|e| SheetError::asset(self.id(), format!("read failed: {}", e)))?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// A rendered QR symbol, square and opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct QrBitmap {
    image: RgbImage,
}

impl QrBitmap {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Hex SHA-256 of the raw pixel data.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.image.width().to_be_bytes());
        hasher.update(self.image.height().to_be_bytes());
        hasher.update(self.image.as_raw());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

/// Turns text into QR bitmaps.
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    pub error_correction: ErrorCorrection,
    /// Pixels per module.
    pub module_px: u32,
    /// Light modules around the symbol.
    pub quiet_zone: u32,
    /// Icon edge as a fraction of the full bitmap edge.
    pub icon_ratio: f32,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::Quartile,
            module_px: 10,
            quiet_zone: 4,
            icon_ratio: 0.25,
        }
    }
}

impl QrEncoder {
    /// Encode `text`, pasting `icon` over the centre when given.
    ///
    /// The output depends only on the inputs.
    pub fn encode(&self, text: &str, icon: Option<&RgbaImage>) -> Result<QrBitmap, String> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), self.error_correction.into())
            .map_err(|e| format!("cannot encode as QR: {}", e))?;
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let module_px = self.module_px.max(1);
        let edge = (modules + 2 * self.quiet_zone) * module_px;

        let mut canvas: RgbaImage =
            ImageBuffer::from_pixel(edge, edge, image::Rgba([0xff, 0xff, 0xff, 0xff]));
        for (idx, color) in colors.iter().enumerate() {
            if *color != qrcode::Color::Dark {
                continue;
            }
            let mx = idx as u32 % modules + self.quiet_zone;
            let my = idx as u32 / modules + self.quiet_zone;
            for py in my * module_px..(my + 1) * module_px {
                for px in mx * module_px..(mx + 1) * module_px {
                    canvas.put_pixel(px, py, image::Rgba([0, 0, 0, 0xff]));
                }
            }
        }

        if let Some(icon) = icon {
            let icon_edge = ((edge as f32 * self.icon_ratio) as u32).max(1);
            let scaled = resize(icon, icon_edge, icon_edge, FilterType::Lanczos3);
            let offset = ((edge - icon_edge) / 2) as i64;
            overlay(&mut canvas, &scaled, offset, offset);
        }

        Ok(QrBitmap {
            image: DynamicImage::ImageRgba8(canvas).to_rgb8(),
        })
    }
}

/// Icons and QR bitmaps produced during one run.
///
/// Entries are filled on first use and never evicted; the cache is dropped
/// with the run that owns it.
#[derive(Debug, Default)]
pub struct AssetCache {
    icons: HashMap<IconSource, Rc<RgbaImage>>,
    bitmaps: HashMap<String, Rc<QrBitmap>>,
    fetches: usize,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded icon for `source`, read or downloaded at most once.
    pub fn icon(&mut self, source: &IconSource) -> SheetResult<Rc<RgbaImage>> {
        if let Some(found) = self.icons.get(source) {
            return Ok(Rc::clone(found));
        }
        tracing::debug!(icon = %source, "loading icon");
        let bytes = source.fetch()?;
        self.fetches += 1;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| SheetError::asset(source.id(), format!("cannot decode image: {}", e)))?
            .to_rgba8();
        let decoded = Rc::new(decoded);
        self.icons.insert(source.clone(), Rc::clone(&decoded));
        Ok(decoded)
    }

    /// QR bitmap for `url`, encoded at most once per run.
    pub fn bitmap(
        &mut self,
        encoder: &QrEncoder,
        url: &str,
        icon: Option<&RgbaImage>,
        row: usize,
    ) -> SheetResult<Rc<QrBitmap>> {
        if let Some(found) = self.bitmaps.get(url) {
            return Ok(Rc::clone(found));
        }
        let bitmap = Rc::new(encoder.encode(url, icon).map_err(|e| SheetError::data(row, e))?);
        self.bitmaps.insert(url.to_string(), Rc::clone(&bitmap));
        Ok(bitmap)
    }

    /// Number of icon reads or downloads performed.
    pub fn icon_fetches(&self) -> usize {
        self.fetches
    }

    /// Number of distinct QR bitmaps generated.
    pub fn bitmap_count(&self) -> usize {
        self.bitmaps.len()
    }

    /// SHA-256 digest of every generated bitmap, keyed by URL.
    pub fn digests(&self) -> BTreeMap<String, String> {
        self.bitmaps
            .iter()
            .map(|(url, bitmap)| (url.clone(), bitmap.digest()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Pixel;
    use pretty_assertions::assert_eq;

    #[test]
    fn encoding_is_deterministic() {
        let encoder = QrEncoder::default();
        let a = encoder.encode("https://open.spotify.com/track/abc", None).unwrap();
        let b = encoder.encode("https://open.spotify.com/track/abc", None).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.image().as_raw(), b.image().as_raw());
        let other = encoder.encode("https://open.spotify.com/track/xyz", None).unwrap();
        assert_ne!(a.digest(), other.digest());
    }

    #[test]
    fn bitmap_has_quiet_zone_and_module_size() {
        let encoder = QrEncoder::default();
        let bitmap = encoder.encode("hello", None).unwrap();
        let image = bitmap.image();
        assert_eq!(image.width(), image.height());
        // version 1 is 21 modules, plus 4 light modules per side, 10px each
        assert_eq!(image.width(), (21 + 8) * 10);
        assert_eq!(image.get_pixel(0, 0), &Pixel([0xff, 0xff, 0xff]));
        // the finder pattern's top-left corner is dark
        assert_eq!(image.get_pixel(40, 40), &Pixel([0, 0, 0]));
    }

    #[test]
    fn icon_covers_centre() {
        let encoder = QrEncoder {
            error_correction: ErrorCorrection::High,
            ..QrEncoder::default()
        };
        let icon: RgbaImage = ImageBuffer::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]));
        let bitmap = encoder.encode("hello", Some(&icon)).unwrap();
        let image = bitmap.image();
        let mid = image.width() / 2;
        let Pixel([r, g, b]) = *image.get_pixel(mid, mid);
        assert!(r > 200 && g < 50 && b < 50, "centre pixel is {r},{g},{b}");
    }

    #[test]
    fn cache_encodes_each_url_once() {
        let encoder = QrEncoder::default();
        let mut cache = AssetCache::new();
        let a = cache.bitmap(&encoder, "https://a", None, 1).unwrap();
        let b = cache.bitmap(&encoder, "https://a", None, 2).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        cache.bitmap(&encoder, "https://b", None, 3).unwrap();
        assert_eq!(cache.bitmap_count(), 2);
        assert_eq!(cache.digests().len(), 2);
    }

    #[test]
    fn missing_icon_is_asset_error() {
        let mut cache = AssetCache::new();
        let source = IconSource::parse("/definitely/not/here.png");
        assert!(matches!(
            cache.icon(&source),
            Err(SheetError::Asset { .. })
        ));
    }

    #[test]
    fn icon_file_is_read_once() {
        let path = std::env::temp_dir().join(format!("playcards-icon-{}.png", std::process::id()));
        let icon: RgbaImage = ImageBuffer::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
        icon.save(&path).unwrap();
        let source = IconSource::parse(path.to_str().unwrap());
        let mut cache = AssetCache::new();
        let first = cache.icon(&source).unwrap();
        let second = cache.icon(&source).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.icon_fetches(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn icon_source_kinds() {
        assert_eq!(
            IconSource::parse(" https://x/y.png "),
            IconSource::Url("https://x/y.png".into())
        );
        assert_eq!(
            IconSource::parse("logo.png"),
            IconSource::File(PathBuf::from("logo.png"))
        );
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let encoder = QrEncoder::default();
        let huge = "x".repeat(8000);
        assert!(encoder.encode(&huge, None).is_err());
    }
}
