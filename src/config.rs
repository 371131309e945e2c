//! Run configuration: page grid, caption typography and icon handling.
//!
//! Everything has a default, so an empty JSON object is a valid config file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SheetError, SheetResult};
use crate::fonts::StandardFont;
use crate::geometry::{CM, PageGeometry, PageSize};
use crate::qr::{ErrorCorrection, IconSource};

/// Fonts and spacing for the caption side of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub artist_font: StandardFont,
    pub artist_size: f32,
    pub title_font: StandardFont,
    pub title_size: f32,
    pub year_font: StandardFont,
    pub year_size: f32,
    /// Gap between wrapped lines, also trimmed from the wrap width.
    pub margin: f32,
    /// Distance of the first artist baseline below the tile top; the year
    /// sits half of it below the tile's vertical centre.
    pub indent: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            artist_font: StandardFont::Helvetica,
            artist_size: 10.0,
            title_font: StandardFont::Helvetica,
            title_size: 10.0,
            year_font: StandardFont::HelveticaBold,
            year_size: 30.0,
            margin: 2.0,
            indent: 15.0,
        }
    }
}

impl CaptionStyle {
    pub fn artist_line_height(&self) -> f32 {
        self.artist_size + self.margin
    }

    pub fn title_line_height(&self) -> f32 {
        self.title_size + self.margin
    }

    fn validate(&self) -> SheetResult<()> {
        for (name, size) in [
            ("artist_size", self.artist_size),
            ("title_size", self.title_size),
            ("year_size", self.year_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                return Err(SheetError::Configuration(format!(
                    "{} must be positive (got {})",
                    name, size
                )));
            }
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(SheetError::Configuration(format!(
                "margin must be zero or positive (got {})",
                self.margin
            )));
        }
        Ok(())
    }
}

/// What to do when the icon cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Log a warning and render every card without an icon.
    Skip,
}

/// Complete configuration of a sheet run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub page_size: PageSize,
    /// Overrides the preset width when set.
    pub page_width_cm: Option<f32>,
    /// Overrides the preset height when set.
    pub page_height_cm: Option<f32>,
    pub tile_size_cm: f32,
    pub vertical_margin_cm: f32,
    pub border: bool,
    /// File path or http(s) URL of an image pasted into every QR code.
    pub icon: Option<String>,
    pub icon_policy: IconPolicy,
    pub error_correction: ErrorCorrection,
    pub style: CaptionStyle,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            page_width_cm: None,
            page_height_cm: None,
            tile_size_cm: 4.6,
            vertical_margin_cm: 0.8,
            border: true,
            icon: None,
            icon_policy: IconPolicy::Fail,
            error_correction: ErrorCorrection::Quartile,
            style: CaptionStyle::default(),
        }
    }
}

impl SheetConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn load(path: &Path) -> SheetResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SheetError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> SheetResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SheetError::Configuration(format!("invalid config: {}", e)))
    }

    /// Grid geometry in points, validated.
    pub fn geometry(&self) -> SheetResult<PageGeometry> {
        self.style.validate()?;
        let (preset_w, preset_h) = self.page_size.dimensions();
        let width = self.page_width_cm.map(|cm| cm * CM).unwrap_or(preset_w);
        let height = self.page_height_cm.map(|cm| cm * CM).unwrap_or(preset_h);
        PageGeometry::new(
            width,
            height,
            self.tile_size_cm * CM,
            self.vertical_margin_cm * CM,
        )
    }

    pub fn icon_source(&self) -> Option<IconSource> {
        self.icon
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(IconSource::parse)
    }
}
