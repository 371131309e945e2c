//! Grid geometry: how many square tiles fit on a page and where each one goes.
//!
//! All lengths are PDF points (1/72 inch) with the origin at the bottom-left
//! corner of the page.

use serde::{Deserialize, Serialize};

use crate::error::{SheetError, SheetResult};

/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

/// Which side of the sheet a tile is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// QR side, columns left to right.
    Front,
    /// Caption side, columns mirrored so each caption lands behind its QR
    /// code once the sheet is flipped.
    Back,
}

/// Named paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (21.0 * CM, 29.7 * CM),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Bottom-left corner of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePosition {
    pub x: f32,
    pub y: f32,
}

/// Where a linear record index lands in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub page: usize,
    pub row: usize,
    pub column: usize,
}

/// Page grid derived once per run from page size, tile size and margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    page_width: f32,
    page_height: f32,
    tile_size: f32,
    vertical_margin: f32,
    tiles_per_row: usize,
    tiles_per_column: usize,
    horizontal_margin: f32,
}

impl PageGeometry {
    /// Compute the grid, rejecting dimensions that leave no room for a tile.
    pub fn new(
        page_width: f32,
        page_height: f32,
        tile_size: f32,
        vertical_margin: f32,
    ) -> SheetResult<Self> {
        for (name, value) in [
            ("page width", page_width),
            ("page height", page_height),
            ("tile size", tile_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SheetError::Configuration(format!(
                    "{} must be a positive number (got {})",
                    name, value
                )));
            }
        }
        if !vertical_margin.is_finite() || vertical_margin < 0.0 {
            return Err(SheetError::Configuration(format!(
                "vertical margin must be zero or positive (got {})",
                vertical_margin
            )));
        }

        let tiles_per_row = (page_width / tile_size).floor() as usize;
        let tiles_per_column = (page_height / tile_size).floor() as usize;
        if tiles_per_row == 0 || tiles_per_column == 0 {
            return Err(SheetError::Configuration(format!(
                "tile size {:.1}pt does not fit on a {:.1}x{:.1}pt page",
                tile_size, page_width, page_height
            )));
        }
        let tiles_bottom = vertical_margin + tiles_per_column as f32 * tile_size;
        if tiles_bottom > page_height {
            tracing::warn!(
                vertical_margin,
                tiles_bottom,
                page_height,
                "bottom row of tiles extends past the page edge"
            );
        }

        Ok(Self {
            page_width,
            page_height,
            tile_size,
            vertical_margin,
            tiles_per_row,
            tiles_per_column,
            horizontal_margin: (page_width - tiles_per_row as f32 * tile_size) / 2.0,
        })
    }

    /// Geometry for a named paper size with tile and margin in centimetres.
    pub fn for_page(page: PageSize, tile_cm: f32, vertical_margin_cm: f32) -> SheetResult<Self> {
        let (w, h) = page.dimensions();
        Self::new(w, h, tile_cm * CM, vertical_margin_cm * CM)
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn vertical_margin(&self) -> f32 {
        self.vertical_margin
    }

    pub fn horizontal_margin(&self) -> f32 {
        self.horizontal_margin
    }

    pub fn tiles_per_row(&self) -> usize {
        self.tiles_per_row
    }

    pub fn tiles_per_column(&self) -> usize {
        self.tiles_per_column
    }

    pub fn tiles_per_page(&self) -> usize {
        self.tiles_per_row * self.tiles_per_column
    }

    /// Number of page-fulls needed for `records` cards.
    pub fn page_fulls(&self, records: usize) -> usize {
        records.div_ceil(self.tiles_per_page())
    }

    /// Row/column of a linear index; the column is mirrored for the back side.
    pub fn cell(&self, index: usize, orientation: Orientation) -> GridCell {
        let per_page = self.tiles_per_page();
        let on_page = index % per_page;
        let natural = on_page % self.tiles_per_row;
        let column = match orientation {
            Orientation::Front => natural,
            Orientation::Back => self.tiles_per_row - 1 - natural,
        };
        GridCell {
            page: index / per_page,
            row: on_page / self.tiles_per_row,
            column,
        }
    }

    /// Bottom-left corner of the tile holding record `index`.
    pub fn position(&self, index: usize, orientation: Orientation) -> TilePosition {
        let cell = self.cell(index, orientation);
        TilePosition {
            x: self.horizontal_margin + cell.column as f32 * self.tile_size,
            y: self.page_height - self.vertical_margin - (cell.row + 1) as f32 * self.tile_size,
        }
    }
}
