//! Card records and their tabular source.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SheetError, SheetResult};

/// RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Result<Self, String> {
        for (name, value) in [("red", r), ("green", g), ("blue", b)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} component {} is outside [0, 1]", name, value));
            }
        }
        Ok(Self { r, g, b })
    }

    /// Components scaled to 8-bit channels.
    pub fn to_bytes(self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parses `"r,g,b"` where every component lies in `[0, 1]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("colour '{}' must have the form r,g,b", s));
        }
        let mut values = [0.0f32; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f32>()
                .map_err(|_| format!("colour component '{}' is not a number", part))?;
        }
        Rgb::new(values[0], values[1], values[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// One card: the URL behind the QR code and the caption printed on its back.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    url: String,
    artist: Option<String>,
    title: Option<String>,
    year: Option<String>,
    background: Option<Rgb>,
}

impl CardRecord {
    /// Build a record, trimming every field and dropping blank optional ones.
    ///
    /// `row` is the 1-based data row used in error messages.
    pub fn new(
        row: usize,
        url: &str,
        artist: Option<&str>,
        title: Option<&str>,
        year: Option<&str>,
        background: Option<Rgb>,
    ) -> SheetResult<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SheetError::data(row, "URL is missing or blank"));
        }
        Ok(Self {
            url: url.to_string(),
            artist: non_blank(artist),
            title: non_blank(title),
            year: non_blank(year),
            background,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn background(&self) -> Option<Rgb> {
        self.background
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Raw CSV row before validation.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "URL", alias = "url", alias = "Url", default)]
    url: Option<String>,
    #[serde(rename = "Artist", alias = "artist", default)]
    artist: Option<String>,
    #[serde(rename = "Title", alias = "title", default)]
    title: Option<String>,
    #[serde(rename = "Year", alias = "year", default)]
    year: Option<String>,
    #[serde(
        rename = "Color",
        alias = "color",
        alias = "Colour",
        alias = "BackgroundColor",
        alias = "background_color",
        default
    )]
    color: Option<String>,
}

impl CsvRow {
    fn into_record(self, row: usize) -> SheetResult<CardRecord> {
        let url = self
            .url
            .ok_or_else(|| SheetError::data(row, "URL is missing or blank"))?;
        let background = match non_blank(self.color.as_deref()) {
            Some(raw) => Some(raw.parse::<Rgb>().map_err(|e| SheetError::data(row, e))?),
            None => None,
        };
        CardRecord::new(
            row,
            &url,
            self.artist.as_deref(),
            self.title.as_deref(),
            self.year.as_deref(),
            background,
        )
    }
}

/// Read every record from CSV text with a header row.
///
/// The first invalid row aborts the read.
pub fn read_records<R: Read>(reader: R) -> SheetResult<Vec<CardRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| SheetError::data(0, format!("unreadable header: {}", e)))?;
    if !headers.iter().any(|h| h.eq_ignore_ascii_case("url")) {
        return Err(SheetError::data(0, "header row has no URL column"));
    }

    let mut records = Vec::new();
    for (idx, row) in csv.deserialize::<CsvRow>().enumerate() {
        let row_no = idx + 1;
        let row = row.map_err(|e| SheetError::data(row_no, e.to_string()))?;
        records.push(row.into_record(row_no)?);
    }
    Ok(records)
}

/// Read records from a CSV file on disk.
pub fn load_records(path: &Path) -> SheetResult<Vec<CardRecord>> {
    let file = std::fs::File::open(path)
        .map_err(|e| SheetError::data(0, format!("cannot open {}: {}", path.display(), e)))?;
    read_records(file)
}
