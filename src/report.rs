//! What a finished run produced, and its JSON summary.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SheetError, SheetResult};
use crate::geometry::PageGeometry;
use crate::sequencer::SequenceStats;

/// Outcome of [`render_sheet`](crate::render_sheet).
#[derive(Debug, Clone)]
pub struct SheetReport {
    pub geometry: PageGeometry,
    pub stats: SequenceStats,
    /// Icon identifier actually embedded, if any.
    pub icon: Option<String>,
    /// SHA-256 of each distinct QR bitmap, keyed by URL.
    pub digests: BTreeMap<String, String>,
}

/// Serializable run summary written by `--summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub generated_at: DateTime<Utc>,
    pub records: usize,
    pub tiles_per_row: usize,
    pub tiles_per_column: usize,
    pub tiles_per_page: usize,
    pub page_fulls: usize,
    pub pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub qr_digests: BTreeMap<String, String>,
}

impl SheetReport {
    pub fn summary(&self) -> SheetSummary {
        SheetSummary {
            generated_at: Utc::now(),
            records: self.stats.records,
            tiles_per_row: self.geometry.tiles_per_row(),
            tiles_per_column: self.geometry.tiles_per_column(),
            tiles_per_page: self.geometry.tiles_per_page(),
            page_fulls: self.stats.page_fulls,
            pages: self.stats.pages,
            icon: self.icon.clone(),
            qr_digests: self.digests.clone(),
        }
    }
}

impl SheetSummary {
    pub fn to_json(&self) -> SheetResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SheetError::canvas(format!("cannot serialize summary: {}", e)))
    }

    pub fn write(&self, path: &Path) -> SheetResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json + "\n")
            .map_err(|e| SheetError::canvas(format!("cannot write {}: {}", path.display(), e)))
    }
}
