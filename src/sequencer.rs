//! Pagination: page-fulls of records become a QR pass and a caption pass.

use std::ops::Range;

use crate::canvas::Canvas;
use crate::error::SheetResult;
use crate::geometry::{Orientation, PageGeometry};
use crate::records::CardRecord;
use crate::render::CardRenderer;

/// One sweep over a page-full, producing a single printed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePass {
    /// Zero-based page-full this pass belongs to.
    pub page_full: usize,
    /// `Front` for the QR pass, `Back` for the caption pass.
    pub side: Orientation,
    /// Record indices drawn on this page.
    pub records: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    QrPass(usize),
    CaptionPass(usize),
    Done,
}

/// Iterator over the passes for `total` records, in print order.
#[derive(Debug, Clone)]
pub struct Passes {
    total: usize,
    per_page: usize,
    state: State,
}

impl Passes {
    pub fn new(total: usize, geometry: &PageGeometry) -> Self {
        let state = if total == 0 {
            State::Done
        } else {
            State::QrPass(0)
        };
        Self {
            total,
            per_page: geometry.tiles_per_page(),
            state,
        }
    }

    fn range(&self, page_full: usize) -> Range<usize> {
        let start = page_full * self.per_page;
        start..(start + self.per_page).min(self.total)
    }
}

impl Iterator for Passes {
    type Item = PagePass;

    fn next(&mut self) -> Option<PagePass> {
        let (page_full, side, next) = match self.state {
            State::Done => return None,
            State::QrPass(n) => (n, Orientation::Front, State::CaptionPass(n)),
            State::CaptionPass(n) => {
                let following = if (n + 1) * self.per_page < self.total {
                    State::QrPass(n + 1)
                } else {
                    State::Done
                };
                (n, Orientation::Back, following)
            }
        };
        self.state = next;
        Some(PagePass {
            page_full,
            side,
            records: self.range(page_full),
        })
    }
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceStats {
    pub records: usize,
    pub page_fulls: usize,
    pub pages: usize,
    pub tiles_drawn: usize,
}

/// Draw every record: QR pass, page break, caption pass, page break, per
/// page-full, then finish the document.
///
/// The first failing tile aborts the run; nothing is retried.
pub fn run<C: Canvas + ?Sized>(
    records: &[CardRecord],
    geometry: &PageGeometry,
    renderer: &mut CardRenderer<'_>,
    canvas: &mut C,
) -> SheetResult<SequenceStats> {
    let mut stats = SequenceStats {
        records: records.len(),
        page_fulls: geometry.page_fulls(records.len()),
        ..SequenceStats::default()
    };

    for pass in Passes::new(records.len(), geometry) {
        tracing::debug!(
            page_full = pass.page_full,
            side = ?pass.side,
            first = pass.records.start,
            count = pass.records.len(),
            "drawing pass"
        );
        for index in pass.records.clone() {
            let record = &records[index];
            let position = geometry.position(index, pass.side);
            match pass.side {
                Orientation::Front => renderer.draw_qr_tile(canvas, index + 1, record, position)?,
                Orientation::Back => renderer.draw_caption_tile(canvas, record, position)?,
            }
            stats.tiles_drawn += 1;
        }
        canvas.new_page()?;
        stats.pages += 1;
    }

    canvas.finish()?;
    Ok(stats)
}
