use image::RgbImage;
use playcards::{
    Canvas, CardRecord, IconPolicy, PdfCanvas, RasterCanvas, Rect, Rgb, SheetConfig, SheetError,
    SheetResult, StandardFont, TextMeasure, read_records, render_sheet,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Image(Rect),
    Text(String),
    Fill(Rect, Rgb),
    Stroke(Rect),
    Page,
    Finish,
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    /// Fail the draw call with this zero-based number, counting images and text.
    fail_at: Option<usize>,
    draws: usize,
}

impl Recorder {
    fn failing_at(draw: usize) -> Self {
        Self {
            fail_at: Some(draw),
            ..Self::default()
        }
    }

    fn draw(&mut self, op: Op) -> SheetResult<()> {
        let n = self.draws;
        self.draws += 1;
        if self.fail_at == Some(n) {
            return Err(SheetError::Canvas(format!("draw {} refused", n)));
        }
        self.ops.push(op);
        Ok(())
    }

    fn pages(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Page).count()
    }

    /// Ops grouped by page, page breaks dropped.
    fn by_page(&self) -> Vec<Vec<Op>> {
        let mut pages = vec![Vec::new()];
        for op in &self.ops {
            match op {
                Op::Page => pages.push(Vec::new()),
                Op::Finish => {}
                other => pages.last_mut().unwrap().push(other.clone()),
            }
        }
        pages.pop();
        pages
    }
}

impl TextMeasure for Recorder {
    fn text_width(&self, text: &str, font: StandardFont, size: f32) -> f32 {
        font.text_width(text, size)
    }
}

impl Canvas for Recorder {
    fn draw_image(&mut self, _bitmap: &RgbImage, rect: Rect) -> SheetResult<()> {
        self.draw(Op::Image(rect))
    }

    fn draw_text(
        &mut self,
        text: &str,
        _x: f32,
        _y: f32,
        _font: StandardFont,
        _size: f32,
    ) -> SheetResult<()> {
        self.draw(Op::Text(text.to_string()))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> SheetResult<()> {
        self.ops.push(Op::Fill(rect, color));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect) -> SheetResult<()> {
        self.ops.push(Op::Stroke(rect));
        Ok(())
    }

    fn new_page(&mut self) -> SheetResult<()> {
        self.ops.push(Op::Page);
        Ok(())
    }

    fn finish(&mut self) -> SheetResult<()> {
        self.ops.push(Op::Finish);
        Ok(())
    }
}

fn records(n: usize) -> Vec<CardRecord> {
    (0..n)
        .map(|i| {
            CardRecord::new(
                i + 1,
                &format!("https://open.spotify.com/track/{}", i),
                Some("Artist"),
                Some("Title"),
                Some("1999"),
                None,
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn twenty_five_cards_fill_four_pages() {
    let mut canvas = Recorder::default();
    let report = render_sheet(&records(25), &SheetConfig::default(), &mut canvas).unwrap();

    assert_eq!(report.geometry.tiles_per_page(), 24);
    assert_eq!(report.stats.pages, 4);
    assert_eq!(canvas.pages(), 4);
    assert_eq!(canvas.ops.last(), Some(&Op::Finish));

    let pages = canvas.by_page();
    let images: Vec<usize> = pages
        .iter()
        .map(|ops| ops.iter().filter(|op| matches!(op, Op::Image(_))).count())
        .collect();
    assert_eq!(images, vec![24, 0, 1, 0]);
    let texts: Vec<usize> = pages
        .iter()
        .map(|ops| ops.iter().filter(|op| matches!(op, Op::Text(_))).count())
        .collect();
    // artist, title and year per card
    assert_eq!(texts, vec![0, 72, 0, 3]);
}

#[test]
fn caption_lands_behind_its_code() {
    let mut canvas = Recorder::default();
    let config = SheetConfig::default();
    let report = render_sheet(&records(1), &config, &mut canvas).unwrap();
    let g = report.geometry;

    let pages = canvas.by_page();
    let front = match pages[0][0] {
        Op::Image(rect) => rect,
        ref other => panic!("expected image, got {:?}", other),
    };
    let back = match pages[1][0] {
        Op::Stroke(rect) => rect,
        ref other => panic!("expected border, got {:?}", other),
    };
    assert_eq!(front.y, back.y);
    // mirrored about the vertical centre line of the page
    let centre = g.page_width() / 2.0;
    let front_mid = front.x + front.width / 2.0;
    let back_mid = back.x + back.width / 2.0;
    assert!((centre - front_mid - (back_mid - centre)).abs() < 1e-3);
}

#[test]
fn blank_caption_only_draws_border() {
    let record = CardRecord::new(1, "https://example.com/x", None, Some("  "), None, None).unwrap();
    let mut canvas = Recorder::default();
    render_sheet(&[record], &SheetConfig::default(), &mut canvas).unwrap();

    let pages = canvas.by_page();
    assert_eq!(pages[1].len(), 1);
    assert!(matches!(pages[1][0], Op::Stroke(_)));
}

#[test]
fn background_replaces_border() {
    let color = Rgb::new(0.2, 0.4, 0.6).unwrap();
    let record = CardRecord::new(1, "https://example.com/x", Some("A"), None, None, Some(color))
        .unwrap();
    let mut canvas = Recorder::default();
    render_sheet(&[record], &SheetConfig::default(), &mut canvas).unwrap();

    let pages = canvas.by_page();
    assert!(matches!(pages[0][0], Op::Fill(_, c) if c == color));
    assert!(matches!(pages[0][1], Op::Image(_)));
    assert!(!pages[0].iter().any(|op| matches!(op, Op::Stroke(_))));
    assert!(matches!(pages[1][0], Op::Fill(_, c) if c == color));
    assert!(!pages[1].iter().any(|op| matches!(op, Op::Stroke(_))));
}

#[test]
fn no_border_draws_no_strokes() {
    let config = SheetConfig {
        border: false,
        ..SheetConfig::default()
    };
    let mut canvas = Recorder::default();
    render_sheet(&records(3), &config, &mut canvas).unwrap();
    assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Stroke(_))));
}

#[test]
fn missing_icon_aborts_before_drawing() {
    let config = SheetConfig {
        icon: Some("/nonexistent/playcards-icon.png".to_string()),
        ..SheetConfig::default()
    };
    let mut canvas = Recorder::default();
    let err = render_sheet(&records(2), &config, &mut canvas).unwrap_err();
    assert!(matches!(err, SheetError::Asset { .. }));
    assert!(canvas.ops.is_empty());
}

#[test]
fn missing_icon_can_be_skipped() {
    let config = SheetConfig {
        icon: Some("/nonexistent/playcards-icon.png".to_string()),
        icon_policy: IconPolicy::Skip,
        ..SheetConfig::default()
    };
    let mut canvas = Recorder::default();
    let report = render_sheet(&records(2), &config, &mut canvas).unwrap();
    assert_eq!(report.icon, None);
    assert_eq!(report.stats.tiles_drawn, 4);
}

#[test]
fn oversized_tile_is_a_configuration_error() {
    let config = SheetConfig {
        tile_size_cm: 40.0,
        ..SheetConfig::default()
    };
    let mut canvas = Recorder::default();
    let err = render_sheet(&records(2), &config, &mut canvas).unwrap_err();
    assert!(matches!(err, SheetError::Configuration(_)));
    assert!(canvas.ops.is_empty());
}

#[test]
fn empty_input_only_finishes() {
    let mut canvas = Recorder::default();
    let report = render_sheet(&[], &SheetConfig::default(), &mut canvas).unwrap();
    assert_eq!(report.stats.pages, 0);
    assert_eq!(canvas.ops, vec![Op::Finish]);
}

#[test]
fn digests_are_stable_across_runs() {
    let csv = "URL,Artist,Title,Year\n\
               https://example.com/a,A,Song,2001\n\
               https://example.com/b,B,Other,2002\n\
               https://example.com/a,A,Song again,2001\n";
    let input = read_records(csv.as_bytes()).unwrap();

    let first = render_sheet(&input, &SheetConfig::default(), &mut Recorder::default()).unwrap();
    let second = render_sheet(&input, &SheetConfig::default(), &mut Recorder::default()).unwrap();
    assert_eq!(first.digests.len(), 2);
    assert_eq!(first.digests, second.digests);

    let summary = first.summary();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.pages, 2);
}

#[test]
fn failing_image_aborts_the_run() {
    let mut canvas = Recorder::failing_at(2);
    let err = render_sheet(&records(5), &SheetConfig::default(), &mut canvas).unwrap_err();
    assert!(matches!(err, SheetError::Canvas(ref msg) if msg == "draw 2 refused"));

    // two QR tiles with their borders, then nothing
    assert_eq!(canvas.ops.len(), 4);
    assert!(matches!(canvas.ops[3], Op::Stroke(_)));
    assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Page | Op::Finish)));
}

#[test]
fn failing_caption_text_aborts_the_run() {
    // 2 images, then the first card's artist and title succeed
    let mut canvas = Recorder::failing_at(4);
    let err = render_sheet(&records(2), &SheetConfig::default(), &mut canvas).unwrap_err();
    assert!(matches!(err, SheetError::Canvas(_)));

    assert_eq!(canvas.pages(), 1);
    assert_eq!(canvas.ops.last(), Some(&Op::Text("Title".to_string())));
    assert!(!canvas.ops.contains(&Op::Finish));
}

fn blank_records(n: usize) -> Vec<CardRecord> {
    (0..n)
        .map(|i| {
            CardRecord::new(i + 1, &format!("https://example.com/{}", i), None, None, None, None)
                .unwrap()
        })
        .collect()
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("playcards-{}-{}", name, std::process::id()))
}

#[test]
fn empty_caption_passes_keep_their_pdf_pages() {
    let config = SheetConfig {
        border: false,
        ..SheetConfig::default()
    };
    let dir = scratch_dir("pdf-blank");
    let mut canvas = PdfCanvas::new(dir.join("cards.pdf"), "cards", 595.0, 842.0);
    let report = render_sheet(&blank_records(25), &config, &mut canvas).unwrap();

    assert_eq!(report.stats.pages, 4);
    assert_eq!(canvas.page_count(), 4);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_caption_passes_keep_their_png_pages() {
    let config = SheetConfig {
        border: false,
        ..SheetConfig::default()
    };
    let dir = scratch_dir("png-blank");
    let mut canvas = RasterCanvas::new(dir.join("proof.png"), 595.0, 842.0, 36);
    let report = render_sheet(&blank_records(25), &config, &mut canvas).unwrap();

    assert_eq!(report.stats.pages, 4);
    let written = canvas.written().to_vec();
    assert_eq!(written.len(), 4);
    assert!(written[3].ends_with("proof-004.png"));
    let _ = std::fs::remove_dir_all(&dir);
}
