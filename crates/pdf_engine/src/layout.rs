//! Line breaking and pagination
//!
//! Text blocks are broken greedily at Unicode line break opportunities
//! (UAX #14) and stacked top to bottom; a page ends when the next line does
//! not fit or a block asks for a forced break. Right-to-left blocks are
//! aligned to the right margin and their runs are laid out in reverse order.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::blocks::{Block, BlockContent, TextRun};
use crate::document::PageSize;
use crate::error::Result;
use crate::fonts::{EncodedText, FontHandle, FontResolver};
use crate::style::{Color, TextAlign, TextDirection};

const LINE_HEIGHT: f64 = 1.2;
const BLOCK_SPACING: f64 = 0.5;

/// Page size and margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub size: PageSize,
    pub margin: f64,
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        (self.size.width() - 2.0 * self.margin).max(1.0)
    }

    fn top(&self) -> f64 {
        self.size.height() - self.margin
    }

    fn bottom(&self) -> f64 {
        self.margin
    }
}

/// Text drawn with one font at one position
#[derive(Debug, Clone)]
pub struct PlacedText {
    pub x: f64,
    pub baseline: f64,
    pub font: FontHandle,
    pub size: f64,
    pub color: Color,
    pub encoded: EncodedText,
}

#[derive(Debug, Clone)]
pub enum PageItem {
    /// One line of a text block
    Line { block: usize, spans: Vec<PlacedText> },
    /// A figure with its lower-left corner at (`x`, `y`)
    Figure { block: usize, x: f64, y: f64 },
}

impl PageItem {
    pub fn block(&self) -> usize {
        match self {
            PageItem::Line { block, .. } | PageItem::Figure { block, .. } => *block,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<PageItem>,
}

/// A shaped piece of a line, before positioning
#[derive(Debug, Clone)]
struct Piece {
    font: FontHandle,
    size: f64,
    color: Color,
    encoded: EncodedText,
    width: f64,
    ascent: f64,
}

#[derive(Debug, Default)]
struct Line {
    pieces: Vec<Piece>,
    width: f64,
    trailing_space: f64,
}

/// Lay out all blocks onto pages. There is always at least one page.
pub fn layout(blocks: &[Block], geometry: PageGeometry, fonts: &mut FontResolver<'_>) -> Result<Vec<Page>> {
    let mut paginator = Paginator {
        geometry,
        pages: vec![Page::default()],
        cursor: geometry.top(),
    };

    for (index, block) in blocks.iter().enumerate() {
        if block.break_before {
            paginator.break_page();
        }

        match &block.content {
            BlockContent::Text(runs) => {
                let lines = break_lines(runs, block, geometry.content_width(), fonts)?;
                for line in lines {
                    paginator.place_line(index, block, line);
                }
            }
            BlockContent::Figure(figure) => {
                paginator.ensure_space(figure.height);
                let x = match effective_align(block) {
                    TextAlign::Right => geometry.margin + geometry.content_width() - figure.width,
                    TextAlign::Center => geometry.margin + (geometry.content_width() - figure.width) / 2.0,
                    _ => geometry.margin,
                };
                let y = paginator.cursor - figure.height;
                paginator.push(PageItem::Figure { block: index, x, y });
                paginator.cursor = y;
            }
        }
        paginator.cursor -= block.font_size * BLOCK_SPACING;
    }

    tracing::debug!(pages = paginator.pages.len(), blocks = blocks.len(), "layout complete");
    Ok(paginator.pages)
}

struct Paginator {
    geometry: PageGeometry,
    pages: Vec<Page>,
    cursor: f64,
}

impl Paginator {
    fn current_is_empty(&self) -> bool {
        self.pages.last().map_or(true, |page| page.items.is_empty())
    }

    /// Start a new page unless the current one is still empty
    fn break_page(&mut self) {
        if !self.current_is_empty() {
            self.pages.push(Page::default());
        }
        self.cursor = self.geometry.top();
    }

    fn ensure_space(&mut self, height: f64) {
        if self.cursor - height < self.geometry.bottom() && !self.current_is_empty() {
            self.break_page();
        }
    }

    fn push(&mut self, item: PageItem) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn place_line(&mut self, index: usize, block: &Block, line: Line) {
        let max_size = line
            .pieces
            .iter()
            .map(|p| p.size)
            .fold(block.font_size, f64::max);
        let height = max_size * LINE_HEIGHT;
        let ascent = line
            .pieces
            .iter()
            .map(|p| p.ascent)
            .fold(0.0, f64::max)
            .max(max_size * 0.75);

        self.ensure_space(height);
        let baseline = self.cursor - ascent - (height - max_size) / 2.0;
        self.cursor -= height;

        if line.pieces.is_empty() {
            return;
        }

        let available = self.geometry.content_width();
        let visible = line.width - line.trailing_space;
        let mut x = self.geometry.margin
            + match effective_align(block) {
                TextAlign::Right => available - visible,
                TextAlign::Center => (available - visible) / 2.0,
                _ => 0.0,
            };

        let mut pieces = line.pieces;
        if block.direction == TextDirection::Rtl {
            pieces.reverse();
        }

        let mut spans = Vec::with_capacity(pieces.len());
        for piece in pieces {
            spans.push(PlacedText {
                x,
                baseline,
                font: piece.font,
                size: piece.size,
                color: piece.color,
                encoded: piece.encoded,
            });
            x += piece.width;
        }
        self.push(PageItem::Line { block: index, spans });
    }
}

fn effective_align(block: &Block) -> TextAlign {
    match (block.align, block.direction) {
        (TextAlign::Start | TextAlign::Justify, TextDirection::Rtl) => TextAlign::Right,
        (TextAlign::Start | TextAlign::Justify, TextDirection::Ltr) => TextAlign::Left,
        (align, _) => align,
    }
}

/// Whether a run of text should be shaped right to left
fn is_rtl_text(text: &str) -> bool {
    // First strong character decides; text without one counts as LTR
    matches!(unicode_bidi::get_base_direction(text), unicode_bidi::Direction::Rtl)
}

/// A break-delimited segment split at run boundaries
struct Segment {
    parts: Vec<(usize, String)>,
    mandatory: bool,
}

fn segments(runs: &[TextRun]) -> Vec<Segment> {
    let mut text = String::new();
    let mut bounds = Vec::with_capacity(runs.len());
    for run in runs {
        let start = text.len();
        text.push_str(&run.text);
        bounds.push((start, text.len()));
    }

    let mut result = Vec::new();
    let mut previous = 0;
    for (position, opportunity) in linebreaks(&text) {
        let mut parts = Vec::new();
        for (run, (start, end)) in bounds.iter().enumerate() {
            let from = previous.max(*start);
            let to = position.min(*end);
            if from < to {
                parts.push((run, text[from..to].to_string()));
            }
        }
        result.push(Segment {
            parts,
            mandatory: opportunity == BreakOpportunity::Mandatory && position < text.len(),
        });
        previous = position;
    }
    result
}

fn break_lines(
    runs: &[TextRun],
    block: &Block,
    available: f64,
    fonts: &mut FontResolver<'_>,
) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    for segment in segments(runs) {
        let mut pieces = Vec::with_capacity(segment.parts.len());
        let mut width = 0.0;
        let mut trailing_space = 0.0;
        let only_space = segment
            .parts
            .iter()
            .all(|(_, text)| text.chars().all(|c| c == ' ' || c == '\n' || c == '\r'));

        if !(only_space && line.pieces.is_empty()) {
            for (run_index, raw) in &segment.parts {
                let text = raw.trim_end_matches(['\n', '\r']);
                if text.is_empty() {
                    continue;
                }
                let style = &runs[*run_index].style;
                let font = fonts.resolve(&style.font_families, style.bold, style.italic)?;
                let shaped = fonts.shape(font, text, style.font_size, is_rtl_text(text));

                let content = text.trim_end_matches(' ');
                trailing_space = if content.len() < text.len() {
                    fonts
                        .shape(font, &text[content.len()..], style.font_size, false)
                        .width
                } else {
                    0.0
                };

                width += shaped.width;
                pieces.push(Piece {
                    font,
                    size: style.font_size,
                    color: style.color,
                    encoded: shaped.encoded,
                    width: shaped.width,
                    ascent: style.font_size * fonts.ascent_ratio(font),
                });
            }
        }

        if !line.pieces.is_empty() && line.width + width - trailing_space > available {
            lines.push(std::mem::take(&mut line));
            if only_space {
                pieces.clear();
                width = 0.0;
                trailing_space = 0.0;
            }
        }

        if !pieces.is_empty() {
            line.pieces.extend(pieces);
            line.width += width;
            line.trailing_space = trailing_space;
        }

        if segment.mandatory {
            lines.push(std::mem::take(&mut line));
        }
    }

    if !line.pieces.is_empty() {
        lines.push(line);
    }
    if block.direction == TextDirection::Rtl {
        tracing::debug!(lines = lines.len(), "laid out right-to-left block");
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockRole;
    use crate::style::ComputedStyle;

    fn block(text: &str, break_before: bool) -> Block {
        Block {
            role: BlockRole::Paragraph,
            content: BlockContent::Text(vec![TextRun {
                text: text.to_string(),
                style: ComputedStyle {
                    font_families: vec!["courier".to_string()],
                    ..ComputedStyle::root(TextDirection::Ltr, 10.0)
                },
            }]),
            align: TextAlign::Start,
            direction: TextDirection::Ltr,
            font_size: 10.0,
            break_before,
        }
    }

    fn geometry() -> PageGeometry {
        PageGeometry {
            size: PageSize::Custom { width: 200.0, height: 200.0 },
            margin: 20.0,
        }
    }

    fn line_count(page: &Page) -> usize {
        page.items
            .iter()
            .filter(|item| matches!(item, PageItem::Line { .. }))
            .count()
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let mut fonts = FontResolver::new();
        let pages = layout(&[], geometry(), &mut fonts).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
    }

    #[test]
    fn test_long_text_wraps() {
        // Courier at 10pt is 6pt per character; 160pt holds 26 characters
        let mut fonts = FontResolver::new();
        let text = "aaaa bbbb cccc dddd eeee ffff gggg hhhh";
        let pages = layout(&[block(text, false)], geometry(), &mut fonts).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(line_count(&pages[0]), 2);
    }

    #[test]
    fn test_overflow_creates_pages() {
        // 160pt of usable height at 12pt per line plus spacing
        let mut fonts = FontResolver::new();
        let blocks: Vec<Block> = (0..30).map(|i| block(&format!("line {}", i), false)).collect();
        let pages = layout(&blocks, geometry(), &mut fonts).unwrap();
        assert!(pages.len() >= 3);
        let total: usize = pages.iter().map(line_count).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_forced_breaks() {
        let mut fonts = FontResolver::new();
        let blocks = vec![block("one", true), block("two", true), block("three", false)];
        let pages = layout(&blocks, geometry(), &mut fonts).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].items[0].block(), 1);
    }

    #[test]
    fn test_mandatory_breaks() {
        let mut fonts = FontResolver::new();
        let pages = layout(&[block("one\ntwo\nthree", false)], geometry(), &mut fonts).unwrap();
        assert_eq!(line_count(&pages[0]), 3);
    }

    #[test]
    fn test_right_aligned_rtl_block() {
        let mut fonts = FontResolver::new();
        let mut rtl = block("abc", false);
        rtl.direction = TextDirection::Rtl;
        let pages = layout(&[rtl], geometry(), &mut fonts).unwrap();
        let PageItem::Line { spans, .. } = &pages[0].items[0] else {
            panic!("expected a line");
        };
        // 3 characters of 6pt, flush with the right margin at 180
        assert!((spans[0].x - 162.0).abs() < 1e-9);
    }

    #[test]
    fn test_rtl_detection() {
        assert!(is_rtl_text("\u{05e9}\u{05dc}\u{05d5}\u{05dd}"));
        assert!(!is_rtl_text("hello"));
        assert!(!is_rtl_text("123"));
    }
}
