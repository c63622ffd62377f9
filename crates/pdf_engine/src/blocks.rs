//! Block construction
//!
//! Walks the styled DOM and flattens it into a sequence of blocks, each one a
//! paragraph-like run of styled text or a figure. Block-level elements nested
//! inside each other are split so text before, inside and after a child block
//! ends up in separate blocks. Forced page breaks are attached to the next
//! block that is produced.

use crate::document::DocumentInfo;
use crate::html::{Element, Node};
use crate::style::{ComputedStyle, Display, Stylesheet, TextAlign, TextDirection};
use crate::svg::{SvgFigure, SvgHandling};

/// Logical role of a block in the structure tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    Paragraph,
    Heading(u8),
    Figure,
}

impl BlockRole {
    /// Standard structure type name
    pub fn structure_type(&self) -> String {
        match self {
            BlockRole::Paragraph => "P".to_string(),
            BlockRole::Heading(level) => format!("H{}", level),
            BlockRole::Figure => "Figure".to_string(),
        }
    }
}

/// A piece of text with one style
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: ComputedStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(Vec<TextRun>),
    Figure(SvgFigure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub role: BlockRole,
    pub content: BlockContent,
    pub align: TextAlign,
    pub direction: TextDirection,
    /// Font size of the block element, used for spacing and empty lines
    pub font_size: f64,
    pub break_before: bool,
}

impl Block {
    /// Alternate text for figures
    pub fn alt(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Figure(figure) => Some(&figure.alt),
            BlockContent::Text(_) => None,
        }
    }
}

/// Blocks plus document-level data found while walking the tree
#[derive(Debug, Clone, Default)]
pub struct BlockDocument {
    pub blocks: Vec<Block>,
    pub info: DocumentInfo,
    pub stylesheet: Stylesheet,
}

/// Style the document and flatten it into blocks
pub fn build_blocks(
    root: &Element,
    direction: TextDirection,
    font_size: f64,
    svg: SvgHandling,
) -> BlockDocument {
    let mut stylesheet = Stylesheet::default();
    collect_styles(root, &mut stylesheet);

    let info = document_info(root);
    let root_style = ComputedStyle::root(direction, font_size);

    let mut builder = BlockBuilder {
        stylesheet: &stylesheet,
        svg,
        blocks: Vec::new(),
        runs: Vec::new(),
        contexts: vec![(BlockRole::Paragraph, root_style.clone())],
        lists: Vec::new(),
        pending_break: false,
    };
    let mut ancestors = Vec::new();
    builder.walk(root, &mut ancestors, &root_style);
    builder.flush();

    tracing::debug!(
        blocks = builder.blocks.len(),
        rules = stylesheet.rule_count(),
        "built document blocks"
    );

    BlockDocument {
        blocks: builder.blocks,
        info,
        stylesheet,
    }
}

fn collect_styles(element: &Element, stylesheet: &mut Stylesheet) {
    for child in element.elements() {
        if child.name == "style" {
            stylesheet.add(&child.text_content());
        } else {
            collect_styles(child, stylesheet);
        }
    }
}

fn document_info(root: &Element) -> DocumentInfo {
    let mut info = DocumentInfo {
        title: root
            .find("title")
            .map(|title| collapse_whitespace(&title.text_content()).trim().to_string())
            .filter(|title| !title.is_empty()),
        language: root
            .attr("lang")
            .or_else(|| root.attr("xml:lang"))
            .map(str::to_string),
        ..Default::default()
    };

    if let Some(head) = root.find("head") {
        for meta in head.elements().filter(|e| e.name == "meta") {
            let (Some(name), Some(content)) = (meta.attr("name"), meta.attr("content")) else {
                continue;
            };
            match name.to_lowercase().as_str() {
                "author" => info.author = Some(content.to_string()),
                "description" | "subject" => info.subject = Some(content.to_string()),
                "keywords" => {
                    info.keywords = content
                        .split(',')
                        .map(|k| k.trim().to_string())
                        .filter(|k| !k.is_empty())
                        .collect()
                }
                _ => {}
            }
        }
    }
    info
}

struct BlockBuilder<'s> {
    stylesheet: &'s Stylesheet,
    svg: SvgHandling,
    blocks: Vec<Block>,
    runs: Vec<TextRun>,
    /// Role and style of each open block element, innermost last
    contexts: Vec<(BlockRole, ComputedStyle)>,
    /// Item counters of open lists; `None` for unordered lists
    lists: Vec<Option<usize>>,
    pending_break: bool,
}

impl<'s> BlockBuilder<'s> {
    fn walk<'d>(&mut self, element: &'d Element, ancestors: &mut Vec<&'d Element>, parent: &ComputedStyle) {
        let style = ComputedStyle::compute(element, ancestors, parent, self.stylesheet);
        if style.display == Display::None {
            return;
        }

        match element.name.as_str() {
            "br" => {
                self.push_run("\n".to_string(), &style);
                return;
            }
            "img" => {
                tracing::warn!(
                    src = element.attr("src").unwrap_or(""),
                    "images cannot be loaded, rendering alternate text"
                );
                if let Some(alt) = element.attr("alt").filter(|alt| !alt.trim().is_empty()) {
                    self.push_text(alt, &style);
                }
                return;
            }
            "svg" => {
                self.flush();
                match self.svg {
                    SvgHandling::Vector => {
                        let figure = SvgFigure::parse(element);
                        self.blocks.push(Block {
                            role: BlockRole::Figure,
                            content: BlockContent::Figure(figure),
                            align: style.text_align,
                            direction: style.direction,
                            font_size: style.font_size,
                            break_before: std::mem::take(&mut self.pending_break) || style.break_before,
                        });
                    }
                    SvgHandling::Skip => tracing::debug!("svg drawing disabled, skipping element"),
                }
                if style.break_after {
                    self.pending_break = true;
                }
                return;
            }
            _ => {}
        }

        let is_block = style.display != Display::Inline;
        if is_block {
            self.flush();
            if style.break_before {
                self.pending_break = true;
            }
            self.contexts.push((role_of(&element.name), style.clone()));
        }

        match element.name.as_str() {
            "ul" => self.lists.push(None),
            "ol" => self.lists.push(Some(0)),
            _ => {}
        }
        if style.display == Display::ListItem {
            let marker = match self.lists.last_mut() {
                Some(Some(counter)) => {
                    *counter += 1;
                    format!("{}. ", counter)
                }
                _ => "\u{2022} ".to_string(),
            };
            self.push_run(marker, &style);
        }

        ancestors.push(element);
        for child in &element.children {
            match child {
                Node::Text(text) => self.push_text(text, &style),
                Node::Element(child) => self.walk(child, ancestors, &style),
            }
        }
        ancestors.pop();

        if matches!(element.name.as_str(), "ul" | "ol") {
            self.lists.pop();
        }
        if is_block {
            self.flush();
            self.contexts.pop();
            if style.break_after {
                self.pending_break = true;
            }
        }
    }

    fn push_text(&mut self, text: &str, style: &ComputedStyle) {
        let text = if style.white_space_pre {
            text.to_string()
        } else {
            collapse_whitespace(text)
        };
        self.push_run(text, style);
    }

    fn push_run(&mut self, text: String, style: &ComputedStyle) {
        if text.is_empty() {
            return;
        }
        // Merge with the previous run when the style is unchanged
        if let Some(last) = self.runs.last_mut() {
            if last.style == *style {
                last.text.push_str(&text);
                return;
            }
        }
        self.runs.push(TextRun {
            text,
            style: style.clone(),
        });
    }

    fn flush(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        let has_content = runs
            .iter()
            .any(|run| run.text.chars().any(|c| !is_collapsible(c)));
        if !has_content {
            return;
        }

        let Some((role, style)) = self.contexts.last() else {
            return;
        };
        self.blocks.push(Block {
            role: *role,
            content: BlockContent::Text(runs),
            align: style.text_align,
            direction: style.direction,
            font_size: style.font_size,
            break_before: std::mem::take(&mut self.pending_break),
        });
    }
}

fn role_of(name: &str) -> BlockRole {
    match name.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => BlockRole::Heading(level - b'0'),
        _ => BlockRole::Paragraph,
    }
}

/// CSS white space; no-break space is deliberately excluded
fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_collapsible(c) {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_document;

    fn blocks(html: &str) -> BlockDocument {
        let root = parse_document(html).unwrap();
        build_blocks(&root, TextDirection::Ltr, 12.0, SvgHandling::Vector)
    }

    fn text_of(block: &Block) -> String {
        match &block.content {
            BlockContent::Text(runs) => runs.iter().map(|r| r.text.as_str()).collect(),
            BlockContent::Figure(_) => String::new(),
        }
    }

    #[test]
    fn test_nested_blocks_are_split() {
        let doc = blocks("<html><body><div>before<p>inside <b>bold</b></p>after</div></body></html>");
        let texts: Vec<String> = doc.blocks.iter().map(text_of).collect();
        assert_eq!(texts, vec!["before", "inside bold", "after"]);
    }

    #[test]
    fn test_heading_roles_and_document_info() {
        let doc = blocks(
            r#"<html lang="de"><head><title> My  Title </title><meta name="author" content="Ann"/></head>
<body><h2>Head</h2><p>Text</p></body></html>"#,
        );
        assert_eq!(doc.blocks[0].role, BlockRole::Heading(2));
        assert_eq!(doc.blocks[1].role, BlockRole::Paragraph);
        assert_eq!(doc.info.title.as_deref(), Some("My Title"));
        assert_eq!(doc.info.language.as_deref(), Some("de"));
        assert_eq!(doc.info.author.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_page_breaks_attach_to_next_block() {
        let doc = blocks(
            r#"<html><body><p>one</p><p style="page-break-after: always">two</p><p>three</p>
<div style="page-break-before: always"><p>four</p></div></body></html>"#,
        );
        let breaks: Vec<bool> = doc.blocks.iter().map(|b| b.break_before).collect();
        assert_eq!(breaks, vec![false, false, true, true]);
    }

    #[test]
    fn test_lists_get_markers() {
        let doc = blocks("<html><body><ol><li>a</li><li>b</li></ol><ul><li>c</li></ul></body></html>");
        let texts: Vec<String> = doc.blocks.iter().map(text_of).collect();
        assert_eq!(texts, vec!["1. a", "2. b", "\u{2022} c"]);
    }

    #[test]
    fn test_images_render_alt_text() {
        let doc = blocks(r#"<html><body><p>logo: <img src="logo.png" alt="ACME"/></p></body></html>"#);
        assert_eq!(text_of(&doc.blocks[0]), "logo: ACME");
    }

    #[test]
    fn test_svg_becomes_figure() {
        let doc = blocks(r#"<html><body><svg width="10" height="10"><rect width="5" height="5"/></svg></body></html>"#);
        assert_eq!(doc.blocks[0].role, BlockRole::Figure);
        assert_eq!(doc.blocks[0].alt(), Some("svg"));

        let root = parse_document(r#"<html><body><svg><rect width="5" height="5"/></svg></body></html>"#).unwrap();
        let skipped = build_blocks(&root, TextDirection::Ltr, 12.0, SvgHandling::Skip);
        assert!(skipped.blocks.is_empty());
    }

    #[test]
    fn test_head_and_style_are_not_rendered() {
        let doc = blocks(
            "<html><head><style>p { color: red }</style></head><body>\n  <p>x</p>\n</body></html>",
        );
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.stylesheet.rule_count(), 1);
    }
}
