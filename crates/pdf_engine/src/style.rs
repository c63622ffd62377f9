//! CSS-lite styling
//!
//! A deliberately small cascade: `<style>` rules with type, class, id and
//! compound selectors (optionally joined by descendant combinators), ordered
//! by specificity and source order, followed by the inline `style`
//! attribute. Text properties inherit from the parent element.

use serde::{Deserialize, Serialize};

use crate::document::PageSize;
use crate::html::Element;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Left for LTR text, right for RTL text
    #[default]
    Start,
    Left,
    Right,
    Center,
    Justify,
}

/// Base text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// How an element takes part in layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    ListItem,
    None,
}

/// RGB colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parse a CSS colour: `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a basic name
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_string(),
                _ => return None,
            };
            let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
            return Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?));
        }
        if let Some(args) = value.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
            let parts: Vec<u8> = args
                .split(',')
                .filter_map(|p| p.trim().parse::<f64>().ok())
                .map(|v| v.clamp(0.0, 255.0) as u8)
                .collect();
            if let [r, g, b] = parts[..] {
                return Some(Self::from_rgb8(r, g, b));
            }
            return None;
        }
        let (r, g, b) = match value.as_str() {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "blue" => (0, 0, 255),
            "gray" | "grey" => (128, 128, 128),
            "silver" => (192, 192, 192),
            "maroon" => (128, 0, 0),
            "navy" => (0, 0, 128),
            "purple" => (128, 0, 128),
            "teal" => (0, 128, 128),
            "orange" => (255, 165, 0),
            "yellow" => (255, 255, 0),
            _ => return None,
        };
        Some(Self::from_rgb8(r, g, b))
    }
}

/// Resolved style of one element
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub font_families: Vec<String>,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    pub text_align: TextAlign,
    pub direction: TextDirection,
    pub display: Display,
    pub white_space_pre: bool,
    pub break_before: bool,
    pub break_after: bool,
}

impl ComputedStyle {
    /// Style of the root element
    pub fn root(direction: TextDirection, font_size: f64) -> Self {
        Self {
            font_families: vec!["serif".to_string()],
            font_size,
            bold: false,
            italic: false,
            color: Color::BLACK,
            text_align: TextAlign::Start,
            direction,
            display: Display::Block,
            white_space_pre: false,
            break_before: false,
            break_after: false,
        }
    }

    /// Start from the inherited properties of `parent`, apply the element's
    /// defaults, then the matching rules and the inline style.
    pub fn compute(
        element: &Element,
        ancestors: &[&Element],
        parent: &ComputedStyle,
        stylesheet: &Stylesheet,
    ) -> Self {
        let mut style = Self {
            display: default_display(&element.name),
            break_before: false,
            break_after: false,
            ..parent.clone()
        };
        style.apply_element_defaults(element);

        for declaration in stylesheet.matching_declarations(element, ancestors) {
            style.apply(declaration, parent);
        }
        if let Some(inline) = element.attr("style") {
            for declaration in parse_declarations(inline) {
                style.apply(&declaration, parent);
            }
        }
        style
    }

    fn apply_element_defaults(&mut self, element: &Element) {
        let heading_scale = match element.name.as_str() {
            "h1" => Some(2.0),
            "h2" => Some(1.5),
            "h3" => Some(1.17),
            "h4" => Some(1.0),
            "h5" => Some(0.83),
            "h6" => Some(0.67),
            _ => None,
        };
        if let Some(scale) = heading_scale {
            self.font_size *= scale;
            self.bold = true;
        }

        match element.name.as_str() {
            "b" | "strong" | "th" => self.bold = true,
            "i" | "em" | "cite" | "var" => self.italic = true,
            "small" => self.font_size *= 0.83,
            "code" | "kbd" | "samp" | "tt" => {
                self.font_families = vec!["monospace".to_string()];
            }
            "pre" => {
                self.font_families = vec!["monospace".to_string()];
                self.white_space_pre = true;
            }
            _ => {}
        }

        match element.attr("dir") {
            Some("rtl") => self.direction = TextDirection::Rtl,
            Some("ltr") => self.direction = TextDirection::Ltr,
            _ => {}
        }
    }

    fn apply(&mut self, declaration: &Declaration, parent: &ComputedStyle) {
        let value = declaration.value.as_str();
        match declaration.property.as_str() {
            "font-family" => {
                let families = parse_font_families(value);
                if !families.is_empty() {
                    self.font_families = families;
                }
            }
            "font-size" => {
                if let Some(size) = parse_font_size(value, parent.font_size) {
                    self.font_size = size;
                }
            }
            "font-weight" => {
                self.bold = match value {
                    "bold" | "bolder" => true,
                    "normal" | "lighter" => false,
                    other => other.parse::<u16>().map(|w| w >= 600).unwrap_or(self.bold),
                }
            }
            "font-style" => self.italic = matches!(value, "italic" | "oblique"),
            "color" => {
                if let Some(color) = Color::parse(value) {
                    self.color = color;
                }
            }
            "text-align" => {
                self.text_align = match value {
                    "left" => TextAlign::Left,
                    "right" => TextAlign::Right,
                    "center" => TextAlign::Center,
                    "justify" => TextAlign::Justify,
                    _ => TextAlign::Start,
                }
            }
            "direction" => match value {
                "rtl" => self.direction = TextDirection::Rtl,
                "ltr" => self.direction = TextDirection::Ltr,
                _ => {}
            },
            "display" => {
                self.display = match value {
                    "none" => Display::None,
                    "inline" | "inline-block" => Display::Inline,
                    "list-item" => Display::ListItem,
                    _ => Display::Block,
                }
            }
            "white-space" => self.white_space_pre = matches!(value, "pre" | "pre-wrap"),
            "page-break-before" | "break-before" => {
                self.break_before = matches!(value, "always" | "page" | "left" | "right")
            }
            "page-break-after" | "break-after" => {
                self.break_after = matches!(value, "always" | "page" | "left" | "right")
            }
            _ => {}
        }
    }
}

fn default_display(name: &str) -> Display {
    match name {
        "head" | "style" | "script" | "title" | "meta" | "link" | "template" => Display::None,
        "li" => Display::ListItem,
        "html" | "body" | "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol"
        | "section" | "article" | "header" | "footer" | "nav" | "main" | "aside"
        | "blockquote" | "pre" | "address" | "figure" | "figcaption" | "table" | "thead"
        | "tbody" | "tfoot" | "tr" | "dl" | "dt" | "dd" | "form" | "fieldset" | "hr"
        | "svg" | "caption" => Display::Block,
        _ => Display::Inline,
    }
}

/// Split a `font-family` value into unquoted family names
pub fn parse_font_families(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|family| {
            family
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string()
        })
        .filter(|family| !family.is_empty())
        .collect()
}

/// Parse a `font-size` value relative to the parent size, in points
pub fn parse_font_size(value: &str, parent: f64) -> Option<f64> {
    let value = value.trim();
    let keyword = match value {
        "xx-small" => Some(7.0),
        "x-small" => Some(7.5),
        "small" => Some(10.0),
        "medium" => Some(12.0),
        "large" => Some(13.5),
        "x-large" => Some(18.0),
        "xx-large" => Some(24.0),
        "smaller" => Some(parent * 0.83),
        "larger" => Some(parent * 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }

    parse_length(value, parent).filter(|size| *size > 0.0)
}

/// Parse a CSS length into points; `em` and `%` are relative to `reference`
pub fn parse_length(value: &str, reference: f64) -> Option<f64> {
    let value = value.trim();
    let units: [(&str, f64); 7] = [
        ("pt", 1.0),
        ("px", 0.75),
        ("mm", 72.0 / 25.4),
        ("cm", 72.0 / 2.54),
        ("in", 72.0),
        ("em", reference),
        ("%", reference / 100.0),
    ];
    for (suffix, factor) in units {
        if let Some(number) = value.strip_suffix(suffix) {
            return number.trim().parse::<f64>().ok().map(|n| n * factor);
        }
    }
    // Unitless zero
    value.parse::<f64>().ok().filter(|n| *n == 0.0)
}

/// A single `property: value` pair with lower-cased property name
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// Parse the body of a rule or an inline `style` attribute
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    block
        .split(';')
        .filter_map(|part| {
            let (property, value) = part.split_once(':')?;
            let property = property.trim().to_lowercase();
            let value = value.trim().trim_end_matches("!important").trim().to_string();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some(Declaration { property, value })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(text: &str) -> Option<Self> {
        let mut compound = Compound::default();
        let mut rest = text;

        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && tag != "*" {
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
            compound.tag = Some(tag.to_lowercase());
        }
        rest = &rest[tag_end..];

        while !rest.is_empty() {
            let marker = rest.as_bytes()[0];
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                b'.' => compound.classes.push(name.to_string()),
                _ => compound.id = Some(name.to_string()),
            }
            rest = &body[end..];
        }
        Some(compound)
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.name {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| element.classes().any(|c| c == class))
    }

    fn specificity(&self) -> u32 {
        self.id.iter().count() as u32 * 100
            + self.classes.len() as u32 * 10
            + self.tag.iter().count() as u32
    }
}

/// Descendant selector: compounds from outermost to the subject
#[derive(Debug, Clone, PartialEq)]
struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    fn parse(text: &str) -> Option<Self> {
        let compounds = text
            .split_whitespace()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()?;
        if compounds.is_empty() {
            return None;
        }
        Some(Self { compounds })
    }

    fn matches(&self, element: &Element, ancestors: &[&Element]) -> bool {
        let Some((subject, outer)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }

        // Match the remaining compounds against ancestors, innermost first
        let mut remaining = outer.iter().rev().peekable();
        for ancestor in ancestors.iter().rev() {
            match remaining.peek() {
                Some(compound) if compound.matches(ancestor) => {
                    remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        remaining.peek().is_none()
    }

    fn specificity(&self) -> u32 {
        self.compounds.iter().map(Compound::specificity).sum()
    }
}

#[derive(Debug, Clone)]
struct Rule {
    selector: Selector,
    specificity: u32,
    order: usize,
    declarations: Vec<Declaration>,
}

/// `@page` settings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageRule {
    pub size: Option<PageSize>,
    pub margin: Option<f64>,
}

/// Parsed style rules of a document
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
    pub page: PageRule,
}

impl Stylesheet {
    /// Parse CSS text. Unsupported selectors and at-rules are skipped.
    pub fn parse(css: &str) -> Self {
        let mut sheet = Stylesheet::default();
        sheet.add(css);
        sheet
    }

    /// Append the rules of another `<style>` block
    pub fn add(&mut self, css: &str) {
        let css = strip_comments(css);
        let mut rest = css.as_str();

        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].trim();
            let Some(close) = find_block_end(&rest[open..]) else {
                break;
            };
            let body = &rest[open + 1..open + close];
            rest = &rest[open + close + 1..];

            if let Some(at_rule) = prelude.strip_prefix('@') {
                if at_rule.trim_start().starts_with("page") {
                    self.apply_page_rule(body);
                } else {
                    tracing::debug!(rule = prelude, "skipping unsupported at-rule");
                }
                continue;
            }

            let declarations = parse_declarations(body);
            for selector_text in prelude.split(',') {
                match Selector::parse(selector_text.trim()) {
                    Some(selector) => {
                        let order = self.rules.len();
                        self.rules.push(Rule {
                            specificity: selector.specificity(),
                            selector,
                            order,
                            declarations: declarations.clone(),
                        });
                    }
                    None => tracing::debug!(selector = selector_text.trim(), "skipping unsupported selector"),
                }
            }
        }
    }

    fn apply_page_rule(&mut self, body: &str) {
        for declaration in parse_declarations(body) {
            match declaration.property.as_str() {
                "size" => {
                    let value = declaration.value.to_lowercase();
                    if value.starts_with("a4") {
                        self.page.size = Some(PageSize::A4);
                    } else if value.starts_with("letter") {
                        self.page.size = Some(PageSize::Letter);
                    } else {
                        let lengths: Vec<f64> = value
                            .split_whitespace()
                            .filter_map(|v| parse_length(v, 12.0))
                            .collect();
                        if let [width, height] = lengths[..] {
                            self.page.size = Some(PageSize::Custom { width, height });
                        }
                    }
                }
                "margin" => {
                    let first = declaration.value.split_whitespace().next().unwrap_or("");
                    self.page.margin = parse_length(first, 12.0);
                }
                _ => {}
            }
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Declarations of all matching rules in cascade order
    pub fn matching_declarations<'s>(
        &'s self,
        element: &Element,
        ancestors: &[&Element],
    ) -> Vec<&'s Declaration> {
        let mut matching: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(element, ancestors))
            .collect();
        matching.sort_by_key(|rule| (rule.specificity, rule.order));
        matching
            .into_iter()
            .flat_map(|rule| rule.declarations.iter())
            .collect()
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Offset of the `}` closing the block that starts at `text[0] == '{'`
fn find_block_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
