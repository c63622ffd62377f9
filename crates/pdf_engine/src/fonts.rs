//! Font registration and resolution
//!
//! Callers register TrueType fonts under a CSS family name with a deferred
//! byte source. Nothing is read or parsed until layout first asks for the
//! family, at which point the bytes are loaded and embedded. Families with no
//! registration fall back to the standard 14 PDF fonts, which are referenced
//! by name and never embedded.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::objects::{PdfDictionary, PdfObject};
use crate::truetype::{ShapedGlyph, TrueTypeFont};

/// Standard 14 PDF fonts (built into every PDF viewer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// Get the PDF name for this font
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Try to match a CSS family name to a standard font
    pub fn from_name(name: &str, bold: bool, italic: bool) -> Option<Self> {
        let name_lower = name.to_lowercase();

        if name_lower.contains("courier") || name_lower.contains("mono") {
            return Some(match (bold, italic) {
                (false, false) => StandardFont::Courier,
                (true, false) => StandardFont::CourierBold,
                (false, true) => StandardFont::CourierOblique,
                (true, true) => StandardFont::CourierBoldOblique,
            });
        }

        if name_lower.contains("helvetica")
            || name_lower.contains("arial")
            || name_lower.contains("sans")
        {
            return Some(Self::default_fallback(bold, italic));
        }

        if name_lower.contains("times") || name_lower.contains("serif") {
            return Some(match (bold, italic) {
                (false, false) => StandardFont::TimesRoman,
                (true, false) => StandardFont::TimesBold,
                (false, true) => StandardFont::TimesItalic,
                (true, true) => StandardFont::TimesBoldItalic,
            });
        }

        None
    }

    pub fn default_fallback(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => StandardFont::Helvetica,
            (true, false) => StandardFont::HelveticaBold,
            (false, true) => StandardFont::HelveticaOblique,
            (true, true) => StandardFont::HelveticaBoldOblique,
        }
    }

    /// Average glyph width as a fraction of the font size
    fn average_width(&self) -> f64 {
        match self {
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => 0.6,
            StandardFont::Helvetica | StandardFont::HelveticaOblique => 0.5,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => 0.52,
            StandardFont::TimesRoman | StandardFont::TimesItalic => 0.45,
            StandardFont::TimesBold | StandardFont::TimesBoldItalic => 0.48,
        }
    }

    /// Ascender as a fraction of the font size
    pub fn ascent_ratio(&self) -> f64 {
        match self {
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => 0.629,
            StandardFont::TimesRoman
            | StandardFont::TimesBold
            | StandardFont::TimesItalic
            | StandardFont::TimesBoldItalic => 0.683,
            _ => 0.718,
        }
    }

    /// Font dictionary referencing the built-in font
    pub fn font_dictionary(&self) -> PdfDictionary {
        PdfDictionary::typed("Font")
            .with("Subtype", PdfObject::name("Type1"))
            .with("BaseFont", PdfObject::name(self.pdf_name()))
            .with("Encoding", PdfObject::name("WinAnsiEncoding"))
    }
}

/// Estimate the width of a string in a standard font
pub fn estimate_text_width(text: &str, font: StandardFont, font_size: f64) -> f64 {
    text.chars().count() as f64 * font.average_width() * font_size
}

/// Encode text for a WinAnsiEncoding simple font; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            c if (c as u32) < 0x80 || ((c as u32) >= 0xA0 && (c as u32) <= 0xFF) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Deferred access to font bytes
pub struct FontSource<'a> {
    load: Box<dyn Fn() -> Cow<'a, [u8]> + 'a>,
}

impl<'a> FontSource<'a> {
    /// Borrow bytes the caller already holds
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            load: Box::new(move || Cow::Borrowed(bytes)),
        }
    }

    /// Produce the bytes on first use
    pub fn lazy(load: impl Fn() -> Vec<u8> + 'a) -> Self {
        Self {
            load: Box::new(move || Cow::Owned(load())),
        }
    }

    pub fn load(&self) -> Cow<'a, [u8]> {
        (self.load)()
    }
}

impl fmt::Debug for FontSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FontSource")
    }
}

/// CSS `font-style` of a registered face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// A font the layout can draw with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontHandle {
    /// Index into the resolver's embedded fonts
    Embedded(usize),
    Standard(StandardFont),
}

/// Text encoded for one font
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedText {
    /// Two-byte glyph ids (Identity-H)
    Glyphs(Vec<u16>),
    /// WinAnsi bytes
    Bytes(Vec<u8>),
}

/// Text mapped to a font, ready to draw
#[derive(Debug, Clone)]
pub struct ShapedRun {
    pub font: FontHandle,
    pub encoded: EncodedText,
    pub width: f64,
}

#[derive(Debug)]
struct Registration<'a> {
    family: String,
    weight: u16,
    style: FontStyle,
    source: FontSource<'a>,
    loaded: Option<usize>,
}

/// Registered fonts plus the fonts that layout actually used
#[derive(Debug, Default)]
pub struct FontResolver<'a> {
    registrations: Vec<Registration<'a>>,
    embedded: Vec<TrueTypeFont>,
    used: Vec<FontHandle>,
    resolved: HashMap<(String, bool, bool), FontHandle>,
    fast_mode: bool,
    prefer_embedded: bool,
}

impl<'a> FontResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure with cmap lookups instead of shaping
    pub fn set_fast_mode(&mut self, fast: bool) {
        self.fast_mode = fast;
    }

    /// Fall back to a registered font rather than a non-embedded standard font
    pub fn set_prefer_embedded(&mut self, prefer: bool) {
        self.prefer_embedded = prefer;
    }

    /// Register a font under a CSS family name.
    ///
    /// `weight` defaults to 400 and `style` to normal. Fonts are always
    /// embedded whole; `subset` is accepted for API compatibility.
    pub fn add_font(
        &mut self,
        source: FontSource<'a>,
        family: &str,
        weight: Option<u16>,
        style: Option<FontStyle>,
        subset: bool,
    ) {
        if subset {
            tracing::debug!(family, "font subsetting requested, embedding the whole font");
        }
        self.registrations.push(Registration {
            family: family.to_string(),
            weight: weight.unwrap_or(400),
            style: style.unwrap_or_default(),
            source,
            loaded: None,
        });
    }

    pub fn is_registered(&self, family: &str) -> bool {
        let wanted = normalize_family(family);
        self.registrations
            .iter()
            .any(|r| normalize_family(&r.family) == wanted)
    }

    /// Pick a font for a CSS `font-family` list
    pub fn resolve(&mut self, families: &[String], bold: bool, italic: bool) -> Result<FontHandle> {
        let key = (families.join(","), bold, italic);
        if let Some(handle) = self.resolved.get(&key) {
            return Ok(*handle);
        }

        let handle = self.find_handle(families, bold, italic)?;
        self.resolved.insert(key, handle);
        Ok(handle)
    }

    fn find_handle(&mut self, families: &[String], bold: bool, italic: bool) -> Result<FontHandle> {
        for family in families {
            if let Some(index) = self.best_registration(family, bold, italic) {
                return self.load(index).map(FontHandle::Embedded);
            }
        }

        if self.prefer_embedded && !self.registrations.is_empty() {
            let index = self
                .best_registration(&self.registrations[0].family.clone(), bold, italic)
                .unwrap_or(0);
            tracing::debug!(
                ?families,
                family = %self.registrations[index].family,
                "no registered font for font-family, using first registered font"
            );
            return self.load(index).map(FontHandle::Embedded);
        }

        let standard = families
            .iter()
            .find_map(|family| StandardFont::from_name(family, bold, italic))
            .unwrap_or_else(|| StandardFont::default_fallback(bold, italic));
        tracing::warn!(
            ?families,
            font = standard.pdf_name(),
            "no registered font for font-family, falling back to standard font"
        );
        Ok(FontHandle::Standard(standard))
    }

    fn best_registration(&self, family: &str, bold: bool, italic: bool) -> Option<usize> {
        let wanted = normalize_family(family);
        let wanted_weight: i32 = if bold { 700 } else { 400 };

        self.registrations
            .iter()
            .enumerate()
            .filter(|(_, r)| normalize_family(&r.family) == wanted)
            .min_by_key(|(_, r)| {
                let style_penalty = match (italic, r.style) {
                    (true, FontStyle::Normal) | (false, FontStyle::Italic | FontStyle::Oblique) => 1000,
                    _ => 0,
                };
                (r.weight as i32 - wanted_weight).abs() + style_penalty
            })
            .map(|(index, _)| index)
    }

    fn load(&mut self, index: usize) -> Result<usize> {
        if let Some(loaded) = self.registrations[index].loaded {
            return Ok(loaded);
        }

        let registration = &self.registrations[index];
        let bytes = registration.source.load().into_owned();
        tracing::debug!(family = %registration.family, bytes = bytes.len(), "loading font");
        let font = TrueTypeFont::parse(&registration.family, bytes)?;

        self.embedded.push(font);
        let loaded = self.embedded.len() - 1;
        self.registrations[index].loaded = Some(loaded);
        Ok(loaded)
    }

    /// Map text to the given font and measure it at `size`
    pub fn shape(&mut self, font: FontHandle, text: &str, size: f64, rtl: bool) -> ShapedRun {
        if !self.used.contains(&font) {
            self.used.push(font);
        }

        match font {
            FontHandle::Embedded(index) => {
                let fast = self.fast_mode;
                let embedded = &mut self.embedded[index];
                let glyphs: Vec<ShapedGlyph> = embedded.shape(text, rtl, fast);
                let width = embedded.width_of(&glyphs, size);
                ShapedRun {
                    font,
                    encoded: EncodedText::Glyphs(glyphs.iter().map(|g| g.glyph_id).collect()),
                    width,
                }
            }
            FontHandle::Standard(standard) => ShapedRun {
                font,
                encoded: EncodedText::Bytes(encode_win_ansi(text)),
                width: estimate_text_width(text, standard, size),
            },
        }
    }

    /// Ascender as a fraction of the font size
    pub fn ascent_ratio(&self, font: FontHandle) -> f64 {
        match font {
            FontHandle::Embedded(index) => self.embedded[index].ascent_ratio(),
            FontHandle::Standard(standard) => standard.ascent_ratio(),
        }
    }

    /// Fonts drawn with, in first-use order
    pub fn used_fonts(&self) -> &[FontHandle] {
        &self.used
    }

    /// Page resource name of a used font (`F1`, `F2`, ...)
    pub fn resource_name(&self, font: FontHandle) -> String {
        let position = self.used.iter().position(|f| *f == font).unwrap_or(0);
        format!("F{}", position + 1)
    }

    pub fn embedded_font(&self, index: usize) -> Option<&TrueTypeFont> {
        self.embedded.get(index)
    }
}

fn normalize_family(family: &str) -> String {
    family
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}
