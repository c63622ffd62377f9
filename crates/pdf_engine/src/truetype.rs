//! TrueType font embedding
//!
//! Registered fonts are embedded whole as a `Type0` composite font over a
//! `CIDFontType2` descendant with `Identity-H` encoding, so content streams
//! address glyphs directly by glyph id. Every glyph drawn is recorded together
//! with the text it came from; that record drives both the `/W` width array
//! and the ToUnicode CMap.

use rustybuzz::ttf_parser::{self, GlyphId};
use rustybuzz::{Direction, UnicodeBuffer};
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::objects::{PdfDictionary, PdfObject, PdfStream, PdfString};

/// A glyph positioned by the shaper, in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    pub advance: u16,
}

#[derive(Debug, Clone)]
struct GlyphUse {
    advance: u16,
    text: String,
}

/// A parsed TrueType font and the glyphs used from it so far
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    family: String,
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    italic: bool,
    used: BTreeMap<u16, GlyphUse>,
}

impl TrueTypeFont {
    pub fn parse(family: &str, data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|err| EngineError::InvalidFont {
            family: family.to_string(),
            reason: err.to_string(),
        })?;

        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string())
            .unwrap_or_else(|| family.to_string());

        let rect = face.global_bounding_box();
        let ascender = face.ascender();

        Ok(Self {
            family: family.to_string(),
            postscript_name: sanitize_font_name(&postscript_name),
            units_per_em: face.units_per_em(),
            ascender,
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or(ascender),
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            italic: face.is_italic(),
            used: BTreeMap::new(),
            data,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Ascender as a fraction of the font size
    pub fn ascent_ratio(&self) -> f64 {
        self.ascender as f64 / self.units_per_em as f64
    }

    /// Convert a run of glyph advances to points at `size`
    pub fn width_of(&self, glyphs: &[ShapedGlyph], size: f64) -> f64 {
        let units: u32 = glyphs.iter().map(|g| g.advance as u32).sum();
        units as f64 * size / self.units_per_em as f64
    }

    /// Map `text` to glyphs and record their use.
    ///
    /// Fast mode looks each character up in the cmap; otherwise the text is
    /// shaped with rustybuzz so ligatures and contextual forms apply. In both
    /// cases advances are the nominal `hmtx` widths, which keeps the drawn
    /// positions consistent with the `/W` array.
    pub fn shape(&mut self, text: &str, rtl: bool, fast: bool) -> Vec<ShapedGlyph> {
        let clusters = if fast {
            self.map_characters(text)
        } else {
            self.shape_clusters(text, rtl)
                .unwrap_or_else(|| self.map_characters(text))
        };

        let face = match ttf_parser::Face::parse(&self.data, 0) {
            Ok(face) => face,
            Err(_) => return Vec::new(),
        };

        let mut glyphs = Vec::with_capacity(clusters.len());
        for (glyph_id, source) in clusters {
            let advance = face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
            let entry = self.used.entry(glyph_id).or_insert_with(|| GlyphUse {
                advance,
                text: String::new(),
            });
            if entry.text.is_empty() && glyph_id != 0 {
                entry.text = source;
            }
            glyphs.push(ShapedGlyph { glyph_id, advance });
        }
        glyphs
    }

    fn map_characters(&self, text: &str) -> Vec<(u16, String)> {
        let face = match ttf_parser::Face::parse(&self.data, 0) {
            Ok(face) => face,
            Err(_) => return Vec::new(),
        };
        text.chars()
            .map(|c| {
                let glyph = face.glyph_index(c).map(|g| g.0).unwrap_or(0);
                (glyph, c.to_string())
            })
            .collect()
    }

    fn shape_clusters(&self, text: &str, rtl: bool) -> Option<Vec<(u16, String)>> {
        let face = rustybuzz::Face::from_slice(&self.data, 0)?;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        buffer.set_direction(if rtl {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        });

        let output = rustybuzz::shape(&face, &[], buffer);
        let infos = output.glyph_infos();

        let mut boundaries: Vec<usize> = infos.iter().map(|g| g.cluster as usize).collect();
        boundaries.sort_unstable();
        boundaries.dedup();
        boundaries.push(text.len());

        let mut seen = std::collections::BTreeSet::new();
        let mut clusters = Vec::with_capacity(infos.len());
        for info in infos {
            let start = (info.cluster as usize).min(text.len());
            let index = boundaries.partition_point(|&b| b <= start);
            let end = boundaries.get(index).copied().unwrap_or(text.len());
            // Only the first glyph of a cluster carries its text
            let source = if seen.insert(start) {
                text.get(start..end).unwrap_or_default().to_string()
            } else {
                String::new()
            };
            clusters.push((info.glyph_id as u16, source));
        }
        Some(clusters)
    }

    pub fn used_glyph_count(&self) -> usize {
        self.used.len()
    }

    fn to_pdf_units(&self, value: i64) -> i64 {
        value * 1000 / self.units_per_em as i64
    }

    /// The `/W` array: one `gid [width]` pair per used glyph
    fn widths(&self) -> PdfObject {
        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for (glyph_id, glyph) in &self.used {
            widths.push(PdfObject::Integer(*glyph_id as i64));
            widths.push(PdfObject::Array(vec![PdfObject::Integer(
                self.to_pdf_units(glyph.advance as i64),
            )]));
        }
        PdfObject::Array(widths)
    }

    /// ToUnicode CMap mapping every used glyph back to its source text
    pub fn to_unicode_cmap(&self) -> Vec<u8> {
        let mappings: Vec<(u16, &str)> = self
            .used
            .iter()
            .filter(|(_, glyph)| !glyph.text.is_empty())
            .map(|(glyph_id, glyph)| (*glyph_id, glyph.text.as_str()))
            .collect();

        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );

        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (glyph_id, text) in chunk {
                let utf16: String = text
                    .encode_utf16()
                    .map(|unit| format!("{:04X}", unit))
                    .collect();
                cmap.push_str(&format!("<{:04X}> <{}>\n", glyph_id, utf16));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap.into_bytes()
    }

    /// Objects needed to embed the font. `refs` are the object numbers
    /// reserved for (type0, cid font, descriptor, font file, to-unicode).
    pub fn pdf_objects(&self, refs: FontObjectRefs) -> EmbeddedFontObjects {
        let base_font = PdfObject::name(self.postscript_name.clone());

        let type0 = PdfDictionary::typed("Font")
            .with("Subtype", PdfObject::name("Type0"))
            .with("BaseFont", base_font.clone())
            .with("Encoding", PdfObject::name("Identity-H"))
            .with(
                "DescendantFonts",
                PdfObject::Array(vec![PdfObject::Reference(refs.cid_font)]),
            )
            .with("ToUnicode", PdfObject::Reference(refs.to_unicode));

        let system_info = PdfDictionary::new()
            .with("Registry", PdfObject::String(PdfString::ascii("Adobe")))
            .with("Ordering", PdfObject::String(PdfString::ascii("Identity")))
            .with("Supplement", PdfObject::Integer(0));

        let cid_font = PdfDictionary::typed("Font")
            .with("Subtype", PdfObject::name("CIDFontType2"))
            .with("BaseFont", base_font.clone())
            .with("CIDSystemInfo", system_info.into())
            .with("FontDescriptor", PdfObject::Reference(refs.descriptor))
            .with("CIDToGIDMap", PdfObject::name("Identity"))
            .with("DW", PdfObject::Integer(1000))
            .with("W", self.widths());

        // Nonsymbolic, plus Italic when the face says so
        let flags = if self.italic { 32 | 64 } else { 32 };
        let bbox = self
            .bbox
            .iter()
            .map(|&v| PdfObject::Integer(self.to_pdf_units(v as i64)))
            .collect::<Vec<_>>();

        let descriptor = PdfDictionary::typed("FontDescriptor")
            .with("FontName", base_font)
            .with("Flags", PdfObject::Integer(flags))
            .with("FontBBox", PdfObject::Array(bbox))
            .with("ItalicAngle", PdfObject::Integer(if self.italic { -12 } else { 0 }))
            .with("Ascent", PdfObject::Integer(self.to_pdf_units(self.ascender as i64)))
            .with("Descent", PdfObject::Integer(self.to_pdf_units(self.descender as i64)))
            .with("CapHeight", PdfObject::Integer(self.to_pdf_units(self.cap_height as i64)))
            .with("StemV", PdfObject::Integer(80))
            .with("FontFile2", PdfObject::Reference(refs.font_file));

        let font_file = PdfStream::new(self.data.clone())
            .with_dict(PdfDictionary::new().with("Length1", self.data.len().into()));

        EmbeddedFontObjects {
            type0,
            cid_font,
            descriptor,
            font_file,
            to_unicode: PdfStream::new(self.to_unicode_cmap()),
        }
    }
}

/// Object numbers reserved for one embedded font
#[derive(Debug, Clone, Copy)]
pub struct FontObjectRefs {
    pub type0: u32,
    pub cid_font: u32,
    pub descriptor: u32,
    pub font_file: u32,
    pub to_unicode: u32,
}

/// The objects making up one embedded font
#[derive(Debug, Clone)]
pub struct EmbeddedFontObjects {
    pub type0: PdfDictionary,
    pub cid_font: PdfDictionary,
    pub descriptor: PdfDictionary,
    pub font_file: PdfStream,
    pub to_unicode: PdfStream,
}

/// PostScript names may not contain spaces or PDF delimiters
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_rejected() {
        let err = TrueTypeFont::parse("courier", b"not a font".to_vec()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFont { .. }));
        assert!(err.to_string().contains("courier"));
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(sanitize_font_name("Open Sans (Bold)"), "OpenSansBold");
        assert_eq!(sanitize_font_name("   "), "EmbeddedFont");
    }
}
