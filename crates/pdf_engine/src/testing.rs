//! Test support: tiny in-memory fonts
//!
//! Builds a TrueType font with just the tables needed to parse, measure and
//! embed it (`cmap`, `head`, `hhea`, `hmtx`, `maxp`, `name`). Glyph 0 is
//! `.notdef`; printable ASCII (`' '..='~'`) maps to glyphs 1..=95. There are
//! no outlines, so nothing is visible when the font is drawn.

const UNITS_PER_EM: u16 = 1000;
const FIRST_CHAR: u16 = 0x20;
const LAST_CHAR: u16 = 0x7E;
const NUM_GLYPHS: u16 = LAST_CHAR - FIRST_CHAR + 2;

/// A font whose glyphs are all `advance` units wide (1000 units per em)
pub fn ascii_font(postscript_name: &str, advance: u16) -> Vec<u8> {
    let tables: [(&[u8; 4], Vec<u8>); 6] = [
        (b"cmap", cmap()),
        (b"head", head()),
        (b"hhea", hhea(advance)),
        (b"hmtx", hmtx(advance)),
        (b"maxp", maxp()),
        (b"name", name(postscript_name)),
    ];

    let num_tables = tables.len() as u16;
    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&num_tables.to_be_bytes());
    font.extend_from_slice(&64u16.to_be_bytes()); // searchRange
    font.extend_from_slice(&2u16.to_be_bytes()); // entrySelector
    font.extend_from_slice(&(num_tables * 16 - 64).to_be_bytes()); // rangeShift

    let mut offset = 12 + tables.len() * 16;
    let mut body = Vec::new();
    for (tag, data) in &tables {
        font.extend_from_slice(*tag);
        font.extend_from_slice(&0u32.to_be_bytes()); // checksum
        font.extend_from_slice(&(offset as u32).to_be_bytes());
        font.extend_from_slice(&(data.len() as u32).to_be_bytes());

        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + tables.len() * 16 + body.len();
    }
    font.extend_from_slice(&body);
    font
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn cmap() -> Vec<u8> {
    let mut data = Vec::new();
    push_u16(&mut data, 0); // version
    push_u16(&mut data, 1); // numTables
    push_u16(&mut data, 3); // Windows
    push_u16(&mut data, 1); // Unicode BMP
    data.extend_from_slice(&12u32.to_be_bytes());

    // Format 4 with one real segment plus the 0xFFFF terminator
    let seg_count = 2u16;
    push_u16(&mut data, 4);
    push_u16(&mut data, 16 + 8 * seg_count);
    push_u16(&mut data, 0); // language
    push_u16(&mut data, seg_count * 2);
    push_u16(&mut data, 4); // searchRange
    push_u16(&mut data, 1); // entrySelector
    push_u16(&mut data, 0); // rangeShift
    push_u16(&mut data, LAST_CHAR);
    push_u16(&mut data, 0xFFFF);
    push_u16(&mut data, 0); // reservedPad
    push_u16(&mut data, FIRST_CHAR);
    push_u16(&mut data, 0xFFFF);
    push_i16(&mut data, 1 - FIRST_CHAR as i16);
    push_i16(&mut data, 1);
    push_u16(&mut data, 0);
    push_u16(&mut data, 0);
    data
}

fn head() -> Vec<u8> {
    let mut data = Vec::with_capacity(54);
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // fontRevision
    data.extend_from_slice(&0u32.to_be_bytes()); // checksumAdjustment
    data.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magic
    push_u16(&mut data, 0); // flags
    push_u16(&mut data, UNITS_PER_EM);
    data.extend_from_slice(&[0; 16]); // created, modified
    push_i16(&mut data, 0); // xMin
    push_i16(&mut data, -200); // yMin
    push_i16(&mut data, 1000); // xMax
    push_i16(&mut data, 800); // yMax
    push_u16(&mut data, 0); // macStyle
    push_u16(&mut data, 8); // lowestRecPPEM
    push_i16(&mut data, 2); // fontDirectionHint
    push_i16(&mut data, 0); // indexToLocFormat
    push_i16(&mut data, 0); // glyphDataFormat
    data
}

fn hhea(advance: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    push_i16(&mut data, 800); // ascender
    push_i16(&mut data, -200); // descender
    push_i16(&mut data, 0); // lineGap
    push_u16(&mut data, advance); // advanceWidthMax
    push_i16(&mut data, 0); // minLeftSideBearing
    push_i16(&mut data, 0); // minRightSideBearing
    push_i16(&mut data, advance as i16); // xMaxExtent
    push_i16(&mut data, 1); // caretSlopeRise
    push_i16(&mut data, 0); // caretSlopeRun
    push_i16(&mut data, 0); // caretOffset
    data.extend_from_slice(&[0; 8]); // reserved
    push_i16(&mut data, 0); // metricDataFormat
    push_u16(&mut data, NUM_GLYPHS); // numberOfHMetrics
    data
}

fn hmtx(advance: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(NUM_GLYPHS as usize * 4);
    for _ in 0..NUM_GLYPHS {
        push_u16(&mut data, advance);
        push_i16(&mut data, 0);
    }
    data
}

fn maxp() -> Vec<u8> {
    let mut data = Vec::with_capacity(6);
    data.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    push_u16(&mut data, NUM_GLYPHS);
    data
}

fn name(postscript_name: &str) -> Vec<u8> {
    let encoded: Vec<u8> = postscript_name
        .encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect();

    let mut data = Vec::new();
    push_u16(&mut data, 0); // format
    push_u16(&mut data, 1); // count
    push_u16(&mut data, 6 + 12); // stringOffset
    push_u16(&mut data, 3); // Windows
    push_u16(&mut data, 1); // Unicode BMP
    push_u16(&mut data, 0x0409); // en-US
    push_u16(&mut data, 6); // PostScript name
    push_u16(&mut data, encoded.len() as u16);
    push_u16(&mut data, 0);
    data.extend_from_slice(&encoded);
    data
}
