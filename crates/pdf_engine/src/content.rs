//! PDF Content Stream Generation
//!
//! Builder for page content streams. Operators used by the renderer:
//!
//! - q/Q, cm: graphics state and transforms
//! - w, m, l, c, re, h, S, f, B: paths
//! - rg/RG: RGB colours
//! - BT/ET, Tf, Td, Tj: text
//! - BDC/EMC: marked content for tagged PDF

use crate::objects::format_real;

/// Content stream builder
#[derive(Debug, Default)]
pub struct ContentStream {
    data: Vec<u8>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    // =========================================================================
    // Graphics State
    // =========================================================================

    pub fn save_state(&mut self) -> &mut Self {
        self.write_line("q")
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.write_line("Q")
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.write_line(&format!("{} w", format_real(width)))
    }

    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.write_line(&format!("{} {} {} rg", format_real(r), format_real(g), format_real(b)))
    }

    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.write_line(&format!("{} {} {} RG", format_real(r), format_real(g), format_real(b)))
    }

    // =========================================================================
    // Paths
    // =========================================================================

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.write_line(&format!("{} {} m", format_real(x), format_real(y)))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.write_line(&format!("{} {} l", format_real(x), format_real(y)))
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        self.write_line(&format!(
            "{} {} {} {} {} {} c",
            format_real(x1),
            format_real(y1),
            format_real(x2),
            format_real(y2),
            format_real(x3),
            format_real(y3)
        ))
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.write_line(&format!(
            "{} {} {} {} re",
            format_real(x),
            format_real(y),
            format_real(width),
            format_real(height)
        ))
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.write_line("h")
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.write_line("S")
    }

    pub fn fill(&mut self) -> &mut Self {
        self.write_line("f")
    }

    pub fn fill_and_stroke(&mut self) -> &mut Self {
        self.write_line("B")
    }

    // =========================================================================
    // Text
    // =========================================================================

    pub fn begin_text(&mut self) -> &mut Self {
        self.write_line("BT")
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.write_line("ET")
    }

    pub fn set_font(&mut self, resource_name: &str, size: f64) -> &mut Self {
        self.write_line(&format!("/{} {} Tf", resource_name, format_real(size)))
    }

    /// Move to the start of the next text position (Td)
    pub fn move_text(&mut self, tx: f64, ty: f64) -> &mut Self {
        self.write_line(&format!("{} {} Td", format_real(tx), format_real(ty)))
    }

    /// Show a single-byte encoded string (Tj)
    pub fn show_text(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.push(b'(');
        for &byte in bytes {
            match byte {
                b'(' | b')' | b'\\' => {
                    self.data.push(b'\\');
                    self.data.push(byte);
                }
                0x20..=0x7E => self.data.push(byte),
                _ => self.data.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
            }
        }
        self.write_line(") Tj")
    }

    /// Show two-byte glyph ids for an Identity-H font (Tj)
    pub fn show_glyphs(&mut self, glyph_ids: &[u16]) -> &mut Self {
        self.data.push(b'<');
        for gid in glyph_ids {
            self.data.extend_from_slice(format!("{:04X}", gid).as_bytes());
        }
        self.write_line("> Tj")
    }

    // =========================================================================
    // Marked Content
    // =========================================================================

    /// Open a marked-content sequence linked to the structure tree (BDC)
    pub fn begin_marked_content(&mut self, tag: &str, mcid: u32) -> &mut Self {
        self.write_line(&format!("/{} <</MCID {}>> BDC", tag, mcid))
    }

    pub fn end_marked_content(&mut self) -> &mut Self {
        self.write_line("EMC")
    }

    fn write_line(&mut self, s: &str) -> &mut Self {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(b'\n');
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: ContentStream) -> String {
        String::from_utf8(content.into_bytes()).unwrap()
    }

    #[test]
    fn test_text_object() {
        let mut content = ContentStream::new();
        content
            .begin_text()
            .set_font("F1", 12.0)
            .move_text(72.0, 700.5)
            .show_text(b"Hello (PDF)")
            .end_text();

        assert_eq!(
            text(content),
            "BT\n/F1 12 Tf\n72 700.5 Td\n(Hello \\(PDF\\)) Tj\nET\n"
        );
    }

    #[test]
    fn test_glyph_ids_are_hex_encoded() {
        let mut content = ContentStream::new();
        content.show_glyphs(&[1, 0x2A, 0x1234]);
        assert_eq!(text(content), "<0001002A1234> Tj\n");
    }

    #[test]
    fn test_marked_content() {
        let mut content = ContentStream::new();
        content.begin_marked_content("P", 3).end_marked_content();
        assert_eq!(text(content), "/P <</MCID 3>> BDC\nEMC\n");
    }

    #[test]
    fn test_paths() {
        let mut content = ContentStream::new();
        content
            .save_state()
            .set_stroke_rgb(1.0, 0.0, 0.0)
            .set_line_width(0.5)
            .rect(10.0, 20.0, 30.0, 40.0)
            .stroke()
            .restore_state();
        assert_eq!(text(content), "q\n1 0 0 RG\n0.5 w\n10 20 30 40 re\nS\nQ\n");
    }
}
