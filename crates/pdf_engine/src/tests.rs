//! End-to-end rendering tests

use super::*;
use crate::icc::srgb_profile;
use crate::testing::ascii_font;
use proptest::prelude::*;

const SIMPLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Quarterly report</title></head>
<body>
<h1>Summary</h1>
<p>Revenue grew in every region.</p>
</body>
</html>"#;

fn render(builder: PdfRendererBuilder<'_>) -> Result<()> {
    builder.build_pdf_renderer()?.create_pdf()
}

fn page_count(pdf: &str) -> usize {
    pdf.matches("/Type /Page >>").count()
}

#[test]
fn test_plain_pdf_has_no_metadata() {
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(SIMPLE_HTML, None)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.starts_with("%PDF-1.7"));
    assert!(text.contains("/Type /Catalog"));
    assert!(!text.contains("/Metadata"));
    assert!(!text.contains("/StructTreeRoot"));
    assert!(text.contains("/Count 1"));
    assert_eq!(page_count(&text), 1);
    assert!(text.contains("/Title (Quarterly report)"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn test_pdfa_1b_output() {
    let profile = srgb_profile();
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(SIMPLE_HTML, None)
        .use_color_profile(&profile)
        .use_pdfa_conformance(PdfAConformance::PdfA1B)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.contains("<pdfaid:part>1</pdfaid:part>"));
    assert!(text.contains("<pdfaid:conformance>B</pdfaid:conformance>"));
    assert!(text.contains("/S /GTS_PDFA1"));
    assert!(text.contains("/OutputIntents"));
    assert!(text.contains("/N 3"));
    assert!(text.contains("/ID [<"));
    assert!(!text.contains("/StructTreeRoot"));
}

#[test]
fn test_level_a_is_tagged() {
    let profile = srgb_profile();
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(SIMPLE_HTML, None)
        .use_color_profile(&profile)
        .use_pdfa_conformance(PdfAConformance::PdfA2A)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.starts_with("%PDF-1.7"));
    assert!(text.contains("<pdfaid:part>2</pdfaid:part>"));
    assert!(text.contains("/StructTreeRoot"));
    assert!(text.contains("/MarkInfo << /Marked true >>"));
    assert!(text.contains("/S /H1"));
    assert!(text.contains("/S /P"));
    assert!(text.contains("/H1 <</MCID 0>> BDC"));
    assert!(text.contains("/P <</MCID 1>> BDC"));
    assert!(text.contains("/Lang (en)"));
}

#[test]
fn test_pdfua_output() {
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(
            r#"<html lang="en"><head><title>Chart</title></head><body>
<svg width="100" height="50" aria-label="Sales by region"><rect width="10" height="10"/></svg>
</body></html>"#,
            None,
        )
        .use_svg_drawer(SvgHandling::Vector)
        .use_pdfua_accessibility(true)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("<pdfuaid:part>1</pdfuaid:part>"));
    assert!(!text.contains("pdfaid:part"));
    assert!(text.contains("/DisplayDocTitle true"));
    assert!(text.contains("/S /Figure"));
    assert!(text.contains("/Alt (Sales by region)"));
    assert!(text.contains(" re\n"));
}

#[test]
fn test_registered_font_is_embedded() {
    let font = ascii_font("TestMono", 600);
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(
            r#"<html><body><p style="font-family: 'courier'">Hello</p></body></html>"#,
            None,
        )
        .use_compression(false)
        .to_stream(&mut pdf);

    let mut renderer = builder.build_pdf_renderer().unwrap();
    renderer
        .font_resolver_mut()
        .add_font(FontSource::from_bytes(&font), "courier", None, None, false);
    renderer.create_pdf().unwrap();
    drop(renderer);

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Subtype /CIDFontType2"));
    assert!(text.contains("/BaseFont /TestMono"));
    assert!(text.contains("/Encoding /Identity-H"));
    assert!(text.contains("/FontFile2"));
    // 'H' is glyph 0x29 and is 600 units wide
    assert!(text.contains("<0029> <0048>"));
    assert!(text.contains("/W [41 [600]"));
    assert!(text.contains("<00290046004D004D0050> Tj"));
    assert!(!text.contains("/Type1"));
}

#[test]
fn test_fast_mode_maps_characters_directly() {
    let font = ascii_font("TestMono", 600);
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(r#"<html><body><p style="font-family: courier">Hi</p></body></html>"#, None)
        .use_font(FontSource::from_bytes(&font), "courier", None, None, false)
        .use_fast_mode()
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("<0029004A> Tj"));
}

#[test]
fn test_conformant_output_prefers_embedded_fonts() {
    let font = ascii_font("Body", 500);
    let profile = srgb_profile();
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(SIMPLE_HTML, None)
        .use_font(FontSource::from_bytes(&font), "body", None, None, false)
        .use_color_profile(&profile)
        .use_pdfa_conformance(PdfAConformance::PdfA3B)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/BaseFont /Body"));
    assert!(!text.contains("/Subtype /Type1"));
}

#[test]
fn test_invalid_font_fails_when_used() {
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(r#"<html><body><p style="font-family: broken">x</p></body></html>"#, None)
        .use_font(FontSource::from_bytes(b"garbage"), "broken", None, None, false)
        .to_stream(&mut pdf);

    let err = render(builder).unwrap_err();
    assert!(matches!(err, EngineError::InvalidFont { .. }));
}

#[test]
fn test_forced_page_breaks() {
    let html = r#"<html><body>
<p>one</p>
<p style="page-break-before: always">two</p>
<p style="break-before: page">three</p>
</body></html>"#;
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(html, None)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Count 3"));
    assert_eq!(page_count(&text), 3);
}

#[test]
fn test_long_documents_paginate() {
    let body: String = (0..120).map(|i| format!("<p>Paragraph number {}</p>", i)).collect();
    let html = format!("<html><body>{}</body></html>", body);
    let mut pdf = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder
        .with_html_content(&html, None)
        .use_compression(false)
        .to_stream(&mut pdf);
    render(builder).unwrap();

    let text = String::from_utf8_lossy(&pdf);
    assert!(page_count(&text) > 1);
}

#[test]
fn test_compressed_output_is_smaller() {
    let body: String = (0..40).map(|i| format!("<p>Repeated line {}</p>", i)).collect();
    let html = format!("<html><body>{}</body></html>", body);

    let mut plain = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder.with_html_content(&html, None).use_compression(false).to_stream(&mut plain);
    render(builder).unwrap();

    let mut packed = Vec::new();
    let mut builder = PdfRendererBuilder::new();
    builder.with_html_content(&html, None).to_stream(&mut packed);
    render(builder).unwrap();

    assert!(packed.len() < plain.len());
    assert!(String::from_utf8_lossy(&packed).contains("/FlateDecode"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_any_text_renders_a_complete_file(words in prop::collection::vec("[a-zA-Z0-9]{1,12}", 0..60)) {
        let html = format!("<html><body><p>{}</p></body></html>", words.join(" "));
        let mut pdf = Vec::new();
        let mut builder = PdfRendererBuilder::new();
        builder.with_html_content(&html, None).use_compression(false).to_stream(&mut pdf);
        render(builder).unwrap();

        let text = String::from_utf8_lossy(&pdf);
        prop_assert!(text.starts_with("%PDF-"));
        prop_assert!(text.trim_end().ends_with("%%EOF"));
        prop_assert!(page_count(&text) >= 1);
    }
}
