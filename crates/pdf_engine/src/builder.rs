//! Renderer configuration
//!
//! [`PdfRendererBuilder`] collects the document, output stream, colour
//! profile, fonts and conformance settings. Setters return `&mut Self` so
//! calls chain; [`PdfRendererBuilder::build_pdf_renderer`] consumes the
//! builder, parses the document and checks the colour profile.

use std::io::Write;

use crate::conformance::PdfAConformance;
use crate::document::PageSize;
use crate::error::{EngineError, Result};
use crate::fonts::{FontResolver, FontSource, FontStyle};
use crate::html::parse_document;
use crate::icc::IccProfile;
use crate::options::RenderOptions;
use crate::renderer::PdfRenderer;
use crate::style::TextDirection;
use crate::svg::SvgHandling;

#[derive(Default)]
pub struct PdfRendererBuilder<'a> {
    html: Option<&'a str>,
    base_uri: Option<String>,
    color_profile: Option<&'a [u8]>,
    pdfa: Option<PdfAConformance>,
    pdfua: bool,
    output: Option<&'a mut dyn Write>,
    options: RenderOptions,
    fonts: FontResolver<'a>,
}

impl<'a> PdfRendererBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_text_direction(&mut self, direction: TextDirection) -> &mut Self {
        self.options.text_direction = direction;
        self
    }

    /// ICC profile for the PDF/A output intent
    pub fn use_color_profile(&mut self, profile: &'a [u8]) -> &mut Self {
        self.color_profile = Some(profile);
        self
    }

    pub fn use_svg_drawer(&mut self, svg: SvgHandling) -> &mut Self {
        self.options.svg = svg;
        self
    }

    /// The XHTML source. `base_uri` is the location relative resources
    /// would be resolved against.
    pub fn with_html_content(&mut self, html: &'a str, base_uri: Option<&str>) -> &mut Self {
        self.html = Some(html);
        self.base_uri = base_uri.map(str::to_string);
        self
    }

    pub fn use_fast_mode(&mut self) -> &mut Self {
        self.options.fast_mode = true;
        self
    }

    pub fn use_page_size(&mut self, page_size: PageSize) -> &mut Self {
        self.options.page_size = page_size;
        self
    }

    pub fn use_compression(&mut self, compress: bool) -> &mut Self {
        self.options.compress = compress;
        self
    }

    pub fn to_stream(&mut self, output: &'a mut dyn Write) -> &mut Self {
        self.output = Some(output);
        self
    }

    pub fn use_pdfa_conformance(&mut self, conformance: PdfAConformance) -> &mut Self {
        self.pdfa = Some(conformance);
        self
    }

    pub fn use_pdfua_accessibility(&mut self, enabled: bool) -> &mut Self {
        self.pdfua = enabled;
        self
    }

    /// Register a font before the renderer is built
    pub fn use_font(
        &mut self,
        source: FontSource<'a>,
        family: &str,
        weight: Option<u16>,
        style: Option<FontStyle>,
        subset: bool,
    ) -> &mut Self {
        self.fonts.add_font(source, family, weight, style, subset);
        self
    }

    pub fn pdfa_conformance(&self) -> Option<PdfAConformance> {
        self.pdfa
    }

    pub fn is_pdfua(&self) -> bool {
        self.pdfua
    }

    pub fn build_pdf_renderer(self) -> Result<PdfRenderer<'a>> {
        let html = self.html.ok_or(EngineError::MissingContent)?;
        let output = self.output.ok_or(EngineError::MissingOutput)?;

        let document = parse_document(html)?;
        tracing::debug!(root = %document.name, "parsed document");

        // Only conformant output carries the profile, so only then is it checked
        let color_profile = match self.color_profile {
            Some(bytes) if self.pdfa.is_some() || self.pdfua => Some(IccProfile::parse(bytes)?),
            _ => None,
        };

        Ok(PdfRenderer {
            document,
            base_uri: self.base_uri,
            options: self.options,
            color_profile,
            pdfa: self.pdfa,
            pdfua: self.pdfua,
            output,
            fonts: self.fonts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::srgb_profile;

    const HTML: &str = "<html><body><p>Hello</p></body></html>";

    #[test]
    fn test_missing_content_and_output() {
        let mut sink = Vec::new();
        let mut builder = PdfRendererBuilder::new();
        builder.to_stream(&mut sink);
        assert!(matches!(builder.build_pdf_renderer(), Err(EngineError::MissingContent)));

        let mut builder = PdfRendererBuilder::new();
        builder.with_html_content(HTML, None);
        assert!(matches!(builder.build_pdf_renderer(), Err(EngineError::MissingOutput)));
    }

    #[test]
    fn test_malformed_html_fails_at_build() {
        let mut sink = Vec::new();
        let mut builder = PdfRendererBuilder::new();
        builder.with_html_content("<html><p>open", None).to_stream(&mut sink);
        assert!(matches!(builder.build_pdf_renderer(), Err(EngineError::MalformedHtml(_))));
    }

    #[test]
    fn test_colour_profile_checked_only_for_conformant_output() {
        let mut sink = Vec::new();
        let mut builder = PdfRendererBuilder::new();
        builder
            .with_html_content(HTML, None)
            .use_color_profile(b"junk")
            .to_stream(&mut sink);
        assert!(builder.build_pdf_renderer().is_ok());

        let mut sink = Vec::new();
        let mut builder = PdfRendererBuilder::new();
        builder
            .with_html_content(HTML, None)
            .use_color_profile(b"junk")
            .use_pdfa_conformance(PdfAConformance::PdfA2B)
            .to_stream(&mut sink);
        assert!(matches!(
            builder.build_pdf_renderer(),
            Err(EngineError::InvalidColorProfile(_))
        ));
    }

    #[test]
    fn test_builder_records_conformance() {
        let profile = srgb_profile();
        let mut builder = PdfRendererBuilder::new();
        builder
            .use_color_profile(&profile)
            .use_pdfa_conformance(PdfAConformance::PdfA3U)
            .use_fast_mode();
        assert_eq!(builder.pdfa_conformance(), Some(PdfAConformance::PdfA3U));
        assert!(!builder.is_pdfua());
    }
}
