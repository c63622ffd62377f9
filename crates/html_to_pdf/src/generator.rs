//! PDF generation entry point
//!
//! [`AccessiblePdfGenerator::create_pdf_document`] runs one conversion:
//!
//! 1. Reject an absent conformance level, then an absent font map
//! 2. Configure a fresh engine builder and apply the conformance level
//! 3. Check font-family declarations against the font map (not for `NONE`)
//! 4. Build the renderer, register the fonts and render into a local buffer
//!
//! Nothing is shared between calls. Every failure is logged and returned as
//! a [`GenerationError`].

use tracing::Dispatch;

use pdf_engine::PdfRendererBuilder;

use crate::config::GeneratorConfig;
use crate::conformance::{self, PdfConformanceLevel};
use crate::error::{GenerationError, Result};
use crate::font_validation;
use crate::resources::{bind_colour_profile, bind_fonts};
use crate::FontMap;

/// Converts HTML into PDF bytes at a requested conformance level
pub trait HtmlToPdfGenerator: Send + Sync {
    fn create_pdf_document(
        &self,
        html: Option<&str>,
        colour_profile: &[u8],
        font_map: Option<&FontMap>,
        conformance_level: Option<PdfConformanceLevel>,
    ) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Default)]
pub struct AccessiblePdfGenerator {
    config: GeneratorConfig,
    dispatch: Option<Dispatch>,
}

impl AccessiblePdfGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            dispatch: None,
        }
    }

    /// Send this generator's log events to `dispatch` instead of the global subscriber
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn generate(
        &self,
        html: Option<&str>,
        colour_profile: &[u8],
        font_map: Option<&FontMap>,
        conformance_level: Option<PdfConformanceLevel>,
    ) -> Result<Vec<u8>> {
        let level = conformance_level
            .ok_or_else(|| GenerationError::configuration("Conformance level must not be null"))?;
        let font_map = font_map.ok_or_else(GenerationError::missing_font_map)?;

        let mut sink = Vec::new();
        self.render(html, colour_profile, font_map, level, &mut sink)?;

        tracing::info!("successfully generated pdf");
        Ok(sink)
    }

    fn render<'a>(
        &self,
        html: Option<&'a str>,
        colour_profile: &'a [u8],
        font_map: &'a FontMap,
        level: PdfConformanceLevel,
        sink: &'a mut Vec<u8>,
    ) -> Result<()> {
        let config = &self.config;
        let mut builder = PdfRendererBuilder::new();
        builder
            .default_text_direction(config.text_direction)
            .use_page_size(config.page_size)
            .use_compression(config.compress);
        bind_colour_profile(&mut builder, colour_profile);
        builder.use_svg_drawer(config.svg_support);
        if let Some(html) = html {
            builder.with_html_content(html, None);
        }
        if config.fast_mode {
            builder.use_fast_mode();
        }
        builder.to_stream(sink);

        conformance::apply(&mut builder, level);

        if let (true, Some(html)) = (level.requires_font_validation(), html) {
            font_validation::validate(html, font_map)?;
        }

        let mut renderer = builder.build_pdf_renderer()?;
        bind_fonts(renderer.font_resolver_mut(), font_map);
        renderer.create_pdf()?;
        Ok(())
    }
}

impl HtmlToPdfGenerator for AccessiblePdfGenerator {
    fn create_pdf_document(
        &self,
        html: Option<&str>,
        colour_profile: &[u8],
        font_map: Option<&FontMap>,
        conformance_level: Option<PdfConformanceLevel>,
    ) -> Result<Vec<u8>> {
        let run = || {
            self.generate(html, colour_profile, font_map, conformance_level)
                .inspect_err(|err| {
                    tracing::error!("{}", err);
                    tracing::debug!(kind = ?err.kind(), error = ?err, "pdf generation failed");
                })
        };

        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, run),
            None => run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const HTML: &str = "<html><body><p>Hello</p></body></html>";

    #[test]
    fn test_absent_level_fails_first() {
        let generator = AccessiblePdfGenerator::new();
        let err = generator
            .create_pdf_document(None, b"not a profile", None, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "Conformance level must not be null");
    }

    #[test]
    fn test_absent_font_map_fails_before_rendering() {
        let generator = AccessiblePdfGenerator::new();
        let err = generator
            .create_pdf_document(Some("<html><p>broken"), b"", None, Some(PdfConformanceLevel::None))
            .unwrap_err();
        assert!(err.is_missing_font_map());
    }

    #[test]
    fn test_font_check_runs_before_the_engine() {
        let html = "<html><body>\n<p style=\"font-family: tahoma\">x</p>\n</body></html>";
        let generator = AccessiblePdfGenerator::new();
        let err = generator
            .create_pdf_document(Some(html), b"junk", Some(&FontMap::new()), Some(PdfConformanceLevel::PdfA2B))
            .unwrap_err();
        // The junk profile would fail in the engine; the font check wins
        assert!(err.is_font_validation());
    }

    #[test]
    fn test_absent_html_is_an_engine_failure() {
        let generator = AccessiblePdfGenerator::new();
        let err = generator
            .create_pdf_document(None, b"", Some(&FontMap::new()), Some(PdfConformanceLevel::PdfA1B))
            .unwrap_err();
        assert!(err.is_rendering());
    }

    #[test]
    fn test_none_level_renders_plain_pdf() {
        let generator = AccessiblePdfGenerator::new();
        let pdf = generator
            .create_pdf_document(Some(HTML), b"", Some(&FontMap::new()), Some(PdfConformanceLevel::None))
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_generator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AccessiblePdfGenerator>();
    }
}
