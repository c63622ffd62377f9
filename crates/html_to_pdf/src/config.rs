//! Generator configuration

use serde::{Deserialize, Serialize};

use pdf_engine::{PageSize, SvgHandling, TextDirection};

use crate::error::{GenerationError, Result};

/// Rendering settings shared by every call of one generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default)]
    pub text_direction: TextDirection,
    /// Skip full text shaping
    #[serde(default = "default_true")]
    pub fast_mode: bool,
    #[serde(default = "default_svg_support")]
    pub svg_support: SvgHandling,
    #[serde(default = "default_true")]
    pub compress: bool,
    #[serde(default)]
    pub page_size: PageSize,
}

fn default_true() -> bool {
    true
}

fn default_svg_support() -> SvgHandling {
    SvgHandling::Vector
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            text_direction: TextDirection::Ltr,
            fast_mode: true,
            svg_support: default_svg_support(),
            compress: true,
            page_size: PageSize::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GenerationError::configuration(format!("Invalid generator configuration: {}", e)))
    }

    pub fn with_text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    pub fn with_fast_mode(mut self, fast: bool) -> Self {
        self.fast_mode = fast;
        self
    }

    pub fn with_svg_support(mut self, svg: SvgHandling) -> Self {
        self.svg_support = svg;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_standard_pipeline() {
        let config = GeneratorConfig::default();
        assert_eq!(config.text_direction, TextDirection::Ltr);
        assert!(config.fast_mode);
        assert_eq!(config.svg_support, SvgHandling::Vector);
        assert!(config.compress);
        assert_eq!(config.page_size, PageSize::A4);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = GeneratorConfig::from_json(r#"{"textDirection": "rtl", "pageSize": "letter"}"#).unwrap();
        assert_eq!(config.text_direction, TextDirection::Rtl);
        assert_eq!(config.page_size, PageSize::Letter);
        assert!(config.fast_mode);
        assert!(config.compress);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = GeneratorConfig::from_json(r#"{"svgSupport": "raster"}"#).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.message().starts_with("Invalid generator configuration"));
    }

    #[test]
    fn test_builders() {
        let config = GeneratorConfig::new()
            .with_fast_mode(false)
            .with_compression(false)
            .with_svg_support(SvgHandling::Skip)
            .with_text_direction(TextDirection::Rtl)
            .with_page_size(PageSize::Letter);
        assert!(!config.fast_mode);
        assert!(!config.compress);
        assert_eq!(config.svg_support, SvgHandling::Skip);
        assert_eq!(config.text_direction, TextDirection::Rtl);
        assert_eq!(config.page_size, PageSize::Letter);
    }
}
