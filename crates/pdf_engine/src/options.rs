//! Render Options
//!
//! Settings that shape a rendering independent of the document content.

use serde::{Deserialize, Serialize};

use crate::document::PageSize;
use crate::style::TextDirection;
use crate::svg::SvgHandling;

/// Options for one rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default)]
    pub page_size: PageSize,
    /// Page margin on all sides, in points
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Font size of the root element, in points
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub text_direction: TextDirection,
    /// Measure text with cmap lookups instead of full shaping
    #[serde(default)]
    pub fast_mode: bool,
    /// Whether to compress content streams
    #[serde(default = "default_compress")]
    pub compress: bool,
    #[serde(default)]
    pub svg: SvgHandling,
    #[serde(default = "default_producer")]
    pub producer: String,
    #[serde(default)]
    pub creator: Option<String>,
}

fn default_margin() -> f64 {
    54.0
}

fn default_font_size() -> f64 {
    12.0
}

fn default_compress() -> bool {
    true
}

fn default_producer() -> String {
    concat!("pdf_engine ", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin: default_margin(),
            font_size: default_font_size(),
            text_direction: TextDirection::default(),
            fast_mode: false,
            compress: true,
            svg: SvgHandling::default(),
            producer: default_producer(),
            creator: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    pub fn with_fast_mode(mut self, fast: bool) -> Self {
        self.fast_mode = fast;
        self
    }

    /// Set compression enabled/disabled
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_svg(mut self, svg: SvgHandling) -> Self {
        self.svg = svg;
        self
    }

    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.page_size, PageSize::A4);
        assert!(options.compress);
        assert!(!options.fast_mode);
        assert_eq!(options.svg, SvgHandling::Skip);
        assert!(options.producer.starts_with("pdf_engine"));
    }

    #[test]
    fn test_options_builder() {
        let options = RenderOptions::new()
            .with_page_size(PageSize::Letter)
            .with_compression(false)
            .with_text_direction(TextDirection::Rtl)
            .with_creator("tests");

        assert_eq!(options.page_size, PageSize::Letter);
        assert!(!options.compress);
        assert_eq!(options.text_direction, TextDirection::Rtl);
        assert_eq!(options.creator.as_deref(), Some("tests"));
    }

    #[test]
    fn test_options_from_json() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"pageSize":"letter","fastMode":true,"svg":"vector"}"#).unwrap();
        assert_eq!(options.page_size, PageSize::Letter);
        assert!(options.fast_mode);
        assert_eq!(options.svg, SvgHandling::Vector);
        assert_eq!(options.margin, 54.0);
        assert!(options.compress);
    }
}
