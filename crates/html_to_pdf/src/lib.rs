//! HTML to PDF - PDF/A and PDF/UA document generation
//!
//! Converts an HTML document into PDF bytes at a requested conformance
//! level. Before rendering, every `font-family` the HTML declares must be
//! backed by a font in the caller's font map so it can be embedded.
//!
//! ```no_run
//! use html_to_pdf::{FontMap, PdfConformanceLevel};
//!
//! let mut fonts = FontMap::new();
//! fonts.insert("courier".to_string(), std::fs::read("courier.ttf")?);
//! let profile = std::fs::read("sRGB.icc")?;
//!
//! let generator = html_to_pdf::create();
//! let pdf = generator.create_pdf_document(
//!     Some("<html><body><p>Hello</p></body></html>"),
//!     &profile,
//!     Some(&fonts),
//!     Some(PdfConformanceLevel::PdfA2B),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

pub mod config;
pub mod conformance;
mod error;
pub mod font_validation;
mod generator;
pub mod resources;

pub use config::GeneratorConfig;
pub use conformance::PdfConformanceLevel;
pub use error::{ErrorKind, GenerationError, Result};
pub use generator::{AccessiblePdfGenerator, HtmlToPdfGenerator};

/// Font-family name to font file bytes
pub type FontMap = BTreeMap<String, Vec<u8>>;

/// A generator with the default configuration
pub fn create() -> Box<dyn HtmlToPdfGenerator> {
    Box::new(AccessiblePdfGenerator::new())
}
