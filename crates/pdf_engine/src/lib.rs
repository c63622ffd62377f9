//! PDF Engine - XHTML to PDF, PDF/A and PDF/UA
//!
//! Renders well-formed XHTML with a small CSS subset into paginated PDF.
//!
//! # Architecture
//!
//! - `html`: XHTML parsing into a simple DOM
//! - `style`: CSS-lite cascade and computed styles
//! - `blocks`: DOM flattening into paragraphs, headings and figures
//! - `layout`: line breaking and pagination
//! - `fonts` / `truetype`: font registration, shaping and embedding
//! - `svg`: basic inline SVG shapes
//! - `objects` / `writer` / `content`: PDF file syntax
//! - `conformance` / `xmp` / `icc` / `structure`: PDF/A and PDF/UA pieces
//! - `builder` / `renderer`: the public entry point
//!
//! ```no_run
//! use pdf_engine::{PdfRendererBuilder, SvgHandling};
//!
//! let mut pdf = Vec::new();
//! let mut builder = PdfRendererBuilder::new();
//! builder
//!     .with_html_content("<html><body><p>Hello</p></body></html>", None)
//!     .use_svg_drawer(SvgHandling::Vector)
//!     .to_stream(&mut pdf);
//! let mut renderer = builder.build_pdf_renderer()?;
//! renderer.create_pdf()?;
//! # Ok::<(), pdf_engine::EngineError>(())
//! ```

mod blocks;
mod builder;
pub mod conformance;
mod content;
mod document;
mod error;
mod fonts;
mod html;
pub mod icc;
mod layout;
mod objects;
mod options;
mod renderer;
mod structure;
mod style;
mod svg;
mod truetype;
mod writer;
mod xmp;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use builder::PdfRendererBuilder;
pub use conformance::{ConformanceValue, PdfAConformance};
pub use document::{PageSize, PdfVersion};
pub use error::{EngineError, Result};
pub use fonts::{FontResolver, FontSource, FontStyle, StandardFont};
pub use options::RenderOptions;
pub use renderer::PdfRenderer;
pub use style::TextDirection;
pub use svg::SvgHandling;
pub use xmp::{PDFA_ID_NAMESPACE, PDFUA_ID_NAMESPACE};

#[cfg(test)]
mod tests;
