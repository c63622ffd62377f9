//! Error types for the rendering engine

use std::io;
use thiserror::Error;

/// Errors raised while building a renderer or producing a PDF
#[derive(Debug, Error)]
pub enum EngineError {
    /// The HTML source is not well-formed XHTML
    #[error("Can't load the XML resource: {0}")]
    MalformedHtml(String),

    /// The colour profile bytes are not an ICC profile
    #[error("Invalid ICC Profile Data: {0}")]
    InvalidColorProfile(String),

    /// A registered font could not be parsed
    #[error("Invalid font data for font-family '{family}': {reason}")]
    InvalidFont { family: String, reason: String },

    /// No HTML content was configured on the builder
    #[error("No HTML content was supplied to the renderer")]
    MissingContent,

    /// No output stream was configured on the builder
    #[error("No output stream was configured for the renderer")]
    MissingOutput,

    /// Layout could not place content on a page
    #[error("Layout error: {0}")]
    Layout(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<quick_xml::Error> for EngineError {
    fn from(err: quick_xml::Error) -> Self {
        EngineError::MalformedHtml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for EngineError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        EngineError::MalformedHtml(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidColorProfile("missing 'acsp' signature".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid ICC Profile Data: missing 'acsp' signature"
        );

        let err = EngineError::MalformedHtml("unexpected end".to_string());
        assert!(err.to_string().starts_with("Can't load the XML resource"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: EngineError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
