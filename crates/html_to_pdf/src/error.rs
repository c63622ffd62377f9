//! Error type for PDF generation
//!
//! Every failure a caller can see is a [`GenerationError`]. The [`ErrorKind`]
//! tells configuration, font and rendering failures apart without matching
//! on message text; engine failures keep the engine error as their source.

use std::error::Error as StdError;
use thiserror::Error;

/// What went wrong during a generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input was absent
    Configuration,
    /// No font map was supplied
    MissingFontMap,
    /// The HTML asks for a font the font map cannot provide
    FontValidation,
    /// The rendering engine failed to build or write the document
    Rendering,
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct GenerationError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl GenerationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn missing_font_map() -> Self {
        Self::new(ErrorKind::MissingFontMap, "Font map must not be null")
    }

    pub fn font_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FontValidation, message)
    }

    /// Wrap an engine failure, keeping its text as the message
    pub fn rendering<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind: ErrorKind::Rendering,
            message: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    pub fn is_missing_font_map(&self) -> bool {
        self.kind == ErrorKind::MissingFontMap
    }

    pub fn is_font_validation(&self) -> bool {
        self.kind == ErrorKind::FontValidation
    }

    pub fn is_rendering(&self) -> bool {
        self.kind == ErrorKind::Rendering
    }
}

impl From<pdf_engine::EngineError> for GenerationError {
    fn from(err: pdf_engine::EngineError) -> Self {
        Self::rendering(err)
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_engine::EngineError;

    #[test]
    fn test_display_is_the_message() {
        let err = GenerationError::configuration("Conformance level must not be null");
        assert_eq!(err.to_string(), "Conformance level must not be null");
        assert!(err.is_configuration());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_rendering_keeps_the_cause() {
        let err: GenerationError = EngineError::InvalidColorProfile("too short".into()).into();
        assert_eq!(err.kind(), ErrorKind::Rendering);
        assert_eq!(err.message(), "Invalid ICC Profile Data: too short");

        let cause = err.source().expect("cause is kept");
        let engine = cause.downcast_ref::<EngineError>().expect("engine error");
        assert!(matches!(engine, EngineError::InvalidColorProfile(_)));
    }

    #[test]
    fn test_missing_font_map() {
        let err = GenerationError::missing_font_map();
        assert!(err.is_missing_font_map());
        assert!(!err.is_rendering());
        assert_eq!(err.message(), "Font map must not be null");
    }
}
