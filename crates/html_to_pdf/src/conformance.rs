//! Conformance levels
//!
//! A [`PdfConformanceLevel`] is chosen per call. [`apply`] turns it into the
//! single configuration action the engine needs: a PDF/A identifier, the
//! PDF/UA accessibility switch, or nothing at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pdf_engine::{PdfAConformance, PdfRendererBuilder};

use crate::error::GenerationError;

/// Conformance a generated document must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PdfConformanceLevel {
    None,
    #[serde(rename = "PDFA_1_A")]
    PdfA1A,
    #[serde(rename = "PDFA_1_B")]
    PdfA1B,
    #[serde(rename = "PDFA_2_A")]
    PdfA2A,
    #[serde(rename = "PDFA_2_B")]
    PdfA2B,
    #[serde(rename = "PDFA_2_U")]
    PdfA2U,
    #[serde(rename = "PDFA_3_A")]
    PdfA3A,
    #[serde(rename = "PDFA_3_B")]
    PdfA3B,
    #[serde(rename = "PDFA_3_U")]
    PdfA3U,
    #[serde(rename = "PDF_UA")]
    PdfUa,
}

impl PdfConformanceLevel {
    pub const ALL: [PdfConformanceLevel; 10] = [
        PdfConformanceLevel::None,
        PdfConformanceLevel::PdfA1A,
        PdfConformanceLevel::PdfA1B,
        PdfConformanceLevel::PdfA2A,
        PdfConformanceLevel::PdfA2B,
        PdfConformanceLevel::PdfA2U,
        PdfConformanceLevel::PdfA3A,
        PdfConformanceLevel::PdfA3B,
        PdfConformanceLevel::PdfA3U,
        PdfConformanceLevel::PdfUa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PdfConformanceLevel::None => "NONE",
            PdfConformanceLevel::PdfA1A => "PDFA_1_A",
            PdfConformanceLevel::PdfA1B => "PDFA_1_B",
            PdfConformanceLevel::PdfA2A => "PDFA_2_A",
            PdfConformanceLevel::PdfA2B => "PDFA_2_B",
            PdfConformanceLevel::PdfA2U => "PDFA_2_U",
            PdfConformanceLevel::PdfA3A => "PDFA_3_A",
            PdfConformanceLevel::PdfA3B => "PDFA_3_B",
            PdfConformanceLevel::PdfA3U => "PDFA_3_U",
            PdfConformanceLevel::PdfUa => "PDF_UA",
        }
    }

    /// The engine's PDF/A identifier with the same part and level
    pub fn pdfa(&self) -> Option<PdfAConformance> {
        match self {
            PdfConformanceLevel::PdfA1A => Some(PdfAConformance::PdfA1A),
            PdfConformanceLevel::PdfA1B => Some(PdfAConformance::PdfA1B),
            PdfConformanceLevel::PdfA2A => Some(PdfAConformance::PdfA2A),
            PdfConformanceLevel::PdfA2B => Some(PdfAConformance::PdfA2B),
            PdfConformanceLevel::PdfA2U => Some(PdfAConformance::PdfA2U),
            PdfConformanceLevel::PdfA3A => Some(PdfAConformance::PdfA3A),
            PdfConformanceLevel::PdfA3B => Some(PdfAConformance::PdfA3B),
            PdfConformanceLevel::PdfA3U => Some(PdfAConformance::PdfA3U),
            PdfConformanceLevel::None | PdfConformanceLevel::PdfUa => None,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == PdfConformanceLevel::None
    }

    pub fn is_pdfua(&self) -> bool {
        *self == PdfConformanceLevel::PdfUa
    }

    /// Every level except `None` needs all requested fonts to be embeddable
    pub fn requires_font_validation(&self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for PdfConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfConformanceLevel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| GenerationError::configuration(format!("Unknown conformance level: {}", s)))
    }
}

/// The configuration surface conformance is applied to
pub trait ConformanceTarget {
    fn use_pdfa_conformance(&mut self, conformance: PdfAConformance);
    fn use_pdfua_accessibility(&mut self, enabled: bool);
}

impl ConformanceTarget for PdfRendererBuilder<'_> {
    fn use_pdfa_conformance(&mut self, conformance: PdfAConformance) {
        PdfRendererBuilder::use_pdfa_conformance(self, conformance);
    }

    fn use_pdfua_accessibility(&mut self, enabled: bool) {
        PdfRendererBuilder::use_pdfua_accessibility(self, enabled);
    }
}

/// Configure `target` for `level`. PDF/A and PDF/UA never both apply.
pub fn apply<T: ConformanceTarget + ?Sized>(target: &mut T, level: PdfConformanceLevel) {
    match level {
        PdfConformanceLevel::None => {
            tracing::info!("no conformance level applied");
        }
        PdfConformanceLevel::PdfUa => {
            tracing::info!(level = %level, "applying conformance level PDF_UA");
            target.use_pdfua_accessibility(true);
        }
        PdfConformanceLevel::PdfA1A
        | PdfConformanceLevel::PdfA1B
        | PdfConformanceLevel::PdfA2A
        | PdfConformanceLevel::PdfA2B
        | PdfConformanceLevel::PdfA2U
        | PdfConformanceLevel::PdfA3A
        | PdfConformanceLevel::PdfA3B
        | PdfConformanceLevel::PdfA3U => {
            if let Some(conformance) = level.pdfa() {
                tracing::info!(level = %level, "applying conformance level {}", level);
                target.use_pdfa_conformance(conformance);
            }
        }
    }
}
