//! PDF/A conformance identifiers
//!
//! PDF/A (ISO 19005) is identified by a part number and a conformance level:
//!
//! - Part 1 (ISO 19005-1, PDF 1.4 based), levels A and B
//! - Part 2 (ISO 19005-2, PDF 1.7 based), levels A, B and U
//! - Part 3 (ISO 19005-3, PDF 1.7 based), levels A, B and U
//!
//! Level B guarantees visual fidelity, level U adds Unicode mapping for all
//! text and level A additionally requires a tagged logical structure.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::PdfVersion;

/// A PDF/A part and level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PdfAConformance {
    #[serde(rename = "1a")]
    PdfA1A,
    #[serde(rename = "1b")]
    PdfA1B,
    #[serde(rename = "2a")]
    PdfA2A,
    #[serde(rename = "2b")]
    PdfA2B,
    #[serde(rename = "2u")]
    PdfA2U,
    #[serde(rename = "3a")]
    PdfA3A,
    #[serde(rename = "3b")]
    PdfA3B,
    #[serde(rename = "3u")]
    PdfA3U,
}

/// Conformance level letter within a PDF/A part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConformanceValue {
    A,
    B,
    U,
}

impl ConformanceValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConformanceValue::A => "A",
            ConformanceValue::B => "B",
            ConformanceValue::U => "U",
        }
    }
}

impl PdfAConformance {
    pub const ALL: [PdfAConformance; 8] = [
        PdfAConformance::PdfA1A,
        PdfAConformance::PdfA1B,
        PdfAConformance::PdfA2A,
        PdfAConformance::PdfA2B,
        PdfAConformance::PdfA2U,
        PdfAConformance::PdfA3A,
        PdfAConformance::PdfA3B,
        PdfAConformance::PdfA3U,
    ];

    /// The `pdfaid:part` value
    pub fn part(&self) -> u8 {
        match self {
            PdfAConformance::PdfA1A | PdfAConformance::PdfA1B => 1,
            PdfAConformance::PdfA2A | PdfAConformance::PdfA2B | PdfAConformance::PdfA2U => 2,
            PdfAConformance::PdfA3A | PdfAConformance::PdfA3B | PdfAConformance::PdfA3U => 3,
        }
    }

    /// The `pdfaid:conformance` value
    pub fn conformance_value(&self) -> ConformanceValue {
        match self {
            PdfAConformance::PdfA1A | PdfAConformance::PdfA2A | PdfAConformance::PdfA3A => {
                ConformanceValue::A
            }
            PdfAConformance::PdfA1B | PdfAConformance::PdfA2B | PdfAConformance::PdfA3B => {
                ConformanceValue::B
            }
            PdfAConformance::PdfA2U | PdfAConformance::PdfA3U => ConformanceValue::U,
        }
    }

    /// Look up the identifier for a part and level
    pub fn from_parts(part: u8, value: ConformanceValue) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.part() == part && c.conformance_value() == value)
    }

    /// Part 1 is based on PDF 1.4, later parts on PDF 1.7
    pub fn required_pdf_version(&self) -> PdfVersion {
        if self.part() == 1 {
            PdfVersion::V1_4
        } else {
            PdfVersion::V1_7
        }
    }

    /// Level A requires a tagged structure tree
    pub fn requires_structure(&self) -> bool {
        self.conformance_value() == ConformanceValue::A
    }
}

impl fmt::Display for PdfAConformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PDF/A-{}{}",
            self.part(),
            self.conformance_value().as_str().to_lowercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_and_levels() {
        assert_eq!(PdfAConformance::PdfA1A.part(), 1);
        assert_eq!(PdfAConformance::PdfA1A.conformance_value(), ConformanceValue::A);
        assert_eq!(PdfAConformance::PdfA2U.part(), 2);
        assert_eq!(PdfAConformance::PdfA2U.conformance_value(), ConformanceValue::U);
        assert_eq!(PdfAConformance::PdfA3B.part(), 3);
        assert_eq!(PdfAConformance::PdfA3B.conformance_value(), ConformanceValue::B);
    }

    #[test]
    fn test_from_parts_round_trips_every_identifier() {
        for conformance in PdfAConformance::ALL {
            let found =
                PdfAConformance::from_parts(conformance.part(), conformance.conformance_value());
            assert_eq!(found, Some(conformance));
        }
        assert_eq!(PdfAConformance::from_parts(1, ConformanceValue::U), None);
    }

    #[test]
    fn test_versions_and_structure() {
        assert_eq!(PdfAConformance::PdfA1B.required_pdf_version(), PdfVersion::V1_4);
        assert_eq!(PdfAConformance::PdfA3U.required_pdf_version(), PdfVersion::V1_7);
        assert!(PdfAConformance::PdfA2A.requires_structure());
        assert!(!PdfAConformance::PdfA2B.requires_structure());
    }

    #[test]
    fn test_display() {
        assert_eq!(PdfAConformance::PdfA1B.to_string(), "PDF/A-1b");
        assert_eq!(PdfAConformance::PdfA3U.to_string(), "PDF/A-3u");
    }
}
