//! PDF Document Structure
//!
//! Document-level pieces that are independent of page content:
//! - PDF version
//! - Page size
//! - Info dictionary
//! - Catalog and page tree dictionaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::objects::{PdfDictionary, PdfObject};

/// PDF version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PdfVersion {
    /// PDF 1.4 (required by PDF/A-1)
    #[default]
    V1_4,
    /// PDF 1.7 (ISO 32000-1)
    V1_7,
}

impl PdfVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfVersion::V1_4 => "1.4",
            PdfVersion::V1_7 => "1.7",
        }
    }
}

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// A4 (210 x 297 mm)
    #[default]
    A4,
    /// US Letter (8.5 x 11 inches)
    Letter,
    /// Arbitrary width and height in points
    Custom { width: f64, height: f64 },
}

impl PageSize {
    pub fn width(&self) -> f64 {
        match self {
            PageSize::A4 => 595.0,
            PageSize::Letter => 612.0,
            PageSize::Custom { width, .. } => *width,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            PageSize::A4 => 842.0,
            PageSize::Letter => 792.0,
            PageSize::Custom { height, .. } => *height,
        }
    }

    /// The `/MediaBox` array
    pub fn media_box(&self) -> PdfObject {
        PdfObject::reals(&[0.0, 0.0, self.width(), self.height()])
    }
}

/// Document information, written to the Info dictionary and to XMP
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Document language (BCP 47), taken from `<html lang>`
    pub language: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl DocumentInfo {
    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();

        if let Some(ref title) = self.title {
            dict.insert("Title", PdfObject::text(title));
        }
        if let Some(ref author) = self.author {
            dict.insert("Author", PdfObject::text(author));
        }
        if let Some(ref subject) = self.subject {
            dict.insert("Subject", PdfObject::text(subject));
        }
        if !self.keywords.is_empty() {
            dict.insert("Keywords", PdfObject::text(&self.keywords.join(", ")));
        }
        if let Some(ref creator) = self.creator {
            dict.insert("Creator", PdfObject::text(creator));
        }
        if let Some(ref producer) = self.producer {
            dict.insert("Producer", PdfObject::text(producer));
        }
        if let Some(created) = self.created {
            let date = pdf_date(&created);
            dict.insert("CreationDate", PdfObject::text(&date));
            dict.insert("ModDate", PdfObject::text(&date));
        }

        dict
    }
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSS+00'00'`)
pub fn pdf_date(time: &DateTime<Utc>) -> String {
    format!("D:{}+00'00'", time.format("%Y%m%d%H%M%S"))
}

/// Format a timestamp as an XMP date (ISO 8601)
pub fn xmp_date(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Create a catalog dictionary
pub fn create_catalog(pages_ref: u32) -> PdfDictionary {
    PdfDictionary::typed("Catalog").with("Pages", PdfObject::Reference(pages_ref))
}

/// Create the page tree root
pub fn create_pages(page_refs: &[u32]) -> PdfDictionary {
    let kids = page_refs.iter().map(|&r| PdfObject::Reference(r)).collect::<Vec<_>>();
    PdfDictionary::typed("Pages")
        .with("Kids", PdfObject::Array(kids))
        .with("Count", page_refs.len().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_page_sizes() {
        assert_eq!(PageSize::A4.width(), 595.0);
        assert_eq!(PageSize::Letter.height(), 792.0);
        let custom = PageSize::Custom { width: 200.0, height: 300.0 };
        assert_eq!(custom.height(), 300.0);
    }

    #[test]
    fn test_document_info_dictionary() {
        let info = DocumentInfo {
            title: Some("Report".to_string()),
            producer: Some("pdf_engine".to_string()),
            created: Some(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()),
            ..Default::default()
        };

        let dict = info.to_dictionary();
        assert!(dict.contains_key("Title"));
        assert!(dict.contains_key("Producer"));
        assert!(dict.contains_key("CreationDate"));
        assert!(!dict.contains_key("Author"));
    }

    #[test]
    fn test_date_formats() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(pdf_date(&time), "D:20240309140500+00'00'");
        assert_eq!(xmp_date(&time), "2024-03-09T14:05:00Z");
    }

    #[test]
    fn test_create_pages() {
        let pages = create_pages(&[3, 4, 5]);
        assert!(matches!(pages.get("Count"), Some(PdfObject::Integer(3))));
        assert!(create_catalog(2).contains_key("Pages"));
    }
}
