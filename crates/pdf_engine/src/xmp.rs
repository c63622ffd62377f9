//! XMP metadata packets
//!
//! The catalog `/Metadata` stream carries an XMP packet. For PDF/A it holds
//! the `pdfaid` identification schema, for PDF/UA the `pdfuaid` schema. A
//! document rendered without any conformance gets no packet at all.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::conformance::PdfAConformance;
use super::document::{xmp_date, DocumentInfo};
use super::objects::{PdfDictionary, PdfObject, PdfStream};

/// Namespace of the PDF/A identification schema
pub const PDFA_ID_NAMESPACE: &str = "http://www.aiim.org/pdfa/ns/id/";
/// Namespace of the PDF/UA identification schema
pub const PDFUA_ID_NAMESPACE: &str = "http://www.aiim.org/pdfua/ns/id/";

/// Which identification schema the packet carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identification {
    PdfA(PdfAConformance),
    /// PDF/UA-1
    PdfUa,
}

/// XMP metadata for one document
#[derive(Debug, Clone)]
pub struct XmpMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub creator_tool: Option<String>,
    pub producer: Option<String>,
    pub created: DateTime<Utc>,
    pub identification: Identification,
    pub document_id: Uuid,
    pub instance_id: Uuid,
}

impl XmpMetadata {
    pub fn new(info: &DocumentInfo, identification: Identification) -> Self {
        Self {
            title: info.title.clone(),
            creator: info.author.clone(),
            description: info.subject.clone(),
            language: info.language.clone(),
            creator_tool: info.creator.clone(),
            producer: info.producer.clone(),
            created: info.created.unwrap_or_else(Utc::now),
            identification,
            document_id: Uuid::new_v4(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Serialize the packet
    pub fn generate(&self) -> Vec<u8> {
        let lang = self.language.as_deref().unwrap_or("x-default");
        let date = xmp_date(&self.created);
        let mut xmp = String::new();

        xmp.push_str("<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n");
        xmp.push_str("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n");
        xmp.push_str("<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n");

        xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n");
        xmp.push_str("<dc:format>application/pdf</dc:format>\n");
        if let Some(title) = &self.title {
            xmp.push_str(&format!(
                "<dc:title><rdf:Alt><rdf:li xml:lang=\"x-default\">{}</rdf:li></rdf:Alt></dc:title>\n",
                escape_xml(title)
            ));
        }
        if let Some(creator) = &self.creator {
            xmp.push_str(&format!(
                "<dc:creator><rdf:Seq><rdf:li>{}</rdf:li></rdf:Seq></dc:creator>\n",
                escape_xml(creator)
            ));
        }
        if let Some(description) = &self.description {
            xmp.push_str(&format!(
                "<dc:description><rdf:Alt><rdf:li xml:lang=\"{}\">{}</rdf:li></rdf:Alt></dc:description>\n",
                escape_xml(lang),
                escape_xml(description)
            ));
        }
        if let Some(language) = &self.language {
            xmp.push_str(&format!(
                "<dc:language><rdf:Bag><rdf:li>{}</rdf:li></rdf:Bag></dc:language>\n",
                escape_xml(language)
            ));
        }
        xmp.push_str("</rdf:Description>\n");

        xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:xmp=\"http://ns.adobe.com/xap/1.0/\">\n");
        if let Some(tool) = &self.creator_tool {
            xmp.push_str(&format!("<xmp:CreatorTool>{}</xmp:CreatorTool>\n", escape_xml(tool)));
        }
        xmp.push_str(&format!("<xmp:CreateDate>{}</xmp:CreateDate>\n", date));
        xmp.push_str(&format!("<xmp:ModifyDate>{}</xmp:ModifyDate>\n", date));
        xmp.push_str(&format!("<xmp:MetadataDate>{}</xmp:MetadataDate>\n", date));
        xmp.push_str("</rdf:Description>\n");

        if let Some(producer) = &self.producer {
            xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:pdf=\"http://ns.adobe.com/pdf/1.3/\">\n");
            xmp.push_str(&format!("<pdf:Producer>{}</pdf:Producer>\n", escape_xml(producer)));
            xmp.push_str("</rdf:Description>\n");
        }

        xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:xmpMM=\"http://ns.adobe.com/xap/1.0/mm/\">\n");
        xmp.push_str(&format!("<xmpMM:DocumentID>uuid:{}</xmpMM:DocumentID>\n", self.document_id));
        xmp.push_str(&format!("<xmpMM:InstanceID>uuid:{}</xmpMM:InstanceID>\n", self.instance_id));
        xmp.push_str("</rdf:Description>\n");

        match self.identification {
            Identification::PdfA(conformance) => {
                xmp.push_str(&format!(
                    "<rdf:Description rdf:about=\"\" xmlns:pdfaid=\"{}\">\n",
                    PDFA_ID_NAMESPACE
                ));
                xmp.push_str(&format!("<pdfaid:part>{}</pdfaid:part>\n", conformance.part()));
                xmp.push_str(&format!(
                    "<pdfaid:conformance>{}</pdfaid:conformance>\n",
                    conformance.conformance_value().as_str()
                ));
                xmp.push_str("</rdf:Description>\n");
            }
            Identification::PdfUa => {
                xmp.push_str(&format!(
                    "<rdf:Description rdf:about=\"\" xmlns:pdfuaid=\"{}\">\n",
                    PDFUA_ID_NAMESPACE
                ));
                xmp.push_str("<pdfuaid:part>1</pdfuaid:part>\n");
                xmp.push_str("</rdf:Description>\n");
            }
        }

        xmp.push_str("</rdf:RDF>\n");
        xmp.push_str("</x:xmpmeta>\n");

        // Padding for in-place updates
        for _ in 0..20 {
            xmp.push_str(&" ".repeat(80));
            xmp.push('\n');
        }
        xmp.push_str("<?xpacket end=\"w\"?>");

        xmp.into_bytes()
    }

    /// The `/Metadata` stream; XMP is never compressed
    pub fn to_stream(&self) -> PdfStream {
        let dict = PdfDictionary::typed("Metadata").with("Subtype", PdfObject::name("XML"));
        PdfStream::new(self.generate()).with_dict(dict).uncompressed()
    }
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: Some("Claim <draft>".to_string()),
            author: Some("Case Worker".to_string()),
            producer: Some("pdf_engine".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_pdfa_identification() {
        let xmp = XmpMetadata::new(&info(), Identification::PdfA(PdfAConformance::PdfA2U));
        let text = String::from_utf8(xmp.generate()).unwrap();

        assert!(text.contains("<pdfaid:part>2</pdfaid:part>"));
        assert!(text.contains("<pdfaid:conformance>U</pdfaid:conformance>"));
        assert!(!text.contains("pdfuaid"));
        assert!(text.contains("Claim &lt;draft&gt;"));
        assert!(text.starts_with("<?xpacket begin="));
        assert!(text.ends_with("<?xpacket end=\"w\"?>"));
    }

    #[test]
    fn test_pdfua_identification() {
        let xmp = XmpMetadata::new(&info(), Identification::PdfUa);
        let text = String::from_utf8(xmp.generate()).unwrap();

        assert!(text.contains(PDFUA_ID_NAMESPACE));
        assert!(text.contains("<pdfuaid:part>1</pdfuaid:part>"));
        assert!(!text.contains("pdfaid:part"));
    }

    #[test]
    fn test_metadata_stream_is_not_compressed() {
        let stream = XmpMetadata::new(&info(), Identification::PdfUa).to_stream();
        assert!(stream.never_compress);
        assert!(stream.dict.contains_key("Subtype"));
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("\"q\""), "&quot;q&quot;");
    }
}
