//! PDF Renderer
//!
//! Turns a parsed document into a PDF file on the configured output stream:
//!
//! 1. Style the DOM and flatten it into blocks
//! 2. Lay the blocks out onto pages, resolving and shaping fonts
//! 3. Draw every page into a content stream, marking content for tagged output
//! 4. Write fonts, structure tree, metadata, output intent, catalog and trailer

use chrono::Utc;
use std::io::Write;
use uuid::Uuid;

use crate::blocks::{build_blocks, BlockContent, BlockDocument};
use crate::conformance::PdfAConformance;
use crate::content::ContentStream;
use crate::document::{create_catalog, create_pages, DocumentInfo, PdfVersion};
use crate::error::Result;
use crate::fonts::{EncodedText, FontHandle, FontResolver};
use crate::html::Element;
use crate::icc::IccProfile;
use crate::layout::{layout, Page, PageGeometry, PageItem};
use crate::objects::{PdfDictionary, PdfObject, PdfStream, PdfString};
use crate::options::RenderOptions;
use crate::structure::StructureTree;
use crate::truetype::FontObjectRefs;
use crate::writer::PdfWriter;
use crate::xmp::{Identification, XmpMetadata};

/// A configured rendering of one document
pub struct PdfRenderer<'a> {
    pub(crate) document: Element,
    pub(crate) base_uri: Option<String>,
    pub(crate) options: RenderOptions,
    pub(crate) color_profile: Option<IccProfile<'a>>,
    pub(crate) pdfa: Option<PdfAConformance>,
    pub(crate) pdfua: bool,
    pub(crate) output: &'a mut dyn Write,
    pub(crate) fonts: FontResolver<'a>,
}

impl<'a> PdfRenderer<'a> {
    /// Fonts registered here are available to the document's `font-family` rules
    pub fn font_resolver_mut(&mut self) -> &mut FontResolver<'a> {
        &mut self.fonts
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn is_tagged(&self) -> bool {
        self.pdfua || self.pdfa.map_or(false, |level| level.requires_structure())
    }

    fn version(&self) -> PdfVersion {
        self.pdfa
            .map(|level| level.required_pdf_version())
            .unwrap_or(PdfVersion::V1_7)
    }

    /// Lay out the document and write the PDF to the output stream
    pub fn create_pdf(&mut self) -> Result<()> {
        self.fonts.set_fast_mode(self.options.fast_mode);
        self.fonts.set_prefer_embedded(self.pdfa.is_some() || self.pdfua);
        if let Some(base_uri) = &self.base_uri {
            tracing::debug!(base_uri = %base_uri, "rendering document");
        }

        let doc = build_blocks(
            &self.document,
            self.options.text_direction,
            self.options.font_size,
            self.options.svg,
        );
        let geometry = PageGeometry {
            size: doc.stylesheet.page.size.unwrap_or(self.options.page_size),
            margin: doc.stylesheet.page.margin.unwrap_or(self.options.margin),
        };
        let pages = layout(&doc.blocks, geometry, &mut self.fonts)?;

        let mut info = doc.info.clone();
        info.producer = Some(self.options.producer.clone());
        info.creator = self.options.creator.clone();
        info.created = Some(Utc::now());
        if self.pdfua && info.title.is_none() {
            tracing::warn!("PDF/UA document has no <title>");
        }
        if self.pdfa.is_some() && self.color_profile.is_none() {
            tracing::warn!("PDF/A document written without an output intent colour profile");
        }

        let mut buffer = Vec::new();
        self.write_document(&mut buffer, &doc, &pages, geometry, &info)?;
        self.output.write_all(&buffer)?;
        self.output.flush()?;

        tracing::debug!(
            pages = pages.len(),
            bytes = buffer.len(),
            version = self.version().as_str(),
            tagged = self.is_tagged(),
            "pdf written"
        );
        Ok(())
    }

    fn write_document(
        &self,
        buffer: &mut Vec<u8>,
        doc: &BlockDocument,
        pages: &[Page],
        geometry: PageGeometry,
        info: &DocumentInfo,
    ) -> Result<()> {
        let mut writer = PdfWriter::new(buffer, self.version());
        writer.set_compression(self.options.compress);
        writer.write_header()?;

        let catalog_ref = writer.allocate_object();
        let pages_ref = writer.allocate_object();
        let page_refs: Vec<u32> = pages.iter().map(|_| writer.allocate_object()).collect();

        // Fonts
        let mut font_resources = PdfDictionary::new();
        for &font in self.fonts.used_fonts() {
            let font_ref = write_font(&mut writer, &self.fonts, font)?;
            font_resources.insert(self.fonts.resource_name(font), PdfObject::Reference(font_ref));
        }
        let resources = PdfDictionary::new().with("Font", font_resources.into());

        // Pages
        let tagged = self.is_tagged();
        let mut structure = StructureTree::new(pages.len(), info.language.clone());
        for (index, page) in pages.iter().enumerate() {
            let content = self.draw_page(index, page, doc, tagged.then_some(&mut structure));
            let content_ref = writer.allocate_object();
            writer.write_stream_object(content_ref, PdfStream::new(content.into_bytes()))?;

            let mut page_dict = PdfDictionary::typed("Page")
                .with("Parent", PdfObject::Reference(pages_ref))
                .with("MediaBox", geometry.size.media_box())
                .with("Resources", resources.clone().into())
                .with("Contents", PdfObject::Reference(content_ref));
            if tagged {
                page_dict.insert("StructParents", index.into());
                page_dict.insert("Tabs", PdfObject::name("S"));
            }
            writer.write_object(page_refs[index], &page_dict.into())?;
        }
        writer.write_object(pages_ref, &create_pages(&page_refs).into())?;

        let mut catalog = create_catalog(pages_ref);

        if tagged {
            let root_ref = structure.write(&mut writer, &page_refs)?;
            tracing::debug!(elements = structure.element_count(), "structure tree written");
            catalog.insert("StructTreeRoot", PdfObject::Reference(root_ref));
            catalog.insert(
                "MarkInfo",
                PdfDictionary::new().with("Marked", true.into()).into(),
            );
        }

        let identification = match self.pdfa {
            Some(level) => Some(Identification::PdfA(level)),
            None if self.pdfua => Some(Identification::PdfUa),
            None => None,
        };
        if let Some(identification) = identification {
            let metadata_ref = writer.allocate_object();
            let xmp = XmpMetadata::new(info, identification);
            writer.write_stream_object(metadata_ref, xmp.to_stream())?;
            catalog.insert("Metadata", PdfObject::Reference(metadata_ref));

            if let Some(profile) = &self.color_profile {
                let intent = write_output_intent(&mut writer, profile)?;
                catalog.insert("OutputIntents", PdfObject::Array(vec![PdfObject::Reference(intent)]));
            }
        }

        if let Some(language) = &info.language {
            catalog.insert("Lang", PdfObject::text(language));
        }
        if self.pdfua {
            catalog.insert(
                "ViewerPreferences",
                PdfDictionary::new().with("DisplayDocTitle", true.into()).into(),
            );
        }
        writer.write_object(catalog_ref, &catalog.into())?;

        let info_ref = writer.allocate_object();
        writer.write_object(info_ref, &info.to_dictionary().into())?;

        let file_id = Uuid::new_v4();
        writer.write_xref_and_trailer(catalog_ref, Some(info_ref), file_id.as_bytes())?;
        writer.finish()?;
        Ok(())
    }

    fn draw_page(
        &self,
        index: usize,
        page: &Page,
        doc: &BlockDocument,
        mut structure: Option<&mut StructureTree>,
    ) -> ContentStream {
        let mut content = ContentStream::new();

        for item in &page.items {
            let block = &doc.blocks[item.block()];
            if let Some(tree) = structure.as_deref_mut() {
                let mcid = tree.mark(index, item.block(), block.role, block.alt());
                content.begin_marked_content(&block.role.structure_type(), mcid);
            }

            match item {
                PageItem::Line { spans, .. } => {
                    for span in spans {
                        content
                            .begin_text()
                            .set_fill_rgb(span.color.r, span.color.g, span.color.b)
                            .set_font(&self.fonts.resource_name(span.font), span.size)
                            .move_text(span.x, span.baseline);
                        match &span.encoded {
                            EncodedText::Glyphs(glyphs) => content.show_glyphs(glyphs),
                            EncodedText::Bytes(bytes) => content.show_text(bytes),
                        };
                        content.end_text();
                    }
                }
                PageItem::Figure { x, y, .. } => {
                    if let BlockContent::Figure(figure) = &block.content {
                        figure.draw(&mut content, *x, *y);
                    }
                }
            }

            if structure.is_some() {
                content.end_marked_content();
            }
        }
        content
    }
}

/// Write the objects of one used font and return the font dictionary reference
fn write_font<W: Write>(writer: &mut PdfWriter<W>, fonts: &FontResolver<'_>, font: FontHandle) -> Result<u32> {
    match font {
        FontHandle::Standard(standard) => {
            let font_ref = writer.allocate_object();
            writer.write_object(font_ref, &standard.font_dictionary().into())?;
            Ok(font_ref)
        }
        FontHandle::Embedded(index) => {
            let Some(embedded) = fonts.embedded_font(index) else {
                return Err(crate::error::EngineError::Layout(format!(
                    "font {} was used but never loaded",
                    index
                )));
            };
            let refs = FontObjectRefs {
                type0: writer.allocate_object(),
                cid_font: writer.allocate_object(),
                descriptor: writer.allocate_object(),
                font_file: writer.allocate_object(),
                to_unicode: writer.allocate_object(),
            };
            let objects = embedded.pdf_objects(refs);
            tracing::debug!(
                font = embedded.postscript_name(),
                glyphs = embedded.used_glyph_count(),
                "embedding font"
            );

            writer.write_object(refs.type0, &objects.type0.into())?;
            writer.write_object(refs.cid_font, &objects.cid_font.into())?;
            writer.write_object(refs.descriptor, &objects.descriptor.into())?;
            writer.write_stream_object(refs.font_file, objects.font_file)?;
            writer.write_stream_object(refs.to_unicode, objects.to_unicode)?;
            Ok(refs.type0)
        }
    }
}

/// Write the ICC stream and its PDF/A output intent
fn write_output_intent<W: Write>(writer: &mut PdfWriter<W>, profile: &IccProfile<'_>) -> Result<u32> {
    let icc_ref = writer.allocate_object();
    let intent_ref = writer.allocate_object();

    let icc = PdfStream::new(profile.data().to_vec())
        .with_dict(PdfDictionary::new().with("N", PdfObject::Integer(profile.components() as i64)));
    writer.write_stream_object(icc_ref, icc)?;

    let condition = profile.output_condition();
    let intent = PdfDictionary::typed("OutputIntent")
        .with("S", PdfObject::name("GTS_PDFA1"))
        .with("OutputConditionIdentifier", PdfObject::String(PdfString::ascii(condition)))
        .with("Info", PdfObject::String(PdfString::ascii(condition)))
        .with("DestOutputProfile", PdfObject::Reference(icc_ref));
    writer.write_object(intent_ref, &intent.into())?;

    Ok(intent_ref)
}
