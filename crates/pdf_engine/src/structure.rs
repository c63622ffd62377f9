//! Logical structure for tagged PDF
//!
//! Every block drawn on a page gets one structure element under a single
//! `Document` root. Content is linked to its element through marked-content
//! ids (MCIDs), numbered per page, and the parent tree maps each page's MCIDs
//! back to their elements.

use std::collections::HashMap;
use std::io::Write;

use crate::blocks::BlockRole;
use crate::error::Result;
use crate::objects::{PdfDictionary, PdfObject};
use crate::writer::PdfWriter;

#[derive(Debug, Clone)]
struct StructElement {
    role: BlockRole,
    alt: Option<String>,
    /// (page index, mcid)
    marks: Vec<(usize, u32)>,
}

/// Collects marked content while pages are drawn
#[derive(Debug, Clone, Default)]
pub struct StructureTree {
    elements: Vec<StructElement>,
    by_block: HashMap<usize, usize>,
    /// Element index of every mcid, per page
    page_marks: Vec<Vec<usize>>,
    language: Option<String>,
}

impl StructureTree {
    pub fn new(page_count: usize, language: Option<String>) -> Self {
        Self {
            page_marks: vec![Vec::new(); page_count],
            language,
            ..Default::default()
        }
    }

    /// Allocate the next mcid on `page` for content of `block`
    pub fn mark(&mut self, page: usize, block: usize, role: BlockRole, alt: Option<&str>) -> u32 {
        let element = match self.by_block.get(&block) {
            Some(&element) => element,
            None => {
                self.elements.push(StructElement {
                    role,
                    alt: alt.map(str::to_string),
                    marks: Vec::new(),
                });
                let element = self.elements.len() - 1;
                self.by_block.insert(block, element);
                element
            }
        };

        let marks = &mut self.page_marks[page];
        let mcid = marks.len() as u32;
        marks.push(element);
        self.elements[element].marks.push((page, mcid));
        mcid
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Write the tree and return the `/StructTreeRoot` reference
    pub fn write<W: Write>(&self, writer: &mut PdfWriter<W>, page_refs: &[u32]) -> Result<u32> {
        let root_ref = writer.allocate_object();
        let document_ref = writer.allocate_object();
        let parent_tree_ref = writer.allocate_object();
        let element_refs: Vec<u32> = self.elements.iter().map(|_| writer.allocate_object()).collect();

        for (element, &element_ref) in self.elements.iter().zip(&element_refs) {
            let kids = element
                .marks
                .iter()
                .map(|&(page, mcid)| {
                    PdfDictionary::typed("MCR")
                        .with("Pg", PdfObject::Reference(page_refs[page]))
                        .with("MCID", PdfObject::Integer(mcid as i64))
                        .into()
                })
                .collect::<Vec<PdfObject>>();

            let mut dict = PdfDictionary::typed("StructElem")
                .with("S", PdfObject::name(element.role.structure_type()))
                .with("P", PdfObject::Reference(document_ref))
                .with("K", PdfObject::Array(kids));
            if let Some(&(page, _)) = element.marks.first() {
                dict.insert("Pg", PdfObject::Reference(page_refs[page]));
            }
            if let Some(alt) = &element.alt {
                dict.insert("Alt", PdfObject::text(alt));
            }
            writer.write_object(element_ref, &dict.into())?;
        }

        let mut document = PdfDictionary::typed("StructElem")
            .with("S", PdfObject::name("Document"))
            .with("P", PdfObject::Reference(root_ref))
            .with(
                "K",
                PdfObject::Array(element_refs.iter().map(|&r| PdfObject::Reference(r)).collect()),
            );
        if let Some(language) = &self.language {
            document.insert("Lang", PdfObject::text(language));
        }
        writer.write_object(document_ref, &document.into())?;

        let mut nums = Vec::with_capacity(self.page_marks.len() * 2);
        for (page, marks) in self.page_marks.iter().enumerate() {
            nums.push(PdfObject::Integer(page as i64));
            nums.push(PdfObject::Array(
                marks.iter().map(|&e| PdfObject::Reference(element_refs[e])).collect(),
            ));
        }
        let parent_tree = PdfDictionary::new().with("Nums", PdfObject::Array(nums));
        writer.write_object(parent_tree_ref, &parent_tree.into())?;

        let root = PdfDictionary::typed("StructTreeRoot")
            .with("K", PdfObject::Reference(document_ref))
            .with("ParentTree", PdfObject::Reference(parent_tree_ref))
            .with("ParentTreeNextKey", self.page_marks.len().into());
        writer.write_object(root_ref, &root.into())?;

        Ok(root_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PdfVersion;

    #[test]
    fn test_mcids_are_numbered_per_page() {
        let mut tree = StructureTree::new(2, None);
        assert_eq!(tree.mark(0, 0, BlockRole::Heading(1), None), 0);
        assert_eq!(tree.mark(0, 1, BlockRole::Paragraph, None), 1);
        assert_eq!(tree.mark(1, 1, BlockRole::Paragraph, None), 0);
        assert_eq!(tree.mark(1, 2, BlockRole::Figure, Some("chart")), 1);
        assert_eq!(tree.element_count(), 3);
    }

    #[test]
    fn test_written_tree() {
        let mut tree = StructureTree::new(1, Some("en".to_string()));
        tree.mark(0, 0, BlockRole::Figure, Some("chart"));

        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer, PdfVersion::V1_7);
        writer.set_compression(false);
        let page = writer.allocate_object();
        let root = tree.write(&mut writer, &[page]).unwrap();
        writer.finish().unwrap();

        let output = String::from_utf8_lossy(&buffer);
        assert_eq!(root, 2);
        assert!(output.contains("/S /Figure"));
        assert!(output.contains("/Alt (chart)"));
        assert!(output.contains("/S /Document"));
        assert!(output.contains("/Nums [0 [5 0 R]]"));
        assert!(output.contains("/ParentTreeNextKey 1"));
    }
}
