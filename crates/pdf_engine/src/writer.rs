//! PDF Writer
//!
//! Low-level file structure: header, numbered indirect objects, the
//! cross-reference table and the trailer. Streams are Flate-compressed unless
//! compression is disabled or the stream opts out.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

use super::document::PdfVersion;
use super::error::Result;
use super::objects::{PdfDictionary, PdfObject, PdfSerializer, PdfStream, PdfString};

/// PDF file writer
pub struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    /// (object number, byte offset)
    offsets: Vec<(u32, u64)>,
    next_obj_num: u32,
    version: PdfVersion,
    compress: bool,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W, version: PdfVersion) -> Self {
        Self {
            writer,
            position: 0,
            offsets: Vec::new(),
            next_obj_num: 1,
            version,
            compress: true,
        }
    }

    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    /// Reserve the next object number
    pub fn allocate_object(&mut self) -> u32 {
        let num = self.next_obj_num;
        self.next_obj_num += 1;
        num
    }

    /// Header plus the binary marker comment PDF/A requires
    pub fn write_header(&mut self) -> Result<()> {
        let header = format!("%PDF-{}\n", self.version.as_str());
        self.write_bytes(header.as_bytes())?;
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])
    }

    pub fn write_object(&mut self, obj_num: u32, object: &PdfObject) -> Result<()> {
        self.offsets.push((obj_num, self.position));

        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(object)?;

        self.write_bytes(format!("{} 0 obj\n", obj_num).as_bytes())?;
        self.write_bytes(&serializer.into_inner())?;
        self.write_bytes(b"\nendobj\n")
    }

    pub fn write_stream_object(&mut self, obj_num: u32, mut stream: PdfStream) -> Result<()> {
        if self.compress && !stream.compressed && !stream.never_compress {
            stream = compress_stream(stream)?;
        }
        stream.dict.insert("Length", stream.data.len().into());
        self.write_object(obj_num, &PdfObject::Stream(stream))
    }

    /// Write the xref table and trailer. `file_id` becomes both halves of `/ID`.
    pub fn write_xref_and_trailer(
        &mut self,
        catalog_ref: u32,
        info_ref: Option<u32>,
        file_id: &[u8],
    ) -> Result<()> {
        let xref_offset = self.position;
        let mut offsets = self.offsets.clone();
        offsets.sort_by_key(|(num, _)| *num);

        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.next_obj_num);
        let mut expected = 1u32;
        for (num, offset) in offsets {
            while expected < num {
                xref.push_str("0000000000 65535 f \n");
                expected += 1;
            }
            xref.push_str(&format!("{:010} 00000 n \n", offset));
            expected = num + 1;
        }
        while expected < self.next_obj_num {
            xref.push_str("0000000000 65535 f \n");
            expected += 1;
        }
        self.write_bytes(xref.as_bytes())?;

        let id = PdfObject::String(PdfString::Hex(file_id.to_vec()));
        let mut trailer = PdfDictionary::new()
            .with("Size", PdfObject::Integer(self.next_obj_num as i64))
            .with("Root", PdfObject::Reference(catalog_ref))
            .with("ID", PdfObject::Array(vec![id.clone(), id]));
        if let Some(info) = info_ref {
            trailer.insert("Info", PdfObject::Reference(info));
        }

        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(&PdfObject::Dictionary(trailer))?;

        self.write_bytes(b"trailer\n")?;
        self.write_bytes(&serializer.into_inner())?;
        self.write_bytes(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes())
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn compress_stream(mut stream: PdfStream) -> Result<PdfStream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&stream.data)?;
    stream.data = encoder.finish()?;
    stream.compressed = true;
    stream.dict.insert("Filter", PdfObject::name("FlateDecode"));
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer, PdfVersion::V1_7);
        writer.write_header().unwrap();
        writer.finish().unwrap();
        assert!(buffer.starts_with(b"%PDF-1.7\n%"));
    }

    #[test]
    fn test_object_and_trailer() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer, PdfVersion::V1_4);
        writer.write_header().unwrap();
        let num = writer.allocate_object();
        writer.write_object(num, &PdfObject::Integer(42)).unwrap();
        writer.write_xref_and_trailer(num, None, &[0xAB; 16]).unwrap();
        writer.finish().unwrap();

        let output = String::from_utf8_lossy(&buffer);
        assert!(output.contains("1 0 obj\n42\nendobj"));
        assert!(output.contains("xref\n0 2\n"));
        assert!(output.contains("/ID [<ABABABABABABABABABABABABABABABAB>"));
        assert!(output.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_stream_compression_respects_opt_out() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer, PdfVersion::V1_4);
        let plain = writer.allocate_object();
        let packed = writer.allocate_object();
        writer
            .write_stream_object(plain, PdfStream::new(b"keep me readable".to_vec()).uncompressed())
            .unwrap();
        writer
            .write_stream_object(packed, PdfStream::new(b"squash me".to_vec()))
            .unwrap();
        writer.finish().unwrap();

        let output = String::from_utf8_lossy(&buffer);
        assert!(output.contains("keep me readable"));
        assert!(!output.contains("squash me"));
        assert!(output.contains("/Filter /FlateDecode"));
    }

    #[test]
    fn test_uncompressed_writer() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer, PdfVersion::V1_4);
        writer.set_compression(false);
        let num = writer.allocate_object();
        writer.write_stream_object(num, PdfStream::new(b"BT ET".to_vec())).unwrap();
        writer.finish().unwrap();

        let output = String::from_utf8_lossy(&buffer);
        assert!(output.contains("/Length 5"));
        assert!(output.contains("stream\nBT ET\nendstream"));
    }
}
