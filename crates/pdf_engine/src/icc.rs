//! ICC colour profiles
//!
//! The renderer attaches the caller's ICC profile to the document as the
//! destination profile of a PDF/A output intent. Only the profile header is
//! inspected here, enough to reject data that is not an ICC profile and to
//! learn the number of colour components (`/N`).

use crate::error::{EngineError, Result};

const HEADER_LEN: usize = 128;
const SIGNATURE_OFFSET: usize = 36;
const COLOR_SPACE_OFFSET: usize = 16;

/// A parsed ICC profile header with the original bytes
#[derive(Debug, Clone)]
pub struct IccProfile<'a> {
    data: &'a [u8],
    components: u8,
    major_version: u8,
}

impl<'a> IccProfile<'a> {
    /// Check the header of `data` and wrap it
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(EngineError::InvalidColorProfile(format!(
                "profile is {} bytes, shorter than the {} byte header",
                data.len(),
                HEADER_LEN
            )));
        }

        if &data[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 4] != b"acsp" {
            return Err(EngineError::InvalidColorProfile(
                "missing 'acsp' profile file signature".to_string(),
            ));
        }

        let declared = read_u32(data, 0) as usize;
        if declared < HEADER_LEN || declared > data.len() {
            return Err(EngineError::InvalidColorProfile(format!(
                "declared size {} does not match {} bytes of data",
                declared,
                data.len()
            )));
        }

        let components = match &data[COLOR_SPACE_OFFSET..COLOR_SPACE_OFFSET + 4] {
            b"RGB " => 3,
            b"GRAY" => 1,
            b"CMYK" => 4,
            other => {
                return Err(EngineError::InvalidColorProfile(format!(
                    "unsupported colour space '{}'",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        Ok(Self {
            data: &data[..declared],
            components,
            major_version: data[8],
        })
    }

    /// Number of colour components (the `/N` entry of the ICC stream)
    pub fn components(&self) -> u8 {
        self.components
    }

    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Output condition identifier derived from the colour space
    pub fn output_condition(&self) -> &'static str {
        match self.components {
            1 => "Gray",
            4 => "CMYK",
            _ => "sRGB IEC61966-2.1",
        }
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Build a small but valid sRGB display profile (ICC v2.1)
///
/// Intended for callers that have no profile of their own; the tone curves
/// are a plain 2.2 gamma rather than the piecewise sRGB curve.
pub fn srgb_profile() -> Vec<u8> {
    let tags: Vec<(&[u8; 4], Vec<u8>)> = vec![
        (b"desc", text_description("sRGB IEC61966-2.1")),
        (b"cprt", text_type("Public Domain")),
        (b"wtpt", xyz_type(0.9642, 1.0, 0.8249)),
        (b"rXYZ", xyz_type(0.4361, 0.2225, 0.0139)),
        (b"gXYZ", xyz_type(0.3851, 0.7169, 0.0971)),
        (b"bXYZ", xyz_type(0.1431, 0.0606, 0.7141)),
        (b"rTRC", gamma_curve(2.2)),
        (b"gTRC", gamma_curve(2.2)),
        (b"bTRC", gamma_curve(2.2)),
    ];

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(&[0; 4]); // size, patched below
    header.extend_from_slice(b"none"); // preferred CMM
    header.extend_from_slice(&[0x02, 0x10, 0x00, 0x00]);
    header.extend_from_slice(b"mntr");
    header.extend_from_slice(b"RGB ");
    header.extend_from_slice(b"XYZ ");
    header.extend_from_slice(&[0; 12]); // creation date
    header.extend_from_slice(b"acsp");
    header.extend_from_slice(&[0; 4]); // platform
    header.extend_from_slice(&[0; 4]); // flags
    header.extend_from_slice(&[0; 4]); // manufacturer
    header.extend_from_slice(&[0; 4]); // model
    header.extend_from_slice(&[0; 8]); // attributes
    header.extend_from_slice(&[0; 4]); // perceptual intent
    header.extend_from_slice(&s15_fixed16(0.9642));
    header.extend_from_slice(&s15_fixed16(1.0));
    header.extend_from_slice(&s15_fixed16(0.8249));
    header.extend_from_slice(&[0; 4]); // creator
    header.resize(HEADER_LEN, 0);

    let table_len = 4 + tags.len() * 12;
    let mut table = Vec::with_capacity(table_len);
    let mut body = Vec::new();
    table.extend_from_slice(&(tags.len() as u32).to_be_bytes());

    for (signature, data) in &tags {
        let offset = HEADER_LEN + table_len + body.len();
        table.extend_from_slice(*signature);
        table.extend_from_slice(&(offset as u32).to_be_bytes());
        table.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
    }

    let mut profile = header;
    profile.extend_from_slice(&table);
    profile.extend_from_slice(&body);
    let size = profile.len() as u32;
    profile[0..4].copy_from_slice(&size.to_be_bytes());
    profile
}

fn s15_fixed16(value: f64) -> [u8; 4] {
    ((value * 65536.0).round() as i32).to_be_bytes()
}

fn xyz_type(x: f64, y: f64, z: f64) -> Vec<u8> {
    let mut data = b"XYZ \0\0\0\0".to_vec();
    data.extend_from_slice(&s15_fixed16(x));
    data.extend_from_slice(&s15_fixed16(y));
    data.extend_from_slice(&s15_fixed16(z));
    data
}

fn gamma_curve(gamma: f64) -> Vec<u8> {
    let mut data = b"curv\0\0\0\0".to_vec();
    data.extend_from_slice(&1u32.to_be_bytes());
    // u8Fixed8Number
    data.extend_from_slice(&((gamma * 256.0).round() as u16).to_be_bytes());
    data
}

fn text_type(text: &str) -> Vec<u8> {
    let mut data = b"text\0\0\0\0".to_vec();
    data.extend_from_slice(text.as_bytes());
    data.push(0);
    data
}

fn text_description(text: &str) -> Vec<u8> {
    let mut data = b"desc\0\0\0\0".to_vec();
    data.extend_from_slice(&((text.len() + 1) as u32).to_be_bytes());
    data.extend_from_slice(text.as_bytes());
    data.push(0);
    data.extend_from_slice(&[0; 4]); // unicode language code
    data.extend_from_slice(&[0; 4]); // unicode count
    data.extend_from_slice(&[0; 2]); // scriptcode code
    data.push(0); // scriptcode count
    data.extend_from_slice(&[0; 67]);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_srgb_profile_is_valid() {
        let bytes = srgb_profile();
        let profile = IccProfile::parse(&bytes).unwrap();
        assert_eq!(profile.components(), 3);
        assert_eq!(profile.major_version(), 2);
        assert_eq!(profile.data().len(), bytes.len());
        assert_eq!(profile.output_condition(), "sRGB IEC61966-2.1");
    }

    #[test]
    fn test_plain_text_is_rejected() {
        let err = IccProfile::parse(b"i-am-a-colour-profile").unwrap_err();
        assert!(err.to_string().contains("Invalid ICC Profile Data"));
    }

    #[test]
    fn test_missing_signature_is_rejected() {
        let mut bytes = srgb_profile();
        bytes[36..40].copy_from_slice(b"nope");
        let err = IccProfile::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("acsp"));
    }

    #[test]
    fn test_truncated_profile_is_rejected() {
        let bytes = srgb_profile();
        let truncated = &bytes[..bytes.len() - 10];
        assert!(IccProfile::parse(truncated).is_err());
    }

    #[test]
    fn test_unknown_colour_space_is_rejected() {
        let mut bytes = srgb_profile();
        bytes[16..20].copy_from_slice(b"Lab ");
        let err = IccProfile::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("Lab"));
    }
}
