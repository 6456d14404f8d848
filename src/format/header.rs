//! Header decoder for the block-compressed format.

use crate::error::{HicError, Result};
use crate::reference::Reference;
use crate::stream::ByteStream;
use rustc_hash::FxHashMap;

pub const MAGIC: &[u8; 4] = b"HIC\0";
pub const MIN_VERSION: i32 = 6;
pub const MAX_VERSION: i32 = 9;

#[derive(Debug, Clone)]
pub struct HicHeader {
    pub version: i32,
    pub master_index_offset: i64,
    pub genome_id: String,
    /// Only set for v9+.
    pub nvi_position: Option<i64>,
    pub nvi_length: Option<i64>,
    pub attributes: FxHashMap<String, String>,
    pub reference: Reference,
    pub resolutions: Vec<i32>,
    pub frag_resolutions: Vec<i32>,
}

/// Non-fatal notices produced while parsing: a nonzero
/// `n_frag_resolutions`, or anything else worth surfacing to a caller
/// without failing the parse. Drained by `HicFile::take_diagnostics`
///.
pub type Diagnostics = Vec<String>;

impl HicHeader {
    pub fn read(stream: &mut dyn ByteStream, diagnostics: &mut Diagnostics) -> Result<Self> {
        stream.seek(0)?;
        let magic = stream.read_bytes(4)?;
        if &magic[..] != &MAGIC[..] {
            return Err(HicError::invalid_format(
                "missing 'HIC\\0' magic at start of file",
            ));
        }

        let version = stream.read_i32()?;
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(HicError::UnsupportedVersion(version));
        }

        let master_index_offset = stream.read_i64()?;
        let file_size = stream.size() as i64;
        if master_index_offset < 0 || master_index_offset >= file_size {
            return Err(HicError::invalid_format(format!(
                "master index offset {master_index_offset} outside file bounds [0, {file_size})"
            )));
        }

        let mut genome_id = stream.read_cstring()?;
        if genome_id.is_empty() {
            genome_id = "unknown".to_string();
        }

        let (nvi_position, nvi_length) = if version >= 9 {
            (Some(stream.read_i64()?), Some(stream.read_i64()?))
        } else {
            (None, None)
        };

        let n_attrs = stream.read_i32()?;
        if n_attrs < 0 {
            return Err(HicError::invalid_format("negative attribute count"));
        }
        let mut attributes = FxHashMap::default();
        for _ in 0..n_attrs {
            let key = stream.read_cstring()?;
            let value = stream.read_cstring()?;
            attributes.insert(key, value);
        }

        let n_chroms = stream.read_i32()?;
        if n_chroms <= 0 {
            return Err(HicError::invalid_format(
                "chromosome count must be positive",
            ));
        }
        let mut entries = Vec::with_capacity(n_chroms as usize);
        for _ in 0..n_chroms {
            let name = stream.read_cstring()?;
            let length = if version >= 9 {
                stream.read_i64()?
            } else {
                stream.read_i32()? as i64
            };
            if length < 0 {
                return Err(HicError::invalid_format("negative chromosome length"));
            }
            // The "All"/"all" whole-genome pseudo-chromosome legitimately
            // has length 0 on disk (it is never binned directly); give it
            // length 1 internally so Reference's no-zero-length invariant
            // holds without special-casing every consumer.
            let length = if length == 0 { 1 } else { length as u32 };
            entries.push((name, length));
        }
        let reference = Reference::new(entries)?;

        let n_resolutions = stream.read_i32()?;
        if n_resolutions <= 0 {
            return Err(HicError::invalid_format("resolution count must be positive"));
        }
        let mut resolutions = Vec::with_capacity(n_resolutions as usize);
        for _ in 0..n_resolutions {
            let r = stream.read_i32()?;
            if !resolutions.contains(&r) {
                resolutions.push(r);
            }
        }

        let mut frag_resolutions = Vec::new();
        // n_frag_resolutions is not exercised by known files;
        // parse it if present but never rely on it.
        if stream.position() < stream.size() {
            let n_frag_resolutions = stream.read_i32()?;
            if n_frag_resolutions > 0 {
                diagnostics.push(format!(
                    "n_frag_resolutions = {n_frag_resolutions} is nonzero; fragment-map resolutions are not supported and will be skipped"
                ));
                for _ in 0..n_frag_resolutions {
                    let _ = stream.read_i32();
                }
            }
        }

        Ok(Self {
            version,
            master_index_offset,
            genome_id,
            nvi_position,
            nvi_length,
            attributes,
            reference,
            resolutions,
            frag_resolutions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    fn build_v8_header(master_offset: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&8i32.to_le_bytes());
        buf.extend_from_slice(&master_offset.to_le_bytes());
        buf.push(0); // empty genome id -> "unknown"
        buf.extend_from_slice(&0i32.to_le_bytes()); // n_attrs
        buf.extend_from_slice(&2i32.to_le_bytes()); // n_chroms
        buf.extend_from_slice(b"chr1\0");
        buf.extend_from_slice(&1000i32.to_le_bytes());
        buf.extend_from_slice(b"chr2\0");
        buf.extend_from_slice(&2000i32.to_le_bytes());
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_resolutions
        buf.extend_from_slice(&100000i32.to_le_bytes());
        buf
    }

    #[test]
    fn parses_minimal_v8_header() {
        let header_len = build_v8_header(0).len() as i64;
        let trailer_len = 16i64;
        let data = build_v8_header(header_len + trailer_len - 1);
        let mut full = data;
        full.extend(std::iter::repeat(0u8).take(trailer_len as usize));
        let mut stream = MemoryStream::new(full);
        let mut diags = Vec::new();

        let header = HicHeader::read(&mut stream, &mut diags).unwrap();
        assert_eq!(header.version, 8);
        assert_eq!(header.genome_id, "unknown");
        assert_eq!(header.reference.len(), 2);
        assert_eq!(header.resolutions, vec![100000]);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut stream = MemoryStream::new(b"XXXX".to_vec());
        let mut diags = Vec::new();
        let err = HicHeader::read(&mut stream, &mut diags).unwrap_err();
        assert!(matches!(err, HicError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_out_of_range_version() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&3i32.to_le_bytes());
        let mut stream = MemoryStream::new(buf);
        let mut diags = Vec::new();
        let err = HicHeader::read(&mut stream, &mut diags).unwrap_err();
        assert!(matches!(err, HicError::UnsupportedVersion(3)));
    }
}
