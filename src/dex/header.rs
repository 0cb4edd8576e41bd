//! DEX header parsing.
//!
//! The header is a fixed 112-byte (0x70) region at the start of every image.
//! This module reads the four index section descriptors the patcher needs
//! (string ids, type ids, method ids, class defs) and validates that each
//! declared `(offset, count)` pair stays inside the buffer, so later lookups
//! never read out of bounds.

use crate::{file::io::read_le_at, Result};

/// First four magic bytes of every DEX image; a version string follows.
pub const DEX_MAGIC: [u8; 4] = [0x64, 0x65, 0x78, 0x0A]; // "dex\n"

/// Size of the fixed header region.
pub const HEADER_SIZE: usize = 0x70;

/// Byte offset of the Adler-32 checksum field.
pub const CHECKSUM_OFFSET: usize = 8;

/// Byte range of the SHA-1 signature field.
pub const SIGNATURE_RANGE: std::ops::Range<usize> = 12..32;

/// Offset of the payload both digests are computed over (everything after
/// the signature field).
pub const PAYLOAD_OFFSET: usize = 32;

/// Stride of one `string_id_item` (a single u32 data offset).
pub const STRING_ID_STRIDE: usize = 4;
/// Stride of one `type_id_item` (a single u32 descriptor string index).
pub const TYPE_ID_STRIDE: usize = 4;
/// Stride of one `method_id_item` (class u16, proto u16, name u32).
pub const METHOD_ID_STRIDE: usize = 8;
/// Stride of one `class_def_item`.
pub const CLASS_DEF_STRIDE: usize = 32;

/// The index section descriptors read from a DEX header.
///
/// Each `(size, off)` pair locates a fixed-stride table in the image. Header
/// field positions: string ids at 0x38/0x3C, type ids at 0x40/0x44, method
/// ids at 0x58/0x5C, class defs at 0x60/0x64; all values little-endian u32.
#[derive(Debug, Clone, Copy)]
pub struct DexHeader {
    /// Number of entries in the string id table.
    pub string_ids_size: u32,
    /// File offset of the string id table.
    pub string_ids_off: u32,
    /// Number of entries in the type id table.
    pub type_ids_size: u32,
    /// File offset of the type id table.
    pub type_ids_off: u32,
    /// Number of entries in the method id table.
    pub method_ids_size: u32,
    /// File offset of the method id table.
    pub method_ids_off: u32,
    /// Number of entries in the class definition table.
    pub class_defs_size: u32,
    /// File offset of the class definition table.
    pub class_defs_off: u32,
}

impl DexHeader {
    /// Read and validate a header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the buffer is shorter than the
    /// fixed header, the magic does not match, or any index section's
    /// declared `(offset, count)` pair runs past the end of the buffer.
    pub fn read(data: &[u8]) -> Result<DexHeader> {
        if data.len() < HEADER_SIZE {
            return Err(malformed_error!(
                "DEX image too small for header - {} bytes",
                data.len()
            ));
        }

        if data[0..4] != DEX_MAGIC {
            return Err(malformed_error!("Invalid DEX magic - {:02X?}", &data[0..4]));
        }

        let mut offset = 0x38;
        let string_ids_size = read_le_at::<u32>(data, &mut offset)?;
        let string_ids_off = read_le_at::<u32>(data, &mut offset)?;
        let type_ids_size = read_le_at::<u32>(data, &mut offset)?;
        let type_ids_off = read_le_at::<u32>(data, &mut offset)?;

        offset = 0x58;
        let method_ids_size = read_le_at::<u32>(data, &mut offset)?;
        let method_ids_off = read_le_at::<u32>(data, &mut offset)?;
        let class_defs_size = read_le_at::<u32>(data, &mut offset)?;
        let class_defs_off = read_le_at::<u32>(data, &mut offset)?;

        let header = DexHeader {
            string_ids_size,
            string_ids_off,
            type_ids_size,
            type_ids_off,
            method_ids_size,
            method_ids_off,
            class_defs_size,
            class_defs_off,
        };

        header.check_section(data, "string_ids", string_ids_off, string_ids_size, STRING_ID_STRIDE)?;
        header.check_section(data, "type_ids", type_ids_off, type_ids_size, TYPE_ID_STRIDE)?;
        header.check_section(data, "method_ids", method_ids_off, method_ids_size, METHOD_ID_STRIDE)?;
        header.check_section(data, "class_defs", class_defs_off, class_defs_size, CLASS_DEF_STRIDE)?;

        Ok(header)
    }

    fn check_section(
        &self,
        data: &[u8],
        name: &str,
        off: u32,
        count: u32,
        stride: usize,
    ) -> Result<()> {
        let end = (off as u64) + (count as u64) * (stride as u64);
        if end > data.len() as u64 {
            return Err(malformed_error!(
                "{} section runs past end of image - offset {:#x}, count {}",
                name,
                off,
                count
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn minimal_header() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0..8].copy_from_slice(b"dex\n035\0");
        data
    }

    #[test]
    fn empty_sections_parse() {
        let data = minimal_header();
        let header = DexHeader::read(&data).unwrap();
        assert_eq!(header.string_ids_size, 0);
        assert_eq!(header.class_defs_off, 0);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut data = minimal_header();
        data[0] = b'D';
        assert!(matches!(
            DexHeader::read(&data),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_header_rejected() {
        assert!(matches!(
            DexHeader::read(&[0x64, 0x65, 0x78]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn section_past_end_rejected() {
        let mut data = minimal_header();
        // Claim 16 string ids at the end of the header region.
        data[0x38..0x3C].copy_from_slice(&16u32.to_le_bytes());
        data[0x3C..0x40].copy_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(Error::Malformed { .. })
        ));
    }
}
