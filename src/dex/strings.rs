//! Decoded DEX string table.
//!
//! Strings hold every identifier other tables reference: type descriptors,
//! method names, field names. Each `string_id_item` is a u32 offset to a
//! `string_data_item` (ULEB128 length prefix + NUL-terminated MUTF-8). The
//! patcher only ever needs exact-match lookups, so the whole table is
//! decoded up front into host strings.

use crate::{
    dex::header::{DexHeader, STRING_ID_STRIDE},
    file::parser::Parser,
    Result,
};

/// All strings of one image, indexed by string id.
///
/// # Examples
///
/// ```rust
/// use apkpatch::dex::{DexHeader, StringTable};
///
/// // One string id pointing at "bar" right after the header.
/// let mut data = vec![0u8; 0x75];
/// data[0..8].copy_from_slice(b"dex\n035\0");
/// data[0x38..0x3C].copy_from_slice(&1u32.to_le_bytes());  // string_ids_size
/// data[0x3C..0x40].copy_from_slice(&0x6Cu32.to_le_bytes()); // string_ids_off
/// data[0x6C..0x70].copy_from_slice(&0x70u32.to_le_bytes()); // -> data
/// data[0x70..0x75].copy_from_slice(&[0x03, b'b', b'a', b'r', 0x00]);
///
/// let header = DexHeader::read(&data)?;
/// let strings = StringTable::read(&data, &header)?;
/// assert_eq!(strings.get(0), Some("bar"));
/// assert_eq!(strings.index_of("bar"), Some(0));
/// # Ok::<(), apkpatch::Error>(())
/// ```
pub struct StringTable {
    entries: Vec<String>,
}

impl StringTable {
    /// Decode the full string table described by `header`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`]
    /// if any string data offset or encoding is invalid.
    pub fn read(data: &[u8], header: &DexHeader) -> Result<StringTable> {
        let mut entries = Vec::with_capacity(header.string_ids_size as usize);

        for i in 0..header.string_ids_size as usize {
            let mut parser = Parser::new(data);
            parser.seek(header.string_ids_off as usize + i * STRING_ID_STRIDE)?;
            let data_off = parser.read_le::<u32>()?;

            parser.seek(data_off as usize)?;
            entries.push(parser.read_mutf8()?);
        }

        Ok(StringTable { entries })
    }

    /// The string at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&str> {
        self.entries.get(index as usize).map(String::as_str)
    }

    /// Linear scan for the id of an exact string match.
    #[must_use]
    pub fn index_of(&self, value: &str) -> Option<u32> {
        self.entries
            .iter()
            .position(|s| s == value)
            .map(|i| i as u32)
    }

    /// Number of strings in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
