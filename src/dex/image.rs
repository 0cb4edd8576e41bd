//! In-memory DEX image with its derived index tables.
//!
//! A [`DexImage`] owns the raw bytes of one container entry plus the lookup
//! structures built from its header: the decoded string table and the type
//! table. The lifecycle is load -> mutate in place at resolved offsets ->
//! [`reseal`](DexImage::reseal) -> write back. Only one image is open at a
//! time; there are no concurrent readers.

use crate::{
    dex::{
        header::{DexHeader, TYPE_ID_STRIDE},
        reseal,
        strings::StringTable,
    },
    file::parser::Parser,
    Result,
};

/// One parsed bytecode image, mutable until written back.
pub struct DexImage {
    data: Vec<u8>,
    header: DexHeader,
    strings: StringTable,
    /// type idx -> descriptor string idx
    type_ids: Vec<u32>,
}

impl DexImage {
    /// Parse an image from its raw bytes, building the index tables.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`]
    /// for a truncated or structurally invalid image.
    pub fn parse(data: Vec<u8>) -> Result<DexImage> {
        let header = DexHeader::read(&data)?;
        let strings = StringTable::read(&data, &header)?;

        let mut type_ids = Vec::with_capacity(header.type_ids_size as usize);
        let mut parser = Parser::new(&data);
        for i in 0..header.type_ids_size as usize {
            parser.seek(header.type_ids_off as usize + i * TYPE_ID_STRIDE)?;
            type_ids.push(parser.read_le::<u32>()?);
        }

        Ok(DexImage {
            data,
            header,
            strings,
            type_ids,
        })
    }

    /// Load an image from a file on disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] on read failure, otherwise as
    /// [`DexImage::parse`].
    pub fn from_file(path: &std::path::Path) -> Result<DexImage> {
        DexImage::parse(std::fs::read(path)?)
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &DexHeader {
        &self.header
    }

    /// The decoded string table.
    #[must_use]
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Linear scan of the type table for the class whose descriptor string
    /// matches `string_idx`. Returns the type index.
    #[must_use]
    pub fn type_with_descriptor(&self, string_idx: u32) -> Option<u32> {
        self.type_ids
            .iter()
            .position(|&idx| idx == string_idx)
            .map(|i| i as u32)
    }

    /// The raw image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Overwrite `bytes` at `offset` inside the instruction stream.
    ///
    /// The caller must [`reseal`](DexImage::reseal) before persisting, or
    /// the loader will reject the image.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the write would run past the
    /// end of the image.
    pub fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .ok_or(crate::Error::OutOfBounds)?;
        if end > self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Recompute the signature and checksum after content mutation.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the image has shrunk below the
    /// fixed header size (cannot happen through [`DexImage::overwrite`]).
    pub fn reseal(&mut self) -> Result<()> {
        reseal::reseal(&mut self.data)
    }

    /// Consume the image, returning its (possibly patched) bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
