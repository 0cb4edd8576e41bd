//! Cursor-based byte stream parser for DEX structure decoding.
//!
//! [`Parser`] maintains a position inside a byte slice and offers
//! bounds-checked reads for the encodings the DEX format uses: little-endian
//! primitives, ULEB128 variable-length integers, and MUTF-8 strings. It is the
//! workhorse behind the image index and the member resolver; nothing in this
//! crate reads image bytes without going through it.
//!
//! # Usage Examples
//!
//! ```rust
//! use apkpatch::file::parser::Parser;
//!
//! let data = [0xE5, 0x8E, 0x26, 0x2A];
//! let mut parser = Parser::new(&data);
//!
//! // ULEB128: 0xE5 0x8E 0x26 -> 624485
//! assert_eq!(parser.read_uleb128()?, 624_485);
//! assert_eq!(parser.read_le::<u8>()?, 0x2A);
//! # Ok::<(), apkpatch::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, ByteIO},
    Error::OutOfBounds,
    Result,
};

/// A bounds-checked cursor over raw image bytes.
///
/// All reads validate availability first; malformed declared lengths surface
/// as [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`] rather
/// than panics or silent wraparound.
///
/// # Examples
///
/// ```rust
/// use apkpatch::file::parser::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_le::<u32>()?, 0x0403_0201);
/// # Ok::<(), apkpatch::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] over `data`, positioned at the start.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the current position within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Read a value of type `T` in little-endian format and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: ByteIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read an unsigned LEB128 integer and advance past it.
    ///
    /// ULEB128 stores a value in base-128 groups, least-significant group
    /// first, with the top bit of each byte acting as a continuation flag.
    /// DEX uses this encoding for all counts and offsets inside
    /// `class_data_item` and for string length prefixes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input or
    /// [`crate::Error::Malformed`] if the value would overflow a `u32`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apkpatch::file::parser::Parser;
    ///
    /// let mut parser = Parser::new(&[0x7F]);
    /// assert_eq!(parser.read_uleb128()?, 127);
    ///
    /// let mut parser = Parser::new(&[0x80, 0x01]);
    /// assert_eq!(parser.read_uleb128()?, 128);
    /// # Ok::<(), apkpatch::Error>(())
    /// ```
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;

        loop {
            if self.position >= self.data.len() {
                return Err(OutOfBounds);
            }

            let byte = self.data[self.position];
            self.position += 1;

            value |= u32::from(byte & 0x7F) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                break;
            }

            // After 4 continuation bytes we have consumed 28 bits; a 5th
            // continuation would push past the 32 bits a u32 can hold.
            if shift >= 32 {
                return Err(malformed_error!(
                    "ULEB128 overflow: value exceeds u32 capacity after {} bits",
                    shift
                ));
            }
        }

        Ok(value)
    }

    /// Read a DEX `string_data_item` at the current position.
    ///
    /// The item is a ULEB128 UTF-16 length prefix followed by NUL-terminated
    /// MUTF-8 bytes. MUTF-8 differs from UTF-8 in that it encodes each UTF-16
    /// code unit independently (surrogates included) and never emits a raw
    /// NUL byte, so decoding accumulates `u16` code units:
    ///
    /// - `0xxxxxxx` - one code unit from one byte
    /// - `110xxxxx 10xxxxxx` - one code unit from two bytes
    /// - `1110xxxx 10xxxxxx 10xxxxxx` - one code unit from three bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input or
    /// [`crate::Error::Malformed`] if the code units do not form valid UTF-16.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apkpatch::file::parser::Parser;
    ///
    /// // utf16 length 3, "bar", NUL
    /// let data = [0x03, b'b', b'a', b'r', 0x00];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_mutf8()?, "bar");
    /// # Ok::<(), apkpatch::Error>(())
    /// ```
    pub fn read_mutf8(&mut self) -> Result<String> {
        let _utf16_len = self.read_uleb128()?;

        let mut units: Vec<u16> = Vec::new();
        loop {
            if self.position >= self.data.len() {
                return Err(OutOfBounds);
            }

            let b1 = self.data[self.position];
            self.position += 1;

            if b1 == 0 {
                break;
            }

            let unit = if (b1 & 0x80) == 0 {
                u16::from(b1)
            } else if (b1 & 0xE0) == 0xC0 {
                let b2 = self.read_le::<u8>()?;
                (u16::from(b1 & 0x1F) << 6) | u16::from(b2 & 0x3F)
            } else {
                let b2 = self.read_le::<u8>()?;
                let b3 = self.read_le::<u8>()?;
                (u16::from(b1 & 0x0F) << 12)
                    | (u16::from(b2 & 0x3F) << 6)
                    | u16::from(b3 & 0x3F)
            };
            units.push(unit);
        }

        String::from_utf16(&units)
            .map_err(|_| malformed_error!("Invalid MUTF-8 string ending at offset {}", self.position))
    }

    /// Returns the number of bytes remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }
}
