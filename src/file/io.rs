//! Bounds-checked little-endian reading and writing primitives.
//!
//! Every binary format this crate touches (DEX images, ELF images, ZIP
//! records) is little-endian, so this module only provides LE accessors. All
//! operations validate data availability before touching the buffer and
//! return [`crate::Error::OutOfBounds`] instead of panicking on truncated or
//! hostile input.
//!
//! # Usage Examples
//!
//! ```rust
//! use apkpatch::file::io::{read_le_at, write_le_at};
//!
//! let mut data = [0u8; 8];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 0x1234u16)?;
//! write_le_at(&mut data, &mut offset, 0xDEAD_BEEFu32)?;
//! assert_eq!(offset, 6);
//!
//! offset = 2;
//! let value: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!(value, 0xDEAD_BEEF);
//! # Ok::<(), apkpatch::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for types that can be read from and written to little-endian bytes.
///
/// Implemented for the unsigned integer widths the supported formats use.
/// The associated `Bytes` type is the fixed-size array backing the value,
/// which keeps all conversions allocation-free and bounds-checkable.
pub trait ByteIO: Sized {
    /// Fixed-size byte array backing this type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Decode from little-endian bytes.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Encode into little-endian bytes.
    fn to_le_bytes(self) -> Self::Bytes;
}

impl ByteIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        bytes[0]
    }

    fn to_le_bytes(self) -> Self::Bytes {
        [self]
    }
}

impl ByteIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u16::to_le_bytes(self)
    }
}

impl ByteIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u32::to_le_bytes(self)
    }
}

impl ByteIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u64::to_le_bytes(self)
    }
}

/// Read a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: ByteIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a value of type `T` at `offset`, advancing the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes
/// remain at `offset`.
pub fn read_le_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if offset.checked_add(type_len).is_none_or(|end| end > data.len()) {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Write `value` at `offset`, advancing the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes
/// remain at `offset`.
pub fn write_le_at<T: ByteIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if offset.checked_add(type_len).is_none_or(|end| end > data.len()) {
        return Err(OutOfBounds);
    }

    let bytes = value.to_le_bytes();
    data[*offset..*offset + type_len].copy_from_slice(bytes.as_ref());
    *offset += type_len;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_round_trip() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut offset = 0;

        let a: u16 = read_le_at(&data, &mut offset).unwrap();
        let b: u32 = read_le_at(&data, &mut offset).unwrap();
        let c: u16 = read_le_at(&data, &mut offset).unwrap();

        assert_eq!(a, 0x0201);
        assert_eq!(b, 0x0605_0403);
        assert_eq!(c, 0x0807);
        assert_eq!(offset, 8);
    }

    #[test]
    fn write_round_trip() {
        let mut data = [0u8; 6];
        let mut offset = 0;
        write_le_at(&mut data, &mut offset, 0xAABBu16).unwrap();
        write_le_at(&mut data, &mut offset, 0x1122_3344u32).unwrap();
        assert_eq!(data, [0xBB, 0xAA, 0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn out_of_bounds() {
        let data = [0x01, 0x02];
        assert!(matches!(
            read_le::<u32>(&data),
            Err(Error::OutOfBounds { .. })
        ));

        let mut offset = usize::MAX;
        assert!(matches!(
            read_le_at::<u8>(&data, &mut offset),
            Err(Error::OutOfBounds { .. })
        ));

        let mut small = [0u8; 2];
        let mut offset = 1;
        assert!(write_le_at(&mut small, &mut offset, 0u16).is_err());
    }
}
