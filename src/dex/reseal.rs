//! DEX self-consistency resealing.
//!
//! The header carries two digests over the rest of the file: a SHA-1
//! signature at `[12,32)` computed over `[32,end)`, and an Adler-32 checksum
//! at `[8,12)` computed over `[12,end)`. Because the checksum region covers
//! the signature field, the order is mandatory: signature first, checksum
//! second. Any payload mutation must be followed by a full [`reseal`] before
//! the image is persisted, or the loader rejects it.

use adler::Adler32;
use sha1::{Digest, Sha1};

use crate::{
    dex::header::{CHECKSUM_OFFSET, HEADER_SIZE, PAYLOAD_OFFSET, SIGNATURE_RANGE},
    file::io::{read_le_at, write_le_at},
    Result,
};

/// Recompute both digests in place: SHA-1 over the payload, then Adler-32
/// over signature + payload.
///
/// Pure function of the payload bytes, so resealing twice produces identical
/// output.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `data` is shorter than the fixed
/// header.
///
/// # Examples
///
/// ```rust
/// use apkpatch::dex::reseal;
///
/// let mut image = vec![0u8; 0x80];
/// image[0..8].copy_from_slice(b"dex\n035\0");
/// reseal(&mut image)?;
///
/// let once = image.clone();
/// reseal(&mut image)?;
/// assert_eq!(image, once);
/// # Ok::<(), apkpatch::Error>(())
/// ```
pub fn reseal(data: &mut [u8]) -> Result<()> {
    if data.len() < HEADER_SIZE {
        return Err(malformed_error!(
            "Image too small to reseal - {} bytes",
            data.len()
        ));
    }

    let mut sha = Sha1::new();
    sha.update(&data[PAYLOAD_OFFSET..]);
    let signature = sha.finalize();
    data[SIGNATURE_RANGE].copy_from_slice(&signature);

    let mut adler = Adler32::new();
    adler.write_slice(&data[SIGNATURE_RANGE.start..]);
    let checksum = adler.checksum();

    let mut offset = CHECKSUM_OFFSET;
    write_le_at(data, &mut offset, checksum)
}

/// Check whether the recorded digests match the current content.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `data` is shorter than the fixed
/// header.
pub fn is_sealed(data: &[u8]) -> Result<bool> {
    if data.len() < HEADER_SIZE {
        return Err(malformed_error!(
            "Image too small to verify - {} bytes",
            data.len()
        ));
    }

    let mut sha = Sha1::new();
    sha.update(&data[PAYLOAD_OFFSET..]);
    if data[SIGNATURE_RANGE] != *sha.finalize() {
        return Ok(false);
    }

    let mut adler = Adler32::new();
    adler.write_slice(&data[SIGNATURE_RANGE.start..]);

    let mut offset = CHECKSUM_OFFSET;
    let recorded: u32 = read_le_at(data, &mut offset)?;
    Ok(recorded == adler.checksum())
}
