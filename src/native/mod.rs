//! Fixed-template patching of native (AArch64) images.
//!
//! A native image is a raw byte buffer addressed by absolute file offsets;
//! nothing here parses ELF structure. The offsets are trusted inputs from an
//! external analysis step, and each operation maps to one fixed-width
//! instruction template that gets written over the function prologue:
//!
//! - `ReturnVoid` - `ret`
//! - `ReturnTrue` - `mov x0, #1; ret`
//! - `ReturnFalse` - `mov x0, #0; ret`
//!
//! Writes near the end of the buffer are truncated, never extended: the
//! image keeps its exact size regardless of what the offsets claim.

use crate::{patch::PatchOp, Result};

/// `ret` (0xD65F03C0).
const RET: [u8; 4] = [0xC0, 0x03, 0x5F, 0xD6];
/// `mov x0, #1` (0xD2800020) followed by `ret`.
const MOV_X0_1_RET: [u8; 8] = [0x20, 0x00, 0x80, 0xD2, 0xC0, 0x03, 0x5F, 0xD6];
/// `mov x0, #0` (0xD2800000) followed by `ret`.
const MOV_X0_0_RET: [u8; 8] = [0x00, 0x00, 0x80, 0xD2, 0xC0, 0x03, 0x5F, 0xD6];

/// The instruction template for `op`, or `None` for an unknown operation.
#[must_use]
pub fn template(op: PatchOp) -> Option<&'static [u8]> {
    match op {
        PatchOp::ReturnVoid => Some(&RET),
        PatchOp::ReturnTrue => Some(&MOV_X0_1_RET),
        PatchOp::ReturnFalse => Some(&MOV_X0_0_RET),
        PatchOp::Unknown => None,
    }
}

/// Parse a file-relative address from a hexadecimal literal, with or
/// without a `0x` prefix.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a non-hexadecimal literal.
pub fn parse_offset(literal: &str) -> Result<u64> {
    let digits = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
        .unwrap_or(literal);
    u64::from_str_radix(digits, 16)
        .map_err(|_| malformed_error!("Invalid hexadecimal offset - {}", literal))
}

/// Write the template for `op` at every address in `offsets`.
///
/// Returns the number of addresses attempted, which callers must treat as a
/// best-effort count: an address close to the buffer end still counts even
/// though only the in-bounds prefix of the template was written, and an
/// address past the end counts while writing nothing.
///
/// # Errors
/// Returns [`crate::Error::Unsupported`] for an unknown operation and
/// [`crate::Error::Malformed`] for an unparsable offset literal; in both
/// cases the buffer is untouched.
///
/// # Examples
///
/// ```rust
/// use apkpatch::{native, patch::PatchOp};
///
/// let mut image = vec![0u8; 64];
/// let count = native::apply(&mut image, &["0x0".into(), "0x20".into()], PatchOp::ReturnTrue)?;
/// assert_eq!(count, 2);
/// assert_eq!(&image[0..4], &[0x20, 0x00, 0x80, 0xD2]);
/// # Ok::<(), apkpatch::Error>(())
/// ```
pub fn apply(data: &mut [u8], offsets: &[String], op: PatchOp) -> Result<usize> {
    let Some(template) = template(op) else {
        return Err(crate::Error::Unsupported(format!("{op:?}")));
    };

    // Validate every literal before the first write so a bad descriptor
    // leaves the image untouched.
    let mut parsed = Vec::with_capacity(offsets.len());
    for literal in offsets {
        parsed.push(parse_offset(literal)? as usize);
    }

    let mut count = 0;
    for offset in parsed {
        // Past-end addresses write nothing but still count.
        if let Some(dst) = data.get_mut(offset..) {
            let len = template.len().min(dst.len());
            dst[..len].copy_from_slice(&template[..len]);
        }
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn fan_out_writes_same_template_everywhere() {
        let mut data = vec![0u8; 0x40];
        let offsets = vec!["0x0".to_string(), "0x10".to_string(), "0x20".to_string()];

        let count = apply(&mut data, &offsets, PatchOp::ReturnTrue).unwrap();
        assert_eq!(count, 3);
        for off in [0usize, 0x10, 0x20] {
            assert_eq!(&data[off..off + 8], &MOV_X0_1_RET);
        }
    }

    #[test]
    fn truncates_at_buffer_end() {
        let mut data = vec![0u8; 0x10];
        let count = apply(&mut data, &["0xC".to_string()], PatchOp::ReturnFalse).unwrap();
        assert_eq!(count, 1);

        // Only the first 4 template bytes fit; the buffer did not grow.
        assert_eq!(data.len(), 0x10);
        assert_eq!(&data[0xC..], &MOV_X0_0_RET[..4]);
    }

    #[test]
    fn offset_past_end_counts_but_writes_nothing() {
        let mut data = vec![0xAAu8; 8];
        let count = apply(&mut data, &["0x100".to_string()], PatchOp::ReturnVoid).unwrap();
        assert_eq!(count, 1);
        assert_eq!(data, vec![0xAAu8; 8]);

        // Same at the exact buffer length.
        let count = apply(&mut data, &["0x8".to_string()], PatchOp::ReturnTrue).unwrap();
        assert_eq!(count, 1);
        assert_eq!(data, vec![0xAAu8; 8]);
    }

    #[test]
    fn bare_hex_offsets_accepted() {
        assert_eq!(parse_offset("2b0c10").unwrap(), 0x2B0C10);
        assert_eq!(parse_offset("0x14f0a0").unwrap(), 0x14F0A0);
        assert!(matches!(
            parse_offset("zz"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn unknown_operation_rejected_without_writing() {
        let mut data = vec![0u8; 16];
        let before = data.clone();
        assert!(matches!(
            apply(&mut data, &["0x0".to_string()], PatchOp::Unknown),
            Err(Error::Unsupported(_))
        ));
        assert_eq!(data, before);
    }

    #[test]
    fn bad_literal_rejected_before_any_write() {
        let mut data = vec![0u8; 16];
        let before = data.clone();
        let offsets = vec!["0x0".to_string(), "not-hex".to_string()];
        assert!(apply(&mut data, &offsets, PatchOp::ReturnVoid).is_err());
        assert_eq!(data, before);
    }
}
