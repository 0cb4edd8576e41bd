//! Restores original per-entry CRC-32 values into a rebuilt container.
//!
//! Some verifiers read the checksum recorded in the container's own
//! records instead of recomputing it from content. Copying the values from
//! the unmodified reference container into the rebuilt one keeps such a
//! verifier satisfied even though the recorded checksums no longer match
//! the patched content by the format's own algorithm. That mismatch is the
//! point, not an oversight.

use std::collections::HashMap;

use crate::{
    archive::assemble::{CENTRAL_HEADER_LEN, LOCAL_HEADER_LEN},
    file::io::{read_le, write_le_at},
};

const LOCAL_SIG: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const CENTRAL_SIG: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];

/// Checksum field position inside a local file header.
const LOCAL_CRC_OFFSET: usize = 14;
/// Checksum field position inside a central directory record.
const CENTRAL_CRC_OFFSET: usize = 16;

fn field_u16(data: &[u8], offset: usize) -> Option<u16> {
    read_le::<u16>(data.get(offset..)?).ok()
}

fn field_u32(data: &[u8], offset: usize) -> Option<u32> {
    read_le::<u32>(data.get(offset..)?).ok()
}

/// Overwrite the 4-byte checksum at `pos + crc_offset` when the record's
/// entry name has a reference value. Untracked names leave the record as
/// written by the assembler.
fn restore_field(
    data: &mut [u8],
    pos: usize,
    crc_offset: usize,
    name: &[u8],
    reference: &HashMap<String, u32>,
    restored: &mut usize,
) {
    let Some(&crc) = std::str::from_utf8(name).ok().and_then(|n| reference.get(n)) else {
        return;
    };
    let mut at = pos + crc_offset;
    if write_le_at(data, &mut at, crc).is_ok() {
        *restored += 1;
    }
}

/// Process the local file header at `pos`, returning how far to advance.
/// `None` means the record's declared lengths cannot be trusted and the
/// caller should fall back to a byte-by-byte scan.
fn local_record(
    data: &mut [u8],
    pos: usize,
    reference: &HashMap<String, u32>,
    restored: &mut usize,
) -> Option<usize> {
    let compressed_size = field_u32(data, pos + 18)? as usize;
    let name_len = field_u16(data, pos + 26)? as usize;
    let extra_len = field_u16(data, pos + 28)? as usize;

    let name_start = pos.checked_add(LOCAL_HEADER_LEN)?;
    let name = data.get(name_start..name_start.checked_add(name_len)?)?.to_vec();

    // Jump the name, extra field and entry data in one step so signature
    // bytes inside compressed payloads are never misread as records.
    let advance = LOCAL_HEADER_LEN
        .checked_add(name_len)?
        .checked_add(extra_len)?
        .checked_add(compressed_size)?;
    if pos.checked_add(advance)? > data.len() {
        return None;
    }

    restore_field(data, pos, LOCAL_CRC_OFFSET, &name, reference, restored);
    Some(advance)
}

fn central_record(
    data: &mut [u8],
    pos: usize,
    reference: &HashMap<String, u32>,
    restored: &mut usize,
) -> Option<usize> {
    let name_len = field_u16(data, pos + 28)? as usize;
    let extra_len = field_u16(data, pos + 30)? as usize;
    let comment_len = field_u16(data, pos + 32)? as usize;

    let name_start = pos.checked_add(CENTRAL_HEADER_LEN)?;
    let name = data.get(name_start..name_start.checked_add(name_len)?)?.to_vec();

    let advance = CENTRAL_HEADER_LEN
        .checked_add(name_len)?
        .checked_add(extra_len)?
        .checked_add(comment_len)?;
    if pos.checked_add(advance)? > data.len() {
        return None;
    }

    restore_field(data, pos, CENTRAL_CRC_OFFSET, &name, reference, restored);
    Some(advance)
}

/// Scan `container` for local and central directory records and overwrite
/// each matching entry's checksum field with its reference value.
///
/// Only the 4-byte checksum fields change; sizes, names and data bytes are
/// untouched. Returns the number of fields rewritten (a fully tracked
/// entry counts twice, once per record kind).
pub fn restore(container: &mut [u8], reference: &HashMap<String, u32>) -> usize {
    let mut restored = 0;
    let mut pos = 0;

    while pos + LOCAL_SIG.len() <= container.len() {
        let advance = if container[pos..pos + 4] == LOCAL_SIG {
            local_record(container, pos, reference, &mut restored)
        } else if container[pos..pos + 4] == CENTRAL_SIG {
            central_record(container, pos, reference, &mut restored)
        } else {
            None
        };
        pos += advance.unwrap_or(1);
    }

    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::assemble::assemble;
    use std::fs;

    fn build_container(dir: &std::path::Path) -> Vec<u8> {
        fs::write(dir.join("resources.arsc"), b"resource table").unwrap();
        fs::create_dir_all(dir.join("assets")).unwrap();
        fs::write(dir.join("assets/a.txt"), b"asset payload").unwrap();
        assemble(dir).unwrap()
    }

    fn reference_for(names: &[(&str, u32)]) -> HashMap<String, u32> {
        names.iter().map(|(n, c)| ((*n).to_string(), *c)).collect()
    }

    #[test]
    fn rewrites_both_record_kinds_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = build_container(dir.path());
        let reference = reference_for(&[("resources.arsc", 0xDEAD_BEEF), ("assets/a.txt", 0x1234_5678)]);

        let restored = restore(&mut container, &reference);
        assert_eq!(restored, 4);
    }

    #[test]
    fn changes_only_checksum_fields() {
        let dir = tempfile::tempdir().unwrap();
        let original = build_container(dir.path());
        let mut patched = original.clone();
        let reference = reference_for(&[("assets/a.txt", 0xAAAA_BBBB)]);

        let restored = restore(&mut patched, &reference);
        assert_eq!(restored, 2);
        assert_ne!(patched, original);

        let differing = original.iter().zip(patched.iter()).filter(|(a, b)| a != b).count();
        assert!(differing <= 8, "touched {differing} bytes");

        // Writing the content-true value back must reproduce the original
        // container exactly, so nothing outside the two fields moved.
        let undo = reference_for(&[("assets/a.txt", crc32fast::hash(b"asset payload"))]);
        assert_eq!(restore(&mut patched, &undo), 2);
        assert_eq!(patched, original);
    }

    #[test]
    fn untracked_entries_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = build_container(dir.path());
        let before = container.clone();

        let restored = restore(&mut container, &reference_for(&[("absent.bin", 1)]));
        assert_eq!(restored, 0);
        assert_eq!(container, before);
    }

    #[test]
    fn signature_bytes_inside_entry_data_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        // Stored entry whose payload embeds a fake local header signature
        // followed by garbage lengths.
        fs::write(
            dir.path().join("decoy.so"),
            [b"PK\x03\x04".as_slice(), &[0xFF; 40]].concat(),
        )
        .unwrap();
        let mut container = assemble(dir.path()).unwrap();

        let restored = restore(&mut container, &reference_for(&[("decoy.so", 0x0BAD_CAFE)]));
        assert_eq!(restored, 2);

        let mut hits = 0;
        for window in container.windows(4) {
            if window == 0x0BAD_CAFEu32.to_le_bytes() {
                hits += 1;
            }
        }
        assert_eq!(hits, 2);
    }
}
