//! Rebuilds a package container from an extracted directory tree.
//!
//! The writer is deliberately raw rather than going through a library
//! writer: loader-mapped entries (`resources.arsc` and native images) must
//! be stored uncompressed with their data sections on a 4-byte boundary,
//! and the padding that achieves this is encoded as a zero-filled extra
//! field in the local header. Everything else is deflated.
//!
//! Entries are written in the order of a deterministic directory walk, so
//! assembling the same tree twice yields byte-identical output.

use std::{fs, io::Write, path::Path};

use flate2::{write::DeflateEncoder, Compression};

use crate::Result;

pub(crate) const LOCAL_FILE_SIG: u32 = 0x0403_4B50;
pub(crate) const CENTRAL_DIR_SIG: u32 = 0x0201_4B50;
const END_OF_CENTRAL_SIG: u32 = 0x0605_4B50;

/// Size of a local file header before the name and extra field.
pub(crate) const LOCAL_HEADER_LEN: usize = 30;
/// Size of a central directory record before the name.
pub(crate) const CENTRAL_HEADER_LEN: usize = 46;

/// Boundary required for the data section of loader-mapped entries.
pub(crate) const DATA_ALIGNMENT: usize = 4;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;
const VERSION_NEEDED: u16 = 20;

/// Fixed DOS timestamp (1980-01-01) so output does not vary with the clock.
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = 0x0021;

struct EntryRecord {
    name: String,
    method: u16,
    crc: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    header_offset: u32,
}

/// Entries the loader memory-maps, which must stay uncompressed and
/// 4-byte aligned.
fn stores_uncompressed(name: &str) -> bool {
    name == "resources.arsc" || name.ends_with(".so")
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn as_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| crate::Error::Unsupported("container exceeds the 4 GiB format limit".into()))
}

/// Collect relative entry names under `dir`, children sorted by file name
/// so the walk order never depends on filesystem iteration order.
fn collect_files(root: &Path, dir: &Path, names: &mut Vec<String>) -> Result<()> {
    let mut children = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by_key(std::fs::DirEntry::file_name);

    for child in children {
        let path = child.path();
        if path.is_dir() {
            collect_files(root, &path, names)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .map_err(|_| malformed_error!("Walked path outside tree root - {}", path.display()))?;
            names.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

/// Assemble the directory tree rooted at `root` into container bytes.
///
/// # Errors
/// Returns [`crate::Error::Io`] for filesystem failures and
/// [`crate::Error::Unsupported`] when a size field overflows the format's
/// 32-bit limits.
pub fn assemble(root: &Path) -> Result<Vec<u8>> {
    let mut names = Vec::new();
    collect_files(root, root, &mut names)?;

    let mut out = Vec::new();
    let mut records = Vec::with_capacity(names.len());

    for name in names {
        let data = fs::read(root.join(&name))?;
        let crc = crc32fast::hash(&data);
        let header_offset = out.len();

        let stored = stores_uncompressed(&name);
        let (method, payload) = if stored {
            (METHOD_STORED, data.clone())
        } else {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data)?;
            (METHOD_DEFLATED, encoder.finish()?)
        };

        // Pad stored entries so the data section lands on the boundary,
        // accounting for the variable-length header-plus-name prefix.
        let extra_len = if stored {
            let data_start = header_offset + LOCAL_HEADER_LEN + name.len();
            (DATA_ALIGNMENT - data_start % DATA_ALIGNMENT) % DATA_ALIGNMENT
        } else {
            0
        };

        push_u32(&mut out, LOCAL_FILE_SIG);
        push_u16(&mut out, VERSION_NEEDED);
        push_u16(&mut out, 0); // general purpose flags
        push_u16(&mut out, method);
        push_u16(&mut out, DOS_TIME);
        push_u16(&mut out, DOS_DATE);
        push_u32(&mut out, crc);
        push_u32(&mut out, as_u32(payload.len())?);
        push_u32(&mut out, as_u32(data.len())?);
        push_u16(&mut out, as_u32(name.len())? as u16);
        push_u16(&mut out, extra_len as u16);
        out.extend_from_slice(name.as_bytes());
        out.resize(out.len() + extra_len, 0);
        out.extend_from_slice(&payload);

        records.push(EntryRecord {
            name,
            method,
            crc,
            compressed_size: as_u32(payload.len())?,
            uncompressed_size: as_u32(data.len())?,
            header_offset: as_u32(header_offset)?,
        });
    }

    let central_start = out.len();
    for record in &records {
        push_u32(&mut out, CENTRAL_DIR_SIG);
        push_u16(&mut out, VERSION_NEEDED); // version made by
        push_u16(&mut out, VERSION_NEEDED);
        push_u16(&mut out, 0); // general purpose flags
        push_u16(&mut out, record.method);
        push_u16(&mut out, DOS_TIME);
        push_u16(&mut out, DOS_DATE);
        push_u32(&mut out, record.crc);
        push_u32(&mut out, record.compressed_size);
        push_u32(&mut out, record.uncompressed_size);
        push_u16(&mut out, as_u32(record.name.len())? as u16);
        push_u16(&mut out, 0); // extra field length
        push_u16(&mut out, 0); // comment length
        push_u16(&mut out, 0); // disk number start
        push_u16(&mut out, 0); // internal attributes
        push_u32(&mut out, 0); // external attributes
        push_u32(&mut out, record.header_offset);
        out.extend_from_slice(record.name.as_bytes());
    }
    let central_size = out.len() - central_start;

    push_u32(&mut out, END_OF_CENTRAL_SIG);
    push_u16(&mut out, 0); // disk number
    push_u16(&mut out, 0); // central directory start disk
    push_u16(&mut out, as_u32(records.len())? as u16);
    push_u16(&mut out, as_u32(records.len())? as u16);
    push_u32(&mut out, as_u32(central_size)?);
    push_u32(&mut out, as_u32(central_start)?);
    push_u16(&mut out, 0); // comment length

    Ok(out)
}
