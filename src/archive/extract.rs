//! Package extraction and reference checksum capture.

use std::{collections::HashMap, fs, fs::File, io, path::Path};

use zip::ZipArchive;

use crate::Result;

/// Extract every entry of the package at `archive_path` into `dest`.
///
/// Directory components are created as needed. Entry names that would
/// escape `dest` (absolute paths, `..` traversal) are rejected before
/// anything is written.
///
/// # Errors
/// Returns [`crate::Error::Zip`] for an unreadable container,
/// [`crate::Error::Malformed`] for an escaping entry name and
/// [`crate::Error::Io`] for filesystem failures.
pub fn extract(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(malformed_error!(
                "Entry name escapes the extraction root - {}",
                entry.name()
            ));
        };

        let out_path = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = File::create(&out_path)?;
        io::copy(&mut entry, &mut writer)?;
    }

    Ok(())
}

/// Read the per-entry CRC-32 values recorded in the package at
/// `archive_path`, keyed by entry name.
///
/// The values come straight from the container's own records, not from
/// recomputing over content, so the table reflects whatever the original
/// packager wrote.
///
/// # Errors
/// Returns [`crate::Error::Zip`] for an unreadable container.
pub fn reference_crcs(archive_path: &Path) -> Result<HashMap<String, u32>> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut table = HashMap::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        table.insert(entry.name().to_string(), entry.crc32());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_package(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("sample.apk");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        writer.start_file("classes.dex", options).unwrap();
        writer.write_all(b"dex-bytes").unwrap();
        writer.start_file("assets/data.txt", options).unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let package = sample_package(dir.path());
        let dest = dir.path().join("out");

        extract(&package, &dest).unwrap();

        assert_eq!(fs::read(dest.join("classes.dex")).unwrap(), b"dex-bytes");
        assert_eq!(fs::read(dest.join("assets/data.txt")).unwrap(), b"hello");
    }

    #[test]
    fn reference_table_matches_content_crcs() {
        let dir = tempfile::tempdir().unwrap();
        let package = sample_package(dir.path());

        let table = reference_crcs(&package).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["classes.dex"], crc32fast::hash(b"dex-bytes"));
        assert_eq!(table["assets/data.txt"], crc32fast::hash(b"hello"));
    }

    #[test]
    fn missing_package_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract(&dir.path().join("absent.apk"), dir.path());
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
