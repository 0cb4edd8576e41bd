//! apkpatch patches compiled Android packages in place.
//!
//! Given a package and a version-keyed list of patch descriptors, the crate
//! stubs out methods inside DEX bytecode images, overwrites fixed-width
//! AArch64 instruction templates at absolute offsets in native libraries,
//! and rebuilds the package so the platform loader still accepts it:
//! stored entries stay 4-byte aligned, and every DEX image is resealed
//! with a fresh SHA-1 signature and Adler-32 checksum after mutation.
//!
//! # Architecture
//!
//! - [`dex`] parses the DEX header and index tables, resolves a
//!   `(class, method)` pair to the byte offset of its first instruction,
//!   and reseals images after edits.
//! - [`native`] writes return-stub instruction templates into native
//!   images at externally supplied offsets.
//! - [`archive`] extracts packages, reassembles them with store-vs-deflate
//!   and alignment rules, and can copy per-entry checksums from an
//!   unmodified reference package into the rebuilt one.
//! - [`patch`] models the descriptor document and its local and remote
//!   sources.
//! - [`run`] sequences one package through the whole pipeline and reports
//!   per-descriptor outcomes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use apkpatch::run::{LogSink, RunConfig, Runner, DEFAULT_PATCH_BASE_URL};
//!
//! let config = RunConfig {
//!     input: "app_3.21.4.apk".into(),
//!     output: "app_3.21.4_patched.apk".into(),
//!     version: "3.21.4".into(),
//!     keystore: None,
//!     patch_dir: None,
//!     patch_base_url: DEFAULT_PATCH_BASE_URL.into(),
//!     experimental: false,
//! };
//! let report = Runner::new(&config, &LogSink).run()?;
//! println!("{report}");
//! # Ok::<(), apkpatch::Error>(())
//! ```

#![warn(missing_docs)]

#[macro_use]
mod error;

pub mod archive;
pub mod dex;
pub mod file;
pub mod native;
pub mod patch;
pub mod run;

pub use error::Error;

/// Convenience alias used by every fallible operation in this crate.
///
/// # Examples
///
/// ```rust,no_run
/// use apkpatch::{dex::DexImage, Result};
///
/// fn load(path: &str) -> Result<DexImage> {
///     DexImage::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
