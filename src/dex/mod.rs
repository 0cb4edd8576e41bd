//! Managed bytecode (DEX) image access and patching.
//!
//! This module parses enough of the DEX container to resolve a
//! `(type, method)` pair to a byte offset and keep the image's
//! self-consistency digests valid after a partial overwrite. It is not a
//! disassembler: instruction decoding, control flow, and everything beyond
//! the four index tables the resolver needs are deliberately absent.
//!
//! # Key Components
//!
//! - [`DexHeader`] - fixed 112-byte header and the four `(offset, count)`
//!   index section descriptors
//! - [`StringTable`] - decoded MUTF-8 string table
//! - [`DexImage`] - owned image bytes plus derived lookup tables
//! - [`resolver`] - `(type, method)` -> instruction stream offset
//! - [`reseal`] - SHA-1 + Adler-32 recomputation after mutation
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use apkpatch::{dex::{resolver, DexImage}, patch::PatchOp};
//!
//! let mut image = DexImage::from_file("classes.dex".as_ref())?;
//! if let Some(offset) = resolver::resolve(&image, "Lcom/app/Check;", "verify")? {
//!     let stub = PatchOp::ReturnVoid.dalvik_stub().unwrap();
//!     image.overwrite(offset, stub)?;
//!     image.reseal()?;
//! }
//! # Ok::<(), apkpatch::Error>(())
//! ```

pub mod header;
pub mod reseal;
pub mod resolver;
mod image;
mod strings;

#[cfg(test)]
pub(crate) mod test_support;

pub use header::DexHeader;
pub use image::DexImage;
pub use reseal::{is_sealed, reseal};
pub use strings::StringTable;
