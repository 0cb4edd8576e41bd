//! Patch descriptor model and retrieval.
//!
//! # Key Components
//!
//! - [`PatchDescriptor`] / [`PatchSet`] - the typed, validated-at-load
//!   descriptor model
//! - [`PatchOp`] - the three stub operations and their byte templates
//! - [`PatchSource`] with [`LocalPatchSource`] and [`HttpPatchSource`] -
//!   version-keyed document lookup, local override first

mod descriptor;
mod source;

pub use descriptor::{PatchDescriptor, PatchOp, PatchSet, DEFAULT_NATIVE_TARGET};
pub use source::{select_source, HttpPatchSource, LocalPatchSource, PatchSource};
