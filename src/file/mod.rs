//! Low-level binary access utilities shared by every parser in the crate.
//!
//! # Key Components
//!
//! - [`crate::file::io`] - bounds-checked little-endian primitive reads/writes
//! - [`crate::file::parser`] - cursor [`Parser`](crate::file::parser::Parser)
//!   with the DEX-specific encodings (ULEB128, MUTF-8) layered on top

pub mod io;
pub mod parser;
