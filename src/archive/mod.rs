//! Package container handling: extraction, reassembly with alignment
//! rules, and reference checksum restoration.

pub mod assemble;
pub mod crc;
pub mod extract;

pub use assemble::assemble;
pub use crc::restore;
pub use extract::{extract, reference_crcs};
