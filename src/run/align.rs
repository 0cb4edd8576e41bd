//! Loader-mandated alignment via `zipalign`.

use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
};

use crate::{run::context::ProgressSink, Result};

/// Run `zipalign -f 4` from `input` to `output`, falling back to a plain
/// copy when the tool is unavailable or fails.
///
/// The copy fallback is acceptable because the assembler already places
/// loader-mapped entries on 4-byte boundaries; `zipalign` additionally
/// normalizes everything else. Returns whether the tool actually ran.
///
/// # Errors
/// Returns [`crate::Error::Io`] when the fallback copy fails.
pub fn align(input: &Path, output: &Path, sink: &dyn ProgressSink) -> Result<bool> {
    let aligned = Command::new("zipalign")
        .args(["-f", "4"])
        .arg(input)
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);

    if aligned {
        sink.detail("Aligned with zipalign");
        return Ok(true);
    }

    sink.problem("zipalign unavailable, copying the package as assembled");
    fs::copy(input, output)?;
    Ok(false)
}
