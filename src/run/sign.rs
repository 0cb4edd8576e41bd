//! Package signing through external tools.
//!
//! Two mechanisms are tried in order, first success wins: `apksigner`
//! (preferred, produces a v2 signature) then `jarsigner`. Both sign the
//! package in place. Credentials follow the debug keystore convention:
//! store and key password `android`, key alias `key`.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::{run::context::ProgressSink, Error, Result};

const STORE_PASS: &str = "android";
const KEY_ALIAS: &str = "key";

fn run_quiet(command: &mut Command) -> bool {
    command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Sign the package at `apk` in place with the given keystore.
///
/// # Errors
/// Returns [`Error::Signing`] when both tools fail or are unavailable.
pub fn sign(apk: &Path, keystore: &Path, sink: &dyn ProgressSink) -> Result<()> {
    let mut apksigner = Command::new("apksigner");
    apksigner
        .arg("sign")
        .arg("--ks")
        .arg(keystore)
        .args(["--ks-pass", &format!("pass:{STORE_PASS}")])
        .args(["--key-pass", &format!("pass:{STORE_PASS}")])
        .arg(apk);
    if run_quiet(&mut apksigner) {
        sink.detail("Signed with apksigner");
        return Ok(());
    }

    let mut jarsigner = Command::new("jarsigner");
    jarsigner
        .arg("-keystore")
        .arg(keystore)
        .args(["-storepass", STORE_PASS])
        .args(["-keypass", STORE_PASS])
        .arg(apk)
        .arg(KEY_ALIAS);
    if run_quiet(&mut jarsigner) {
        sink.detail("Signed with jarsigner");
        return Ok(());
    }

    Err(Error::Signing(
        "apksigner and jarsigner both failed or are unavailable".into(),
    ))
}
