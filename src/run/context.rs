//! Run-scoped configuration and progress reporting.
//!
//! Everything a run needs travels in [`RunConfig`] and [`ProgressSink`];
//! there is no process-wide state, so independent runs can execute in
//! parallel without coordination.

use std::path::PathBuf;

/// Remote document root for versioned patch lists, overridable per run.
pub const DEFAULT_PATCH_BASE_URL: &str =
    "https://raw.githubusercontent.com/apkpatch/patches/main";

/// Configuration for one package run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The package to patch.
    pub input: PathBuf,
    /// Where the finished package is written.
    pub output: PathBuf,
    /// Version string used to look up the patch list.
    pub version: String,
    /// Keystore for signing; `None` leaves the output unsigned.
    pub keystore: Option<PathBuf>,
    /// Local directory of `<version>.json` documents, preferred over the
    /// remote lookup when it holds the requested version.
    pub patch_dir: Option<PathBuf>,
    /// Remote patch document root.
    pub patch_base_url: String,
    /// Enables the manifest rewrite and reference checksum restoration
    /// steps, which carry no structural guarantees.
    pub experimental: bool,
}

/// Receives human-readable progress from a run.
///
/// Implementations must not panic; the orchestrator calls them on every
/// path including failures.
pub trait ProgressSink {
    /// A pipeline stage boundary or other headline event.
    fn step(&self, message: &str);

    /// Per-descriptor and other fine-grained notes.
    fn detail(&self, message: &str);

    /// A recoverable problem the run continued past.
    fn problem(&self, message: &str);
}

/// Default sink forwarding to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn step(&self, message: &str) {
        log::info!("{message}");
    }

    fn detail(&self, message: &str) {
        log::debug!("{message}");
    }

    fn problem(&self, message: &str) {
        log::warn!("{message}");
    }
}
