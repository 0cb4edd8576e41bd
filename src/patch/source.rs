//! Patch list retrieval.
//!
//! A [`PatchSource`] turns a version string into a [`PatchSet`]. Two
//! implementations exist: a local directory of `<version>.json` documents
//! (which takes precedence when the file is present) and a remote HTTP
//! lookup with a bounded timeout and no automatic retry. Either way, a
//! malformed or unreachable source is fatal for the run.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{patch::PatchSet, Error, Result};

/// Timeout for the remote patch list lookup. Not retried on failure.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider of patch documents keyed by app version.
pub trait PatchSource {
    /// Fetch and parse the patch document for `version`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Fetch`] if the document cannot be retrieved
    /// and [`crate::Error::Json`] if it cannot be parsed.
    fn fetch(&self, version: &str) -> Result<PatchSet>;
}

/// Patch documents stored as `<dir>/<version>.json`.
pub struct LocalPatchSource {
    dir: PathBuf,
}

impl LocalPatchSource {
    /// Create a source over a directory of patch documents.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalPatchSource { dir: dir.into() }
    }

    /// Path of the document for `version`, whether or not it exists.
    #[must_use]
    pub fn document_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{version}.json"))
    }

    /// Returns `true` if a document for `version` is present locally.
    #[must_use]
    pub fn has_version(&self, version: &str) -> bool {
        self.document_path(version).is_file()
    }
}

impl PatchSource for LocalPatchSource {
    fn fetch(&self, version: &str) -> Result<PatchSet> {
        let path = self.document_path(version);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| Error::Fetch(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Remote patch documents at `<base_url>/<version>.json`.
pub struct HttpPatchSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpPatchSource {
    /// Create a source over a remote document root.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpPatchSource {
            base_url: base_url.into(),
            agent: ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build(),
        }
    }
}

impl PatchSource for HttpPatchSource {
    fn fetch(&self, version: &str) -> Result<PatchSet> {
        let url = format!("{}/{}.json", self.base_url.trim_end_matches('/'), version);

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;
        let text = response
            .into_string()
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;

        Ok(serde_json::from_str(&text)?)
    }
}

/// Build the source for a run: a local directory override when `local_dir`
/// holds a document for `version`, otherwise the remote lookup.
#[must_use]
pub fn select_source(
    local_dir: Option<&Path>,
    base_url: &str,
    version: &str,
) -> Box<dyn PatchSource> {
    if let Some(dir) = local_dir {
        let local = LocalPatchSource::new(dir);
        if local.has_version(version) {
            return Box::new(local);
        }
    }
    Box::new(HttpPatchSource::new(base_url))
}
