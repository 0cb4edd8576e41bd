//! The patching pipeline.
//!
//! One run processes one package through a fixed sequence of steps:
//! fetch the patch list, extract the container into a scratch directory,
//! apply every descriptor, reassemble, optionally restore reference
//! checksums, align, sign, and write the output. Per-descriptor failures
//! are recorded in the [`RunReport`] and do not abort the run; extraction,
//! reassembly, and signing failures do.
//!
//! The scratch directory is a [`tempfile::TempDir`] released on every exit
//! path, so an aborted run leaves nothing behind.

pub mod align;
pub mod context;
pub mod manifest;
pub mod report;
pub mod sign;
pub mod version;

pub use context::{LogSink, ProgressSink, RunConfig, DEFAULT_PATCH_BASE_URL};
pub use report::{PatchOutcome, RunReport};

use std::{fs, path::Path};

use crate::{
    archive, dex,
    dex::DexImage,
    native,
    patch::{select_source, PatchDescriptor},
    Error, Result,
};

/// Executes the pipeline for one package.
pub struct Runner<'a> {
    config: &'a RunConfig,
    sink: &'a dyn ProgressSink,
}

impl<'a> Runner<'a> {
    /// Bind a configuration and progress sink for one run.
    pub fn new(config: &'a RunConfig, sink: &'a dyn ProgressSink) -> Self {
        Runner { config, sink }
    }

    /// Run the whole pipeline and return the per-descriptor report.
    ///
    /// # Errors
    /// Returns the first fatal error: an unreachable or malformed patch
    /// source, an unreadable input container, a reassembly failure, or a
    /// signing failure when a keystore is configured. Individual descriptor
    /// failures are captured in the report instead.
    pub fn run(&self) -> Result<RunReport> {
        let source = select_source(
            self.config.patch_dir.as_deref(),
            &self.config.patch_base_url,
            &self.config.version,
        );
        let set = source.fetch(&self.config.version)?;
        self.sink.step(&format!(
            "Fetched {} patch descriptor(s) for version {}",
            set.patches.len(),
            self.config.version
        ));

        let scratch = tempfile::tempdir()?;
        let tree = scratch.path().join("extracted");
        self.sink.step(&format!("Extracting {}", self.config.input.display()));
        archive::extract(&self.config.input, &tree)?;

        if self.config.experimental {
            self.rewrite_manifest(&tree)?;
        }

        let mut report = RunReport::new();
        for descriptor in &set.patches {
            let outcome = self.apply(&tree, descriptor);
            match &outcome {
                PatchOutcome::Applied { locations } => self
                    .sink
                    .detail(&format!("{}: applied at {locations} location(s)", descriptor.name())),
                PatchOutcome::Skipped(reason) => self
                    .sink
                    .detail(&format!("{}: skipped ({reason})", descriptor.name())),
                PatchOutcome::Errored(reason) => self
                    .sink
                    .problem(&format!("{}: {reason}", descriptor.name())),
            }
            report.record(descriptor.name(), outcome);
        }

        self.sink.step("Reassembling package");
        let mut container = archive::assemble(&tree)?;

        if self.config.experimental {
            let reference = archive::reference_crcs(&self.config.input)?;
            let restored = archive::restore(&mut container, &reference);
            self.sink
                .step(&format!("Restored {restored} reference checksum field(s)"));
        }

        let assembled = scratch.path().join("assembled.apk");
        fs::write(&assembled, &container)?;

        let aligned = scratch.path().join("aligned.apk");
        align::align(&assembled, &aligned, self.sink)?;

        if let Some(keystore) = &self.config.keystore {
            self.sink.step("Signing package");
            sign::sign(&aligned, keystore, self.sink)?;
        } else {
            self.sink.problem("No keystore configured, output is unsigned");
        }

        fs::copy(&aligned, &self.config.output)?;
        self.sink
            .step(&format!("Wrote {}", self.config.output.display()));

        Ok(report)
    }

    /// Apply one descriptor, folding the error taxonomy into an outcome:
    /// absent targets and unknown operations are skips, everything else a
    /// recorded error.
    fn apply(&self, tree: &Path, descriptor: &PatchDescriptor) -> PatchOutcome {
        match self.try_apply(tree, descriptor) {
            Ok(outcome) => outcome,
            Err(Error::NotFound(what)) => PatchOutcome::Skipped(format!("not found: {what}")),
            Err(Error::Unsupported(what)) => {
                PatchOutcome::Skipped(format!("unsupported operation: {what}"))
            }
            Err(error) => PatchOutcome::Errored(error.to_string()),
        }
    }

    fn try_apply(&self, tree: &Path, descriptor: &PatchDescriptor) -> Result<PatchOutcome> {
        let target = tree.join(descriptor.target_entry());
        if !target.is_file() {
            return Ok(PatchOutcome::Skipped(format!(
                "entry {} not present in package",
                descriptor.target_entry()
            )));
        }

        match descriptor {
            PatchDescriptor::Dex {
                class_name,
                method_name,
                patch,
                ..
            } => {
                let Some(stub) = patch.dalvik_stub() else {
                    return Ok(PatchOutcome::Skipped("unknown operation".into()));
                };

                let mut image = DexImage::from_file(&target)?;
                let Some(offset) = dex::resolver::resolve(&image, class_name, method_name)? else {
                    return Ok(PatchOutcome::Skipped(format!(
                        "{class_name}->{method_name} not present"
                    )));
                };

                image.overwrite(offset, stub)?;
                image.reseal()?;
                fs::write(&target, image.into_bytes())?;
                Ok(PatchOutcome::Applied { locations: 1 })
            }

            PatchDescriptor::Native { offsets, patch, .. } => {
                let mut bytes = fs::read(&target)?;
                let locations = native::apply(&mut bytes, offsets, *patch)?;
                fs::write(&target, bytes)?;
                Ok(PatchOutcome::Applied { locations })
            }
        }
    }

    /// Experimental: swap the protection runtime's application class for
    /// the stock one inside the binary manifest.
    fn rewrite_manifest(&self, tree: &Path) -> Result<()> {
        let path = tree.join("AndroidManifest.xml");
        if !path.is_file() {
            return Ok(());
        }

        let mut data = fs::read(&path)?;
        if manifest::neutralize_application(&mut data) {
            fs::write(&path, data)?;
            self.sink.step("Replaced protected application class in the manifest");
        } else {
            self.sink
                .detail("Protected application class not present in the manifest");
        }
        Ok(())
    }
}
