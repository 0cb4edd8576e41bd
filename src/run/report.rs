//! Per-descriptor outcome accumulation.

use std::fmt;

/// What happened to one named patch descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The patch was written.
    Applied {
        /// Addresses attempted, a best-effort figure rather than a
        /// correctness proof.
        locations: usize,
    },
    /// Nothing was written and the run continued.
    Skipped(String),
    /// The patch failed in a way that does not abort the run.
    Errored(String),
}

/// Collected outcomes for a run, in descriptor order.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<(String, PatchOutcome)>,
}

impl RunReport {
    /// An empty report.
    #[must_use]
    pub fn new() -> Self {
        RunReport::default()
    }

    /// Append the outcome for one named descriptor.
    pub fn record(&mut self, name: impl Into<String>, outcome: PatchOutcome) {
        self.outcomes.push((name.into(), outcome));
    }

    /// Outcomes by descriptor name, in the order they were applied.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatchOutcome)> {
        self.outcomes.iter().map(|(name, o)| (name.as_str(), o))
    }

    /// Number of descriptors that were written.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, PatchOutcome::Applied { .. }))
    }

    /// Number of descriptors skipped without touching a file.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, PatchOutcome::Skipped(_)))
    }

    /// Number of descriptors that failed non-fatally.
    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, PatchOutcome::Errored(_)))
    }

    /// Total number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no outcomes have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&PatchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} applied, {} skipped, {} errored",
            self.applied(),
            self.skipped(),
            self.errored()
        )?;
        for (name, outcome) in self.iter() {
            match outcome {
                PatchOutcome::Applied { locations } => {
                    writeln!(f, "  + {name} ({locations} location(s))")?;
                }
                PatchOutcome::Skipped(reason) => writeln!(f, "  - {name}: {reason}")?,
                PatchOutcome::Errored(reason) => writeln!(f, "  ! {name}: {reason}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_outcome_kind() {
        let mut report = RunReport::new();
        report.record("a", PatchOutcome::Applied { locations: 3 });
        report.record("b", PatchOutcome::Skipped("absent".into()));
        report.record("c", PatchOutcome::Errored("bad image".into()));
        report.record("d", PatchOutcome::Applied { locations: 1 });

        assert_eq!(report.len(), 4);
        assert_eq!(report.applied(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.errored(), 1);
    }

    #[test]
    fn display_lists_every_descriptor_by_name() {
        let mut report = RunReport::new();
        report.record("trim-check", PatchOutcome::Applied { locations: 1 });
        report.record("old-gate", PatchOutcome::Skipped("no such method".into()));

        let text = report.to_string();
        assert!(text.contains("trim-check"));
        assert!(text.contains("old-gate: no such method"));
        assert!(text.starts_with("1 applied, 1 skipped, 0 errored"));
    }
}
