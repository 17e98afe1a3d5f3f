use crate::core::models::snapshot::Snapshot;
use crate::core::models::variant::{PerVariant, VariantKind};
use crate::core::stats::compute_stats;
use crate::engine::collaborators::command::CommandOutcome;

/// One collaborator call made while processing a frame, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stage: &'static str,
    /// `None` for the preparation stages shared by all variants.
    pub kind: Option<VariantKind>,
    pub outcome: CommandOutcome,
}

/// Result of one variant sub-pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutcome {
    pub kind: VariantKind,
    pub solver: CommandOutcome,
    pub energy_lines: Vec<String>,
}

/// Everything one frame contributes to the run.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub snapshot: Snapshot,
    pub residue_found: bool,
    pub preparation_failure: Option<String>,
    pub energies: PerVariant<Vec<String>>,
    pub invocations: Vec<Invocation>,
}

impl FrameOutcome {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            residue_found: false,
            preparation_failure: None,
            energies: PerVariant::default(),
            invocations: Vec::new(),
        }
    }

    pub fn record_variant(&mut self, variant: VariantOutcome) {
        self.invocations.push(Invocation {
            stage: "solver",
            kind: Some(variant.kind),
            outcome: variant.solver,
        });
        self.energies[variant.kind].extend(variant.energy_lines);
    }

    pub fn observations(&self) -> usize {
        self.energies.iter().map(|(_, lines)| lines.len()).sum()
    }

    /// Per-frame value of each kind (mean of that frame's lines), NaN when the
    /// frame produced no observation for it.
    pub fn values(&self) -> PerVariant<f64> {
        self.energies.map(|_, lines| compute_stats(lines).mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collaborators::command::RunStatus;
    use std::path::PathBuf;

    fn outcome(kind: VariantKind, lines: &[&str]) -> VariantOutcome {
        VariantOutcome {
            kind,
            solver: CommandOutcome {
                command_line: "apbs solver.in".to_string(),
                status: RunStatus::Success,
                output: lines.join("\n"),
            },
            energy_lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn record_variant_collects_energies_and_invocations() {
        let mut frame = FrameOutcome::new(Snapshot {
            index: 0,
            sequence: 1,
            path: PathBuf::from("frame1.gro"),
        });
        frame.record_variant(outcome(
            VariantKind::Complex,
            &["Total electrostatic energy = -5.0 kJ/mol"],
        ));
        frame.record_variant(outcome(VariantKind::Isolated, &[]));

        assert_eq!(frame.observations(), 1);
        assert_eq!(frame.invocations.len(), 2);
        assert_eq!(frame.invocations[1].kind, Some(VariantKind::Isolated));

        let values = frame.values();
        assert_eq!(values.complex, -5.0);
        assert!(values.neutralized.is_nan());
        assert!(values.isolated.is_nan());
    }
}
