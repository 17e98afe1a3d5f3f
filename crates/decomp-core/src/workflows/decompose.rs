use crate::core::io::charge::ChargeStructure;
use crate::core::models::selector::ResidueSelector;
use crate::core::models::snapshot::Snapshot;
use crate::core::models::variant::{PerVariant, VariantKind};
use crate::core::stats::{SummaryStat, delta_e, format_scientific};
use crate::engine::collaborators::preparation::{ExternalPreparer, StructurePreparer};
use crate::engine::collaborators::solver::{ExternalSolver, Solver};
use crate::engine::config::PipelineConfig;
use crate::engine::derive::{VariantSet, derive_variants};
use crate::engine::error::PipelineError;
use crate::engine::extract::{EnergyLog, extract_energy_lines};
use crate::engine::outcome::{FrameOutcome, VariantOutcome};
use crate::engine::output::RunOutputs;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scratch::FrameScratch;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    PerFrame(usize),
    Reducing,
    Done,
}

/// What one frame contributed, without the captured collaborator output.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub snapshot: Snapshot,
    pub residue_found: bool,
    pub preparation_failed: bool,
    /// Per-frame energy of each kind, NaN when the frame has no observation.
    pub values: PerVariant<f64>,
}

impl From<&FrameOutcome> for FrameSummary {
    fn from(frame: &FrameOutcome) -> Self {
        Self {
            snapshot: frame.snapshot.clone(),
            residue_found: frame.residue_found,
            preparation_failed: frame.preparation_failure.is_some(),
            values: frame.values(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecompositionResult {
    pub selector: ResidueSelector,
    pub stats: PerVariant<SummaryStat>,
    /// `E(complex) − E(isolated) − E(neutralized)` over the mean energies.
    pub delta_e: f64,
    pub frames: Vec<FrameSummary>,
    pub logs: PerVariant<EnergyLog>,
}

impl DecompositionResult {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn summary(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(
            text,
            "Electrostatic decomposition of {} over {} frame(s)",
            self.selector,
            self.frame_count()
        );
        for (kind, stat) in self.stats.iter() {
            let _ = writeln!(text, "  {:<12} {} kJ/mol (n = {})", kind, stat, stat.count);
        }
        let _ = writeln!(
            text,
            "  {:<12} {} kJ/mol",
            "ΔE",
            format_scientific(self.delta_e)
        );
        text
    }
}

/// Drives the per-frame loop over one trajectory.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    preparer: &'a dyn StructurePreparer,
    solver: &'a dyn Solver,
    reporter: &'a ProgressReporter<'a>,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        preparer: &'a dyn StructurePreparer,
        solver: &'a dyn Solver,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            config,
            preparer,
            solver,
            reporter,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state transition.");
        self.state = next;
    }

    pub fn run(&mut self) -> Result<DecompositionResult, PipelineError> {
        // === Phase 1: Discovery ===
        self.reporter.report(Progress::PhaseStart { name: "Discovery" });
        let pattern = &self.config.snapshots;
        let snapshots = pattern
            .discover()
            .map_err(|source| PipelineError::SnapshotDiscovery {
                path: pattern.directory.clone(),
                source,
            })?;
        if snapshots.is_empty() {
            return Err(PipelineError::NoSnapshots {
                directory: pattern.directory.clone(),
                pattern: pattern.to_string(),
            });
        }
        info!(
            frames = snapshots.len(),
            residue = %self.config.selector,
            "Discovered snapshots."
        );
        let mut outputs = RunOutputs::create(&self.config.output.directory)?;
        self.reporter.report(Progress::PhaseFinish);

        // === Phase 2: Per-frame processing ===
        self.reporter.report(Progress::FramesStart {
            total: snapshots.len() as u64,
        });
        let mut logs: PerVariant<EnergyLog> = PerVariant::default();
        let mut frames = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            self.transition(PipelineState::PerFrame(snapshot.index));
            self.reporter.report(Progress::FrameStart {
                index: snapshot.index,
                label: snapshot.file_name(),
            });

            let frame = self.process_frame(snapshot)?;
            outputs.record_frame(&frame)?;
            for (kind, lines) in frame.energies.iter() {
                logs[kind].append(lines.iter().cloned());
            }

            self.reporter.report(Progress::FrameFinish {
                observations: frame.observations(),
            });
            frames.push(FrameSummary::from(&frame));
        }
        self.reporter.report(Progress::FramesFinish);

        // === Phase 3: Reduction ===
        self.transition(PipelineState::Reducing);
        self.reporter.report(Progress::PhaseStart { name: "Reduction" });
        let stats = logs.map(|_, log| log.stats());
        for (kind, stat) in stats.iter() {
            info!(kind = kind.label(), n = stat.count, "{} energy: {}", kind, stat);
        }
        let delta = delta_e(
            stats.complex.mean,
            stats.isolated.mean,
            stats.neutralized.mean,
        );
        let result = DecompositionResult {
            selector: self.config.selector.clone(),
            stats,
            delta_e: delta,
            frames,
            logs,
        };
        outputs.write_summary(&result.summary())?;
        outputs.finish()?;
        self.reporter.report(Progress::PhaseFinish);

        self.transition(PipelineState::Done);
        info!(delta_e = %format_scientific(delta), "Decomposition finished.");
        Ok(result)
    }

    #[instrument(skip_all, fields(frame = snapshot.index))]
    fn process_frame(&self, snapshot: &Snapshot) -> Result<FrameOutcome, PipelineError> {
        if !snapshot.path.is_file() {
            return Err(PipelineError::MissingSnapshot {
                path: snapshot.path.clone(),
            });
        }
        let scratch_error = |source: io::Error| PipelineError::Scratch {
            frame: snapshot.index,
            source,
        };

        let scratch = FrameScratch::acquire(&self.config.output.scratch_directory, snapshot)
            .map_err(scratch_error)?;
        let mut frame = FrameOutcome::new(snapshot.clone());

        let prepared = self
            .preparer
            .prepare(snapshot, scratch.path())
            .map_err(scratch_error)?;
        frame.invocations.extend(prepared.invocations);

        match prepared.result {
            Err(failure) => {
                warn!("Preparation failed for {}: {}", snapshot, failure);
                self.reporter.report(Progress::Warning(format!(
                    "{}: preparation failed, no observations recorded",
                    snapshot
                )));
                frame.preparation_failure = Some(failure.to_string());
            }
            Ok(structure) => {
                let variants = derive_variants(&structure, &self.config.selector);
                frame.residue_found = variants.residue_found();
                if !frame.residue_found {
                    warn!(
                        "Residue {} not found in {}; isolated variant holds only terminators.",
                        self.config.selector, snapshot
                    );
                    self.reporter.report(Progress::Warning(format!(
                        "{}: residue {} not found",
                        snapshot, self.config.selector
                    )));
                }
                for outcome in self.run_variants(&variants, &scratch, snapshot.index)? {
                    frame.record_variant(outcome);
                }
            }
        }

        scratch.release().map_err(scratch_error)?;
        Ok(frame)
    }

    /// Results come back in [`VariantKind::ALL`] order in both modes.
    fn run_variants(
        &self,
        variants: &VariantSet,
        scratch: &FrameScratch,
        frame: usize,
    ) -> Result<Vec<VariantOutcome>, PipelineError> {
        let run = |kind: VariantKind| {
            self.run_variant(kind, variants.get(kind), &scratch.variant_dir(kind))
                .map_err(|source| PipelineError::Scratch { frame, source })
        };
        if self.config.parallel_variants {
            VariantKind::ALL.par_iter().map(|&kind| run(kind)).collect()
        } else {
            VariantKind::ALL.into_iter().map(run).collect()
        }
    }

    fn run_variant(
        &self,
        kind: VariantKind,
        structure: &ChargeStructure,
        dir: &Path,
    ) -> io::Result<VariantOutcome> {
        let template = &self.config.solver.template;
        let structure_file = format!("{}.pqr", kind.label());
        structure.write_to_path(dir.join(&structure_file))?;
        let descriptor = dir.join(template.descriptor_name());
        fs::write(&descriptor, template.render(&structure_file))?;

        let solver = self.solver.solve(&descriptor, dir)?;
        if !solver.status.is_success() {
            warn!(kind = kind.label(), "Solver failed: {}", solver.status);
        }
        let energy_lines: Vec<String> = extract_energy_lines(&solver.output)
            .into_iter()
            .map(str::to_string)
            .collect();
        if energy_lines.is_empty() {
            warn!(kind = kind.label(), "No energy line in solver output.");
        }

        Ok(VariantOutcome {
            kind,
            solver,
            energy_lines,
        })
    }
}

/// Runs the decomposition with the external programs named in `config`.
#[instrument(skip_all, name = "decomposition_workflow")]
pub fn run(
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<DecompositionResult, PipelineError> {
    let preparer = ExternalPreparer::new(config.preparation.clone());
    let solver = ExternalSolver::new(config.solver.command.clone());
    Pipeline::new(config, &preparer, &solver, reporter).run()
}
