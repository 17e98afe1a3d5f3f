use super::command::{CommandSpec, RunStatus, Substitutions};
use crate::core::io::charge::{ChargeFormatError, ChargeStructure};
use crate::core::models::snapshot::Snapshot;
use crate::engine::config::PreparationConfig;
use crate::engine::outcome::Invocation;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

pub const CONVERTED_FILE: &str = "frame.pdb";
pub const CHAIN_FILE: &str = "chain.pdb";
pub const PARAMETERIZED_FILE: &str = "frame.pqr";

/// Turns a raw snapshot into its charge-annotated structure.
pub trait StructurePreparer: Sync {
    /// `workdir` is the frame's scratch namespace. `Err` is reserved for
    /// scratch I/O; collaborator failures are reported inside [`Prepared`].
    fn prepare(&self, snapshot: &Snapshot, workdir: &Path) -> io::Result<Prepared>;
}

#[derive(Debug)]
pub struct Prepared {
    pub result: Result<ChargeStructure, PreparationFailure>,
    pub invocations: Vec<Invocation>,
}

#[derive(Debug, Error)]
pub enum PreparationFailure {
    #[error("{stage} failed ({status})")]
    Collaborator { stage: &'static str, status: RunStatus },
    #[error("{stage} produced no output at {path}", path = path.display())]
    MissingOutput { stage: &'static str, path: PathBuf },
    #[error("parameterized structure is malformed: {0}")]
    Malformed(#[from] ChargeFormatError),
}

/// Runs the configured conversion, chain extraction and parameterization
/// programs one after the other.
pub struct ExternalPreparer {
    config: PreparationConfig,
}

impl ExternalPreparer {
    pub fn new(config: PreparationConfig) -> Self {
        Self { config }
    }

    fn run_stage(
        &self,
        stage: &'static str,
        spec: &CommandSpec,
        input: &Path,
        output: &Path,
        workdir: &Path,
        invocations: &mut Vec<Invocation>,
    ) -> io::Result<Result<(), PreparationFailure>> {
        let subs = Substitutions {
            input: Some(input),
            output: Some(output),
            chain: Some(&self.config.chain_id),
        };
        let outcome = spec.run(workdir, &subs)?;
        let status = outcome.status.clone();
        invocations.push(Invocation {
            stage,
            kind: None,
            outcome,
        });

        if !status.is_success() {
            return Ok(Err(PreparationFailure::Collaborator { stage, status }));
        }
        let produced = std::fs::metadata(output).is_ok_and(|m| m.is_file() && m.len() > 0);
        if !produced {
            return Ok(Err(PreparationFailure::MissingOutput {
                stage,
                path: output.to_path_buf(),
            }));
        }
        debug!(stage, output = ?output, "Preparation stage finished.");
        Ok(Ok(()))
    }
}

impl StructurePreparer for ExternalPreparer {
    #[instrument(skip_all, fields(frame = snapshot.index))]
    fn prepare(&self, snapshot: &Snapshot, workdir: &Path) -> io::Result<Prepared> {
        let mut invocations = Vec::new();

        let mut stages: Vec<(&'static str, &CommandSpec, PathBuf)> = vec![(
            "convert",
            &self.config.convert,
            workdir.join(CONVERTED_FILE),
        )];
        if let Some(extract) = &self.config.extract_chain {
            stages.push(("extract-chain", extract, workdir.join(CHAIN_FILE)));
        }
        stages.push((
            "parameterize",
            &self.config.parameterize,
            workdir.join(PARAMETERIZED_FILE),
        ));

        let mut input = snapshot.path.clone();
        for (stage, spec, output) in stages {
            if let Err(failure) =
                self.run_stage(stage, spec, &input, &output, workdir, &mut invocations)?
            {
                return Ok(Prepared {
                    result: Err(failure),
                    invocations,
                });
            }
            input = output;
        }

        let result = ChargeStructure::read_from_path(&input).map_err(PreparationFailure::from);
        Ok(Prepared {
            result,
            invocations,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PQR: &str = "ATOM      1  C1  LIG   301       0.000   0.000   0.000 -0.4157 1.9080\n";

    fn shell(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    fn snapshot_in(dir: &Path) -> Snapshot {
        let path = dir.join("frame1.gro");
        fs::write(&path, PQR).unwrap();
        Snapshot {
            index: 0,
            sequence: 1,
            path,
        }
    }

    fn config(extract_chain: Option<CommandSpec>, parameterize: CommandSpec) -> PreparationConfig {
        PreparationConfig {
            convert: shell("cp {input} {output}"),
            extract_chain,
            parameterize,
            chain_id: "A".to_string(),
        }
    }

    #[test]
    fn prepare_chains_stages_and_parses_structure() {
        let input_dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let snapshot = snapshot_in(input_dir.path());
        let preparer = ExternalPreparer::new(config(
            Some(shell("echo chain {chain} >&2; cat {input}").with_stdout_to_output(true)),
            shell("cp {input} {output}"),
        ));

        let prepared = preparer.prepare(&snapshot, work.path()).unwrap();

        let structure = prepared.result.unwrap();
        assert_eq!(structure.to_text(), PQR);
        let stages: Vec<_> = prepared.invocations.iter().map(|i| i.stage).collect();
        assert_eq!(stages, vec!["convert", "extract-chain", "parameterize"]);
        assert!(prepared.invocations[1].outcome.output.contains("chain A"));
    }

    #[test]
    fn prepare_stops_at_first_failing_stage() {
        let input_dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let snapshot = snapshot_in(input_dir.path());
        let preparer = ExternalPreparer::new(config(None, shell("echo no charges; exit 1")));

        let prepared = preparer.prepare(&snapshot, work.path()).unwrap();

        match prepared.result {
            Err(PreparationFailure::Collaborator { stage, status }) => {
                assert_eq!(stage, "parameterize");
                assert_eq!(status, RunStatus::Failed { code: Some(1) });
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(prepared.invocations.len(), 2);
    }

    #[test]
    fn prepare_treats_empty_output_as_failure() {
        let input_dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let snapshot = snapshot_in(input_dir.path());
        let preparer = ExternalPreparer::new(config(None, shell(": > {output}")));

        let prepared = preparer.prepare(&snapshot, work.path()).unwrap();

        assert!(matches!(
            prepared.result,
            Err(PreparationFailure::MissingOutput {
                stage: "parameterize",
                ..
            })
        ));
    }

    #[test]
    fn prepare_reports_malformed_structure() {
        let input_dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let snapshot = snapshot_in(input_dir.path());
        let preparer = ExternalPreparer::new(config(None, shell("echo 'ATOM 1 C' > {output}")));

        let prepared = preparer.prepare(&snapshot, work.path()).unwrap();

        assert!(matches!(
            prepared.result,
            Err(PreparationFailure::Malformed(_))
        ));
    }
}
