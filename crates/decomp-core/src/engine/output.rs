use crate::core::models::variant::{PerVariant, VariantKind};
use crate::engine::error::PipelineError;
use crate::engine::outcome::FrameOutcome;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DIAGNOSTIC_LOG_FILE: &str = "run.log";
pub const ENERGY_TABLE_FILE: &str = "energies.csv";
pub const SUMMARY_FILE: &str = "summary.txt";

pub fn energy_log_file(kind: VariantKind) -> String {
    format!("{}_energy.log", kind.label())
}

#[derive(Debug, Serialize)]
struct EnergyRow<'a> {
    frame: usize,
    snapshot: &'a str,
    complex: f64,
    neutralized: f64,
    isolated: f64,
}

/// Files persisted for the whole run. All of them are truncated on creation.
///
/// - `<kind>_energy.log`: one raw solver line per observation
/// - `run.log`: captured output of every collaborator call
/// - `energies.csv`: one row per frame, `NaN` where a kind has no observation
/// - `summary.txt`: the final summary block
pub struct RunOutputs {
    directory: PathBuf,
    energy_logs: PerVariant<BufWriter<File>>,
    diagnostics: BufWriter<File>,
    table: csv::Writer<File>,
}

impl RunOutputs {
    pub fn create(directory: &Path) -> io::Result<Self> {
        fs::create_dir_all(directory)?;
        let open = |name: &str| File::create(directory.join(name)).map(BufWriter::new);

        let energy_logs = PerVariant {
            complex: open(&energy_log_file(VariantKind::Complex))?,
            neutralized: open(&energy_log_file(VariantKind::Neutralized))?,
            isolated: open(&energy_log_file(VariantKind::Isolated))?,
        };
        let diagnostics = open(DIAGNOSTIC_LOG_FILE)?;
        let table = csv::Writer::from_path(directory.join(ENERGY_TABLE_FILE))
            .map_err(io::Error::other)?;

        Ok(Self {
            directory: directory.to_path_buf(),
            energy_logs,
            diagnostics,
            table,
        })
    }

    /// Persists everything one frame produced, flushing so that an aborted run
    /// still leaves complete records of the finished frames.
    pub fn record_frame(&mut self, frame: &FrameOutcome) -> Result<(), PipelineError> {
        let snapshot_name = frame.snapshot.file_name();

        for invocation in &frame.invocations {
            let scope = invocation.kind.map_or("all", VariantKind::label);
            writeln!(
                self.diagnostics,
                "==> frame {} ({}) | {} | {}: {} [{}]",
                frame.snapshot.index,
                snapshot_name,
                scope,
                invocation.stage,
                invocation.outcome.command_line,
                invocation.outcome.status
            )?;
            self.diagnostics
                .write_all(invocation.outcome.output.as_bytes())?;
            if !invocation.outcome.output.is_empty() && !invocation.outcome.output.ends_with('\n') {
                writeln!(self.diagnostics)?;
            }
        }
        if let Some(reason) = &frame.preparation_failure {
            writeln!(
                self.diagnostics,
                "==> frame {} ({}) | preparation failed: {}",
                frame.snapshot.index, snapshot_name, reason
            )?;
        } else if !frame.residue_found {
            writeln!(
                self.diagnostics,
                "==> frame {} ({}) | residue not found: isolated variant holds only terminators",
                frame.snapshot.index, snapshot_name
            )?;
        }
        self.diagnostics.flush()?;

        for (kind, lines) in frame.energies.iter() {
            let writer = &mut self.energy_logs[kind];
            for line in lines {
                writeln!(writer, "{}", line)?;
            }
            writer.flush()?;
        }

        let values = frame.values();
        self.table.serialize(EnergyRow {
            frame: frame.snapshot.index,
            snapshot: &snapshot_name,
            complex: values.complex,
            neutralized: values.neutralized,
            isolated: values.isolated,
        })?;
        self.table.flush()?;
        Ok(())
    }

    pub fn write_summary(&self, summary: &str) -> io::Result<()> {
        fs::write(self.directory.join(SUMMARY_FILE), summary)
    }

    pub fn finish(mut self) -> io::Result<()> {
        for kind in VariantKind::ALL {
            self.energy_logs[kind].flush()?;
        }
        self.diagnostics.flush()?;
        self.table.flush()
    }
}
