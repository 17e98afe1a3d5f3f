use super::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a decomposition run.
///
/// Collaborator failures, missing residues and extraction misses are not
/// represented here; they are logged and the run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot list snapshot directory '{path}': {source}", path = path.display())]
    SnapshotDiscovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No snapshot files matching '{pattern}' in '{directory}'", directory = directory.display())]
    NoSnapshots { directory: PathBuf, pattern: String },

    #[error("Snapshot file is missing: {path}", path = path.display())]
    MissingSnapshot { path: PathBuf },

    #[error("Scratch storage failure for frame {frame}: {source}")]
    Scratch {
        frame: usize,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write run outputs: {0}")]
    Output(#[from] io::Error),

    #[error("Failed to write energy table: {0}")]
    Table(#[from] csv::Error),
}
