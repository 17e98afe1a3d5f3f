//! # Engine Module
//!
//! Per-frame machinery of the decomposition pipeline: variant derivation,
//! collaborator invocation, energy extraction and run outputs.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Resolved pipeline parameters and their builder
//! - **Collaborators** ([`collaborators`]) - External preparation and solver programs
//! - **Derivation** ([`derive`]) - Complex, neutralized and isolated structures
//! - **Extraction** ([`extract`]) - Energy lines and their per-kind accumulators
//! - **Scratch** ([`scratch`]) - Per-frame temporary namespaces
//! - **Outputs** ([`output`]) - Energy logs, diagnostic log, energy table and summary
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - Errors that abort a run

pub mod collaborators;
pub mod config;
pub mod derive;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod output;
pub mod progress;
pub mod scratch;
