//! # Workflows Module
//!
//! Top-level entry points. A workflow resolves its collaborators, walks every
//! snapshot, reports progress and returns the reduced result.
//!
//! - **Decomposition Workflow** ([`decompose`]) - Per-frame electrostatic energy
//!   decomposition of one residue over a snapshot series.

pub mod decompose;
