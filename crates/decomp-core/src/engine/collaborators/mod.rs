//! Narrow interfaces around the external programs the pipeline depends on.
//!
//! The orchestrator only sees [`preparation::StructurePreparer`] and
//! [`solver::Solver`]; the `External*` implementations shell out through
//! [`command::CommandSpec`].

pub mod command;
pub mod preparation;
pub mod solver;
