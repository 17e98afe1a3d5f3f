//! # elecdecomp Core Library
//!
//! Per-frame electrostatic interaction-energy decomposition of a single residue
//! (typically a bound ligand) across a trajectory of structural snapshots.
//!
//! For every snapshot the library derives three charge-annotated variants of the
//! system, hands each one to an external Poisson-Boltzmann solver, collects the
//! reported total electrostatic energy, and finally reduces the three energy
//! series to mean, sample standard deviation and the interaction energy
//! `ΔE = E(complex) − E(isolated) − E(neutralized)`.
//!
//! ## Architectural Philosophy
//!
//! The crate keeps the same three-layer split used across our tooling:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Snapshot`,
//!   `ResidueSelector`, `VariantKind`), the charge-annotated structure format,
//!   and the streaming statistics.
//!
//! - **[`engine`]: The Logic Core.** Configuration, variant derivation, the
//!   collaborator interfaces wrapping external programs, energy extraction,
//!   scratch storage and persisted run outputs.
//!
//! - **[`workflows`]: The Public API.** The decomposition pipeline that drives
//!   the engine over a whole trajectory and returns the final statistics.

pub mod core;
pub mod engine;
pub mod workflows;
