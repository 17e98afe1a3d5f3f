//! # Core Module
//!
//! Stateless building blocks of the decomposition: the identifiers that describe
//! *what* is analysed (snapshots, the selected residue, the three structural
//! variants), the charge-annotated structure format exchanged with the external
//! programs, and the statistics used for the final reduction.
//!
//! - **Data models** ([`models`]) - snapshots, residue selector, variant kinds
//! - **File I/O** ([`io`]) - the whitespace-delimited charge/radius structure format
//! - **Statistics** ([`stats`]) - field extraction, mean / sample SD, ΔE

pub mod io;
pub mod models;
pub mod stats;
