//! Reading, patching and writing charge-annotated structures.
//!
//! The parameterization program emits one whitespace-delimited record per atom
//! (`ATOM serial name resName resSeq x y z charge radius`). The types in
//! [`charge`] keep every line byte-for-byte and only expose field-level edits
//! that preserve the surrounding layout.

pub mod charge;
