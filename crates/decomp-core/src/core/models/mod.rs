pub mod selector;
pub mod snapshot;
pub mod variant;
