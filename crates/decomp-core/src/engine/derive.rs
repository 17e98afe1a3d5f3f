use crate::core::io::charge::{ChargeStructure, TERMINATOR_LINES};
use crate::core::models::selector::ResidueSelector;
use crate::core::models::variant::{PerVariant, VariantKind};

/// The three charge-annotated variants of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSet {
    pub structures: PerVariant<ChargeStructure>,
    /// Number of records that belong to the selected residue.
    pub matched_records: usize,
}

impl VariantSet {
    pub fn residue_found(&self) -> bool {
        self.matched_records > 0
    }

    pub fn get(&self, kind: VariantKind) -> &ChargeStructure {
        &self.structures[kind]
    }
}

/// Derives the complex, neutralized and isolated variants.
///
/// - complex: `structure` unchanged
/// - neutralized: every selected-residue record has its charge set to `0.0000`,
///   field width preserved; all other bytes identical
/// - isolated: the selected-residue records in input order, then `TER` and `END`
///
/// When nothing matches, neutralized equals complex and isolated holds only the
/// terminators; the caller decides how to report it.
pub fn derive_variants(structure: &ChargeStructure, selector: &ResidueSelector) -> VariantSet {
    let mut neutralized = structure.clone();
    let mut matched_records = 0;
    for record in neutralized.records_mut() {
        if record.belongs_to(selector) {
            record.neutralize();
            matched_records += 1;
        }
    }

    let mut isolated = ChargeStructure::new();
    for record in structure.records().filter(|r| r.belongs_to(selector)) {
        isolated.push_record(record.clone());
    }
    for terminator in TERMINATOR_LINES {
        isolated.push_line(terminator);
    }

    VariantSet {
        structures: PerVariant {
            complex: structure.clone(),
            neutralized,
            isolated,
        },
        matched_records,
    }
}
