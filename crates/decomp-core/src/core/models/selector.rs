use std::fmt;

/// Identifies the residue under study by residue name and sequence number.
///
/// The selector is constant for a whole run. Matching compares the residue
/// name verbatim and the residue number numerically, so `"0301"` in a record
/// still matches a selector built with `301`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueSelector {
    pub name: String,
    pub number: isize,
}

impl ResidueSelector {
    pub fn new(name: impl Into<String>, number: isize) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }

    pub fn matches(&self, residue_name: &str, residue_number: &str) -> bool {
        residue_name == self.name
            && residue_number
                .parse::<isize>()
                .is_ok_and(|number| number == self.number)
    }
}

impl fmt::Display for ResidueSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.number)
    }
}
