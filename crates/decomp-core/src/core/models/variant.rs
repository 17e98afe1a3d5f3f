use std::fmt;
use std::ops::{Index, IndexMut};

/// The three structural variants analysed for every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantKind {
    /// Full structure, all charges intact.
    Complex,
    /// Full structure with the selected residue's charges zeroed.
    Neutralized,
    /// Only the selected residue's atoms.
    Isolated,
}

impl VariantKind {
    /// Fixed processing order. Only log grouping depends on it.
    pub const ALL: [VariantKind; 3] = [
        VariantKind::Complex,
        VariantKind::Neutralized,
        VariantKind::Isolated,
    ];

    /// Lower-case name used for file and directory names.
    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Complex => "complex",
            VariantKind::Neutralized => "neutralized",
            VariantKind::Isolated => "isolated",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantKind::Complex => "Complex",
            VariantKind::Neutralized => "Neutralized",
            VariantKind::Isolated => "Isolated",
        };
        f.pad(name)
    }
}

/// One value per [`VariantKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerVariant<T> {
    pub complex: T,
    pub neutralized: T,
    pub isolated: T,
}

impl<T> PerVariant<T> {
    pub fn from_fn(mut f: impl FnMut(VariantKind) -> T) -> Self {
        Self {
            complex: f(VariantKind::Complex),
            neutralized: f(VariantKind::Neutralized),
            isolated: f(VariantKind::Isolated),
        }
    }

    pub fn get(&self, kind: VariantKind) -> &T {
        match kind {
            VariantKind::Complex => &self.complex,
            VariantKind::Neutralized => &self.neutralized,
            VariantKind::Isolated => &self.isolated,
        }
    }

    pub fn get_mut(&mut self, kind: VariantKind) -> &mut T {
        match kind {
            VariantKind::Complex => &mut self.complex,
            VariantKind::Neutralized => &mut self.neutralized,
            VariantKind::Isolated => &mut self.isolated,
        }
    }

    /// Iterates in [`VariantKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (VariantKind, &T)> {
        VariantKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(VariantKind, &T) -> U) -> PerVariant<U> {
        PerVariant::from_fn(|kind| f(kind, self.get(kind)))
    }
}

impl<T> Index<VariantKind> for PerVariant<T> {
    type Output = T;

    fn index(&self, kind: VariantKind) -> &T {
        self.get(kind)
    }
}

impl<T> IndexMut<VariantKind> for PerVariant<T> {
    fn index_mut(&mut self, kind: VariantKind) -> &mut T {
        self.get_mut(kind)
    }
}
