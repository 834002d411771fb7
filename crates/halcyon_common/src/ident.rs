//! Interned identifiers with O(1) equality and cloning.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name for a module, signal, process, or port.
///
/// `Ident` is a `u32` key into an [`Interner`]; comparing two idents is an
/// integer compare and cloning is a copy. The interner that created an
/// ident is needed to resolve it back to text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Builds an `Ident` from a raw key, for deserialization and tests.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` key.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: the key is a `u32`, which always fits in `usize` on supported
// targets; `try_from_usize` rejects anything wider.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner shared across the whole optimization session.
///
/// The external parser collaborator owns the interner and hands it to the
/// optimizer by reference; passes that synthesize fresh names (the
/// flattener, the specializer) intern them here so the emitter can resolve
/// every name from one place.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, reusing the existing key if it was seen before.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves an ident back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `ident` was not produced by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("count");
        assert_eq!(interner.resolve(id), "count");
    }

    #[test]
    fn interning_deduplicates() {
        let interner = Interner::new();
        assert_eq!(
            interner.get_or_intern("clk"),
            interner.get_or_intern("clk")
        );
        assert_ne!(interner.get_or_intern("clk"), interner.get_or_intern("rst"));
    }

    #[test]
    fn raw_key_roundtrip() {
        let id = Ident::from_raw(17);
        assert_eq!(id.as_raw(), 17);
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident::from_raw(3);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
