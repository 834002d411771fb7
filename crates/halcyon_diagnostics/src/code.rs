//! Stable diagnostic codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category prefix of a diagnostic code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Fatal pipeline errors, prefixed `E`.
    Error,
    /// Analyzer warnings, prefixed `W`.
    Warning,
}

impl Category {
    /// Single-character display prefix.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A category-prefixed diagnostic code such as `E102` or `W304`.
///
/// Code assignments are stable across releases:
///
/// | code | meaning |
/// |------|---------|
/// | E101 | combinational loop |
/// | E102 | multiple unconditional wire drivers |
/// | E103 | instance hierarchy cycle |
/// | E104 | fixpoint non-convergence |
/// | E105 | undeclared signal or instance reference |
/// | E106 | unknown module reference |
/// | E107 | instance port binding arity mismatch |
/// | W301 | latch inferred |
/// | W302 | ambiguous case pattern overlap |
/// | W303 | sensitivity list mismatch |
/// | W304 | order-dependent blocking assignment |
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category prefix.
    pub category: Category,
    /// Number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
