//! Signals and signal references.

use crate::ids::{SignalId, TypeId};
use halcyon_common::{Ident, LogicVec};
use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// Storage semantics of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// A net with at most one unconditional continuous driver.
    Wire,
    /// Process-driven storage; single writer per process domain.
    Variable,
}

/// A named signal declared in a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// ID within the owning module.
    pub id: SignalId,
    /// Declared name.
    pub name: Ident,
    /// Declared type.
    pub ty: TypeId,
    /// Wire or variable.
    pub kind: SignalKind,
    /// Power-on/reset value, if declared.
    pub init: Option<LogicVec>,
    /// Declaration site.
    pub span: Span,
}

/// A reference to a signal or a bit range of one.
///
/// Used as the target of assignments and inside [`Expr::Signal`](crate::expr::Expr).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalRef {
    /// The whole signal.
    Signal(SignalId),
    /// Bits `low..=high` of a signal.
    Slice {
        /// The referenced signal.
        signal: SignalId,
        /// High bit index, inclusive.
        high: u32,
        /// Low bit index, inclusive.
        low: u32,
    },
}

impl SignalRef {
    /// The underlying signal ID.
    pub fn signal(&self) -> SignalId {
        match self {
            SignalRef::Signal(id) => *id,
            SignalRef::Slice { signal, .. } => *signal,
        }
    }

    /// `true` if this reference covers the whole signal unconditionally.
    pub fn is_full(&self) -> bool {
        matches!(self, SignalRef::Signal(_))
    }
}
