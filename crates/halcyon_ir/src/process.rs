//! Process blocks and sensitivity descriptions.

use crate::ids::{ProcessId, SignalId};
use crate::stmt::Statement;
use halcyon_common::Ident;
use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// Inferred synthesis domain of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Pure function of current inputs; becomes gates.
    Combinational,
    /// Samples state on a declared edge; becomes registers plus gates.
    Sequential,
}

/// How an explicit sensitivity entry triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// 0 → 1 transition.
    Rising,
    /// 1 → 0 transition.
    Falling,
    /// Any value change (plain `@(a)` entry).
    Level,
}

/// One entry of an explicit sensitivity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSensitivity {
    /// The watched signal.
    pub signal: SignalId,
    /// The trigger condition.
    pub edge: Edge,
}

/// What re-triggers evaluation of a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sensitivity {
    /// Level-sensitive to everything the body reads (`*`).
    All,
    /// An explicit list of signal/edge entries.
    EdgeList(Vec<EdgeSensitivity>),
}

/// A behavioral process block.
///
/// `kind` holds the domain classification the dependency-graph builder
/// infers from the sensitivity description and the body's edge tests; the
/// parser may leave it at either value and the builder normalizes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// ID within the owning module.
    pub id: ProcessId,
    /// Optional label.
    pub name: Option<Ident>,
    /// Inferred domain.
    pub kind: ProcessKind,
    /// The body statement (usually a block).
    pub body: Statement,
    /// What re-triggers evaluation.
    pub sensitivity: Sensitivity,
    /// Declaration site.
    pub span: Span,
}

impl Sensitivity {
    /// Signals named by an explicit list; empty for [`Sensitivity::All`].
    pub fn listed_signals(&self) -> Vec<SignalId> {
        match self {
            Sensitivity::All => Vec::new(),
            Sensitivity::EdgeList(entries) => entries.iter().map(|e| e.signal).collect(),
        }
    }

    /// `true` if any entry triggers on an actual edge.
    pub fn has_edge_trigger(&self) -> bool {
        match self {
            Sensitivity::All => false,
            Sensitivity::EdgeList(entries) => entries
                .iter()
                .any(|e| matches!(e.edge, Edge::Rising | Edge::Falling)),
        }
    }
}
