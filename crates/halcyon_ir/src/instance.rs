//! Submodule instances.

use crate::expr::Expr;
use crate::ids::{InstanceId, ModuleId, SignalId};
use halcyon_common::Ident;
use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// An instantiation of another module.
///
/// Bindings are positional against the callee's port declaration order:
/// `inputs[k]` is the expression bound to the callee's k-th input port and
/// `outputs[k]` names the parent signal driven by the callee's k-th output
/// port (`None` leaves that output unconnected). The instance hierarchy
/// must be acyclic; the builder enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// ID within the owning module.
    pub id: InstanceId,
    /// Instance name.
    pub name: Ident,
    /// The instantiated module definition.
    pub module: ModuleId,
    /// One expression per callee input port, in port order.
    pub inputs: Vec<Expr>,
    /// One optional parent signal per callee output port, in port order.
    pub outputs: Vec<Option<SignalId>>,
    /// Instantiation site.
    pub span: Span,
}

impl Instance {
    /// Parent signals driven by this instance.
    pub fn driven_signals(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.outputs.iter().filter_map(|o| *o)
    }
}
