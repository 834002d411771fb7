//! Module interface ports.

use crate::ids::{PortId, SignalId, TypeId};
use halcyon_common::Ident;
use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// Data-flow direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Into the module.
    Input,
    /// Out of the module.
    Output,
    /// Both directions.
    InOut,
}

/// One entry in a module's external interface, backed by an internal signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Port ID.
    pub id: PortId,
    /// Port name.
    pub name: Ident,
    /// Data-flow direction.
    pub direction: PortDirection,
    /// Port type.
    pub ty: TypeId,
    /// Backing signal inside the module.
    pub signal: SignalId,
    /// Declaration site.
    pub span: Span,
}
