//! Modules — the unit of ownership in the IR.

use crate::arena::Arena;
use crate::expr::Expr;
use crate::ids::{InstanceId, ModuleId, ProcessId, SignalId};
use crate::instance::Instance;
use crate::port::{Port, PortDirection};
use crate::process::Process;
use crate::signal::{Signal, SignalRef};
use halcyon_common::Ident;
use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// A continuous assignment outside any process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// The driven signal or slice.
    pub target: SignalRef,
    /// The driving expression.
    pub value: Expr,
    /// Source location.
    pub span: Span,
}

/// One hardware module: ports, signals, processes, continuous assignments,
/// and submodule instances.
///
/// A module owns all of its signals and blocks. Arena iteration order is
/// declaration order, which all passes preserve so the emitter reproduces
/// first-definition ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// ID in the design.
    pub id: ModuleId,
    /// Module name.
    pub name: Ident,
    /// Declaration site.
    pub span: Span,
    /// External interface, in declaration order.
    pub ports: Vec<Port>,
    /// Declared signals.
    pub signals: Arena<SignalId, Signal>,
    /// Behavioral process blocks.
    pub processes: Arena<ProcessId, Process>,
    /// Continuous assignments.
    pub assignments: Vec<Assignment>,
    /// Submodule instances.
    pub instances: Arena<InstanceId, Instance>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(id: ModuleId, name: Ident, span: Span) -> Self {
        Self {
            id,
            name,
            span,
            ports: Vec::new(),
            signals: Arena::new(),
            processes: Arena::new(),
            assignments: Vec::new(),
            instances: Arena::new(),
        }
    }

    /// Input and inout ports.
    pub fn input_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports
            .iter()
            .filter(|p| matches!(p.direction, PortDirection::Input | PortDirection::InOut))
    }

    /// Output and inout ports.
    pub fn output_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports
            .iter()
            .filter(|p| matches!(p.direction, PortDirection::Output | PortDirection::InOut))
    }

    /// The port backed by `signal`, if any.
    pub fn port_of_signal(&self, signal: SignalId) -> Option<&Port> {
        self.ports.iter().find(|p| p.signal == signal)
    }

    /// `true` if `signal` backs an output or inout port.
    pub fn is_output_signal(&self, signal: SignalId) -> bool {
        self.output_ports().any(|p| p.signal == signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PortId, TypeId};

    fn mk_module_with_ports() -> Module {
        let mut m = Module::new(ModuleId::from_raw(0), Ident::from_raw(0), Span::DUMMY);
        let a = m.signals.alloc(Signal {
            id: SignalId::from_raw(0),
            name: Ident::from_raw(1),
            ty: TypeId::from_raw(0),
            kind: crate::signal::SignalKind::Wire,
            init: None,
            span: Span::DUMMY,
        });
        let y = m.signals.alloc(Signal {
            id: SignalId::from_raw(1),
            name: Ident::from_raw(2),
            ty: TypeId::from_raw(0),
            kind: crate::signal::SignalKind::Wire,
            init: None,
            span: Span::DUMMY,
        });
        m.ports.push(Port {
            id: PortId::from_raw(0),
            name: Ident::from_raw(1),
            direction: PortDirection::Input,
            ty: TypeId::from_raw(0),
            signal: a,
            span: Span::DUMMY,
        });
        m.ports.push(Port {
            id: PortId::from_raw(1),
            name: Ident::from_raw(2),
            direction: PortDirection::Output,
            ty: TypeId::from_raw(0),
            signal: y,
            span: Span::DUMMY,
        });
        m
    }

    #[test]
    fn port_queries() {
        let m = mk_module_with_ports();
        assert_eq!(m.input_ports().count(), 1);
        assert_eq!(m.output_ports().count(), 1);
        assert!(m.is_output_signal(SignalId::from_raw(1)));
        assert!(!m.is_output_signal(SignalId::from_raw(0)));
        assert!(m.port_of_signal(SignalId::from_raw(0)).is_some());
        assert!(m.port_of_signal(SignalId::from_raw(7)).is_none());
    }

    #[test]
    fn empty_module() {
        let m = Module::new(ModuleId::from_raw(3), Ident::from_raw(0), Span::DUMMY);
        assert!(m.signals.is_empty());
        assert!(m.processes.is_empty());
        assert!(m.assignments.is_empty());
        assert!(m.instances.is_empty());
    }
}
