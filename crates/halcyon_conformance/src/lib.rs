//! Shared helpers for the conformance suites.
//!
//! [`DesignBuilder`] constructs IR designs the way the parsing collaborator
//! would hand them over, and [`truth_table`] evaluates a signal's driving
//! expression over every combination of 1-bit inputs so equivalence
//! properties can compare behavior before and after optimization.

#![warn(missing_docs)]

use halcyon_common::{Interner, LogicVec};
use halcyon_ir::{
    Arena, AssignKind, Assignment, BinaryOp, Design, Edge, EdgeSensitivity, Expr, Instance,
    InstanceId, Module, ModuleId, Port, PortDirection, PortId, Process, ProcessId, ProcessKind,
    Sensitivity, Signal, SignalId, SignalKind, SignalRef, Statement, TypeDb,
};
use halcyon_opt::{eval_expr, EvalCtx};
use halcyon_source::Span;
use std::collections::HashMap;

/// Builds IR designs for tests, filling the roles of the external parser.
pub struct DesignBuilder {
    /// The session interner, shared with the optimizer under test.
    pub interner: Interner,
    /// The design being assembled.
    pub design: Design,
}

impl Default for DesignBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignBuilder {
    /// An empty design; the first added module becomes the top.
    pub fn new() -> Self {
        let mut types = TypeDb::new();
        types.bitvec(1);
        Self {
            interner: Interner::new(),
            design: Design {
                modules: Arena::new(),
                top: ModuleId::from_raw(0),
                types,
            },
        }
    }

    /// Adds an empty module definition.
    pub fn add_module(&mut self, name: &str) -> ModuleId {
        let id = ModuleId::from_raw(self.design.modules.len() as u32);
        let name = self.interner.get_or_intern(name);
        self.design.modules.alloc(Module::new(id, name, Span::DUMMY));
        id
    }

    /// Declares a signal.
    pub fn signal(&mut self, m: ModuleId, name: &str, width: u32, kind: SignalKind) -> SignalId {
        let ty = self.design.types.bitvec(width);
        let name = self.interner.get_or_intern(name);
        let module = self.design.modules.get_mut(m);
        let id = SignalId::from_raw(module.signals.len() as u32);
        module.signals.alloc(Signal {
            id,
            name,
            ty,
            kind,
            init: None,
            span: Span::DUMMY,
        });
        id
    }

    fn port(&mut self, m: ModuleId, name: &str, width: u32, direction: PortDirection) -> SignalId {
        let kind = match direction {
            PortDirection::Input => SignalKind::Wire,
            _ => SignalKind::Variable,
        };
        let sig = self.signal(m, name, width, kind);
        let ty = self.design.types.bitvec(width);
        let name = self.interner.get_or_intern(name);
        let module = self.design.modules.get_mut(m);
        module.ports.push(Port {
            id: PortId::from_raw(module.ports.len() as u32),
            name,
            direction,
            ty,
            signal: sig,
            span: Span::DUMMY,
        });
        sig
    }

    /// Declares an input port and its backing wire.
    pub fn input(&mut self, m: ModuleId, name: &str, width: u32) -> SignalId {
        self.port(m, name, width, PortDirection::Input)
    }

    /// Declares an output port and its backing signal.
    pub fn output(&mut self, m: ModuleId, name: &str, width: u32) -> SignalId {
        self.port(m, name, width, PortDirection::Output)
    }

    /// Adds a continuous assignment.
    pub fn assign(&mut self, m: ModuleId, target: SignalId, value: Expr) {
        self.design.modules.get_mut(m).assignments.push(Assignment {
            target: SignalRef::Signal(target),
            value,
            span: Span::DUMMY,
        });
    }

    /// Adds a level-sensitive-all combinational process.
    pub fn comb_process(&mut self, m: ModuleId, body: Statement) -> ProcessId {
        self.process(m, ProcessKind::Combinational, Sensitivity::All, body)
    }

    /// Adds a rising-edge sequential process clocked by `clk`.
    pub fn seq_process(&mut self, m: ModuleId, clk: SignalId, body: Statement) -> ProcessId {
        self.process(
            m,
            ProcessKind::Sequential,
            Sensitivity::EdgeList(vec![EdgeSensitivity {
                signal: clk,
                edge: Edge::Rising,
            }]),
            body,
        )
    }

    fn process(
        &mut self,
        m: ModuleId,
        kind: ProcessKind,
        sensitivity: Sensitivity,
        body: Statement,
    ) -> ProcessId {
        let module = self.design.modules.get_mut(m);
        let id = ProcessId::from_raw(module.processes.len() as u32);
        module.processes.alloc(Process {
            id,
            name: None,
            kind,
            body,
            sensitivity,
            span: Span::DUMMY,
        });
        id
    }

    /// Instantiates `callee` inside `m` with positional bindings.
    pub fn instance(
        &mut self,
        m: ModuleId,
        name: &str,
        callee: ModuleId,
        inputs: Vec<Expr>,
        outputs: Vec<Option<SignalId>>,
    ) -> InstanceId {
        let name = self.interner.get_or_intern(name);
        let module = self.design.modules.get_mut(m);
        let id = InstanceId::from_raw(module.instances.len() as u32);
        module.instances.alloc(Instance {
            id,
            name,
            module: callee,
            inputs,
            outputs,
            span: Span::DUMMY,
        });
        id
    }

    /// A binary expression with an interned result type of `width` bits.
    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr, width: u32) -> Expr {
        let ty = self.design.types.bitvec(width);
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            ty,
            span: Span::DUMMY,
        }
    }

    /// A ternary select with an interned result type of `width` bits.
    pub fn ternary(&mut self, condition: Expr, true_val: Expr, false_val: Expr, width: u32) -> Expr {
        let ty = self.design.types.bitvec(width);
        Expr::Ternary {
            condition: Box::new(condition),
            true_val: Box::new(true_val),
            false_val: Box::new(false_val),
            ty,
            span: Span::DUMMY,
        }
    }

    /// A blocking assignment statement.
    pub fn blocking(&self, target: SignalId, value: Expr) -> Statement {
        Statement::Assign {
            target: SignalRef::Signal(target),
            value,
            kind: AssignKind::Blocking,
            span: Span::DUMMY,
        }
    }

    /// A non-blocking assignment statement.
    pub fn non_blocking(&self, target: SignalId, value: Expr) -> Statement {
        Statement::Assign {
            target: SignalRef::Signal(target),
            value,
            kind: AssignKind::NonBlocking,
            span: Span::DUMMY,
        }
    }

    /// A statement block.
    pub fn block(&self, stmts: Vec<Statement>) -> Statement {
        Statement::Block {
            stmts,
            span: Span::DUMMY,
        }
    }
}

/// Evaluates the driving expression of `target` for every combination of
/// the given 1-bit inputs, LSB-first in `inputs` order.
///
/// Returns `None` if `target` has no continuous driver or any row fails to
/// fold to a definite value.
pub fn truth_table(
    design: &Design,
    module_id: ModuleId,
    target: SignalId,
    inputs: &[SignalId],
) -> Option<Vec<u64>> {
    let module = design.modules.get(module_id);
    let driver = module
        .assignments
        .iter()
        .find(|a| a.target.signal() == target)?;
    let instance_outputs = HashMap::new();
    let mut rows = Vec::new();
    for encoding in 0..(1u64 << inputs.len()) {
        let mut signals = HashMap::new();
        for (bit, sig) in inputs.iter().enumerate() {
            signals.insert(*sig, LogicVec::from_u64((encoding >> bit) & 1, 1));
        }
        let value = eval_expr(
            &driver.value,
            EvalCtx::new(&signals, &instance_outputs),
            design,
            module,
        )?;
        rows.push(value.to_u64()?);
    }
    Some(rows)
}
