//! Immutable expression trees.

use crate::design::Design;
use crate::ids::{InstanceId, SignalId, TypeId};
use crate::module::Module;
use crate::process::Edge;
use crate::signal::SignalRef;
use halcyon_common::LogicVec;
use halcyon_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise NOT.
    Not,
    /// Arithmetic negation.
    Neg,
    /// Reduction AND.
    RedAnd,
    /// Reduction OR.
    RedOr,
    /// Reduction XOR.
    RedXor,
    /// Logical NOT.
    LogicNot,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo.
    Mod,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Left shift.
    Shl,
    /// Logical right shift.
    Shr,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Logical AND.
    LogicAnd,
    /// Logical OR.
    LogicOr,
}

/// An expression in the behavioral IR.
///
/// Expressions are immutable once built; constant folding and the rename
/// machinery construct new trees via [`Expr::rewrite`] rather than mutating
/// in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal bit-vector value.
    Literal(LogicVec),
    /// A read of a signal or signal slice.
    Signal(SignalRef),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Result type.
        ty: TypeId,
        /// Source location.
        span: Span,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
        /// Result type.
        ty: TypeId,
        /// Source location.
        span: Span,
    },
    /// A conditional select (`cond ? a : b`).
    Ternary {
        /// The select condition.
        condition: Box<Expr>,
        /// Value when the condition is true.
        true_val: Box<Expr>,
        /// Value when the condition is false.
        false_val: Box<Expr>,
        /// Result type.
        ty: TypeId,
        /// Source location.
        span: Span,
    },
    /// Concatenation, first element most significant.
    Concat(Vec<Expr>),
    /// A bit range of a sub-expression, bounds resolved at elaboration.
    Slice {
        /// The expression being sliced.
        expr: Box<Expr>,
        /// High bit index, inclusive.
        high: u32,
        /// Low bit index, inclusive.
        low: u32,
        /// Source location.
        span: Span,
    },
    /// A read of one output port of a submodule instance.
    InstanceOutput {
        /// The instance whose output is read.
        instance: InstanceId,
        /// Index into the callee's output ports.
        port: u32,
        /// Source location.
        span: Span,
    },
    /// An edge test on a signal (`rising_edge(clk)` style).
    ///
    /// Only meaningful as (part of) an `If` condition inside a process; the
    /// domain classifier and the sensitivity analyzer give it its meaning.
    EdgeTest {
        /// Which edge is tested.
        edge: Edge,
        /// The tested signal.
        signal: SignalId,
        /// Source location.
        span: Span,
    },
}

impl Expr {
    /// Shorthand for a full-signal read.
    pub fn signal(id: SignalId) -> Expr {
        Expr::Signal(SignalRef::Signal(id))
    }

    /// Shorthand for an unsigned literal of the given width.
    pub fn lit(value: u64, width: u32) -> Expr {
        Expr::Literal(LogicVec::from_u64(value, width))
    }

    /// Rebuilds this tree bottom-up, letting `f` replace any node.
    ///
    /// Children are rewritten first, then `f` sees the rebuilt node; `None`
    /// keeps the node as-is. This is the one seam used for constant
    /// substitution, flatten renaming, and instance-ID remapping.
    pub fn rewrite<F>(&self, f: &F) -> Expr
    where
        F: Fn(&Expr) -> Option<Expr>,
    {
        let rebuilt = match self {
            Expr::Literal(_) | Expr::Signal(_) | Expr::InstanceOutput { .. } | Expr::EdgeTest { .. } => {
                self.clone()
            }
            Expr::Unary {
                op,
                operand,
                ty,
                span,
            } => Expr::Unary {
                op: *op,
                operand: Box::new(operand.rewrite(f)),
                ty: *ty,
                span: *span,
            },
            Expr::Binary {
                op,
                lhs,
                rhs,
                ty,
                span,
            } => Expr::Binary {
                op: *op,
                lhs: Box::new(lhs.rewrite(f)),
                rhs: Box::new(rhs.rewrite(f)),
                ty: *ty,
                span: *span,
            },
            Expr::Ternary {
                condition,
                true_val,
                false_val,
                ty,
                span,
            } => Expr::Ternary {
                condition: Box::new(condition.rewrite(f)),
                true_val: Box::new(true_val.rewrite(f)),
                false_val: Box::new(false_val.rewrite(f)),
                ty: *ty,
                span: *span,
            },
            Expr::Concat(parts) => Expr::Concat(parts.iter().map(|p| p.rewrite(f)).collect()),
            Expr::Slice {
                expr,
                high,
                low,
                span,
            } => Expr::Slice {
                expr: Box::new(expr.rewrite(f)),
                high: *high,
                low: *low,
                span: *span,
            },
        };
        f(&rebuilt).unwrap_or(rebuilt)
    }

    /// Collects every signal this expression reads into `out`.
    pub fn collect_signals(&self, out: &mut HashSet<SignalId>) {
        match self {
            Expr::Literal(_) | Expr::InstanceOutput { .. } => {}
            Expr::Signal(sref) => {
                out.insert(sref.signal());
            }
            Expr::EdgeTest { signal, .. } => {
                out.insert(*signal);
            }
            Expr::Unary { operand, .. } => operand.collect_signals(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_signals(out);
                rhs.collect_signals(out);
            }
            Expr::Ternary {
                condition,
                true_val,
                false_val,
                ..
            } => {
                condition.collect_signals(out);
                true_val.collect_signals(out);
                false_val.collect_signals(out);
            }
            Expr::Concat(parts) => {
                for part in parts {
                    part.collect_signals(out);
                }
            }
            Expr::Slice { expr, .. } => expr.collect_signals(out),
        }
    }

    /// The signals this expression reads.
    pub fn read_signals(&self) -> HashSet<SignalId> {
        let mut out = HashSet::new();
        self.collect_signals(&mut out);
        out
    }

    /// Collects every instance whose output this expression reads.
    pub fn collect_instances(&self, out: &mut HashSet<InstanceId>) {
        match self {
            Expr::InstanceOutput { instance, .. } => {
                out.insert(*instance);
            }
            Expr::Literal(_) | Expr::Signal(_) | Expr::EdgeTest { .. } => {}
            Expr::Unary { operand, .. } => operand.collect_instances(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_instances(out);
                rhs.collect_instances(out);
            }
            Expr::Ternary {
                condition,
                true_val,
                false_val,
                ..
            } => {
                condition.collect_instances(out);
                true_val.collect_instances(out);
                false_val.collect_instances(out);
            }
            Expr::Concat(parts) => {
                for part in parts {
                    part.collect_instances(out);
                }
            }
            Expr::Slice { expr, .. } => expr.collect_instances(out),
        }
    }
}

/// Computes the bit width of an expression, when it is known.
///
/// `module` resolves signal and instance references; `design` resolves the
/// output-port types of instantiated modules.
pub fn expr_width(expr: &Expr, design: &Design, module: &Module) -> Option<u32> {
    match expr {
        Expr::Literal(v) => Some(v.width()),
        Expr::Signal(SignalRef::Signal(id)) => {
            design.types.bit_width(module.signals.get(*id).ty)
        }
        Expr::Signal(SignalRef::Slice { high, low, .. }) | Expr::Slice { high, low, .. } => {
            Some(high - low + 1)
        }
        Expr::Unary { op, operand, ty, .. } => match op {
            UnaryOp::RedAnd | UnaryOp::RedOr | UnaryOp::RedXor | UnaryOp::LogicNot => Some(1),
            UnaryOp::Not | UnaryOp::Neg => design
                .types
                .bit_width(*ty)
                .or_else(|| expr_width(operand, design, module)),
        },
        Expr::Binary { op, lhs, ty, .. } => match op {
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::LogicAnd
            | BinaryOp::LogicOr => Some(1),
            _ => design
                .types
                .bit_width(*ty)
                .or_else(|| expr_width(lhs, design, module)),
        },
        Expr::Ternary { ty, true_val, .. } => design
            .types
            .bit_width(*ty)
            .or_else(|| expr_width(true_val, design, module)),
        Expr::Concat(parts) => {
            let mut total = 0;
            for part in parts {
                total += expr_width(part, design, module)?;
            }
            Some(total)
        }
        Expr::InstanceOutput { instance, port, .. } => {
            let inst = module.instances.get(*instance);
            let callee = design.modules.get(inst.module);
            let out_port = callee.output_ports().nth(*port as usize)?;
            design.types.bit_width(out_port.ty)
        }
        Expr::EdgeTest { .. } => Some(1),
    }
}
