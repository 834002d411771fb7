//! Deterministic textual rendering of IR constructs.
//!
//! Shared by the netlist emitter and the analyzers' diagnostics so a signal
//! or predicate always prints the same way everywhere. Binary and ternary
//! expressions are always parenthesized; determinism matters more than
//! minimal output.

use crate::design::Design;
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::module::Module;
use crate::process::Edge;
use crate::signal::SignalRef;
use crate::stmt::CasePattern;
use halcyon_common::{Interner, Logic, LogicVec};

/// Renders a literal as a sized binary constant (`4'b1010`).
pub fn literal_to_string(value: &LogicVec) -> String {
    format!("{}'b{}", value.width(), value)
}

/// Renders a signal reference as `name`, `name[h]`, or `name[h:l]`.
pub fn signal_ref_to_string(sref: &SignalRef, module: &Module, interner: &Interner) -> String {
    match sref {
        SignalRef::Signal(id) => interner.resolve(module.signals.get(*id).name).to_string(),
        SignalRef::Slice { signal, high, low } => {
            let name = interner.resolve(module.signals.get(*signal).name);
            if high == low {
                format!("{name}[{high}]")
            } else {
                format!("{name}[{high}:{low}]")
            }
        }
    }
}

/// Renders a case pattern MSB-first, `-` marking don't-care positions.
pub fn pattern_to_string(pattern: &CasePattern) -> String {
    let mut out = String::new();
    for i in (0..pattern.width()).rev() {
        if pattern.care.get(i) == Logic::One {
            out.push_str(&pattern.value.get(i).to_string());
        } else {
            out.push('-');
        }
    }
    out
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "~",
        UnaryOp::Neg => "-",
        UnaryOp::RedAnd => "&",
        UnaryOp::RedOr => "|",
        UnaryOp::RedXor => "^",
        UnaryOp::LogicNot => "!",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::And => "&",
        BinaryOp::Or => "|",
        BinaryOp::Xor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::LogicAnd => "&&",
        BinaryOp::LogicOr => "||",
    }
}

/// Renders an expression deterministically.
pub fn expr_to_string(
    expr: &Expr,
    design: &Design,
    module: &Module,
    interner: &Interner,
) -> String {
    match expr {
        Expr::Literal(v) => literal_to_string(v),
        Expr::Signal(sref) => signal_ref_to_string(sref, module, interner),
        Expr::Unary { op, operand, .. } => format!(
            "{}{}",
            unary_symbol(*op),
            expr_to_string(operand, design, module, interner)
        ),
        Expr::Binary { op, lhs, rhs, .. } => format!(
            "({} {} {})",
            expr_to_string(lhs, design, module, interner),
            binary_symbol(*op),
            expr_to_string(rhs, design, module, interner)
        ),
        Expr::Ternary {
            condition,
            true_val,
            false_val,
            ..
        } => format!(
            "({} ? {} : {})",
            expr_to_string(condition, design, module, interner),
            expr_to_string(true_val, design, module, interner),
            expr_to_string(false_val, design, module, interner)
        ),
        Expr::Concat(parts) => {
            let rendered: Vec<String> = parts
                .iter()
                .map(|p| expr_to_string(p, design, module, interner))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Expr::Slice {
            expr, high, low, ..
        } => format!(
            "{}[{high}:{low}]",
            expr_to_string(expr, design, module, interner)
        ),
        Expr::InstanceOutput { instance, port, .. } => {
            let inst = module.instances.get(*instance);
            let callee = design.modules.get(inst.module);
            let port_name = callee
                .output_ports()
                .nth(*port as usize)
                .map(|p| interner.resolve(p.name).to_string())
                .unwrap_or_else(|| format!("out{port}"));
            format!("{}.{}", interner.resolve(inst.name), port_name)
        }
        Expr::EdgeTest { edge, signal, .. } => {
            let name = interner.resolve(module.signals.get(*signal).name);
            match edge {
                Edge::Rising => format!("rising_edge({name})"),
                Edge::Falling => format!("falling_edge({name})"),
                Edge::Level => name.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ids::{ModuleId, SignalId, TypeId};
    use crate::signal::{Signal, SignalKind};
    use crate::types::TypeDb;
    use halcyon_source::Span;

    fn setup() -> (Interner, Design) {
        let interner = Interner::new();
        let mut module = Module::new(
            ModuleId::from_raw(0),
            interner.get_or_intern("top"),
            Span::DUMMY,
        );
        for name in ["a", "b", "sel"] {
            let id = SignalId::from_raw(module.signals.len() as u32);
            module.signals.alloc(Signal {
                id,
                name: interner.get_or_intern(name),
                ty: TypeId::from_raw(0),
                kind: SignalKind::Wire,
                init: None,
                span: Span::DUMMY,
            });
        }
        let mut modules = Arena::new();
        let top = modules.alloc(module);
        (
            interner,
            Design {
                modules,
                top,
                types: TypeDb::new(),
            },
        )
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(
            literal_to_string(&LogicVec::from_u64(0b101, 3)),
            "3'b101"
        );
    }

    #[test]
    fn ternary_rendering() {
        let (interner, design) = setup();
        let module = design.top_module();
        let expr = Expr::Ternary {
            condition: Box::new(Expr::signal(SignalId::from_raw(2))),
            true_val: Box::new(Expr::signal(SignalId::from_raw(1))),
            false_val: Box::new(Expr::lit(0, 1)),
            ty: TypeId::from_raw(0),
            span: Span::DUMMY,
        };
        assert_eq!(
            expr_to_string(&expr, &design, module, &interner),
            "(sel ? b : 1'b0)"
        );
    }

    #[test]
    fn pattern_rendering_marks_dont_cares() {
        let pattern = CasePattern {
            value: LogicVec::from_u64(0b10, 2),
            care: LogicVec::from_u64(0b10, 2),
        };
        assert_eq!(pattern_to_string(&pattern), "1-");
    }

    #[test]
    fn slice_ref_rendering() {
        let (interner, design) = setup();
        let module = design.top_module();
        let full = SignalRef::Signal(SignalId::from_raw(0));
        let bit = SignalRef::Slice {
            signal: SignalId::from_raw(0),
            high: 3,
            low: 3,
        };
        let range = SignalRef::Slice {
            signal: SignalId::from_raw(0),
            high: 3,
            low: 0,
        };
        assert_eq!(signal_ref_to_string(&full, module, &interner), "a");
        assert_eq!(signal_ref_to_string(&bit, module, &interner), "a[3]");
        assert_eq!(signal_ref_to_string(&range, module, &interner), "a[3:0]");
    }

    #[test]
    fn edge_test_rendering() {
        let (interner, design) = setup();
        let module = design.top_module();
        let expr = Expr::EdgeTest {
            edge: Edge::Rising,
            signal: SignalId::from_raw(0),
            span: Span::DUMMY,
        };
        assert_eq!(
            expr_to_string(&expr, &design, module, &interner),
            "rising_edge(a)"
        );
    }
}
