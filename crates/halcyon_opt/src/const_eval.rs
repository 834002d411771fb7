//! Constant evaluation of expressions over 4-state values.
//!
//! `None` means "not computable from the current constant environment":
//! an operand reads a non-constant signal, a width is unresolved, or the
//! operator cannot fold. A `Some` result may still contain X bits: bitwise
//! operators fold through unknowns with the IEEE 1164 tables, while
//! arithmetic over any unknown operand folds to all-X of the result width.

use halcyon_common::{Logic, LogicVec};
use halcyon_ir::{
    expr_width, BinaryOp, Design, Expr, InstanceId, Module, SignalId, SignalRef, UnaryOp,
};
use std::collections::HashMap;

/// A borrowed view of the constant environment an evaluation runs against.
///
/// The propagation engine owns the maps and updates them between
/// evaluations; the view is `Copy` so it threads through the recursive
/// evaluator for free.
#[derive(Clone, Copy)]
pub struct EvalCtx<'a> {
    /// Signals proven constant so far.
    pub signals: &'a HashMap<SignalId, LogicVec>,
    /// Specialized instance outputs, keyed by (instance, output index).
    pub instance_outputs: &'a HashMap<(InstanceId, u32), LogicVec>,
}

impl<'a> EvalCtx<'a> {
    /// A view over the given maps.
    pub fn new(
        signals: &'a HashMap<SignalId, LogicVec>,
        instance_outputs: &'a HashMap<(InstanceId, u32), LogicVec>,
    ) -> Self {
        Self {
            signals,
            instance_outputs,
        }
    }
}

/// Truthiness of a folded value: any driven 1 bit makes it true, all
/// driven 0 makes it false, otherwise it is indeterminate.
pub fn truthiness(value: &LogicVec) -> Option<bool> {
    if (0..value.width()).any(|i| value.get(i) == Logic::One) {
        Some(true)
    } else if value.is_all_zero() {
        Some(false)
    } else {
        None
    }
}

/// Evaluates `expr` under `ctx`, returning the folded value if every
/// reachable operand is constant.
pub fn eval_expr(
    expr: &Expr,
    ctx: EvalCtx<'_>,
    design: &Design,
    module: &Module,
) -> Option<LogicVec> {
    match expr {
        Expr::Literal(v) => Some(v.clone()),
        Expr::Signal(SignalRef::Signal(id)) => ctx.signals.get(id).cloned(),
        Expr::Signal(SignalRef::Slice { signal, high, low }) => {
            let value = ctx.signals.get(signal)?;
            if *high < value.width() && low <= high {
                Some(value.slice(*high, *low))
            } else {
                None
            }
        }
        Expr::Unary { op, operand, .. } => {
            let value = eval_expr(operand, ctx, design, module)?;
            Some(eval_unary(*op, &value, expr_width(expr, design, module)))
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            let a = eval_expr(lhs, ctx, design, module)?;
            let b = eval_expr(rhs, ctx, design, module)?;
            eval_binary(*op, &a, &b, expr_width(expr, design, module))
        }
        Expr::Ternary {
            condition,
            true_val,
            false_val,
            ..
        } => {
            let cond = eval_expr(condition, ctx, design, module)?;
            // Folds to the taken branch regardless of the other branch.
            match truthiness(&cond)? {
                true => eval_expr(true_val, ctx, design, module),
                false => eval_expr(false_val, ctx, design, module),
            }
        }
        Expr::Concat(parts) => {
            let values: Option<Vec<LogicVec>> = parts
                .iter()
                .map(|p| eval_expr(p, ctx, design, module))
                .collect();
            Some(LogicVec::concat(&values?))
        }
        Expr::Slice {
            expr: inner,
            high,
            low,
            ..
        } => {
            let value = eval_expr(inner, ctx, design, module)?;
            if *high < value.width() && low <= high {
                Some(value.slice(*high, *low))
            } else {
                None
            }
        }
        Expr::InstanceOutput { instance, port, .. } => {
            ctx.instance_outputs.get(&(*instance, *port)).cloned()
        }
        // An edge test is an event, never a value.
        Expr::EdgeTest { .. } => None,
    }
}

fn eval_unary(op: UnaryOp, value: &LogicVec, result_width: Option<u32>) -> LogicVec {
    match op {
        UnaryOp::Not => !value,
        UnaryOp::Neg => {
            let width = result_width.unwrap_or(value.width());
            match value.to_u64() {
                Some(v) => LogicVec::from_u64(v.wrapping_neg(), width),
                None => LogicVec::all_x(width),
            }
        }
        UnaryOp::RedAnd => {
            let folded = (0..value.width())
                .map(|i| value.get(i))
                .fold(Logic::One, |acc, bit| acc & bit);
            LogicVec::from_logic(folded)
        }
        UnaryOp::RedOr => {
            let folded = (0..value.width())
                .map(|i| value.get(i))
                .fold(Logic::Zero, |acc, bit| acc | bit);
            LogicVec::from_logic(folded)
        }
        UnaryOp::RedXor => {
            let folded = (0..value.width())
                .map(|i| value.get(i))
                .fold(Logic::Zero, |acc, bit| acc ^ bit);
            LogicVec::from_logic(folded)
        }
        UnaryOp::LogicNot => match truthiness(value) {
            Some(b) => LogicVec::from_bool(!b),
            None => LogicVec::from_logic(Logic::X),
        },
    }
}

fn eval_binary(
    op: BinaryOp,
    a: &LogicVec,
    b: &LogicVec,
    result_width: Option<u32>,
) -> Option<LogicVec> {
    let operand_width = a.width().max(b.width());
    match op {
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            let a = a.resize(operand_width);
            let b = b.resize(operand_width);
            let folded = match op {
                BinaryOp::And => &a & &b,
                BinaryOp::Or => &a | &b,
                _ => &a ^ &b,
            };
            Some(match result_width {
                Some(w) => folded.resize(w),
                None => folded,
            })
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            // Truncated to the declared result width, never sign-extended.
            let width = result_width.unwrap_or(operand_width);
            if a.width() > 64 || b.width() > 64 {
                return None;
            }
            match (a.to_u64(), b.to_u64()) {
                (Some(x), Some(y)) => {
                    let value = match op {
                        BinaryOp::Add => x.wrapping_add(y),
                        BinaryOp::Sub => x.wrapping_sub(y),
                        BinaryOp::Mul => x.wrapping_mul(y),
                        BinaryOp::Div if y != 0 => x / y,
                        BinaryOp::Mod if y != 0 => x % y,
                        // Division by a constant zero is all-X.
                        _ => return Some(LogicVec::all_x(width)),
                    };
                    Some(LogicVec::from_u64(value, width))
                }
                _ => Some(LogicVec::all_x(width)),
            }
        }
        BinaryOp::Shl | BinaryOp::Shr => {
            let width = result_width.unwrap_or(a.width());
            if a.width() > 64 {
                return None;
            }
            match (a.to_u64(), b.to_u64()) {
                (Some(x), Some(shift)) => {
                    let value = if shift >= 64 {
                        0
                    } else if op == BinaryOp::Shl {
                        x << shift
                    } else {
                        x >> shift
                    };
                    Some(LogicVec::from_u64(value, width))
                }
                _ => Some(LogicVec::all_x(width)),
            }
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            if a.has_unknown() || b.has_unknown() {
                return Some(LogicVec::from_logic(Logic::X));
            }
            let a = a.resize(operand_width);
            let b = b.resize(operand_width);
            let equal = a == b;
            Some(LogicVec::from_bool(if op == BinaryOp::Eq {
                equal
            } else {
                !equal
            }))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            if a.width() > 64 || b.width() > 64 {
                return None;
            }
            match (a.to_u64(), b.to_u64()) {
                (Some(x), Some(y)) => {
                    let holds = match op {
                        BinaryOp::Lt => x < y,
                        BinaryOp::Le => x <= y,
                        BinaryOp::Gt => x > y,
                        _ => x >= y,
                    };
                    Some(LogicVec::from_bool(holds))
                }
                _ => Some(LogicVec::from_logic(Logic::X)),
            }
        }
        BinaryOp::LogicAnd | BinaryOp::LogicOr => {
            match (truthiness(a), truthiness(b)) {
                (Some(x), Some(y)) => Some(LogicVec::from_bool(if op == BinaryOp::LogicAnd {
                    x && y
                } else {
                    x || y
                })),
                // Short-circuit dominance: 0 && _ and 1 || _ are decided.
                (Some(false), _) | (_, Some(false)) if op == BinaryOp::LogicAnd => {
                    Some(LogicVec::from_bool(false))
                }
                (Some(true), _) | (_, Some(true)) if op == BinaryOp::LogicOr => {
                    Some(LogicVec::from_bool(true))
                }
                _ => Some(LogicVec::from_logic(Logic::X)),
            }
        }
    }
}
