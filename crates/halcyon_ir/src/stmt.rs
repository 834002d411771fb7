//! Behavioral statements inside process blocks.

use crate::expr::Expr;
use crate::signal::SignalRef;
use halcyon_common::{Logic, LogicVec};
use halcyon_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether an assignment takes effect immediately or at end of evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignKind {
    /// Updates the variable environment immediately, in statement order.
    Blocking,
    /// Recorded now, applied atomically after the whole evaluation.
    NonBlocking,
}

/// A case pattern as a `(value, care)` mask pair.
///
/// Bit `i` participates in matching only where `care` is 1; a 0 care bit is
/// a don't-care position. This keeps wildcard handling in bit arithmetic
/// instead of string matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePattern {
    /// Pattern bits; only meaningful where `care` is 1.
    pub value: LogicVec,
    /// Mask of significant bit positions.
    pub care: LogicVec,
}

impl CasePattern {
    /// A pattern matching exactly `value` (all bits significant).
    pub fn exact(value: LogicVec) -> Self {
        let care = LogicVec::all_one(value.width());
        Self { value, care }
    }

    /// Pattern width in bits.
    pub fn width(&self) -> u32 {
        self.value.width()
    }

    /// Number of don't-care positions.
    pub fn dont_care_count(&self) -> u32 {
        (0..self.care.width())
            .filter(|&i| self.care.get(i) != Logic::One)
            .count() as u32
    }

    /// `true` if a fully-known selector value matches this pattern.
    pub fn matches(&self, selector: &LogicVec) -> bool {
        if selector.width() != self.width() {
            return false;
        }
        (0..self.width()).all(|i| {
            self.care.get(i) != Logic::One || selector.get(i) == self.value.get(i)
        })
    }

    /// `true` if some selector encoding matches both patterns.
    ///
    /// Two patterns overlap when their values agree on every bit position
    /// both of them care about.
    pub fn overlaps(&self, other: &CasePattern) -> bool {
        if self.width() != other.width() {
            return false;
        }
        (0..self.width()).all(|i| {
            self.care.get(i) != Logic::One
                || other.care.get(i) != Logic::One
                || self.value.get(i) == other.value.get(i)
        })
    }
}

/// One arm of a case statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArm {
    /// Patterns selecting this arm.
    pub patterns: Vec<CasePattern>,
    /// The arm body.
    pub body: Statement,
    /// Source location.
    pub span: Span,
}

/// A behavioral statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// A process-local assignment.
    Assign {
        /// Target signal or slice.
        target: SignalRef,
        /// Assigned value.
        value: Expr,
        /// Blocking or non-blocking semantics.
        kind: AssignKind,
        /// Source location.
        span: Span,
    },
    /// Two-way branch.
    If {
        /// Branch condition.
        condition: Expr,
        /// Taken when the condition is true.
        then_body: Box<Statement>,
        /// Taken when the condition is false, if present.
        else_body: Option<Box<Statement>>,
        /// Source location.
        span: Span,
    },
    /// Multi-way branch over a selector.
    Case {
        /// The matched selector expression.
        subject: Expr,
        /// Arms in declaration order; first match wins.
        arms: Vec<CaseArm>,
        /// Fallback when no pattern matches.
        default: Option<Box<Statement>>,
        /// Source location.
        span: Span,
    },
    /// A bounded loop with a compile-time trip count.
    Loop {
        /// Number of iterations.
        trip_count: u32,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        span: Span,
    },
    /// A sequence of statements.
    Block {
        /// Statements in execution order.
        stmts: Vec<Statement>,
        /// Source location.
        span: Span,
    },
    /// Empty statement.
    Nop,
}

impl Statement {
    /// Rebuilds this tree, applying `on_expr` to every contained expression
    /// (via [`Expr::rewrite`]) and `on_target` to every assignment target.
    pub fn rewrite<F, G>(&self, on_expr: &F, on_target: &G) -> Statement
    where
        F: Fn(&Expr) -> Option<Expr>,
        G: Fn(&SignalRef) -> Option<SignalRef>,
    {
        match self {
            Statement::Assign {
                target,
                value,
                kind,
                span,
            } => Statement::Assign {
                target: on_target(target).unwrap_or_else(|| target.clone()),
                value: value.rewrite(on_expr),
                kind: *kind,
                span: *span,
            },
            Statement::If {
                condition,
                then_body,
                else_body,
                span,
            } => Statement::If {
                condition: condition.rewrite(on_expr),
                then_body: Box::new(then_body.rewrite(on_expr, on_target)),
                else_body: else_body
                    .as_ref()
                    .map(|e| Box::new(e.rewrite(on_expr, on_target))),
                span: *span,
            },
            Statement::Case {
                subject,
                arms,
                default,
                span,
            } => Statement::Case {
                subject: subject.rewrite(on_expr),
                arms: arms
                    .iter()
                    .map(|arm| CaseArm {
                        patterns: arm.patterns.clone(),
                        body: arm.body.rewrite(on_expr, on_target),
                        span: arm.span,
                    })
                    .collect(),
                default: default
                    .as_ref()
                    .map(|d| Box::new(d.rewrite(on_expr, on_target))),
                span: *span,
            },
            Statement::Loop {
                trip_count,
                body,
                span,
            } => Statement::Loop {
                trip_count: *trip_count,
                body: Box::new(body.rewrite(on_expr, on_target)),
                span: *span,
            },
            Statement::Block { stmts, span } => Statement::Block {
                stmts: stmts
                    .iter()
                    .map(|s| s.rewrite(on_expr, on_target))
                    .collect(),
                span: *span,
            },
            Statement::Nop => Statement::Nop,
        }
    }

    /// Collects every signal read anywhere in this statement tree:
    /// assignment right-hand sides, branch conditions, and case selectors.
    pub fn collect_read_signals(&self, out: &mut HashSet<crate::ids::SignalId>) {
        match self {
            Statement::Assign { value, .. } => value.collect_signals(out),
            Statement::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                condition.collect_signals(out);
                then_body.collect_read_signals(out);
                if let Some(e) = else_body {
                    e.collect_read_signals(out);
                }
            }
            Statement::Case {
                subject,
                arms,
                default,
                ..
            } => {
                subject.collect_signals(out);
                for arm in arms {
                    arm.body.collect_read_signals(out);
                }
                if let Some(d) = default {
                    d.collect_read_signals(out);
                }
            }
            Statement::Loop { body, .. } => body.collect_read_signals(out),
            Statement::Block { stmts, .. } => {
                for s in stmts {
                    s.collect_read_signals(out);
                }
            }
            Statement::Nop => {}
        }
    }

    /// Collects every signal assigned anywhere in this statement tree.
    pub fn collect_written_signals(&self, out: &mut HashSet<crate::ids::SignalId>) {
        match self {
            Statement::Assign { target, .. } => {
                out.insert(target.signal());
            }
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                then_body.collect_written_signals(out);
                if let Some(e) = else_body {
                    e.collect_written_signals(out);
                }
            }
            Statement::Case { arms, default, .. } => {
                for arm in arms {
                    arm.body.collect_written_signals(out);
                }
                if let Some(d) = default {
                    d.collect_written_signals(out);
                }
            }
            Statement::Loop { body, .. } => body.collect_written_signals(out),
            Statement::Block { stmts, .. } => {
                for s in stmts {
                    s.collect_written_signals(out);
                }
            }
            Statement::Nop => {}
        }
    }
}
