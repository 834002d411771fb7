//! Control-flow walks shared by the analyzer rules.

use halcyon_common::Interner;
use halcyon_ir::{
    expr_width, pretty, CaseArm, CasePattern, Design, Expr, Module, SignalId, Statement,
};
use std::collections::HashSet;

/// One conjunct of a control-flow path predicate.
#[derive(Debug, Clone)]
pub enum PathCond {
    /// The branch condition held.
    CondTrue(Expr),
    /// The branch condition failed.
    CondFalse(Expr),
    /// A case arm pattern matched the selector.
    CaseMatch {
        /// The case selector.
        subject: Expr,
        /// The matching pattern.
        pattern: CasePattern,
    },
    /// No case pattern matched and no default existed.
    CaseMiss {
        /// The case selector.
        subject: Expr,
    },
}

/// A leaf control-flow path: its predicate and the signals assigned on it.
#[derive(Debug, Clone, Default)]
pub struct ControlPath {
    /// Conjuncts, outermost branch first.
    pub conditions: Vec<PathCond>,
    /// Signals assigned somewhere along this path.
    pub assigned: HashSet<SignalId>,
}

/// Enumerates every leaf control-flow path of a process body.
///
/// The walk is functional: each If/Case forks the current path set into
/// immutable predicate/assignment pairs. A case with neither a default nor
/// exhaustive patterns contributes a miss path on which nothing is
/// assigned, and that path is exactly where a latch hides. Loops have
/// compile-time trip counts and identical per-iteration structure, so one
/// traversal of the body suffices for assignment coverage.
pub fn enumerate_paths(stmt: &Statement, design: &Design, module: &Module) -> Vec<ControlPath> {
    walk(stmt, vec![ControlPath::default()], design, module)
}

fn walk(
    stmt: &Statement,
    paths: Vec<ControlPath>,
    design: &Design,
    module: &Module,
) -> Vec<ControlPath> {
    match stmt {
        Statement::Nop => paths,
        Statement::Assign { target, .. } => paths
            .into_iter()
            .map(|mut p| {
                p.assigned.insert(target.signal());
                p
            })
            .collect(),
        Statement::Block { stmts, .. } => stmts
            .iter()
            .fold(paths, |acc, s| walk(s, acc, design, module)),
        Statement::Loop { body, .. } => walk(body, paths, design, module),
        Statement::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            let mut out = Vec::new();
            for path in paths {
                let mut taken = path.clone();
                taken.conditions.push(PathCond::CondTrue(condition.clone()));
                out.extend(walk(then_body, vec![taken], design, module));

                let mut skipped = path;
                skipped
                    .conditions
                    .push(PathCond::CondFalse(condition.clone()));
                match else_body {
                    Some(e) => out.extend(walk(e, vec![skipped], design, module)),
                    None => out.push(skipped),
                }
            }
            out
        }
        Statement::Case {
            subject,
            arms,
            default,
            ..
        } => {
            let exhaustive = expr_width(subject, design, module)
                .is_some_and(|w| case_covers_all(w, arms));
            let mut out = Vec::new();
            for path in paths {
                for arm in arms {
                    for pattern in &arm.patterns {
                        let mut taken = path.clone();
                        taken.conditions.push(PathCond::CaseMatch {
                            subject: subject.clone(),
                            pattern: pattern.clone(),
                        });
                        out.extend(walk(&arm.body, vec![taken], design, module));
                    }
                }
                if let Some(d) = default {
                    let mut miss = path.clone();
                    miss.conditions.push(PathCond::CaseMiss {
                        subject: subject.clone(),
                    });
                    out.extend(walk(d, vec![miss], design, module));
                } else if !exhaustive {
                    let mut miss = path.clone();
                    miss.conditions.push(PathCond::CaseMiss {
                        subject: subject.clone(),
                    });
                    out.push(miss);
                }
            }
            out
        }
    }
}

/// Exact-coverage cap: selectors wider than this are never proven
/// exhaustive by pattern enumeration alone.
const EXHAUSTIVE_WIDTH_CAP: u32 = 16;

/// `true` if the arm patterns cover every possible selector encoding.
///
/// Counts by brute enumeration with care masks honored, so overlapping
/// patterns are not double-counted. Above the width cap the answer is a
/// conservative `false`: a spurious latch warning beats a silent latch.
pub fn case_covers_all(selector_width: u32, arms: &[CaseArm]) -> bool {
    if selector_width > EXHAUSTIVE_WIDTH_CAP {
        return false;
    }
    let total: u64 = 1u64 << selector_width;
    (0..total).all(|encoding| {
        let value = halcyon_common::LogicVec::from_u64(encoding, selector_width);
        arms.iter()
            .any(|arm| arm.patterns.iter().any(|p| p.matches(&value)))
    })
}

/// Renders a path predicate as a boolean condition string.
pub fn render_path_predicate(
    path: &ControlPath,
    design: &Design,
    module: &Module,
    interner: &Interner,
) -> String {
    if path.conditions.is_empty() {
        return "true".to_string();
    }
    let parts: Vec<String> = path
        .conditions
        .iter()
        .map(|cond| match cond {
            PathCond::CondTrue(expr) => pretty::expr_to_string(expr, design, module, interner),
            PathCond::CondFalse(expr) => {
                format!("!({})", pretty::expr_to_string(expr, design, module, interner))
            }
            PathCond::CaseMatch { subject, pattern } => format!(
                "({} matches {})",
                pretty::expr_to_string(subject, design, module, interner),
                pretty::pattern_to_string(pattern)
            ),
            PathCond::CaseMiss { subject } => format!(
                "({} matches no pattern)",
                pretty::expr_to_string(subject, design, module, interner)
            ),
        })
        .collect();
    parts.join(" && ")
}

/// Collects body reads that are *not* sampled under an edge-qualified
/// branch of a declared signal.
///
/// Used by the sensitivity analyzer: in a level-sensitive explicit-list
/// process, a read under `if rising_edge(clk)` (with `clk` listed) is
/// sampled on the edge and exempt; every other read acts as an undeclared
/// trigger.
pub fn collect_unsampled_reads(
    stmt: &Statement,
    declared: &HashSet<SignalId>,
    out: &mut HashSet<SignalId>,
) {
    match stmt {
        Statement::Nop => {}
        Statement::Assign { value, .. } => value.collect_signals(out),
        Statement::Block { stmts, .. } => {
            for s in stmts {
                collect_unsampled_reads(s, declared, out);
            }
        }
        Statement::Loop { body, .. } => collect_unsampled_reads(body, declared, out),
        Statement::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            condition.collect_signals(out);
            if !condition_is_edge_qualified(condition, declared) {
                collect_unsampled_reads(then_body, declared, out);
            }
            if let Some(e) = else_body {
                collect_unsampled_reads(e, declared, out);
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
                collect_unsampled_reads(&arm.body, declared, out);
            }
            if let Some(d) = default {
                collect_unsampled_reads(d, declared, out);
            }
        }
    }
}

fn condition_is_edge_qualified(expr: &Expr, declared: &HashSet<SignalId>) -> bool {
    match expr {
        Expr::EdgeTest { signal, .. } => declared.contains(signal),
        Expr::Unary { operand, .. } => condition_is_edge_qualified(operand, declared),
        Expr::Binary { lhs, rhs, .. } => {
            condition_is_edge_qualified(lhs, declared) || condition_is_edge_qualified(rhs, declared)
        }
        Expr::Ternary {
            condition,
            true_val,
            false_val,
            ..
        } => {
            condition_is_edge_qualified(condition, declared)
                || condition_is_edge_qualified(true_val, declared)
                || condition_is_edge_qualified(false_val, declared)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_common::LogicVec;
    use halcyon_ir::{
        Arena, AssignKind, Edge, ModuleId, Signal, SignalKind, SignalRef, TypeDb, TypeId,
    };
    use halcyon_source::Span;

    fn setup(signals: &[&str]) -> (Interner, Design) {
        let interner = Interner::new();
        let mut module = Module::new(
            ModuleId::from_raw(0),
            interner.get_or_intern("top"),
            Span::DUMMY,
        );
        for name in signals {
            let id = SignalId::from_raw(module.signals.len() as u32);
            module.signals.alloc(Signal {
                id,
                name: interner.get_or_intern(name),
                ty: TypeId::from_raw(0),
                kind: SignalKind::Variable,
                init: None,
                span: Span::DUMMY,
            });
        }
        let mut modules = Arena::new();
        let top = modules.alloc(module);
        let mut types = TypeDb::new();
        types.bitvec(1);
        (interner, Design { modules, top, types })
    }

    fn blocking_assign(target: u32, value: Expr) -> Statement {
        Statement::Assign {
            target: SignalRef::Signal(SignalId::from_raw(target)),
            value,
            kind: AssignKind::Blocking,
            span: Span::DUMMY,
        }
    }

    #[test]
    fn if_without_else_forks_unassigned_path() {
        let (interner, design) = setup(&["en", "y"]);
        let module = design.top_module();
        let body = Statement::If {
            condition: Expr::signal(SignalId::from_raw(0)),
            then_body: Box::new(blocking_assign(1, Expr::lit(1, 1))),
            else_body: None,
            span: Span::DUMMY,
        };
        let paths = enumerate_paths(&body, &design, module);
        assert_eq!(paths.len(), 2);
        let unassigned: Vec<_> = paths
            .iter()
            .filter(|p| !p.assigned.contains(&SignalId::from_raw(1)))
            .collect();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(
            render_path_predicate(unassigned[0], &design, module, &interner),
            "!(en)"
        );
    }

    #[test]
    fn nested_ifs_multiply_paths() {
        let (_interner, design) = setup(&["a", "b", "y"]);
        let module = design.top_module();
        let inner = Statement::If {
            condition: Expr::signal(SignalId::from_raw(1)),
            then_body: Box::new(blocking_assign(2, Expr::lit(1, 1))),
            else_body: Some(Box::new(blocking_assign(2, Expr::lit(0, 1)))),
            span: Span::DUMMY,
        };
        let body = Statement::If {
            condition: Expr::signal(SignalId::from_raw(0)),
            then_body: Box::new(inner),
            else_body: Some(Box::new(blocking_assign(2, Expr::lit(0, 1)))),
            span: Span::DUMMY,
        };
        let paths = enumerate_paths(&body, &design, module);
        assert_eq!(paths.len(), 3);
        assert!(paths
            .iter()
            .all(|p| p.assigned.contains(&SignalId::from_raw(2))));
    }

    #[test]
    fn exhaustive_case_has_no_miss_path() {
        let (_interner, design) = setup(&["sel", "y"]);
        let module = design.top_module();
        let arm = |bit: u64| CaseArm {
            patterns: vec![CasePattern::exact(LogicVec::from_u64(bit, 1))],
            body: blocking_assign(1, Expr::lit(bit, 1)),
            span: Span::DUMMY,
        };
        let body = Statement::Case {
            subject: Expr::signal(SignalId::from_raw(0)),
            arms: vec![arm(0), arm(1)],
            default: None,
            span: Span::DUMMY,
        };
        let paths = enumerate_paths(&body, &design, module);
        assert_eq!(paths.len(), 2);
        assert!(paths
            .iter()
            .all(|p| p.assigned.contains(&SignalId::from_raw(1))));
    }

    #[test]
    fn partial_case_without_default_has_miss_path() {
        let (_interner, design) = setup(&["sel", "y"]);
        let module = design.top_module();
        let body = Statement::Case {
            subject: Expr::signal(SignalId::from_raw(0)),
            arms: vec![CaseArm {
                patterns: vec![CasePattern::exact(LogicVec::from_u64(1, 1))],
                body: blocking_assign(1, Expr::lit(1, 1)),
                span: Span::DUMMY,
            }],
            default: None,
            span: Span::DUMMY,
        };
        let paths = enumerate_paths(&body, &design, module);
        assert_eq!(paths.len(), 2);
        assert!(paths
            .iter()
            .any(|p| !p.assigned.contains(&SignalId::from_raw(1))));
    }

    #[test]
    fn wildcard_coverage_counts_masked_patterns() {
        let arms = vec![
            CaseArm {
                patterns: vec![CasePattern {
                    value: LogicVec::from_u64(0b10, 2),
                    care: LogicVec::from_u64(0b10, 2), // 1-
                }],
                body: Statement::Nop,
                span: Span::DUMMY,
            },
            CaseArm {
                patterns: vec![CasePattern {
                    value: LogicVec::from_u64(0b00, 2),
                    care: LogicVec::from_u64(0b10, 2), // 0-
                }],
                body: Statement::Nop,
                span: Span::DUMMY,
            },
        ];
        assert!(case_covers_all(2, &arms));
        assert!(!case_covers_all(2, &arms[..1].to_vec()));
    }

    #[test]
    fn unsampled_reads_skip_edge_qualified_branch() {
        let (_interner, design) = setup(&["clk", "d", "rst", "q"]);
        let _ = &design;
        let clk = SignalId::from_raw(0);
        let declared: HashSet<_> = [clk].into_iter().collect();
        // if rst  q = 0  else if rising_edge(clk)  q = d
        let body = Statement::If {
            condition: Expr::signal(SignalId::from_raw(2)),
            then_body: Box::new(blocking_assign(3, Expr::lit(0, 1))),
            else_body: Some(Box::new(Statement::If {
                condition: Expr::EdgeTest {
                    edge: Edge::Rising,
                    signal: clk,
                    span: Span::DUMMY,
                },
                then_body: Box::new(blocking_assign(3, Expr::signal(SignalId::from_raw(1)))),
                else_body: None,
                span: Span::DUMMY,
            })),
            span: Span::DUMMY,
        };
        let mut reads = HashSet::new();
        collect_unsampled_reads(&body, &declared, &mut reads);
        // rst is an unsampled trigger; d is sampled under the clk edge.
        assert!(reads.contains(&SignalId::from_raw(2)));
        assert!(!reads.contains(&SignalId::from_raw(1)));
    }
}
