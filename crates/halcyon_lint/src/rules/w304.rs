//! W304: order-dependent assignment. A blocking assignment reads a
//! variable that a later statement in the same block blocking-assigns.

use halcyon_common::Interner;
use halcyon_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Severity};
use halcyon_ir::{AssignKind, Design, Module, SignalId, Statement};
use std::collections::HashSet;

use crate::LintRule;

/// Flags the read-before-intended-write signature inside one evaluation.
///
/// Blocking assignments update the local environment immediately in
/// statement order, so a right-hand side that reads a variable assigned by
/// a *later* blocking statement silently uses the stale value from the
/// previous evaluation. Non-blocking targets are exempt: reads of them are
/// defined to observe the pre-evaluation value. The suggested reordering is
/// help text only; reordering changes meaning and stays a human decision.
pub struct OrderDependentAssignment;

impl LintRule for OrderDependentAssignment {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 304)
    }

    fn name(&self) -> &str {
        "order-dependent-assignment"
    }

    fn description(&self) -> &str {
        "blocking assignment reads a variable blocking-assigned later in the block"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_module(
        &self,
        module: &Module,
        _design: &Design,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) {
        for (_pid, process) in module.processes.iter() {
            check_stmt(self, &process.body, module, interner, sink);
        }
    }
}

fn check_stmt(
    rule: &OrderDependentAssignment,
    stmt: &Statement,
    module: &Module,
    interner: &Interner,
    sink: &DiagnosticSink,
) {
    match stmt {
        Statement::Assign { .. } | Statement::Nop => {}
        Statement::If {
            then_body,
            else_body,
            ..
        } => {
            check_stmt(rule, then_body, module, interner, sink);
            if let Some(e) = else_body {
                check_stmt(rule, e, module, interner, sink);
            }
        }
        Statement::Case { arms, default, .. } => {
            for arm in arms {
                check_stmt(rule, &arm.body, module, interner, sink);
            }
            if let Some(d) = default {
                check_stmt(rule, d, module, interner, sink);
            }
        }
        Statement::Loop { body, .. } => check_stmt(rule, body, module, interner, sink),
        Statement::Block { stmts, .. } => {
            check_sequence(rule, stmts, module, interner, sink);
            for s in stmts {
                check_stmt(rule, s, module, interner, sink);
            }
        }
    }
}

fn check_sequence(
    rule: &OrderDependentAssignment,
    stmts: &[Statement],
    module: &Module,
    interner: &Interner,
    sink: &DiagnosticSink,
) {
    for (i, stmt) in stmts.iter().enumerate() {
        let Statement::Assign {
            target,
            value,
            kind: AssignKind::Blocking,
            span,
        } = stmt
        else {
            continue;
        };
        let reads = value.read_signals();
        let mut flagged: HashSet<SignalId> = HashSet::new();
        for later in &stmts[i + 1..] {
            let mut later_writes = HashSet::new();
            collect_blocking_writes(later, &mut later_writes);
            let mut stale: Vec<SignalId> = reads
                .intersection(&later_writes)
                .filter(|s| !flagged.contains(s))
                .copied()
                .collect();
            stale.sort_by_key(|s| s.as_raw());
            for signal in stale {
                flagged.insert(signal);
                let read_name = interner.resolve(module.signals.get(signal).name);
                let target_name = interner.resolve(module.signals.get(target.signal()).name);
                sink.emit(
                    Diagnostic::warning(
                        rule.code(),
                        format!(
                            "'{target_name}' is computed from the stale value of '{read_name}'"
                        ),
                        *span,
                    )
                    .with_label(Label::primary(
                        *span,
                        format!("reads '{read_name}' before its blocking assignment below"),
                    ))
                    .with_help(format!(
                        "move the assignment to '{read_name}' above this statement if the fresh value is intended"
                    )),
                );
            }
        }
    }
}

/// Targets of blocking assignments anywhere under `stmt`.
fn collect_blocking_writes(stmt: &Statement, out: &mut HashSet<SignalId>) {
    match stmt {
        Statement::Assign {
            target,
            kind: AssignKind::Blocking,
            ..
        } => {
            out.insert(target.signal());
        }
        Statement::Assign { .. } | Statement::Nop => {}
        Statement::If {
            then_body,
            else_body,
            ..
        } => {
            collect_blocking_writes(then_body, out);
            if let Some(e) = else_body {
                collect_blocking_writes(e, out);
            }
        }
        Statement::Case { arms, default, .. } => {
            for arm in arms {
                collect_blocking_writes(&arm.body, out);
            }
            if let Some(d) = default {
                collect_blocking_writes(d, out);
            }
        }
        Statement::Loop { body, .. } => collect_blocking_writes(body, out),
        Statement::Block { stmts, .. } => {
            for s in stmts {
                collect_blocking_writes(s, out);
            }
        }
    }
}
