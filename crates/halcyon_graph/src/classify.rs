//! Process domain classification.
//!
//! The domain of a process is inferred from its sensitivity description,
//! never trusted from the parser: `*` sensitivity is combinational, a list
//! with a rising/falling entry is sequential, and a level-only list is
//! combinational unless the body tests an edge of a listed signal (the
//! VHDL-style `if rising_edge(clk)` clocked process).

use halcyon_ir::{Expr, Module, Process, ProcessKind, Sensitivity, Statement};

/// Infers the synthesis domain of one process.
pub fn infer_process_kind(process: &Process) -> ProcessKind {
    match &process.sensitivity {
        Sensitivity::All => ProcessKind::Combinational,
        Sensitivity::EdgeList(_) => {
            if process.sensitivity.has_edge_trigger() || stmt_has_edge_test(&process.body) {
                ProcessKind::Sequential
            } else {
                ProcessKind::Combinational
            }
        }
    }
}

/// Rewrites every process's `kind` field to the inferred domain.
pub fn classify_processes(module: &mut Module) {
    for (_pid, process) in module.processes.iter_mut() {
        process.kind = infer_process_kind(process);
    }
}

fn stmt_has_edge_test(stmt: &Statement) -> bool {
    match stmt {
        Statement::Assign { .. } | Statement::Nop => false,
        Statement::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            expr_has_edge_test(condition)
                || stmt_has_edge_test(then_body)
                || else_body.as_deref().is_some_and(stmt_has_edge_test)
        }
        Statement::Case { arms, default, .. } => {
            arms.iter().any(|arm| stmt_has_edge_test(&arm.body))
                || default.as_deref().is_some_and(stmt_has_edge_test)
        }
        Statement::Loop { body, .. } => stmt_has_edge_test(body),
        Statement::Block { stmts, .. } => stmts.iter().any(stmt_has_edge_test),
    }
}

fn expr_has_edge_test(expr: &Expr) -> bool {
    match expr {
        Expr::EdgeTest { .. } => true,
        Expr::Literal(_) | Expr::Signal(_) | Expr::InstanceOutput { .. } => false,
        Expr::Unary { operand, .. } => expr_has_edge_test(operand),
        Expr::Binary { lhs, rhs, .. } => expr_has_edge_test(lhs) || expr_has_edge_test(rhs),
        Expr::Ternary {
            condition,
            true_val,
            false_val,
            ..
        } => {
            expr_has_edge_test(condition)
                || expr_has_edge_test(true_val)
                || expr_has_edge_test(false_val)
        }
        Expr::Concat(parts) => parts.iter().any(expr_has_edge_test),
        Expr::Slice { expr, .. } => expr_has_edge_test(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_ir::{
        AssignKind, Edge, EdgeSensitivity, ProcessId, SignalId, SignalRef,
    };
    use halcyon_source::Span;

    fn mk_process(sensitivity: Sensitivity, body: Statement) -> Process {
        Process {
            id: ProcessId::from_raw(0),
            name: None,
            kind: ProcessKind::Combinational,
            body,
            sensitivity,
            span: Span::DUMMY,
        }
    }

    fn assign_stmt() -> Statement {
        Statement::Assign {
            target: SignalRef::Signal(SignalId::from_raw(1)),
            value: Expr::signal(SignalId::from_raw(0)),
            kind: AssignKind::Blocking,
            span: Span::DUMMY,
        }
    }

    #[test]
    fn star_sensitivity_is_combinational() {
        let p = mk_process(Sensitivity::All, assign_stmt());
        assert_eq!(infer_process_kind(&p), ProcessKind::Combinational);
    }

    #[test]
    fn rising_entry_is_sequential() {
        let p = mk_process(
            Sensitivity::EdgeList(vec![EdgeSensitivity {
                signal: SignalId::from_raw(0),
                edge: Edge::Rising,
            }]),
            assign_stmt(),
        );
        assert_eq!(infer_process_kind(&p), ProcessKind::Sequential);
    }

    #[test]
    fn level_list_is_combinational() {
        let p = mk_process(
            Sensitivity::EdgeList(vec![EdgeSensitivity {
                signal: SignalId::from_raw(0),
                edge: Edge::Level,
            }]),
            assign_stmt(),
        );
        assert_eq!(infer_process_kind(&p), ProcessKind::Combinational);
    }

    #[test]
    fn level_list_with_body_edge_test_is_sequential() {
        let clk = SignalId::from_raw(0);
        let body = Statement::If {
            condition: Expr::EdgeTest {
                edge: Edge::Rising,
                signal: clk,
                span: Span::DUMMY,
            },
            then_body: Box::new(assign_stmt()),
            else_body: None,
            span: Span::DUMMY,
        };
        let p = mk_process(
            Sensitivity::EdgeList(vec![EdgeSensitivity {
                signal: clk,
                edge: Edge::Level,
            }]),
            body,
        );
        assert_eq!(infer_process_kind(&p), ProcessKind::Sequential);
    }

    #[test]
    fn classify_rewrites_kind_in_place() {
        let mut module = Module::new(
            halcyon_ir::ModuleId::from_raw(0),
            halcyon_common::Ident::from_raw(0),
            Span::DUMMY,
        );
        let mut p = mk_process(Sensitivity::All, assign_stmt());
        p.kind = ProcessKind::Sequential; // parser got it wrong
        module.processes.alloc(p);
        classify_processes(&mut module);
        let (_id, p) = module.processes.iter().next().unwrap();
        assert_eq!(p.kind, ProcessKind::Combinational);
    }
}
