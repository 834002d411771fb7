//! W303: sensitivity mismatch. A level-sensitive explicit list misses a
//! signal the body reads.

use halcyon_common::Interner;
use halcyon_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Severity};
use halcyon_ir::{Design, Module, Sensitivity, SignalId};
use std::collections::HashSet;

use crate::helpers::collect_unsampled_reads;
use crate::LintRule;

/// Checks explicit level-sensitive lists against the body's reads.
///
/// Simulation re-evaluates such a process only when a listed signal
/// changes, while the synthesized gate network reacts to any input change;
/// a read signal missing from the list is therefore a divergence between
/// the two. Reads that only happen under an edge-qualified branch of a
/// listed signal are sampled on that edge and exempt. Processes whose list
/// carries a real edge entry re-evaluate exactly like their hardware and
/// are skipped, as are `*` lists, which are complete by construction.
pub struct SensitivityMismatch;

impl LintRule for SensitivityMismatch {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 303)
    }

    fn name(&self) -> &str {
        "sensitivity-mismatch"
    }

    fn description(&self) -> &str {
        "body reads a signal missing from the explicit sensitivity list"
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
            let declared: HashSet<SignalId> = match &process.sensitivity {
                Sensitivity::All => continue,
                Sensitivity::EdgeList(_) if process.sensitivity.has_edge_trigger() => continue,
                Sensitivity::EdgeList(entries) => entries.iter().map(|e| e.signal).collect(),
            };

            let mut reads = HashSet::new();
            collect_unsampled_reads(&process.body, &declared, &mut reads);

            let mut missing: Vec<SignalId> = reads
                .into_iter()
                .filter(|s| !declared.contains(s))
                .collect();
            missing.sort_by_key(|s| s.as_raw());

            for signal in missing {
                let name = interner.resolve(module.signals.get(signal).name);
                sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        format!("'{name}' is read but not in the sensitivity list"),
                        process.span,
                    )
                    .with_label(Label::primary(
                        process.span,
                        format!("a change of '{name}' re-evaluates the hardware but not the simulation"),
                    ))
                    .with_help(format!(
                        "add '{name}' to the sensitivity list, or use the `*` form"
                    )),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_ir::{
        Arena, AssignKind, BinaryOp, Edge, EdgeSensitivity, Expr, ModuleId, Process, ProcessId,
        ProcessKind, Signal, SignalKind, SignalRef, Statement, TypeDb, TypeId,
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
        (
            interner,
            Design {
                modules,
                top,
                types: TypeDb::new(),
            },
        )
    }

    fn level_entry(raw: u32) -> EdgeSensitivity {
        EdgeSensitivity {
            signal: SignalId::from_raw(raw),
            edge: Edge::Level,
        }
    }

    fn add_process(design: &mut Design, sensitivity: Sensitivity, body: Statement) {
        let module = design.modules.get_mut(ModuleId::from_raw(0));
        let pid = ProcessId::from_raw(module.processes.len() as u32);
        module.processes.alloc(Process {
            id: pid,
            name: None,
            kind: ProcessKind::Combinational,
            body,
            sensitivity,
            span: Span::DUMMY,
        });
    }

    fn and_assign(target: u32, a: u32, b: u32) -> Statement {
        Statement::Assign {
            target: SignalRef::Signal(SignalId::from_raw(target)),
            value: Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(Expr::signal(SignalId::from_raw(a))),
                rhs: Box::new(Expr::signal(SignalId::from_raw(b))),
                ty: TypeId::from_raw(0),
                span: Span::DUMMY,
            },
            kind: AssignKind::Blocking,
            span: Span::DUMMY,
        }
    }

    #[test]
    fn missing_read_signal_flagged() {
        let (interner, mut design) = setup(&["a", "b", "y"]);
        // process(a)  y = a & b  -- b missing
        add_process(
            &mut design,
            Sensitivity::EdgeList(vec![level_entry(0)]),
            and_assign(2, 0, 1),
        );
        let sink = DiagnosticSink::new();
        SensitivityMismatch.check_module(design.top_module(), &design, &interner, &sink);
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'b'"));
    }

    #[test]
    fn complete_list_clean() {
        let (interner, mut design) = setup(&["a", "b", "y"]);
        add_process(
            &mut design,
            Sensitivity::EdgeList(vec![level_entry(0), level_entry(1)]),
            and_assign(2, 0, 1),
        );
        let sink = DiagnosticSink::new();
        SensitivityMismatch.check_module(design.top_module(), &design, &interner, &sink);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn star_sensitivity_skipped() {
        let (interner, mut design) = setup(&["a", "b", "y"]);
        add_process(&mut design, Sensitivity::All, and_assign(2, 0, 1));
        let sink = DiagnosticSink::new();
        SensitivityMismatch.check_module(design.top_module(), &design, &interner, &sink);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn edge_triggered_list_skipped() {
        let (interner, mut design) = setup(&["clk", "d", "q"]);
        add_process(
            &mut design,
            Sensitivity::EdgeList(vec![EdgeSensitivity {
                signal: SignalId::from_raw(0),
                edge: Edge::Rising,
            }]),
            and_assign(2, 1, 1),
        );
        let sink = DiagnosticSink::new();
        SensitivityMismatch.check_module(design.top_module(), &design, &interner, &sink);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn reads_under_edge_test_of_listed_signal_exempt() {
        let (interner, mut design) = setup(&["clk", "d", "q"]);
        // process(clk)  if rising_edge(clk)  q = d  -- VHDL clocked idiom
        let body = Statement::If {
            condition: Expr::EdgeTest {
                edge: Edge::Rising,
                signal: SignalId::from_raw(0),
                span: Span::DUMMY,
            },
            then_body: Box::new(Statement::Assign {
                target: SignalRef::Signal(SignalId::from_raw(2)),
                value: Expr::signal(SignalId::from_raw(1)),
                kind: AssignKind::NonBlocking,
                span: Span::DUMMY,
            }),
            else_body: None,
            span: Span::DUMMY,
        };
        add_process(
            &mut design,
            Sensitivity::EdgeList(vec![level_entry(0)]),
            body,
        );
        let sink = DiagnosticSink::new();
        SensitivityMismatch.check_module(design.top_module(), &design, &interner, &sink);
        assert!(sink.take_all().is_empty());
    }
}
