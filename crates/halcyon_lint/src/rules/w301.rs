//! W301: latch inferred. An output of a combinational process is not
//! assigned on every control-flow path.

use halcyon_common::Interner;
use halcyon_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Severity};
use halcyon_ir::{Design, Module, ProcessKind, SignalId};

use crate::helpers::{enumerate_paths, render_path_predicate};
use crate::LintRule;

/// Proves, per combinational process, that every assigned signal is driven
/// on every leaf path of the If/Case tree. Each uncovered `(signal, path)`
/// pair is one finding naming the unmet path predicate, the condition
/// under which the old value would be retained instead of freshly driven.
pub struct LatchInferred;

impl LintRule for LatchInferred {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 301)
    }

    fn name(&self) -> &str {
        "latch-inferred"
    }

    fn description(&self) -> &str {
        "combinational process output unassigned on some control-flow path"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_module(
        &self,
        module: &Module,
        design: &Design,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) {
        for (_pid, process) in module.processes.iter() {
            if process.kind != ProcessKind::Combinational {
                continue;
            }
            let mut written = std::collections::HashSet::new();
            process.body.collect_written_signals(&mut written);
            if written.is_empty() {
                continue;
            }
            let mut outputs: Vec<SignalId> = written.into_iter().collect();
            outputs.sort_by_key(|s| s.as_raw());

            let paths = enumerate_paths(&process.body, design, module);
            for signal in outputs {
                let name = interner.resolve(module.signals.get(signal).name);
                for path in paths.iter().filter(|p| !p.assigned.contains(&signal)) {
                    let predicate = render_path_predicate(path, design, module, interner);
                    sink.emit(
                        Diagnostic::warning(
                            self.code(),
                            format!("latch inferred for '{name}'"),
                            process.span,
                        )
                        .with_label(Label::primary(
                            process.span,
                            format!("'{name}' holds its previous value when {predicate}"),
                        ))
                        .with_note(format!("unassigned path predicate: {predicate}"))
                        .with_help(format!(
                            "assign '{name}' on every path: add an else arm, a case default, or a leading default assignment"
                        )),
                    );
                }
            }
        }
    }
}
