//! W302: ambiguous case overlap. Wildcard patterns in different arms can
//! match the same selector encoding.

use halcyon_common::Interner;
use halcyon_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Severity};
use halcyon_ir::{pretty, Design, Module, Statement};

use crate::LintRule;

/// Compares every pattern pair across different arms of each case
/// statement. Overlap on the bits both patterns care about means both
/// branches are reachable for that encoding; first-match-wins must then be
/// an explicit decision, never a silent assumption. Strict mode promotes
/// this to an error via the engine's deny list.
pub struct AmbiguousCaseOverlap;

impl LintRule for AmbiguousCaseOverlap {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Warning, 302)
    }

    fn name(&self) -> &str {
        "ambiguous-case-overlap"
    }

    fn description(&self) -> &str {
        "case patterns in different arms overlap for some selector encoding"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check_module(
        &self,
        module: &Module,
        _design: &Design,
        _interner: &Interner,
        sink: &DiagnosticSink,
    ) {
        for (_pid, process) in module.processes.iter() {
            check_stmt(self, &process.body, sink);
        }
    }
}

fn check_stmt(rule: &AmbiguousCaseOverlap, stmt: &Statement, sink: &DiagnosticSink) {
    match stmt {
        Statement::Assign { .. } | Statement::Nop => {}
        Statement::If {
            then_body,
            else_body,
            ..
        } => {
            check_stmt(rule, then_body, sink);
            if let Some(e) = else_body {
                check_stmt(rule, e, sink);
            }
        }
        Statement::Loop { body, .. } => check_stmt(rule, body, sink),
        Statement::Block { stmts, .. } => {
            for s in stmts {
                check_stmt(rule, s, sink);
            }
        }
        Statement::Case {
            arms,
            default,
            span,
            ..
        } => {
            for (i, first) in arms.iter().enumerate() {
                for second in arms.iter().skip(i + 1) {
                    for p in &first.patterns {
                        for q in &second.patterns {
                            if p.overlaps(q) {
                                sink.emit(
                                    Diagnostic::warning(
                                        rule.code(),
                                        format!(
                                            "case patterns {} and {} overlap",
                                            pretty::pattern_to_string(p),
                                            pretty::pattern_to_string(q)
                                        ),
                                        *span,
                                    )
                                    .with_label(Label::primary(
                                        first.span,
                                        "this arm matches first for the shared encodings",
                                    ))
                                    .with_label(Label::secondary(
                                        second.span,
                                        "this arm is unreachable for them",
                                    ))
                                    .with_help(
                                        "make the patterns disjoint, or reorder the arms if first-match-wins is intended",
                                    ),
                                );
                            }
                        }
                    }
                }
            }
            for arm in arms {
                check_stmt(rule, &arm.body, sink);
            }
            if let Some(d) = default {
                check_stmt(rule, d, sink);
            }
        }
    }
}
