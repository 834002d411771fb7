//! Hazard analyzer properties through the full pipeline: latch inference,
//! order-dependent assignments, and strict-mode severity promotion.

use halcyon_conformance::DesignBuilder;
use halcyon_config::{load_config_from_str, HalcyonConfig};
use halcyon_diagnostics::{DiagnosticSink, Severity};
use halcyon_ir::{BinaryOp, Expr, SignalKind, Statement};
use halcyon_opt::optimize_design;
use halcyon_source::Span;

/// `if (i0) y = i1;` with no else yields exactly one latch finding for
/// `y`, carrying the unmet path predicate `!(i0)`.
#[test]
fn incomplete_if_infers_exactly_one_latch() {
    let mut b = DesignBuilder::new();
    let top = b.add_module("top");
    let i0 = b.input(top, "i0", 1);
    let i1 = b.input(top, "i1", 1);
    let y = b.output(top, "y", 1);
    let body = Statement::If {
        condition: Expr::signal(i0),
        then_body: Box::new(b.blocking(y, Expr::signal(i1))),
        else_body: None,
        span: Span::DUMMY,
    };
    b.comb_process(top, body);

    let sink = DiagnosticSink::new();
    optimize_design(b.design.clone(), &b.interner, &HalcyonConfig::default(), &sink).unwrap();

    let latches: Vec<_> = sink
        .take_all()
        .into_iter()
        .filter(|d| d.code.number == 301)
        .collect();
    assert_eq!(latches.len(), 1);
    assert!(latches[0].message.contains("'y'"));
    assert!(latches[0].notes.iter().any(|n| n.contains("!(i0)")));
    assert_eq!(latches[0].severity, Severity::Warning);
}

/// `d = x & c; x = a | b;` (both blocking) reads the stale `x`; swapping
/// the statements removes the finding.
#[test]
fn blocking_read_before_write_is_flagged_and_order_sensitive() {
    let build = |hazardous: bool| {
        let mut b = DesignBuilder::new();
        let top = b.add_module("top");
        let a = b.input(top, "a", 1);
        let b_in = b.input(top, "b", 1);
        let c = b.input(top, "c", 1);
        let d = b.output(top, "d", 1);
        let x_out = b.output(top, "x", 1);
        let x = b.signal(top, "x_var", 1, SignalKind::Variable);
        let compute_d = {
            let value = b.binary(BinaryOp::And, Expr::signal(x), Expr::signal(c), 1);
            b.blocking(d, value)
        };
        let compute_x = {
            let value = b.binary(BinaryOp::Or, Expr::signal(a), Expr::signal(b_in), 1);
            b.blocking(x, value)
        };
        let stmts = if hazardous {
            vec![compute_d, compute_x]
        } else {
            vec![compute_x, compute_d]
        };
        let body = b.block(stmts);
        b.comb_process(top, body);
        b.assign(top, x_out, Expr::signal(x));
        b
    };

    let b = build(true);
    let sink = DiagnosticSink::new();
    optimize_design(b.design.clone(), &b.interner, &HalcyonConfig::default(), &sink).unwrap();
    let hazards: Vec<_> = sink
        .take_all()
        .into_iter()
        .filter(|d| d.code.number == 304)
        .collect();
    assert_eq!(hazards.len(), 1);
    assert!(hazards[0].message.contains("'x_var'"));
    assert!(hazards[0]
        .help
        .iter()
        .any(|h| h.contains("move the assignment")));

    let b = build(false);
    let sink = DiagnosticSink::new();
    optimize_design(b.design.clone(), &b.interner, &HalcyonConfig::default(), &sink).unwrap();
    assert!(sink.take_all().iter().all(|d| d.code.number != 304));
}

/// Strict mode promotes analyzer warnings to errors but still returns the
/// optimized design; blocking on them is the caller's decision.
#[test]
fn strict_mode_promotes_warnings_without_blocking_output() {
    let mut b = DesignBuilder::new();
    let top = b.add_module("top");
    let i0 = b.input(top, "i0", 1);
    let y = b.output(top, "y", 1);
    let body = Statement::If {
        condition: Expr::signal(i0),
        then_body: Box::new(b.blocking(y, Expr::lit(1, 1))),
        else_body: None,
        span: Span::DUMMY,
    };
    b.comb_process(top, body);

    let config = load_config_from_str("[lint]\nstrict = true\n").unwrap();
    let sink = DiagnosticSink::new();
    let result = optimize_design(b.design.clone(), &b.interner, &config, &sink);
    assert!(result.is_ok(), "warnings never block the pipeline");
    assert!(sink.has_errors(), "strict mode promotes to error severity");
}

/// The four analyzers of the hazard suite are registered by default.
#[test]
fn builtin_analyzers_are_registered() {
    let engine = halcyon_lint::LintEngine::with_defaults();
    let names = engine.rule_names();
    for rule in [
        "latch-inferred",
        "ambiguous-case-overlap",
        "sensitivity-mismatch",
        "order-dependent-assignment",
    ] {
        assert!(names.contains(&rule), "missing rule {rule}");
    }
}

/// An allow entry suppresses a rule end to end.
#[test]
fn allowed_rule_is_suppressed() {
    let mut b = DesignBuilder::new();
    let top = b.add_module("top");
    let i0 = b.input(top, "i0", 1);
    let y = b.output(top, "y", 1);
    let body = Statement::If {
        condition: Expr::signal(i0),
        then_body: Box::new(b.blocking(y, Expr::lit(1, 1))),
        else_body: None,
        span: Span::DUMMY,
    };
    b.comb_process(top, body);

    let config = load_config_from_str("[lint]\nallow = [\"latch-inferred\"]\n").unwrap();
    let sink = DiagnosticSink::new();
    optimize_design(b.design.clone(), &b.interner, &config, &sink).unwrap();
    assert!(sink.take_all().iter().all(|d| d.code.number != 301));
}
