//! Hazard analyzers for behavioral hardware IR.
//!
//! The analyzers are read-only: they inspect the IR after the optimization
//! fixpoint and report simulation/synthesis divergence hazards as
//! diagnostics. Four rules are built in:
//!
//! - **W301 latch-inferred**: an output of a combinational process is
//!   unassigned on some control-flow path.
//! - **W302 ambiguous-case-overlap**: wildcard case patterns in different
//!   arms can match the same selector encoding.
//! - **W303 sensitivity-mismatch**: a level-sensitive explicit list misses
//!   a signal the body reads.
//! - **W304 order-dependent-assignment**: a blocking assignment reads a
//!   variable a later statement in the same block blocking-assigns.

#![warn(missing_docs)]

mod engine;
mod helpers;
mod rules;

pub use engine::LintEngine;
pub use helpers::{
    case_covers_all, collect_unsampled_reads, enumerate_paths, render_path_predicate,
    ControlPath, PathCond,
};
pub use rules::{
    register_builtin_rules, AmbiguousCaseOverlap, LatchInferred, OrderDependentAssignment,
    SensitivityMismatch,
};

use halcyon_common::Interner;
use halcyon_diagnostics::{DiagnosticCode, DiagnosticSink, Severity};
use halcyon_ir::{Design, Module};

/// One analyzer rule checked against every module.
pub trait LintRule: Send + Sync {
    /// Stable diagnostic code (e.g. W301).
    fn code(&self) -> DiagnosticCode;

    /// Kebab-case rule name used in deny/allow configuration.
    fn name(&self) -> &str;

    /// One-line description of what the rule detects.
    fn description(&self) -> &str;

    /// Severity when neither denied nor allowed.
    fn default_severity(&self) -> Severity;

    /// Checks one module, emitting findings into the sink.
    fn check_module(
        &self,
        module: &Module,
        design: &Design,
        interner: &Interner,
        sink: &DiagnosticSink,
    );
}
