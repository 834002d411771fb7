//! The Halcyon optimization pipeline.
//!
//! Control flow follows the classic shape: structural validation and
//! dependency-graph checks first, then the constant-propagation and
//! dead-logic loop to fixpoint per module, then the read-only
//! hazard analyzers, an optional flatten with a second fixpoint round, and
//! finally deterministic netlist emission via [`emit_design`].
//!
//! Fatal findings abort at the offending pass: the error is emitted as a
//! diagnostic, the typed [`PassError`] is returned, and no partial netlist
//! exists. Analyzer warnings accumulate in the sink next to a fully
//! optimized design; whether they block anything is the caller's policy.
//!
//! Sibling modules optimize in parallel on a rayon pool against the
//! immutable input design; results merge back in definition order, so the
//! output is independent of scheduling.

#![warn(missing_docs)]

mod collapse;
mod const_eval;
mod const_prop;
mod dce;
mod emit;
mod flatten;
mod rewrite;

pub use const_eval::{eval_expr, truthiness, EvalCtx};
pub use emit::emit_design;
pub use flatten::flatten_design;

use halcyon_common::Interner;
use halcyon_config::HalcyonConfig;
use halcyon_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use halcyon_graph::{classify_processes, hierarchy_order, validate_design, DepGraph, GraphError};
use halcyon_ir::{Design, Module};
use halcyon_lint::LintEngine;
use halcyon_source::Span;
use rayon::prelude::*;

/// A fatal pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    /// A structural invariant of the IR is violated.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The optimization loop exceeded its iteration cap.
    #[error("optimization did not converge within {limit} rounds in module '{module}'")]
    NonConvergence {
        /// The module still changing at the cap.
        module: String,
        /// The configured cap.
        limit: u32,
    },
}

impl PassError {
    /// The stable diagnostic code for this failure.
    pub fn code(&self) -> DiagnosticCode {
        let number = match self {
            PassError::Graph(GraphError::CombinationalLoop { .. }) => 101,
            PassError::Graph(GraphError::MultipleDriverConflict { .. }) => 102,
            PassError::Graph(GraphError::HierarchyCycle { .. }) => 103,
            PassError::NonConvergence { .. } => 104,
            PassError::Graph(
                GraphError::UndeclaredSignal { .. } | GraphError::UndeclaredInstance { .. },
            ) => 105,
            PassError::Graph(GraphError::UnknownModule { .. }) => 106,
            PassError::Graph(GraphError::PortArityMismatch { .. }) => 107,
        };
        DiagnosticCode::new(Category::Error, number)
    }
}

/// Shared read context handed to each pass invocation.
pub(crate) struct PassCx<'a> {
    /// The immutable input design (callee lookups, type widths).
    pub design: &'a Design,
    /// The session interner.
    pub interner: &'a Interner,
}

/// One optimization pass over a single module.
pub(crate) trait OptPass {
    /// Runs the pass, returning whether it changed the module.
    fn run(&self, cx: &PassCx<'_>, module: &mut Module) -> Result<bool, PassError>;
}

/// Runs the full pipeline and returns the optimized design.
///
/// Diagnostics (both analyzer warnings and, on failure, the fatal error)
/// land in `sink` regardless of the returned value; warnings never block
/// the result.
pub fn optimize_design(
    mut design: Design,
    interner: &Interner,
    config: &HalcyonConfig,
    sink: &DiagnosticSink,
) -> Result<Design, PassError> {
    if let Err(err) = validate_design(&design, interner) {
        return Err(report(sink, err.into()));
    }
    if let Err(err) = hierarchy_order(&design, interner) {
        return Err(report(sink, err.into()));
    }
    for (_mid, module) in design.modules.iter_mut() {
        classify_processes(module);
    }
    for (_mid, module) in design.modules.iter() {
        if let Err(err) = DepGraph::build(module, interner) {
            return Err(report(sink, err.into()));
        }
    }

    let mut design = run_fixpoint(design, interner, config, sink)?;

    let engine = LintEngine::new(&config.lint);
    engine.run(&design, interner, sink);

    if config.optimize.flatten {
        design = match flatten_design(&design, interner) {
            Ok(flat) => flat,
            Err(err) => return Err(report(sink, err.into())),
        };
        // Hierarchy boundaries hid some wire paths; re-check before the
        // second optimization round.
        for (_mid, module) in design.modules.iter() {
            if let Err(err) = DepGraph::build(module, interner) {
                return Err(report(sink, err.into()));
            }
        }
        design = run_fixpoint(design, interner, config, sink)?;
    }

    Ok(design)
}

/// Runs the pipeline and serializes the result.
pub fn optimize_and_emit(
    design: Design,
    interner: &Interner,
    config: &HalcyonConfig,
    sink: &DiagnosticSink,
) -> Result<(Design, String), PassError> {
    let optimized = optimize_design(design, interner, config, sink)?;
    let netlist = emit_design(&optimized, interner);
    Ok((optimized, netlist))
}

/// The const-prop/collapse/dead-logic loop, parallel across sibling
/// modules.
fn run_fixpoint(
    design: Design,
    interner: &Interner,
    config: &HalcyonConfig,
    sink: &DiagnosticSink,
) -> Result<Design, PassError> {
    let limit = config.optimize.max_iterations;
    let modules: Vec<Module> = design.modules.values().cloned().collect();

    let optimized: Result<Vec<Module>, PassError> = modules
        .into_par_iter()
        .map(|mut module| {
            let cx = PassCx {
                design: &design,
                interner,
            };
            let mut passes: Vec<Box<dyn OptPass>> = Vec::new();
            if config.optimize.const_prop {
                passes.push(Box::new(const_prop::ConstPropPass));
                passes.push(Box::new(collapse::CollapsePass));
            }
            if config.optimize.dead_logic {
                passes.push(Box::new(dce::DeadLogicPass));
            }
            for _round in 0..limit {
                let mut changed = false;
                for pass in &passes {
                    changed |= pass.run(&cx, &mut module)?;
                }
                if !changed {
                    return Ok(module);
                }
            }
            Err(PassError::NonConvergence {
                module: interner.resolve(module.name).to_string(),
                limit,
            })
        })
        .collect();

    match optimized {
        Ok(new_modules) => {
            let Design { top, types, .. } = design;
            Ok(Design {
                modules: new_modules.into_iter().collect(),
                top,
                types,
            })
        }
        Err(err) => Err(report(sink, err)),
    }
}

/// Emits the fatal error as a diagnostic before returning it; no invariant
/// violation passes silently.
fn report(sink: &DiagnosticSink, err: PassError) -> PassError {
    sink.emit(Diagnostic::error(err.code(), err.to_string(), Span::DUMMY));
    err
}
