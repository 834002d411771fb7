//! Dead-logic elimination.
//!
//! Observability is backward reachability from the module's output and
//! inout ports over the dependency graph. A continuous assignment,
//! process, or instance whose targets all fall outside the observable set
//! is deleted, including sequential registers nothing reads, which is
//! what lets an unused counter disappear whole rather than bit by bit.
//! The pipeline re-runs this pass to fixpoint: deleting one instance can
//! strand its input cone for the next round.

use crate::rewrite::{retain_instances, retain_processes};
use crate::{OptPass, PassCx, PassError};
use halcyon_graph::DepGraph;
use halcyon_ir::{Module, SignalId};
use std::collections::HashSet;

pub(crate) struct DeadLogicPass;

impl OptPass for DeadLogicPass {
    fn run(&self, cx: &PassCx<'_>, module: &mut Module) -> Result<bool, PassError> {
        let graph = DepGraph::build(module, cx.interner)?;
        let roots: Vec<SignalId> = module.output_ports().map(|p| p.signal).collect();
        let (observable, observable_instances) = graph.observable_set(roots);

        let mut changed = false;

        let before = module.assignments.len();
        module
            .assignments
            .retain(|a| observable.contains(&a.target.signal()));
        changed |= module.assignments.len() != before;

        let dead_processes: HashSet<_> = module
            .processes
            .iter()
            .filter(|(_pid, process)| {
                let mut written = HashSet::new();
                process.body.collect_written_signals(&mut written);
                written.iter().all(|sig| !observable.contains(sig))
            })
            .map(|(pid, _)| pid)
            .collect();
        changed |= retain_processes(module, |pid| !dead_processes.contains(&pid));

        changed |= retain_instances(module, |iid| observable_instances.contains(&iid));

        Ok(changed)
    }
}
