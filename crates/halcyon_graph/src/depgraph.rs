//! Per-module signal dependency graph construction.

use crate::error::GraphError;
use halcyon_common::Interner;
use halcyon_ir::{
    InstanceId, Module, ProcessKind, SignalId, SignalKind,
};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A node of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepNode {
    /// A signal of the module.
    Signal(SignalId),
    /// A submodule instance.
    Instance(InstanceId),
}

/// Edge kind: whether the dependency crosses a sequential element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepEdge {
    /// Value flows combinationally (continuous assignment, combinational
    /// process, instance binding).
    Comb,
    /// Value is sampled by an edge-triggered process; breaks loops.
    Seq,
}

/// The signal-level dependency graph of one module.
///
/// Edges run from every expression's reads to the assignment target they
/// feed. Building the graph performs the two per-module structural checks:
/// the combinational-wire-loop check and the unconditional-driver check.
#[derive(Debug)]
pub struct DepGraph {
    graph: DiGraph<DepNode, DepEdge>,
    signal_index: HashMap<SignalId, NodeIndex>,
    instance_index: HashMap<InstanceId, NodeIndex>,
}

impl DepGraph {
    /// Builds the graph for `module`, failing fast on structural errors.
    ///
    /// Process kinds must already be classified (see
    /// [`classify_processes`](crate::classify_processes)); sequential
    /// processes contribute loop-breaking edges.
    pub fn build(module: &Module, interner: &Interner) -> Result<DepGraph, GraphError> {
        let mut graph = DiGraph::new();
        let mut signal_index = HashMap::new();
        let mut instance_index = HashMap::new();

        for id in module.signals.ids() {
            signal_index.insert(id, graph.add_node(DepNode::Signal(id)));
        }
        for id in module.instances.ids() {
            instance_index.insert(id, graph.add_node(DepNode::Instance(id)));
        }

        let mut dg = DepGraph {
            graph,
            signal_index,
            instance_index,
        };

        // Continuous assignments: reads feed the target combinationally.
        for assign in &module.assignments {
            let target = assign.target.signal();
            for read in assign.value.read_signals() {
                dg.add_edge(DepNode::Signal(read), DepNode::Signal(target), DepEdge::Comb);
            }
            let mut insts = HashSet::new();
            assign.value.collect_instances(&mut insts);
            for inst in insts {
                dg.add_edge(DepNode::Instance(inst), DepNode::Signal(target), DepEdge::Comb);
            }
        }

        // Combinational processes get per-assignment edges: the RHS reads
        // and every enclosing branch condition feed that assignment's
        // target. Per-assignment granularity matters: two blocking
        // assignments exchanging values in order are dataflow, not a loop.
        // Sequential processes sample, so their reads (body plus
        // sensitivity list) reach their writes over loop-breaking edges.
        for (_pid, process) in module.processes.iter() {
            match process.kind {
                ProcessKind::Combinational => {
                    let mut ctrl_signals = Vec::new();
                    let mut ctrl_instances = Vec::new();
                    dg.add_comb_stmt_edges(
                        &process.body,
                        &mut ctrl_signals,
                        &mut ctrl_instances,
                    );
                }
                ProcessKind::Sequential => {
                    let mut reads = HashSet::new();
                    process.body.collect_read_signals(&mut reads);
                    reads.extend(process.sensitivity.listed_signals());
                    let mut writes = HashSet::new();
                    process.body.collect_written_signals(&mut writes);
                    for &write in &writes {
                        for &read in &reads {
                            dg.add_edge(
                                DepNode::Signal(read),
                                DepNode::Signal(write),
                                DepEdge::Seq,
                            );
                        }
                    }
                }
            }
        }

        // Instances: input binding reads feed the instance node, the
        // instance node feeds each bound output signal.
        for (iid, instance) in module.instances.iter() {
            for input in &instance.inputs {
                for read in input.read_signals() {
                    dg.add_edge(DepNode::Signal(read), DepNode::Instance(iid), DepEdge::Comb);
                }
                let mut insts = HashSet::new();
                input.collect_instances(&mut insts);
                for upstream in insts {
                    dg.add_edge(
                        DepNode::Instance(upstream),
                        DepNode::Instance(iid),
                        DepEdge::Comb,
                    );
                }
            }
            for out in instance.driven_signals() {
                dg.add_edge(DepNode::Instance(iid), DepNode::Signal(out), DepEdge::Comb);
            }
        }

        dg.check_driver_conflicts(module, interner)?;
        dg.check_combinational_loops(module, interner)?;
        Ok(dg)
    }

    fn node(&self, node: DepNode) -> NodeIndex {
        match node {
            DepNode::Signal(id) => self.signal_index[&id],
            DepNode::Instance(id) => self.instance_index[&id],
        }
    }

    fn add_edge(&mut self, from: DepNode, to: DepNode, kind: DepEdge) {
        let (a, b) = (self.node(from), self.node(to));
        self.graph.add_edge(a, b, kind);
    }

    /// Per-assignment combinational edges, with `ctrl_*` tracking the
    /// reads of every enclosing branch condition.
    fn add_comb_stmt_edges(
        &mut self,
        stmt: &halcyon_ir::Statement,
        ctrl_signals: &mut Vec<SignalId>,
        ctrl_instances: &mut Vec<InstanceId>,
    ) {
        use halcyon_ir::Statement;
        match stmt {
            Statement::Nop => {}
            Statement::Assign { target, value, .. } => {
                let to = DepNode::Signal(target.signal());
                for read in value.read_signals() {
                    self.add_edge(DepNode::Signal(read), to, DepEdge::Comb);
                }
                let mut insts = HashSet::new();
                value.collect_instances(&mut insts);
                for inst in insts {
                    self.add_edge(DepNode::Instance(inst), to, DepEdge::Comb);
                }
                for &read in ctrl_signals.iter() {
                    self.add_edge(DepNode::Signal(read), to, DepEdge::Comb);
                }
                for &inst in ctrl_instances.iter() {
                    self.add_edge(DepNode::Instance(inst), to, DepEdge::Comb);
                }
            }
            Statement::Block { stmts, .. } => {
                for s in stmts {
                    self.add_comb_stmt_edges(s, ctrl_signals, ctrl_instances);
                }
            }
            Statement::Loop { body, .. } => {
                self.add_comb_stmt_edges(body, ctrl_signals, ctrl_instances);
            }
            Statement::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                let (sig_mark, inst_mark) = (ctrl_signals.len(), ctrl_instances.len());
                ctrl_signals.extend(condition.read_signals());
                let mut insts = HashSet::new();
                condition.collect_instances(&mut insts);
                ctrl_instances.extend(insts);
                self.add_comb_stmt_edges(then_body, ctrl_signals, ctrl_instances);
                if let Some(e) = else_body {
                    self.add_comb_stmt_edges(e, ctrl_signals, ctrl_instances);
                }
                ctrl_signals.truncate(sig_mark);
                ctrl_instances.truncate(inst_mark);
            }
            Statement::Case {
                subject,
                arms,
                default,
                ..
            } => {
                let (sig_mark, inst_mark) = (ctrl_signals.len(), ctrl_instances.len());
                ctrl_signals.extend(subject.read_signals());
                let mut insts = HashSet::new();
                subject.collect_instances(&mut insts);
                ctrl_instances.extend(insts);
                for arm in arms {
                    self.add_comb_stmt_edges(&arm.body, ctrl_signals, ctrl_instances);
                }
                if let Some(d) = default {
                    self.add_comb_stmt_edges(d, ctrl_signals, ctrl_instances);
                }
                ctrl_signals.truncate(sig_mark);
                ctrl_instances.truncate(inst_mark);
            }
        }
    }

    /// Each wire may carry at most one unconditional continuous driver:
    /// a whole-signal continuous assignment or an instance output binding.
    fn check_driver_conflicts(
        &self,
        module: &Module,
        interner: &Interner,
    ) -> Result<(), GraphError> {
        let mut drivers: HashMap<SignalId, usize> = HashMap::new();
        for assign in &module.assignments {
            if assign.target.is_full() {
                *drivers.entry(assign.target.signal()).or_default() += 1;
            }
        }
        for (_iid, instance) in module.instances.iter() {
            for out in instance.driven_signals() {
                *drivers.entry(out).or_default() += 1;
            }
        }
        for (signal, count) in drivers {
            if count > 1 && module.signals.get(signal).kind == SignalKind::Wire {
                return Err(GraphError::MultipleDriverConflict {
                    module: interner.resolve(module.name).to_string(),
                    signal: interner.resolve(module.signals.get(signal).name).to_string(),
                    count,
                });
            }
        }
        Ok(())
    }

    /// A cycle is fatal only if every edge on it is combinational and every
    /// node is a signal; a path through a sequential process is sampled
    /// feedback and legal.
    fn check_combinational_loops(
        &self,
        module: &Module,
        interner: &Interner,
    ) -> Result<(), GraphError> {
        let mut comb = DiGraph::<SignalId, ()>::new();
        let mut index = HashMap::new();
        for id in module.signals.ids() {
            index.insert(id, comb.add_node(id));
        }
        for edge in self.graph.edge_indices() {
            if *self.graph.edge_weight(edge).unwrap_or(&DepEdge::Seq) != DepEdge::Comb {
                continue;
            }
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                if let (DepNode::Signal(from), DepNode::Signal(to)) =
                    (self.graph[a], self.graph[b])
                {
                    comb.add_edge(index[&from], index[&to], ());
                }
            }
        }

        for scc in tarjan_scc(&comb) {
            let cyclic = scc.len() > 1
                || (scc.len() == 1 && comb.find_edge(scc[0], scc[0]).is_some());
            if cyclic {
                let mut names: Vec<&str> = scc
                    .iter()
                    .map(|&n| interner.resolve(module.signals.get(comb[n]).name))
                    .collect();
                names.sort_unstable();
                let mut cycle = names.join(" -> ");
                cycle.push_str(" -> ");
                cycle.push_str(names[0]);
                return Err(GraphError::CombinationalLoop {
                    module: interner.resolve(module.name).to_string(),
                    cycle,
                });
            }
        }
        Ok(())
    }

    /// Backward closure: everything that (transitively) feeds `roots`.
    ///
    /// Returns the observable signals and instances; the roots themselves
    /// are included.
    pub fn observable_set(
        &self,
        roots: impl IntoIterator<Item = SignalId>,
    ) -> (HashSet<SignalId>, HashSet<InstanceId>) {
        let mut signals = HashSet::new();
        let mut instances = HashSet::new();
        let mut worklist: Vec<NodeIndex> = Vec::new();

        for root in roots {
            if signals.insert(root) {
                worklist.push(self.signal_index[&root]);
            }
        }

        while let Some(node) = worklist.pop() {
            for pred in self
                .graph
                .neighbors_directed(node, petgraph::Direction::Incoming)
            {
                let fresh = match self.graph[pred] {
                    DepNode::Signal(id) => signals.insert(id),
                    DepNode::Instance(id) => instances.insert(id),
                };
                if fresh {
                    worklist.push(pred);
                }
            }
        }
        (signals, instances)
    }

    /// Number of graph nodes (signals plus instances).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}
