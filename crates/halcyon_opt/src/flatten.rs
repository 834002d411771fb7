//! Hierarchy flattening by pure substitution.
//!
//! Modules are processed leaves-first, so by the time a parent is
//! flattened every callee is already instance-free and a single level of
//! inlining suffices. Callee internals are copied with fresh names scoped
//! by the instantiation path (`u0.acc`, and `u0.u1.acc` after two levels),
//! port bindings become continuous assignments, and instance-output
//! references become reads of the inlined port signals. No logic is
//! re-derived, so functional equivalence holds by construction; the value
//! of the pass is that constant propagation and dead-logic elimination can
//! then reach across the former module boundaries.

use halcyon_common::Interner;
use halcyon_graph::{hierarchy_order, GraphError};
use halcyon_ir::{
    Arena, Assignment, Design, EdgeSensitivity, Expr, Instance, InstanceId, Module, ProcessId,
    Sensitivity, Signal, SignalId, SignalRef,
};
use std::collections::HashMap;

/// Flattens every module of the design; the result's top module contains
/// no instances.
pub fn flatten_design(design: &Design, interner: &Interner) -> Result<Design, GraphError> {
    let order = hierarchy_order(design, interner)?;
    let mut flat: HashMap<u32, Module> = HashMap::new();

    for mid in order {
        let mut module = design.modules.get(mid).clone();
        inline_instances(&mut module, &flat, interner);
        flat.insert(mid.as_raw(), module);
    }

    let mut modules = Arena::new();
    for mid in design.modules.ids() {
        if let Some(module) = flat.remove(&mid.as_raw()) {
            modules.alloc(module);
        }
    }
    Ok(Design {
        modules,
        top: design.top,
        types: design.types.clone(),
    })
}

fn inline_instances(module: &mut Module, flat: &HashMap<u32, Module>, interner: &Interner) {
    if module.instances.is_empty() {
        return;
    }
    let instances: Vec<Instance> = module.instances.values().cloned().collect();
    module.instances = Arena::new();

    // (instance, output index) -> inlined internal port signal.
    let mut output_map: HashMap<(InstanceId, u32), SignalId> = HashMap::new();

    for instance in &instances {
        let callee = &flat[&instance.module.as_raw()];
        let prefix = interner.resolve(instance.name).to_string();

        let mut sig_map: HashMap<SignalId, SignalId> = HashMap::new();
        for (old_id, signal) in callee.signals.iter() {
            let scoped = format!("{prefix}.{}", interner.resolve(signal.name));
            let new_id = SignalId::from_raw(module.signals.len() as u32);
            module.signals.alloc(Signal {
                id: new_id,
                name: interner.get_or_intern(&scoped),
                ty: signal.ty,
                kind: signal.kind,
                init: signal.init.clone(),
                span: signal.span,
            });
            sig_map.insert(old_id, new_id);
        }

        let rename_expr = |e: &Expr| match e {
            Expr::Signal(SignalRef::Signal(id)) => sig_map
                .get(id)
                .map(|new_id| Expr::Signal(SignalRef::Signal(*new_id))),
            Expr::Signal(SignalRef::Slice { signal, high, low }) => {
                sig_map.get(signal).map(|new_id| {
                    Expr::Signal(SignalRef::Slice {
                        signal: *new_id,
                        high: *high,
                        low: *low,
                    })
                })
            }
            Expr::EdgeTest { edge, signal, span } => sig_map.get(signal).map(|new_id| {
                Expr::EdgeTest {
                    edge: *edge,
                    signal: *new_id,
                    span: *span,
                }
            }),
            _ => None,
        };
        let rename_target = |t: &SignalRef| match t {
            SignalRef::Signal(id) => sig_map.get(id).map(|new_id| SignalRef::Signal(*new_id)),
            SignalRef::Slice { signal, high, low } => sig_map.get(signal).map(|new_id| {
                SignalRef::Slice {
                    signal: *new_id,
                    high: *high,
                    low: *low,
                }
            }),
        };

        // Input port bindings become direct assignments into the copy.
        for (port, binding) in callee.input_ports().zip(&instance.inputs) {
            module.assignments.push(Assignment {
                target: SignalRef::Signal(sig_map[&port.signal]),
                value: binding.clone(),
                span: instance.span,
            });
        }
        // Bound parent outputs read the inlined port signals.
        for (index, (port, bound)) in callee.output_ports().zip(&instance.outputs).enumerate() {
            output_map.insert((instance.id, index as u32), sig_map[&port.signal]);
            if let Some(parent_sig) = bound {
                module.assignments.push(Assignment {
                    target: SignalRef::Signal(*parent_sig),
                    value: Expr::Signal(SignalRef::Signal(sig_map[&port.signal])),
                    span: instance.span,
                });
            }
        }

        for assign in &callee.assignments {
            module.assignments.push(Assignment {
                target: rename_target(&assign.target).unwrap_or_else(|| assign.target.clone()),
                value: assign.value.rewrite(&rename_expr),
                span: assign.span,
            });
        }
        for (_pid, process) in callee.processes.iter() {
            let mut copy = process.clone();
            copy.id = ProcessId::from_raw(module.processes.len() as u32);
            copy.body = process.body.rewrite(&rename_expr, &rename_target);
            copy.sensitivity = match &process.sensitivity {
                Sensitivity::All => Sensitivity::All,
                Sensitivity::EdgeList(entries) => Sensitivity::EdgeList(
                    entries
                        .iter()
                        .map(|e| EdgeSensitivity {
                            signal: *sig_map.get(&e.signal).unwrap_or(&e.signal),
                            edge: e.edge,
                        })
                        .collect(),
                ),
            };
            module.processes.alloc(copy);
        }
    }

    // Former instance-output reads now read the inlined signals.
    let resolve = |e: &Expr| match e {
        Expr::InstanceOutput { instance, port, .. } => output_map
            .get(&(*instance, *port))
            .map(|sig| Expr::Signal(SignalRef::Signal(*sig))),
        _ => None,
    };
    for assign in &mut module.assignments {
        assign.value = assign.value.rewrite(&resolve);
    }
    let new_bodies: Vec<(ProcessId, halcyon_ir::Statement)> = module
        .processes
        .iter()
        .map(|(pid, p)| (pid, p.body.rewrite(&resolve, &|_| None)))
        .collect();
    for (pid, body) in new_bodies {
        module.processes.get_mut(pid).body = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_ir::{BinaryOp, ModuleId, Port, PortDirection, PortId, SignalKind, TypeDb};
    use halcyon_source::Span;

    /// Builds `top` instantiating a 2-input AND leaf twice in a chain:
    /// y = and(and(a, b), c).
    fn chain_design(interner: &Interner) -> Design {
        let mut types = TypeDb::new();
        let bit = types.bitvec(1);

        let mut leaf = Module::new(
            ModuleId::from_raw(1),
            interner.get_or_intern("and2"),
            Span::DUMMY,
        );
        let (mut ids, names) = (Vec::new(), ["a", "b", "y"]);
        for name in names {
            let id = SignalId::from_raw(leaf.signals.len() as u32);
            leaf.signals.alloc(Signal {
                id,
                name: interner.get_or_intern(name),
                ty: bit,
                kind: SignalKind::Wire,
                init: None,
                span: Span::DUMMY,
            });
            ids.push(id);
        }
        for (i, (name, dir)) in [
            ("a", PortDirection::Input),
            ("b", PortDirection::Input),
            ("y", PortDirection::Output),
        ]
        .iter()
        .enumerate()
        {
            leaf.ports.push(Port {
                id: PortId::from_raw(i as u32),
                name: interner.get_or_intern(name),
                direction: *dir,
                ty: bit,
                signal: ids[i],
                span: Span::DUMMY,
            });
        }
        leaf.assignments.push(Assignment {
            target: SignalRef::Signal(ids[2]),
            value: Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(Expr::signal(ids[0])),
                rhs: Box::new(Expr::signal(ids[1])),
                ty: bit,
                span: Span::DUMMY,
            },
            span: Span::DUMMY,
        });

        let mut top = Module::new(
            ModuleId::from_raw(0),
            interner.get_or_intern("top"),
            Span::DUMMY,
        );
        let mut top_ids = Vec::new();
        for name in ["a", "b", "c", "y", "n0"] {
            let id = SignalId::from_raw(top.signals.len() as u32);
            top.signals.alloc(Signal {
                id,
                name: interner.get_or_intern(name),
                ty: bit,
                kind: SignalKind::Wire,
                init: None,
                span: Span::DUMMY,
            });
            top_ids.push(id);
        }
        for (i, (name, dir)) in [
            ("a", PortDirection::Input),
            ("b", PortDirection::Input),
            ("c", PortDirection::Input),
            ("y", PortDirection::Output),
        ]
        .iter()
        .enumerate()
        {
            top.ports.push(Port {
                id: PortId::from_raw(i as u32),
                name: interner.get_or_intern(name),
                direction: *dir,
                ty: bit,
                signal: top_ids[i],
                span: Span::DUMMY,
            });
        }
        top.instances.alloc(Instance {
            id: InstanceId::from_raw(0),
            name: interner.get_or_intern("u0"),
            module: ModuleId::from_raw(1),
            inputs: vec![Expr::signal(top_ids[0]), Expr::signal(top_ids[1])],
            outputs: vec![Some(top_ids[4])],
            span: Span::DUMMY,
        });
        top.instances.alloc(Instance {
            id: InstanceId::from_raw(1),
            name: interner.get_or_intern("u1"),
            module: ModuleId::from_raw(1),
            inputs: vec![Expr::signal(top_ids[4]), Expr::signal(top_ids[2])],
            outputs: vec![Some(top_ids[3])],
            span: Span::DUMMY,
        });

        let mut modules = Arena::new();
        let top_id = modules.alloc(top);
        modules.alloc(leaf);
        Design {
            modules,
            top: top_id,
            types,
        }
    }

    #[test]
    fn flattened_top_has_no_instances() {
        let interner = Interner::new();
        let design = chain_design(&interner);
        let flat = flatten_design(&design, &interner).unwrap();
        let top = flat.top_module();
        assert!(top.instances.is_empty());
        // Two copies of the leaf's three signals joined the parent.
        assert_eq!(top.signals.len(), 5 + 6);
        // Each instance contributes 2 input bindings + 1 output binding +
        // 1 internal assignment.
        assert_eq!(top.assignments.len(), 8);
    }

    #[test]
    fn inlined_names_are_scoped_by_instance_path() {
        let interner = Interner::new();
        let design = chain_design(&interner);
        let flat = flatten_design(&design, &interner).unwrap();
        let top = flat.top_module();
        let names: Vec<&str> = top
            .signals
            .values()
            .map(|s| interner.resolve(s.name))
            .collect();
        assert!(names.contains(&"u0.y"));
        assert!(names.contains(&"u1.a"));
    }

    #[test]
    fn flattening_preserves_declaration_order_of_existing_signals() {
        let interner = Interner::new();
        let design = chain_design(&interner);
        let flat = flatten_design(&design, &interner).unwrap();
        let top = flat.top_module();
        let first_five: Vec<&str> = top
            .signals
            .values()
            .take(5)
            .map(|s| interner.resolve(s.name))
            .collect();
        assert_eq!(first_five, vec!["a", "b", "c", "y", "n0"]);
    }
}
