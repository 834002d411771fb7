//! Single-reader wire forwarding.
//!
//! A wire with exactly one full continuous driver and exactly one read
//! (that read sitting in another continuous assignment) is pure plumbing:
//! the read is replaced by the driving expression and the driver deleted.
//! Together with the identity folds in constant propagation this is what
//! collapses an AND gate with a tied-high input down to a wire, and a
//! chain of such gates down to one driving expression. Single use keeps
//! the rewrite linear; nothing is ever duplicated.

use crate::{OptPass, PassCx, PassError};
use halcyon_ir::{Expr, Module, SignalId, SignalKind, SignalRef};
use std::collections::HashMap;

pub(crate) struct CollapsePass;

impl OptPass for CollapsePass {
    fn run(&self, _cx: &PassCx<'_>, module: &mut Module) -> Result<bool, PassError> {
        let mut changed = false;

        // One forwarding step per invocation round; the fixpoint loop
        // drives chains to completion.
        while let Some((wire, driver_index, reader_index)) = find_forwardable(module) {
            let value = module.assignments[driver_index].value.clone();
            let substitute = |e: &Expr| match e {
                Expr::Signal(SignalRef::Signal(id)) if *id == wire => Some(value.clone()),
                _ => None,
            };
            module.assignments[reader_index].value =
                module.assignments[reader_index].value.rewrite(&substitute);
            module.assignments.remove(driver_index);
            changed = true;
        }

        Ok(changed)
    }
}

/// Finds the first wire eligible for forwarding, returning the wire, its
/// driving assignment index, and the reading assignment index.
fn find_forwardable(module: &Module) -> Option<(SignalId, usize, usize)> {
    // Reads anywhere outside continuous assignments disqualify a wire.
    let mut outside_reads: HashMap<SignalId, u32> = HashMap::new();
    for (_pid, process) in module.processes.iter() {
        let mut reads = std::collections::HashSet::new();
        process.body.collect_read_signals(&mut reads);
        reads.extend(process.sensitivity.listed_signals());
        for sig in reads {
            *outside_reads.entry(sig).or_default() += 1;
        }
    }
    for (_iid, instance) in module.instances.iter() {
        for input in &instance.inputs {
            for sig in input.read_signals() {
                *outside_reads.entry(sig).or_default() += 1;
            }
        }
    }

    let mut assign_reads: HashMap<SignalId, Vec<usize>> = HashMap::new();
    for (index, assign) in module.assignments.iter().enumerate() {
        for sig in read_occurrences(&assign.value) {
            assign_reads.entry(sig).or_default().push(index);
        }
    }

    let mut drivers: HashMap<SignalId, Vec<usize>> = HashMap::new();
    for (index, assign) in module.assignments.iter().enumerate() {
        if assign.target.is_full() {
            drivers.entry(assign.target.signal()).or_default().push(index);
        }
    }

    for (index, assign) in module.assignments.iter().enumerate() {
        if !assign.target.is_full() {
            continue;
        }
        let wire = assign.target.signal();
        if module.signals.get(wire).kind != SignalKind::Wire {
            continue;
        }
        if module.port_of_signal(wire).is_some() {
            continue;
        }
        if outside_reads.contains_key(&wire) {
            continue;
        }
        if drivers.get(&wire).map(Vec::len) != Some(1) {
            continue;
        }
        match assign_reads.get(&wire).map(Vec::as_slice) {
            Some([reader]) if *reader != index => {
                return Some((wire, index, *reader));
            }
            _ => continue,
        }
    }
    None
}

/// Every read occurrence (with multiplicity) of full-signal references.
fn read_occurrences(expr: &Expr) -> Vec<SignalId> {
    let mut out = Vec::new();
    collect_occurrences(expr, &mut out);
    out
}

fn collect_occurrences(expr: &Expr, out: &mut Vec<SignalId>) {
    match expr {
        Expr::Literal(_) | Expr::InstanceOutput { .. } => {}
        Expr::Signal(sref) => out.push(sref.signal()),
        Expr::EdgeTest { signal, .. } => out.push(*signal),
        Expr::Unary { operand, .. } => collect_occurrences(operand, out),
        Expr::Binary { lhs, rhs, .. } => {
            collect_occurrences(lhs, out);
            collect_occurrences(rhs, out);
        }
        Expr::Ternary {
            condition,
            true_val,
            false_val,
            ..
        } => {
            collect_occurrences(condition, out);
            collect_occurrences(true_val, out);
            collect_occurrences(false_val, out);
        }
        Expr::Concat(parts) => {
            for part in parts {
                collect_occurrences(part, out);
            }
        }
        Expr::Slice { expr, .. } => collect_occurrences(expr, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_common::Interner;
    use halcyon_ir::{
        Arena, Assignment, BinaryOp, Design, ModuleId, Port, PortDirection, PortId, Signal,
        TypeDb, TypeId,
    };
    use halcyon_source::Span;

    fn run(design: &Design, interner: &Interner) -> (Module, bool) {
        let cx = PassCx { design, interner };
        let mut module = design.top_module().clone();
        let changed = CollapsePass.run(&cx, &mut module).unwrap();
        (module, changed)
    }

    fn chain_design(interner: &Interner) -> Design {
        let mut types = TypeDb::new();
        let bit = types.bitvec(1);
        let mut module = Module::new(
            ModuleId::from_raw(0),
            interner.get_or_intern("top"),
            Span::DUMMY,
        );
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "n0", "n1", "y"] {
            let id = SignalId::from_raw(module.signals.len() as u32);
            module.signals.alloc(Signal {
                id,
                name: interner.get_or_intern(name),
                ty: bit,
                kind: SignalKind::Wire,
                init: None,
                span: Span::DUMMY,
            });
            ids.push(id);
        }
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            module.ports.push(Port {
                id: PortId::from_raw(i as u32),
                name: interner.get_or_intern(name),
                direction: PortDirection::Input,
                ty: bit,
                signal: ids[i],
                span: Span::DUMMY,
            });
        }
        module.ports.push(Port {
            id: PortId::from_raw(3),
            name: interner.get_or_intern("y"),
            direction: PortDirection::Output,
            ty: bit,
            signal: ids[5],
            span: Span::DUMMY,
        });
        let and = |a: SignalId, b: SignalId| Expr::Binary {
            op: BinaryOp::And,
            lhs: Box::new(Expr::signal(a)),
            rhs: Box::new(Expr::signal(b)),
            ty: TypeId::from_raw(0),
            span: Span::DUMMY,
        };
        // n0 = a & b; n1 = n0 & c; y = n1
        module.assignments.push(Assignment {
            target: SignalRef::Signal(ids[3]),
            value: and(ids[0], ids[1]),
            span: Span::DUMMY,
        });
        module.assignments.push(Assignment {
            target: SignalRef::Signal(ids[4]),
            value: and(ids[3], ids[2]),
            span: Span::DUMMY,
        });
        module.assignments.push(Assignment {
            target: SignalRef::Signal(ids[5]),
            value: Expr::signal(ids[4]),
            span: Span::DUMMY,
        });
        let mut modules = Arena::new();
        let top = modules.alloc(module);
        Design { modules, top, types }
    }

    #[test]
    fn chain_collapses_to_one_driver() {
        let interner = Interner::new();
        let design = chain_design(&interner);
        let (module, changed) = run(&design, &interner);
        assert!(changed);
        assert_eq!(module.assignments.len(), 1);
        assert_eq!(module.assignments[0].target.signal().as_raw(), 5);
        // y = ((a & b) & c)
        let text = halcyon_ir::pretty::expr_to_string(
            &module.assignments[0].value,
            &design,
            &module,
            &interner,
        );
        assert_eq!(text, "((a & b) & c)");
    }

    #[test]
    fn multi_reader_wires_are_left_alone() {
        let interner = Interner::new();
        let mut design = chain_design(&interner);
        // Second reader of n0.
        let module = design.modules.get_mut(ModuleId::from_raw(0));
        let extra = module.signals.alloc(Signal {
            id: SignalId::from_raw(6),
            name: interner.get_or_intern("extra"),
            ty: TypeId::from_raw(0),
            kind: SignalKind::Wire,
            init: None,
            span: Span::DUMMY,
        });
        module.ports.push(Port {
            id: PortId::from_raw(4),
            name: interner.get_or_intern("extra"),
            direction: PortDirection::Output,
            ty: TypeId::from_raw(0),
            signal: extra,
            span: Span::DUMMY,
        });
        module.assignments.push(Assignment {
            target: SignalRef::Signal(extra),
            value: Expr::signal(SignalId::from_raw(3)),
            span: Span::DUMMY,
        });
        let (module, _changed) = run(&design, &interner);
        // n0 has two readers and must keep its own driver.
        assert!(module
            .assignments
            .iter()
            .any(|a| a.target.signal().as_raw() == 3));
    }

    #[test]
    fn port_backed_wires_are_never_forwarded() {
        let interner = Interner::new();
        let design = chain_design(&interner);
        let (module, _changed) = run(&design, &interner);
        // y is a port; its driver must survive even as a plain alias.
        assert!(module
            .assignments
            .iter()
            .any(|a| a.target.signal().as_raw() == 5));
    }
}
