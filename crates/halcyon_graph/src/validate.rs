//! Fail-fast validation of the incoming IR.

use crate::error::GraphError;
use halcyon_common::Interner;
use halcyon_ir::{Design, InstanceId, Module, SignalId, Statement};
use std::collections::HashSet;

/// Rejects IR that references undeclared signals, unknown modules, or
/// mis-sized instance bindings.
///
/// Runs once, before any pass: the optimizer never guesses about a
/// malformed hand-off from the parsing collaborator.
pub fn validate_design(design: &Design, interner: &Interner) -> Result<(), GraphError> {
    if !design.modules.contains(design.top) {
        return Err(GraphError::UnknownModule {
            module: "<design>".to_string(),
            instance: "<top>".to_string(),
            target: design.top.as_raw(),
        });
    }
    for (_mid, module) in design.modules.iter() {
        validate_module(design, module, interner)?;
    }
    Ok(())
}

fn validate_module(
    design: &Design,
    module: &Module,
    interner: &Interner,
) -> Result<(), GraphError> {
    let mut referenced: HashSet<SignalId> = HashSet::new();

    for port in &module.ports {
        referenced.insert(port.signal);
    }
    for assign in &module.assignments {
        referenced.insert(assign.target.signal());
        assign.value.collect_signals(&mut referenced);
    }
    for (_pid, process) in module.processes.iter() {
        process.body.collect_read_signals(&mut referenced);
        process.body.collect_written_signals(&mut referenced);
        referenced.extend(process.sensitivity.listed_signals());
    }
    for (_iid, instance) in module.instances.iter() {
        for input in &instance.inputs {
            input.collect_signals(&mut referenced);
        }
        referenced.extend(instance.driven_signals());
    }

    for signal in referenced {
        if !module.signals.contains(signal) {
            return Err(GraphError::UndeclaredSignal {
                module: interner.resolve(module.name).to_string(),
                signal: signal.as_raw(),
            });
        }
    }

    let mut instance_refs: HashSet<InstanceId> = HashSet::new();
    for assign in &module.assignments {
        assign.value.collect_instances(&mut instance_refs);
    }
    for (_pid, process) in module.processes.iter() {
        collect_stmt_instances(&process.body, &mut instance_refs);
    }
    for (_iid, instance) in module.instances.iter() {
        for input in &instance.inputs {
            input.collect_instances(&mut instance_refs);
        }
    }
    for instance in instance_refs {
        if !module.instances.contains(instance) {
            return Err(GraphError::UndeclaredInstance {
                module: interner.resolve(module.name).to_string(),
                instance: instance.as_raw(),
            });
        }
    }

    for (_iid, instance) in module.instances.iter() {
        if !design.modules.contains(instance.module) {
            return Err(GraphError::UnknownModule {
                module: interner.resolve(module.name).to_string(),
                instance: interner.resolve(instance.name).to_string(),
                target: instance.module.as_raw(),
            });
        }
        let callee = design.modules.get(instance.module);
        let want_inputs = callee.input_ports().count();
        let want_outputs = callee.output_ports().count();
        if instance.inputs.len() != want_inputs {
            return Err(GraphError::PortArityMismatch {
                instance: interner.resolve(instance.name).to_string(),
                callee: interner.resolve(callee.name).to_string(),
                direction: "input",
                got: instance.inputs.len(),
                want: want_inputs,
            });
        }
        if instance.outputs.len() != want_outputs {
            return Err(GraphError::PortArityMismatch {
                instance: interner.resolve(instance.name).to_string(),
                callee: interner.resolve(callee.name).to_string(),
                direction: "output",
                got: instance.outputs.len(),
                want: want_outputs,
            });
        }
    }
    Ok(())
}

fn collect_stmt_instances(stmt: &Statement, out: &mut HashSet<InstanceId>) {
    match stmt {
        Statement::Nop => {}
        Statement::Assign { value, .. } => value.collect_instances(out),
        Statement::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            condition.collect_instances(out);
            collect_stmt_instances(then_body, out);
            if let Some(e) = else_body {
                collect_stmt_instances(e, out);
            }
        }
        Statement::Case {
            subject,
            arms,
            default,
            ..
        } => {
            subject.collect_instances(out);
            for arm in arms {
                collect_stmt_instances(&arm.body, out);
            }
            if let Some(d) = default {
                collect_stmt_instances(d, out);
            }
        }
        Statement::Loop { body, .. } => collect_stmt_instances(body, out),
        Statement::Block { stmts, .. } => {
            for s in stmts {
                collect_stmt_instances(s, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_ir::{
        Arena, Assignment, Expr, Instance, InstanceId, Module, ModuleId, Port, PortDirection,
        PortId, Signal, SignalKind, SignalRef, TypeDb, TypeId,
    };
    use halcyon_source::Span;

    fn mk_leaf(interner: &Interner, id: u32) -> Module {
        let mut m = Module::new(
            ModuleId::from_raw(id),
            interner.get_or_intern("leaf"),
            Span::DUMMY,
        );
        let a = m.signals.alloc(Signal {
            id: SignalId::from_raw(0),
            name: interner.get_or_intern("a"),
            ty: TypeId::from_raw(0),
            kind: SignalKind::Wire,
            init: None,
            span: Span::DUMMY,
        });
        let y = m.signals.alloc(Signal {
            id: SignalId::from_raw(1),
            name: interner.get_or_intern("y"),
            ty: TypeId::from_raw(0),
            kind: SignalKind::Wire,
            init: None,
            span: Span::DUMMY,
        });
        m.ports.push(Port {
            id: PortId::from_raw(0),
            name: interner.get_or_intern("a"),
            direction: PortDirection::Input,
            ty: TypeId::from_raw(0),
            signal: a,
            span: Span::DUMMY,
        });
        m.ports.push(Port {
            id: PortId::from_raw(1),
            name: interner.get_or_intern("y"),
            direction: PortDirection::Output,
            ty: TypeId::from_raw(0),
            signal: y,
            span: Span::DUMMY,
        });
        m
    }

    fn mk_design(interner: &Interner) -> Design {
        let mut modules = Arena::new();
        modules.alloc(mk_leaf(interner, 0));
        Design {
            modules,
            top: ModuleId::from_raw(0),
            types: TypeDb::new(),
        }
    }

    #[test]
    fn well_formed_design_passes() {
        let interner = Interner::new();
        let design = mk_design(&interner);
        assert!(validate_design(&design, &interner).is_ok());
    }

    #[test]
    fn undeclared_signal_rejected() {
        let interner = Interner::new();
        let mut design = mk_design(&interner);
        design
            .modules
            .get_mut(ModuleId::from_raw(0))
            .assignments
            .push(Assignment {
                target: SignalRef::Signal(SignalId::from_raw(1)),
                value: Expr::signal(SignalId::from_raw(99)),
                span: Span::DUMMY,
            });
        assert!(matches!(
            validate_design(&design, &interner),
            Err(GraphError::UndeclaredSignal { signal: 99, .. })
        ));
    }

    #[test]
    fn undeclared_instance_ref_rejected() {
        let interner = Interner::new();
        let mut design = mk_design(&interner);
        design
            .modules
            .get_mut(ModuleId::from_raw(0))
            .assignments
            .push(Assignment {
                target: SignalRef::Signal(SignalId::from_raw(1)),
                value: Expr::InstanceOutput {
                    instance: InstanceId::from_raw(5),
                    port: 0,
                    span: Span::DUMMY,
                },
                span: Span::DUMMY,
            });
        assert!(matches!(
            validate_design(&design, &interner),
            Err(GraphError::UndeclaredInstance { instance: 5, .. })
        ));
    }

    #[test]
    fn unknown_module_rejected() {
        let interner = Interner::new();
        let mut design = mk_design(&interner);
        let top = design.modules.get_mut(ModuleId::from_raw(0));
        top.instances.alloc(Instance {
            id: InstanceId::from_raw(0),
            name: interner.get_or_intern("u0"),
            module: ModuleId::from_raw(42),
            inputs: vec![],
            outputs: vec![],
            span: Span::DUMMY,
        });
        assert!(matches!(
            validate_design(&design, &interner),
            Err(GraphError::UnknownModule { target: 42, .. })
        ));
    }

    #[test]
    fn arity_mismatch_rejected() {
        let interner = Interner::new();
        let mut design = mk_design(&interner);
        let callee = design.modules.alloc(mk_leaf(&interner, 1));
        let top = design.modules.get_mut(ModuleId::from_raw(0));
        // The callee declares one input and one output; bind neither.
        top.instances.alloc(Instance {
            id: InstanceId::from_raw(0),
            name: interner.get_or_intern("u0"),
            module: callee,
            inputs: vec![],
            outputs: vec![None],
            span: Span::DUMMY,
        });
        assert!(matches!(
            validate_design(&design, &interner),
            Err(GraphError::PortArityMismatch {
                direction: "input",
                got: 0,
                want: 1,
                ..
            })
        ));
    }
}
