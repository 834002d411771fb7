//! Arena rebuilds shared by the passes.
//!
//! Arenas are append-only, so a pass that deletes processes or instances
//! rebuilds the arena with the survivors and remaps the IDs embedded in
//! expressions. Callers must guarantee that no surviving expression
//! references a dropped instance; both passes arrange that before calling
//! in here (constant propagation substitutes the references with literals,
//! dead-logic elimination deletes the referencing constructs first).

use halcyon_ir::{Arena, Expr, InstanceId, Module, ProcessId};
use std::collections::HashMap;

/// Drops instances not matched by `keep`, compacting IDs and remapping
/// every `InstanceOutput` reference. Returns `true` if anything changed.
pub(crate) fn retain_instances(module: &mut Module, keep: impl Fn(InstanceId) -> bool) -> bool {
    if module.instances.ids().all(&keep) {
        return false;
    }

    let mut map: HashMap<InstanceId, InstanceId> = HashMap::new();
    let mut rebuilt = Arena::new();
    for (old_id, instance) in module.instances.iter() {
        if keep(old_id) {
            let mut survivor = instance.clone();
            survivor.id = InstanceId::from_raw(rebuilt.len() as u32);
            map.insert(old_id, survivor.id);
            rebuilt.alloc(survivor);
        }
    }
    module.instances = rebuilt;

    let remap = |e: &Expr| match e {
        Expr::InstanceOutput {
            instance,
            port,
            span,
        } => map.get(instance).map(|new_id| Expr::InstanceOutput {
            instance: *new_id,
            port: *port,
            span: *span,
        }),
        _ => None,
    };
    for assign in &mut module.assignments {
        assign.value = assign.value.rewrite(&remap);
    }
    for (_pid, process) in module.processes.iter_mut() {
        process.body = process.body.rewrite(&remap, &|_| None);
    }
    let mut rewritten_inputs: Vec<(InstanceId, Vec<Expr>)> = Vec::new();
    for (iid, instance) in module.instances.iter() {
        rewritten_inputs.push((iid, instance.inputs.iter().map(|i| i.rewrite(&remap)).collect()));
    }
    for (iid, inputs) in rewritten_inputs {
        module.instances.get_mut(iid).inputs = inputs;
    }
    true
}

/// Drops processes not matched by `keep`, compacting IDs.
/// Returns `true` if anything changed.
pub(crate) fn retain_processes(module: &mut Module, keep: impl Fn(ProcessId) -> bool) -> bool {
    if module.processes.ids().all(&keep) {
        return false;
    }
    let mut rebuilt = Arena::new();
    for (old_id, process) in module.processes.iter() {
        if keep(old_id) {
            let mut survivor = process.clone();
            survivor.id = ProcessId::from_raw(rebuilt.len() as u32);
            rebuilt.alloc(survivor);
        }
    }
    module.processes = rebuilt;
    true
}
