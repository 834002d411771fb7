//! Instance-hierarchy DAG enforcement.

use crate::error::GraphError;
use halcyon_common::Interner;
use halcyon_ir::{Design, ModuleId};

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Checks that the instance hierarchy is a DAG and returns the modules in
/// dependency order (instantiated modules before their instantiators).
///
/// The traversal is iterative over the module arena with an explicit stack
/// and visited marks; a module found on its own instantiation path is a
/// fatal [`GraphError::HierarchyCycle`].
pub fn hierarchy_order(
    design: &Design,
    interner: &Interner,
) -> Result<Vec<ModuleId>, GraphError> {
    let count = design.modules.len();
    let mut marks = vec![Mark::Unvisited; count];
    let mut order = Vec::with_capacity(count);

    for start in design.modules.ids() {
        if marks[start.as_raw() as usize] != Mark::Unvisited {
            continue;
        }
        let mut stack: Vec<(ModuleId, Vec<ModuleId>, usize)> =
            vec![(start, children_of(design, start), 0)];
        marks[start.as_raw() as usize] = Mark::OnPath;

        loop {
            let Some(frame) = stack.last_mut() else { break };
            if frame.2 < frame.1.len() {
                let child = frame.1[frame.2];
                frame.2 += 1;
                match marks[child.as_raw() as usize] {
                    Mark::Unvisited => {
                        marks[child.as_raw() as usize] = Mark::OnPath;
                        let grandchildren = children_of(design, child);
                        stack.push((child, grandchildren, 0));
                    }
                    Mark::OnPath => {
                        return Err(GraphError::HierarchyCycle {
                            path: render_cycle(design, interner, &stack, child),
                        });
                    }
                    Mark::Done => {}
                }
            } else {
                let module = frame.0;
                marks[module.as_raw() as usize] = Mark::Done;
                order.push(module);
                stack.pop();
            }
        }
    }
    Ok(order)
}

/// Distinct instantiated modules, in instance definition order.
fn children_of(design: &Design, module: ModuleId) -> Vec<ModuleId> {
    let mut out = Vec::new();
    for (_iid, instance) in design.modules.get(module).instances.iter() {
        if !out.contains(&instance.module) {
            out.push(instance.module);
        }
    }
    out
}

fn render_cycle(
    design: &Design,
    interner: &Interner,
    stack: &[(ModuleId, Vec<ModuleId>, usize)],
    repeat: ModuleId,
) -> String {
    let from = stack
        .iter()
        .position(|(m, _, _)| *m == repeat)
        .unwrap_or(0);
    let mut names: Vec<&str> = stack[from..]
        .iter()
        .map(|(m, _, _)| interner.resolve(design.modules.get(*m).name))
        .collect();
    names.push(interner.resolve(design.modules.get(repeat).name));
    names.join(" -> ")
}
