//! Constant propagation.
//!
//! A monotone fixpoint over the set "signals known constant": literal
//! continuous drivers seed the environment, combinational process outputs
//! join it through abstract interpretation of their bodies, and instances
//! whose inputs all fold are specialized by recursively propagating inside
//! the callee. Once the environment stops growing, the module is rewritten:
//! constant reads become literals, operators over literals fold, ternaries
//! and branches with decided conditions collapse, and fully-constant
//! instances are replaced by direct constant assignments to their outputs.

use crate::const_eval::{eval_expr, truthiness, EvalCtx};
use crate::rewrite::retain_instances;
use crate::{OptPass, PassCx, PassError};
use halcyon_common::LogicVec;
use halcyon_ir::{
    Assignment, Design, Expr, InstanceId, Module, ModuleId, Process, ProcessKind, SignalId,
    SignalRef, Statement,
};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

/// Loop bodies are unrolled up to this many iterations during abstract
/// interpretation; beyond it every written signal is treated as varying.
const LOOP_UNROLL_CAP: u32 = 1024;

pub(crate) struct ConstPropPass;

impl OptPass for ConstPropPass {
    fn run(&self, cx: &PassCx<'_>, module: &mut Module) -> Result<bool, PassError> {
        let depth = cx.design.module_count();
        let env = compute_const_env(cx.design, module, HashMap::new(), depth);
        let changed = Cell::new(false);

        substitute_module(cx.design, module, &env, &changed);

        if !env.folded_instances.is_empty() {
            changed.set(true);
            // The instance drove these signals; it is gone, so direct
            // constant assignments take over as their single drivers.
            for &iid in &env.folded_instances {
                let instance = module.instances.get(iid);
                let span = instance.span;
                let outputs: Vec<(SignalId, LogicVec)> = instance
                    .outputs
                    .iter()
                    .enumerate()
                    .filter_map(|(k, out)| {
                        out.map(|sig| (sig, env.instance_outputs[&(iid, k as u32)].clone()))
                    })
                    .collect();
                for (sig, value) in outputs {
                    let width = cx
                        .design
                        .types
                        .bit_width(module.signals.get(sig).ty)
                        .unwrap_or(value.width());
                    module.assignments.push(Assignment {
                        target: SignalRef::Signal(sig),
                        value: Expr::Literal(value.resize(width)),
                        span,
                    });
                }
            }
            let folded: HashSet<InstanceId> = env.folded_instances.iter().copied().collect();
            retain_instances(module, |id| !folded.contains(&id));
        }

        Ok(changed.get())
    }
}

/// The result of the environment fixpoint.
pub(crate) struct ConstEnv {
    /// Signals proven constant, resized to their declared widths.
    pub signals: HashMap<SignalId, LogicVec>,
    /// Output values of specialized instances.
    pub instance_outputs: HashMap<(InstanceId, u32), LogicVec>,
    /// Instances whose outputs all folded, in definition order.
    pub folded_instances: Vec<InstanceId>,
}

/// Grows the constant environment to fixpoint.
///
/// Every sweep may only add signals; a signal is never revisited after
/// becoming constant, and a sweep that adds nothing terminates the loop,
/// so the engine finishes in O(signals × assignments).
pub(crate) fn compute_const_env(
    design: &Design,
    module: &Module,
    seed: HashMap<SignalId, LogicVec>,
    depth: usize,
) -> ConstEnv {
    let mut signals = seed;
    let mut instance_outputs: HashMap<(InstanceId, u32), LogicVec> = HashMap::new();
    let mut folded_instances: Vec<InstanceId> = Vec::new();

    loop {
        let mut grew = false;

        for assign in &module.assignments {
            if !assign.target.is_full() {
                continue;
            }
            let target = assign.target.signal();
            if signals.contains_key(&target) {
                continue;
            }
            let folded = eval_expr(
                &assign.value,
                EvalCtx::new(&signals, &instance_outputs),
                design,
                module,
            );
            if let Some(value) = folded {
                let width = design
                    .types
                    .bit_width(module.signals.get(target).ty)
                    .unwrap_or(value.width());
                signals.insert(target, value.resize(width));
                grew = true;
            }
        }

        for (_pid, process) in module.processes.iter() {
            for (sig, value) in process_const_outputs(process, &signals, &instance_outputs, design, module)
            {
                if let std::collections::hash_map::Entry::Vacant(entry) = signals.entry(sig) {
                    let width = design
                        .types
                        .bit_width(module.signals.get(sig).ty)
                        .unwrap_or(value.width());
                    entry.insert(value.resize(width));
                    grew = true;
                }
            }
        }

        for (iid, instance) in module.instances.iter() {
            if depth == 0 || folded_instances.contains(&iid) {
                continue;
            }
            let inputs: Option<Vec<LogicVec>> = instance
                .inputs
                .iter()
                .map(|input| {
                    eval_expr(
                        input,
                        EvalCtx::new(&signals, &instance_outputs),
                        design,
                        module,
                    )
                })
                .collect();
            let Some(input_values) = inputs else { continue };
            let Some(output_values) =
                eval_instance_outputs(design, instance.module, input_values, depth - 1)
            else {
                continue;
            };
            for (k, value) in output_values.iter().enumerate() {
                instance_outputs.insert((iid, k as u32), value.clone());
            }
            for (k, out) in instance.outputs.iter().enumerate() {
                if let Some(sig) = out {
                    if !signals.contains_key(sig) {
                        let width = design
                            .types
                            .bit_width(module.signals.get(*sig).ty)
                            .unwrap_or(output_values[k].width());
                        signals.insert(*sig, output_values[k].resize(width));
                    }
                }
            }
            folded_instances.push(iid);
            grew = true;
        }

        if !grew {
            break;
        }
    }

    ConstEnv {
        signals,
        instance_outputs,
        folded_instances,
    }
}

/// Specializes one instantiation: propagates constants inside the callee
/// with its input ports pinned, and reports the callee's output port
/// values if all of them fold.
fn eval_instance_outputs(
    design: &Design,
    callee_id: ModuleId,
    input_values: Vec<LogicVec>,
    depth: usize,
) -> Option<Vec<LogicVec>> {
    let callee = design.modules.get(callee_id);
    let mut seed = HashMap::new();
    for (port, value) in callee.input_ports().zip(input_values) {
        let width = design.types.bit_width(port.ty).unwrap_or(value.width());
        seed.insert(port.signal, value.resize(width));
    }
    let env = compute_const_env(design, callee, seed, depth);
    callee
        .output_ports()
        .map(|port| env.signals.get(&port.signal).cloned())
        .collect()
}

/// Abstract value of a signal during process interpretation.
///
/// `known` holds signals currently proven equal to a literal; `varying`
/// holds signals assigned something non-constant. A signal in neither map
/// is untouched external state. Non-blocking writes land in the `next_*`
/// planes so later reads in the same evaluation still observe the
/// pre-evaluation value.
#[derive(Clone, Default)]
struct AbsState {
    known: HashMap<SignalId, LogicVec>,
    varying: HashSet<SignalId>,
    next_known: HashMap<SignalId, LogicVec>,
    next_varying: HashSet<SignalId>,
}

impl AbsState {
    fn assign(&mut self, target: &SignalRef, value: Option<LogicVec>, blocking: bool) {
        let sig = target.signal();
        let full_value = match (&value, target) {
            (Some(v), SignalRef::Signal(_)) => Some(v.clone()),
            (Some(v), SignalRef::Slice { high, low, .. }) => {
                // A partial update folds only over a known base value.
                let base = if blocking {
                    self.known.get(&sig)
                } else {
                    self.next_known.get(&sig)
                };
                base.filter(|b| *high < b.width() && low <= high).map(|b| {
                    let mut updated = b.clone();
                    for i in *low..=*high {
                        updated.set(i, v.get((i - low).min(v.width() - 1)));
                    }
                    updated
                })
            }
            (None, _) => None,
        };
        let (known, varying) = if blocking {
            (&mut self.known, &mut self.varying)
        } else {
            (&mut self.next_known, &mut self.next_varying)
        };
        match full_value {
            Some(v) => {
                known.insert(sig, v);
                varying.remove(&sig);
            }
            None => {
                known.remove(&sig);
                varying.insert(sig);
            }
        }
    }

    fn merge(a: AbsState, b: AbsState) -> AbsState {
        fn merge_planes(
            ak: HashMap<SignalId, LogicVec>,
            av: HashSet<SignalId>,
            bk: &HashMap<SignalId, LogicVec>,
            bv: &HashSet<SignalId>,
        ) -> (HashMap<SignalId, LogicVec>, HashSet<SignalId>) {
            let mut keys: HashSet<SignalId> = ak.keys().copied().collect();
            keys.extend(bk.keys().copied());
            keys.extend(av.iter().copied());
            keys.extend(bv.iter().copied());
            let mut known = HashMap::new();
            let mut varying = HashSet::new();
            for key in keys {
                match (ak.get(&key), bk.get(&key)) {
                    (Some(x), Some(y)) if x == y => {
                        known.insert(key, x.clone());
                    }
                    _ => {
                        varying.insert(key);
                    }
                }
            }
            (known, varying)
        }
        let (known, varying) = merge_planes(a.known, a.varying, &b.known, &b.varying);
        let (next_known, next_varying) =
            merge_planes(a.next_known, a.next_varying, &b.next_known, &b.next_varying);
        AbsState {
            known,
            varying,
            next_known,
            next_varying,
        }
    }
}

/// Constant outputs of a combinational process under the current
/// environment: abstract interpretation of the body with branch merging.
/// Sequential processes never contribute (their outputs carry state).
fn process_const_outputs(
    process: &Process,
    signals: &HashMap<SignalId, LogicVec>,
    instance_outputs: &HashMap<(InstanceId, u32), LogicVec>,
    design: &Design,
    module: &Module,
) -> Vec<(SignalId, LogicVec)> {
    if process.kind != ProcessKind::Combinational {
        return Vec::new();
    }
    let mut state = AbsState {
        known: signals.clone(),
        ..AbsState::default()
    };
    exec(&process.body, &mut state, instance_outputs, design, module);

    let mut written = HashSet::new();
    process.body.collect_written_signals(&mut written);
    let mut outputs: Vec<SignalId> = written.into_iter().collect();
    outputs.sort_by_key(|s| s.as_raw());

    outputs
        .into_iter()
        .filter_map(|sig| {
            if state.next_varying.contains(&sig) || state.varying.contains(&sig) {
                return None;
            }
            state
                .next_known
                .get(&sig)
                .or_else(|| state.known.get(&sig))
                .map(|v| (sig, v.clone()))
        })
        .collect()
}

fn exec(
    stmt: &Statement,
    state: &mut AbsState,
    instance_outputs: &HashMap<(InstanceId, u32), LogicVec>,
    design: &Design,
    module: &Module,
) {
    match stmt {
        Statement::Nop => {}
        Statement::Assign {
            target,
            value,
            kind,
            ..
        } => {
            let folded = eval_expr(
                value,
                EvalCtx::new(&state.known, instance_outputs),
                design,
                module,
            );
            state.assign(target, folded, *kind == halcyon_ir::AssignKind::Blocking);
        }
        Statement::Block { stmts, .. } => {
            for s in stmts {
                exec(s, state, instance_outputs, design, module);
            }
        }
        Statement::Loop {
            trip_count, body, ..
        } => {
            if *trip_count > LOOP_UNROLL_CAP {
                let mut written = HashSet::new();
                body.collect_written_signals(&mut written);
                for sig in written {
                    state.known.remove(&sig);
                    state.varying.insert(sig);
                }
            } else {
                for _ in 0..*trip_count {
                    exec(body, state, instance_outputs, design, module);
                }
            }
        }
        Statement::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            let cond = eval_expr(
                condition,
                EvalCtx::new(&state.known, instance_outputs),
                design,
                module,
            );
            match cond.as_ref().and_then(truthiness) {
                Some(true) => exec(then_body, state, instance_outputs, design, module),
                Some(false) => {
                    if let Some(e) = else_body {
                        exec(e, state, instance_outputs, design, module);
                    }
                }
                None => {
                    let mut taken = state.clone();
                    exec(then_body, &mut taken, instance_outputs, design, module);
                    let mut skipped = state.clone();
                    if let Some(e) = else_body {
                        exec(e, &mut skipped, instance_outputs, design, module);
                    }
                    *state = AbsState::merge(taken, skipped);
                }
            }
        }
        Statement::Case {
            subject,
            arms,
            default,
            ..
        } => {
            let selector = eval_expr(
                subject,
                EvalCtx::new(&state.known, instance_outputs),
                design,
                module,
            );
            match selector.filter(|v| !v.has_unknown()) {
                Some(value) => {
                    // First match wins; no match and no default holds the
                    // previous value, which the latch analyzer reports.
                    let arm = arms
                        .iter()
                        .find(|arm| arm.patterns.iter().any(|p| p.matches(&value)));
                    match (arm, default) {
                        (Some(arm), _) => {
                            exec(&arm.body, state, instance_outputs, design, module)
                        }
                        (None, Some(d)) => exec(d, state, instance_outputs, design, module),
                        (None, None) => {}
                    }
                }
                None => {
                    let mut merged: Option<AbsState> = None;
                    let mut consider = |branch_state: AbsState| {
                        merged = Some(match merged.take() {
                            Some(acc) => AbsState::merge(acc, branch_state),
                            None => branch_state,
                        });
                    };
                    for arm in arms {
                        let mut branch = state.clone();
                        exec(&arm.body, &mut branch, instance_outputs, design, module);
                        consider(branch);
                    }
                    match default {
                        Some(d) => {
                            let mut branch = state.clone();
                            exec(d, &mut branch, instance_outputs, design, module);
                            consider(branch);
                        }
                        None => consider(state.clone()),
                    }
                    if let Some(result) = merged {
                        *state = result;
                    }
                }
            }
        }
    }
}

/// Rewrites the module under the computed environment: constant reads and
/// foldable operators become literals, decided ternaries take their
/// branch, and decided If/Case statements collapse structurally.
fn substitute_module(design: &Design, module: &mut Module, env: &ConstEnv, changed: &Cell<bool>) {
    // Continuous assignment values and instance inputs see the full
    // environment.
    let new_values: Vec<Expr> = {
        let subst = make_subst(design, module, &env.signals, &env.instance_outputs, changed);
        module
            .assignments
            .iter()
            .map(|a| a.value.rewrite(&subst))
            .collect()
    };
    for (assign, value) in module.assignments.iter_mut().zip(new_values) {
        assign.value = value;
    }

    let new_inputs: Vec<(InstanceId, Vec<Expr>)> = {
        let subst = make_subst(design, module, &env.signals, &env.instance_outputs, changed);
        module
            .instances
            .iter()
            .map(|(iid, inst)| (iid, inst.inputs.iter().map(|i| i.rewrite(&subst)).collect()))
            .collect()
    };
    for (iid, inputs) in new_inputs {
        module.instances.get_mut(iid).inputs = inputs;
    }

    // Process bodies: a process's own outputs are excluded from its
    // substitution environment so a read of a locally computed variable is
    // never replaced behind the process's back.
    let new_bodies: Vec<(halcyon_ir::ProcessId, Statement)> = {
        let mut bodies = Vec::new();
        for (pid, process) in module.processes.iter() {
            let mut written = HashSet::new();
            process.body.collect_written_signals(&mut written);
            let local: HashMap<SignalId, LogicVec> = env
                .signals
                .iter()
                .filter(|(sig, _)| !written.contains(sig))
                .map(|(sig, v)| (*sig, v.clone()))
                .collect();
            let subst = make_subst(design, module, &local, &env.instance_outputs, changed);
            let rewritten = process.body.rewrite(&subst, &|_| None);
            bodies.push((pid, simplify_stmt(&rewritten, changed)));
        }
        bodies
    };
    for (pid, body) in new_bodies {
        module.processes.get_mut(pid).body = body;
    }
}

fn make_subst<'a>(
    design: &'a Design,
    module: &'a Module,
    signals: &'a HashMap<SignalId, LogicVec>,
    instance_outputs: &'a HashMap<(InstanceId, u32), LogicVec>,
    changed: &'a Cell<bool>,
) -> impl Fn(&Expr) -> Option<Expr> + 'a {
    move |expr: &Expr| {
        if matches!(expr, Expr::Literal(_)) {
            return None;
        }
        let ctx = EvalCtx::new(signals, instance_outputs);
        if let Expr::Binary { op, lhs, rhs, .. } = expr {
            if let Some(folded) = identity_fold(*op, lhs, rhs, design, module) {
                changed.set(true);
                return Some(folded);
            }
        }
        // A decided select folds to its taken branch even when that branch
        // is not itself constant.
        if let Expr::Ternary {
            condition,
            true_val,
            false_val,
            ..
        } = expr
        {
            if let Some(cond) = eval_expr(condition, ctx, design, module) {
                if let Some(taken) = truthiness(&cond) {
                    changed.set(true);
                    return Some(if taken {
                        (**true_val).clone()
                    } else {
                        (**false_val).clone()
                    });
                }
            }
        }
        match eval_expr(expr, ctx, design, module) {
            Some(value) => {
                changed.set(true);
                Some(Expr::Literal(value))
            }
            None => None,
        }
    }
}

/// Absorbing/neutral element folds over one literal operand.
///
/// Truth-table exact even through X/Z: a driven 0 dominates AND, a driven
/// 1 dominates OR, and the neutral element leaves every 4-state value of
/// the other operand unchanged. Requires matching widths; two-literal
/// operands are left for the full evaluator.
fn identity_fold(
    op: halcyon_ir::BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    design: &Design,
    module: &Module,
) -> Option<Expr> {
    use halcyon_ir::BinaryOp;
    let (lit, other) = match (lhs, rhs) {
        (Expr::Literal(v), o) | (o, Expr::Literal(v)) => (v, o),
        _ => return None,
    };
    if matches!(other, Expr::Literal(_)) {
        return None;
    }
    if halcyon_ir::expr_width(other, design, module) != Some(lit.width()) {
        return None;
    }
    match op {
        BinaryOp::And if lit.is_all_zero() => Some(Expr::Literal(lit.clone())),
        BinaryOp::And if lit.is_all_one() => Some(other.clone()),
        BinaryOp::Or if lit.is_all_one() => Some(Expr::Literal(lit.clone())),
        BinaryOp::Or if lit.is_all_zero() => Some(other.clone()),
        BinaryOp::Xor if lit.is_all_zero() => Some(other.clone()),
        _ => None,
    }
}

/// Structural collapse of statements whose conditions became literals.
fn simplify_stmt(stmt: &Statement, changed: &Cell<bool>) -> Statement {
    match stmt {
        Statement::Assign { .. } | Statement::Nop => stmt.clone(),
        Statement::Block { stmts, span } => Statement::Block {
            stmts: stmts.iter().map(|s| simplify_stmt(s, changed)).collect(),
            span: *span,
        },
        Statement::Loop {
            trip_count,
            body,
            span,
        } => Statement::Loop {
            trip_count: *trip_count,
            body: Box::new(simplify_stmt(body, changed)),
            span: *span,
        },
        Statement::If {
            condition,
            then_body,
            else_body,
            span,
        } => {
            if let Expr::Literal(v) = condition {
                if let Some(taken) = truthiness(v) {
                    changed.set(true);
                    return if taken {
                        simplify_stmt(then_body, changed)
                    } else {
                        match else_body {
                            Some(e) => simplify_stmt(e, changed),
                            None => Statement::Nop,
                        }
                    };
                }
            }
            Statement::If {
                condition: condition.clone(),
                then_body: Box::new(simplify_stmt(then_body, changed)),
                else_body: else_body
                    .as_ref()
                    .map(|e| Box::new(simplify_stmt(e, changed))),
                span: *span,
            }
        }
        Statement::Case {
            subject,
            arms,
            default,
            span,
        } => {
            if let Expr::Literal(v) = subject {
                if !v.has_unknown() {
                    let taken = arms
                        .iter()
                        .find(|arm| arm.patterns.iter().any(|p| p.matches(v)));
                    match (taken, default) {
                        (Some(arm), _) => {
                            changed.set(true);
                            return simplify_stmt(&arm.body, changed);
                        }
                        (None, Some(d)) => {
                            changed.set(true);
                            return simplify_stmt(d, changed);
                        }
                        // No match, no default: value held; kept intact
                        // for the latch analyzer to report.
                        (None, None) => {}
                    }
                }
            }
            Statement::Case {
                subject: subject.clone(),
                arms: arms
                    .iter()
                    .map(|arm| halcyon_ir::CaseArm {
                        patterns: arm.patterns.clone(),
                        body: simplify_stmt(&arm.body, changed),
                        span: arm.span,
                    })
                    .collect(),
                default: default
                    .as_ref()
                    .map(|d| Box::new(simplify_stmt(d, changed))),
                span: *span,
            }
        }
    }
}
