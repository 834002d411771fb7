//! Fatal structural errors raised before and during graph construction.

/// A structural invariant violation in the incoming IR.
///
/// All variants are fatal: the pipeline stops at the offending pass and no
/// optimized netlist is emitted. Signal and module names are resolved to
/// text at construction time so the errors read without an interner.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A cycle of wires with no sequential element on it.
    #[error("combinational loop in module '{module}': {cycle}")]
    CombinationalLoop {
        /// Module containing the loop.
        module: String,
        /// The cycle's signal names, in order, first repeated last.
        cycle: String,
    },

    /// More than one unconditional driver on one wire.
    #[error("wire '{signal}' in module '{module}' has {count} unconditional drivers")]
    MultipleDriverConflict {
        /// Module containing the wire.
        module: String,
        /// The conflicted wire.
        signal: String,
        /// How many drivers were found.
        count: usize,
    },

    /// The instance hierarchy is not a DAG.
    #[error("module instantiation cycle: {path}")]
    HierarchyCycle {
        /// The offending instantiation path, first module repeated last.
        path: String,
    },

    /// An expression or binding references a signal the module never declared.
    #[error("module '{module}' references undeclared signal id {signal}")]
    UndeclaredSignal {
        /// The referencing module.
        module: String,
        /// Raw ID of the missing signal.
        signal: u32,
    },

    /// An expression reads an output of an instance the module never
    /// declared.
    #[error("module '{module}' references undeclared instance id {instance}")]
    UndeclaredInstance {
        /// The referencing module.
        module: String,
        /// Raw ID of the missing instance.
        instance: u32,
    },

    /// An instance references a module id absent from the design.
    #[error("instance '{instance}' in module '{module}' references unknown module id {target}")]
    UnknownModule {
        /// The referencing module.
        module: String,
        /// The offending instance.
        instance: String,
        /// Raw ID of the missing module.
        target: u32,
    },

    /// An instance's bindings do not match the callee's port counts.
    #[error(
        "instance '{instance}' binds {got} {direction} port(s), '{callee}' declares {want}"
    )]
    PortArityMismatch {
        /// The offending instance.
        instance: String,
        /// The instantiated module.
        callee: String,
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// Bindings supplied.
        got: usize,
        /// Ports declared.
        want: usize,
    },
}
