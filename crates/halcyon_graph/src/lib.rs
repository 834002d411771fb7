//! Signal-level dependency graphs and structural validation.
//!
//! The builder derives a directed graph per module (signal and instance
//! nodes, edges from every expression's reads to its assignment's target)
//! and enforces the structural invariants the rest of the pipeline assumes:
//! no combinational wire loops, at most one unconditional driver per wire,
//! an acyclic instance hierarchy, and no dangling references. All four are
//! fail-fast: the optimizer rejects rather than guesses.

#![warn(missing_docs)]

mod classify;
mod depgraph;
mod error;
mod hierarchy;
mod validate;

pub use classify::{classify_processes, infer_process_kind};
pub use depgraph::{DepGraph, DepNode};
pub use error::GraphError;
pub use hierarchy::hierarchy_order;
pub use validate::validate_design;
