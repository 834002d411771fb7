//! The Halcyon intermediate representation.
//!
//! This crate defines the module/signal/process data model every pass reads
//! and writes: a [`Design`] of [`Module`]s, each owning its [`Signal`]s,
//! [`Process`] blocks, continuous [`Assignment`]s, and submodule
//! [`Instance`]s. The IR is constructed once by the external parsing
//! collaborator and then flows through the optimizer by value; expressions
//! are immutable trees, and folding always builds new ones.

#![warn(missing_docs)]

pub mod arena;
pub mod design;
pub mod expr;
pub mod ids;
pub mod instance;
pub mod module;
pub mod port;
pub mod pretty;
pub mod process;
pub mod signal;
pub mod stmt;
pub mod types;

pub use arena::{Arena, ArenaId};
pub use design::Design;
pub use expr::{expr_width, BinaryOp, Expr, UnaryOp};
pub use ids::{InstanceId, ModuleId, PortId, ProcessId, SignalId, TypeId};
pub use instance::Instance;
pub use module::{Assignment, Module};
pub use port::{Port, PortDirection};
pub use process::{Edge, EdgeSensitivity, Process, ProcessKind, Sensitivity};
pub use signal::{Signal, SignalKind, SignalRef};
pub use stmt::{AssignKind, CaseArm, CasePattern, Statement};
pub use types::{Type, TypeDb};
