//! Shared foundational types for the Halcyon logic optimizer.
//!
//! This crate provides interned identifiers, 4-state logic values, packed
//! logic vectors, content hashing, and the common result type used by every
//! pass in the pipeline.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod logic;
pub mod logic_vec;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use result::{HalcyonResult, InternalError};
