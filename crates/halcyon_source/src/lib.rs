//! Source locations carried by IR nodes and diagnostics.
//!
//! The parsing collaborator assigns a [`FileId`] per input file and a
//! byte-offset [`Span`] per construct; the optimizer only threads them
//! through so diagnostics can point back at the original description.

#![warn(missing_docs)]

pub mod file_id;
pub mod span;

pub use file_id::FileId;
pub use span::Span;
