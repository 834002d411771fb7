//! Opaque ID newtypes for IR entities.
//!
//! Each ID wraps a `u32` arena index. IDs stay stable for the lifetime of
//! their arena; the emitter relies on that to reproduce first-definition
//! order.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Builds an ID from a raw index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// ID of a module definition in the design.
    ModuleId
);

define_id!(
    /// ID of a signal within its owning module.
    SignalId
);

define_id!(
    /// ID of a process block within its owning module.
    ProcessId
);

define_id!(
    /// ID of a submodule instance within its owning module.
    InstanceId
);

define_id!(
    /// ID of a port on a module interface.
    PortId
);

define_id!(
    /// ID of an interned type in the [`TypeDb`](crate::types::TypeDb).
    TypeId
);
