//! The top-level design container.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use crate::types::TypeDb;
use serde::{Deserialize, Serialize};

/// A complete design: every module definition plus the shared type table.
///
/// This is what the parsing collaborator hands the optimizer and what each
/// pass consumes and produces. Passes take the design by value and return a
/// new one; nothing holds references across pass boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// All module definitions, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
    /// The root of the instance hierarchy.
    pub top: ModuleId,
    /// Shared interned types.
    pub types: TypeDb,
}

impl Design {
    /// Borrows the top-level module.
    pub fn top_module(&self) -> &Module {
        self.modules.get(self.top)
    }

    /// Number of module definitions.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_common::Ident;
    use halcyon_source::Span;

    fn mk_design() -> Design {
        let mut modules = Arena::new();
        let top = modules.alloc(Module::new(
            ModuleId::from_raw(0),
            Ident::from_raw(0),
            Span::DUMMY,
        ));
        Design {
            modules,
            top,
            types: TypeDb::new(),
        }
    }

    #[test]
    fn top_module_access() {
        let design = mk_design();
        assert_eq!(design.module_count(), 1);
        assert_eq!(design.top_module().id.as_raw(), 0);
    }

    #[test]
    fn serde_roundtrip() {
        let design = mk_design();
        let json = serde_json::to_string(&design).unwrap();
        let back: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(back.module_count(), 1);
        assert_eq!(back.top, design.top);
    }
}
