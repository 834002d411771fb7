//! Built-in analyzer rules.

mod w301;
mod w302;
mod w303;
mod w304;

pub use w301::LatchInferred;
pub use w302::AmbiguousCaseOverlap;
pub use w303::SensitivityMismatch;
pub use w304::OrderDependentAssignment;

use crate::LintEngine;

/// Registers the four built-in rules W301–W304.
pub fn register_builtin_rules(engine: &mut LintEngine) {
    engine.register(Box::new(LatchInferred));
    engine.register(Box::new(AmbiguousCaseOverlap));
    engine.register(Box::new(SensitivityMismatch));
    engine.register(Box::new(OrderDependentAssignment));
}
