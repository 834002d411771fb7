//! Rule registration and execution.

use std::collections::HashSet;

use halcyon_common::Interner;
use halcyon_config::LintConfig;
use halcyon_diagnostics::{DiagnosticSink, Severity};
use halcyon_ir::Design;

use crate::rules::register_builtin_rules;
use crate::LintRule;

/// Runs registered analyzer rules over every module of a design.
///
/// `allow` suppresses a rule entirely; `deny` (or strict mode, which denies
/// everything) promotes its findings to error severity. This is how a CI
/// pipeline turns hazard warnings into failures without the analyzers
/// knowing anything about policy.
pub struct LintEngine {
    rules: Vec<Box<dyn LintRule>>,
    denied: HashSet<String>,
    allowed: HashSet<String>,
    strict: bool,
}

impl LintEngine {
    /// Creates an engine with the builtin rules and the given policy.
    pub fn new(config: &LintConfig) -> Self {
        let mut engine = Self {
            rules: Vec::new(),
            denied: config.deny.iter().cloned().collect(),
            allowed: config.allow.iter().cloned().collect(),
            strict: config.strict,
        };
        register_builtin_rules(&mut engine);
        engine
    }

    /// Creates an engine with default policy (all warnings stay warnings).
    pub fn with_defaults() -> Self {
        Self::new(&LintConfig::default())
    }

    /// Registers an additional rule.
    pub fn register(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Names of all registered rules.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every enabled rule over every module.
    pub fn run(&self, design: &Design, interner: &Interner, sink: &DiagnosticSink) {
        for (_mid, module) in design.modules.iter() {
            for rule in &self.rules {
                if self.allowed.contains(rule.name()) {
                    continue;
                }
                let staging = DiagnosticSink::new();
                rule.check_module(module, design, interner, &staging);

                let promote = self.strict || self.denied.contains(rule.name());
                for mut diag in staging.take_all() {
                    if promote {
                        diag.severity = Severity::Error;
                    }
                    sink.emit(diag);
                }
            }
        }
    }
}
