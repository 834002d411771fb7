//! Configuration types deserialized from `halcyon.toml`.

use serde::Deserialize;

/// Top-level configuration parsed from `halcyon.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct HalcyonConfig {
    /// Optimizer pipeline settings.
    #[serde(default)]
    pub optimize: OptConfig,
    /// Analyzer severity settings.
    #[serde(default)]
    pub lint: LintConfig,
}

/// Settings for the optimization pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct OptConfig {
    /// Upper bound on [constant-propagation ⇄ dead-logic] rounds before the
    /// pipeline fails with a non-convergence error.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Inline all submodule instances before the final optimization rounds.
    #[serde(default)]
    pub flatten: bool,
    /// Enable constant propagation.
    #[serde(default = "default_true")]
    pub const_prop: bool,
    /// Enable dead-logic elimination.
    #[serde(default = "default_true")]
    pub dead_logic: bool,
}

impl Default for OptConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            flatten: false,
            const_prop: true,
            dead_logic: true,
        }
    }
}

/// Settings for the hazard analyzers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LintConfig {
    /// Rule names promoted to error severity.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Rule names suppressed entirely.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Promote every analyzer warning to an error (CI mode). Equivalent to
    /// listing every rule in `deny`.
    #[serde(default)]
    pub strict: bool,
}

fn default_max_iterations() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}
