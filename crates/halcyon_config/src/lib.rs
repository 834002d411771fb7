//! Configuration for the Halcyon optimizer, loaded from `halcyon.toml`.
//!
//! The `[optimize]` table controls the pass pipeline (iteration cap,
//! flattening, pass toggles); the `[lint]` table controls analyzer
//! severities (deny/allow lists and strict mode).

#![warn(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{HalcyonConfig, LintConfig, OptConfig};
