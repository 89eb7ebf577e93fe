//! Check configuration.

use serde::{Deserialize, Serialize};

/// Compilation-level switches, threaded as an explicit value through the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Infer effective clauses for unconstrained callables and use them
    /// for propagation and advisory display.
    pub infer: bool,
    /// Report conformance violations as warnings instead of errors.
    pub warn_only: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self { infer: true, warn_only: false }
    }
}
