//! Developer tooling: a read-only session inspector and scripted key
//! timelines for headless runs.
//!
//! # Invariants
//! - Inspection never mutates the session.

pub mod inspector;
pub mod script;

pub use inspector::{PlayerInfo, SessionInspector, SessionSummary};
pub use script::{KeyScript, ScriptError, ScriptedKey};

pub fn crate_info() -> &'static str {
    "folio-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
