// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Vigil - AI cross-check orchestrator.
//!
//! Vigil drives multiple external AI agent CLIs against one codebase and
//! cross-checks their answers: a primary builder agent, an auditor agent
//! used for review and self-heal retries, and an optional tertiary runner.
//! Agents are opaque subprocesses; Vigil owns dispatch, fallback, merging,
//! session memory, and the careful application of proposed file changes.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`error`] - Error types and result aliases
//! - [`config`] - `vigil.json` loading, merging, and validation
//! - [`providers`] - Agent gateway, parallel dispatch, fallback, synthesis
//! - [`session`] - Session persistence and token-budgeted context windowing
//! - [`apply`] - Change extraction from agent responses and backup-first apply
//! - [`project`] - Project-type detection and source enumeration
//! - [`report`] - Per-operation markdown reports
//! - [`ops`] - The top-level command flows (analyze, refactor, recommend, plan)
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil::ops::{Engine, OpsOptions};
//!
//! let mut engine = Engine::new(std::env::current_dir()?, OpsOptions::default());
//! engine.analyze("where is the retry logic?").await?;
//! ```

pub mod apply;
pub mod config;
pub mod error;
pub mod ops;
pub mod project;
pub mod providers;
pub mod report;
pub mod session;

// Re-export commonly used types at crate root
pub use error::{ApplyError, ConfigError, ProviderError, Result, SessionError};
pub use providers::{
    dispatch, fallback, invoke, probe_providers, synthesize, InvocationResult, Provider,
    ProviderKind, SessionStats,
};
pub use session::{estimate_tokens, Role, Session, SessionStore};

/// Vigil version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_exports() {
        // Verify key types are accessible
        let _session = Session::new("rust", "/tmp");
        let _stats = SessionStats::new();
        assert_eq!(estimate_tokens(""), 0);
    }
}
