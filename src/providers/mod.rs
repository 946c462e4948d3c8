// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! External agent providers and the orchestration primitives around them.
//!
//! Every provider is an opaque command-line program spawned as a subprocess:
//!
//! - `claude` — primary builder agent, invoked non-interactively with `--print`
//! - `gemini` — auditor and fallback agent, invoked with `-p`
//! - `antigravity` — optional runner, invoked with a bare `run` subcommand
//!
//! The layers, leaf-first:
//!
//! - [`gateway`] — one subprocess call with a hard timeout; never errors
//! - [`dispatch`] — concurrent fan-out with per-provider failure isolation
//! - [`fallback`] — bounded sequential retry against the auditor
//! - [`synthesize`] — merge a result map into one deterministic report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vigil::providers::{dispatch, probe_providers, synthesize, SessionStats};
//!
//! let providers = probe_providers(&config);
//! let mut stats = SessionStats::new();
//! let results = dispatch(&prompt, &providers, false, timeout, &mut stats).await;
//! println!("{}", synthesize(&results));
//! ```

pub mod dispatch;
pub mod fallback;
pub mod gateway;
pub mod synthesize;
pub mod types;

pub use dispatch::{dispatch, MAX_CONCURRENT_PROVIDERS};
pub use fallback::{fallback, EXHAUSTED_MESSAGE, MAX_SELF_HEAL_CEILING};
pub use gateway::{invoke, DEFAULT_TIMEOUT_SECS};
pub use synthesize::{synthesize, ALL_FAILED_MESSAGE};
pub use types::{
    binary_on_path, InvocationResult, Provider, ProviderKind, ProviderRole, SessionStats,
};

use crate::config::VigilConfig;

/// Probe every configured provider once at startup.
///
/// Availability is resolved here and never re-checked; the returned
/// providers are immutable for the rest of the run.
pub fn probe_providers(config: &VigilConfig) -> Vec<Provider> {
    ProviderKind::ALL
        .iter()
        .map(|&kind| {
            let agent = config.agent(kind);
            Provider::probe(kind, &agent.command, agent.enabled)
        })
        .collect()
}

/// Find the designated secondary (auditor) provider for the fallback chain.
pub fn secondary_provider(providers: &[Provider]) -> Option<&Provider> {
    providers
        .iter()
        .find(|p| p.role == ProviderRole::Auditor && p.enabled && p.available)
}
