// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Provider identity, invocation shapes, and call statistics.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// The external agent CLIs Vigil knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Primary builder agent (`claude --print <prompt>`).
    Claude,
    /// Auditor / fallback agent (`gemini -p <prompt>`).
    Gemini,
    /// Optional runner agent (`antigravity run`, no prompt argument).
    Antigravity,
}

impl ProviderKind {
    /// All kinds, in the fixed priority order used for synthesized reports.
    pub const ALL: [ProviderKind; 3] = [Self::Claude, Self::Gemini, Self::Antigravity];

    /// Default binary name on the host.
    pub fn binary(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Antigravity => "antigravity",
        }
    }

    /// Position in the deterministic report ordering (lower renders first).
    pub fn priority(&self) -> usize {
        match self {
            Self::Claude => 0,
            Self::Gemini => 1,
            Self::Antigravity => 2,
        }
    }

    /// Role this agent plays in the cross-check flow.
    pub fn role(&self) -> ProviderRole {
        match self {
            Self::Claude => ProviderRole::Primary,
            Self::Gemini => ProviderRole::Auditor,
            Self::Antigravity => ProviderRole::Optional,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.binary())
    }
}

/// Error type for parsing a provider kind from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseProviderKindError;

impl std::fmt::Display for ParseProviderKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid provider kind")
    }
}

impl std::error::Error for ParseProviderKindError {}

impl std::str::FromStr for ProviderKind {
    type Err = ParseProviderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            "antigravity" => Ok(Self::Antigravity),
            _ => Err(ParseProviderKindError),
        }
    }
}

/// Role tag for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRole {
    /// First choice for every prompt.
    Primary,
    /// Cross-check reviewer, also the fallback target.
    Auditor,
    /// Only dispatched when the caller opts in.
    Optional,
}

/// One external text-generation agent, immutable after the startup probe.
#[derive(Debug, Clone)]
pub struct Provider {
    pub kind: ProviderKind,
    /// Binary name or path used to spawn the agent.
    pub command: String,
    /// Enabled in configuration.
    pub enabled: bool,
    /// Binary resolvable on the host, probed once at startup.
    pub available: bool,
    pub role: ProviderRole,
}

impl Provider {
    /// Probe a provider: resolve availability by scanning `PATH` once.
    pub fn probe(kind: ProviderKind, command: &str, enabled: bool) -> Self {
        Self {
            kind,
            command: command.to_string(),
            enabled,
            available: binary_on_path(command),
            role: kind.role(),
        }
    }

    /// Provider name used as the result-map key.
    pub fn name(&self) -> &'static str {
        self.kind.binary()
    }

    /// Whether this provider should take part in a dispatch. Disabled or
    /// unavailable providers are omitted from the result map, not failed.
    pub fn is_eligible(&self, include_optional: bool) -> bool {
        self.enabled
            && self.available
            && (self.role != ProviderRole::Optional || include_optional)
    }

    /// Build the fixed invocation arguments for this provider. Each agent
    /// has a different shape; none of them are configurable per-call.
    pub fn build_args(&self, prompt: &str) -> Vec<String> {
        match self.kind {
            ProviderKind::Claude => vec!["--print".to_string(), prompt.to_string()],
            ProviderKind::Gemini => vec!["-p".to_string(), prompt.to_string()],
            ProviderKind::Antigravity => vec!["run".to_string()],
        }
    }
}

/// Check whether a binary is resolvable via `PATH`.
pub fn binary_on_path(name: &str) -> bool {
    // Absolute or relative paths bypass the PATH scan.
    if name.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(name).is_file();
    }
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(name).is_file())
}

/// The outcome of one provider call. Produced once, never mutated.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// Provider name.
    pub provider: String,
    /// Exit code 0 and no spawn/timeout failure.
    pub success: bool,
    /// Combined stdout + stderr, or the failure message.
    pub output: String,
    /// Wall-clock duration of the call.
    pub elapsed: Duration,
}

impl InvocationResult {
    pub fn success(provider: &str, output: String, elapsed: Duration) -> Self {
        Self {
            provider: provider.to_string(),
            success: true,
            output,
            elapsed,
        }
    }

    pub fn failure(provider: &str, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            provider: provider.to_string(),
            success: false,
            output: message.into(),
            elapsed,
        }
    }
}

/// Aggregate call and token statistics for one process run.
///
/// Updated only by the dispatcher's single collecting task, so no
/// synchronization is required.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Successful call count per provider name.
    pub calls: HashMap<String, u32>,
    /// Rough estimate of tokens pushed through the agents.
    pub total_tokens_used: u64,
    /// When this run started.
    pub started: Instant,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            calls: HashMap::new(),
            total_tokens_used: 0,
            started: Instant::now(),
        }
    }

    /// Record one successful call.
    pub fn record(&mut self, provider: &str, tokens: u64) {
        *self.calls.entry(provider.to_string()).or_insert(0) += 1;
        self.total_tokens_used += tokens;
    }

    /// Successful calls for one provider.
    pub fn calls_for(&self, provider: &str) -> u32 {
        self.calls.get(provider).copied().unwrap_or(0)
    }

    /// Time elapsed since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
