// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! The resolved configuration is a fully concrete struct; every field has a
//! serde default, so a partial `vigil.json` merges over the defaults simply
//! by deserializing. `validate` then clamps out-of-range values back to
//! their defaults and reports what it changed.

use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Resolved configuration for a Vigil run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VigilConfig {
    /// Config schema version, written on init for forward compatibility.
    pub version: String,

    /// Per-agent settings, one table per known provider.
    pub agents: AgentsConfig,

    /// Self-heal retry settings for the auditor chain.
    pub fallback: FallbackConfig,

    /// Fan-out behavior for multi-agent calls.
    pub dispatch: DispatchConfig,

    /// Console and report output settings.
    pub output: OutputConfig,
}

/// One table per provider; keys match the provider names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentsConfig {
    pub claude: AgentConfig,
    pub gemini: AgentConfig,
    pub antigravity: AgentConfig,
}

/// Settings for a single external agent CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Whether this agent participates in dispatch at all.
    pub enabled: bool,

    /// Binary name or path used to spawn the agent.
    pub command: String,

    /// Retry budget reserved for future per-agent retry policies.
    pub max_retries: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: String::new(),
            max_retries: 3,
        }
    }
}

/// Fallback (self-heal) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FallbackConfig {
    /// Whether the auditor retry chain runs when the primary path fails.
    pub enabled: bool,

    /// Retry ceiling; validated to lie in [1, 5].
    pub max_self_heal_attempts: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_self_heal_attempts: 3,
        }
    }
}

/// Fan-out settings for multi-agent calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchConfig {
    /// Run eligible agents concurrently; `false` means primary-then-fallback.
    pub parallel: bool,

    /// Wall-clock budget per agent call, in seconds.
    pub timeout_secs: u64,

    /// Whether the optional tertiary agent joins parallel dispatch.
    pub include_optional: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            timeout_secs: crate::providers::DEFAULT_TIMEOUT_SECS,
            include_optional: false,
        }
    }
}

/// Console and report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    /// Print progress and per-agent status lines.
    pub verbose: bool,

    /// Write a markdown report file per operation.
    pub save_reports: bool,

    /// Directory for report files, relative to the project root.
    pub report_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            save_reports: true,
            report_dir: ".vigil/reports".to_string(),
        }
    }
}

impl Default for VigilConfig {
    fn default() -> Self {
        let mut agents = AgentsConfig::default();
        agents.claude.command = ProviderKind::Claude.binary().to_string();
        agents.gemini.command = ProviderKind::Gemini.binary().to_string();
        agents.antigravity.command = ProviderKind::Antigravity.binary().to_string();

        Self {
            version: crate::VERSION.to_string(),
            agents,
            fallback: FallbackConfig::default(),
            dispatch: DispatchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl VigilConfig {
    /// Settings table for one provider kind.
    pub fn agent(&self, kind: ProviderKind) -> &AgentConfig {
        match kind {
            ProviderKind::Claude => &self.agents.claude,
            ProviderKind::Gemini => &self.agents.gemini,
            ProviderKind::Antigravity => &self.agents.antigravity,
        }
    }

    fn agent_mut(&mut self, kind: ProviderKind) -> &mut AgentConfig {
        match kind {
            ProviderKind::Claude => &mut self.agents.claude,
            ProviderKind::Gemini => &mut self.agents.gemini,
            ProviderKind::Antigravity => &mut self.agents.antigravity,
        }
    }

    /// Clamp out-of-range values back to their defaults.
    ///
    /// Returns one field-scoped message per adjustment; an empty vec means
    /// the configuration was already valid.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let defaults = FallbackConfig::default();

        if !(1..=crate::providers::MAX_SELF_HEAL_CEILING)
            .contains(&self.fallback.max_self_heal_attempts)
        {
            warnings.push(format!(
                "fallback.maxSelfHealAttempts: {} is out of range [1, {}], using {}",
                self.fallback.max_self_heal_attempts,
                crate::providers::MAX_SELF_HEAL_CEILING,
                defaults.max_self_heal_attempts
            ));
            self.fallback.max_self_heal_attempts = defaults.max_self_heal_attempts;
        }

        if self.dispatch.timeout_secs == 0 {
            warnings.push(format!(
                "dispatch.timeoutSecs: 0 is not a usable budget, using {}",
                crate::providers::DEFAULT_TIMEOUT_SECS
            ));
            self.dispatch.timeout_secs = crate::providers::DEFAULT_TIMEOUT_SECS;
        }

        if self.output.report_dir.trim().is_empty() {
            let default_dir = OutputConfig::default().report_dir;
            warnings.push(format!(
                "output.reportDir: empty path, using {}",
                default_dir
            ));
            self.output.report_dir = default_dir;
        }

        for kind in ProviderKind::ALL {
            let agent = self.agent_mut(kind);
            if agent.command.trim().is_empty() {
                warnings.push(format!(
                    "agents.{}.command: empty command, using {}",
                    kind,
                    kind.binary()
                ));
                agent.command = kind.binary().to_string();
            }
        }

        warnings
    }
}
