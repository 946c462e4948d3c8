// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bounded sequential retry against the auditor provider.
//!
//! Used only when the primary path produced no usable result. The retry
//! ceiling is an explicit loop counter, never call-stack depth, and is
//! validated by configuration to lie in [1, 5].

use std::time::Duration;

use tracing::{info, warn};

use super::gateway;
use super::types::Provider;

/// Hard cap on the configured attempt ceiling.
pub const MAX_SELF_HEAL_CEILING: u32 = 5;

/// Message returned when every attempt has been spent.
pub const EXHAUSTED_MESSAGE: &str = "Maximum self-heal attempts exceeded";

/// Retry the secondary provider up to `max_attempts` times.
///
/// Returns on the first success; a success on attempt `k` stops further
/// attempts. Exhaustion returns `(false, EXHAUSTED_MESSAGE)`.
pub async fn fallback(
    prompt: &str,
    secondary: &Provider,
    max_attempts: u32,
    timeout: Duration,
) -> (bool, String) {
    // Configuration already clamps this; guard anyway so the loop bound
    // holds no matter what the caller passes.
    let max_attempts = max_attempts.clamp(1, MAX_SELF_HEAL_CEILING);

    for attempt in 1..=max_attempts {
        warn!(
            attempt,
            max_attempts,
            provider = secondary.name(),
            "fallback mode active"
        );

        let result = gateway::invoke(secondary, prompt, timeout).await;
        if result.success {
            info!(attempt, "fallback succeeded");
            return (true, result.output);
        }
    }

    warn!(max_attempts, "all self-heal attempts exhausted");
    (false, EXHAUSTED_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ProviderKind;
    use std::os::unix::fs::PermissionsExt;

    fn shell_provider(command: &str) -> Provider {
        Provider {
            kind: ProviderKind::Gemini,
            command: command.to_string(),
            enabled: true,
            available: true,
            role: ProviderKind::Gemini.role(),
        }
    }

    /// Script that counts its invocations into a file and fails until the
    /// count reaches the given threshold.
    fn counting_script(dir: &std::path::Path, succeed_on: u32) -> std::path::PathBuf {
        let counter = dir.join("count");
        let script = dir.join("flaky-agent");
        let body = format!(
            "#!/bin/sh\nn=$(cat {c} 2>/dev/null || echo 0)\nn=$((n+1))\necho $n > {c}\nif [ $n -ge {t} ]; then echo recovered; exit 0; fi\nexit 1\n",
            c = counter.display(),
            t = succeed_on
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn read_count(dir: &std::path::Path) -> u32 {
        std::fs::read_to_string(dir.join("count"))
            .unwrap_or_default()
            .trim()
            .parse()
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_success_stops_further_attempts() {
        let temp = tempfile::tempdir().unwrap();
        let script = counting_script(temp.path(), 2);
        let provider = shell_provider(&script.to_string_lossy());

        let (success, output) =
            fallback("prompt", &provider, 5, Duration::from_secs(10)).await;

        assert!(success);
        assert!(output.contains("recovered"));
        // Succeeded on attempt 2; attempts 3..=5 never ran.
        assert_eq!(read_count(temp.path()), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_issues_exactly_max_attempts() {
        let temp = tempfile::tempdir().unwrap();
        let script = counting_script(temp.path(), 100); // never succeeds
        let provider = shell_provider(&script.to_string_lossy());

        let (success, output) =
            fallback("prompt", &provider, 3, Duration::from_secs(10)).await;

        assert!(!success);
        assert_eq!(output, EXHAUSTED_MESSAGE);
        assert_eq!(read_count(temp.path()), 3);
    }

    #[tokio::test]
    async fn test_ceiling_clamped() {
        let temp = tempfile::tempdir().unwrap();
        let script = counting_script(temp.path(), 100);
        let provider = shell_provider(&script.to_string_lossy());

        let (success, _) = fallback("prompt", &provider, 50, Duration::from_secs(10)).await;

        assert!(!success);
        assert_eq!(read_count(temp.path()), MAX_SELF_HEAL_CEILING);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let provider = shell_provider("true");
        let (success, _) = fallback("prompt", &provider, 0, Duration::from_secs(10)).await;
        assert!(success);
    }
}
