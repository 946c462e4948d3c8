// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Subprocess gateway for external agent CLIs.
//!
//! This is the failure-isolation seam every caller relies on: `invoke`
//! never returns an error. Timeouts, spawn failures, and non-zero exits
//! all come back as a failed [`InvocationResult`].

use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, warn};

use super::types::{InvocationResult, Provider};

/// Default wall-clock budget for one agent call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Invoke one provider with a hard wall-clock timeout.
///
/// Success means the process exited with code 0; the output is stdout and
/// stderr concatenated. A timed-out child is killed rather than orphaned
/// (`kill_on_drop`), so a stuck agent cannot accumulate across retries.
pub async fn invoke(provider: &Provider, prompt: &str, timeout: Duration) -> InvocationResult {
    let name = provider.name();
    let start = Instant::now();

    if !provider.available {
        return InvocationResult::failure(
            name,
            format!("{} CLI not available", name),
            start.elapsed(),
        );
    }

    debug!(provider = name, timeout_secs = timeout.as_secs(), "invoking agent");

    let mut command = Command::new(&provider.command);
    command
        .args(provider.build_args(prompt))
        .current_dir(std::env::current_dir().unwrap_or_else(|_| ".".into()))
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!(provider = name, "spawn failed: {}", e);
            return InvocationResult::failure(name, e.to_string(), start.elapsed());
        }
        Err(_) => {
            warn!(provider = name, "call timed out after {}s", timeout.as_secs());
            return InvocationResult::failure(name, "Command timed out", start.elapsed());
        }
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    let elapsed = start.elapsed();
    if output.status.success() {
        debug!(provider = name, elapsed_ms = elapsed.as_millis() as u64, "agent succeeded");
        InvocationResult::success(name, combined, elapsed)
    } else {
        warn!(provider = name, code = ?output.status.code(), "agent exited non-zero");
        InvocationResult::failure(name, combined, elapsed)
    }
}
