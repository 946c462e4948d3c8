// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Parallel fan-out of one prompt to every eligible provider.
//!
//! Each eligible provider gets its own task with its own timeout; a slow or
//! failing agent never delays or cancels its siblings. Results are folded
//! into the map by a single collecting loop, which is also the only place
//! the shared call/token statistics are touched, so no locking is needed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::session::estimate_tokens;

use super::gateway;
use super::types::{InvocationResult, Provider, SessionStats};

/// Upper bound on concurrently running agent subprocesses.
pub const MAX_CONCURRENT_PROVIDERS: usize = 3;

/// Dispatch a prompt to every enabled-and-available provider concurrently.
///
/// Providers that are disabled in configuration or unavailable on the host
/// are omitted from the result map entirely, not reported as failures.
/// Returns once every scheduled task has resolved or timed out; total wall
/// time is bounded by the largest per-task timeout plus scheduling overhead.
pub async fn dispatch(
    prompt: &str,
    providers: &[Provider],
    include_optional: bool,
    timeout: Duration,
    stats: &mut SessionStats,
) -> HashMap<String, InvocationResult> {
    let eligible: Vec<Provider> = providers
        .iter()
        .filter(|p| p.is_eligible(include_optional))
        .cloned()
        .collect();

    let mut results = HashMap::new();
    if eligible.is_empty() {
        warn!("no eligible providers for dispatch");
        return results;
    }

    info!(
        providers = eligible.len(),
        "dispatching prompt to {} agent(s)",
        eligible.len()
    );

    let pool = Arc::new(Semaphore::new(MAX_CONCURRENT_PROVIDERS.min(eligible.len())));
    let mut tasks = JoinSet::new();

    for provider in eligible {
        let prompt = prompt.to_string();
        let pool = Arc::clone(&pool);
        tasks.spawn(async move {
            // Closed only when the JoinSet is dropped, which cannot happen
            // while this task is still being awaited.
            let _permit = pool.acquire_owned().await.expect("pool never closed");
            gateway::invoke(&provider, &prompt, timeout).await
        });
    }

    // Single collecting loop: fold each completed task into the map and the
    // shared statistics. A panicking task is recorded as nothing at all
    // (the gateway itself never panics; this guards the join seam).
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => {
                if result.success {
                    stats.record(
                        &result.provider,
                        estimate_tokens(prompt) + estimate_tokens(&result.output),
                    );
                }
                results.insert(result.provider.clone(), result);
            }
            Err(e) => warn!("dispatch task failed to join: {}", e),
        }
    }

    results
}
