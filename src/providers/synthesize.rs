// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Merge a dispatch result map into one user-facing report.

use std::collections::HashMap;
use std::str::FromStr;

use super::types::{InvocationResult, ProviderKind};

/// Message returned when no provider produced a usable answer.
pub const ALL_FAILED_MESSAGE: &str =
    "All provider calls failed; no answer is available for this request.";

/// Static hint appended when two or more agents answered.
const RECONCILE_HINT: &str = "Multiple agents responded. Review where they agree and \
     where they differ before acting on any single suggestion.";

/// Merge provider results into one textual report.
///
/// No success: an explicit all-failed message. Exactly one success: that
/// output verbatim, with no wrapping. Two or more: one labeled section per
/// provider, ordered by the fixed provider priority list rather than map
/// iteration order, followed by a reconcile hint.
pub fn synthesize(results: &HashMap<String, InvocationResult>) -> String {
    let mut successes: Vec<&InvocationResult> =
        results.values().filter(|r| r.success).collect();

    match successes.len() {
        0 => ALL_FAILED_MESSAGE.to_string(),
        1 => successes[0].output.clone(),
        _ => {
            successes.sort_by_key(|r| priority_of(&r.provider));

            let mut report = String::new();
            for result in &successes {
                report.push_str(&format!("## {} response\n\n", result.provider));
                report.push_str(result.output.trim_end());
                report.push_str("\n\n");
            }
            report.push_str(RECONCILE_HINT);
            report
        }
    }
}

/// Priority of a provider name in rendered output. Unknown names sort after
/// the known agents, alphabetically, so the report stays deterministic.
fn priority_of(name: &str) -> (usize, String) {
    match ProviderKind::from_str(name) {
        Ok(kind) => (kind.priority(), String::new()),
        Err(_) => (ProviderKind::ALL.len(), name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn success(provider: &str, output: &str) -> InvocationResult {
        InvocationResult::success(provider, output.to_string(), Duration::from_millis(10))
    }

    fn failure(provider: &str) -> InvocationResult {
        InvocationResult::failure(provider, "boom", Duration::from_millis(10))
    }

    #[test]
    fn test_empty_map_is_all_failed() {
        let results = HashMap::new();
        assert_eq!(synthesize(&results), ALL_FAILED_MESSAGE);
    }

    #[test]
    fn test_all_failures_is_all_failed() {
        let mut results = HashMap::new();
        results.insert("claude".to_string(), failure("claude"));
        results.insert("gemini".to_string(), failure("gemini"));
        assert_eq!(synthesize(&results), ALL_FAILED_MESSAGE);
    }

    #[test]
    fn test_single_success_passes_through_verbatim() {
        let mut results = HashMap::new();
        results.insert("gemini".to_string(), success("gemini", "the answer"));
        results.insert("claude".to_string(), failure("claude"));
        assert_eq!(synthesize(&results), "the answer");
    }

    #[test]
    fn test_multiple_successes_are_labeled_and_ordered() {
        let mut results = HashMap::new();
        // Insert out of priority order on purpose.
        results.insert("gemini".to_string(), success("gemini", "auditor view"));
        results.insert("claude".to_string(), success("claude", "builder view"));

        let report = synthesize(&results);
        assert!(report.contains("## claude response"));
        assert!(report.contains("## gemini response"));
        assert!(report.contains("builder view"));
        assert!(report.contains("auditor view"));
        // claude renders before gemini regardless of map order.
        assert!(report.find("claude").unwrap() < report.find("gemini").unwrap());
        assert!(report.contains("Review where they agree"));
    }

    #[test]
    fn test_unknown_provider_sorts_last_deterministically() {
        let mut results = HashMap::new();
        results.insert("zeta".to_string(), success("zeta", "z"));
        results.insert("gemini".to_string(), success("gemini", "g"));

        let report = synthesize(&results);
        assert!(report.find("gemini").unwrap() < report.find("zeta").unwrap());
    }
}
