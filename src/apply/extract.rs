// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Extract file-change proposals from free-form agent responses.
//!
//! Two textual conventions are recognized:
//!
//! 1. A fenced block whose opening fence carries a file-path hint,
//!    optionally prefixed by a language tag and colon
//!    (```` ```rust:src/lib.rs ````).
//! 2. A `[File: <path>]` header followed by a fenced block.
//!
//! A candidate becomes a proposal only when the named path already exists,
//! so the extractor yields `modify` proposals exclusively. Agents routinely
//! hallucinate paths; refusing to create files from prose keeps a bad
//! response from scattering junk through the tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::types::{CodeChange, ExtractOutcome};

/// Fenced block with an arbitrary hint on the opening fence.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```([^\n`]*)\n(.*?)^```").expect("fenced block pattern")
});

/// `[File: <path>]` header, with the following text searched for one block.
static FILE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[File:\s*([^\]]+)\]").expect("file header pattern"));

/// Fence hints that are language tags rather than paths.
const BARE_LANGUAGE_TAGS: &[&str] = &[
    "bash", "c", "cpp", "css", "diff", "go", "html", "java", "javascript", "js", "json",
    "jsx", "kotlin", "markdown", "md", "python", "rust", "sh", "shell", "sql", "swift",
    "text", "toml", "ts", "tsx", "typescript", "xml", "yaml", "yml",
];

/// Extract accepted change proposals from a response.
///
/// Both conventions are merged with path-based deduplication: the first
/// occurrence for a given path wins, in parse order.
pub fn extract(response: &str, project_root: &Path) -> Vec<CodeChange> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut changes = Vec::new();

    for outcome in scan(response, project_root) {
        match outcome {
            ExtractOutcome::Matched(change) => {
                if seen.insert(change.path.clone()) {
                    changes.push(change);
                }
            }
            ExtractOutcome::RejectedNoise { hint } => {
                debug!(hint, "fence hint is not a path");
            }
            ExtractOutcome::RejectedPathMissing { path } => {
                debug!(path = %path.display(), "proposal names a missing path");
            }
        }
    }

    changes
}

/// Classify every candidate in a response, without deduplication.
pub fn scan(response: &str, project_root: &Path) -> Vec<ExtractOutcome> {
    let mut outcomes = Vec::new();

    for captures in FENCED_BLOCK.captures_iter(response) {
        let hint = captures[1].trim();
        let content = captures[2].trim();
        outcomes.push(classify_hint(hint, content, project_root, "fenced path hint"));
    }

    for captures in FILE_HEADER.captures_iter(response) {
        let path_hint = captures[1].trim();
        let rest = &response[captures.get(0).map(|m| m.end()).unwrap_or(0)..];
        if let Some(block) = FENCED_BLOCK.captures(rest) {
            let content = block[2].trim();
            outcomes.push(classify_path(
                path_hint,
                content,
                project_root,
                "[File: ...] header",
            ));
        }
    }

    outcomes
}

/// Interpret a raw fence hint: strip an optional `lang:` prefix, then treat
/// the remainder as a path candidate.
fn classify_hint(
    hint: &str,
    content: &str,
    project_root: &Path,
    description: &str,
) -> ExtractOutcome {
    let candidate = match hint.split_once(':') {
        Some((_, path)) => path.trim(),
        None => hint,
    };

    if candidate.is_empty() || is_bare_language(candidate) {
        return ExtractOutcome::RejectedNoise {
            hint: hint.to_string(),
        };
    }

    classify_path(candidate, content, project_root, description)
}

fn classify_path(
    candidate: &str,
    content: &str,
    project_root: &Path,
    description: &str,
) -> ExtractOutcome {
    let path = PathBuf::from(candidate);
    let resolved = if path.is_absolute() {
        path.clone()
    } else {
        project_root.join(&path)
    };

    if !resolved.exists() {
        return ExtractOutcome::RejectedPathMissing { path };
    }

    ExtractOutcome::Matched(CodeChange::modify(path, content.to_string(), description))
}

fn is_bare_language(candidate: &str) -> bool {
    let lowered = candidate.to_ascii_lowercase();
    BARE_LANGUAGE_TAGS.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::types::ChangeKind;

    fn root_with(files: &[&str]) -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        for file in files {
            let path = temp.path().join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, "original").unwrap();
        }
        temp
    }

    #[test]
    fn test_fenced_path_hint_yields_modify() {
        let temp = root_with(&["src/main.rs"]);
        let response = "Here is the fix:\n```src/main.rs\nfn main() {}\n```\n";

        let changes = extract(response, temp.path());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, PathBuf::from("src/main.rs"));
        assert_eq!(changes[0].kind, ChangeKind::Modify);
        assert_eq!(changes[0].content, "fn main() {}");
    }

    #[test]
    fn test_language_prefix_is_stripped() {
        let temp = root_with(&["src/lib.rs"]);
        let response = "```rust:src/lib.rs\npub fn f() {}\n```\n";

        let changes = extract(response, temp.path());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, PathBuf::from("src/lib.rs"));
    }

    #[test]
    fn test_bare_language_hint_is_noise() {
        let temp = root_with(&[]);
        let response = "```rust\nfn main() {}\n```\n```\nplain\n```\n";

        assert!(extract(response, temp.path()).is_empty());
        let outcomes = scan(response, temp.path());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, ExtractOutcome::RejectedNoise { .. })));
    }

    #[test]
    fn test_missing_path_is_rejected_never_create() {
        let temp = root_with(&[]);
        let response = "```src/brand_new.rs\nfn main() {}\n```\n";

        assert!(extract(response, temp.path()).is_empty());
        let outcomes = scan(response, temp.path());
        assert!(matches!(
            outcomes[0],
            ExtractOutcome::RejectedPathMissing { .. }
        ));
    }

    #[test]
    fn test_file_header_convention() {
        let temp = root_with(&["config.toml"]);
        let response = "[File: config.toml]\nUpdated settings:\n```toml\nkey = 1\n```\n";

        let changes = extract(response, temp.path());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, PathBuf::from("config.toml"));
        assert_eq!(changes[0].content, "key = 1");
    }

    #[test]
    fn test_first_occurrence_wins_per_path() {
        let temp = root_with(&["a.rs"]);
        let response = "```a.rs\nfirst\n```\n\n```a.rs\nsecond\n```\n";

        let changes = extract(response, temp.path());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].content, "first");
    }

    #[test]
    fn test_both_conventions_deduplicate_across_each_other() {
        let temp = root_with(&["a.rs", "b.rs"]);
        let response = "```a.rs\nfenced a\n```\n[File: a.rs]\n```\nheader a\n```\n[File: b.rs]\n```\nheader b\n```\n";

        let changes = extract(response, temp.path());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].content, "fenced a");
        assert_eq!(changes[1].content, "header b");
    }

    #[test]
    fn test_content_is_trimmed() {
        let temp = root_with(&["a.rs"]);
        let response = "```a.rs\n\n  body line  \n\n```\n";

        let changes = extract(response, temp.path());
        assert_eq!(changes[0].content, "body line");
    }

    #[test]
    fn test_plain_prose_extracts_nothing() {
        let temp = root_with(&["a.rs"]);
        assert!(extract("No code here, just advice about a.rs.", temp.path()).is_empty());
    }
}
