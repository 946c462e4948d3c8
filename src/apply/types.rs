// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Change proposal types shared by the extractor and the applicator.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What to do with the file a proposal names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Write a new file; the path must not already exist.
    Create,
    /// Overwrite an existing file; backed up first.
    Modify,
    /// Remove an existing file; backed up first.
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One proposed file change extracted from an agent response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeChange {
    /// Path as written in the response, resolved against the project root.
    pub path: PathBuf,
    pub kind: ChangeKind,
    /// New file content; empty for deletes.
    pub content: String,
    /// Short human-readable origin note, e.g. which convention matched.
    pub description: String,
}

impl CodeChange {
    pub fn modify(path: impl Into<PathBuf>, content: String, description: &str) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Modify,
            content,
            description: description.to_string(),
        }
    }
}

/// Classification of one fenced-block candidate found in a response.
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    /// Candidate accepted as a change proposal.
    Matched(CodeChange),
    /// Fence hint was empty or a bare language tag, not a path.
    RejectedNoise { hint: String },
    /// Hint looked like a path but nothing exists there.
    RejectedPathMissing { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kind_display() {
        assert_eq!(ChangeKind::Create.to_string(), "create");
        assert_eq!(ChangeKind::Modify.to_string(), "modify");
        assert_eq!(ChangeKind::Delete.to_string(), "delete");
    }

    #[test]
    fn test_change_kind_serde_lowercase() {
        let json = serde_json::to_string(&ChangeKind::Modify).unwrap();
        assert_eq!(json, "\"modify\"");
        let back: ChangeKind = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(back, ChangeKind::Delete);
    }
}
