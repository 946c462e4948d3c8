// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Session types for conversation persistence.

use serde::{Deserialize, Serialize};

use super::tokens::estimate_tokens;

/// Maximum entries kept in a session's context window.
pub const MAX_CONTEXT_HISTORY: usize = 50;

/// Maximum cumulative estimated tokens kept in the window.
pub const MAX_CONTEXT_TOKENS: u64 = 8_000;

/// Sessions older than this are rejected on load.
pub const SESSION_EXPIRY_HOURS: i64 = 24;

/// Session identifier (opaque, time-derived).
pub type SessionId = String;

/// Role of a context entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// One conversation turn stored in a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Turn role.
    pub role: Role,
    /// Turn content text.
    pub content: String,
    /// Creation timestamp (Unix epoch seconds).
    pub timestamp: i64,
    /// Command that produced this turn (analyze, refactor, ...).
    pub command: String,
    /// Precomputed token estimate for the content.
    pub tokens: u64,
}

impl ContextEntry {
    /// Create a new entry with a freshly computed token estimate.
    pub fn new(role: Role, content: impl Into<String>, command: impl Into<String>) -> Self {
        let content = content.into();
        let tokens = estimate_tokens(&content);
        Self {
            role,
            content,
            timestamp: chrono::Utc::now().timestamp(),
            command: command.into(),
            tokens,
        }
    }
}

/// Session metadata persisted alongside the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Unique session identifier.
    pub id: SessionId,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: i64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: i64,
    /// Detected project type tag.
    pub project_type: String,
    /// Project directory the session belongs to.
    pub project_dir: String,
    /// Running count of commands executed in this session.
    pub total_commands: u32,
}

/// A durable, token-budgeted multi-turn conversation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub metadata: SessionMetadata,
    /// Free-form summary of the project (filled by callers, may be empty).
    pub project_summary: String,
    /// Ordered history, oldest first.
    pub context_history: Vec<ContextEntry>,
}

impl Session {
    /// Create a new session with a fresh time-derived identifier.
    pub fn new(project_type: impl Into<String>, project_dir: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            metadata: SessionMetadata {
                id: Self::generate_id(),
                created_at: now,
                updated_at: now,
                project_type: project_type.into(),
                project_dir: project_dir.into(),
                total_commands: 0,
            },
            project_summary: String::new(),
            context_history: Vec::new(),
        }
    }

    /// Generate a unique session ID based on the current time.
    pub fn generate_id() -> SessionId {
        chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Update the session's updated_at timestamp.
    pub fn touch(&mut self) {
        self.metadata.updated_at = chrono::Utc::now().timestamp();
    }

    /// Check whether the session has outlived its TTL.
    pub fn is_expired(&self, now: i64) -> bool {
        now - self.metadata.created_at > SESSION_EXPIRY_HOURS * 3600
    }

    /// Append an entry, then evict from the head until the window fits the
    /// budget again. Eviction removes oldest-first only, and always keeps at
    /// least one entry even when that entry alone exceeds the token budget
    /// (dropping it would leave an empty window for the newest information).
    pub fn push_entry(&mut self, entry: ContextEntry) {
        if entry.role == Role::User {
            self.metadata.total_commands += 1;
        }
        self.context_history.push(entry);

        while self.context_history.len() > 1
            && (self.context_history.len() > MAX_CONTEXT_HISTORY
                || self.total_tokens() > MAX_CONTEXT_TOKENS)
        {
            self.context_history.remove(0);
        }

        self.touch();
    }

    /// Cumulative token estimate of the current window.
    pub fn total_tokens(&self) -> u64 {
        self.context_history.iter().map(|e| e.tokens).sum()
    }
}

/// Session metadata for listing, with the backing filename attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub metadata: SessionMetadata,
    /// Name of the session file on disk.
    pub filename: String,
    /// Number of entries in the window.
    pub entry_count: usize,
}

impl SessionSummary {
    /// Format the summary for display.
    pub fn format(&self) -> String {
        let date = chrono::DateTime::from_timestamp(self.metadata.updated_at, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "{} [{}] {} turns, {} commands - {}",
            self.metadata.id,
            self.metadata.project_type,
            self.entry_count,
            self.metadata.total_commands,
            date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new("python", "/path/to/project");
        assert_eq!(session.metadata.project_type, "python");
        assert_eq!(session.metadata.project_dir, "/path/to/project");
        assert_eq!(session.metadata.total_commands, 0);
        assert_eq!(session.metadata.created_at, session.metadata.updated_at);
        assert!(session.context_history.is_empty());
    }

    #[test]
    fn test_push_entry_counts_commands() {
        let mut session = Session::new("rust", "/p");
        session.push_entry(ContextEntry::new(Role::User, "question", "analyze"));
        session.push_entry(ContextEntry::new(Role::Assistant, "answer", "analyze"));
        assert_eq!(session.metadata.total_commands, 1);
        assert_eq!(session.context_history.len(), 2);
    }

    #[test]
    fn test_history_cap_evicts_from_head() {
        let mut session = Session::new("rust", "/p");
        for i in 0..(MAX_CONTEXT_HISTORY + 10) {
            session.push_entry(ContextEntry::new(Role::User, format!("turn {}", i), "analyze"));
        }
        assert_eq!(session.context_history.len(), MAX_CONTEXT_HISTORY);
        // The oldest entries were evicted; the newest survives at the tail.
        assert!(session.context_history[0].content.contains("turn 10"));
        assert!(session
            .context_history
            .last()
            .unwrap()
            .content
            .contains(&format!("turn {}", MAX_CONTEXT_HISTORY + 9)));
    }

    #[test]
    fn test_token_budget_enforced_after_every_append() {
        let big = "word ".repeat(2_000);
        let mut session = Session::new("rust", "/p");
        for _ in 0..10 {
            session.push_entry(ContextEntry::new(Role::Assistant, big.clone(), "refactor"));
            assert!(
                session.context_history.len() == 1
                    || session.total_tokens() <= MAX_CONTEXT_TOKENS
            );
        }
    }

    #[test]
    fn test_oversized_single_entry_is_kept() {
        let huge = "word ".repeat(50_000);
        let mut session = Session::new("rust", "/p");
        session.push_entry(ContextEntry::new(Role::Assistant, huge, "refactor"));
        assert_eq!(session.context_history.len(), 1);
        assert!(session.total_tokens() > MAX_CONTEXT_TOKENS);
    }

    #[test]
    fn test_expiry() {
        let mut session = Session::new("rust", "/p");
        let now = session.metadata.created_at;
        assert!(!session.is_expired(now + 3600));
        session.metadata.created_at = now - SESSION_EXPIRY_HOURS * 3600 - 1;
        assert!(session.is_expired(now));
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
