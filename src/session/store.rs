// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON-file session storage.
//!
//! One file per session under `.vigil/sessions/`, plus a `current` pointer
//! file holding the bare identifier of the active session. All writes are
//! synchronous; the store assumes a single instance per working directory
//! and provides no cross-process locking.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::SessionError;

use super::types::{ContextEntry, Role, Session, SessionId, SessionSummary};

/// Entries rendered into the context prefix (the window keeps more; the
/// prefix only shows the most recent turns).
const PREFIX_ENTRIES: usize = 5;

/// Single-entry character cap when rendering the prefix.
const PREFIX_ENTRY_CHARS: usize = 500;

/// Name of the current-session pointer file.
const POINTER_FILE: &str = "current";

/// Durable store for token-budgeted conversation sessions.
pub struct SessionStore {
    sessions_dir: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    /// Create a store rooted at a project directory. The sessions directory
    /// is created lazily on the first persist.
    pub fn new(project_root: &Path) -> Self {
        Self {
            sessions_dir: project_root.join(".vigil").join("sessions"),
            current: None,
        }
    }

    /// Create a store with an explicit sessions directory (used by tests).
    pub fn at(sessions_dir: PathBuf) -> Self {
        Self {
            sessions_dir,
            current: None,
        }
    }

    /// The currently active session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Create and persist a fresh session, making it current and updating
    /// the pointer file.
    pub fn create_session(
        &mut self,
        project_type: &str,
        project_dir: &str,
    ) -> Result<SessionId, SessionError> {
        let mut session = Session::new(project_type, project_dir);

        // Second-resolution ids can collide when sessions are created in
        // quick succession; disambiguate with a numeric suffix.
        let mut candidate = session.metadata.id.clone();
        let mut n = 1;
        while self.session_path(&candidate).exists() {
            candidate = format!("{}_{}", session.metadata.id, n);
            n += 1;
        }
        session.metadata.id = candidate;

        let id = session.metadata.id.clone();
        self.persist(&session)?;
        self.write_pointer(&id)?;
        self.current = Some(session);
        info!(session = %id, "created session");
        Ok(id)
    }

    /// Load a persisted session by id. Corrupt or expired sessions are
    /// rejected without mutating the current state; the caller must create
    /// a fresh session instead of proceeding with partial state.
    pub fn load_session(&mut self, id: &str) -> Result<(), SessionError> {
        let path = self.session_path(id);
        let raw = fs::read_to_string(&path)
            .map_err(|_| SessionError::NotFound(id.to_string()))?;
        let session: Session = serde_json::from_str(&raw)
            .map_err(|e| SessionError::Corrupt(format!("{}: {}", id, e)))?;

        if session.is_expired(chrono::Utc::now().timestamp()) {
            warn!(session = %id, "session expired, rejecting load");
            return Err(SessionError::Expired(id.to_string()));
        }

        self.write_pointer(id)?;
        self.current = Some(session);
        debug!(session = %id, "loaded session");
        Ok(())
    }

    /// Load the session named by the current-session pointer file.
    pub fn load_latest(&mut self) -> Result<(), SessionError> {
        let pointer = self.sessions_dir.join(POINTER_FILE);
        let id = fs::read_to_string(&pointer)
            .map_err(|_| SessionError::NotFound("no current session pointer".to_string()))?;
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(SessionError::NotFound("empty session pointer".to_string()));
        }
        self.load_session(&id)
    }

    /// Append one turn to the current session and persist synchronously.
    /// Evicts from the head of the window per the token/history budgets.
    pub fn add_context(
        &mut self,
        role: Role,
        content: &str,
        command: &str,
    ) -> Result<(), SessionError> {
        let session = self
            .current
            .as_mut()
            .ok_or_else(|| SessionError::NotFound("no active session".to_string()))?;

        session.push_entry(ContextEntry::new(role, content, command));
        let snapshot = session.clone();
        self.persist(&snapshot)
    }

    /// Render the most recent turns as a labeled transcript to prepend to a
    /// new prompt. Returns an empty string when there is no history, so
    /// callers must not prepend the prefix unconditionally.
    pub fn context_prefix(&self) -> String {
        let session = match &self.current {
            Some(s) if !s.context_history.is_empty() => s,
            _ => return String::new(),
        };

        let start = session.context_history.len().saturating_sub(PREFIX_ENTRIES);
        let mut prefix = String::from("[Previous conversation]\n");
        for entry in &session.context_history[start..] {
            let content = if entry.content.chars().count() > PREFIX_ENTRY_CHARS {
                let truncated: String = entry.content.chars().take(PREFIX_ENTRY_CHARS).collect();
                format!("{}... (truncated)", truncated)
            } else {
                entry.content.clone()
            };
            prefix.push_str(&format!("[{}] {}\n", entry.role, content));
        }
        prefix.push_str("\n--- New request below ---\n");
        prefix
    }

    /// Enumerate persisted sessions, most recently updated first.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut summaries = Vec::new();
        let entries = match fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(summaries),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), "unreadable session file: {}", e);
                    continue;
                }
            };
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => summaries.push(SessionSummary {
                    metadata: session.metadata,
                    filename: entry.file_name().to_string_lossy().into_owned(),
                    entry_count: session.context_history.len(),
                }),
                Err(e) => warn!(path = %path.display(), "skipping corrupt session: {}", e),
            }
        }

        summaries.sort_by(|a, b| b.metadata.updated_at.cmp(&a.metadata.updated_at));
        Ok(summaries)
    }

    /// Delete a persisted session. Returns false if it did not exist.
    pub fn delete_session(&mut self, id: &str) -> Result<bool, SessionError> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        if self.current.as_ref().map(|s| s.metadata.id == id).unwrap_or(false) {
            self.current = None;
        }
        info!(session = %id, "deleted session");
        Ok(true)
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{}.json", id))
    }

    fn persist(&self, session: &Session) -> Result<(), SessionError> {
        fs::create_dir_all(&self.sessions_dir)?;
        let path = self.session_path(&session.metadata.id);
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&path, json)?;
        Ok(())
    }

    fn write_pointer(&self, id: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.sessions_dir)?;
        fs::write(self.sessions_dir.join(POINTER_FILE), id)?;
        Ok(())
    }
}
