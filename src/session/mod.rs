// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Session management for conversation persistence and context windowing.
//!
//! A session is a durable, token-budgeted multi-turn context scoped to one
//! working directory. The store keeps an ordered window of turns, evicting
//! oldest-first when either the entry cap or the token budget is exceeded,
//! and renders a short transcript prefix for new prompts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 SessionStore                 │
//! │  (create, load, add_context, prefix, list)   │
//! └──────────────────────────────────────────────┘
//!            │                       │
//!            ▼                       ▼
//! ┌────────────────────┐  ┌────────────────────┐
//! │  Session / Entry   │  │  estimate_tokens   │
//! │  (JSON files)      │  │  (pure, weighted)  │
//! └────────────────────┘  └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil::session::{Role, SessionStore};
//!
//! let mut store = SessionStore::new(std::path::Path::new("."));
//! if store.load_latest().is_err() {
//!     store.create_session("rust", ".")?;
//! }
//! store.add_context(Role::User, "explain the dispatcher", "analyze")?;
//! let prefix = store.context_prefix();
//! ```

pub mod store;
pub mod tokens;
pub mod types;

// Re-export commonly used types
pub use store::SessionStore;
pub use tokens::estimate_tokens;
pub use types::{
    ContextEntry, Role, Session, SessionId, SessionMetadata, SessionSummary,
    MAX_CONTEXT_HISTORY, MAX_CONTEXT_TOKENS, SESSION_EXPIRY_HOURS,
};
