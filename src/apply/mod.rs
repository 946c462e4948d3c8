// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Extract file-change proposals from agent responses and apply them.
//!
//! - [`extract`] — parse fenced blocks and `[File: ...]` headers into
//!   proposals; only paths that already exist are accepted
//! - [`applicator`] — backup-first application with per-change or batch
//!   confirmation and an applied/failed ledger
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vigil::apply::{extract, Applicator, StdinPrompt};
//!
//! let changes = extract(&response, &project_root);
//! let mut applicator = Applicator::new(&project_root);
//! let (applied, skipped) =
//!     applicator.apply_with_confirmation(&changes, &mut StdinPrompt);
//! println!("{}", applicator.summary());
//! ```

pub mod applicator;
pub mod extract;
pub mod types;

pub use applicator::{Applicator, ConfirmPrompt, Confirmation, StdinPrompt, BACKUP_DIR};
pub use extract::{extract, scan};
pub use types::{ChangeKind, CodeChange, ExtractOutcome};
