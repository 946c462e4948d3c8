// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Apply extracted change proposals to the working tree.
//!
//! Every destructive step (modify, delete) backs the file up first; backups
//! land in `.vigil/backups` named `<stem>_<YYYYMMDD_HHMMSS><suffix>`. The
//! applicator keeps two ledgers for the run, applied and failed, and never
//! aborts the batch over one bad change.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::warn;

use crate::error::ApplyError;

use super::types::{ChangeKind, CodeChange};

/// Backup directory under the project root.
pub const BACKUP_DIR: &str = ".vigil/backups";

/// Lines shown per side when previewing a change.
const PREVIEW_LINES: usize = 8;

/// Answer to an interactive confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Quit,
}

/// Source of interactive answers. The CLI wires stdin in; tests inject a
/// scripted sequence.
pub trait ConfirmPrompt {
    fn ask(&mut self, question: &str) -> Confirmation;
}

/// Reads `y` / `n` / `q` from stdin, defaulting to `No`.
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Confirmation {
        print!("{} [y/n/q]: ", question);
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return Confirmation::Quit;
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Confirmation::Yes,
            "q" | "quit" => Confirmation::Quit,
            _ => Confirmation::No,
        }
    }
}

/// Applies change proposals against one project root.
pub struct Applicator {
    project_root: PathBuf,
    backup_dir: PathBuf,
    applied: Vec<PathBuf>,
    failed: Vec<(CodeChange, String)>,
}

impl Applicator {
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            backup_dir: project_root.join(BACKUP_DIR),
            applied: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Changes successfully applied this run.
    pub fn applied(&self) -> &[PathBuf] {
        &self.applied
    }

    /// Changes that failed this run, with reasons.
    pub fn failed(&self) -> &[(CodeChange, String)] {
        &self.failed
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Copy the current file bytes into the backup directory.
    ///
    /// Returns the backup path, or `None` (with a warning) on any I/O
    /// failure; a failed backup never aborts the caller.
    pub fn create_backup(&self, path: &Path) -> Option<PathBuf> {
        let source = self.resolve(path);
        let stem = source.file_stem()?.to_string_lossy().into_owned();
        let suffix = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = self.backup_dir.join(format!("{}_{}{}", stem, stamp, suffix));

        let result = std::fs::create_dir_all(&self.backup_dir)
            .and_then(|_| std::fs::copy(&source, &backup_path));
        match result {
            Ok(_) => Some(backup_path),
            Err(e) => {
                warn!(path = %source.display(), "backup failed: {}", e);
                None
            }
        }
    }

    /// Apply one change, recording it in the appropriate ledger.
    ///
    /// Any failure comes back as `(false, reason)`; nothing here panics or
    /// propagates.
    pub fn apply_one(&mut self, change: &CodeChange) -> (bool, String) {
        match self.try_apply(change) {
            Ok(message) => {
                self.applied.push(change.path.clone());
                (true, message)
            }
            Err(e) => {
                let reason = e.to_string();
                self.failed.push((change.clone(), reason.clone()));
                (false, reason)
            }
        }
    }

    fn try_apply(&self, change: &CodeChange) -> Result<String, ApplyError> {
        let target = self.resolve(&change.path);

        match change.kind {
            ChangeKind::Create => {
                if target.exists() {
                    return Err(ApplyError::AlreadyExists(
                        change.path.display().to_string(),
                    ));
                }
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&target, &change.content)?;
                Ok(format!("created {}", change.path.display()))
            }
            ChangeKind::Modify => {
                if !target.exists() {
                    return Err(ApplyError::Missing(change.path.display().to_string()));
                }
                self.create_backup(&change.path);
                std::fs::write(&target, &change.content)?;
                Ok(format!("modified {}", change.path.display()))
            }
            ChangeKind::Delete => {
                if !target.exists() {
                    return Err(ApplyError::Missing(change.path.display().to_string()));
                }
                self.create_backup(&change.path);
                std::fs::remove_file(&target)?;
                Ok(format!("deleted {}", change.path.display()))
            }
        }
    }

    /// Apply changes one at a time with a per-change confirmation.
    ///
    /// `q` aborts the remainder; aborted changes count as skipped. Returns
    /// `(applied, skipped)`.
    pub fn apply_with_confirmation(
        &mut self,
        changes: &[CodeChange],
        prompt: &mut dyn ConfirmPrompt,
    ) -> (usize, usize) {
        let mut applied = 0;
        let mut skipped = 0;

        for (index, change) in changes.iter().enumerate() {
            println!("{}", self.render_preview(change));

            let question = format!(
                "Apply {} to {} ({}/{})?",
                change.kind,
                change.path.display(),
                index + 1,
                changes.len()
            );
            match prompt.ask(&question) {
                Confirmation::Yes => {
                    let (ok, message) = self.apply_one(change);
                    if ok {
                        println!("{} {}", "✓".green(), message);
                        applied += 1;
                    } else {
                        println!("{} {}", "✗".red(), message);
                    }
                }
                Confirmation::No => skipped += 1,
                Confirmation::Quit => {
                    skipped += changes.len() - index;
                    break;
                }
            }
        }

        (applied, skipped)
    }

    /// Apply every change after one global confirmation.
    ///
    /// Declining yields `(0, len)` with no side effects. Returns
    /// `(applied, failed)`.
    pub fn apply_all(
        &mut self,
        changes: &[CodeChange],
        prompt: &mut dyn ConfirmPrompt,
    ) -> (usize, usize) {
        if changes.is_empty() {
            return (0, 0);
        }

        let question = format!("Apply all {} change(s) without review?", changes.len());
        if prompt.ask(&question) != Confirmation::Yes {
            return (0, changes.len());
        }

        let mut applied = 0;
        let mut failed = 0;
        for change in changes {
            let (ok, message) = self.apply_one(change);
            if ok {
                applied += 1;
            } else {
                println!("{} {}", "✗".red(), message);
                failed += 1;
            }
        }

        (applied, failed)
    }

    /// Render the run's outcome: applied paths, failures with reasons, and
    /// where the backups live. Reporting only, no mutation.
    pub fn summary(&self) -> String {
        let mut out = String::new();

        if !self.applied.is_empty() {
            out.push_str(&format!("Applied ({}):\n", self.applied.len()));
            for path in &self.applied {
                out.push_str(&format!("  ✓ {}\n", path.display()));
            }
        }
        if !self.failed.is_empty() {
            out.push_str(&format!("Failed ({}):\n", self.failed.len()));
            for (change, reason) in &self.failed {
                out.push_str(&format!("  ✗ {}: {}\n", change.path.display(), reason));
            }
        }
        if self.applied.is_empty() && self.failed.is_empty() {
            out.push_str("No changes were applied.\n");
        } else {
            out.push_str(&format!("Backups: {}\n", self.backup_dir.display()));
        }

        out
    }

    fn render_preview(&self, change: &CodeChange) -> String {
        let mut out = format!(
            "\n{} {} ({})\n",
            "──".dimmed(),
            change.path.display(),
            change.kind
        );

        let target = self.resolve(&change.path);
        if let Ok(original) = std::fs::read_to_string(&target) {
            out.push_str(&format!("{}\n", "current:".dimmed()));
            for line in original.lines().take(PREVIEW_LINES) {
                out.push_str(&format!("  {}\n", line));
            }
        }
        if change.kind != ChangeKind::Delete {
            out.push_str(&format!("{}\n", "proposed:".dimmed()));
            for line in change.content.lines().take(PREVIEW_LINES) {
                out.push_str(&format!("  {}\n", line));
            }
        }

        out
    }
}
