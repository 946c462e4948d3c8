// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Markdown report files, one per operation invocation.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::project::ProjectType;

/// Write a report named `<operation>_<timestamp>.md` into `report_dir`.
///
/// The header records the operation, generation time, and project type;
/// the body is the rendered result text verbatim.
pub fn save_report(
    report_dir: &Path,
    operation: &str,
    project_type: ProjectType,
    body: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(report_dir)?;

    let now = chrono::Local::now();
    let path = report_dir.join(format!("{}_{}.md", operation, now.format("%Y%m%d_%H%M%S")));

    let report = format!(
        "# Vigil Report: {}\n\n\
         - Generated: {}\n\
         - Project type: {}\n\n\
         ---\n\n\
         {}\n",
        operation,
        now.format("%Y-%m-%d %H:%M:%S"),
        project_type,
        body.trim_end()
    );

    std::fs::write(&path, report)?;
    info!(path = %path.display(), "report saved");
    Ok(path)
}
