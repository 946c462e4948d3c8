// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Project-type detection and source-file enumeration.
//!
//! Detection is marker-file based and deliberately shallow: the type only
//! steers prompt wording and which extensions get enumerated, so a wrong
//! guess degrades output quality without breaking anything.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// Detected project flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Nextjs,
    React,
    SpringBootMaven,
    SpringBootGradle,
    Python,
    Rust,
    Unknown,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Nextjs => "nextjs",
            Self::React => "react",
            Self::SpringBootMaven => "spring-boot-maven",
            Self::SpringBootGradle => "spring-boot-gradle",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl ProjectType {
    /// Extensions enumerated by default for this project flavor.
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Nextjs | Self::React => &["ts", "tsx", "js", "jsx", "css"],
            Self::SpringBootMaven => &["java", "xml", "properties", "yml"],
            Self::SpringBootGradle => &["java", "kt", "gradle", "kts", "properties", "yml"],
            Self::Python => &["py"],
            Self::Rust => &["rs", "toml"],
            Self::Unknown => &["py", "js", "ts", "java", "rs"],
        }
    }
}

/// Directory names never descended into during enumeration.
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".vigil",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "build",
    ".next",
    "dist",
];

/// Detect the project type from marker files under `root`.
pub fn detect_project_type(root: &Path) -> ProjectType {
    if let Some(js_type) = detect_js_project(root) {
        return js_type;
    }
    if root.join("pom.xml").exists() {
        return ProjectType::SpringBootMaven;
    }
    if root.join("build.gradle").exists() || root.join("build.gradle.kts").exists() {
        return ProjectType::SpringBootGradle;
    }
    if root.join("Cargo.toml").exists() {
        return ProjectType::Rust;
    }
    if root.join("requirements.txt").exists()
        || root.join("pyproject.toml").exists()
        || root.join("setup.py").exists()
    {
        return ProjectType::Python;
    }
    ProjectType::Unknown
}

/// Distinguish Next.js from plain React via package.json dependencies.
fn detect_js_project(root: &Path) -> Option<ProjectType> {
    let contents = std::fs::read_to_string(root.join("package.json")).ok()?;
    let pkg: serde_json::Value = serde_json::from_str(&contents).ok()?;

    let has_dep = |name: &str| {
        ["dependencies", "devDependencies"]
            .iter()
            .any(|section| pkg.get(section).and_then(|d| d.get(name)).is_some())
    };

    if has_dep("next") {
        Some(ProjectType::Nextjs)
    } else if has_dep("react") {
        Some(ProjectType::React)
    } else {
        None
    }
}

/// Enumerate source files under `root` by extension, skipping the usual
/// dependency and build directories.
///
/// `extensions` overrides the project type's default set when given.
pub fn project_files(
    root: &Path,
    project_type: ProjectType,
    extensions: Option<&[&str]>,
) -> Vec<PathBuf> {
    let extensions = extensions.unwrap_or_else(|| project_type.default_extensions());

    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !EXCLUDED_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.contains(&e))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}
