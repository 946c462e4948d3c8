// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading and saving.
//!
//! One file, `vigil.json`, in the project root. A missing file is not an
//! error; the defaults simply apply.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;

use super::types::VigilConfig;

/// Config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "vigil.json";

/// Path of the config file under a project root.
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

/// Load configuration from `vigil.json`, falling back to defaults.
///
/// A missing file yields the defaults silently. A file that exists but does
/// not parse is reported as a warning and the defaults apply, so a typo in
/// the config never blocks an operation. Out-of-range values are clamped by
/// `validate`, one warning per adjustment.
pub fn load_config(project_root: &Path) -> VigilConfig {
    let path = config_path(project_root);

    let mut config = match read_config_file(&path) {
        Ok(Some(config)) => config,
        Ok(None) => VigilConfig::default(),
        Err(e) => {
            warn!("failed to load {}: {}; using defaults", path.display(), e);
            VigilConfig::default()
        }
    };

    for message in config.validate() {
        warn!("config: {}", message);
    }

    config
}

/// Read and parse the config file if it exists.
pub fn read_config_file(path: &Path) -> Result<Option<VigilConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(Some(config))
}

/// Write a configuration to `vigil.json` under the project root.
pub fn save_config(project_root: &Path, config: &VigilConfig) -> Result<(), ConfigError> {
    let path = config_path(project_root);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

/// Write a fresh default config, refusing to clobber an existing one.
///
/// Returns the written path, or `InvalidValue` naming the file if one is
/// already present.
pub fn init_config(project_root: &Path) -> Result<PathBuf, ConfigError> {
    let path = config_path(project_root);
    if path.exists() {
        return Err(ConfigError::InvalidValue {
            field: CONFIG_FILE.to_string(),
            message: "config file already exists".to_string(),
        });
    }
    save_config(project_root, &VigilConfig::default())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = load_config(temp.path());
        assert_eq!(config.agents.claude.command, "claude");
        assert!(config.dispatch.parallel);
    }

    #[test]
    fn test_file_overrides_merge_over_defaults() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            config_path(temp.path()),
            r#"{"dispatch": {"parallel": false}, "output": {"verbose": false}}"#,
        )
        .unwrap();

        let config = load_config(temp.path());
        assert!(!config.dispatch.parallel);
        assert!(!config.output.verbose);
        // Everything else keeps its default.
        assert!(config.fallback.enabled);
        assert_eq!(config.fallback.max_self_heal_attempts, 3);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(config_path(temp.path()), "{ not json").unwrap();

        let config = load_config(temp.path());
        assert_eq!(config.agents.gemini.command, "gemini");
    }

    #[test]
    fn test_out_of_range_values_clamped_on_load() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            config_path(temp.path()),
            r#"{"fallback": {"maxSelfHealAttempts": 50}}"#,
        )
        .unwrap();

        let config = load_config(temp.path());
        assert_eq!(config.fallback.max_self_heal_attempts, 3);
    }

    #[test]
    fn test_init_writes_default_and_refuses_overwrite() {
        let temp = tempfile::tempdir().unwrap();

        let path = init_config(temp.path()).unwrap();
        assert!(path.exists());

        let config = read_config_file(&path).unwrap().unwrap();
        assert_eq!(config.output.report_dir, ".vigil/reports");

        let err = init_config(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = VigilConfig::default();
        config.agents.claude.enabled = false;
        config.dispatch.timeout_secs = 60;

        save_config(temp.path(), &config).unwrap();
        let reloaded = load_config(temp.path());

        assert!(!reloaded.agents.claude.enabled);
        assert_eq!(reloaded.dispatch.timeout_secs, 60);
    }
}
