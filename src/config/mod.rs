// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration management for Vigil.
//!
//! A single `vigil.json` in the project root, deserialized over typed
//! defaults and then range-validated:
//!
//! - [`types`] — the resolved [`VigilConfig`] struct tree and `validate`
//! - [`loader`] — file discovery, load/save, `--init` scaffolding
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vigil::config::load_config;
//!
//! let config = load_config(&std::env::current_dir()?);
//! if config.dispatch.parallel {
//!     // fan out to every enabled agent
//! }
//! ```

pub mod loader;
pub mod types;

pub use loader::{config_path, init_config, load_config, read_config_file, save_config, CONFIG_FILE};
pub use types::{
    AgentConfig, AgentsConfig, DispatchConfig, FallbackConfig, OutputConfig, VigilConfig,
};
